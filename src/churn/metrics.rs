//! Binary classification metrics for the churn model.

use std::fmt;

/// Counts indexed by `[actual][predicted]`, class 0 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[u8], predicted: &[u8]) -> Self {
        let mut counts = [[0usize; 2]; 2];
        for (&a, &p) in actual.iter().zip(predicted) {
            counts[(a != 0) as usize][(p != 0) as usize] += 1;
        }
        Self { counts }
    }

    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn max(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_negatives() + self.true_positives(), self.total())
    }

    /// Precision, recall, F1 and support for `class`.
    pub fn class_metrics(&self, class: usize) -> ClassMetrics {
        let other = 1 - class;
        let tp = self.counts[class][class];
        let predicted = tp + self.counts[other][class];
        let support = tp + self.counts[class][other];

        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        ClassMetrics {
            precision,
            recall,
            f1,
            support,
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[{} {}]", self.counts[0][0], self.counts[0][1])?;
        write!(f, " [{} {}]]", self.counts[1][0], self.counts[1][1])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub names: [String; 2],
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(matrix: &ConfusionMatrix, names: [&str; 2]) -> Self {
        let classes = [matrix.class_metrics(0), matrix.class_metrics(1)];
        let total = matrix.total();

        let macro_avg = ClassMetrics {
            precision: (classes[0].precision + classes[1].precision) / 2.0,
            recall: (classes[0].recall + classes[1].recall) / 2.0,
            f1: (classes[0].f1 + classes[1].f1) / 2.0,
            support: total,
        };
        let weight = |pick: fn(&ClassMetrics) -> f64| -> f64 {
            if total == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| pick(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: total,
        };

        Self {
            names: [names[0].to_string(), names[1].to_string()],
            classes,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .names
            .iter()
            .map(String::len)
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, metrics) in self.names.iter().zip(&self.classes) {
            row(f, name, metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

pub fn accuracy(actual: &[u8], predicted: &[u8]) -> f64 {
    let correct = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();
    ratio(correct, actual.len())
}

/// Area under the ROC curve from positive-class scores, via the rank-sum
/// statistic with ties sharing their average rank. `None` when only one class
/// is present.
pub fn roc_auc(actual: &[u8], scores: &[f64]) -> Option<f64> {
    let positives = actual.iter().filter(|&&a| a != 0).count();
    let negatives = actual.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based; tied block shares the mean
        let shared = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = shared;
        }
        start = end + 1;
    }

    let positive_rank_sum: f64 = actual
        .iter()
        .zip(&ranks)
        .filter(|(a, _)| **a != 0)
        .map(|(_, r)| r)
        .sum();
    let p = positives as f64;
    let n = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusion_matrix_layout() {
        let actual = [0, 0, 1, 1, 1, 0];
        let predicted = [0, 1, 1, 0, 1, 0];
        let cm = ConfusionMatrix::from_labels(&actual, &predicted);
        assert_eq!(cm.counts, [[2, 1], [1, 2]]);
        assert_eq!(cm.true_positives(), 2);
        assert_eq!(cm.false_positives(), 1);
        assert_eq!(cm.false_negatives(), 1);
        assert_eq!(cm.true_negatives(), 2);
        assert!((cm.accuracy() - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(cm.to_string(), "[[2 1]\n [1 2]]");
    }

    #[test]
    fn per_class_metrics() {
        let cm = ConfusionMatrix {
            counts: [[8, 2], [1, 9]],
        };
        let churned = cm.class_metrics(1);
        assert!((churned.precision - 9.0 / 11.0).abs() < 1e-12);
        assert!((churned.recall - 0.9).abs() < 1e-12);
        assert_eq!(churned.support, 10);

        let report = ClassificationReport::new(&cm, ["Not Churned", "Churned"]);
        assert!((report.accuracy - 0.85).abs() < 1e-12);
        assert_eq!(report.weighted_avg.support, 20);
        let text = report.to_string();
        assert!(text.contains("Not Churned"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("0.85"));
    }

    #[test]
    fn undefined_precision_is_zero() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 0]);
        let churned = cm.class_metrics(1);
        assert_eq!(churned.precision, 0.0);
        assert_eq!(churned.f1, 0.0);
    }

    #[test]
    fn auc_of_perfect_and_inverted_scores() {
        let actual = [0, 0, 1, 1];
        assert_eq!(roc_auc(&actual, &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
        assert_eq!(roc_auc(&actual, &[0.9, 0.8, 0.2, 0.1]), Some(0.0));
    }

    #[test]
    fn auc_counts_ties_as_half() {
        let actual = [0, 1, 0, 1];
        assert_eq!(roc_auc(&actual, &[0.5, 0.5, 0.5, 0.5]), Some(0.5));
        // one tie between a positive and a negative, the rest separated
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.6, 0.6, 0.9]).unwrap();
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn auc_agrees_with_linfa_roc_on_distinct_scores() {
        use linfa::metrics::BinaryClassification;

        let actual = [0, 1, 0, 1, 1, 0, 0, 1];
        let scores = [0.1, 0.35, 0.4, 0.8, 0.65, 0.2, 0.7, 0.9];
        let ours = roc_auc(&actual, &scores).unwrap();
        assert!((ours - 0.8125).abs() < 1e-12);

        let truth: Vec<bool> = actual.iter().map(|&a| a == 1).collect();
        let scores32: Vec<linfa::dataset::Pr> = scores
            .iter()
            .map(|&s| linfa::dataset::Pr::new(s as f32))
            .collect();
        let roc = scores32.as_slice().roc(truth.as_slice()).unwrap();
        assert!((roc.area_under_curve() as f64 - ours).abs() < 1e-5);
    }

    #[test]
    fn auc_needs_both_classes() {
        assert_eq!(roc_auc(&[1, 1], &[0.3, 0.7]), None);
    }

    #[test]
    fn plain_accuracy() {
        assert_eq!(accuracy(&[1, 0, 1, 1], &[1, 0, 0, 1]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
