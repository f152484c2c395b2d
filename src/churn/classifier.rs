use crate::model::ChurnError;
use linfa::prelude::*;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2, Axis};

/// Per-column standardization learned on the training rows.
#[derive(Debug, Clone)]
pub struct Standardizer {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl Standardizer {
    pub fn fit(features: &Array2<f64>) -> Self {
        let columns = features.ncols();
        let mean = features
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(columns));
        // constant columns are only centred
        let std = features
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });
        Self { mean, std }
    }

    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        let mut scaled = features.clone();
        for mut row in scaled.rows_mut() {
            row -= &self.mean;
            row /= &self.std;
        }
        scaled
    }
}

/// Binary logistic regression on standardized RFM features.
pub struct ChurnClassifier {
    scaler: Standardizer,
    model: FittedLogisticRegression<f64, usize>,
    /// Label whose probability the fitted model reports.
    model_positive: u8,
}

impl ChurnClassifier {
    pub fn fit(features: &Array2<f64>, labels: &[u8]) -> Result<Self, ChurnError> {
        let scaler = Standardizer::fit(features);
        let targets: Array1<usize> = labels.iter().map(|&l| l as usize).collect();
        let dataset = Dataset::new(scaler.transform(features), targets);

        let model = LogisticRegression::default()
            .fit(&dataset)
            .map_err(|e| ChurnError::Model(e.to_string()))?;

        Ok(Self {
            scaler,
            model,
            model_positive: majority_label(labels),
        })
    }

    pub fn predict(&self, features: &Array2<f64>) -> Vec<u8> {
        let predicted: Array1<usize> = self.model.predict(&self.scaler.transform(features));
        predicted.iter().map(|&p| p as u8).collect()
    }

    /// Probability of the churned class for each row.
    pub fn predict_proba(&self, features: &Array2<f64>) -> Vec<f64> {
        let proba = self
            .model
            .predict_probabilities(&self.scaler.transform(features));
        if self.model_positive == 1 {
            proba.to_vec()
        } else {
            proba.iter().map(|p| 1.0 - p).collect()
        }
    }
}

/// The class linfa treats as positive: the more frequent training label,
/// or the first one seen when both are equally frequent.
fn majority_label(labels: &[u8]) -> u8 {
    let ones = labels.iter().filter(|&&l| l == 1).count();
    let zeros = labels.len() - ones;
    match ones.cmp(&zeros) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => 0,
        std::cmp::Ordering::Equal => labels.first().copied().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardizer_centres_and_scales() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = Standardizer::fit(&x);
        let scaled = scaler.transform(&x);

        let means = scaled.mean_axis(Axis(0)).unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-12));
        // constant column is left at zero instead of dividing by zero
        assert!(scaled.column(1).iter().all(|v| *v == 0.0));
        assert!((scaled[[2, 0]] - 1.224_744_871).abs() < 1e-6);
    }

    #[test]
    fn separable_data_is_learned() {
        // recency drives the label, the other columns are noise-free filler
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let recency = if i < 20 { 5.0 + i as f64 } else { 150.0 + i as f64 };
            rows.extend_from_slice(&[recency, (i % 7) as f64 + 1.0, 100.0 + (i % 5) as f64]);
            labels.push(u8::from(i >= 20));
        }
        let x = Array2::from_shape_vec((40, 3), rows).unwrap();

        let clf = ChurnClassifier::fit(&x, &labels).unwrap();
        assert_eq!(clf.predict(&x), labels);

        let proba = clf.predict_proba(&x);
        assert!(proba[0] < 0.5);
        assert!(proba[39] > 0.5);
    }

    fn recency_separated(retained: usize, churned: usize) -> (Array2<f64>, Vec<u8>) {
        let n = retained + churned;
        let mut rows = Vec::with_capacity(n * 3);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let is_churned = i >= retained;
            let recency = if is_churned { 120.0 + i as f64 } else { 2.0 + i as f64 };
            rows.extend_from_slice(&[recency, (i % 4) as f64 + 1.0, 60.0 + (i % 9) as f64]);
            labels.push(u8::from(is_churned));
        }
        (Array2::from_shape_vec((n, 3), rows).unwrap(), labels)
    }

    #[test]
    fn proba_is_for_churned_when_churned_is_the_minority() {
        let (x, labels) = recency_separated(30, 10);
        let clf = ChurnClassifier::fit(&x, &labels).unwrap();
        assert_eq!(clf.predict(&x), labels);

        let proba = clf.predict_proba(&x);
        assert!(proba[0] < 0.5);
        assert!(proba[39] > 0.5);
        let auc = crate::churn::metrics::roc_auc(&labels, &proba);
        assert_eq!(auc, Some(1.0));
    }

    #[test]
    fn proba_is_for_churned_when_churned_is_the_majority() {
        let (x, labels) = recency_separated(10, 30);
        let clf = ChurnClassifier::fit(&x, &labels).unwrap();
        let proba = clf.predict_proba(&x);
        assert!(proba[0] < 0.5);
        assert!(proba[39] > 0.5);
    }

    #[test]
    fn majority_label_breaks_ties_by_first_seen() {
        assert_eq!(majority_label(&[0, 0, 1]), 0);
        assert_eq!(majority_label(&[1, 0, 1]), 1);
        assert_eq!(majority_label(&[1, 0]), 1);
        assert_eq!(majority_label(&[0, 1]), 0);
    }

    #[test]
    fn single_class_is_rejected() {
        let x = array![[1.0, 2.0, 3.0], [2.0, 3.0, 4.0]];
        assert!(matches!(
            ChurnClassifier::fit(&x, &[0, 0]),
            Err(ChurnError::Model(_))
        ));
    }
}
