// Churn stage: labels, stratified split, logistic regression and evaluation.

pub mod classifier;
pub mod metrics;
pub mod plot;
pub mod split;

use crate::model::{ChurnError, RfmRecord};
use classifier::ChurnClassifier;
use metrics::{ClassificationReport, ConfusionMatrix};
use ndarray::{Array2, Axis};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Customers inactive for more than this many days are churned.
pub const CHURN_THRESHOLD_DAYS: i64 = 90;
pub const TEST_FRACTION: f64 = 0.25;
pub const RANDOM_SEED: u64 = 42;
pub const CLASS_NAMES: [&str; 2] = ["Not Churned", "Churned"];

pub fn churn_label(recency: i64) -> u8 {
    u8::from(recency > CHURN_THRESHOLD_DAYS)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChurnDistribution {
    pub retained: usize,
    pub churned: usize,
}

impl ChurnDistribution {
    pub fn from_labels(labels: &[u8]) -> Self {
        let churned = labels.iter().filter(|&&l| l == 1).count();
        Self {
            retained: labels.len() - churned,
            churned,
        }
    }

    pub fn total(&self) -> usize {
        self.retained + self.churned
    }

    /// Share of each label, `[retained, churned]`.
    pub fn shares(&self) -> [f64; 2] {
        let total = self.total();
        if total == 0 {
            return [0.0, 0.0];
        }
        [
            self.retained as f64 / total as f64,
            self.churned as f64 / total as f64,
        ]
    }
}

impl fmt::Display for ChurnDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [retained, churned] = self.shares();
        writeln!(f, "Churn")?;
        writeln!(f, "0    {:.6}", retained)?;
        write!(f, "1    {:.6}", churned)
    }
}

/// Reads the RFM table written by the analysis stage.
pub fn read_rfm(path: &Path) -> Result<Vec<RfmRecord>, ChurnError> {
    if !path.exists() {
        return Err(ChurnError::MissingInput(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader.deserialize().collect::<Result<Vec<RfmRecord>, _>>()?;
    Ok(records)
}

/// Feature matrix with columns Recency, Frequency, Monetary.
pub fn features(records: &[RfmRecord]) -> Array2<f64> {
    Array2::from_shape_fn((records.len(), 3), |(row, col)| {
        let r = &records[row];
        match col {
            0 => r.recency as f64,
            1 => r.frequency as f64,
            _ => r.monetary,
        }
    })
}

#[derive(Debug, Clone)]
pub struct ChurnReport {
    pub distribution: ChurnDistribution,
    pub train_size: usize,
    pub test_size: usize,
    pub accuracy: f64,
    /// `None` when the test split holds a single class.
    pub auc: Option<f64>,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
}

impl fmt::Display for ChurnReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Accuracy: {:.4}", self.accuracy)?;
        match self.auc {
            Some(auc) => writeln!(f, "ROC AUC Score: {:.4}", auc)?,
            None => writeln!(f, "ROC AUC Score: undefined (single class in test set)")?,
        }
        writeln!(f)?;
        writeln!(f, "Classification Report:")?;
        writeln!(f, "{}", self.report)?;
        writeln!(f, "Confusion Matrix:")?;
        write!(f, "{}", self.confusion)
    }
}

/// Labels the records, trains on a stratified 75/25 split and evaluates on the held-out rows.
pub fn train_and_evaluate(records: &[RfmRecord]) -> Result<ChurnReport, ChurnError> {
    if records.is_empty() {
        return Err(ChurnError::NoRecords);
    }
    let labels: Vec<u8> = records.iter().map(|r| churn_label(r.recency)).collect();
    let distribution = ChurnDistribution::from_labels(&labels);
    if distribution.churned == 0 {
        return Err(ChurnError::SingleClass(0));
    }
    if distribution.retained == 0 {
        return Err(ChurnError::SingleClass(1));
    }

    let x = features(records);
    let split = split::stratified_split(&labels, TEST_FRACTION, RANDOM_SEED);
    let pick = |rows: &[usize]| rows.iter().map(|&i| labels[i]).collect::<Vec<u8>>();
    let (x_train, y_train) = (x.select(Axis(0), &split.train), pick(&split.train));
    let (x_test, y_test) = (x.select(Axis(0), &split.test), pick(&split.test));

    info!(
        "training churn model on {} rows, evaluating on {}",
        y_train.len(),
        y_test.len()
    );
    let model = ChurnClassifier::fit(&x_train, &y_train)?;
    let predicted = model.predict(&x_test);
    let scores = model.predict_proba(&x_test);

    let confusion = ConfusionMatrix::from_labels(&y_test, &predicted);
    Ok(ChurnReport {
        distribution,
        train_size: y_train.len(),
        test_size: y_test.len(),
        accuracy: metrics::accuracy(&y_test, &predicted),
        auc: metrics::roc_auc(&y_test, &scores),
        report: ClassificationReport::new(&confusion, CLASS_NAMES),
        confusion,
    })
}
