// Analyzer module: RFM scoring, segmentation and cohort retention.

pub mod cohort;
pub mod export;
pub mod quantile;
pub mod rfm;
pub mod segment;

use crate::model::{AnalysisError, Customer, Order, RfmRecord};
use cohort::CohortMatrix;
use std::collections::BTreeMap;

/// Trait defining the interface of the analytics stage.
pub trait Analyzer {
    fn score_rfm(&self, orders: &[Order]) -> Result<Vec<RfmRecord>, AnalysisError>;
    fn cohort_retention(&self, customers: &[Customer], orders: &[Order]) -> CohortMatrix;
}

/// Default analyzer over in-memory records.
pub struct AnalyzerImpl;

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AnalyzerImpl {
    fn score_rfm(&self, orders: &[Order]) -> Result<Vec<RfmRecord>, AnalysisError> {
        rfm::score_rfm(orders)
    }

    fn cohort_retention(&self, customers: &[Customer], orders: &[Order]) -> CohortMatrix {
        cohort::cohort_retention(customers, orders)
    }
}

/// Number of customers per segment label, sorted by label.
pub fn segment_counts(records: &[RfmRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.segment.clone()).or_insert(0) += 1;
    }
    counts
}
