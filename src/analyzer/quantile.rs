//! Equal-population binning over linearly interpolated quantile edges.
//!
//! Bins are right-closed and the lowest edge belongs to the first bin. When a
//! dimension has too few distinct values some edges coincide; the affected
//! bins simply stay empty and `distinct_bins` reports how many remain.

pub const QUINTILES: usize = 5;

/// Bin assignment for one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    /// 0-based bin for each input value, in input order.
    pub bins: Vec<usize>,
    /// `bins + 1` edges, ascending.
    pub edges: Vec<f64>,
    /// Number of bins left once duplicate edges are removed.
    pub distinct_bins: usize,
}

impl Binning {
    pub fn is_collapsed(&self) -> bool {
        self.distinct_bins + 1 < self.edges.len()
    }

    /// Maps every bin through `labels` (one label per bin).
    pub fn labelled(&self, labels: &[u8]) -> Vec<u8> {
        self.bins.iter().map(|&b| labels[b]).collect()
    }
}

/// Quantile edges at `0, 1/bins, ..., 1`.
pub fn quantile_edges(values: &[f64], bins: usize) -> Vec<f64> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let last = sorted.len() - 1;
    let step = 1.0 / bins as f64;
    (0..=bins)
        .map(|i| {
            let q = if i == bins { 1.0 } else { i as f64 * step };
            let h = last as f64 * q;
            let lo = (h.floor() as usize).min(last);
            let hi = (lo + 1).min(last);
            lerp(sorted[lo], sorted[hi], h - lo as f64)
        })
        .collect()
}

// Stays exact at both ends of the interval.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 { b - diff * (1.0 - t) } else { a + diff * t }
}

/// Splits `values` into `bins` equal-population bins.
pub fn qcut(values: &[f64], bins: usize) -> Binning {
    let edges = quantile_edges(values, bins);
    if edges.is_empty() {
        return Binning {
            bins: Vec::new(),
            edges,
            distinct_bins: 0,
        };
    }

    let assigned = values
        .iter()
        .map(|&v| {
            edges[1..]
                .iter()
                .position(|&upper| v <= upper)
                .unwrap_or(bins - 1)
        })
        .collect();

    let mut distinct = edges.clone();
    distinct.dedup();

    Binning {
        bins: assigned,
        distinct_bins: distinct.len() - 1,
        edges,
    }
}

/// 1-based ranks where ties keep their input order.
pub fn rank_first(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // sort_by is stable, equal values stay in input order
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    for (position, idx) in order.into_iter().enumerate() {
        ranks[idx] = (position + 1) as f64;
    }
    ranks
}
