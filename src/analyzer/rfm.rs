use crate::analyzer::quantile::{Binning, QUINTILES, qcut, rank_first};
use crate::analyzer::segment::segment_label;
use crate::model::{AnalysisError, Order, RfmRecord};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::warn;

/// Most recent customers get 5.
const RECENCY_LABELS: [u8; QUINTILES] = [5, 4, 3, 2, 1];
const ASCENDING_LABELS: [u8; QUINTILES] = [1, 2, 3, 4, 5];

struct CustomerTotals {
    last_order: DateTime<Utc>,
    count: u32,
    total: f64,
}

/// Snapshot date: one day after the latest order.
pub fn snapshot_date(orders: &[Order]) -> Option<DateTime<Utc>> {
    orders
        .iter()
        .map(|o| o.order_date)
        .max()
        .map(|latest| latest + Duration::days(1))
}

/// Scores every customer that placed at least one order, ordered by customer_id.
pub fn score_rfm(orders: &[Order]) -> Result<Vec<RfmRecord>, AnalysisError> {
    let snapshot = snapshot_date(orders).ok_or(AnalysisError::NoOrders)?;

    let mut grouped: BTreeMap<i64, CustomerTotals> = BTreeMap::new();
    for order in orders {
        let entry = grouped.entry(order.customer_id).or_insert_with(|| CustomerTotals {
            last_order: order.order_date,
            count: 0,
            total: 0.0,
        });
        if order.order_date > entry.last_order {
            entry.last_order = order.order_date;
        }
        entry.count += 1;
        entry.total += order.order_value;
    }

    let recency: Vec<f64> = grouped
        .values()
        .map(|t| (snapshot - t.last_order).num_days() as f64)
        .collect();
    let frequency: Vec<f64> = grouped.values().map(|t| t.count as f64).collect();
    let monetary: Vec<f64> = grouped.values().map(|t| t.total).collect();

    let r_scores = score_dimension("Recency", &recency, &RECENCY_LABELS);
    let f_scores = score_dimension("Frequency", &rank_first(&frequency), &ASCENDING_LABELS);
    let m_scores = score_dimension("Monetary", &monetary, &ASCENDING_LABELS);

    let records = grouped
        .into_iter()
        .enumerate()
        .map(|(i, (customer_id, totals))| RfmRecord {
            customer_id,
            recency: recency[i] as i64,
            frequency: totals.count,
            monetary: totals.total,
            r_score: r_scores[i],
            f_score: f_scores[i],
            m_score: m_scores[i],
            segment: segment_label(r_scores[i], f_scores[i]),
        })
        .collect();

    Ok(records)
}

fn score_dimension(name: &str, values: &[f64], labels: &[u8; QUINTILES]) -> Vec<u8> {
    let binning: Binning = qcut(values, QUINTILES);
    if binning.is_collapsed() {
        warn!(
            "{} has too few distinct values: {} of {} quintile bins remain",
            name, binning.distinct_bins, QUINTILES
        );
    }
    binning.labelled(labels)
}
