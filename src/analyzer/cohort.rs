// Monthly cohort retention
use crate::model::{Customer, Order};
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// First day of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn of(ts: &DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Months from `start` to `self`, counting `start` itself as 1.
    pub fn index_since(&self, start: &Month) -> i32 {
        let years = self.year - start.year;
        let months = self.month as i32 - start.month as i32;
        years * 12 + months + 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-01", self.year, self.month)
    }
}

pub fn cohort_index(signup_date: &DateTime<Utc>, order_date: &DateTime<Utc>) -> i32 {
    Month::of(order_date).index_since(&Month::of(signup_date))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CohortRow {
    pub cohort: Month,
    /// Distinct ordering customers per column of `CohortMatrix::indices`.
    pub active: Vec<Option<usize>>,
    /// Retention percentage per column, one decimal.
    pub retention: Vec<Option<f64>>,
}

impl CohortRow {
    /// The cohort's initial size: its count at index 1.
    pub fn size(&self, indices: &[i32]) -> Option<usize> {
        indices
            .iter()
            .position(|&i| i == 1)
            .and_then(|col| self.active[col])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CohortMatrix {
    /// Column headers: every cohort index seen, ascending.
    pub indices: Vec<i32>,
    /// One row per cohort month with at least one order, ascending.
    pub rows: Vec<CohortRow>,
}

impl CohortMatrix {
    pub fn row(&self, cohort: Month) -> Option<&CohortRow> {
        self.rows.iter().find(|r| r.cohort == cohort)
    }

    /// Retention at a given cohort index, if the cell is populated.
    pub fn retention_at(&self, cohort: Month, index: i32) -> Option<f64> {
        let col = self.indices.iter().position(|&i| i == index)?;
        self.row(cohort)?.retention[col]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds the retention matrix from orders joined to their customers' signup dates.
/// Orders of unknown customers are skipped.
pub fn cohort_retention(customers: &[Customer], orders: &[Order]) -> CohortMatrix {
    let signups: HashMap<i64, Month> = customers
        .iter()
        .map(|c| (c.customer_id, Month::of(&c.signup_date)))
        .collect();

    let mut active: BTreeMap<(Month, i32), BTreeSet<i64>> = BTreeMap::new();
    for order in orders {
        let Some(cohort) = signups.get(&order.customer_id) else {
            continue;
        };
        let index = Month::of(&order.order_date).index_since(cohort);
        active
            .entry((*cohort, index))
            .or_default()
            .insert(order.customer_id);
    }

    let indices: Vec<i32> = active
        .keys()
        .map(|(_, index)| *index)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let cohorts: BTreeSet<Month> = active.keys().map(|(cohort, _)| *cohort).collect();

    let rows = cohorts
        .into_iter()
        .map(|cohort| {
            let counts: Vec<Option<usize>> = indices
                .iter()
                .map(|index| active.get(&(cohort, *index)).map(|ids| ids.len()))
                .collect();
            let base = indices
                .iter()
                .position(|&i| i == 1)
                .and_then(|col| counts[col]);
            let retention = counts
                .iter()
                .map(|count| match (count, base) {
                    (Some(count), Some(base)) => Some(retention_pct(*count, base)),
                    _ => None,
                })
                .collect();
            CohortRow {
                cohort,
                active: counts,
                retention,
            }
        })
        .collect();

    CohortMatrix { indices, rows }
}

/// `count / base * 100`, rounded half-to-even at one decimal.
fn retention_pct(count: usize, base: usize) -> f64 {
    let pct = count as f64 / base as f64 * 100.0;
    (pct * 10.0).round_ties_even() / 10.0
}
