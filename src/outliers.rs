use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{data::Dataset, schema::classify_columns};

pub const IQR_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Quartiles {
    /// Quartiles of values already sorted ascending; `None` when empty.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        if sorted.is_empty() {
            return None;
        }
        let q1 = nearest_rank(sorted, 0.25);
        let median = nearest_rank(sorted, 0.5);
        let q3 = nearest_rank(sorted, 0.75);
        let iqr = q3 - q1;
        Some(Self {
            q1,
            median,
            q3,
            iqr,
            lower_bound: q1 - IQR_MULTIPLIER * iqr,
            upper_bound: q3 + IQR_MULTIPLIER * iqr,
        })
    }

    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_bound || value > self.upper_bound
    }
}

fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let idx = (sorted.len() as f64 * p).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub column: String,
    pub count: usize,
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub columns: Vec<ColumnOutliers>,
    pub rows: BTreeSet<usize>,
}

impl OutlierReport {
    pub fn column(&self, name: &str) -> Option<&ColumnOutliers> {
        self.columns.iter().find(|entry| entry.column == name)
    }

    pub fn is_outlier_row(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }
}

pub fn column_outliers(dataset: &Dataset, column: &str) -> ColumnOutliers {
    let values = dataset
        .column_cells(column)
        .enumerate()
        .filter_map(|(idx, cell)| cell.as_number().map(|value| (value, idx)))
        .collect::<Vec<_>>();
    let rows = match Quartiles::from_values(&values.iter().map(|(v, _)| *v).collect::<Vec<_>>()) {
        Some(quartiles) => values
            .iter()
            .filter(|(value, _)| quartiles.is_outlier(*value))
            .map(|(_, idx)| *idx)
            .collect::<Vec<_>>(),
        None => Vec::new(),
    };
    ColumnOutliers {
        column: column.to_string(),
        count: rows.len(),
        rows,
    }
}

pub fn detect_outliers(dataset: &Dataset) -> OutlierReport {
    let partition = classify_columns(dataset);
    let mut report = OutlierReport::default();
    for column in &partition.numeric {
        let entry = column_outliers(dataset, column);
        report.rows.extend(entry.rows.iter().copied());
        report.columns.push(entry);
    }
    debug!(
        "Detected {} outlier row(s) across {} numeric column(s)",
        report.rows.len(),
        report.columns.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_rank_quartiles() {
        let quartiles = Quartiles::from_values(&[100.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(quartiles.q1, 2.0);
        assert_eq!(quartiles.q3, 5.0);
        assert_eq!(quartiles.iqr, 3.0);
        assert_eq!(quartiles.upper_bound, 9.5);
        assert_eq!(quartiles.lower_bound, -2.5);
        assert!(quartiles.is_outlier(100.0));
        assert!(!quartiles.is_outlier(9.5));
    }

    #[test]
    fn single_value_has_zero_iqr() {
        let quartiles = Quartiles::from_sorted(&[7.0]).unwrap();
        assert_eq!(quartiles.q1, 7.0);
        assert_eq!(quartiles.median, 7.0);
        assert_eq!(quartiles.iqr, 0.0);
        assert!(Quartiles::from_sorted(&[]).is_none());
    }
}
