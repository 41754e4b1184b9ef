use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Cell, Dataset},
    schema::classify_columns,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub columns: Vec<ColumnSummary>,
}

impl DatasetSummary {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|summary| summary.column == name)
    }
}

pub fn summarize(dataset: &Dataset) -> Option<DatasetSummary> {
    if dataset.is_empty() {
        return None;
    }
    let partition = classify_columns(dataset);
    let columns = partition
        .numeric
        .iter()
        .map(|column| {
            let mut stats = ColumnStats::with_column(column.clone());
            for value in dataset.column_cells(column).filter_map(Cell::as_number) {
                stats.add_value(value);
            }
            stats.finish()
        })
        .collect::<Vec<_>>();
    debug!(
        "Summarized {} row(s) across {} numeric column(s)",
        dataset.len(),
        columns.len()
    );
    Some(DatasetSummary {
        total_rows: dataset.len(),
        total_columns: dataset.columns().len(),
        numeric_columns: partition.numeric.len(),
        categorical_columns: partition.categorical.len(),
        columns,
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

struct ColumnStats {
    name: String,
    values: Vec<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    fn with_column(name: String) -> Self {
        Self {
            name,
            values: Vec::new(),
            min: None,
            max: None,
        }
    }

    fn add_value(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
        self.values.push(value);
    }

    fn finish(self) -> ColumnSummary {
        ColumnSummary {
            count: self.values.len(),
            mean: mean(&self.values).unwrap_or(0.0),
            median: median(&self.values).unwrap_or(0.0),
            min: self.min,
            max: self.max,
            column: self.name,
        }
    }
}
