use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Cell, Dataset},
    schema::classify_columns,
};

const STRONG_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    StrongPositive,
    StrongNegative,
    Weak,
}

impl CorrelationStrength {
    pub fn classify(coefficient: f64) -> Self {
        if coefficient > STRONG_THRESHOLD {
            CorrelationStrength::StrongPositive
        } else if coefficient < -STRONG_THRESHOLD {
            CorrelationStrength::StrongNegative
        } else {
            CorrelationStrength::Weak
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CorrelationStrength::StrongPositive => "strong positive",
            CorrelationStrength::StrongNegative => "strong negative",
            CorrelationStrength::Weak => "weak",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major coefficients; `values[i][j]` pairs `columns[i]` with `columns[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Off-diagonal pairs whose coefficient is strong, each pair listed once.
    pub fn strong_pairs(&self) -> Vec<(String, String, f64)> {
        let mut pairs = Vec::new();
        for (i, left) in self.columns.iter().enumerate() {
            for (j, right) in self.columns.iter().enumerate().skip(i + 1) {
                let coefficient = self.values[i][j];
                if CorrelationStrength::classify(coefficient) != CorrelationStrength::Weak {
                    pairs.push((left.clone(), right.clone(), coefficient));
                }
            }
        }
        pairs
    }
}

pub fn correlation_matrix(dataset: &Dataset) -> Option<CorrelationMatrix> {
    let columns = classify_columns(dataset).numeric;
    if columns.len() < 2 {
        debug!("Correlation unavailable: {} numeric column(s)", columns.len());
        return None;
    }
    let extracted = columns
        .iter()
        .map(|column| valid_values(dataset, column))
        .collect::<Vec<_>>();
    let values = (0..columns.len())
        .map(|i| {
            (0..columns.len())
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        pearson(&extracted[i], &extracted[j])
                    }
                })
                .collect()
        })
        .collect();
    debug!("Computed {0}x{0} correlation matrix", columns.len());
    Some(CorrelationMatrix { columns, values })
}

pub fn correlate(dataset: &Dataset, a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    pearson(&valid_values(dataset, a), &valid_values(dataset, b))
}

fn valid_values(dataset: &Dataset, column: &str) -> Vec<f64> {
    dataset
        .column_cells(column)
        .filter_map(Cell::as_number)
        .collect()
}

/// Positional Pearson coefficient rounded to two decimals. Length mismatch,
/// empty input, or a zero-variance side yields 0.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut numerator = 0.0;
    let mut sum_sq_a = 0.0;
    let mut sum_sq_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        numerator += da * db;
        sum_sq_a += da * da;
        sum_sq_b += db * db;
    }
    if sum_sq_a == 0.0 || sum_sq_b == 0.0 {
        return 0.0;
    }
    round2(numerator / (sum_sq_a * sum_sq_b).sqrt())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
