use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnPartition {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|name| name == column)
    }

    pub fn kind_of(&self, column: &str) -> ColumnKind {
        if self.is_numeric(column) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

pub fn is_numeric(dataset: &Dataset, column: &str) -> bool {
    match dataset.column_index(column) {
        Some(idx) => rows_numeric(dataset.rows(), idx),
        None => false,
    }
}

/// Same test as [`is_numeric`] over an arbitrary row slice, such as a
/// filtered working view.
pub fn rows_numeric(rows: &[Row], column_index: usize) -> bool {
    !rows.is_empty()
        && rows
            .iter()
            .all(|row| row.get(column_index).as_number().is_some())
}

pub fn classify_columns(dataset: &Dataset) -> ColumnPartition {
    let mut partition = ColumnPartition::default();
    for (idx, column) in dataset.columns().iter().enumerate() {
        if rows_numeric(dataset.rows(), idx) {
            partition.numeric.push(column.clone());
        } else {
            partition.categorical.push(column.clone());
        }
    }
    debug!(
        "Classified {} numeric and {} categorical column(s)",
        partition.numeric.len(),
        partition.categorical.len()
    );
    partition
}
