use std::{fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Cell, Dataset, coerce_number},
    error::ExploreError,
    stats::{mean, median},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    Mean,
    Median,
    Custom,
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FillMethod::Mean => "mean",
            FillMethod::Median => "median",
            FillMethod::Custom => "custom",
        };
        f.write_str(label)
    }
}

impl FromStr for FillMethod {
    type Err = ExploreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mean" | "average" => Ok(FillMethod::Mean),
            "median" => Ok(FillMethod::Median),
            "custom" | "value" => Ok(FillMethod::Custom),
            _ => Err(ExploreError::UnknownFillMethod(value.to_string())),
        }
    }
}

pub fn fill_value(dataset: &Dataset, column: &str, method: FillMethod, custom_value: &str) -> f64 {
    let present = || {
        dataset
            .column_cells(column)
            .filter_map(Cell::as_number)
            .collect::<Vec<_>>()
    };
    match method {
        FillMethod::Mean => mean(&present()).unwrap_or(0.0),
        FillMethod::Median => median(&present()).unwrap_or(0.0),
        FillMethod::Custom => coerce_number(custom_value).unwrap_or(0.0),
    }
}

/// Returns a snapshot where every missing cell of `column` (Null, blank, or
/// non-numeric) holds the fill value. Valid cells and other columns are left
/// as they were.
pub fn impute_missing(
    dataset: &Dataset,
    column: &str,
    method: FillMethod,
    custom_value: &str,
) -> Dataset {
    let fill = fill_value(dataset, column, method, custom_value);
    let mut replaced = 0usize;
    let cells = dataset
        .column_cells(column)
        .map(|cell| {
            if cell.is_missing() {
                replaced += 1;
                Cell::Number(fill)
            } else {
                cell.clone()
            }
        })
        .collect::<Vec<_>>();
    debug!("Imputed {replaced} missing cell(s) in '{column}' using {method} = {fill}");
    dataset.with_column(column, cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ages() -> Dataset {
        Dataset::new(
            vec!["age".into()],
            vec![
                vec![Cell::from("10")],
                vec![Cell::Null],
                vec![Cell::from(30.0)],
                vec![Cell::from("")],
                vec![Cell::from("n/a")],
                vec![Cell::from("2")],
            ],
        )
    }

    #[test]
    fn mean_fill_uses_valid_values_only() {
        assert_eq!(fill_value(&ages(), "age", FillMethod::Mean, ""), 14.0);
    }

    #[test]
    fn median_fill_handles_odd_count() {
        assert_eq!(fill_value(&ages(), "age", FillMethod::Median, ""), 10.0);
    }

    #[test]
    fn custom_fill_falls_back_to_zero() {
        assert_eq!(fill_value(&ages(), "age", FillMethod::Custom, "4.5"), 4.5);
        assert_eq!(fill_value(&ages(), "age", FillMethod::Custom, "oops"), 0.0);
    }

    #[test]
    fn fill_method_parses_case_insensitively() {
        assert_eq!("Median".parse::<FillMethod>().unwrap(), FillMethod::Median);
        assert!("mode".parse::<FillMethod>().is_err());
    }
}
