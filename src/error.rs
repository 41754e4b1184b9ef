use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExploreError {
    #[error("Row {index} is out of range for a dataset with {len} row(s)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("Column '{0}' not found in dataset")]
    UnknownColumn(String),
    #[error("Unknown arithmetic operator '{0}'. Supported: +, -, *, /, add, sub, mul, div")]
    UnknownOperator(String),
    #[error("Unknown fill method '{0}'. Supported: mean, median, custom")]
    UnknownFillMethod(String),
    #[error("Unknown sort direction '{0}'")]
    UnknownSortDirection(String),
    #[error("Unknown chart kind '{0}'. Supported: bar, line, pie, scatter, box, area")]
    UnknownChartKind(String),
    #[error("Invalid computed column '{0}'; expected `name=column<op>column`")]
    InvalidComputedColumn(String),
}
