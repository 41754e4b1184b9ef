use std::{fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Cell, Dataset},
    error::ExploreError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> char {
        match self {
            ArithmeticOp::Add => '+',
            ArithmeticOp::Sub => '-',
            ArithmeticOp::Mul => '*',
            ArithmeticOp::Div => '/',
        }
    }

    /// Applies the operator; division by zero yields 0.
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            ArithmeticOp::Add => left + right,
            ArithmeticOp::Sub => left - right,
            ArithmeticOp::Mul => left * right,
            ArithmeticOp::Div if right == 0.0 => 0.0,
            ArithmeticOp::Div => left / right,
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(ArithmeticOp::Add),
            '-' => Some(ArithmeticOp::Sub),
            '*' | '×' | 'x' => Some(ArithmeticOp::Mul),
            '/' | '÷' => Some(ArithmeticOp::Div),
            _ => None,
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for ArithmeticOp {
    type Err = ExploreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "add" | "plus" => Ok(ArithmeticOp::Add),
            "sub" | "minus" => Ok(ArithmeticOp::Sub),
            "mul" | "times" => Ok(ArithmeticOp::Mul),
            "div" => Ok(ArithmeticOp::Div),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(symbol), None) => ArithmeticOp::from_symbol(symbol),
                    _ => None,
                }
                .ok_or_else(|| ExploreError::UnknownOperator(value.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedColumn {
    pub name: String,
    pub left: String,
    pub op: ArithmeticOp,
    pub right: String,
}

impl ComputedColumn {
    /// Parses `name=left<op>right`. Operands may be separated from the
    /// operator by whitespace (`Total = Price * Qty`), which is required when
    /// a column name itself contains an operator character.
    pub fn parse(spec: &str) -> Result<Self, ExploreError> {
        let invalid = || ExploreError::InvalidComputedColumn(spec.to_string());
        let mut parts = spec.splitn(2, '=');
        let name = parts
            .next()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;
        let expression = parts
            .next()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;

        let tokens = expression.split_whitespace().collect::<Vec<_>>();
        let (left, op, right) = if let [left, op, right] = tokens.as_slice() {
            (left.to_string(), op.parse::<ArithmeticOp>()?, right.to_string())
        } else {
            let (idx, symbol) = expression
                .char_indices()
                .skip(1)
                .find(|(_, c)| matches!(c, '+' | '-' | '*' | '/' | '×' | '÷'))
                .ok_or_else(invalid)?;
            let op = ArithmeticOp::from_symbol(symbol).ok_or_else(invalid)?;
            let left = expression[..idx].trim();
            let right = expression[idx + symbol.len_utf8()..].trim();
            (left.to_string(), op, right.to_string())
        };
        if left.is_empty() || right.is_empty() {
            return Err(invalid());
        }
        Ok(ComputedColumn {
            name: name.to_string(),
            left,
            op,
            right,
        })
    }

    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        add_computed_column(dataset, &self.name, &self.left, &self.right, self.op)
    }
}

/// Returns a snapshot with `name` holding `col_a <op> col_b` for every row.
///
/// Rows where either operand fails numeric coercion, or where a division has
/// a zero divisor, receive 0. An existing column called `name` is silently
/// overwritten.
pub fn add_computed_column(
    dataset: &Dataset,
    name: &str,
    col_a: &str,
    col_b: &str,
    op: ArithmeticOp,
) -> Dataset {
    let cells = dataset
        .column_cells(col_a)
        .zip(dataset.column_cells(col_b))
        .map(|(a, b)| match (a.as_number(), b.as_number()) {
            (Some(left), Some(right)) => Cell::Number(op.apply(left, right)),
            _ => Cell::Number(0.0),
        })
        .collect::<Vec<_>>();
    if dataset.has_column(name) {
        debug!("Computed column '{name}' overwrites an existing column");
    }
    debug!(
        "Computed column '{name}' = {col_a} {op} {col_b} across {} row(s)",
        cells.len()
    );
    dataset.with_column(name, cells)
}
