use std::{cmp::Ordering, collections::BTreeMap, fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Cell, Dataset, Row},
    error::ExploreError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ExploreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(ExploreError::UnknownSortDirection(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn parse(spec: &str) -> Result<Self, ExploreError> {
        let (column, direction) = match spec.rsplit_once(':') {
            Some((column, direction)) => (column, direction.parse()?),
            None => (spec, SortDirection::Asc),
        };
        let column = column.trim();
        if column.is_empty() {
            return Err(ExploreError::UnknownColumn(String::new()));
        }
        Ok(SortSpec {
            column: column.to_string(),
            direction,
        })
    }
}

/// Equality filter produced by clicking a chart data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossFilter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub search: String,
    pub column_filters: BTreeMap<String, String>,
    pub cross_filter: Option<CrossFilter>,
    pub sort: Option<SortSpec>,
}

impl FilterState {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_column_filter(mut self, column: impl Into<String>, text: impl Into<String>) -> Self {
        self.column_filters.insert(column.into(), text.into());
        self
    }

    pub fn with_cross_filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.cross_filter = Some(CrossFilter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            column: column.into(),
            direction,
        });
        self
    }

    /// Header-click behaviour: re-selecting the ascending sort column flips it
    /// to descending; anything else sorts ascending by `column`.
    pub fn toggle_sort(&mut self, column: &str) {
        let direction = match &self.sort {
            Some(current) if current.column == column && current.direction == SortDirection::Asc => {
                SortDirection::Desc
            }
            _ => SortDirection::Asc,
        };
        self.sort = Some(SortSpec {
            column: column.to_string(),
            direction,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.column_filters.values().all(String::is_empty)
            && self.cross_filter.is_none()
            && self.sort.is_none()
    }
}

pub fn parse_column_filter(spec: &str) -> Result<(String, String), ExploreError> {
    let (column, text) = spec
        .split_once('=')
        .ok_or_else(|| ExploreError::UnknownColumn(spec.to_string()))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(ExploreError::UnknownColumn(spec.to_string()));
    }
    Ok((column.to_string(), text.trim().to_string()))
}

pub fn apply(dataset: &Dataset, state: &FilterState) -> Vec<Row> {
    apply_indexed(dataset, state)
        .into_iter()
        .map(|idx| dataset.rows()[idx].clone())
        .collect()
}

pub fn apply_indexed(dataset: &Dataset, state: &FilterState) -> Vec<usize> {
    let rows = dataset.rows();
    let mut kept = (0..rows.len()).collect::<Vec<_>>();

    if !state.search.is_empty() {
        let needle = state.search.to_lowercase();
        kept.retain(|&idx| {
            rows[idx]
                .cells()
                .iter()
                .any(|cell| cell.folded_text().contains(&needle))
        });
    }

    for (column, text) in &state.column_filters {
        if text.is_empty() {
            continue;
        }
        let needle = text.to_lowercase();
        let col_idx = dataset.column_index(column);
        kept.retain(|&idx| column_text(&rows[idx], col_idx).contains(&needle));
    }

    if let Some(cross) = &state.cross_filter {
        let target = cross.value.to_lowercase();
        let col_idx = dataset.column_index(&cross.column);
        kept.retain(|&idx| column_text(&rows[idx], col_idx) == target);
    }

    if let Some(sort) = &state.sort {
        match dataset.column_index(&sort.column) {
            Some(col_idx) => {
                let keys = kept.iter().map(|&idx| rows[idx].get(col_idx)).collect::<Vec<_>>();
                let order = sort_order(&keys, sort.direction);
                kept = order.into_iter().map(|pos| kept[pos]).collect();
            }
            None => debug!("Sort column '{}' not found; leaving order unchanged", sort.column),
        }
    }

    debug!(
        "Filter pipeline kept {} of {} row(s)",
        kept.len(),
        dataset.len()
    );
    kept
}

fn column_text(row: &Row, index: Option<usize>) -> String {
    index.map(|idx| row.get(idx).folded_text()).unwrap_or_default()
}

/// Permutation that orders `keys`. Two numeric keys compare by value and
/// two non-numeric keys as case-insensitive text; in ascending order every
/// non-numeric key (blank cells included) ranks ahead of every number.
fn sort_order(keys: &[&Cell], direction: SortDirection) -> Vec<usize> {
    let numbers = keys.iter().map(|cell| cell.as_number()).collect::<Vec<_>>();
    let compare = |a: usize, b: usize| -> Ordering {
        match (numbers[a], numbers[b]) {
            (Some(left), Some(right)) => left.total_cmp(&right),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => compare_text(keys[a], keys[b]),
        }
    };
    let mut order = (0..keys.len()).collect::<Vec<_>>();
    match direction {
        SortDirection::Asc => order.sort_by(|&a, &b| compare(a, b)),
        SortDirection::Desc => order.sort_by(|&a, &b| compare(b, a)),
    }
    order
}

fn compare_text(left: &Cell, right: &Cell) -> Ordering {
    let (a, b) = (left.to_text(), right.to_text());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}
