use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Dataset, Row},
    filter::{FilterState, SortSpec, apply_indexed},
    outliers::detect_outliers,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingView {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Position of each output row in the source dataset.
    pub source_rows: Vec<usize>,
    pub sort: Option<SortSpec>,
    /// Outlier rows of the unfiltered snapshot, by source position.
    pub outlier_rows: BTreeSet<usize>,
}

impl WorkingView {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_outlier(&self, position: usize) -> bool {
        self.source_rows
            .get(position)
            .is_some_and(|source| self.outlier_rows.contains(source))
    }

    pub fn to_dataset(&self) -> Dataset {
        Dataset::new(
            self.columns.clone(),
            self.rows.iter().map(|row| row.cells().to_vec()).collect(),
        )
    }
}

pub fn build_working_view(dataset: &Dataset, state: &FilterState) -> WorkingView {
    let source_rows = apply_indexed(dataset, state);
    let rows = source_rows
        .iter()
        .map(|&idx| dataset.rows()[idx].clone())
        .collect::<Vec<_>>();
    let outlier_rows = detect_outliers(dataset).rows;
    debug!(
        "Working view holds {} row(s); {} outlier row(s) in source",
        rows.len(),
        outlier_rows.len()
    );
    WorkingView {
        columns: dataset.columns().to_vec(),
        rows,
        source_rows,
        sort: state.sort.clone(),
        outlier_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Cell, filter::SortDirection};

    #[test]
    fn outlier_flags_follow_rows_through_sorting() {
        let dataset = Dataset::new(
            vec!["v".into()],
            [1.0, 2.0, 3.0, 4.0, 5.0, 100.0]
                .into_iter()
                .map(|v| vec![Cell::from(v)])
                .collect(),
        );
        let state = FilterState::default().with_sort("v", SortDirection::Desc);
        let view = build_working_view(&dataset, &state);
        assert_eq!(view.source_rows[0], 5);
        assert!(view.is_outlier(0));
        assert!(!view.is_outlier(1));
        assert!(!view.is_outlier(99));
        assert_eq!(view.sort.as_ref().unwrap().direction, SortDirection::Desc);
    }
}
