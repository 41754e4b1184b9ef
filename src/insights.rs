use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    correlation::{CorrelationMatrix, correlation_matrix},
    data::Dataset,
    outliers::{OutlierReport, detect_outliers},
    stats::{DatasetSummary, summarize},
    trend::{TrendModel, analyze_trend},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub summary: Option<DatasetSummary>,
    pub outliers: OutlierReport,
    pub correlation: Option<CorrelationMatrix>,
    pub trend: Option<TrendModel>,
}

/// Runs stats, outliers, correlation and (when `value_column` is given) trend
/// over one snapshot on the rayon pool.
pub fn compute(dataset: &Dataset, value_column: Option<&str>) -> Insights {
    let ((summary, outliers), (correlation, trend)) = rayon::join(
        || rayon::join(|| summarize(dataset), || detect_outliers(dataset)),
        || {
            rayon::join(
                || correlation_matrix(dataset),
                || value_column.and_then(|column| analyze_trend(dataset, column)),
            )
        },
    );
    let insights = Insights {
        summary,
        outliers,
        correlation,
        trend,
    };
    debug!(
        "Computed insights: {} outlier row(s), correlation {}, trend {}",
        insights.outliers.rows.len(),
        if insights.correlation.is_some() { "available" } else { "unavailable" },
        if insights.trend.is_some() { "available" } else { "unavailable" }
    );
    insights
}

pub fn compute_sequential(dataset: &Dataset, value_column: Option<&str>) -> Insights {
    Insights {
        summary: summarize(dataset),
        outliers: detect_outliers(dataset),
        correlation: correlation_matrix(dataset),
        trend: value_column.and_then(|column| analyze_trend(dataset, column)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn daily_squares() -> Dataset {
        Dataset::new(
            vec!["date".into(), "a".into(), "b".into()],
            (1..=9)
                .map(|day| {
                    vec![
                        Cell::from(format!("2024-02-0{day}")),
                        Cell::from(day as f64),
                        Cell::from((day * day) as f64),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn parallel_matches_sequential() {
        let dataset = daily_squares();
        assert_eq!(compute(&dataset, Some("b")), compute_sequential(&dataset, Some("b")));
        assert!(compute(&dataset, Some("b")).trend.is_some());
    }

    #[test]
    fn single_worker_pool_gives_the_same_insights() {
        let dataset = daily_squares();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .expect("thread pool");
        let pooled = pool.install(|| compute(&dataset, Some("b")));
        assert_eq!(pooled, compute_sequential(&dataset, Some("b")));
    }

    #[test]
    fn empty_dataset_has_no_insights() {
        let insights = compute(&Dataset::default(), Some("x"));
        assert!(insights.summary.is_none());
        assert!(insights.outliers.rows.is_empty());
        assert!(insights.correlation.is_none());
        assert!(insights.trend.is_none());
    }
}
