mod common;

use common::{dataset, numeric_dataset, passengers};
use csv_explorer::{
    correlation::{CorrelationStrength, correlate, correlation_matrix},
    data::{Cell, Dataset},
    insights,
    outliers::detect_outliers,
    schema::{ColumnKind, classify_columns, is_numeric},
    stats::summarize,
    trend::{DAY_MILLIS, FORECAST_HORIZON, analyze_trend, detect_date_column},
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn classification_requires_every_cell_numeric() {
    let data = dataset(
        &["a", "b", "c", "d"],
        &[
            &[Some("1"), Some("1"), Some("x"), Some("1e3")],
            &[Some("2"), None, Some("2"), Some(" .5 ")],
        ],
    );
    assert!(is_numeric(&data, "a"));
    assert!(!is_numeric(&data, "b"));
    assert!(!is_numeric(&data, "c"));
    assert!(is_numeric(&data, "d"));
    assert!(!is_numeric(&data, "missing"));
    assert!(!is_numeric(&Dataset::new(vec!["a".into()], Vec::new()), "a"));

    let partition = classify_columns(&data);
    assert_eq!(partition.numeric, ["a", "d"]);
    assert_eq!(partition.categorical, ["b", "c"]);
    assert_eq!(partition.kind_of("c"), ColumnKind::Categorical);
}

#[test]
fn iqr_flags_only_the_extreme_value() {
    let data = numeric_dataset(
        &["v"],
        &[&[1.0], &[2.0], &[3.0], &[4.0], &[5.0], &[100.0]],
    );
    let report = detect_outliers(&data);
    let column = report.column("v").unwrap();
    assert_eq!(column.count, 1);
    assert_eq!(column.rows, [5]);
    assert!(report.is_outlier_row(5));
}

#[test]
fn global_outlier_set_is_a_union_without_duplicates() {
    let data = numeric_dataset(
        &["a", "b"],
        &[
            &[1.0, 100.0],
            &[2.0, 1.0],
            &[3.0, 2.0],
            &[4.0, 3.0],
            &[5.0, 4.0],
            &[100.0, 100.0],
            &[2.0, 3.0],
            &[3.0, 2.0],
            &[4.0, 3.0],
            &[3.0, 4.0],
        ],
    );
    let report = detect_outliers(&data);
    assert_eq!(report.column("a").unwrap().rows, [5]);
    assert_eq!(report.column("b").unwrap().rows, [0, 5]);
    assert_eq!(report.rows.iter().copied().collect::<Vec<_>>(), [0, 5]);
}

#[test]
fn outliers_skip_categorical_columns_and_empty_data() {
    assert!(detect_outliers(&Dataset::default()).columns.is_empty());
    let report = detect_outliers(&passengers());
    let columns = report
        .columns
        .iter()
        .map(|entry| entry.column.as_str())
        .collect::<Vec<_>>();
    assert_eq!(columns, ["fare"]);
}

#[test]
fn identical_columns_correlate_perfectly() {
    let data = numeric_dataset(
        &["x", "y", "z"],
        &[&[1.0, 1.0, 9.0], &[2.0, 2.0, 4.0], &[3.0, 3.0, 8.0], &[4.0, 4.0, 1.0]],
    );
    let matrix = correlation_matrix(&data).unwrap();
    assert_eq!(matrix.get("x", "y"), Some(1.0));
    assert_eq!(matrix.get("x", "x"), Some(1.0));
    assert_eq!(matrix.get("x", "z"), matrix.get("z", "x"));
    assert_eq!(
        CorrelationStrength::classify(matrix.get("x", "z").unwrap()),
        CorrelationStrength::StrongNegative
    );
    assert_eq!(matrix.strong_pairs().len(), 3);
}

#[test]
fn unequal_valid_counts_correlate_at_zero() {
    let data = dataset(
        &["a", "b"],
        &[&[Some("1"), Some("2")], &[Some("2"), None], &[Some("3"), Some("6")]],
    );
    assert_eq!(correlate(&data, "a", "b"), 0.0);
}

#[test]
fn correlation_needs_two_numeric_columns() {
    assert!(correlation_matrix(&passengers()).is_none());
    assert!(correlation_matrix(&Dataset::default()).is_none());
}

#[test]
fn perfect_linear_trend_reproduces_actuals_and_forecasts_daily() {
    let data = dataset(
        &["Date", "sales"],
        &[
            &[Some("2024-01-01"), Some("10")],
            &[Some("2024-01-02"), Some("20")],
            &[Some("2024-01-03"), Some("30")],
            &[Some("2024-01-04"), Some("40")],
        ],
    );
    let model = analyze_trend(&data, "sales").unwrap();
    assert_eq!(model.date_column, "Date");
    for point in &model.points {
        assert!(close(point.trend, point.actual), "{point:?}");
    }
    assert_eq!(model.points[0].timestamp, 1_704_067_200_000);
    assert_eq!(model.forecast.len(), FORECAST_HORIZON);
    let last = model.points.last().unwrap().timestamp;
    for (step, point) in model.forecast.iter().enumerate() {
        assert_eq!(point.timestamp, last + (step as i64 + 1) * DAY_MILLIS);
        assert!(close(point.forecast, 40.0 + 10.0 * (step as f64 + 1.0)), "{point:?}");
    }
    assert_eq!(model.forecast[4].date, "2024-01-09");
}

#[test]
fn trend_requires_date_column_and_numeric_values() {
    let data = passengers();
    assert!(detect_date_column(&data).is_none());
    assert!(analyze_trend(&data, "fare").is_none());

    let mixed = dataset(
        &["date", "v"],
        &[&[Some("2024-01-01"), Some("1")], &[Some("2024-01-02"), Some("x")]],
    );
    assert!(analyze_trend(&mixed, "v").is_none());

    let bad_date = dataset(
        &["date", "v"],
        &[&[Some("2024-01-01"), Some("1")], &[Some("tomorrow"), Some("2")]],
    );
    assert!(detect_date_column(&bad_date).is_none());
}

#[test]
fn summary_counts_and_column_stats() {
    let summary = summarize(&passengers()).unwrap();
    assert_eq!(summary.total_rows, 8);
    assert_eq!(summary.total_columns, 5);
    assert_eq!(summary.numeric_columns, 1);
    assert_eq!(summary.categorical_columns, 4);
    let fare = summary.column("fare").unwrap();
    assert_eq!(fare.count, 8);
    assert_eq!(fare.min, Some(7.25));
    assert_eq!(fare.max, Some(71.2833));
    assert!(close(fare.median, (8.4583 + 21.075) / 2.0));
    assert!(summarize(&Dataset::default()).is_none());
}

#[test]
fn insights_bundle_matches_individual_analyses() {
    let data = Dataset::new(
        vec!["order_date".into(), "units".into(), "revenue".into()],
        (1..=6)
            .map(|day| {
                vec![
                    Cell::from(format!("2024-03-0{day}")),
                    Cell::Number(day as f64),
                    Cell::Number(day as f64 * 10.0),
                ]
            })
            .collect(),
    );
    let bundle = insights::compute(&data, Some("revenue"));
    assert_eq!(bundle.summary, summarize(&data));
    assert_eq!(bundle.outliers, detect_outliers(&data));
    assert_eq!(bundle.correlation, correlation_matrix(&data));
    assert_eq!(bundle.trend, analyze_trend(&data, "revenue"));
    assert_eq!(bundle, insights::compute_sequential(&data, Some("revenue")));
}
