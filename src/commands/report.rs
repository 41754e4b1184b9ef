use anyhow::{Result, anyhow};
use itertools::Itertools;
use log::info;

use crate::{
    cli::{ReportArgs, TrendArgs},
    correlation::{CorrelationStrength, correlation_matrix},
    data::format_number,
    outliers::detect_outliers,
    stats::summarize,
    table,
    trend::analyze_trend,
};

use super::{emit_json, load_dataset};

pub fn stats(args: &ReportArgs) -> Result<()> {
    let (dataset, _) = load_dataset(&args.input)?;
    let summary = summarize(&dataset);
    if args.json {
        return emit_json(&summary, None);
    }
    let Some(summary) = summary else {
        println!("Dataset has no rows.");
        return Ok(());
    };
    println!(
        "Rows: {}  Columns: {}  Numeric: {}  Categorical: {}",
        summary.total_rows,
        summary.total_columns,
        summary.numeric_columns,
        summary.categorical_columns
    );
    if summary.columns.is_empty() {
        println!("No numeric columns.");
    } else {
        let headers = ["column", "count", "mean", "median", "min", "max"]
            .map(String::from)
            .to_vec();
        let rows = summary
            .columns
            .iter()
            .map(|column| {
                vec![
                    column.column.clone(),
                    column.count.to_string(),
                    format!("{:.2}", column.mean),
                    format!("{:.2}", column.median),
                    column.min.map(format_number).unwrap_or_default(),
                    column.max.map(format_number).unwrap_or_default(),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }
    info!(
        "Summarized {} numeric column(s) over {} row(s)",
        summary.columns.len(),
        summary.total_rows
    );
    Ok(())
}

pub fn outliers(args: &ReportArgs) -> Result<()> {
    let (dataset, _) = load_dataset(&args.input)?;
    let report = detect_outliers(&dataset);
    if args.json {
        return emit_json(&report, None);
    }
    let headers = ["column", "outliers", "rows"].map(String::from).to_vec();
    let rows = report
        .columns
        .iter()
        .map(|entry| {
            vec![
                entry.column.clone(),
                entry.count.to_string(),
                entry.rows.iter().join(","),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    println!("Outlier rows: {}", report.rows.iter().join(","));
    info!(
        "Found {} outlier row(s) across {} numeric column(s)",
        report.rows.len(),
        report.columns.len()
    );
    Ok(())
}

pub fn correlate(args: &ReportArgs) -> Result<()> {
    let (dataset, _) = load_dataset(&args.input)?;
    let matrix = correlation_matrix(&dataset)
        .ok_or_else(|| anyhow!("Correlation requires at least two numeric columns"))?;
    if args.json {
        return emit_json(&matrix, None);
    }
    let mut headers = vec![String::new()];
    headers.extend(matrix.columns.iter().cloned());
    let rows = matrix
        .columns
        .iter()
        .zip(&matrix.values)
        .map(|(column, values)| {
            std::iter::once(column.clone())
                .chain(values.iter().map(|value| format!("{value:.2}")))
                .collect()
        })
        .collect::<Vec<Vec<String>>>();
    table::print_table(&headers, &rows);
    for (left, right, coefficient) in matrix.strong_pairs() {
        println!(
            "{left} ~ {right}: {coefficient:.2} ({})",
            CorrelationStrength::classify(coefficient)
        );
    }
    info!("Correlated {} numeric column(s)", matrix.columns.len());
    Ok(())
}

pub fn trend(args: &TrendArgs) -> Result<()> {
    let (dataset, _) = load_dataset(&args.input)?;
    let model = analyze_trend(&dataset, &args.value).ok_or_else(|| {
        anyhow!(
            "No trend available for '{}': needs a date column, a numeric value column, and at least two distinct dates",
            args.value
        )
    })?;
    if args.json {
        return emit_json(&model, None);
    }
    let headers = ["date", "actual", "trend", "forecast"].map(String::from).to_vec();
    let observed = model.points.iter().map(|point| {
        vec![
            point.date.clone(),
            format_number(point.actual),
            format!("{:.2}", point.trend),
            String::new(),
        ]
    });
    let projected = model.forecast.iter().map(|point| {
        vec![
            point.date.clone(),
            String::new(),
            String::new(),
            format!("{:.2}", point.forecast),
        ]
    });
    table::print_table(&headers, &observed.chain(projected).collect::<Vec<_>>());
    info!(
        "Fitted '{}' over '{}' with {} point(s) and {} forecast day(s)",
        model.value_column,
        model.date_column,
        model.points.len(),
        model.forecast.len()
    );
    Ok(())
}
