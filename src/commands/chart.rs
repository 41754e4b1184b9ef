use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use log::info;
use serde::Serialize;

use crate::{
    chart::{
        BrushWindow, ChartData, ChartFrame, ChartKind, ChartRecommendation, aggregate,
        aggregate_all, recommend,
    },
    cli::ChartArgs,
    view::build_working_view,
};

use super::{emit_json, load_dataset, resolve_filter_state};

#[derive(Debug, Serialize)]
struct ChartReport<'a> {
    x: &'a str,
    y: &'a str,
    rows: usize,
    recommendations: Vec<ChartRecommendation>,
    charts: BTreeMap<ChartKind, ChartData>,
}

pub fn execute(args: &ChartArgs) -> Result<()> {
    let (dataset, _) = load_dataset(&args.input)?;
    for column in [&args.x, &args.y] {
        if !dataset.has_column(column) {
            return Err(anyhow!("Column '{column}' not found in dataset"));
        }
    }
    let kind = args.kind.as_deref().map(str::parse::<ChartKind>).transpose()?;
    let brush = args.brush.as_deref().map(parse_brush).transpose()?;

    let state = resolve_filter_state(&args.filter)?;
    let view = build_working_view(&dataset, &state);
    let frame = ChartFrame::from_view(&view, &args.x, &args.y);

    let mut charts = match kind {
        Some(kind) => BTreeMap::from([(kind, aggregate(&frame, kind))]),
        None => aggregate_all(&frame),
    };
    if let Some(window) = brush {
        for data in charts.values_mut() {
            *data = data.brushed(window);
        }
    }

    let supported = charts.values().filter(|data| data.is_supported()).count();
    let report = ChartReport {
        x: &args.x,
        y: &args.y,
        rows: view.len(),
        recommendations: recommend(&frame),
        charts,
    };
    emit_json(&report, args.output.as_deref())?;
    info!(
        "Aggregated {} chart kind(s) over {} row(s); {} supported",
        report.charts.len(),
        report.rows,
        supported
    );
    Ok(())
}

/// Parses `start:end` (inclusive, zero-based).
fn parse_brush(spec: &str) -> Result<BrushWindow> {
    let (start, end) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("Brush range '{spec}' must look like start:end"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow!("Brush bound '{value}' is not a row index"))
    };
    Ok(BrushWindow::new(parse(start)?, parse(end)?))
}
