use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use csv_explorer::{
    chart::{ChartFrame, aggregate_all},
    data::Dataset,
    filter::{FilterState, SortDirection},
    insights,
    view::build_working_view,
};

fn generate_orders(rows: usize) -> Dataset {
    let headers = ["order_date", "region", "units", "revenue", "status"]
        .map(String::from)
        .to_vec();
    let records = (0..rows)
        .map(|i| {
            let region = match i % 4 {
                0 => "north",
                1 => "south",
                2 => "east",
                _ => "west",
            };
            let status = if i % 7 == 0 { "returned" } else { "shipped" };
            let units = (i * 37) % 50 + 1;
            vec![
                format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                region.to_string(),
                units.to_string(),
                format!("{:.2}", units as f64 * 19.99),
                status.to_string(),
            ]
        })
        .collect();
    Dataset::from_text(headers, records)
}

fn bench_pipeline(c: &mut Criterion) {
    let dataset = generate_orders(20_000);
    let state = FilterState::default()
        .with_search("shipped")
        .with_column_filter("region", "th")
        .with_sort("revenue", SortDirection::Desc);

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    group.bench_function("working_view", |b| {
        b.iter(|| build_working_view(black_box(&dataset), black_box(&state)))
    });
    group.bench_function("charts_region_revenue", |b| {
        let view = build_working_view(&dataset, &state);
        b.iter(|| aggregate_all(&ChartFrame::from_view(black_box(&view), "region", "revenue")))
    });
    group.bench_function("insights_parallel", |b| {
        b.iter(|| insights::compute(black_box(&dataset), Some("revenue")))
    });
    group.bench_function("insights_sequential", |b| {
        b.iter(|| insights::compute_sequential(black_box(&dataset), Some("revenue")))
    });
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
