use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Dataset, format_iso_day, parse_timestamp_millis},
    schema::is_numeric,
};

pub const DAY_MILLIS: i64 = 86_400_000;
pub const FORECAST_HORIZON: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub timestamp: i64,
    pub actual: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: String,
    pub timestamp: i64,
    pub forecast: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    pub date_column: String,
    pub value_column: String,
    /// Change in value per millisecond.
    pub slope: f64,
    pub intercept: f64,
    pub points: Vec<TrendPoint>,
    pub forecast: Vec<ForecastPoint>,
}

impl TrendModel {
    pub fn predict(&self, timestamp: i64) -> f64 {
        self.slope * timestamp as f64 + self.intercept
    }
}

pub fn detect_date_column(dataset: &Dataset) -> Option<&str> {
    if dataset.is_empty() {
        return None;
    }
    dataset
        .columns()
        .iter()
        .find(|column| {
            column.to_lowercase().contains("date")
                && dataset
                    .column_cells(column)
                    .all(|cell| parse_timestamp_millis(&cell.to_text()).is_some())
        })
        .map(String::as_str)
}

/// Fits `value_column` against the detected date column. `None` when there is
/// no date column, the value column is not numeric, fewer than two points
/// survive, or every point shares one timestamp.
pub fn analyze_trend(dataset: &Dataset, value_column: &str) -> Option<TrendModel> {
    let date_column = detect_date_column(dataset)?;
    if !is_numeric(dataset, value_column) {
        debug!("Trend unavailable: '{value_column}' is not numeric");
        return None;
    }

    let mut series = dataset
        .column_cells(date_column)
        .zip(dataset.column_cells(value_column))
        .filter_map(|(date, value)| Some((parse_timestamp_millis(&date.to_text())?, value.as_number()?)))
        .collect::<Vec<_>>();
    series.sort_by_key(|(timestamp, _)| *timestamp);
    if series.len() < 2 {
        return None;
    }

    let (slope, intercept) = least_squares(&series)?;
    let points = series
        .iter()
        .map(|&(timestamp, actual)| TrendPoint {
            date: format_iso_day(timestamp),
            timestamp,
            actual,
            trend: slope * timestamp as f64 + intercept,
        })
        .collect::<Vec<_>>();

    let last = series[series.len() - 1].0;
    let forecast = (1..=FORECAST_HORIZON as i64)
        .map(|step| {
            let timestamp = last + step * DAY_MILLIS;
            ForecastPoint {
                date: format_iso_day(timestamp),
                timestamp,
                forecast: slope * timestamp as f64 + intercept,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "Fitted trend of '{value_column}' over '{date_column}' with {} point(s)",
        points.len()
    );
    Some(TrendModel {
        date_column: date_column.to_string(),
        value_column: value_column.to_string(),
        slope,
        intercept,
        points,
        forecast,
    })
}

fn least_squares(series: &[(i64, f64)]) -> Option<(f64, f64)> {
    let first = series.first()?.0;
    if series.iter().all(|(timestamp, _)| *timestamp == first) {
        return None;
    }
    let n = series.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for &(timestamp, value) in series {
        let x = timestamp as f64;
        sum_x += x;
        sum_y += value;
        sum_xy += x * value;
        sum_xx += x * x;
    }
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some((slope, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn daily(values: &[(&str, f64)]) -> Dataset {
        Dataset::new(
            vec!["Order Date".into(), "sales".into()],
            values
                .iter()
                .map(|(date, value)| vec![Cell::from(*date), Cell::from(*value)])
                .collect(),
        )
    }

    #[test]
    fn detects_first_parseable_date_column() {
        let dataset = Dataset::from_text(
            vec!["update_date".into(), "ship_date".into()],
            vec![
                vec!["soon".into(), "2024-01-01".into()],
                vec!["later".into(), "2024-01-02".into()],
            ],
        );
        assert_eq!(detect_date_column(&dataset), Some("ship_date"));
    }

    #[test]
    fn unsorted_input_is_ordered_by_date() {
        let model = analyze_trend(
            &daily(&[("2024-01-03", 30.0), ("2024-01-01", 10.0), ("2024-01-02", 20.0)]),
            "sales",
        )
        .unwrap();
        let dates = model.points.iter().map(|p| p.date.as_str()).collect::<Vec<_>>();
        assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(model.forecast[0].date, "2024-01-04");
        assert_eq!(model.forecast.len(), FORECAST_HORIZON);
    }

    #[test]
    fn single_timestamp_is_degenerate() {
        assert!(analyze_trend(&daily(&[("2024-01-01", 1.0), ("2024-01-01", 2.0)]), "sales").is_none());
        assert!(analyze_trend(&daily(&[("2024-01-01", 1.0)]), "sales").is_none());
    }
}
