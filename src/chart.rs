//! Chart eligibility and the row shapes each chart kind renders from.
//!
//! Every aggregator works over the filtered working view for a chosen pair of
//! x and y columns. A kind whose predicate fails yields
//! [`Aggregated::Unsupported`]; a supported kind that produces nothing yields
//! [`Aggregated::Empty`]. Groups keep the order in which their key first
//! appears.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    str::FromStr,
};

use itertools::Itertools;
use log::debug;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{
    data::{Cell, Row},
    error::ExploreError,
    outliers::Quartiles,
    schema::rows_numeric,
    view::WorkingView,
};

static NULL_CELL: Cell = Cell::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    #[serde(rename = "box")]
    BoxPlot,
    Area,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::BoxPlot,
        ChartKind::Area,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::BoxPlot => "box",
            ChartKind::Area => "area",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Compare averages across categories",
            ChartKind::Line => "Show trends over a continuous x-axis",
            ChartKind::Pie => "Show proportions of a numeric value across categories",
            ChartKind::Scatter => "Explore relationships between two variables",
            ChartKind::BoxPlot => "Visualize distribution, median, and outliers",
            ChartKind::Area => "Show cumulative trends over a continuous x-axis",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ExploreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "pie" => Ok(ChartKind::Pie),
            "scatter" => Ok(ChartKind::Scatter),
            "box" | "boxplot" | "box-plot" => Ok(ChartKind::BoxPlot),
            "area" => Ok(ChartKind::Area),
            _ => Err(ExploreError::UnknownChartKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "rows", rename_all = "lowercase")]
pub enum Aggregated<T> {
    Unsupported,
    Empty,
    Rows(Vec<T>),
}

impl<T> Aggregated<T> {
    fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Aggregated::Empty
        } else {
            Aggregated::Rows(rows)
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Aggregated::Unsupported)
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Aggregated::Rows(rows) => rows,
            _ => &[],
        }
    }
}

impl<T: Clone> Aggregated<T> {
    pub fn brushed(&self, window: BrushWindow) -> Self {
        match self {
            Aggregated::Rows(rows) => Aggregated::from_rows(window.slice(rows).to_vec()),
            other => other.clone(),
        }
    }
}

/// One bar per x group. A numeric y gives a single series keyed by the y
/// column holding the group mean; a categorical y gives one count series per
/// distinct y value (stacked). Serialized flat: `{"name": .., "<series>": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub name: String,
    pub series: Vec<(String, f64)>,
}

impl BarRow {
    pub fn value(&self, key: &str) -> Option<f64> {
        self.series
            .iter()
            .find(|(series, _)| series == key)
            .map(|(_, value)| *value)
    }
}

impl Serialize for BarRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        map.serialize_entry("name", &self.name)?;
        for (key, value) in &self.series {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BarRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BarRowVisitor;

        impl<'de> Visitor<'de> for BarRowVisitor {
            type Value = BarRow;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a bar row with a name and numeric series")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<BarRow, A::Error> {
                let mut name = None;
                let mut series = Vec::new();
                while let Some(key) = access.next_key::<String>()? {
                    if key == "name" && name.is_none() {
                        name = Some(access.next_value::<String>()?);
                    } else {
                        series.push((key, access.next_value::<f64>()?));
                    }
                }
                let name = name.ok_or_else(|| de::Error::missing_field("name"))?;
                Ok(BarRow { name, series })
            }
        }

        deserializer.deserialize_map(BarRowVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub index: usize,
    pub x: AxisValue,
    pub y: AxisValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    pub name: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaPoint {
    /// Position of the record in the working view before sorting by x.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ChartData {
    Bar(Aggregated<BarRow>),
    Line(Aggregated<LinePoint>),
    Pie(Aggregated<PieSlice>),
    Scatter(Aggregated<ScatterPoint>),
    #[serde(rename = "box")]
    BoxPlot(Aggregated<BoxGroup>),
    Area(Aggregated<AreaPoint>),
}

impl ChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Bar(_) => ChartKind::Bar,
            ChartData::Line(_) => ChartKind::Line,
            ChartData::Pie(_) => ChartKind::Pie,
            ChartData::Scatter(_) => ChartKind::Scatter,
            ChartData::BoxPlot(_) => ChartKind::BoxPlot,
            ChartData::Area(_) => ChartKind::Area,
        }
    }

    pub fn is_supported(&self) -> bool {
        match self {
            ChartData::Bar(data) => data.is_supported(),
            ChartData::Line(data) => data.is_supported(),
            ChartData::Pie(data) => data.is_supported(),
            ChartData::Scatter(data) => data.is_supported(),
            ChartData::BoxPlot(data) => data.is_supported(),
            ChartData::Area(data) => data.is_supported(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChartData::Bar(data) => data.rows().len(),
            ChartData::Line(data) => data.rows().len(),
            ChartData::Pie(data) => data.rows().len(),
            ChartData::Scatter(data) => data.rows().len(),
            ChartData::BoxPlot(data) => data.rows().len(),
            ChartData::Area(data) => data.rows().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn brushed(&self, window: BrushWindow) -> Self {
        match self {
            ChartData::Bar(data) => ChartData::Bar(data.brushed(window)),
            ChartData::Line(data) => ChartData::Line(data.brushed(window)),
            ChartData::Pie(data) => ChartData::Pie(data.brushed(window)),
            ChartData::Scatter(data) => ChartData::Scatter(data.brushed(window)),
            ChartData::BoxPlot(data) => ChartData::BoxPlot(data.brushed(window)),
            ChartData::Area(data) => ChartData::Area(data.brushed(window)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRecommendation {
    pub kind: ChartKind,
    pub description: &'static str,
}

/// Inclusive index range selected with a chart brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushWindow {
    pub start: usize,
    pub end: usize,
}

impl BrushWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        if rows.is_empty() || self.start >= rows.len() {
            return &[];
        }
        let end = self.end.min(rows.len() - 1);
        if self.start > end {
            return &[];
        }
        &rows[self.start..=end]
    }
}

/// The working-view rows plus the chosen axes. Unknown columns read as Null.
#[derive(Debug, Clone)]
pub struct ChartFrame<'a> {
    rows: &'a [Row],
    x: Option<usize>,
    y: Option<usize>,
    y_key: String,
}

impl<'a> ChartFrame<'a> {
    pub fn new(columns: &[String], rows: &'a [Row], x: &str, y: &str) -> Self {
        let position = |name: &str| columns.iter().position(|column| column == name);
        Self {
            rows,
            x: position(x),
            y: position(y),
            y_key: y.to_string(),
        }
    }

    pub fn from_view(view: &'a WorkingView, x: &str, y: &str) -> Self {
        Self::new(&view.columns, &view.rows, x, y)
    }

    fn x_cell(&self, row: &'a Row) -> &'a Cell {
        self.x.map_or(&NULL_CELL, |idx| row.get(idx))
    }

    fn y_cell(&self, row: &'a Row) -> &'a Cell {
        self.y.map_or(&NULL_CELL, |idx| row.get(idx))
    }

    pub fn x_numeric(&self) -> bool {
        self.x.is_some_and(|idx| rows_numeric(self.rows, idx))
    }

    pub fn y_numeric(&self) -> bool {
        self.y.is_some_and(|idx| rows_numeric(self.rows, idx))
    }

    fn distinct_x(&self) -> usize {
        self.rows
            .iter()
            .map(|row| self.x_cell(row).to_text())
            .unique()
            .count()
    }

    pub fn supports(&self, kind: ChartKind) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        match kind {
            ChartKind::Bar => true,
            ChartKind::Line => self.x_numeric() && self.y_numeric() && self.distinct_x() > 2,
            ChartKind::Pie | ChartKind::BoxPlot => self.y_numeric(),
            ChartKind::Scatter => self.x_numeric() || self.y_numeric(),
            ChartKind::Area => self.x_numeric() && self.y_numeric(),
        }
    }
}

#[derive(Default)]
struct Groups<T> {
    order: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T: Default> Groups<T> {
    fn entry(&mut self, key: String) -> &mut T {
        let pos = match self.index.get(&key) {
            Some(pos) => *pos,
            None => {
                self.index.insert(key.clone(), self.order.len());
                self.order.push((key, T::default()));
                self.order.len() - 1
            }
        };
        &mut self.order[pos].1
    }

    fn into_vec(self) -> Vec<(String, T)> {
        self.order
    }
}

pub fn bar_rows(frame: &ChartFrame<'_>) -> Aggregated<BarRow> {
    if !frame.supports(ChartKind::Bar) {
        return Aggregated::Unsupported;
    }
    let rows = if frame.y_numeric() {
        let mut groups = Groups::<(f64, usize)>::default();
        for row in frame.rows {
            if let Some(value) = frame.y_cell(row).as_number() {
                let entry = groups.entry(frame.x_cell(row).to_text().into_owned());
                entry.0 += value;
                entry.1 += 1;
            }
        }
        groups
            .into_vec()
            .into_iter()
            .map(|(name, (sum, count))| BarRow {
                name,
                series: vec![(frame.y_key.clone(), sum / count as f64)],
            })
            .collect()
    } else {
        let mut groups = Groups::<Groups<usize>>::default();
        for row in frame.rows {
            let series = groups.entry(frame.x_cell(row).to_text().into_owned());
            *series.entry(frame.y_cell(row).to_text().into_owned()) += 1;
        }
        groups
            .into_vec()
            .into_iter()
            .map(|(name, counts)| BarRow {
                name,
                series: counts
                    .into_vec()
                    .into_iter()
                    .map(|(category, count)| (category, count as f64))
                    .collect(),
            })
            .collect()
    };
    Aggregated::from_rows(rows)
}

pub fn line_points(frame: &ChartFrame<'_>) -> Aggregated<LinePoint> {
    if !frame.supports(ChartKind::Line) {
        return Aggregated::Unsupported;
    }
    let points = frame
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            Some(LinePoint {
                index,
                x: frame.x_cell(row).as_number()?,
                y: frame.y_cell(row).as_number()?,
            })
        })
        .collect();
    Aggregated::from_rows(points)
}

pub fn pie_slices(frame: &ChartFrame<'_>) -> Aggregated<PieSlice> {
    if !frame.supports(ChartKind::Pie) {
        return Aggregated::Unsupported;
    }
    let mut groups = Groups::<f64>::default();
    for row in frame.rows {
        let name = frame.x_cell(row).to_text();
        match frame.y_cell(row).as_number() {
            Some(value) if !name.is_empty() => *groups.entry(name.into_owned()) += value,
            _ => {}
        }
    }
    let slices = groups
        .into_vec()
        .into_iter()
        .map(|(name, value)| PieSlice { name, value })
        .collect();
    Aggregated::from_rows(slices)
}

pub fn scatter_points(frame: &ChartFrame<'_>) -> Aggregated<ScatterPoint> {
    if !frame.supports(ChartKind::Scatter) {
        return Aggregated::Unsupported;
    }
    let (x_numeric, y_numeric) = (frame.x_numeric(), frame.y_numeric());
    let axis = |cell: &Cell, numeric: bool| match cell.as_number() {
        Some(value) if numeric => AxisValue::Number(value),
        _ => AxisValue::Category(cell.to_text().into_owned()),
    };
    let points = frame
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| ScatterPoint {
            index,
            x: axis(frame.x_cell(row), x_numeric),
            y: axis(frame.y_cell(row), y_numeric),
        })
        .collect();
    Aggregated::from_rows(points)
}

pub fn box_groups(frame: &ChartFrame<'_>) -> Aggregated<BoxGroup> {
    if !frame.supports(ChartKind::BoxPlot) {
        return Aggregated::Unsupported;
    }
    let mut groups = Groups::<Vec<f64>>::default();
    for row in frame.rows {
        if let Some(value) = frame.y_cell(row).as_number() {
            groups
                .entry(frame.x_cell(row).to_text().into_owned())
                .push(value);
        }
    }
    let boxes = groups
        .into_vec()
        .into_iter()
        .filter_map(|(name, mut values)| {
            values.sort_by(f64::total_cmp);
            let quartiles = Quartiles::from_sorted(&values)?;
            let (outliers, inliers): (Vec<f64>, Vec<f64>) =
                values.iter().partition(|value| quartiles.is_outlier(**value));
            Some(BoxGroup {
                name,
                min: inliers.first().copied().unwrap_or(0.0),
                max: inliers.last().copied().unwrap_or(0.0),
                q1: quartiles.q1,
                median: quartiles.median,
                q3: quartiles.q3,
                lower_bound: quartiles.lower_bound,
                upper_bound: quartiles.upper_bound,
                outliers,
            })
        })
        .collect();
    Aggregated::from_rows(boxes)
}

pub fn area_points(frame: &ChartFrame<'_>) -> Aggregated<AreaPoint> {
    if !frame.supports(ChartKind::Area) {
        return Aggregated::Unsupported;
    }
    let mut ordered = frame
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| Some((index, frame.x_cell(row).as_number()?, frame.y_cell(row))))
        .collect::<Vec<_>>();
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
    let mut cumulative = 0.0;
    let points = ordered
        .into_iter()
        .map(|(index, x, cell)| {
            let y = cell.as_number().unwrap_or(0.0);
            cumulative += y;
            AreaPoint {
                index,
                x,
                y,
                cumulative,
            }
        })
        .collect();
    Aggregated::from_rows(points)
}

pub fn aggregate(frame: &ChartFrame<'_>, kind: ChartKind) -> ChartData {
    match kind {
        ChartKind::Bar => ChartData::Bar(bar_rows(frame)),
        ChartKind::Line => ChartData::Line(line_points(frame)),
        ChartKind::Pie => ChartData::Pie(pie_slices(frame)),
        ChartKind::Scatter => ChartData::Scatter(scatter_points(frame)),
        ChartKind::BoxPlot => ChartData::BoxPlot(box_groups(frame)),
        ChartKind::Area => ChartData::Area(area_points(frame)),
    }
}

pub fn aggregate_all(frame: &ChartFrame<'_>) -> BTreeMap<ChartKind, ChartData> {
    let charts = ChartKind::ALL
        .into_iter()
        .map(|kind| (kind, aggregate(frame, kind)))
        .collect::<BTreeMap<_, _>>();
    debug!(
        "Aggregated charts over {} row(s); supported: {}",
        frame.rows.len(),
        charts
            .values()
            .filter(|data| data.is_supported())
            .map(|data| data.kind().as_str())
            .join(", ")
    );
    charts
}

pub fn recommend(frame: &ChartFrame<'_>) -> Vec<ChartRecommendation> {
    if frame.rows.is_empty() {
        return Vec::new();
    }
    let categorical_vs_numeric = !frame.x_numeric() && frame.y_numeric();
    ChartKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            ChartKind::Bar | ChartKind::Pie | ChartKind::BoxPlot => categorical_vs_numeric,
            other => frame.supports(*other),
        })
        .map(|kind| ChartRecommendation {
            kind,
            description: kind.description(),
        })
        .collect()
}
