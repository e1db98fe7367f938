use crate::geom::{Point, Rect};
use prochart_core::compile::CellKind;
use prochart_core::layout::LayoutOptions;
use prochart_core::{ChartArchetype, Theme};
use serde::{Deserialize, Serialize};

/// Where text anchors horizontally (SVG `text-anchor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayout {
    pub text: String,
    /// Baseline position.
    pub x: f64,
    pub y: f64,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItemLayout {
    pub label: String,
    pub color: String,
    /// Top-left of the swatch.
    pub x: f64,
    pub y: f64,
    pub swatch: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTickLayout {
    pub value: f64,
    pub label: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLabelLayout {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Degrees, counter-clockwise; `0` is horizontal.
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarLayout {
    pub series: usize,
    pub category: usize,
    pub value: f64,
    pub rect: Rect,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeriesLayout {
    pub series: usize,
    pub color: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartesianLayout {
    pub plot: Rect,
    /// y of the value `0` (the bar baseline).
    pub baseline_y: f64,
    pub y_ticks: Vec<AxisTickLayout>,
    pub x_labels: Vec<CategoryLabelLayout>,
    pub bars: Vec<BarLayout>,
    pub lines: Vec<LineSeriesLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSliceLayout {
    pub label: String,
    pub value: f64,
    /// Radians, clockwise from 12 o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
    pub is_full_circle: bool,
    pub percent: i64,
    pub text_x: f64,
    pub text_y: f64,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieLayout {
    pub center: Point,
    pub radius: f64,
    pub slices: Vec<PieSliceLayout>,
    /// Shown instead of slices when nothing is positive.
    pub empty_label: Option<TextLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarAxisLayout {
    pub label: String,
    pub angle: f64,
    pub end: Point,
    pub label_at: TextLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPolygonLayout {
    pub name: String,
    pub color: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarLayout {
    pub center: Point,
    pub radius: f64,
    pub axes: Vec<RadarAxisLayout>,
    /// Concentric rings, innermost first.
    pub graticule: Vec<Vec<Point>>,
    pub polygons: Vec<RadarPolygonLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCellLayout {
    pub rect: Rect,
    pub text: TextLayout,
    pub kind: CellKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHeaderLayout {
    pub rect: Rect,
    /// Bold first line.
    pub brand: TextLayout,
    /// Secondary second line.
    pub model: Option<TextLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    pub bounds: Rect,
    pub column_widths: Vec<f64>,
    pub corner: TableCellLayout,
    pub headers: Vec<TableHeaderLayout>,
    /// Row-major, parameter label first.
    pub rows: Vec<Vec<TableCellLayout>>,
    /// Indices of striped body rows.
    pub striped_rows: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BodyLayout {
    Cartesian(CartesianLayout),
    Pie(PieLayout),
    Radar(RadarLayout),
    Table(TableLayout),
}

/// A positioned chart, ready to be serialized to SVG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub archetype: ChartArchetype,
    pub theme: Theme,
    /// Options the geometry was computed from.
    pub options: LayoutOptions,
    pub width: f64,
    pub height: f64,
    /// Border box: the canvas minus the margin.
    pub frame: Rect,
    /// Frame minus padding; everything below is placed inside it.
    pub content: Rect,
    pub title: Option<TextLayout>,
    pub legend: Vec<LegendItemLayout>,
    pub body: BodyLayout,
}
