//! Selection → renderer-agnostic chart spec.
//!
//! Compilation is pure and total. Missing data has already been degraded by the resolver, so any
//! selection shape yields a spec; odd shapes (a pie with several parameters, a radar with one)
//! render in a reduced form instead of being rejected.

use crate::archetype::ChartArchetype;
use crate::resolve::{self, CellValue};
use crate::selection::Selection;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Category labels longer than this many characters rotate.
    pub label_rotation_threshold: usize,
    pub label_rotation_degrees: f64,
    /// Radar axis max = observed max × headroom; must stay above 1.1 so polygons never clip.
    pub radar_headroom: f64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            label_rotation_threshold: 6,
            label_rotation_degrees: 45.0,
            radar_headroom: 1.2,
        }
    }
}

const MIN_RADAR_HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub title: String,
    pub archetype: ChartArchetype,
    pub theme: Theme,
    pub legend: Vec<String>,
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartBody {
    Cartesian(CartesianBody),
    Pie(PieBody),
    Radar(RadarBody),
    Table(TableBody),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartesianBody {
    pub series_kind: SeriesKind,
    pub categories: Vec<String>,
    /// Degrees; `0` keeps labels horizontal.
    pub label_rotation: f64,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieBody {
    pub parameter: Option<String>,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarIndicator {
    pub name: String,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarBody {
    pub indicators: Vec<RadarIndicator>,
    /// One polygon per product; `values[i]` belongs to `indicators[i]`.
    pub polygons: Vec<Series>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Number,
    Text,
    Feature,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub text: String,
    pub kind: CellKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub product_id: String,
    /// Rendered bold.
    pub brand: String,
    /// Rendered as secondary text below the brand.
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub parameter: String,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBody {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

impl ChartSpec {
    /// Number of data series: cartesian series, radar polygons, `1` for a pie, `0` for a table.
    pub fn series_count(&self) -> usize {
        match &self.body {
            ChartBody::Cartesian(c) => c.series.len(),
            ChartBody::Pie(_) => 1,
            ChartBody::Radar(r) => r.polygons.len(),
            ChartBody::Table(_) => 0,
        }
    }
}

pub fn compile(
    selection: &Selection,
    archetype: ChartArchetype,
    title: &str,
    theme: Theme,
) -> ChartSpec {
    compile_with(selection, archetype, title, theme, &CompileOptions::default())
}

pub fn compile_with(
    selection: &Selection,
    archetype: ChartArchetype,
    title: &str,
    theme: Theme,
    options: &CompileOptions,
) -> ChartSpec {
    let products = selection.products();
    let parameters: Vec<&str> = selection.parameters().collect();
    let product_names: Vec<String> = products.iter().map(|p| p.display_name()).collect();

    let (legend, body) = match archetype {
        ChartArchetype::Bar | ChartArchetype::Line => {
            let series_kind = if archetype == ChartArchetype::Bar {
                SeriesKind::Bar
            } else {
                SeriesKind::Line
            };
            let series: Vec<Series> = parameters
                .iter()
                .enumerate()
                .map(|(i, name)| Series {
                    name: name.to_string(),
                    values: products
                        .iter()
                        .map(|p| resolve::numeric_value(p, name))
                        .collect(),
                    color: theme.color(i).to_string(),
                })
                .collect();
            let rotate = product_names
                .iter()
                .any(|n| n.chars().count() > options.label_rotation_threshold);
            let legend = series.iter().map(|s| s.name.clone()).collect();
            (
                legend,
                ChartBody::Cartesian(CartesianBody {
                    series_kind,
                    categories: product_names.clone(),
                    label_rotation: if rotate {
                        options.label_rotation_degrees
                    } else {
                        0.0
                    },
                    series,
                }),
            )
        }
        ChartArchetype::Pie => {
            let parameter = parameters.first().map(|s| s.to_string());
            let slices = match parameter.as_deref() {
                Some(name) => products
                    .iter()
                    .zip(&product_names)
                    .enumerate()
                    .map(|(i, (p, label))| PieSlice {
                        name: label.clone(),
                        value: resolve::numeric_value(p, name),
                        color: theme.color(i).to_string(),
                    })
                    .collect(),
                None => Vec::new(),
            };
            (
                product_names.clone(),
                ChartBody::Pie(PieBody { parameter, slices }),
            )
        }
        ChartArchetype::Radar => {
            let headroom = options.radar_headroom.max(MIN_RADAR_HEADROOM);
            let polygons: Vec<Series> = products
                .iter()
                .zip(&product_names)
                .enumerate()
                .map(|(i, (p, label))| Series {
                    name: label.clone(),
                    values: parameters
                        .iter()
                        .map(|name| resolve::numeric_value(p, name))
                        .collect(),
                    color: theme.color(i).to_string(),
                })
                .collect();
            let indicators = parameters
                .iter()
                .enumerate()
                .map(|(axis, name)| {
                    let observed = polygons
                        .iter()
                        .map(|s| s.values[axis])
                        .fold(f64::NEG_INFINITY, f64::max);
                    let max = if observed.is_finite() && observed > 0.0 {
                        // Headroom would overflow near f64::MAX; the rim is then the max itself.
                        Some(observed * headroom)
                            .filter(|m| m.is_finite())
                            .unwrap_or(observed)
                    } else {
                        1.0
                    };
                    RadarIndicator {
                        name: name.to_string(),
                        max,
                    }
                })
                .collect();
            (
                product_names.clone(),
                ChartBody::Radar(RadarBody {
                    indicators,
                    polygons,
                }),
            )
        }
        ChartArchetype::Table => {
            let columns = products
                .iter()
                .map(|p| TableColumn {
                    product_id: p.id.clone(),
                    brand: p.basic_info.brand.clone(),
                    model: p.basic_info.model_name.clone(),
                })
                .collect();
            let rows = parameters
                .iter()
                .map(|name| TableRow {
                    parameter: name.to_string(),
                    cells: products
                        .iter()
                        .map(|p| {
                            let cell = resolve::resolve_cell(p, name);
                            let kind = match &cell {
                                CellValue::Number(_) => CellKind::Number,
                                CellValue::Text(_) => CellKind::Text,
                                CellValue::FeaturePresent => CellKind::Feature,
                                CellValue::Missing => CellKind::Missing,
                            };
                            TableCell {
                                text: cell.display(),
                                kind,
                            }
                        })
                        .collect(),
                })
                .collect();
            (Vec::new(), ChartBody::Table(TableBody { columns, rows }))
        }
    };

    ChartSpec {
        title: title.trim().to_string(),
        archetype,
        theme,
        legend,
        body,
    }
}
