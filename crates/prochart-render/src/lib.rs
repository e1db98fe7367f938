#![forbid(unsafe_code)]

//! Headless layout + SVG rendering for compiled [`ChartSpec`]s.
//!
//! Rendering is two-phase: [`layout_chart`] positions everything into a [`ChartLayout`] using a
//! pluggable [`TextMeasurer`], then [`svg::render_layout_svg`] serializes that layout. The
//! [`adapter::LiveChart`] keeps a mounted chart in sync with a layout model.

pub mod adapter;
pub mod cartesian;
mod frame;
pub mod geom;
pub mod model;
pub mod pie;
pub mod radar;
pub mod svg;
pub mod table;
pub mod text;

use crate::model::{BodyLayout, ChartLayout};
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use prochart_core::layout::LayoutOptions;
use prochart_core::{ChartArchetype, ChartBody, ChartSpec};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("chart body `{body}` cannot be drawn as a {archetype} chart")]
    BodyMismatch {
        archetype: ChartArchetype,
        body: &'static str,
    },
    #[error("chart layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct RenderOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    /// Root `id` of the SVG; also prefixes inner ids so several charts can share a document.
    pub diagram_id: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            diagram_id: None,
        }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("diagram_id", &self.diagram_id)
            .finish_non_exhaustive()
    }
}

impl RenderOptions {
    pub fn with_diagram_id(mut self, id: impl Into<String>) -> Self {
        self.diagram_id = Some(id.into());
        self
    }
}

fn body_name(body: &ChartBody) -> &'static str {
    match body {
        ChartBody::Cartesian(_) => "cartesian",
        ChartBody::Pie(_) => "pie",
        ChartBody::Radar(_) => "radar",
        ChartBody::Table(_) => "table",
    }
}

/// Positions `spec` inside a canvas described by `options`.
///
/// `options` are normalized for the spec's archetype first, so a table always gets an automatic
/// height and other charts a clamped one.
pub fn layout_chart(
    spec: &ChartSpec,
    options: &LayoutOptions,
    render: &RenderOptions,
) -> Result<ChartLayout> {
    let options = options.clone().normalized(spec.archetype);
    let measurer = render.text_measurer.as_ref();
    let header = frame::layout_header(spec, &options, measurer);

    let (body, height) = match (spec.archetype, &spec.body) {
        (ChartArchetype::Bar | ChartArchetype::Line, ChartBody::Cartesian(c)) => {
            let (area, height) = header.fixed_body_area(&options);
            (
                BodyLayout::Cartesian(cartesian::layout_cartesian(c, area, &options, measurer)),
                height,
            )
        }
        (ChartArchetype::Pie, ChartBody::Pie(p)) => {
            let (area, height) = header.fixed_body_area(&options);
            (
                BodyLayout::Pie(pie::layout_pie(p, area, &options, spec.theme)),
                height,
            )
        }
        (ChartArchetype::Radar, ChartBody::Radar(r)) => {
            let (area, height) = header.fixed_body_area(&options);
            (
                BodyLayout::Radar(radar::layout_radar(r, area, &options, measurer)),
                height,
            )
        }
        (ChartArchetype::Table, ChartBody::Table(t)) => {
            let table = table::layout_table(t, header.body_origin(), header.content_width, &options, measurer);
            let height = header.auto_height(&options, table.bounds.size.height);
            (BodyLayout::Table(table), height)
        }
        (archetype, body) => {
            return Err(Error::BodyMismatch {
                archetype,
                body: body_name(body),
            });
        }
    };

    Ok(header.finish(spec, options, height, body))
}

/// Lays out and serializes `spec` in one go.
pub fn render_svg(
    spec: &ChartSpec,
    options: &LayoutOptions,
    render: &RenderOptions,
) -> Result<String> {
    let layout = layout_chart(spec, options, render)?;
    Ok(svg::render_layout_svg(&layout, render))
}

/// The computed layout as JSON, for debugging and golden tests.
pub fn layout_json(spec: &ChartSpec, options: &LayoutOptions, render: &RenderOptions) -> Result<String> {
    let layout = layout_chart(spec, options, render)?;
    Ok(serde_json::to_string_pretty(&layout)?)
}
