pub use prochart_render::adapter::{LiveChart, Update, attach};
pub use prochart_render::model::{BodyLayout, ChartLayout};
pub use prochart_render::text::{DeterministicTextMeasurer, TextMeasurer};
pub use prochart_render::{RenderOptions, layout_chart, layout_json};

use prochart_core::layout::LayoutOptions;
use prochart_core::wizard::Wizard;
use prochart_core::ChartSpec;

#[cfg(feature = "raster")]
pub mod export;
#[cfg(feature = "raster")]
pub mod raster;

#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Core(#[from] prochart_core::Error),
    #[error(transparent)]
    Render(#[from] prochart_render::Error),
}

pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Converts an arbitrary string into a conservative SVG `id` token suitable for embedding
/// multiple charts in the same document.
///
/// Inner ids (clip paths, title ids) are prefixed with the root id, so two inlined charts with
/// the same id would collide. This helper:
/// - trims whitespace
/// - replaces unsupported characters with `-`
/// - ensures the id starts with an ASCII letter by prefixing `c-` when needed
pub fn sanitize_svg_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "c-untitled".to_string();
    }

    let mut out = String::with_capacity(raw.len() + 4);
    for ch in raw.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' || ch == '.';
        out.push(if ok { ch } else { '-' });
    }

    let starts_ok = out.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_ok {
        out.insert_str(0, "c-");
    }

    while out.contains("--") {
        out = out.replace("--", "-");
    }
    let out = out.trim_matches('-');
    if out.is_empty() || out == "c" {
        return "c-untitled".to_string();
    }
    out.to_string()
}

/// Synchronous SVG render helper (executor-free).
pub fn render_svg_sync(
    spec: &ChartSpec,
    layout: &LayoutOptions,
    render: &RenderOptions,
) -> Result<String> {
    Ok(prochart_render::render_svg(spec, layout, render)?)
}

pub async fn render_svg(
    spec: &ChartSpec,
    layout: &LayoutOptions,
    render: &RenderOptions,
) -> Result<String> {
    render_svg_sync(spec, layout, render)
}

/// Bundles render (and raster) options so UI integrations pass one value around.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    pub render: RenderOptions,
    #[cfg(feature = "raster")]
    pub raster: raster::RasterOptions,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_svg_sync(&self, spec: &ChartSpec, layout: &LayoutOptions) -> Result<String> {
        render_svg_sync(spec, layout, &self.render)
    }

    pub fn render_svg_sync_with_diagram_id(
        &self,
        spec: &ChartSpec,
        layout: &LayoutOptions,
        diagram_id: &str,
    ) -> Result<String> {
        let render = self.render.clone().with_diagram_id(sanitize_svg_id(diagram_id));
        render_svg_sync(spec, layout, &render)
    }

    /// Renders the wizard's current preview, if it has compiled one.
    pub fn render_preview_sync(&self, wizard: &Wizard) -> Result<Option<String>> {
        let Some(spec) = wizard.spec() else {
            return Ok(None);
        };
        Ok(Some(self.render_svg_sync(spec, wizard.layout().options())?))
    }

    #[cfg(feature = "raster")]
    pub fn render_png_sync(
        &self,
        spec: &ChartSpec,
        layout: &LayoutOptions,
    ) -> raster::Result<Vec<u8>> {
        let svg = self.render_svg_sync(spec, layout)?;
        raster::svg_to_png(&svg, &self.raster)
    }

    #[cfg(feature = "raster")]
    pub fn render_jpeg_sync(
        &self,
        spec: &ChartSpec,
        layout: &LayoutOptions,
    ) -> raster::Result<Vec<u8>> {
        let svg = self.render_svg_sync(spec, layout)?;
        raster::svg_to_jpeg(&svg, &self.raster)
    }

    #[cfg(feature = "raster")]
    pub fn exporter(&self) -> export::ChartExporter {
        export::ChartExporter::new(self.render.clone(), self.raster.clone())
    }
}
