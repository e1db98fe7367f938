//! Turns a wizard's export ticket into saved images.
//!
//! Export is the one asynchronous step of a wizard run. The wizard hands out a ticket, the
//! exporter rasterizes the ticket's spec off the wizard, and the result is handed back with
//! [`Wizard::finish_export`], which discards it if the wizard was restarted in the meantime.

use crate::render::raster::{self, RasterError, RasterOptions};
use crate::render::{HeadlessError, RenderOptions};
use prochart_core::library::ExportedImages;
use prochart_core::wizard::{ExportOutcome, ExportRefusal, ExportTicket, Wizard};

/// Exported charts are never rasterized below this scale.
pub const MIN_EXPORT_SCALE: f32 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Refused(#[from] ExportRefusal),
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, Default)]
pub struct ChartExporter {
    render: RenderOptions,
    raster: RasterOptions,
}

impl ChartExporter {
    pub fn new(render: RenderOptions, raster: RasterOptions) -> Self {
        Self { render, raster }
    }

    pub fn raster_options(&self) -> &RasterOptions {
        &self.raster
    }

    /// Rasterizes an already rendered chart SVG into the full PNG and thumbnail JPG data URLs.
    pub fn export_svg_sync(&self, svg: &str) -> Result<ExportedImages> {
        let mut full = self.raster.clone();
        full.scale = full.scale.max(MIN_EXPORT_SCALE);
        let png = raster::svg_to_png(svg, &full)?;
        let thumbnail = raster::svg_to_thumbnail_jpeg(svg, &self.raster)?;
        Ok(ExportedImages {
            full_image: raster::data_url("image/png", &png),
            thumbnail_image: raster::data_url("image/jpeg", &thumbnail),
        })
    }

    /// Renders the ticket's spec with the layout captured at `begin_export` and rasterizes it.
    pub fn export_sync(&self, ticket: &ExportTicket) -> Result<ExportedImages> {
        let svg = prochart_render::render_svg(&ticket.spec, &ticket.layout, &self.render)
            .map_err(HeadlessError::from)?;
        self.export_svg_sync(&svg)
    }

    pub async fn export(&self, ticket: &ExportTicket) -> Result<ExportedImages> {
        futures::future::lazy(|_| self.export_sync(ticket)).await
    }

    /// Runs one full export for `wizard`: begin, rasterize, finish.
    ///
    /// A refusal (not on the preview step, or an export already running) is an error; a failed
    /// rasterization is reported through the wizard and returned as [`ExportOutcome::Failed`].
    pub async fn run(&self, wizard: &mut Wizard) -> Result<ExportOutcome> {
        let ticket = wizard.begin_export()?;
        let result = self.export(&ticket).await;
        if let Err(err) = &result {
            tracing::warn!(%err, "chart export failed");
        }
        Ok(wizard.finish_export(ticket, result))
    }

    /// Executor-free variant of [`ChartExporter::run`] for CLIs and tests.
    pub fn run_blocking(&self, wizard: &mut Wizard) -> Result<ExportOutcome> {
        futures::executor::block_on(self.run(wizard))
    }
}
