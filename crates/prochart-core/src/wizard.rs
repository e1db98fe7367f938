//! The guided chart wizard.
//!
//! One [`Wizard`] owns one run: its selection, archetype/title/theme, layout model and compiled
//! spec. The catalog and chart store are injected. Gate failures come back as
//! [`GateViolation`] values and are also recorded as notices for the UI; they never abort the
//! run and never block going back.
//!
//! Export is split in two so the rasterization await does not hold the wizard:
//! [`Wizard::begin_export`] hands out an [`ExportTicket`] and marks an export in flight,
//! [`Wizard::finish_export`] consumes the ticket with the rasterizer's outcome. A ticket issued
//! before [`Wizard::restart`] is stale and its result is dropped.

use crate::archetype::ChartArchetype;
use crate::catalog::extract_parameters;
use crate::compile::{ChartSpec, CompileOptions, compile_with};
use crate::layout::{LayoutModel, LayoutOptions};
use crate::library::{ChartConfig, ExportedImages, SavedChartRecord};
use crate::product::ProductRecord;
use crate::recommend::{Recommendation, RecommendationRules};
use crate::selection::{GateViolation, Selection};
use crate::steps::WizardStep;
use crate::store::ChartStore;
use crate::theme::Theme;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub step: WizardStep,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportRefusal {
    #[error("Export is only available from the preview step")]
    NotInPreview,
    #[error("An export is already in progress")]
    InFlight,
}

/// Everything the exporter needs, detached from the wizard.
///
/// Not `Clone`: finishing consumes the ticket, so one export saves at most one record.
#[derive(Debug, PartialEq)]
pub struct ExportTicket {
    generation: u64,
    pub spec: ChartSpec,
    pub layout: LayoutOptions,
    pub config: ChartConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Saved(SavedChartRecord),
    /// Rasterization or persistence failed; the wizard stays on the preview step.
    Failed(String),
    /// The wizard was restarted while the export ran.
    Stale,
}

pub struct Wizard {
    catalog: Arc<[ProductRecord]>,
    store: Arc<dyn ChartStore>,
    rules: RecommendationRules,
    compile_options: CompileOptions,
    step: WizardStep,
    selection: Selection,
    archetype: Option<ChartArchetype>,
    title: String,
    theme: Theme,
    layout: LayoutModel,
    spec: Option<ChartSpec>,
    generation: u64,
    export_in_flight: bool,
    notices: Vec<Notice>,
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("step", &self.step)
            .field("selection", &self.selection)
            .field("archetype", &self.archetype)
            .field("title", &self.title)
            .field("theme", &self.theme)
            .field("generation", &self.generation)
            .field("export_in_flight", &self.export_in_flight)
            .finish_non_exhaustive()
    }
}

impl Wizard {
    pub fn new(catalog: impl Into<Arc<[ProductRecord]>>, store: Arc<dyn ChartStore>) -> Self {
        Self {
            catalog: catalog.into(),
            store,
            rules: RecommendationRules::default(),
            compile_options: CompileOptions::default(),
            step: WizardStep::SelectProducts,
            selection: Selection::new(),
            archetype: None,
            title: String::new(),
            theme: Theme::Default,
            layout: LayoutModel::default(),
            spec: None,
            generation: 0,
            export_in_flight: false,
            notices: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: RecommendationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_compile_options(mut self, options: CompileOptions) -> Self {
        self.compile_options = options;
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn catalog(&self) -> &[ProductRecord] {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn ChartStore> {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn archetype(&self) -> Option<ChartArchetype> {
        self.archetype
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn layout(&self) -> &LayoutModel {
        &self.layout
    }

    /// Layout edits never touch the compiled spec; subscribers re-flow the render.
    pub fn layout_mut(&mut self) -> &mut LayoutModel {
        &mut self.layout
    }

    pub fn spec(&self) -> Option<&ChartSpec> {
        self.spec.as_ref()
    }

    pub fn is_exporting(&self) -> bool {
        self.export_in_flight
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            step: self.step,
            message: message.into(),
        });
    }

    fn reject<T>(&mut self, violation: GateViolation) -> Result<T, GateViolation> {
        tracing::debug!(step = ?self.step, %violation, "wizard gate rejected");
        self.notify(NoticeLevel::Warning, violation.to_string());
        Err(violation)
    }

    /// Selected data changed: recompile when previewing, otherwise drop the stale spec.
    fn invalidate(&mut self) {
        if self.step == WizardStep::PreviewExport {
            self.spec = Some(self.compile_current());
        } else {
            self.spec = None;
        }
    }

    // Product step

    pub fn select_product(&mut self, id: &str) -> Result<(), GateViolation> {
        let Some(product) = self.catalog.iter().find(|p| p.id == id).cloned() else {
            return self.reject(GateViolation::UnknownProduct { id: id.to_string() });
        };
        if let Err(v) = self.selection.add_product(product) {
            return self.reject(v);
        }
        self.invalidate();
        Ok(())
    }

    pub fn deselect_product(&mut self, id: &str) -> bool {
        let removed = self.selection.remove_product(id);
        if removed {
            self.invalidate();
        }
        removed
    }

    /// Returns whether the product is selected afterwards.
    pub fn toggle_product(&mut self, id: &str) -> Result<bool, GateViolation> {
        if self.deselect_product(id) {
            return Ok(false);
        }
        self.select_product(id).map(|_| true)
    }

    // Parameter step

    /// Parameter universe of the currently selected products.
    pub fn available_parameters(&self) -> Vec<String> {
        extract_parameters(self.selection.products())
    }

    pub fn select_parameter(&mut self, name: &str) -> bool {
        let added = self.selection.add_parameter(name);
        if added {
            self.invalidate();
        }
        added
    }

    pub fn deselect_parameter(&mut self, name: &str) -> bool {
        let removed = self.selection.remove_parameter(name);
        if removed {
            self.invalidate();
        }
        removed
    }

    pub fn toggle_parameter(&mut self, name: &str) -> bool {
        if self.deselect_parameter(name) {
            return false;
        }
        self.select_parameter(name)
    }

    // Archetype and style step

    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.rules.recommend(
            self.selection.product_count(),
            self.selection.parameter_count(),
        )
    }

    pub fn choose_archetype(&mut self, archetype: ChartArchetype) {
        self.archetype = Some(archetype);
        self.layout.set_archetype(archetype);
        self.invalidate();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.invalidate();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.invalidate();
    }

    // Navigation

    fn check_leaving(&self, step: WizardStep) -> Result<(), GateViolation> {
        match step {
            WizardStep::SelectProducts => self.selection.check_products(),
            WizardStep::SelectParameters => self.selection.check_parameters(),
            WizardStep::ChooseArchetypeAndStyle => {
                if self.archetype.is_none() {
                    Err(GateViolation::NoArchetype)
                } else if self.title.trim().is_empty() {
                    Err(GateViolation::BlankTitle)
                } else {
                    Ok(())
                }
            }
            WizardStep::TuneLayout => Ok(()),
            WizardStep::PreviewExport => Err(GateViolation::AtLastStep),
        }
    }

    /// Advances one step if the current step's gate holds.
    pub fn next(&mut self) -> Result<WizardStep, GateViolation> {
        if let Err(v) = self.check_leaving(self.step) {
            return self.reject(v);
        }
        let Some(next) = self.step.next() else {
            return self.reject(GateViolation::AtLastStep);
        };
        self.step = next;
        if next == WizardStep::PreviewExport {
            self.spec = Some(self.compile_current());
        }
        tracing::debug!(step = ?self.step, "wizard advanced");
        Ok(self.step)
    }

    /// Goes back one step, keeping everything entered so far.
    pub fn back(&mut self) -> Result<WizardStep, GateViolation> {
        let Some(prev) = self.step.previous() else {
            return Err(GateViolation::AtFirstStep);
        };
        self.step = prev;
        Ok(self.step)
    }

    /// Clears the run and returns to product selection. In-flight exports become stale.
    pub fn restart(&mut self) {
        self.step = WizardStep::SelectProducts;
        self.selection.clear();
        self.archetype = None;
        self.title.clear();
        self.theme = Theme::Default;
        self.layout.set_archetype(ChartArchetype::Bar);
        self.layout.replace(LayoutOptions::for_archetype(ChartArchetype::Bar));
        self.spec = None;
        self.generation += 1;
        self.export_in_flight = false;
        self.notices.clear();
        tracing::debug!(generation = self.generation, "wizard restarted");
    }

    fn compile_current(&self) -> ChartSpec {
        compile_with(
            &self.selection,
            self.archetype.unwrap_or(ChartArchetype::Bar),
            &self.title,
            self.theme,
            &self.compile_options,
        )
    }

    pub fn config_summary(&self) -> ChartConfig {
        ChartConfig {
            archetype: self.archetype.unwrap_or(ChartArchetype::Bar),
            product_refs: self
                .selection
                .products()
                .iter()
                .map(|p| p.id.clone())
                .collect(),
            parameter_names: self.selection.parameter_names(),
            theme: self.theme,
        }
    }

    // Export

    pub fn begin_export(&mut self) -> Result<ExportTicket, ExportRefusal> {
        if self.step != WizardStep::PreviewExport {
            return Err(ExportRefusal::NotInPreview);
        }
        if self.export_in_flight {
            return Err(ExportRefusal::InFlight);
        }
        let spec = match &self.spec {
            Some(spec) => spec.clone(),
            None => self.compile_current(),
        };
        self.export_in_flight = true;
        tracing::info!(title = %spec.title, archetype = %spec.archetype, "export started");
        Ok(ExportTicket {
            generation: self.generation,
            spec,
            layout: self.layout.options().clone(),
            config: self.config_summary(),
        })
    }

    pub fn finish_export<E: fmt::Display>(
        &mut self,
        ticket: ExportTicket,
        result: Result<ExportedImages, E>,
    ) -> ExportOutcome {
        self.finish_export_at(ticket, result, Utc::now())
    }

    /// [`Wizard::finish_export`] with an explicit creation time.
    pub fn finish_export_at<E: fmt::Display>(
        &mut self,
        ticket: ExportTicket,
        result: Result<ExportedImages, E>,
        now: DateTime<Utc>,
    ) -> ExportOutcome {
        if ticket.generation != self.generation || !self.export_in_flight {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale export result"
            );
            return ExportOutcome::Stale;
        }
        self.export_in_flight = false;

        let images = match result {
            Ok(images) => images,
            Err(err) => {
                tracing::warn!(%err, "chart export failed");
                let message = format!("Export failed: {err}");
                self.notify(NoticeLevel::Error, message.clone());
                return ExportOutcome::Failed(message);
            }
        };

        let record = SavedChartRecord::new(ticket.spec.title.clone(), ticket.config, images, now);
        if let Err(err) = self.store.add_chart(&record) {
            tracing::warn!(%err, id = %record.id, "saving exported chart failed");
            let message = format!("Saving chart failed: {err}");
            self.notify(NoticeLevel::Error, message.clone());
            return ExportOutcome::Failed(message);
        }
        tracing::info!(id = %record.id, "chart saved to library");
        self.notify(NoticeLevel::Info, format!("Saved \"{}\" to the chart library", record.title));
        ExportOutcome::Saved(record)
    }
}
