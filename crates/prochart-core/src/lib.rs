#![forbid(unsafe_code)]

//! Product comparison charts: semantic model (headless).
//!
//! Design goals:
//! - total data handling: missing or odd product data degrades, it never fails a chart
//! - deterministic outputs: the same selection always compiles to the same [`ChartSpec`]
//! - injected collaborators: the product catalog and the chart store are passed in, never global
//!
//! Layout (presentation) state lives in [`layout::LayoutModel`] and is kept apart from the
//! compiled spec, so restyling a chart never recompiles it.

pub mod archetype;
pub mod catalog;
pub mod compile;
pub mod error;
pub mod layout;
pub mod library;
pub mod product;
pub mod recommend;
pub mod resolve;
pub mod selection;
pub mod steps;
pub mod store;
pub mod theme;
pub mod wizard;

pub use archetype::ChartArchetype;
pub use catalog::extract_parameters;
pub use compile::{ChartBody, ChartSpec, CompileOptions, compile, compile_with};
pub use error::{Error, Result};
pub use layout::{LayoutEvent, LayoutModel, LayoutOptions};
pub use library::{
    ChartConfig, ChartLibrary, ExportedImages, InsertChartEvent, LibraryEntry, LibraryQuery,
    ReuseEvent, SavedChartRecord,
};
pub use product::{ProductRecord, ScalarValue};
pub use recommend::{Recommendation, RecommendationRules, recommend};
pub use resolve::{CellValue, display_value, numeric_value, resolve_cell};
pub use selection::{GateViolation, Selection};
pub use steps::{StepRegistry, WizardStep};
pub use store::{ChartStore, MemoryChartStore};
pub use theme::Theme;
pub use wizard::{ExportOutcome, ExportRefusal, ExportTicket, Notice, NoticeLevel, Wizard};

#[cfg(test)]
mod tests;
