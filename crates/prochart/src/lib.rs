#![forbid(unsafe_code)]

//! `prochart` builds product comparison charts headlessly.
//!
//! The core crate owns the data model (catalog, selection, recommendations, wizard, compiler and
//! chart library); this facade re-exports it and optionally adds rendering.
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`prochart::render`)
//! - `raster`: enable PNG/JPG output and chart export via pure-Rust SVG rasterization

pub use prochart_core::*;

#[cfg(feature = "render")]
pub mod render;
