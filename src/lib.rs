//! phase-plots - figures from a phase-diagram parameter sweep
//!
//! Loads the sweep's results table (CSV or JSON), slices and pivots it at
//! fixed parameter values, and renders heatmaps, smoothed density curves
//! with threshold crossings and 3D surfaces as PNG files.

pub mod colormap;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metric;
pub mod output;
pub mod render;
pub mod reports;
pub mod smoothing;
pub mod table;

// Re-export main types
pub use config::PlotConfig;
pub use dataset::{Dataset, PhaseRecord, SourceFormat};
pub use error::DataError;
pub use metric::Metric;
pub use output::ReportOutput;
pub use reports::{ReportContext, ReportKind};
pub use table::{Grid, Param, Series, View};
