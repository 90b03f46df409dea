//! Time-series decomposition chart extension
//!
//! Asks the host's R script engine for a classical decomposition (trend, seasonal,
//! random) of one measure over one time dimension, and lays the four resulting series
//! out as line charts.
//!
//! Module organization:
//! - `host`: Host platform integration (query client, layout types, properties, palettes)
//! - `chart`: Series pivot, layout, renderer seam and selection
//! - `config`: Extension configuration
//! - `configurator`: Hypercube patch-set construction
//! - `pipeline`: Fetch → validate → pivot → draw

pub mod chart;
pub mod config;
pub mod configurator;
pub mod host;
pub mod pipeline;

pub use config::ExtensionConfig;
pub use configurator::QueryConfigurator;
pub use pipeline::{draw_chart, RenderOutcome};
