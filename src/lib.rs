//! dashplot: chart configuration builders and interaction controllers for
//! observability dashboards.
//!
//! Builders in `api` turn series, axes, scales and thresholds into an
//! immutable `PlotConfig`; `render::PlotRenderer` keeps one render instance
//! in step with config, data and size; `interaction` drives tooltips and
//! `api::LegendView` drives legends. Host capabilities (render library,
//! storage, clipboard, window listeners, clock) are traits.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ConfigBuilder, PlotConfig};
pub use error::{ChartError, ChartResult};
