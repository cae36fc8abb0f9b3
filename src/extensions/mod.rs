//! Optional behavior layered onto charts through the hook registry.

mod plugins;

pub(crate) use plugins::InstalledPlugin;
pub use plugins::PlotPlugin;
