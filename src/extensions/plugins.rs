use crate::api::{HookHandle, HookRegistry};

/// Extension interface for bundles of hooks installed on a chart.
///
/// Plugins observe render-instance events through the hook registry of the
/// chart they are added to; they never reach into builder internals.
pub trait PlotPlugin {
    fn id(&self) -> &str;

    /// Registers the plugin's handlers. The returned handles are removed
    /// when the plugin is removed from the chart.
    fn install(&mut self, hooks: &HookRegistry) -> Vec<HookHandle>;
}

/// Plugin installed on a `ConfigBuilder`, kept with its hook handles.
pub(crate) struct InstalledPlugin {
    pub(crate) plugin: Box<dyn PlotPlugin>,
    pub(crate) handles: Vec<HookHandle>,
}

impl InstalledPlugin {
    pub(crate) fn uninstall(&self) {
        for handle in &self.handles {
            handle.remove();
        }
    }
}
