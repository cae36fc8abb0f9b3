mod listeners;
mod placement;
mod schedule;
mod tooltip;
mod viewport_probe;

use serde::{Deserialize, Serialize};

pub use listeners::{
    GlobalEvent, GlobalEventKind, GlobalHandler, GlobalListeners, ListenerRegistry, ListenerToken,
};
pub use placement::{DEFAULT_PLACEMENT_GAP_PX, PlacementState, TooltipPlacement, place_tooltip};
pub use schedule::{PendingRender, RenderSchedule};
pub use tooltip::{
    DEFAULT_DEACTIVATE_DEBOUNCE_MS, DismissHandle, TooltipController, TooltipOptions, TooltipPhase,
    TooltipRenderArgs, TooltipStyle, TooltipViewState,
};
pub use viewport_probe::{DEFAULT_VIEWPORT_PROBE_DEBOUNCE_MS, ViewportProbe};

/// How a chart takes part in cross-chart cursor sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncMode {
    #[default]
    None,
    /// Cursor position is shared; synced charts draw no tooltip.
    Crosshair,
    /// Cursor position is shared and synced charts show their tooltip.
    Tooltip,
}
