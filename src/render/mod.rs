mod headless;
mod plot_renderer;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use headless::{BackendCall, HeadlessBackend, HeadlessInstance};
pub use plot_renderer::{PlotProps, PlotRenderer, PlotUpdate, PlotView};

use crate::api::PlotConfig;
use crate::core::{AlignedData, Rect, Viewport};
use crate::error::ChartResult;

/// Identity of the host element a render instance is mounted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

/// Series change reported through the `SetSeries` hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesChange {
    Focus,
    Show(bool),
}

/// A live plot surface created by a `RenderBackend`.
///
/// Instances are shared between the renderer, the plot context and hook
/// consumers, so every method takes `&self`; implementations keep their
/// mutable state behind cells and must not hold a borrow while emitting
/// hook events.
pub trait RenderInstance {
    fn id(&self) -> InstanceId;
    fn container(&self) -> ContainerId;
    fn size(&self) -> Viewport;
    fn set_size(&self, size: Viewport);
    fn set_data(&self, data: &AlignedData);
    /// Shows or hides the 1-based `series_index`.
    fn set_series(&self, series_index: usize, show: bool);
    /// Highlights one series, `None` clears focus.
    fn set_focus(&self, series_index: Option<usize>);
    /// Moves the cursor off the plot.
    fn reset_cursor(&self);
    /// Plot area in page coordinates.
    fn plot_rect(&self) -> Rect;
    fn destroy(&self);
    fn is_destroyed(&self) -> bool;
}

pub type SharedInstance = Rc<dyn RenderInstance>;

/// Contract implemented by the underlying plotting library.
pub trait RenderBackend {
    /// Creates and mounts a new instance. Implementations emit the `Init`
    /// and `Ready` hooks of `config`.
    fn create(
        &mut self,
        config: &PlotConfig,
        data: &AlignedData,
        size: Viewport,
        container: ContainerId,
    ) -> ChartResult<SharedInstance>;
}
