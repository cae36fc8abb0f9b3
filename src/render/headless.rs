use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::api::{HookEvent, HookRegistry, PlotConfig, Selection};
use crate::core::{AlignedData, Rect, Viewport};
use crate::error::{ChartError, ChartResult};

use super::{ContainerId, InstanceId, RenderBackend, RenderInstance, SeriesChange, SharedInstance};

/// Call recorded by the headless backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Create {
        instance: InstanceId,
        container: ContainerId,
        size: Viewport,
    },
    SetSize {
        instance: InstanceId,
        size: Viewport,
    },
    SetData {
        instance: InstanceId,
        points: usize,
    },
    SetSeries {
        instance: InstanceId,
        series_index: usize,
        show: bool,
    },
    SetFocus {
        instance: InstanceId,
        series_index: Option<usize>,
    },
    ResetCursor {
        instance: InstanceId,
    },
    Destroy {
        instance: InstanceId,
    },
}

#[derive(Default)]
struct HeadlessShared {
    calls: RefCell<Vec<BackendCall>>,
    next_id: Cell<u64>,
    instances: RefCell<Vec<Rc<HeadlessInstance>>>,
    page_origin: Cell<(f64, f64)>,
}

impl HeadlessShared {
    fn record(&self, call: BackendCall) {
        self.calls.borrow_mut().push(call);
    }
}

/// Backend without a drawing surface, used by tests and server-side
/// configuration checks.
///
/// Every call is recorded; clones share the same log so a test can keep a
/// handle while a `PlotRenderer` owns the backend.
#[derive(Clone, Default)]
pub struct HeadlessBackend {
    shared: Rc<HeadlessShared>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page position of every instance's plot area created from now on.
    pub fn set_page_origin(&self, left: f64, top: f64) {
        self.shared.page_origin.set((left, top));
    }

    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.shared.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.shared.calls.borrow_mut().clear();
    }

    #[must_use]
    pub fn create_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::Create { .. }))
    }

    #[must_use]
    pub fn destroy_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::Destroy { .. }))
    }

    #[must_use]
    pub fn resize_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::SetSize { .. }))
    }

    #[must_use]
    pub fn set_data_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::SetData { .. }))
    }

    fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.shared
            .calls
            .borrow()
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    /// Most recently created instance.
    #[must_use]
    pub fn last_instance(&self) -> Option<Rc<HeadlessInstance>> {
        self.shared.instances.borrow().last().cloned()
    }

    #[must_use]
    pub fn live_instances(&self) -> usize {
        self.shared
            .instances
            .borrow()
            .iter()
            .filter(|instance| !instance.is_destroyed())
            .count()
    }
}

impl RenderBackend for HeadlessBackend {
    fn create(
        &mut self,
        config: &PlotConfig,
        data: &AlignedData,
        size: Viewport,
        container: ContainerId,
    ) -> ChartResult<SharedInstance> {
        if !size.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: size.width,
                height: size.height,
            });
        }
        let id = InstanceId(self.shared.next_id.get() + 1);
        self.shared.next_id.set(id.0);

        let instance = Rc::new_cyclic(|this| HeadlessInstance {
            id,
            container,
            backend: Rc::clone(&self.shared),
            hooks: config.hooks.clone(),
            size: Cell::new(size),
            data: RefCell::new(data.clone()),
            series_show: RefCell::new(config.series.iter().map(|series| series.show).collect()),
            focus: Cell::new(None),
            cursor: Cell::new(None),
            destroyed: Cell::new(false),
            page_origin: self.shared.page_origin.get(),
            this: this.clone(),
        });
        self.shared.record(BackendCall::Create {
            instance: id,
            container,
            size,
        });
        self.shared
            .instances
            .borrow_mut()
            .push(Rc::clone(&instance));

        instance.emit(|instance| HookEvent::Init { instance });
        instance.emit(|instance| HookEvent::Ready { instance });
        let shared: SharedInstance = instance;
        Ok(shared)
    }
}

/// Headless render instance. Besides the `RenderInstance` contract it can
/// simulate pointer activity so interaction code can be driven in tests.
pub struct HeadlessInstance {
    id: InstanceId,
    container: ContainerId,
    backend: Rc<HeadlessShared>,
    hooks: HookRegistry,
    size: Cell<Viewport>,
    data: RefCell<AlignedData>,
    series_show: RefCell<Vec<bool>>,
    focus: Cell<Option<usize>>,
    cursor: Cell<Option<(f64, f64)>>,
    destroyed: Cell<bool>,
    page_origin: (f64, f64),
    this: Weak<HeadlessInstance>,
}

impl HeadlessInstance {
    fn emit(&self, make: impl FnOnce(SharedInstance) -> HookEvent) {
        let Some(instance) = self.this.upgrade() else {
            return;
        };
        let instance: SharedInstance = instance;
        self.hooks.dispatch(&make(instance));
    }

    #[must_use]
    pub fn data(&self) -> AlignedData {
        self.data.borrow().clone()
    }

    #[must_use]
    pub fn series_visible(&self, series_index: usize) -> Option<bool> {
        series_index
            .checked_sub(1)
            .and_then(|position| self.series_show.borrow().get(position).copied())
    }

    #[must_use]
    pub fn focused(&self) -> Option<usize> {
        self.focus.get()
    }

    #[must_use]
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor.get()
    }

    /// Moves the local cursor to plot pixels `(left, top)` over the sample
    /// at `data_index`.
    pub fn move_cursor(&self, left: f64, top: f64, data_index: Option<usize>) {
        self.emit_cursor(Some((left, top)), data_index, false);
    }

    /// Applies a cursor position received from another synced chart.
    pub fn sync_cursor(&self, left: f64, top: f64, data_index: Option<usize>) {
        self.emit_cursor(Some((left, top)), data_index, true);
    }

    pub fn leave_plot(&self) {
        self.emit_cursor(None, None, false);
    }

    /// Drag-selects `width_px` pixels starting at `left_px`.
    pub fn select(&self, left_px: f64, width_px: f64) {
        let (start, end) = {
            let data = self.data.borrow();
            let (x_min, x_max) = data.x_bounds().unwrap_or((0.0, 0.0));
            let width = f64::from(self.size.get().width).max(1.0);
            let to_value = |px: f64| x_min + px / width * (x_max - x_min);
            (to_value(left_px), to_value(left_px + width_px))
        };
        self.emit(|instance| HookEvent::SetSelect {
            instance,
            selection: Selection {
                left_px,
                width_px,
                start,
                end,
            },
        });
    }

    fn emit_cursor(&self, position: Option<(f64, f64)>, data_index: Option<usize>, via_sync: bool) {
        self.cursor.set(position);
        let data_indexes = self.data_indexes_at(data_index);
        self.emit(|instance| HookEvent::SetCursor {
            instance,
            left: position.map(|(left, _)| left),
            top: position.map(|(_, top)| top),
            via_sync,
        });
        self.emit(|instance| HookEvent::SetLegend {
            instance,
            data_indexes,
            via_sync,
        });
    }

    /// Per-series active index: the sample index where the series has a
    /// value, `None` elsewhere. Index 0 is the X column.
    fn data_indexes_at(&self, data_index: Option<usize>) -> Vec<Option<usize>> {
        let data = self.data.borrow();
        let mut indexes = Vec::with_capacity(data.series_count() + 1);
        indexes.push(data_index.filter(|&index| index < data.len()));
        for series_index in 1..=data.series_count() {
            let active = data_index.filter(|&index| {
                data.column(series_index)
                    .and_then(|column| column.get(index))
                    .is_some_and(Option::is_some)
            });
            indexes.push(active);
        }
        indexes
    }
}

impl RenderInstance for HeadlessInstance {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn container(&self) -> ContainerId {
        self.container
    }

    fn size(&self) -> Viewport {
        self.size.get()
    }

    fn set_size(&self, size: Viewport) {
        self.size.set(size);
        self.backend.record(BackendCall::SetSize {
            instance: self.id,
            size,
        });
        self.emit(|instance| HookEvent::SetSize { instance });
    }

    fn set_data(&self, data: &AlignedData) {
        *self.data.borrow_mut() = data.clone();
        self.backend.record(BackendCall::SetData {
            instance: self.id,
            points: data.len(),
        });
        self.emit(|instance| HookEvent::SetData { instance });
    }

    fn set_series(&self, series_index: usize, show: bool) {
        if let Some(position) = series_index.checked_sub(1) {
            if let Some(slot) = self.series_show.borrow_mut().get_mut(position) {
                *slot = show;
            }
        }
        self.backend.record(BackendCall::SetSeries {
            instance: self.id,
            series_index,
            show,
        });
        self.emit(|instance| HookEvent::SetSeries {
            instance,
            series_index: Some(series_index),
            change: SeriesChange::Show(show),
        });
    }

    fn set_focus(&self, series_index: Option<usize>) {
        self.focus.set(series_index);
        self.backend.record(BackendCall::SetFocus {
            instance: self.id,
            series_index,
        });
        self.emit(|instance| HookEvent::SetSeries {
            instance,
            series_index,
            change: SeriesChange::Focus,
        });
    }

    fn reset_cursor(&self) {
        self.backend
            .record(BackendCall::ResetCursor { instance: self.id });
        self.emit_cursor(None, None, false);
    }

    fn plot_rect(&self) -> Rect {
        let size = self.size.get();
        Rect::new(
            self.page_origin.0,
            self.page_origin.1,
            f64::from(size.width),
            f64::from(size.height),
        )
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.backend.record(BackendCall::Destroy { instance: self.id });
        self.emit(|instance| HookEvent::Destroy { instance });
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}
