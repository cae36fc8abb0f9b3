//! Tooltip interaction state machine.
//!
//! `Idle -> Hovering` on a focused series, `Hovering -> Pinned` on a plot
//! click, and back to `Idle` on hover-out, outside clicks, data replacement,
//! window resize or dismissal. Hook and listener handlers only mutate state
//! and schedule work; the render callback runs from `tick`, at most once per
//! frame.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::{ConfigBuilder, HookEvent, HookHandle, HookKind};
use crate::core::{Clock, Viewport};
use crate::render::{SeriesChange, SharedInstance};

use super::{
    DEFAULT_PLACEMENT_GAP_PX, DEFAULT_VIEWPORT_PROBE_DEBOUNCE_MS, GlobalEvent, GlobalEventKind,
    GlobalListeners, ListenerToken, PlacementState, RenderSchedule, SyncMode, ViewportProbe,
    place_tooltip,
};

pub const DEFAULT_DEACTIVATE_DEBOUNCE_MS: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipOptions {
    pub can_pin: bool,
    pub sync_mode: SyncMode,
    pub sync_key: Option<String>,
    pub deactivate_debounce_ms: i64,
    pub placement_gap_px: f64,
    pub viewport_probe_debounce_ms: i64,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            can_pin: true,
            sync_mode: SyncMode::None,
            sync_key: None,
            deactivate_debounce_ms: DEFAULT_DEACTIVATE_DEBOUNCE_MS,
            placement_gap_px: DEFAULT_PLACEMENT_GAP_PX,
            viewport_probe_debounce_ms: DEFAULT_VIEWPORT_PROBE_DEBOUNCE_MS,
        }
    }
}

impl TooltipOptions {
    #[must_use]
    pub fn with_sync(mut self, sync_mode: SyncMode, sync_key: impl Into<String>) -> Self {
        self.sync_mode = sync_mode;
        self.sync_key = Some(sync_key.into());
        self
    }

    #[must_use]
    pub fn with_can_pin(mut self, can_pin: bool) -> Self {
        self.can_pin = can_pin;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TooltipPhase {
    Idle,
    Hovering,
    Pinned,
}

/// Request flag handed to tooltip content so it can close a pinned
/// tooltip; applied on the next tick.
#[derive(Debug, Clone, Default)]
pub struct DismissHandle(Rc<Cell<bool>>);

impl DismissHandle {
    pub fn dismiss(&self) {
        self.0.set(true);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

#[derive(Clone)]
pub struct TooltipRenderArgs {
    pub instance: Option<SharedInstance>,
    /// Active data index per series, index 0 being the X column.
    pub data_indexes: Vec<Option<usize>>,
    pub focused_series_index: Option<usize>,
    pub is_pinned: bool,
    pub dismiss: DismissHandle,
    pub via_sync: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TooltipStyle {
    pub left: f64,
    pub top: f64,
    pub visible: bool,
    pub pinned: bool,
}

/// Snapshot pushed to the presentation layer after each render.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipViewState<T> {
    pub style: TooltipStyle,
    pub content: Option<T>,
    pub is_pinned: bool,
}

impl<T> Default for TooltipViewState<T> {
    fn default() -> Self {
        Self {
            style: TooltipStyle::default(),
            content: None,
            is_pinned: false,
        }
    }
}

struct TooltipState {
    options: TooltipOptions,
    instance: Option<SharedInstance>,
    hovering: bool,
    pinned: bool,
    focused_series: Option<usize>,
    data_indexes: Vec<Option<usize>>,
    cursor: Option<(f64, f64)>,
    via_sync: bool,
    placement: PlacementState,
    window: Viewport,
    probe: ViewportProbe,
    schedule: RenderSchedule,
    pin_listeners: Vec<ListenerToken>,
}

impl TooltipState {
    fn new(options: TooltipOptions, window: Viewport) -> Self {
        let probe = ViewportProbe::new(options.viewport_probe_debounce_ms);
        Self {
            options,
            instance: None,
            hovering: false,
            pinned: false,
            focused_series: None,
            data_indexes: Vec::new(),
            cursor: None,
            via_sync: false,
            placement: PlacementState::default(),
            window,
            probe,
            schedule: RenderSchedule::new(),
            pin_listeners: Vec::new(),
        }
    }

    fn phase(&self) -> TooltipPhase {
        if self.pinned {
            TooltipPhase::Pinned
        } else if self.hovering {
            TooltipPhase::Hovering
        } else {
            TooltipPhase::Idle
        }
    }

    fn is_active(&self) -> bool {
        self.hovering || self.pinned
    }

    /// A synced cursor only shows a tooltip in `Tooltip` mode while the chart
    /// is on screen.
    fn sync_suppressed(&self) -> bool {
        self.via_sync
            && (self.options.sync_mode != SyncMode::Tooltip || !self.probe.in_viewport())
    }

    fn schedule_render(&mut self, now_ms: i64) {
        if self.is_active() {
            trace!("tooltip render scheduled for next frame");
            self.schedule.schedule_next_frame();
        } else {
            trace!("tooltip hide debounced");
            self.schedule
                .schedule_debounced(now_ms, self.options.deactivate_debounce_ms);
        }
    }

    /// Clears per-instance state; returns pin listeners to detach.
    fn reset(&mut self, instance: Option<SharedInstance>) -> Vec<ListenerToken> {
        self.instance = instance;
        self.hovering = false;
        self.pinned = false;
        self.focused_series = None;
        self.data_indexes.clear();
        self.cursor = None;
        self.via_sync = false;
        self.placement = PlacementState::default();
        std::mem::take(&mut self.pin_listeners)
    }
}

struct TooltipShared {
    state: RefCell<TooltipState>,
    clock: Rc<dyn Clock>,
    listeners: Weak<dyn GlobalListeners>,
}

impl TooltipShared {
    fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    fn detach(&self, tokens: Vec<ListenerToken>) {
        if tokens.is_empty() {
            return;
        }
        if let Some(listeners) = self.listeners.upgrade() {
            for token in tokens {
                listeners.remove(token);
            }
        }
    }

    fn pin(self: &Rc<Self>) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let tokens = [GlobalEventKind::PointerDown, GlobalEventKind::KeyDown]
            .into_iter()
            .map(|kind| {
                let shared = Rc::clone(self);
                listeners.add(
                    kind,
                    Box::new(move |event: &GlobalEvent| shared.handle_outside(event)),
                )
            })
            .collect::<Vec<_>>();

        let now = self.now();
        let mut state = self.state.borrow_mut();
        state.pinned = true;
        state.pin_listeners.extend(tokens);
        state.schedule_render(now);
        debug!("tooltip pinned");
    }

    /// Leaves `Pinned`; optionally moves the instance cursor off the plot.
    fn unpin(&self, reset_cursor: bool) {
        let now = self.now();
        let (tokens, instance) = {
            let mut state = self.state.borrow_mut();
            if !state.pinned {
                return;
            }
            state.pinned = false;
            state.hovering = false;
            state.schedule_render(now);
            (
                std::mem::take(&mut state.pin_listeners),
                state.instance.clone(),
            )
        };
        debug!(reset_cursor, "tooltip unpinned");
        self.detach(tokens);
        if reset_cursor {
            if let Some(instance) = instance {
                instance.reset_cursor();
            }
        }
    }

    fn handle_outside(&self, event: &GlobalEvent) {
        let inside = match event {
            GlobalEvent::PointerDown { inside_tooltip, .. }
            | GlobalEvent::KeyDown { inside_tooltip, .. } => *inside_tooltip,
            GlobalEvent::Resize { .. } | GlobalEvent::Scroll => return,
        };
        if !inside {
            self.unpin(true);
        }
    }

    fn handle_global(&self, event: &GlobalEvent) {
        let now = self.now();
        let mut state = self.state.borrow_mut();
        match event {
            GlobalEvent::Resize { width, height } => {
                state.window = Viewport::new(*width, *height);
                state.probe.request(now);
                if state.hovering && !state.pinned {
                    state.hovering = false;
                    state.schedule_render(now);
                }
            }
            GlobalEvent::Scroll => state.probe.request(now),
            GlobalEvent::PointerDown { .. } | GlobalEvent::KeyDown { .. } => {}
        }
    }

    fn handle_hook(&self, event: &HookEvent) {
        let now = self.now();
        match event {
            HookEvent::Init { instance } => {
                let tokens = {
                    let mut state = self.state.borrow_mut();
                    let tokens = state.reset(Some(Rc::clone(instance)));
                    state.probe.request(now);
                    state.schedule_render(now);
                    tokens
                };
                self.detach(tokens);
            }
            HookEvent::Ready { .. } => self.state.borrow_mut().probe.request(now),
            HookEvent::SetData { .. } => {
                if self.state.borrow().pinned {
                    self.unpin(false);
                }
            }
            HookEvent::SetSeries {
                series_index,
                change: SeriesChange::Focus,
                ..
            } => {
                let mut state = self.state.borrow_mut();
                if state.pinned {
                    return;
                }
                state.focused_series = *series_index;
                state.hovering = series_index.is_some() && !state.sync_suppressed();
                state.schedule_render(now);
            }
            HookEvent::SetLegend {
                data_indexes,
                via_sync,
                ..
            } => {
                let mut state = self.state.borrow_mut();
                if state.pinned {
                    return;
                }
                state.data_indexes.clone_from(data_indexes);
                state.via_sync = *via_sync;
                let any_active = data_indexes.iter().skip(1).any(Option::is_some);
                if *via_sync {
                    state.hovering = any_active && !state.sync_suppressed();
                } else if !any_active {
                    state.hovering = false;
                }
                state.schedule_render(now);
            }
            HookEvent::SetCursor {
                left,
                top,
                via_sync,
                ..
            } => {
                let mut state = self.state.borrow_mut();
                if state.pinned {
                    return;
                }
                state.via_sync = *via_sync;
                state.cursor = left.zip(*top);
                if state.cursor.is_none() || state.sync_suppressed() {
                    state.hovering = false;
                }
                state.schedule_render(now);
            }
            HookEvent::Destroy { instance } => {
                let tokens = {
                    let mut state = self.state.borrow_mut();
                    let is_current = state
                        .instance
                        .as_ref()
                        .is_some_and(|current| current.id() == instance.id());
                    if !is_current {
                        return;
                    }
                    let tokens = state.reset(None);
                    state.schedule_render(now);
                    tokens
                };
                self.detach(tokens);
            }
            HookEvent::SetSeries { .. } | HookEvent::SetSize { .. } | HookEvent::SetSelect { .. } => {}
        }
    }
}

const TOOLTIP_HOOKS: [HookKind; 7] = [
    HookKind::Init,
    HookKind::Ready,
    HookKind::SetData,
    HookKind::SetSeries,
    HookKind::SetLegend,
    HookKind::SetCursor,
    HookKind::Destroy,
];

/// Tooltip controller attached to one chart's hooks.
///
/// `T` is whatever the render callback produces for the presentation layer.
pub struct TooltipController<T> {
    shared: Rc<TooltipShared>,
    listeners: Rc<dyn GlobalListeners>,
    hook_handles: Vec<HookHandle>,
    listener_tokens: Vec<ListenerToken>,
    render: Box<dyn FnMut(&TooltipRenderArgs) -> T>,
    dismiss: DismissHandle,
    tooltip_size: (f64, f64),
    view: TooltipViewState<T>,
}

impl<T> TooltipController<T> {
    /// Registers hooks on `builder` and window listeners on `listeners`.
    ///
    /// With a sync mode and key set, the builder's cursor is synced when its
    /// X scale is time-based.
    pub fn mount<F>(
        builder: &mut ConfigBuilder,
        options: TooltipOptions,
        listeners: Rc<dyn GlobalListeners>,
        window: Viewport,
        render: F,
    ) -> Self
    where
        F: FnMut(&TooltipRenderArgs) -> T + 'static,
    {
        if options.sync_mode != SyncMode::None {
            if let Some(key) = options.sync_key.clone() {
                if !builder.enable_cursor_sync(key) {
                    debug!("cursor sync skipped: x scale is not time-based");
                }
            }
        }

        let clock = builder.clock();
        let now = clock.now_ms();
        let mut state = TooltipState::new(options, window);
        state.probe.request(now);
        let shared = Rc::new(TooltipShared {
            state: RefCell::new(state),
            clock,
            listeners: Rc::downgrade(&listeners),
        });

        let hook_handles = TOOLTIP_HOOKS
            .into_iter()
            .map(|kind| {
                let shared = Rc::clone(&shared);
                builder.add_hook(kind, move |event| shared.handle_hook(event))
            })
            .collect();

        let listener_tokens = [GlobalEventKind::Resize, GlobalEventKind::Scroll]
            .into_iter()
            .map(|kind| {
                let shared = Rc::clone(&shared);
                listeners.add(
                    kind,
                    Box::new(move |event: &GlobalEvent| shared.handle_global(event)),
                )
            })
            .collect();

        Self {
            shared,
            listeners,
            hook_handles,
            listener_tokens,
            render: Box::new(render),
            dismiss: DismissHandle::default(),
            tooltip_size: (0.0, 0.0),
            view: TooltipViewState::default(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> TooltipPhase {
        self.shared.state.borrow().phase()
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.shared.state.borrow().pinned
    }

    #[must_use]
    pub fn in_viewport(&self) -> bool {
        self.shared.state.borrow().probe.in_viewport()
    }

    #[must_use]
    pub fn has_pending_render(&self) -> bool {
        self.shared.state.borrow().schedule.is_pending()
    }

    #[must_use]
    pub fn view(&self) -> &TooltipViewState<T> {
        &self.view
    }

    #[must_use]
    pub fn dismiss_handle(&self) -> DismissHandle {
        self.dismiss.clone()
    }

    /// Rendered tooltip size, reported by the host after layout.
    pub fn set_tooltip_size(&mut self, width: f64, height: f64) {
        self.tooltip_size = (width.max(0.0), height.max(0.0));
    }

    /// Click on the plot surface: pins a hovering tooltip when allowed.
    pub fn plot_click(&self) -> bool {
        let can_pin = {
            let state = self.shared.state.borrow();
            state.options.can_pin && state.hovering && !state.pinned
        };
        if can_pin {
            self.shared.pin();
        }
        can_pin
    }

    /// Closes a pinned tooltip and resets the cursor.
    pub fn dismiss(&self) {
        self.shared.unpin(true);
    }

    /// Runs due probe and render work. Returns `true` when the view was
    /// re-rendered.
    pub fn tick(&mut self, now_ms: i64) -> bool {
        if self.dismiss.take() {
            self.shared.unpin(true);
        }

        let args = {
            let mut state = self.shared.state.borrow_mut();
            let plot_rect = state.instance.as_ref().map(|instance| instance.plot_rect());
            if let Some(plot_rect) = plot_rect {
                let window = state.window;
                if let Some(in_viewport) = state.probe.tick(now_ms, plot_rect, window) {
                    debug!(in_viewport, "chart viewport visibility changed");
                    if !in_viewport && state.via_sync && !state.pinned {
                        state.hovering = false;
                        state.schedule_render(now_ms);
                    }
                }
            }

            if !state.schedule.take_due(now_ms) {
                return false;
            }

            let visible = state.pinned || (state.hovering && !state.sync_suppressed());
            let mut style = TooltipStyle {
                left: self.view.style.left,
                top: self.view.style.top,
                visible,
                pinned: state.pinned,
            };
            if let (Some((left, top)), Some(plot_rect)) = (state.cursor, plot_rect) {
                let window = state.window;
                let gap = state.options.placement_gap_px;
                let placement = place_tooltip(
                    &mut state.placement,
                    plot_rect.left + left,
                    plot_rect.top + top,
                    self.tooltip_size,
                    window,
                    gap,
                );
                style.left = placement.left;
                style.top = placement.top;
            }

            let args = visible.then(|| TooltipRenderArgs {
                instance: state.instance.clone(),
                data_indexes: state.data_indexes.clone(),
                focused_series_index: state.focused_series,
                is_pinned: state.pinned,
                dismiss: self.dismiss.clone(),
                via_sync: state.via_sync,
            });
            self.view.style = style;
            self.view.is_pinned = state.pinned;
            args
        };

        self.view.content = args.map(|args| (self.render)(&args));
        true
    }

    /// Removes every hook and listener and drops pending work.
    pub fn unmount(&mut self) {
        for handle in self.hook_handles.drain(..) {
            handle.remove();
        }
        for token in self.listener_tokens.drain(..) {
            self.listeners.remove(token);
        }
        let pin_tokens = {
            let mut state = self.shared.state.borrow_mut();
            state.schedule.cancel();
            state.probe.cancel();
            state.reset(None)
        };
        for token in pin_tokens {
            self.listeners.remove(token);
        }
        self.view = TooltipViewState::default();
    }
}

impl<T> Drop for TooltipController<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}
