use std::cell::Cell;
use std::rc::Rc;

use dashplot::api::{ConfigBuilder, ScaleProps, SeriesProps, X_SCALE_KEY};
use dashplot::core::{AlignedData, FixedClock, Viewport};
use dashplot::interaction::{
    GlobalEvent, GlobalEventKind, ListenerRegistry, SyncMode, TooltipController, TooltipOptions,
    TooltipPhase,
};
use dashplot::render::{
    BackendCall, ContainerId, HeadlessBackend, HeadlessInstance, PlotProps, PlotRenderer,
    RenderInstance,
};

struct Harness {
    builder: ConfigBuilder,
    renderer: PlotRenderer<HeadlessBackend>,
    backend: HeadlessBackend,
    instance: Rc<HeadlessInstance>,
    listeners: Rc<ListenerRegistry>,
    clock: Rc<FixedClock>,
    renders: Rc<Cell<usize>>,
    tooltip: TooltipController<Option<usize>>,
}

fn chart_data() -> AlignedData {
    AlignedData::new(
        vec![0.0, 60.0, 120.0],
        vec![
            vec![Some(1.0), Some(2.0), Some(3.0)],
            vec![Some(4.0), None, Some(6.0)],
        ],
    )
}

fn harness_with(options: TooltipOptions, page_origin: (f64, f64)) -> Harness {
    let clock = Rc::new(FixedClock::new(0));
    let mut builder = ConfigBuilder::new().with_clock(clock.clone());
    builder.add_scale(ScaleProps::new(X_SCALE_KEY).with_time(true));
    builder.add_scale(ScaleProps::new("y"));
    builder.add_series(SeriesProps::new("y", "cpu"));
    builder.add_series(SeriesProps::new("y", "mem"));

    let listeners = Rc::new(ListenerRegistry::new());
    let renders = Rc::new(Cell::new(0));
    let counter = Rc::clone(&renders);
    let tooltip = TooltipController::mount(
        &mut builder,
        options,
        listeners.clone(),
        Viewport::new(1000, 800),
        move |args| {
            counter.set(counter.get() + 1);
            args.focused_series_index
        },
    );

    let config = builder.get_config().expect("config");
    let backend = HeadlessBackend::new();
    backend.set_page_origin(page_origin.0, page_origin.1);
    let mut renderer = PlotRenderer::new(backend.clone());
    let data = chart_data();
    renderer
        .update(PlotProps {
            config: &config,
            data: &data,
            width: 600.0,
            height: 400.0,
            container: ContainerId(1),
        })
        .expect("create");
    let instance = backend.last_instance().expect("instance");

    Harness {
        builder,
        renderer,
        backend,
        instance,
        listeners,
        clock,
        renders,
        tooltip,
    }
}

fn harness() -> Harness {
    harness_with(TooltipOptions::default(), (0.0, 0.0))
}

fn hover(harness: &Harness, left: f64, top: f64, series_index: usize) {
    harness.instance.move_cursor(left, top, Some(0));
    harness.instance.set_focus(Some(series_index));
}

fn reset_cursor_calls(backend: &HeadlessBackend) -> usize {
    backend
        .calls()
        .iter()
        .filter(|call| matches!(call, BackendCall::ResetCursor { .. }))
        .count()
}

#[test]
fn hover_renders_on_next_tick() {
    let mut h = harness();
    h.tooltip.set_tooltip_size(200.0, 100.0);
    hover(&h, 50.0, 40.0, 1);

    assert_eq!(h.tooltip.phase(), TooltipPhase::Hovering);
    assert!(h.tooltip.has_pending_render());
    assert!(h.tooltip.tick(0));

    let view = h.tooltip.view();
    assert!(view.style.visible);
    assert_eq!(view.content, Some(Some(1)));
    assert_eq!((view.style.left, view.style.top), (60.0, 50.0));
    assert!(!h.tooltip.tick(16));
    assert_eq!(h.renders.get(), 1);
}

#[test]
fn reactivation_inside_debounce_renders_once() {
    let mut h = harness();
    hover(&h, 50.0, 40.0, 1);
    assert!(h.tooltip.tick(0));

    h.instance.leave_plot();
    assert_eq!(h.tooltip.phase(), TooltipPhase::Idle);
    h.clock.set(50);
    assert!(!h.tooltip.tick(50));

    hover(&h, 60.0, 40.0, 2);
    assert!(h.tooltip.tick(50));
    assert!(!h.tooltip.tick(150));

    assert_eq!(h.renders.get(), 2);
    assert!(h.tooltip.view().style.visible);
    assert_eq!(h.tooltip.view().content, Some(Some(2)));
}

#[test]
fn hover_out_hides_after_debounce() {
    let mut h = harness();
    hover(&h, 50.0, 40.0, 1);
    h.tooltip.tick(0);

    h.instance.leave_plot();
    assert!(!h.tooltip.tick(99));
    assert!(h.tooltip.tick(100));
    assert!(!h.tooltip.view().style.visible);
    assert_eq!(h.tooltip.view().content, None);
}

#[test]
fn tooltip_flips_near_window_edge() {
    let mut h = harness();
    h.tooltip.set_tooltip_size(300.0, 100.0);
    hover(&h, 900.0, 40.0, 1);
    h.tooltip.tick(0);
    assert_eq!(h.tooltip.view().style.left, 590.0);
}

#[test]
fn outside_pointer_down_unpins_and_resets_cursor() {
    let mut h = harness();
    hover(&h, 50.0, 40.0, 1);
    h.tooltip.tick(0);

    assert!(h.tooltip.plot_click());
    assert_eq!(h.tooltip.phase(), TooltipPhase::Pinned);
    assert_eq!(h.listeners.count(GlobalEventKind::PointerDown), 1);
    assert_eq!(h.listeners.count(GlobalEventKind::KeyDown), 1);
    h.tooltip.tick(0);
    assert!(h.tooltip.view().is_pinned);

    h.instance.leave_plot();
    assert!(h.tooltip.is_pinned());

    h.listeners.dispatch(&GlobalEvent::PointerDown {
        x: 10.0,
        y: 10.0,
        inside_tooltip: true,
    });
    assert!(h.tooltip.is_pinned());

    h.listeners.dispatch(&GlobalEvent::PointerDown {
        x: 900.0,
        y: 700.0,
        inside_tooltip: false,
    });
    assert!(!h.tooltip.is_pinned());
    assert_eq!(h.tooltip.phase(), TooltipPhase::Idle);
    assert_eq!(reset_cursor_calls(&h.backend), 1);
    assert_eq!(h.instance.cursor(), None);
    assert_eq!(h.listeners.count(GlobalEventKind::PointerDown), 0);
    assert_eq!(h.listeners.count(GlobalEventKind::KeyDown), 0);
}

#[test]
fn escape_key_outside_tooltip_unpins() {
    let mut h = harness();
    hover(&h, 50.0, 40.0, 1);
    h.tooltip.tick(0);
    h.tooltip.plot_click();

    h.listeners.dispatch(&GlobalEvent::KeyDown {
        key: "Escape".to_owned(),
        inside_tooltip: false,
    });
    assert!(!h.tooltip.is_pinned());
}

#[test]
fn dismiss_handle_unpins_on_next_tick() {
    let mut h = harness();
    hover(&h, 50.0, 40.0, 1);
    h.tooltip.tick(0);
    h.tooltip.plot_click();

    h.tooltip.dismiss_handle().dismiss();
    assert!(h.tooltip.is_pinned());
    h.tooltip.tick(16);
    assert!(!h.tooltip.is_pinned());
    assert_eq!(reset_cursor_calls(&h.backend), 1);
}

#[test]
fn pinning_requires_hover_and_permission() {
    let h = harness();
    assert!(!h.tooltip.plot_click());

    let h = harness_with(TooltipOptions::default().with_can_pin(false), (0.0, 0.0));
    hover(&h, 50.0, 40.0, 1);
    assert!(!h.tooltip.plot_click());
    assert_eq!(h.tooltip.phase(), TooltipPhase::Hovering);
}

#[test]
fn new_data_unpins_without_cursor_reset() {
    let mut h = harness();
    hover(&h, 50.0, 40.0, 1);
    h.tooltip.tick(0);
    h.tooltip.plot_click();

    let config = h.builder.get_config().expect("config");
    let data = AlignedData::new(vec![0.0, 60.0], vec![vec![Some(9.0), Some(8.0)]; 2]);
    h.renderer
        .update(PlotProps {
            config: &config,
            data: &data,
            width: 600.0,
            height: 400.0,
            container: ContainerId(1),
        })
        .expect("set data");

    assert!(!h.tooltip.is_pinned());
    assert_eq!(reset_cursor_calls(&h.backend), 0);
    assert_eq!(h.listeners.count(GlobalEventKind::PointerDown), 0);
}

#[test]
fn window_resize_hides_hovering_tooltip() {
    let mut h = harness();
    hover(&h, 50.0, 40.0, 1);
    h.tooltip.tick(0);

    h.listeners.dispatch(&GlobalEvent::Resize {
        width: 1200,
        height: 900,
    });
    assert_eq!(h.tooltip.phase(), TooltipPhase::Idle);
    assert!(h.tooltip.tick(100));
    assert!(!h.tooltip.view().style.visible);
}

#[test]
fn crosshair_sync_suppresses_tooltip() {
    let mut h = harness_with(
        TooltipOptions::default().with_sync(SyncMode::Crosshair, "dash"),
        (0.0, 0.0),
    );
    let config = h.builder.get_config().expect("config");
    assert_eq!(config.cursor.sync.expect("sync").key, "dash");

    h.instance.sync_cursor(50.0, 40.0, Some(1));
    assert_eq!(h.tooltip.phase(), TooltipPhase::Idle);
    h.tooltip.tick(100);
    assert!(!h.tooltip.view().style.visible);
    assert_eq!(h.renders.get(), 0);
}

#[test]
fn tooltip_sync_shows_synced_tooltip_while_on_screen() {
    let mut h = harness_with(
        TooltipOptions::default().with_sync(SyncMode::Tooltip, "dash"),
        (0.0, 0.0),
    );
    h.instance.sync_cursor(50.0, 40.0, Some(2));
    assert_eq!(h.tooltip.phase(), TooltipPhase::Hovering);
    assert!(h.tooltip.tick(0));
    assert!(h.tooltip.view().style.visible);
    assert_eq!(h.renders.get(), 1);
}

#[test]
fn off_screen_chart_ignores_synced_cursor() {
    let mut h = harness_with(
        TooltipOptions::default().with_sync(SyncMode::Tooltip, "dash"),
        (0.0, 2_000.0),
    );
    assert!(h.tooltip.in_viewport());
    h.tooltip.tick(200);
    assert!(!h.tooltip.in_viewport());

    h.instance.sync_cursor(50.0, 40.0, Some(1));
    assert_eq!(h.tooltip.phase(), TooltipPhase::Idle);
    h.tooltip.tick(400);
    assert!(!h.tooltip.view().style.visible);
}

#[test]
fn unmount_detaches_hooks_and_listeners() {
    let mut h = harness();
    assert_eq!(h.builder.hooks().len(), 7);
    assert_eq!(h.listeners.len(), 2);

    hover(&h, 50.0, 40.0, 1);
    h.tooltip.tick(0);
    h.tooltip.plot_click();
    assert_eq!(h.listeners.len(), 4);

    h.tooltip.unmount();
    assert!(h.builder.hooks().is_empty());
    assert!(h.listeners.is_empty());
    assert!(!h.tooltip.has_pending_render());

    hover(&h, 50.0, 40.0, 1);
    assert!(!h.tooltip.tick(16));
    assert_eq!(h.tooltip.view().content, None);
}

#[test]
fn destroyed_instance_resets_tooltip() {
    let mut h = harness();
    hover(&h, 50.0, 40.0, 1);
    h.tooltip.tick(0);
    h.tooltip.plot_click();

    h.renderer.unmount();
    assert_eq!(h.tooltip.phase(), TooltipPhase::Idle);
    assert_eq!(h.listeners.count(GlobalEventKind::PointerDown), 0);
}
