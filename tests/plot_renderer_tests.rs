use std::cell::RefCell;
use std::rc::Rc;

use dashplot::api::{ConfigBuilder, HookKind, ScaleProps, SeriesProps, X_SCALE_KEY};
use dashplot::core::{AlignedData, Viewport};
use dashplot::render::{
    BackendCall, ContainerId, HeadlessBackend, PlotProps, PlotRenderer, PlotUpdate, PlotView,
};
use dashplot::{ChartError, PlotConfig};

fn builder() -> ConfigBuilder {
    let mut builder = ConfigBuilder::new();
    builder.add_scale(ScaleProps::new(X_SCALE_KEY).with_time(true));
    builder.add_scale(ScaleProps::new("y"));
    builder.add_series(SeriesProps::new("y", "requests"));
    builder
}

fn data() -> AlignedData {
    AlignedData::from_columns(vec![vec![0.0, 60.0, 120.0], vec![1.0, f64::NAN, 3.0]])
        .expect("valid columns")
}

fn props<'a>(
    config: &'a PlotConfig,
    data: &'a AlignedData,
    width: f64,
    height: f64,
) -> PlotProps<'a> {
    PlotProps {
        config,
        data,
        width,
        height,
        container: ContainerId(1),
    }
}

#[test]
fn first_update_creates_instance_with_floored_size() {
    let builder = builder();
    let config = builder.get_config().expect("config");
    let data = data();
    let backend = HeadlessBackend::new();
    let mut renderer = PlotRenderer::new(backend.clone());

    let update = renderer
        .update(props(&config, &data, 600.0, 400.0))
        .expect("update");

    assert_eq!(update, PlotUpdate::Created);
    assert_eq!(backend.create_count(), 1);
    let instance = renderer.instance().expect("instance");
    assert_eq!(instance.size(), Viewport::new(600, 400));
    assert_eq!(
        renderer.view(),
        PlotView::Surface {
            instance: instance.id(),
            size: Viewport::new(600, 400),
        }
    );
    assert!(builder.plot_context().instance().is_some());
}

#[test]
fn fractional_resize_updates_size_in_place() {
    let builder = builder();
    let config = builder.get_config().expect("config");
    let data = data();
    let backend = HeadlessBackend::new();
    let mut renderer = PlotRenderer::new(backend.clone());
    renderer
        .update(props(&config, &data, 600.0, 400.0))
        .expect("create");

    let update = renderer
        .update(props(&config, &data, 800.7, 500.3))
        .expect("resize");

    assert_eq!(update, PlotUpdate::Resized);
    assert_eq!(backend.create_count(), 1);
    assert_eq!(backend.resize_count(), 1);
    assert!(backend.calls().contains(&BackendCall::SetSize {
        instance: renderer.instance().expect("instance").id(),
        size: Viewport::new(800, 500),
    }));

    let update = renderer
        .update(props(&config, &data, 800.2, 500.9))
        .expect("same floored size");
    assert_eq!(update, PlotUpdate::Unchanged);
    assert_eq!(backend.resize_count(), 1);
}

#[test]
fn empty_data_destroys_instance_and_shows_placeholder() {
    let builder = builder();
    let config = builder.get_config().expect("config");
    let data = data();
    let empty = AlignedData::from_columns(vec![vec![]]).expect("empty columns");
    let backend = HeadlessBackend::new();
    let mut renderer = PlotRenderer::new(backend.clone());
    renderer
        .update(props(&config, &data, 800.0, 500.0))
        .expect("create");

    let update = renderer
        .update(props(&config, &empty, 800.0, 500.0))
        .expect("empty");

    assert_eq!(update, PlotUpdate::NoData);
    assert_eq!(backend.destroy_count(), 1);
    assert_eq!(backend.live_instances(), 0);
    assert!(renderer.instance().is_none());
    assert!(builder.plot_context().instance().is_none());
    assert_eq!(
        renderer.view(),
        PlotView::NoData {
            width: 800,
            height: 500,
        }
    );

    let update = renderer
        .update(props(&config, &data, 800.0, 500.0))
        .expect("data back");
    assert_eq!(update, PlotUpdate::Created);
    assert_eq!(backend.create_count(), 2);
}

#[test]
fn config_change_recreates_instance() {
    let mut builder = builder();
    let config = builder.get_config().expect("config");
    let data = data();
    let backend = HeadlessBackend::new();
    let destroyed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&destroyed);
    let mut renderer = PlotRenderer::new(backend.clone())
        .with_on_destroy(move |instance| sink.borrow_mut().push(instance.id()));
    renderer
        .update(props(&config, &data, 600.0, 400.0))
        .expect("create");
    let first = renderer.instance().expect("instance").id();

    let same = builder.get_config().expect("config");
    assert_eq!(
        renderer
            .update(props(&same, &data, 600.0, 400.0))
            .expect("same config"),
        PlotUpdate::Unchanged
    );

    builder.add_series(SeriesProps::new("y", "errors"));
    let changed = builder.get_config().expect("config");
    let update = renderer
        .update(props(&changed, &data, 600.0, 400.0))
        .expect("recreate");

    assert_eq!(update, PlotUpdate::Recreated);
    assert_eq!(backend.create_count(), 2);
    assert_eq!(*destroyed.borrow(), vec![first]);
    assert_ne!(renderer.instance().expect("instance").id(), first);
}

#[test]
fn data_change_is_pushed_without_recreate() {
    let builder = builder();
    let config = builder.get_config().expect("config");
    let data = data();
    let backend = HeadlessBackend::new();
    let mut renderer = PlotRenderer::new(backend.clone());
    renderer
        .update(props(&config, &data, 600.0, 400.0))
        .expect("create");

    let next = AlignedData::from_columns(vec![vec![0.0, 60.0], vec![5.0, 6.0]]).expect("columns");
    let update = renderer
        .update(props(&config, &next, 600.0, 400.0))
        .expect("set data");

    assert_eq!(update, PlotUpdate::DataUpdated);
    assert_eq!(backend.set_data_count(), 1);
    assert_eq!(backend.create_count(), 1);
    assert_eq!(
        backend.last_instance().expect("instance").data(),
        next
    );
}

#[test]
fn container_swap_recreates_instance() {
    let builder = builder();
    let config = builder.get_config().expect("config");
    let data = data();
    let backend = HeadlessBackend::new();
    let mut renderer = PlotRenderer::new(backend.clone());
    renderer
        .update(props(&config, &data, 600.0, 400.0))
        .expect("create");

    let update = renderer
        .update(PlotProps {
            container: ContainerId(2),
            ..props(&config, &data, 600.0, 400.0)
        })
        .expect("new container");

    assert_eq!(update, PlotUpdate::Recreated);
    assert_eq!(backend.live_instances(), 1);
}

#[test]
fn zero_size_never_creates_instance() {
    let builder = builder();
    let config = builder.get_config().expect("config");
    let data = data();
    let backend = HeadlessBackend::new();
    let mut renderer = PlotRenderer::new(backend.clone());

    let update = renderer
        .update(props(&config, &data, 0.0, 400.0))
        .expect("suppressed");

    assert_eq!(update, PlotUpdate::Suppressed);
    assert_eq!(backend.create_count(), 0);
    assert_eq!(renderer.view(), PlotView::Empty);
}

#[test]
fn headless_backend_rejects_zero_size() {
    let builder = builder();
    let config = builder.get_config().expect("config");
    let mut backend = HeadlessBackend::new();
    let result = dashplot::render::RenderBackend::create(
        &mut backend,
        &config,
        &data(),
        Viewport::new(0, 10),
        ContainerId(1),
    );
    assert!(matches!(
        result,
        Err(ChartError::InvalidViewport {
            width: 0,
            height: 10,
        })
    ));
}

#[test]
fn lifecycle_hooks_fire_in_order() {
    let builder = builder();
    let seen = Rc::new(RefCell::new(Vec::new()));
    for kind in [
        HookKind::Init,
        HookKind::Ready,
        HookKind::SetSize,
        HookKind::SetData,
        HookKind::Destroy,
    ] {
        let sink = Rc::clone(&seen);
        builder.add_hook(kind, move |event| sink.borrow_mut().push(event.kind()));
    }
    let config = builder.get_config().expect("config");
    let data = data();
    let mut renderer = PlotRenderer::new(HeadlessBackend::new());

    renderer
        .update(props(&config, &data, 600.0, 400.0))
        .expect("create");
    renderer
        .update(props(&config, &data, 640.0, 400.0))
        .expect("resize");
    renderer.unmount();

    assert_eq!(
        *seen.borrow(),
        vec![
            HookKind::Init,
            HookKind::Ready,
            HookKind::SetSize,
            HookKind::Destroy,
        ]
    );
}
