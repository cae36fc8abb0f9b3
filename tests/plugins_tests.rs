use std::cell::RefCell;
use std::rc::Rc;

use dashplot::ChartError;
use dashplot::api::{ConfigBuilder, HookHandle, HookKind, HookRegistry, ScaleProps, X_SCALE_KEY};
use dashplot::core::AlignedData;
use dashplot::extensions::PlotPlugin;
use dashplot::render::{ContainerId, HeadlessBackend, PlotProps, PlotRenderer};

#[derive(Clone)]
struct RecordingPlugin {
    id: String,
    events: Rc<RefCell<Vec<HookKind>>>,
}

impl RecordingPlugin {
    fn new(id: impl Into<String>, events: Rc<RefCell<Vec<HookKind>>>) -> Self {
        Self {
            id: id.into(),
            events,
        }
    }
}

impl PlotPlugin for RecordingPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn install(&mut self, hooks: &HookRegistry) -> Vec<HookHandle> {
        [HookKind::Init, HookKind::SetData, HookKind::Destroy]
            .into_iter()
            .map(|kind| {
                let events = Rc::clone(&self.events);
                hooks.add(kind, move |event| events.borrow_mut().push(event.kind()))
            })
            .collect()
    }
}

fn data(last: f64) -> AlignedData {
    AlignedData::new(vec![0.0, 60.0], vec![vec![Some(1.0), Some(last)]])
}

#[test]
fn plugin_receives_instance_lifecycle_in_order() {
    let mut builder = ConfigBuilder::new();
    builder.add_scale(ScaleProps::new(X_SCALE_KEY).with_time(true));
    let events = Rc::new(RefCell::new(Vec::new()));
    builder
        .add_plugin(Box::new(RecordingPlugin::new("recorder", events.clone())))
        .expect("register plugin");

    let config = builder.get_config().expect("config");
    assert_eq!(config.plugin_ids, vec!["recorder".to_owned()]);

    let mut renderer = PlotRenderer::new(HeadlessBackend::new());
    for last in [2.0, 3.0] {
        let data = data(last);
        renderer
            .update(PlotProps {
                config: &config,
                data: &data,
                width: 320.0,
                height: 200.0,
                container: ContainerId(1),
            })
            .expect("update");
    }
    renderer.unmount();

    assert_eq!(
        *events.borrow(),
        vec![HookKind::Init, HookKind::SetData, HookKind::Destroy]
    );
}

#[test]
fn plugin_ids_must_be_unique_and_non_empty() {
    let mut builder = ConfigBuilder::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    builder
        .add_plugin(Box::new(RecordingPlugin::new("recorder", events.clone())))
        .expect("first registration");

    let duplicate = builder.add_plugin(Box::new(RecordingPlugin::new("recorder", events.clone())));
    assert!(matches!(duplicate, Err(ChartError::InvalidData(_))));

    let empty = builder.add_plugin(Box::new(RecordingPlugin::new("", events)));
    assert!(matches!(empty, Err(ChartError::InvalidData(_))));
    assert_eq!(builder.hooks().len(), 3);
}

#[test]
fn removing_plugin_removes_its_hooks() {
    let mut builder = ConfigBuilder::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    builder
        .add_plugin(Box::new(RecordingPlugin::new("recorder", events.clone())))
        .expect("register plugin");
    let _own = builder.add_hook(HookKind::SetData, |_| {});
    assert_eq!(builder.hooks().len(), 4);

    assert!(builder.remove_plugin("recorder"));
    assert!(!builder.has_plugin("recorder"));
    assert!(!builder.remove_plugin("recorder"));
    assert_eq!(builder.hooks().len(), 1);
    assert!(builder.get_config().expect("config").plugin_ids.is_empty());
}

#[test]
fn handler_may_remove_itself_during_dispatch() {
    let builder = ConfigBuilder::new();
    let calls = Rc::new(RefCell::new(0));
    let slot: Rc<RefCell<Option<HookHandle>>> = Rc::new(RefCell::new(None));

    let counter = Rc::clone(&calls);
    let own = Rc::clone(&slot);
    let handle = builder.add_hook(HookKind::Init, move |_| {
        *counter.borrow_mut() += 1;
        if let Some(handle) = own.borrow().as_ref() {
            handle.remove();
        }
    });
    *slot.borrow_mut() = Some(handle);

    let config = builder.get_config().expect("config");
    let backend = HeadlessBackend::new();
    let mut renderer = PlotRenderer::new(backend);
    let data = data(2.0);
    let props = PlotProps {
        config: &config,
        data: &data,
        width: 320.0,
        height: 200.0,
        container: ContainerId(1),
    };
    renderer.update(props).expect("create");
    renderer.unmount();
    renderer.update(props).expect("create again");

    assert_eq!(*calls.borrow(), 1);
    assert!(builder.hooks().is_empty());
}

#[test]
fn handler_removed_earlier_in_dispatch_is_skipped() {
    let builder = ConfigBuilder::new();
    let late_calls = Rc::new(RefCell::new(0));
    let victim: Rc<RefCell<Option<HookHandle>>> = Rc::new(RefCell::new(None));

    let target = Rc::clone(&victim);
    let _remover = builder.add_hook(HookKind::Init, move |_| {
        if let Some(handle) = target.borrow().as_ref() {
            handle.remove();
        }
    });
    let counter = Rc::clone(&late_calls);
    let handle = builder.add_hook(HookKind::Init, move |_| *counter.borrow_mut() += 1);
    *victim.borrow_mut() = Some(handle);

    let config = builder.get_config().expect("config");
    let mut renderer = PlotRenderer::new(HeadlessBackend::new());
    let data = data(2.0);
    renderer
        .update(PlotProps {
            config: &config,
            data: &data,
            width: 320.0,
            height: 200.0,
            container: ContainerId(1),
        })
        .expect("create");

    assert_eq!(*late_calls.borrow(), 0);
    assert_eq!(builder.hooks().count(HookKind::Init), 1);
}
