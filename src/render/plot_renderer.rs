//! Lifecycle of one render instance across prop changes.
//!
//! Rules are evaluated in order on every update:
//! 1. no instance yet, or the instance belongs to another container: recreate
//! 2. size changed: resize in place
//! 3. config changed by value: recreate
//! 4. data changed by value: push data
//!
//! Empty data destroys the instance eagerly and yields a placeholder, and a
//! zero-sized surface never creates one.

use tracing::debug;

use crate::api::{PlotConfig, PlotContext};
use crate::core::{AlignedData, Viewport};
use crate::error::ChartResult;

use super::{ContainerId, InstanceId, RenderBackend, SharedInstance};

#[derive(Debug, Clone, Copy)]
pub struct PlotProps<'a> {
    pub config: &'a PlotConfig,
    pub data: &'a AlignedData,
    pub width: f64,
    pub height: f64,
    pub container: ContainerId,
}

/// What an update did to the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotUpdate {
    Created,
    Recreated,
    Resized,
    DataUpdated,
    Unchanged,
    /// Empty data; any instance was destroyed.
    NoData,
    /// Zero width or height; nothing was created.
    Suppressed,
}

/// What the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotView {
    Empty,
    Surface { instance: InstanceId, size: Viewport },
    NoData { width: u32, height: u32 },
}

type InstanceCallback = Box<dyn FnMut(&SharedInstance)>;

pub struct PlotRenderer<B: RenderBackend> {
    backend: B,
    instance: Option<SharedInstance>,
    plot_context: Option<PlotContext>,
    last_config: Option<PlotConfig>,
    last_data: Option<AlignedData>,
    last_size: Option<Viewport>,
    view: PlotView,
    on_instance_created: Option<InstanceCallback>,
    on_destroy: Option<InstanceCallback>,
}

impl<B: RenderBackend> PlotRenderer<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            instance: None,
            plot_context: None,
            last_config: None,
            last_data: None,
            last_size: None,
            view: PlotView::Empty,
            on_instance_created: None,
            on_destroy: None,
        }
    }

    #[must_use]
    pub fn with_on_instance_created(mut self, callback: impl FnMut(&SharedInstance) + 'static) -> Self {
        self.on_instance_created = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn with_on_destroy(mut self, callback: impl FnMut(&SharedInstance) + 'static) -> Self {
        self.on_destroy = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn instance(&self) -> Option<&SharedInstance> {
        self.instance.as_ref()
    }

    #[must_use]
    pub fn view(&self) -> PlotView {
        self.view
    }

    pub fn update(&mut self, props: PlotProps<'_>) -> ChartResult<PlotUpdate> {
        let size = Viewport::floored(props.width, props.height);

        if props.data.is_empty() {
            if self.instance.is_some() {
                debug!("empty data, destroying plot instance");
                self.destroy_instance();
            }
            self.remember(props, size);
            self.view = PlotView::NoData {
                width: size.width,
                height: size.height,
            };
            return Ok(PlotUpdate::NoData);
        }

        if !size.is_valid() {
            self.remember(props, size);
            if self.instance.is_none() {
                self.view = PlotView::Empty;
            }
            return Ok(PlotUpdate::Suppressed);
        }

        let outcome = match &self.instance {
            None => {
                self.create(props, size)?;
                PlotUpdate::Created
            }
            Some(instance) if instance.container() != props.container => {
                debug!(
                    instance = instance.id().0,
                    "plot instance orphaned from its container, recreating"
                );
                self.destroy_instance();
                self.create(props, size)?;
                PlotUpdate::Recreated
            }
            Some(instance) if self.last_size != Some(size) => {
                instance.set_size(size);
                PlotUpdate::Resized
            }
            Some(_) if self.last_config.as_ref() != Some(props.config) => {
                debug!("plot config changed, recreating instance");
                self.destroy_instance();
                self.create(props, size)?;
                PlotUpdate::Recreated
            }
            Some(instance) if self.last_data.as_ref() != Some(props.data) => {
                instance.set_data(props.data);
                PlotUpdate::DataUpdated
            }
            Some(_) => PlotUpdate::Unchanged,
        };

        self.remember(props, size);
        if let Some(instance) = &self.instance {
            self.view = PlotView::Surface {
                instance: instance.id(),
                size: instance.size(),
            };
        }
        Ok(outcome)
    }

    /// Destroys the instance, if any.
    pub fn unmount(&mut self) {
        self.destroy_instance();
        self.last_config = None;
        self.last_data = None;
        self.last_size = None;
        self.view = PlotView::Empty;
    }

    fn remember(&mut self, props: PlotProps<'_>, size: Viewport) {
        if self.last_config.as_ref() != Some(props.config) {
            self.last_config = Some(props.config.clone());
        }
        if self.last_data.as_ref() != Some(props.data) {
            self.last_data = Some(props.data.clone());
        }
        self.last_size = Some(size);
    }

    fn create(&mut self, props: PlotProps<'_>, size: Viewport) -> ChartResult<()> {
        let instance = self
            .backend
            .create(props.config, props.data, size, props.container)?;
        debug!(
            instance = instance.id().0,
            width = size.width,
            height = size.height,
            "plot instance created"
        );
        props.config.plot_context.publish(instance.clone());
        self.plot_context = Some(props.config.plot_context.clone());
        if let Some(callback) = self.on_instance_created.as_mut() {
            callback(&instance);
        }
        self.instance = Some(instance);
        Ok(())
    }

    fn destroy_instance(&mut self) {
        let Some(instance) = self.instance.take() else {
            return;
        };
        if let Some(callback) = self.on_destroy.as_mut() {
            callback(&instance);
        }
        instance.destroy();
        if let Some(context) = self.plot_context.take() {
            context.clear();
        }
    }
}

impl<B: RenderBackend> Drop for PlotRenderer<B> {
    fn drop(&mut self) {
        self.destroy_instance();
    }
}
