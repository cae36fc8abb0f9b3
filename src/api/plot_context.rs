use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::render::SharedInstance;

/// Handle to the render instance currently mounted for one chart.
///
/// Owned by the chart's `ConfigBuilder`; the plot renderer publishes the
/// instance on create and clears it on destroy. Clones share the slot.
#[derive(Clone, Default)]
pub struct PlotContext {
    slot: Rc<RefCell<Option<SharedInstance>>>,
}

impl PlotContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, instance: SharedInstance) {
        *self.slot.borrow_mut() = Some(instance);
    }

    pub fn clear(&self) {
        self.slot.borrow_mut().take();
    }

    #[must_use]
    pub fn instance(&self) -> Option<SharedInstance> {
        self.slot.try_borrow().ok().and_then(|slot| slot.clone())
    }

    /// Runs `f` against the live instance, if any.
    pub fn with_instance<R>(&self, f: impl FnOnce(&SharedInstance) -> R) -> Option<R> {
        let instance = self.instance()?;
        if instance.is_destroyed() {
            return None;
        }
        Some(f(&instance))
    }
}

impl PartialEq for PlotContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for PlotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instance = self.instance().map(|instance| instance.id());
        f.debug_struct("PlotContext")
            .field("instance", &instance)
            .finish()
    }
}
