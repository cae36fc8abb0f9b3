//! Observer registry for render-instance lifecycle and interaction events.
//!
//! Every registration returns a `HookHandle`; removing the handle removes
//! exactly that handler and nothing else. Dispatch snapshots the matching
//! handlers before calling them, so handlers may add or remove hooks while an
//! event is being delivered. A handler removed mid-dispatch is not called
//! for the rest of that event; one added mid-dispatch first sees the next.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::render::{SeriesChange, SharedInstance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookKind {
    Init,
    Ready,
    SetData,
    SetSize,
    SetSeries,
    SetLegend,
    SetCursor,
    SetSelect,
    Destroy,
}

/// Drag selection in plot pixels and X-scale values (unix seconds for time
/// scales).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub left_px: f64,
    pub width_px: f64,
    pub start: f64,
    pub end: f64,
}

#[derive(Clone)]
pub enum HookEvent {
    Init {
        instance: SharedInstance,
    },
    Ready {
        instance: SharedInstance,
    },
    SetData {
        instance: SharedInstance,
    },
    SetSize {
        instance: SharedInstance,
    },
    SetSeries {
        instance: SharedInstance,
        series_index: Option<usize>,
        change: SeriesChange,
    },
    /// Active data index per series, index 0 being the X column.
    SetLegend {
        instance: SharedInstance,
        data_indexes: Vec<Option<usize>>,
        via_sync: bool,
    },
    /// Cursor position in plot-local pixels; `None` when off the plot.
    SetCursor {
        instance: SharedInstance,
        left: Option<f64>,
        top: Option<f64>,
        via_sync: bool,
    },
    SetSelect {
        instance: SharedInstance,
        selection: Selection,
    },
    Destroy {
        instance: SharedInstance,
    },
}

impl HookEvent {
    #[must_use]
    pub fn kind(&self) -> HookKind {
        match self {
            Self::Init { .. } => HookKind::Init,
            Self::Ready { .. } => HookKind::Ready,
            Self::SetData { .. } => HookKind::SetData,
            Self::SetSize { .. } => HookKind::SetSize,
            Self::SetSeries { .. } => HookKind::SetSeries,
            Self::SetLegend { .. } => HookKind::SetLegend,
            Self::SetCursor { .. } => HookKind::SetCursor,
            Self::SetSelect { .. } => HookKind::SetSelect,
            Self::Destroy { .. } => HookKind::Destroy,
        }
    }

    #[must_use]
    pub fn instance(&self) -> &SharedInstance {
        match self {
            Self::Init { instance }
            | Self::Ready { instance }
            | Self::SetData { instance }
            | Self::SetSize { instance }
            | Self::SetSeries { instance, .. }
            | Self::SetLegend { instance, .. }
            | Self::SetCursor { instance, .. }
            | Self::SetSelect { instance, .. }
            | Self::Destroy { instance } => instance,
        }
    }
}

impl fmt::Debug for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookEvent")
            .field("kind", &self.kind())
            .field("instance", &self.instance().id())
            .finish()
    }
}

type HookHandler = Rc<RefCell<dyn FnMut(&HookEvent)>>;

struct HookEntry {
    id: u64,
    kind: HookKind,
    handler: HookHandler,
}

#[derive(Default)]
struct HookRegistryInner {
    next_id: u64,
    entries: Vec<HookEntry>,
}

/// Shared, ordered set of hook handlers.
///
/// Clones share the same registry; equality is identity.
#[derive(Clone, Default)]
pub struct HookRegistry {
    inner: Rc<RefCell<HookRegistryInner>>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&self, kind: HookKind, handler: F) -> HookHandle
    where
        F: FnMut(&HookEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.push(HookEntry {
            id,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
        HookHandle {
            registry: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Delivers `event` to every handler of its kind, in registration order.
    pub fn dispatch(&self, event: &HookEvent) {
        let kind = event.kind();
        let handlers: SmallVec<[(u64, HookHandler); 4]> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| (entry.id, Rc::clone(&entry.handler)))
            .collect();

        for (id, handler) in handlers {
            // Removed by an earlier handler of this same dispatch.
            if !self.inner.borrow().entries.iter().any(|entry| entry.id == id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(event),
                Err(_) => trace!(?kind, "skipping re-entrant hook handler"),
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn count(&self, kind: HookKind) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }
}

impl PartialEq for HookRegistry {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// Removal token returned by `HookRegistry::add`.
#[derive(Debug, Clone)]
pub struct HookHandle {
    registry: Weak<RefCell<HookRegistryInner>>,
    id: u64,
}

impl HookHandle {
    /// Removes the handler. Returns `true` when it was still registered.
    pub fn remove(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut inner = registry.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|entry| entry.id != self.id);
        inner.entries.len() != before
    }
}
