use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalEventKind {
    Resize,
    Scroll,
    PointerDown,
    KeyDown,
}

/// Window-level event delivered to global listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlobalEvent {
    Resize { width: u32, height: u32 },
    Scroll,
    /// `inside_tooltip` is set when the target lies within the tooltip.
    PointerDown { x: f64, y: f64, inside_tooltip: bool },
    KeyDown { key: String, inside_tooltip: bool },
}

impl GlobalEvent {
    #[must_use]
    pub fn kind(&self) -> GlobalEventKind {
        match self {
            Self::Resize { .. } => GlobalEventKind::Resize,
            Self::Scroll => GlobalEventKind::Scroll,
            Self::PointerDown { .. } => GlobalEventKind::PointerDown,
            Self::KeyDown { .. } => GlobalEventKind::KeyDown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

pub type GlobalHandler = Box<dyn FnMut(&GlobalEvent)>;

/// Attach/detach access to window-level events.
pub trait GlobalListeners {
    fn add(&self, kind: GlobalEventKind, handler: GlobalHandler) -> ListenerToken;
    fn remove(&self, token: ListenerToken) -> bool;
}

type SharedHandler = Rc<RefCell<GlobalHandler>>;

/// In-process listener hub. Hosts forward window events through
/// `dispatch`; controllers register through `GlobalListeners`.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: RefCell<u64>,
    entries: RefCell<Vec<(ListenerToken, GlobalEventKind, SharedHandler)>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, event: &GlobalEvent) {
        let kind = event.kind();
        let handlers: SmallVec<[(ListenerToken, SharedHandler); 4]> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, entry_kind, _)| *entry_kind == kind)
            .map(|(token, _, handler)| (*token, Rc::clone(handler)))
            .collect();
        for (token, handler) in handlers {
            let still_registered = self
                .entries
                .borrow()
                .iter()
                .any(|(entry_token, _, _)| *entry_token == token);
            if !still_registered {
                continue;
            }
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (&mut *handler)(event);
            }
        }
    }

    #[must_use]
    pub fn count(&self, kind: GlobalEventKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, entry_kind, _)| *entry_kind == kind)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl GlobalListeners for ListenerRegistry {
    fn add(&self, kind: GlobalEventKind, handler: GlobalHandler) -> ListenerToken {
        let mut next_id = self.next_id.borrow_mut();
        *next_id += 1;
        let token = ListenerToken(*next_id);
        self.entries
            .borrow_mut()
            .push((token, kind, Rc::new(RefCell::new(handler))));
        token
    }

    fn remove(&self, token: ListenerToken) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_token, _, _)| *entry_token != token);
        entries.len() != before
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::{GlobalEvent, GlobalEventKind, GlobalListeners, ListenerRegistry, ListenerToken};

    #[test]
    fn listener_removed_mid_dispatch_is_not_called() {
        let registry = Rc::new(ListenerRegistry::new());
        let victim: Rc<RefCell<Option<ListenerToken>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let hub = Rc::clone(&registry);
        let target = Rc::clone(&victim);
        registry.add(
            GlobalEventKind::Scroll,
            Box::new(move |_| {
                if let Some(token) = *target.borrow() {
                    hub.remove(token);
                }
            }),
        );
        let counter = Rc::clone(&calls);
        let token = registry.add(
            GlobalEventKind::Scroll,
            Box::new(move |_| counter.set(counter.get() + 1)),
        );
        *victim.borrow_mut() = Some(token);

        registry.dispatch(&GlobalEvent::Scroll);
        assert_eq!(calls.get(), 0);
        assert_eq!(registry.count(GlobalEventKind::Scroll), 1);
    }
}
