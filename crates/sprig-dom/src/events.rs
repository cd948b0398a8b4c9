//! Event listeners
//!
//! Listener registration is permanent: there is no removal API. Dispatch
//! snapshots the handler list first so a handler may re-enter the document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::NodeId;

/// Supported interaction events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Input,
    Submit,
}

impl EventType {
    /// DOM event name
    pub fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::Submit => "submit",
        }
    }
}

/// A dispatched event
#[derive(Debug)]
pub struct Event {
    pub event_type: EventType,
    pub target: NodeId,
    default_prevented: bool,
}

impl Event {
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            default_prevented: false,
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Shared event handler
pub type Handler = Rc<RefCell<dyn FnMut(&mut Event)>>;

/// Per-document listener table
#[derive(Default)]
pub struct EventRegistry {
    listeners: HashMap<(NodeId, EventType), Vec<Handler>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one target
    pub fn add<F>(&mut self, target: NodeId, event_type: EventType, handler: F)
    where
        F: FnMut(&mut Event) + 'static,
    {
        self.add_shared(target, event_type, Rc::new(RefCell::new(handler)));
    }

    /// Register an already-shared handler (the same closure may be bound to
    /// several targets)
    pub fn add_shared(&mut self, target: NodeId, event_type: EventType, handler: Handler) {
        tracing::debug!(target_node = target.0, event = event_type.name(), "listener added");
        self.listeners
            .entry((target, event_type))
            .or_default()
            .push(handler);
    }

    /// Snapshot of the handlers bound to a target
    pub fn handlers(&self, target: NodeId, event_type: EventType) -> Vec<Handler> {
        self.listeners
            .get(&(target, event_type))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of handlers bound to a target
    pub fn count(&self, target: NodeId, event_type: EventType) -> usize {
        self.listeners
            .get(&(target, event_type))
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count() {
        let mut registry = EventRegistry::new();
        let target = NodeId(3);
        registry.add(target, EventType::Click, |_| {});
        registry.add(target, EventType::Click, |_| {});
        registry.add(target, EventType::Input, |_| {});

        assert_eq!(registry.count(target, EventType::Click), 2);
        assert_eq!(registry.count(target, EventType::Input), 1);
        assert_eq!(registry.count(target, EventType::Submit), 0);
    }

    #[test]
    fn test_handlers_fire() {
        let mut registry = EventRegistry::new();
        let target = NodeId(1);
        let hits = Rc::new(RefCell::new(0));
        let hits_in = hits.clone();
        registry.add(target, EventType::Click, move |_| {
            *hits_in.borrow_mut() += 1;
        });

        let mut event = Event::new(EventType::Click, target);
        for handler in registry.handlers(target, EventType::Click) {
            (*handler.borrow_mut())(&mut event);
        }
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_prevent_default() {
        let mut event = Event::new(EventType::Submit, NodeId(2));
        assert!(!event.is_default_prevented());
        event.prevent_default();
        assert!(event.is_default_prevented());
    }
}
