//! Notifier - Per-component event channel
//!
//! Named-event publish/subscribe with synchronous, subscription-order delivery.
//! Every component owns exactly one notifier; the engine uses it to broadcast
//! structural (`add:<role>`, `remove:<role>`) and phase (`init`, `destroy`)
//! events, and widgets are free to emit their own.
//!
//! # API
//!
//! - `on(event, fn)` - Subscribe, returns a [`HandlerId`]
//! - `once(event, fn)` - Subscribe for a single delivery
//! - `off(event, id)` - Unsubscribe (unknown ids are ignored)
//! - `emit(event, payload)` - Deliver to current subscribers
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use spark_components::{Notifier, Payload};
//!
//! let notifier = Notifier::new();
//! let count = Rc::new(Cell::new(0));
//! let count_clone = count.clone();
//!
//! let id = notifier.on("change", move |_payload| {
//!     count_clone.set(count_clone.get() + 1);
//! });
//!
//! notifier.emit("change", Payload::None);
//! notifier.off("change", id);
//! notifier.emit("change", Payload::None);
//!
//! assert_eq!(count.get(), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::engine::Component;

// =============================================================================
// Event Names
// =============================================================================

/// Names of the events the engine emits.
pub mod events {
    /// Emitted on a component after its whole subtree finished `init`.
    pub const INIT: &str = "init";

    /// Emitted on a component at the end of its `destroy`.
    pub const DESTROY: &str = "destroy";

    /// Emitted on the parent when a child registers under `role`.
    pub fn added(role: &str) -> String {
        format!("add:{role}")
    }

    /// Emitted on the parent when a child deregisters from `role`.
    pub fn removed(role: &str) -> String {
        format!("remove:{role}")
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// Event payload.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No payload (`init`, `destroy`).
    #[default]
    None,
    /// A component (`add:<role>`, `remove:<role>`).
    Component(Component),
    /// Widget-defined data.
    Value(Value),
}

impl Payload {
    pub fn component(&self) -> Option<&Component> {
        match self {
            Self::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Component> for Payload {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Subscription handle returned by [`Notifier::on`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

/// Event handler. Shared so emission can run from a snapshot.
pub type Handler = Rc<dyn Fn(&Payload)>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct Subscription {
    id: HandlerId,
    handler: Handler,
    once: bool,
}

#[derive(Default)]
struct HandlerRegistry {
    handlers: HashMap<String, Vec<Subscription>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn next_id(&mut self) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn subscribe(&mut self, event: &str, handler: Handler, once: bool) -> HandlerId {
        let id = self.next_id();
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(Subscription { id, handler, once });
        id
    }

    fn unsubscribe(&mut self, event: &str, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|sub| sub.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(event);
        }
        removed
    }
}

// =============================================================================
// NOTIFIER
// =============================================================================

/// Per-component publish/subscribe channel.
#[derive(Default)]
pub struct Notifier {
    registry: RefCell<HandlerRegistry>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `event`.
    pub fn on<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(&Payload) + 'static,
    {
        self.registry
            .borrow_mut()
            .subscribe(event, Rc::new(handler), false)
    }

    /// Subscribe to the next delivery of `event` only.
    pub fn once<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(&Payload) + 'static,
    {
        self.registry
            .borrow_mut()
            .subscribe(event, Rc::new(handler), true)
    }

    /// Unsubscribe. Returns false if `id` was not subscribed to `event`.
    pub fn off(&self, event: &str, id: HandlerId) -> bool {
        self.registry.borrow_mut().unsubscribe(event, id)
    }

    /// Drop every handler for `event`. Returns how many were removed.
    pub fn off_all(&self, event: &str) -> usize {
        self.registry
            .borrow_mut()
            .handlers
            .remove(event)
            .map_or(0, |list| list.len())
    }

    /// Number of handlers currently subscribed to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .borrow()
            .handlers
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Drop all handlers.
    pub fn clear(&self) {
        self.registry.borrow_mut().handlers.clear();
    }

    /// Deliver `payload` to every handler of `event`, in subscription order.
    ///
    /// Handlers run from a snapshot taken before the first call, so handlers
    /// may subscribe, unsubscribe or emit again. Returns the number of
    /// handlers invoked.
    pub fn emit(&self, event: &str, payload: Payload) -> usize {
        let snapshot: Vec<Handler> = {
            let mut reg = self.registry.borrow_mut();
            let Some(list) = reg.handlers.get_mut(event) else {
                tracing::trace!(event, listeners = 0, "emit");
                return 0;
            };
            let snapshot = list.iter().map(|sub| sub.handler.clone()).collect();
            list.retain(|sub| !sub.once);
            if list.is_empty() {
                reg.handlers.remove(event);
            }
            snapshot
        };

        tracing::trace!(event, listeners = snapshot.len(), "emit");
        for handler in &snapshot {
            handler(&payload);
        }
        snapshot.len()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.registry.borrow();
        let mut events: Vec<(&str, usize)> = reg
            .handlers
            .iter()
            .map(|(event, list)| (event.as_str(), list.len()))
            .collect();
        events.sort_unstable();
        f.debug_struct("Notifier").field("events", &events).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
