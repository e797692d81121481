//! Component Registry - Class descriptors and component accounting.
//!
//! Manages the per-thread bookkeeping shared by all component trees:
//! - Class descriptor cache (one immutable [`ClassDescriptor`] per widget type)
//! - Component ID allocation (`c0`, `c1`, ...)
//! - Live component count (constructed and not yet destroyed)
//!
//! The engine is single-threaded, so all state is thread-local.

use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::ComponentId;
use super::widget::{ClassDescriptor, Widget};

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Widget type -> cached class descriptor.
    static DESCRIPTORS: RefCell<HashMap<TypeId, Rc<ClassDescriptor>>> = RefCell::new(HashMap::new());

    /// Counter for generating component IDs.
    static ID_COUNTER: Cell<usize> = const { Cell::new(0) };

    /// Components constructed and not yet destroyed.
    static LIVE_COUNT: Cell<usize> = const { Cell::new(0) };
}

// =============================================================================
// Class Descriptors
// =============================================================================

/// Get the class descriptor of `W`, building and caching it on first use.
///
/// The `describe_*` methods of `W` run once per thread.
pub fn describe<W: Widget>() -> Rc<ClassDescriptor> {
    let type_id = TypeId::of::<W>();

    let cached = DESCRIPTORS.with(|map| map.borrow().get(&type_id).cloned());
    if let Some(class) = cached {
        return class;
    }

    // Build outside the borrow: describe_children() may itself ask for
    // class names of other widget types.
    let class = Rc::new(ClassDescriptor::of::<W>());
    tracing::debug!(class = class.name(), roles = class.roles().len(), "described class");

    DESCRIPTORS.with(|map| {
        map.borrow_mut()
            .entry(type_id)
            .or_insert(class)
            .clone()
    })
}

/// Whether `W` has been described on this thread.
pub fn is_described<W: Widget>() -> bool {
    DESCRIPTORS.with(|map| map.borrow().contains_key(&TypeId::of::<W>()))
}

// =============================================================================
// IDs and Accounting
// =============================================================================

/// Allocate the next component ID.
pub(crate) fn allocate_id() -> ComponentId {
    ID_COUNTER.with(|counter| {
        let id = counter.get();
        counter.set(id + 1);
        ComponentId(id)
    })
}

pub(crate) fn track_live() {
    LIVE_COUNT.with(|count| count.set(count.get() + 1));
}

pub(crate) fn release_live() {
    LIVE_COUNT.with(|count| count.set(count.get().saturating_sub(1)));
}

/// Number of components constructed and not yet destroyed on this thread.
pub fn live_count() -> usize {
    LIVE_COUNT.with(Cell::get)
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    DESCRIPTORS.with(|map| map.borrow_mut().clear());
    ID_COUNTER.with(|counter| counter.set(0));
    LIVE_COUNT.with(|count| count.set(0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local! {
        static DESCRIBE_CALLS: Cell<usize> = const { Cell::new(0) };
    }

    struct Counted;
    impl Widget for Counted {
        fn describe_defaults() -> crate::options::Options {
            DESCRIBE_CALLS.with(|calls| calls.set(calls.get() + 1));
            crate::options::Options::new()
        }
    }

    #[test]
    fn test_describe_caches() {
        reset_registry();
        DESCRIBE_CALLS.with(|calls| calls.set(0));

        assert!(!is_described::<Counted>());
        let first = describe::<Counted>();
        let second = describe::<Counted>();

        assert!(Rc::ptr_eq(&first, &second));
        assert!(is_described::<Counted>());
        assert_eq!(DESCRIBE_CALLS.with(Cell::get), 1);
    }

    #[test]
    fn test_allocate_id() {
        reset_registry();

        assert_eq!(allocate_id(), ComponentId(0));
        assert_eq!(allocate_id(), ComponentId(1));
        assert_eq!(allocate_id().to_string(), "c2");
    }

    #[test]
    fn test_live_count() {
        reset_registry();

        track_live();
        track_live();
        assert_eq!(live_count(), 2);

        release_live();
        assert_eq!(live_count(), 1);

        reset_registry();
        release_live();
        assert_eq!(live_count(), 0);
    }
}
