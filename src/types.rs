//! Core types shared by the engine, the notifier and the option resolver.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Element - Opaque host handle
// =============================================================================

/// Opaque handle to the host resource a component wraps.
///
/// The engine stores it and hands it back; it never inspects it. Widgets that
/// know the concrete host type can recover it with [`Element::downcast_ref`].
///
/// Cloning is cheap and yields a handle to the same host value.
#[derive(Clone)]
pub struct Element {
    value: Rc<dyn Any>,
    type_name: &'static str,
}

impl Element {
    /// Wrap a host value.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Rc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// A handle with no host value behind it (useful for tests and headless trees).
    pub fn detached() -> Self {
        Self::new(())
    }

    /// Borrow the host value as `T`, if that is what it is.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).downcast_ref::<T>()
    }

    /// Check the concrete host type.
    pub fn is<T: Any>(&self) -> bool {
        (*self.value).is::<T>()
    }

    /// Name of the wrapped host type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles point at the same host value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&self.type_name).finish()
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::detached()
    }
}

// =============================================================================
// ComponentId
// =============================================================================

/// Registry-allocated identifier, rendered as `c0`, `c1`, ...
///
/// Only used for diagnostics. Component identity is pointer identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

// =============================================================================
// Lifecycle Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Lifecycle state of a component.
    ///
    /// `INITIALIZED` and `DESTROYED` are monotonic. The `-ING` bits are only set
    /// while the matching phase runs, so re-entrant calls become no-ops.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LifecycleFlags: u8 {
        const INITIALIZING = 1 << 0;
        const INITIALIZED = 1 << 1;
        const DESTROYING = 1 << 2;
        const DESTROYED = 1 << 3;
    }
}

// =============================================================================
// SlotKind
// =============================================================================

/// Shape of a parent's back-reference to the children of one role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// A single reference, overwritten by each newly attached child.
    #[default]
    One,
    /// A growable sequence, appended to by each newly attached child.
    Many,
}
