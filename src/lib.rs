//! # spark-components
//!
//! Hierarchical component composition and lifecycle engine.
//!
//! Builds trees of named, stateful components, each wrapping an opaque host
//! handle, with deterministic construction, two-phase initialization, event
//! notification and idempotent teardown. Concrete widgets (sliders, carousels,
//! ...) plug in through the [`Widget`] trait and never touch the tree
//! bookkeeping themselves.
//!
//! ## Architecture
//!
//! ```text
//! OptionsInput ─► options::resolve ─► Component::new ─► create hook
//!                                          │
//!                         parent roles ─► name ─► parent.add_child ("add:<role>")
//!
//! root.init()    ─► children first ─► init hook ─► "init"
//! root.destroy() ─► destroy hook ─► children ─► detach ("remove:<role>") ─► "destroy"
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Element, ComponentId, LifecycleFlags, SlotKind)
//! - [`options`] - Defaults → preset → overrides resolution with deep merge
//! - [`notifier`] - Per-component event channel
//! - [`engine`] - Component tree, widget contract, role resolution, registry
//! - [`error`] - Construction errors
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] and never installs a subscriber.

pub mod engine;
pub mod error;
pub mod notifier;
pub mod options;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{ComponentError, Result};

pub use engine::{
    describe, is_described, live_count, reset_registry, ChildRole, ChildRoles,
    ClassDescriptor, Component, Slot, WeakComponent, Widget,
};

pub use notifier::{events, Handler, HandlerId, Notifier, Payload};

pub use options::{resolve, OptionSchema, Options, OptionsInput, Presets, PRESET_FIELD};
