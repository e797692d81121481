//! Component Engine - Tree, lifecycle and class registry.
//!
//! The engine manages the core data structures:
//! - Component: tree node with element, options, notifier and role slots
//! - Widget: class declaration (roles, defaults, presets) and lifecycle hooks
//! - Roles: role name resolution between a parent class and its child classes
//! - Registry: cached class descriptors, IDs, live component accounting
//!
//! # Architecture
//!
//! ```text
//! Slider (root, name=None)
//! ├── Item   (name="item",  slot "item"  = [Item, Item])
//! ├── Item
//! └── Pager  (name="pager", slot "pager" = Pager)
//! ```
//!
//! Parents own children; children hold a weak link back. Which role a child
//! takes is decided by its class alone, through the parent's declaration.

mod component;
mod registry;
mod roles;
mod slots;
mod widget;

pub use component::*;
pub use registry::*;
pub use roles::*;
pub use slots::Slot;
pub use widget::*;
