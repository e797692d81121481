//! Widget contract - class-level declaration and lifecycle hooks.
//!
//! A widget type describes its class once (child roles, default options,
//! presets, frozen option paths) and optionally overrides the three hooks the
//! engine calls. The engine never implements behavior of its own in the hooks.
//!
//! | Hook      | When                                                         |
//! |-----------|--------------------------------------------------------------|
//! | `create`  | inside construction, before registration with the parent     |
//! | `init`    | once, after every child finished its own `init`              |
//! | `destroy` | once, before children are destroyed and the parent detached  |

use std::any::{Any, TypeId};

use crate::options::{OptionSchema, Options, Presets};
use super::component::Component;
use super::roles::ChildRoles;

// =============================================================================
// Widget Trait
// =============================================================================

/// A component variant: its class declaration plus optional hook overrides.
///
/// The widget value itself is the component's private state; hooks receive it
/// mutably together with the [`Component`] it belongs to.
///
/// Widgets that need to reach their own component later should keep a
/// [`WeakComponent`](super::WeakComponent), never a [`Component`], to avoid a
/// reference cycle.
pub trait Widget: Any {
    /// Class name used in errors and logs. Defaults to the type's short name.
    fn class_name() -> &'static str
    where
        Self: Sized,
    {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Roles this class accepts children under.
    fn describe_children() -> ChildRoles
    where
        Self: Sized,
    {
        ChildRoles::new()
    }

    /// Default options.
    fn describe_defaults() -> Options
    where
        Self: Sized,
    {
        Options::new()
    }

    /// Named presets.
    fn describe_presets() -> Presets
    where
        Self: Sized,
    {
        Presets::new()
    }

    /// Whether instances may be repositioned by the host (for example reordered
    /// or dragged between containers). Read by widgets, never by the engine.
    fn is_movable() -> bool
    where
        Self: Sized,
    {
        true
    }

    /// Option paths (JSON pointers) that presets and overrides may not change.
    fn describe_frozen() -> Vec<&'static str>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Wire up own state. Runs inside the constructor.
    fn create(&mut self, _component: &Component) {}

    /// Runs after all children are initialized.
    fn init(&mut self, _component: &Component) {}

    /// Runs first during teardown, while children and parent are still linked.
    fn destroy(&mut self, _component: &Component) {}
}

/// `my_crate::widgets::Slider<T>` -> `Slider`.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// =============================================================================
// Class Descriptor
// =============================================================================

/// Immutable, cached class declaration built from a [`Widget`] type.
#[derive(Debug)]
pub struct ClassDescriptor {
    widget_type: TypeId,
    name: &'static str,
    movable: bool,
    roles: ChildRoles,
    options: OptionSchema,
}

impl ClassDescriptor {
    /// Build the descriptor of `W`. Prefer [`describe`](super::describe), which caches.
    pub fn of<W: Widget>() -> Self {
        Self {
            widget_type: TypeId::of::<W>(),
            name: W::class_name(),
            movable: W::is_movable(),
            roles: W::describe_children(),
            options: OptionSchema::new(W::describe_defaults(), W::describe_presets())
                .with_frozen(W::describe_frozen()),
        }
    }

    /// `TypeId` of the widget type this class was built from.
    pub fn widget_type(&self) -> TypeId {
        self.widget_type
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn roles(&self) -> &ChildRoles {
        &self.roles
    }

    pub fn options(&self) -> &OptionSchema {
        &self.options
    }
}
