//! Lifecycle Core - Component construction, registration, init and destroy.
//!
//! A [`Component`] is a shared handle to one node of the tree. The parent
//! owns its children (strong references); a child only keeps a weak link to
//! its parent, so dropping a root handle drops the whole tree.
//!
//! # Lifecycle
//!
//! ```text
//! new ─► create hook ─► register with parent ("add:<role>")
//!     ─► init()     children first, then own hook, then "init"
//!     ─► destroy()  own hook, then children (snapshot), then
//!                   detach from parent ("remove:<role>"), then "destroy"
//! ```
//!
//! `init` and `destroy` are idempotent. Both walk a snapshot of the children,
//! and no interior borrow is held while a hook or event handler runs, so
//! hooks and handlers may construct, attach or destroy components freely.
//!
//! # Example
//!
//! ```rust
//! use spark_components::{ChildRoles, Component, Element, Widget};
//!
//! struct Item;
//! impl Widget for Item {}
//!
//! struct List;
//! impl Widget for List {
//!     fn describe_children() -> ChildRoles {
//!         ChildRoles::new().many::<Item>("item")
//!     }
//! }
//!
//! let list = Component::root(List, Element::detached(), ()).unwrap();
//! let item = list.attach(Item, Element::detached(), ()).unwrap();
//!
//! assert_eq!(item.name(), Some("item"));
//! assert_eq!(list.children_in("item"), vec![item.clone()]);
//!
//! list.init();
//! assert!(item.is_initialized());
//!
//! list.destroy();
//! assert!(item.is_destroyed());
//! assert!(list.children().is_empty());
//! ```

use std::any::{Any, TypeId};
use std::cell::{Cell, OnceCell, Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::notifier::{events, HandlerId, Notifier, Payload};
use crate::options::{Options, OptionsInput};
use crate::types::{ComponentId, Element, LifecycleFlags};
use super::registry;
use super::slots::{Slot, Slots};
use super::widget::{ClassDescriptor, Widget};

// =============================================================================
// Node
// =============================================================================

struct Node {
    id: ComponentId,
    class: Rc<ClassDescriptor>,
    element: Element,
    options: RefCell<Options>,
    parent: Option<Weak<Node>>,
    name: OnceCell<String>,
    children: RefCell<Vec<Component>>,
    slots: RefCell<Slots>,
    notifier: Notifier,
    flags: Cell<LifecycleFlags>,
    /// A `destroy` hook requested while the widget was busy in another hook.
    deferred_destroy: Cell<bool>,
    /// Hook view of the widget state.
    hooks: Rc<RefCell<dyn Widget>>,
    /// Same allocation as `hooks`, kept as `Any` for typed access.
    state: Rc<dyn Any>,
}

#[derive(Clone, Copy, Debug)]
enum Hook {
    Create,
    Init,
    Destroy,
}

// =============================================================================
// Component
// =============================================================================

/// Shared handle to a node of the component tree.
///
/// Cloning yields another handle to the same component; equality is identity.
#[derive(Clone)]
pub struct Component(Rc<Node>);

/// Non-owning handle to a component.
#[derive(Clone, Default)]
pub struct WeakComponent(Weak<Node>);

impl WeakComponent {
    pub fn upgrade(&self) -> Option<Component> {
        self.0.upgrade().map(Component)
    }
}

impl fmt::Debug for WeakComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(component) => write!(f, "WeakComponent({})", component.id()),
            None => f.write_str("WeakComponent(dropped)"),
        }
    }
}

impl Component {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Build a component of widget class `W`.
    ///
    /// 1. resolves `input` against the class defaults and presets
    /// 2. runs the widget's `create` hook
    /// 3. with a `parent`: resolves the role name from the parent's class and
    ///    registers with the parent, emitting `add:<role>` there
    ///
    /// Fails with `UnknownPreset`, `InvalidPresetField`, `NoSuchChildRole` or
    /// `AmbiguousChildRole`. A failed component is never registered.
    ///
    /// A component destroyed by its own `create` hook is returned unregistered.
    pub fn new<W: Widget>(
        widget: W,
        element: Element,
        input: impl Into<OptionsInput>,
        parent: Option<&Component>,
    ) -> Result<Self> {
        let class = registry::describe::<W>();
        let options = class.options().resolve(input)?;

        let state = Rc::new(RefCell::new(widget));
        let hooks: Rc<RefCell<dyn Widget>> = state.clone();

        let component = Self(Rc::new(Node {
            id: registry::allocate_id(),
            slots: RefCell::new(Slots::from_roles(class.roles())),
            class,
            element,
            options: RefCell::new(options),
            parent: parent.map(|parent| Rc::downgrade(&parent.0)),
            name: OnceCell::new(),
            children: RefCell::new(Vec::new()),
            notifier: Notifier::new(),
            flags: Cell::new(LifecycleFlags::empty()),
            deferred_destroy: Cell::new(false),
            hooks,
            state,
        }));

        registry::track_live();
        component.run_hook(Hook::Create);

        if component.is_destroyed() {
            tracing::debug!(
                id = %component.id(),
                class = component.class_name(),
                "component destroyed during create; not registered"
            );
            return Ok(component);
        }

        if let Some(parent) = parent {
            let parent_class = parent.class();
            let role = match parent_class.roles().resolve(
                parent_class.name(),
                component.class().widget_type(),
                component.class_name(),
            ) {
                Ok(role) => role.name().to_string(),
                Err(err) => {
                    registry::release_live();
                    tracing::warn!(
                        id = %component.id(),
                        class = component.class_name(),
                        parent = %parent.id(),
                        error = %err,
                        "component construction aborted"
                    );
                    return Err(err);
                }
            };
            let _ = component.0.name.set(role);
            parent.add_child(&component);
        }

        tracing::debug!(
            id = %component.id(),
            class = component.class_name(),
            role = component.name(),
            "created component"
        );

        Ok(component)
    }

    /// Build a root component.
    pub fn root<W: Widget>(
        widget: W,
        element: Element,
        input: impl Into<OptionsInput>,
    ) -> Result<Self> {
        Self::new(widget, element, input, None)
    }

    /// Build a child of this component.
    pub fn attach<W: Widget>(
        &self,
        widget: W,
        element: Element,
        input: impl Into<OptionsInput>,
    ) -> Result<Self> {
        Self::new(widget, element, input, Some(self))
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Initialize the subtree, bottom-up.
    ///
    /// Children (a snapshot, in stored order) are initialized first, then this
    /// widget's `init` hook runs, then `init` is emitted. No-op when already
    /// initialized or while initializing.
    ///
    /// Children attached after this call are not initialized by it.
    pub fn init(&self) {
        let flags = self.flags();
        if flags.intersects(LifecycleFlags::INITIALIZED | LifecycleFlags::INITIALIZING) {
            return;
        }
        self.set_flags(flags | LifecycleFlags::INITIALIZING);

        for child in self.children() {
            child.init();
        }

        self.run_hook(Hook::Init);
        self.0.notifier.emit(events::INIT, Payload::None);

        let mut flags = self.flags();
        flags.remove(LifecycleFlags::INITIALIZING);
        flags.insert(LifecycleFlags::INITIALIZED);
        self.set_flags(flags);

        tracing::debug!(id = %self.id(), class = self.class_name(), "initialized component");
    }

    /// Tear down the subtree, top-down.
    ///
    /// Runs this widget's `destroy` hook while links are intact, destroys a
    /// snapshot of the children, detaches from the parent (emitting
    /// `remove:<role>` there), then emits `destroy`. Calling it again, or
    /// from inside the running teardown, does nothing.
    pub fn destroy(&self) {
        let flags = self.flags();
        if flags.intersects(LifecycleFlags::DESTROYED | LifecycleFlags::DESTROYING) {
            return;
        }
        self.set_flags(flags | LifecycleFlags::DESTROYING);

        self.run_hook(Hook::Destroy);

        for child in self.children() {
            child.destroy();
        }

        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }

        self.0.notifier.emit(events::DESTROY, Payload::None);

        let mut flags = self.flags();
        flags.remove(LifecycleFlags::DESTROYING);
        flags.insert(LifecycleFlags::DESTROYED);
        self.set_flags(flags);
        registry::release_live();

        tracing::debug!(id = %self.id(), class = self.class_name(), "destroyed component");
    }

    pub fn is_initialized(&self) -> bool {
        self.flags().contains(LifecycleFlags::INITIALIZED)
    }

    pub fn is_destroyed(&self) -> bool {
        self.flags().contains(LifecycleFlags::DESTROYED)
    }

    /// Raw lifecycle flags, including the transient `-ING` bits.
    pub fn flags(&self) -> LifecycleFlags {
        self.0.flags.get()
    }

    fn set_flags(&self, flags: LifecycleFlags) {
        self.0.flags.set(flags);
    }

    /// Run `hook` on the widget.
    ///
    /// A `destroy` requested from inside another hook of the same widget runs
    /// as soon as that hook returns.
    fn run_hook(&self, hook: Hook) {
        let hooks = self.0.hooks.clone();
        let Ok(mut widget) = hooks.try_borrow_mut() else {
            match hook {
                Hook::Destroy => {
                    tracing::debug!(id = %self.id(), "widget busy; deferring destroy hook");
                    self.0.deferred_destroy.set(true);
                }
                _ => tracing::warn!(id = %self.id(), ?hook, "widget busy in another hook; skipping"),
            }
            return;
        };
        match hook {
            Hook::Create => widget.create(self),
            Hook::Init => widget.init(self),
            Hook::Destroy => widget.destroy(self),
        }
        drop(widget);

        if self.0.deferred_destroy.replace(false) {
            self.run_hook(Hook::Destroy);
        }
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    fn add_child(&self, child: &Component) {
        let Some(role) = child.name() else {
            return;
        };

        {
            let mut children = self.0.children.borrow_mut();
            if children.contains(child) {
                return;
            }
            children.push(child.clone());
        }
        self.0.slots.borrow_mut().attach(role, child);

        tracing::debug!(parent = %self.id(), child = %child.id(), role, "registered child");
        self.0
            .notifier
            .emit(&events::added(role), Payload::Component(child.clone()));
    }

    fn remove_child(&self, child: &Component) {
        {
            let mut children = self.0.children.borrow_mut();
            let Some(index) = children.iter().position(|existing| existing == child) else {
                return;
            };
            children.remove(index);
        }

        let Some(role) = child.name() else {
            return;
        };
        self.0.slots.borrow_mut().detach(role, child);

        tracing::debug!(parent = %self.id(), child = %child.id(), role, "deregistered child");
        self.0
            .notifier
            .emit(&events::removed(role), Payload::Component(child.clone()));
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> ComponentId {
        self.0.id
    }

    pub fn class(&self) -> &ClassDescriptor {
        &self.0.class
    }

    pub fn class_name(&self) -> &'static str {
        self.0.class.name()
    }

    /// Whether this component's widget is of type `W`.
    pub fn is<W: Widget>(&self) -> bool {
        self.0.class.widget_type() == TypeId::of::<W>()
    }

    pub fn element(&self) -> &Element {
        &self.0.element
    }

    /// Resolved options.
    pub fn options(&self) -> Ref<'_, Options> {
        self.0.options.borrow()
    }

    /// Mutable access to the resolved options. The engine never re-resolves them.
    pub fn options_mut(&self) -> RefMut<'_, Options> {
        self.0.options.borrow_mut()
    }

    /// The owning component, if any (and still alive).
    pub fn parent(&self) -> Option<Component> {
        self.0.parent.as_ref().and_then(Weak::upgrade).map(Component)
    }

    /// Class-level movability, see [`Widget::is_movable`].
    pub fn is_movable(&self) -> bool {
        self.0.class.is_movable()
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Role name under the parent. `None` for roots.
    pub fn name(&self) -> Option<&str> {
        self.0.name.get().map(String::as_str)
    }

    /// Snapshot of the children, in registration order.
    pub fn children(&self) -> Vec<Component> {
        self.0.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    /// Snapshot of the back-reference slot for `role`.
    pub fn slot(&self, role: &str) -> Option<Slot> {
        self.0.slots.borrow().get(role).cloned()
    }

    /// The child referenced under `role` (the first one for repeatable roles).
    pub fn child(&self, role: &str) -> Option<Component> {
        self.0
            .slots
            .borrow()
            .get(role)
            .and_then(Slot::first)
            .cloned()
    }

    /// All children referenced under `role`, in attach order.
    pub fn children_in(&self, role: &str) -> Vec<Component> {
        self.0
            .slots
            .borrow()
            .get(role)
            .map(Slot::components)
            .unwrap_or_default()
    }

    /// Borrow the widget state as `W`.
    ///
    /// `None` if the widget is another type, or is mutably borrowed (for
    /// example while one of its own hooks runs).
    pub fn widget<W: Widget>(&self) -> Option<Ref<'_, W>> {
        (*self.0.state)
            .downcast_ref::<RefCell<W>>()?
            .try_borrow()
            .ok()
    }

    /// Mutably borrow the widget state as `W`. Same rules as [`Self::widget`].
    pub fn widget_mut<W: Widget>(&self) -> Option<RefMut<'_, W>> {
        (*self.0.state)
            .downcast_ref::<RefCell<W>>()?
            .try_borrow_mut()
            .ok()
    }

    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn notifier(&self) -> &Notifier {
        &self.0.notifier
    }

    pub fn on<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(&Payload) + 'static,
    {
        self.0.notifier.on(event, handler)
    }

    pub fn once<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(&Payload) + 'static,
    {
        self.0.notifier.once(event, handler)
    }

    pub fn off(&self, event: &str, id: HandlerId) -> bool {
        self.0.notifier.off(event, id)
    }

    pub fn emit(&self, event: &str, payload: impl Into<Payload>) -> usize {
        self.0.notifier.emit(event, payload.into())
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.0.id)
            .field("class", &self.0.class.name())
            .field("name", &self.name())
            .field("children", &self.child_count())
            .field("flags", &self.flags())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComponentError;
    use crate::types::SlotKind;
    use crate::engine::roles::ChildRoles;
    use crate::engine::registry::{live_count, reset_registry};
    use serde_json::json;

    type Log = Rc<RefCell<Vec<String>>>;

    fn setup() -> Log {
        reset_registry();
        Rc::new(RefCell::new(Vec::new()))
    }

    /// Records every hook call as `<hook>:<label>`.
    struct Probe {
        label: &'static str,
        log: Log,
    }

    impl Probe {
        fn new(label: &'static str, log: &Log) -> Self {
            Self {
                label,
                log: log.clone(),
            }
        }

        fn record(&self, hook: &str) {
            self.log.borrow_mut().push(format!("{hook}:{}", self.label));
        }
    }

    macro_rules! probe_widget {
        ($name:ident $(, $roles:expr)?) => {
            struct $name(Probe);

            impl Widget for $name {
                $(
                    fn describe_children() -> ChildRoles {
                        $roles
                    }
                )?

                fn create(&mut self, _component: &Component) {
                    self.0.record("create");
                }

                fn init(&mut self, _component: &Component) {
                    self.0.record("init");
                }

                fn destroy(&mut self, _component: &Component) {
                    self.0.record("destroy");
                }
            }
        };
    }

    probe_widget!(Leaf);
    probe_widget!(Pager);
    probe_widget!(Track, ChildRoles::new().many::<Leaf>("item"));
    probe_widget!(
        Slider,
        ChildRoles::new().one::<Track>("track").one::<Pager>("pager")
    );
    probe_widget!(Twin, ChildRoles::new().one::<Leaf>("left").one::<Leaf>("right"));

    fn el() -> Element {
        Element::detached()
    }

    #[test]
    fn test_root_has_no_name_or_parent() {
        let log = setup();
        let root = Component::root(Slider(Probe::new("root", &log)), el(), ()).unwrap();

        assert!(root.is_root());
        assert_eq!(root.name(), None);
        assert!(root.parent().is_none());
        assert!(root.children().is_empty());
        assert_eq!(*log.borrow(), vec!["create:root"]);
        assert_eq!(live_count(), 1);
    }

    #[test]
    fn test_registration() {
        let log = setup();
        let root = Component::root(Slider(Probe::new("root", &log)), el(), ()).unwrap();
        let track = root.attach(Track(Probe::new("track", &log)), el(), ()).unwrap();

        assert_eq!(track.name(), Some("track"));
        assert_eq!(track.parent(), Some(root.clone()));
        assert_eq!(root.children(), vec![track.clone()]);
        assert_eq!(root.child("track"), Some(track.clone()));
        assert_eq!(root.child("pager"), None);
        assert_eq!(root.slot("track").map(|slot| slot.kind()), Some(SlotKind::One));
        assert!(root.slot("missing").is_none());
    }

    #[test]
    fn test_repeatable_role_collects() {
        let log = setup();
        let track = Component::root(Track(Probe::new("track", &log)), el(), ()).unwrap();
        let a = track.attach(Leaf(Probe::new("a", &log)), el(), ()).unwrap();
        let b = track.attach(Leaf(Probe::new("b", &log)), el(), ()).unwrap();

        assert_eq!(track.children_in("item"), vec![a.clone(), b.clone()]);
        assert_eq!(track.child("item"), Some(a.clone()));
        assert_eq!(track.slot("item").map(|slot| slot.len()), Some(2));
        assert_eq!(a.name(), Some("item"));
        assert_eq!(b.name(), Some("item"));
    }

    #[test]
    fn test_singular_role_overwrites() {
        let log = setup();
        let root = Component::root(Slider(Probe::new("root", &log)), el(), ()).unwrap();
        let first = root.attach(Pager(Probe::new("p1", &log)), el(), ()).unwrap();
        let second = root.attach(Pager(Probe::new("p2", &log)), el(), ()).unwrap();

        assert_eq!(root.child_count(), 2);
        assert_eq!(root.child("pager"), Some(second.clone()));

        // Detaching the stale child leaves the current reference alone.
        first.destroy();
        assert_eq!(root.child("pager"), Some(second.clone()));

        second.destroy();
        assert_eq!(root.child("pager"), None);
        assert!(root.slot("pager").is_some_and(|slot| slot.is_empty()));
    }

    #[test]
    fn test_duplicate_registration_is_noop() {
        let log = setup();
        let track = Component::root(Track(Probe::new("track", &log)), el(), ()).unwrap();
        let leaf = track.attach(Leaf(Probe::new("leaf", &log)), el(), ()).unwrap();

        let adds = Rc::new(Cell::new(0));
        let adds_clone = adds.clone();
        track.on("add:item", move |_| adds_clone.set(adds_clone.get() + 1));

        track.add_child(&leaf);
        assert_eq!(track.children(), vec![leaf.clone()]);
        assert_eq!(track.children_in("item").len(), 1);
        assert_eq!(adds.get(), 0);
    }

    #[test]
    fn test_no_such_child_role() {
        let log = setup();
        let track = Component::root(Track(Probe::new("track", &log)), el(), ()).unwrap();

        let err = track.attach(Pager(Probe::new("pager", &log)), el(), ()).unwrap_err();
        assert_eq!(
            err,
            ComponentError::NoSuchChildRole {
                parent: "Track",
                child: "Pager"
            }
        );
        assert!(track.children().is_empty());
        // create still ran before the role lookup failed
        assert_eq!(*log.borrow(), vec!["create:track", "create:pager"]);
        assert_eq!(live_count(), 1);
    }

    #[test]
    fn test_ambiguous_child_role() {
        let log = setup();
        let twin = Component::root(Twin(Probe::new("twin", &log)), el(), ()).unwrap();

        let err = twin.attach(Leaf(Probe::new("leaf", &log)), el(), ()).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::AmbiguousChildRole { ref roles, .. } if roles.len() == 2
        ));
        assert!(twin.children().is_empty());
        assert!(twin.child("left").is_none());
    }

    #[test]
    fn test_init_bottom_up() {
        let log = setup();
        let root = Component::root(Slider(Probe::new("root", &log)), el(), ()).unwrap();
        let track = root.attach(Track(Probe::new("track", &log)), el(), ()).unwrap();
        let a = track.attach(Leaf(Probe::new("a", &log)), el(), ()).unwrap();
        let b = track.attach(Leaf(Probe::new("b", &log)), el(), ()).unwrap();
        let pager = root.attach(Pager(Probe::new("pager", &log)), el(), ()).unwrap();
        log.borrow_mut().clear();

        root.init();

        assert_eq!(
            *log.borrow(),
            vec!["init:a", "init:b", "init:track", "init:pager", "init:root"]
        );
        for component in [&root, &track, &a, &b, &pager] {
            assert!(component.is_initialized());
            assert!(!component.flags().contains(LifecycleFlags::INITIALIZING));
        }
    }

    #[test]
    fn test_init_idempotent() {
        let log = setup();
        let track = Component::root(Track(Probe::new("track", &log)), el(), ()).unwrap();
        let inits = Rc::new(Cell::new(0));
        let inits_clone = inits.clone();
        track.on(events::INIT, move |payload| {
            assert!(payload.is_none());
            inits_clone.set(inits_clone.get() + 1);
        });

        track.init();
        track.init();
        assert_eq!(inits.get(), 1);
        assert_eq!(*log.borrow(), vec!["create:track", "init:track"]);
    }

    #[test]
    fn test_late_child_not_initialized() {
        let log = setup();
        let track = Component::root(Track(Probe::new("track", &log)), el(), ()).unwrap();
        track.init();

        let late = track.attach(Leaf(Probe::new("late", &log)), el(), ()).unwrap();
        track.init();
        assert!(!late.is_initialized());

        late.init();
        assert!(late.is_initialized());
    }

    #[test]
    fn test_destroy_top_down() {
        let log = setup();
        let root = Component::root(Slider(Probe::new("root", &log)), el(), ()).unwrap();
        let track = root.attach(Track(Probe::new("track", &log)), el(), ()).unwrap();
        let leaf = track.attach(Leaf(Probe::new("leaf", &log)), el(), ()).unwrap();
        root.init();
        log.borrow_mut().clear();

        root.destroy();

        assert_eq!(
            *log.borrow(),
            vec!["destroy:root", "destroy:track", "destroy:leaf"]
        );
        assert!(root.is_destroyed() && track.is_destroyed() && leaf.is_destroyed());
        assert!(root.children().is_empty());
        assert!(track.children().is_empty());
        assert!(root.child("track").is_none());
        assert_eq!(live_count(), 0);
    }

    #[test]
    fn test_destroy_idempotent() {
        let log = setup();
        let track = Component::root(Track(Probe::new("track", &log)), el(), ()).unwrap();
        let leaf = track.attach(Leaf(Probe::new("leaf", &log)), el(), ()).unwrap();

        let removes = Rc::new(Cell::new(0));
        let removes_clone = removes.clone();
        track.on("remove:item", move |_| removes_clone.set(removes_clone.get() + 1));

        leaf.destroy();
        leaf.destroy();

        assert_eq!(removes.get(), 1);
        assert_eq!(
            log.borrow().iter().filter(|entry| *entry == "destroy:leaf").count(),
            1
        );
        assert_eq!(live_count(), 1);
    }

    #[test]
    fn test_init_after_destroy_still_runs() {
        let log = setup();
        let leaf = Component::root(Leaf(Probe::new("leaf", &log)), el(), ()).unwrap();
        leaf.destroy();
        leaf.init();

        assert!(leaf.is_initialized());
        assert!(leaf.is_destroyed());
        assert_eq!(
            *log.borrow(),
            vec!["create:leaf", "destroy:leaf", "init:leaf"]
        );
    }

    /// Destroys its own component from the hook named by `on_init`.
    struct SelfDestruct {
        on_init: bool,
        log: Log,
    }

    impl Widget for SelfDestruct {
        fn create(&mut self, component: &Component) {
            self.log.borrow_mut().push("create".to_string());
            if !self.on_init {
                component.destroy();
            }
        }

        fn init(&mut self, component: &Component) {
            self.log.borrow_mut().push("init".to_string());
            if self.on_init {
                component.destroy();
            }
        }

        fn destroy(&mut self, _component: &Component) {
            self.log.borrow_mut().push("destroy".to_string());
        }
    }

    struct Host;
    impl Widget for Host {
        fn describe_children() -> ChildRoles {
            ChildRoles::new().many::<SelfDestruct>("part")
        }
    }

    #[test]
    fn test_destroy_from_own_init_runs_hook() {
        let log = setup();
        let host = Component::root(Host, el(), ()).unwrap();
        let part = host
            .attach(SelfDestruct { on_init: true, log: log.clone() }, el(), ())
            .unwrap();
        assert_eq!(host.children(), vec![part.clone()]);

        host.init();

        assert!(part.is_destroyed());
        assert_eq!(*log.borrow(), vec!["create", "init", "destroy"]);
        assert!(host.children().is_empty());
        assert!(host.children_in("part").is_empty());

        part.destroy();
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_destroy_from_own_create_skips_registration() {
        let log = setup();
        let host = Component::root(Host, el(), ()).unwrap();
        let adds = Rc::new(Cell::new(0));
        let adds_clone = adds.clone();
        host.on("add:part", move |_| adds_clone.set(adds_clone.get() + 1));

        let part = host
            .attach(SelfDestruct { on_init: false, log: log.clone() }, el(), ())
            .unwrap();

        assert!(part.is_destroyed());
        assert_eq!(part.name(), None);
        assert_eq!(*log.borrow(), vec!["create", "destroy"]);
        assert!(host.children().is_empty());
        assert_eq!(adds.get(), 0);
        assert_eq!(live_count(), 1);

        host.destroy();
        assert!(host.children().is_empty());
        assert_eq!(live_count(), 0);
    }

    #[test]
    fn test_is_on_attached_child() {
        let log = setup();
        let track = Component::root(Track(Probe::new("track", &log)), el(), ()).unwrap();
        let leaf = track.attach(Leaf(Probe::new("leaf", &log)), el(), ()).unwrap();

        assert!(leaf.is::<Leaf>());
        assert!(!leaf.is::<Track>());
        assert!(track.is::<Track>());
        assert!(leaf.is_movable());
    }

    #[test]
    fn test_hook_sees_links_during_destroy() {
        struct Inspect(Rc<RefCell<Option<(usize, bool)>>>);
        impl Widget for Inspect {
            fn describe_children() -> ChildRoles {
                ChildRoles::new().many::<Plain>("plain")
            }

            fn destroy(&mut self, component: &Component) {
                *self.0.borrow_mut() = Some((component.child_count(), component.parent().is_some()));
            }
        }

        struct Plain;
        impl Widget for Plain {}

        struct Holder;
        impl Widget for Holder {
            fn describe_children() -> ChildRoles {
                ChildRoles::new().one::<Inspect>("inner")
            }
        }

        setup();
        let seen = Rc::new(RefCell::new(None));
        let holder = Component::root(Holder, el(), ()).unwrap();
        let inner = holder.attach(Inspect(seen.clone()), el(), ()).unwrap();
        inner.attach(Plain, el(), ()).unwrap();
        inner.attach(Plain, el(), ()).unwrap();

        holder.destroy();
        assert_eq!(*seen.borrow(), Some((2, true)));
    }

    #[test]
    fn test_options_resolved_per_class() {
        struct Configured;
        impl Widget for Configured {
            fn describe_defaults() -> Options {
                Options::from_value(json!({ "speed": 500, "nested": { "a": 1, "b": 1 } }))
            }

            fn describe_presets() -> crate::options::Presets {
                crate::options::Presets::from_value(json!({ "fast": { "speed": 100 } }))
            }
        }

        setup();
        let plain = Component::root(Configured, el(), ()).unwrap();
        assert_eq!(plain.options().get_as::<u32>("speed"), Some(500));

        let fast = Component::root(Configured, el(), "fast").unwrap();
        assert_eq!(fast.options().get_as::<u32>("speed"), Some(100));

        let tuned = Component::root(
            Configured,
            el(),
            json!({ "$preset": "fast", "nested": { "b": 2 } }),
        )
        .unwrap();
        assert_eq!(
            tuned.options().clone().into_value(),
            json!({ "speed": 100, "nested": { "a": 1, "b": 2 } })
        );

        tuned.options_mut().insert("speed", json!(1));
        assert_eq!(tuned.options().get_as::<u32>("speed"), Some(1));
        assert_eq!(plain.options().get_as::<u32>("speed"), Some(500));

        let err = Component::root(Configured, el(), "slow").unwrap_err();
        assert!(matches!(err, ComponentError::UnknownPreset { .. }));
    }

    #[test]
    fn test_widget_access() {
        struct Counter(u32);
        impl Widget for Counter {
            fn init(&mut self, component: &Component) {
                self.0 += 1;
                // the widget is busy while its own hook runs
                assert!(component.widget::<Counter>().is_none());
            }
        }

        setup();
        let counter = Component::root(Counter(0), el(), ()).unwrap();
        counter.init();

        assert!(counter.is::<Counter>());
        assert_eq!(counter.widget::<Counter>().map(|w| w.0), Some(1));
        assert!(counter.widget::<Leaf>().is_none());

        if let Some(mut widget) = counter.widget_mut::<Counter>() {
            widget.0 = 10;
        }
        assert_eq!(counter.widget::<Counter>().map(|w| w.0), Some(10));
    }

    #[test]
    fn test_dropping_root_drops_tree() {
        let log = setup();
        let track = Component::root(Track(Probe::new("track", &log)), el(), ()).unwrap();
        let weak_leaf = track
            .attach(Leaf(Probe::new("leaf", &log)), el(), ())
            .unwrap()
            .downgrade();

        assert!(weak_leaf.upgrade().is_some());
        drop(track);
        assert!(weak_leaf.upgrade().is_none());
    }

    #[test]
    fn test_element_is_kept() {
        let log = setup();
        let element = Element::new("section.carousel");
        let leaf = Component::root(Leaf(Probe::new("leaf", &log)), element.clone(), ()).unwrap();
        assert!(leaf.element().ptr_eq(&element));
        assert_eq!(leaf.element().downcast_ref::<&str>(), Some(&"section.carousel"));
    }
}
