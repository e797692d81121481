//! Role slots - a parent's named back-references to its children.
//!
//! Every role a class declares gets a slot when an instance is built:
//! `SlotKind::One` keeps the latest attached child, `SlotKind::Many` keeps
//! all of them in attach order. Slots are only changed by child registration
//! and deregistration.

use std::collections::BTreeMap;

use crate::types::SlotKind;
use super::component::Component;
use super::roles::ChildRoles;

/// Back-reference(s) held under one role.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    One(Option<Component>),
    Many(Vec<Component>),
}

impl Slot {
    fn empty(kind: SlotKind) -> Self {
        match kind {
            SlotKind::One => Self::One(None),
            SlotKind::Many => Self::Many(Vec::new()),
        }
    }

    pub fn kind(&self) -> SlotKind {
        match self {
            Self::One(_) => SlotKind::One,
            Self::Many(_) => SlotKind::Many,
        }
    }

    /// The single child, or the first of many.
    pub fn first(&self) -> Option<&Component> {
        match self {
            Self::One(child) => child.as_ref(),
            Self::Many(children) => children.first(),
        }
    }

    /// All referenced children, in attach order.
    pub fn components(&self) -> Vec<Component> {
        match self {
            Self::One(child) => child.iter().cloned().collect(),
            Self::Many(children) => children.clone(),
        }
    }

    pub fn contains(&self, component: &Component) -> bool {
        match self {
            Self::One(child) => child.as_ref() == Some(component),
            Self::Many(children) => children.contains(component),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(child) => usize::from(child.is_some()),
            Self::Many(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All slots of one component, keyed by role name.
#[derive(Debug, Default)]
pub(crate) struct Slots(BTreeMap<String, Slot>);

impl Slots {
    /// One empty slot per declared role.
    pub(crate) fn from_roles(roles: &ChildRoles) -> Self {
        Self(
            roles
                .iter()
                .map(|role| (role.name().to_string(), Slot::empty(role.kind())))
                .collect(),
        )
    }

    pub(crate) fn get(&self, role: &str) -> Option<&Slot> {
        self.0.get(role)
    }

    /// Reference `child` under `role`.
    pub(crate) fn attach(&mut self, role: &str, child: &Component) {
        let slot = self
            .0
            .entry(role.to_string())
            .or_insert_with(|| Slot::empty(SlotKind::One));
        match slot {
            Slot::One(current) => *current = Some(child.clone()),
            Slot::Many(children) => {
                if !children.contains(child) {
                    children.push(child.clone());
                }
            }
        }
    }

    /// Drop the reference to `child` under `role`, if it is there.
    pub(crate) fn detach(&mut self, role: &str, child: &Component) {
        match self.0.get_mut(role) {
            Some(Slot::One(current)) => {
                if current.as_ref() == Some(child) {
                    *current = None;
                }
            }
            Some(Slot::Many(children)) => children.retain(|existing| existing != child),
            None => {}
        }
    }
}
