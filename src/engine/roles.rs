//! Child roles - how a parent class names the children it accepts.
//!
//! A parent declares a role name per child class, plus the shape of its
//! back-reference for that role. When a child is constructed under a parent,
//! its role name is found by looking up the child's exact class in the
//! parent's declaration. There is no fallback naming scheme.

use std::any::TypeId;

use crate::error::{ComponentError, Result};
use crate::types::SlotKind;
use super::widget::Widget;

/// One declared role: `name` accepts children of exactly `class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRole {
    name: String,
    class: TypeId,
    class_name: &'static str,
    kind: SlotKind,
}

impl ChildRole {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> TypeId {
        self.class
    }

    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }
}

/// Role name -> child class declaration of a component class.
///
/// ```rust
/// use spark_components::{ChildRoles, Widget};
///
/// struct Item;
/// impl Widget for Item {}
///
/// struct Pager;
/// impl Widget for Pager {}
///
/// let roles = ChildRoles::new()
///     .many::<Item>("item")
///     .one::<Pager>("pager");
/// assert_eq!(roles.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildRoles(Vec<ChildRole>);

impl ChildRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a role whose back-reference holds a single child.
    pub fn one<W: Widget>(self, role: impl Into<String>) -> Self {
        self.declare::<W>(role, SlotKind::One)
    }

    /// Declare a role whose back-reference collects every child.
    pub fn many<W: Widget>(self, role: impl Into<String>) -> Self {
        self.declare::<W>(role, SlotKind::Many)
    }

    /// Declare a role. Re-declaring a role name replaces the earlier entry.
    pub fn declare<W: Widget>(mut self, role: impl Into<String>, kind: SlotKind) -> Self {
        let entry = ChildRole {
            name: role.into(),
            class: TypeId::of::<W>(),
            class_name: W::class_name(),
            kind,
        };
        match self.0.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.0.push(entry),
        }
        self
    }

    /// Look up a role by name.
    pub fn get(&self, role: &str) -> Option<&ChildRole> {
        self.0.iter().find(|entry| entry.name == role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChildRole> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Find the role a child of class `child` takes under a `parent` of this declaration.
    ///
    /// Exactly one matching entry is required: none is
    /// [`ComponentError::NoSuchChildRole`], several is
    /// [`ComponentError::AmbiguousChildRole`].
    pub fn resolve(
        &self,
        parent: &'static str,
        child: TypeId,
        child_name: &'static str,
    ) -> Result<&ChildRole> {
        let mut matches = self.0.iter().filter(|entry| entry.class == child);

        match (matches.next(), matches.next()) {
            (Some(role), None) => Ok(role),
            (None, _) => Err(ComponentError::NoSuchChildRole {
                parent,
                child: child_name,
            }),
            (Some(_), Some(_)) => Err(ComponentError::AmbiguousChildRole {
                parent,
                child: child_name,
                roles: self
                    .0
                    .iter()
                    .filter(|entry| entry.class == child)
                    .map(|entry| entry.name.clone())
                    .collect(),
            }),
        }
    }
}
