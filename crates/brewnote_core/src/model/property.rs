//! Observable entity properties and synchronous change notification.
//!
//! # Responsibility
//! - Enumerate every property a mutation can report, with its backing
//!   column name.
//! - Deliver change events to registered observers synchronously with the
//!   triggering mutation.
//!
//! # Invariants
//! - Delivery happens on the caller's thread; the hub performs no locking.
//! - Observers registered before a mutation see exactly one event per
//!   notifying write.
//! - Observers may subscribe/unsubscribe or trigger further (non-cyclic)
//!   mutations from inside a callback.

use crate::model::table::Table;
use crate::model::value::Value;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Identity of one observable entity property.
///
/// This is the closed set a mutation can name; each variant maps to the
/// backing column it is persisted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Name,
    Deleted,
    Display,
    Folder,
    Inventory,
    Alpha,
    Origin,
    Notes,
}

impl Property {
    /// Backing column for this property.
    ///
    /// `Inventory` addresses the linked inventory row, not the entity row.
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Deleted => "deleted",
            Self::Display => "display",
            Self::Folder => "folder",
            Self::Inventory => "amount",
            Self::Alpha => "alpha",
            Self::Origin => "origin",
            Self::Notes => "notes",
        }
    }
}

/// One applied mutation, as delivered to observers.
///
/// `key` is `0` when the mutated entity has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub table: Table,
    pub key: i64,
    pub property: Property,
    pub value: Value,
}

/// Handle returned by [`ChangeHub::subscribe`], used to unsubscribe.
pub type SubscriberId = u64;

type Observer = Rc<dyn Fn(&PropertyChange)>;

/// Synchronous, single-threaded change-notification channel.
///
/// Mutating entity code publishes one event per notifying write; zero, one
/// or many observers receive it before the mutation call returns. The
/// subscriber list is snapshotted before dispatch, so a callback may freely
/// subscribe or unsubscribe; it will not affect the in-flight delivery.
#[derive(Default)]
pub struct ChangeHub {
    observers: RefCell<Vec<(SubscriberId, Observer)>>,
    next_id: Cell<SubscriberId>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer and returns its handle.
    pub fn subscribe(&self, observer: impl Fn(&PropertyChange) + 'static) -> SubscriberId {
        let id = self.next_id.get().wrapping_add(1);
        self.next_id.set(id);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    /// Removes one observer; returns false when the handle is unknown.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Delivers `change` to every observer registered at call time.
    pub fn publish(&self, change: &PropertyChange) {
        let snapshot: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in snapshot {
            observer(change);
        }
    }
}
