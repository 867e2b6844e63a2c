//! Hop domain entity: the reference concrete type over `EntityCore`.
//!
//! # Invariants
//! - Every hop mutation funnels through `EntityCore::set_easy`.
//! - Parent resolution stays within the owning `HopCollection`.

use crate::model::entity::{CachedField, EntityCore, PersistentEntity};
use crate::model::property::{ChangeHub, Property};
use crate::model::table::Table;
use crate::model::value::Value;
use crate::repo::record_store::{RecordStore, StoreError, StoreResult};
use std::collections::BTreeMap;

/// One hop variety, stock-trackable and usable in recipes.
#[derive(Debug)]
pub struct Hop {
    core: EntityCore,
    alpha: CachedField<f64>,
    origin: CachedField<String>,
    notes: CachedField<String>,
}

impl Hop {
    /// Creates a fresh, unsaved hop.
    pub fn new(name: impl Into<String>, display: bool, folder: impl Into<String>) -> Self {
        Self {
            core: EntityCore::new(Table::Hop, name, display, folder),
            alpha: CachedField::Cached(0.0),
            origin: CachedField::Cached(String::new()),
            notes: CachedField::Cached(String::new()),
        }
    }

    /// Binds to an existing hop row; columns materialize on first read.
    pub fn from_row(key: i64) -> Self {
        Self {
            core: EntityCore::from_row(Table::Hop, key),
            alpha: CachedField::Unknown,
            origin: CachedField::Unknown,
            notes: CachedField::Unknown,
        }
    }

    /// Duplicates this hop into a new, unsaved one.
    ///
    /// Used when a hop is added to a recipe: the copy carries the attribute
    /// state, and the caller records lineage via [`Hop::set_parent`].
    pub fn clone_unsaved(&self) -> Self {
        Self {
            core: self.core.clone_unsaved(),
            alpha: self
                .alpha
                .value()
                .map_or(CachedField::Unknown, |v| CachedField::Cached(*v)),
            origin: self
                .origin
                .value()
                .map_or(CachedField::Unknown, |v| CachedField::Cached(v.clone())),
            notes: self
                .notes
                .value()
                .map_or(CachedField::Unknown, |v| CachedField::Cached(v.clone())),
        }
    }

    /// Records that this hop was cloned from `parent`.
    pub fn set_parent(&mut self, parent: &Hop) -> StoreResult<()> {
        self.core.set_parent(&parent.core)
    }

    /// Alpha acid percentage; `0.0` until set or persisted.
    pub fn alpha(&mut self, store: &dyn RecordStore) -> StoreResult<f64> {
        if let Some(value) = self.alpha.value() {
            return Ok(*value);
        }
        match self.core.get(store, Property::Alpha.column())? {
            Value::Double(value) => {
                self.alpha = CachedField::Persisted(value);
                Ok(value)
            }
            Value::None => Ok(0.0),
            other => Err(StoreError::InvalidData(format!(
                "hop.alpha holds {}",
                other.type_name()
            ))),
        }
    }

    pub fn set_alpha(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        value: f64,
    ) -> StoreResult<()> {
        self.core
            .set_easy(store, hub, Property::Alpha, Value::Double(value), true)?;
        self.alpha = self.core.cache_state(value);
        Ok(())
    }

    /// Country/region of origin; empty when unknown.
    pub fn origin(&mut self, store: &dyn RecordStore) -> StoreResult<String> {
        if let Some(value) = self.origin.value() {
            return Ok(value.clone());
        }
        match self.core.get(store, Property::Origin.column())? {
            Value::Text(value) => {
                self.origin = CachedField::Persisted(value.clone());
                Ok(value)
            }
            Value::None => Ok(String::new()),
            other => Err(StoreError::InvalidData(format!(
                "hop.origin holds {}",
                other.type_name()
            ))),
        }
    }

    pub fn set_origin(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        value: impl Into<String>,
    ) -> StoreResult<()> {
        let value = value.into();
        self.core
            .set_easy(store, hub, Property::Origin, Value::Text(value.clone()), true)?;
        self.origin = self.core.cache_state(value);
        Ok(())
    }

    pub fn notes(&mut self, store: &dyn RecordStore) -> StoreResult<String> {
        if let Some(value) = self.notes.value() {
            return Ok(value.clone());
        }
        match self.core.get(store, Property::Notes.column())? {
            Value::Text(value) => {
                self.notes = CachedField::Persisted(value.clone());
                Ok(value)
            }
            Value::None => Ok(String::new()),
            other => Err(StoreError::InvalidData(format!(
                "hop.notes holds {}",
                other.type_name()
            ))),
        }
    }

    pub fn set_notes(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        value: impl Into<String>,
    ) -> StoreResult<()> {
        let value = value.into();
        self.core
            .set_easy(store, hub, Property::Notes, Value::Text(value.clone()), true)?;
        self.notes = self.core.cache_state(value);
        Ok(())
    }
}

impl PersistentEntity for Hop {
    const VERSION: i32 = 1;

    type Collection = HopCollection;

    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn insert_in_database(&mut self, store: &dyn RecordStore) -> StoreResult<i64> {
        if self.core.key() != 0 {
            return Err(StoreError::InvalidData(format!(
                "hop {} already has a row",
                self.core.key()
            )));
        }

        let mut values = self.core.base_column_values();
        values.push((
            Property::Alpha.column(),
            Value::Double(self.alpha.value().copied().unwrap_or(0.0)),
        ));
        values.push((
            Property::Origin.column(),
            Value::Text(self.origin.value().cloned().unwrap_or_default()),
        ));
        values.push((
            Property::Notes.column(),
            Value::Text(self.notes.value().cloned().unwrap_or_default()),
        ));

        let key = store.insert_row(Table::Hop, &values)?;
        self.core.bind_key(key);
        self.alpha = CachedField::Persisted(self.alpha.value().copied().unwrap_or(0.0));
        self.origin =
            CachedField::Persisted(self.origin.value().cloned().unwrap_or_default());
        self.notes = CachedField::Persisted(self.notes.value().cloned().unwrap_or_default());
        Ok(key)
    }

    fn parent<'a>(&self, collection: &'a HopCollection) -> Option<&'a Hop> {
        match self.core.parent_key() {
            0 => None,
            parent_key => collection.get(parent_key),
        }
    }
}

/// Owning collection of hops, keyed by row key.
#[derive(Debug, Default)]
pub struct HopCollection {
    hops: BTreeMap<i64, Hop>,
}

impl HopCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a persisted hop; rejects unsaved ones, since the
    /// collection is keyed by row key.
    pub fn adopt(&mut self, hop: Hop) -> StoreResult<i64> {
        let key = hop.core().key();
        if key == 0 {
            return Err(StoreError::UnsavedEntity {
                table: Table::Hop.sql_name(),
            });
        }
        self.hops.insert(key, hop);
        Ok(key)
    }

    pub fn get(&self, key: i64) -> Option<&Hop> {
        self.hops.get(&key)
    }

    pub fn get_mut(&mut self, key: i64) -> Option<&mut Hop> {
        self.hops.get_mut(&key)
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hop> {
        self.hops.values()
    }
}
