//! Persistable entity base contract.
//!
//! # Responsibility
//! - Hold the state every storable domain object shares: row identity,
//!   cached base attributes, lineage and validity.
//! - Funnel every attribute mutation through one cache+persist+notify
//!   primitive.
//!
//! # Invariants
//! - (`table`, `key`) identify the backing row; `key == 0` means no row
//!   exists yet and writes stay cached until insertion.
//! - Cached fields are lazily materialized: first read fetches from the
//!   store, later reads serve the cache.
//! - `valid` moves to `false` at most once and never back.
//! - Dropping an entity never touches the backing row; deletion is the
//!   `deleted` flag.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::property::{ChangeHub, Property, PropertyChange};
use crate::model::table::Table;
use crate::model::value::Value;
use crate::repo::record_store::{RecordStore, StoreError, StoreResult};

/// Cache state of one column-backed attribute.
///
/// `Cached` holds a value the backing store has not seen yet; `Persisted`
/// holds a value known to match the store.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedField<T> {
    Unknown,
    Cached(T),
    Persisted(T),
}

impl<T> CachedField<T> {
    /// The cached value regardless of persistence state.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Unknown => None,
            Self::Cached(value) | Self::Persisted(value) => Some(value),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}

impl<T: Clone> CachedField<T> {
    /// Copy for an unsaved clone: persisted values become merely cached.
    fn demoted(&self) -> Self {
        match self {
            Self::Unknown => Self::Unknown,
            Self::Cached(value) | Self::Persisted(value) => Self::Cached(value.clone()),
        }
    }

    /// Marks a cached value as matching the store, after insertion.
    fn promote(&mut self) {
        if let Self::Cached(value) = self {
            *self = Self::Persisted(value.clone());
        }
    }
}

/// Common state of every persistable domain entity.
///
/// Concrete types compose this struct and add their own cached columns; all
/// of their mutations go through [`EntityCore::set_easy`] so cache, store
/// and observers never disagree.
#[derive(Debug)]
pub struct EntityCore {
    table: Table,
    key: i64,
    parent_key: i64,
    valid: bool,
    name: CachedField<String>,
    deleted: CachedField<bool>,
    display: CachedField<bool>,
    folder: CachedField<String>,
}

impl EntityCore {
    /// Creates a fresh, unsaved entity with seeded caches.
    pub fn new(
        table: Table,
        name: impl Into<String>,
        display: bool,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            table,
            key: 0,
            parent_key: 0,
            valid: true,
            name: CachedField::Cached(name.into()),
            deleted: CachedField::Cached(false),
            display: CachedField::Cached(display),
            folder: CachedField::Cached(folder.into()),
        }
    }

    /// Binds to an existing row; attributes materialize on first read.
    pub fn from_row(table: Table, key: i64) -> Self {
        Self {
            table,
            key,
            parent_key: 0,
            valid: true,
            name: CachedField::Unknown,
            deleted: CachedField::Unknown,
            display: CachedField::Unknown,
            folder: CachedField::Unknown,
        }
    }

    /// Duplicates cached scalar state into a new, unsaved entity.
    ///
    /// The clone has no row binding and no parent; record lineage separately
    /// with [`EntityCore::set_parent`].
    pub fn clone_unsaved(&self) -> Self {
        Self {
            table: self.table,
            key: 0,
            parent_key: 0,
            valid: self.valid,
            name: self.name.demoted(),
            deleted: self.deleted.demoted(),
            display: self.display.demoted(),
            folder: self.folder.demoted(),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Row key; `0` until the entity is inserted.
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Key of the entity this one was cloned from; `0` means none.
    pub fn parent_key(&self) -> i64 {
        self.parent_key
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Flags this entity as structurally broken, e.g. after a failed
    /// import. One-way; there is no operation to restore validity.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Records that this entity was cloned from `parent`.
    ///
    /// Only the relation is stored; attribute state was already duplicated
    /// by the clone path. An unsaved parent leaves the relation unresolved.
    pub fn set_parent(&mut self, parent: &EntityCore) -> StoreResult<()> {
        if parent.table != self.table {
            return Err(StoreError::TableMismatch {
                expected: self.table.sql_name(),
                found: parent.table.sql_name(),
            });
        }
        self.parent_key = parent.key;
        Ok(())
    }

    /// Adopts the key assigned by a completed insert and marks every cached
    /// attribute as persisted.
    pub fn bind_key(&mut self, key: i64) {
        self.key = key;
        self.name.promote();
        self.deleted.promote();
        self.display.promote();
        self.folder.promote();
    }

    /// Cache state for a value a concrete type is about to remember,
    /// matching whether this entity has a backing row.
    pub fn cache_state<T>(&self, value: T) -> CachedField<T> {
        if self.key != 0 {
            CachedField::Persisted(value)
        } else {
            CachedField::Cached(value)
        }
    }

    /// Reads the authoritative value of `column` for this entity's row.
    ///
    /// Returns `Value::None` when the entity has no row yet, the row is
    /// absent, or the column is unknown for this table; callers treat that
    /// as "not yet persisted".
    pub fn get(&self, store: &dyn RecordStore, column: &str) -> StoreResult<Value> {
        if self.key == 0 {
            return Ok(Value::None);
        }
        match store.read_column(self.table, self.key, column) {
            Ok(Some(value)) => Ok(value),
            Ok(None) | Err(StoreError::UnknownColumn { .. }) => Ok(Value::None),
            Err(err) => Err(err),
        }
    }

    /// The single mutation primitive: persist (when a row exists), cache,
    /// then notify.
    ///
    /// Base properties update the matching cache field; properties owned by
    /// a concrete type only persist and notify here, and the concrete type
    /// maintains its own cache. The three steps are never partially
    /// applied: a store failure leaves cache and observers untouched.
    pub fn set_easy(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        property: Property,
        value: Value,
        notify: bool,
    ) -> StoreResult<()> {
        self.check_base_property(property, &value)?;

        if self.key != 0 {
            store.write_column(self.table, self.key, property.column(), &value)?;
        }
        self.apply_to_cache(property, &value);

        if notify {
            hub.publish(&PropertyChange {
                table: self.table,
                key: self.key,
                property,
                value,
            });
        }
        Ok(())
    }

    /// Cached-only write: updates the matching base cache field without
    /// touching the store or notifying anyone.
    ///
    /// Used while an entity accumulates state before its row exists, and by
    /// load paths that already hold the authoritative value.
    pub fn set_cached(&mut self, property: Property, value: Value) -> StoreResult<()> {
        match property {
            Property::Name | Property::Deleted | Property::Display | Property::Folder => {
                self.check_base_property(property, &value)?;
                self.apply_to_cache(property, &value);
                Ok(())
            }
            other => Err(StoreError::UnknownColumn {
                table: self.table.sql_name(),
                column: other.column().to_string(),
            }),
        }
    }

    /// Display name; empty until the entity is named or persisted.
    pub fn name(&mut self, store: &dyn RecordStore) -> StoreResult<String> {
        if let Some(value) = self.name.value() {
            return Ok(value.clone());
        }
        match self.fetch(store, Property::Name)?.and_then(text_value) {
            Some(value) => {
                self.name = CachedField::Persisted(value.clone());
                Ok(value)
            }
            None => Ok(String::new()),
        }
    }

    pub fn set_name(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        value: impl Into<String>,
    ) -> StoreResult<()> {
        self.set_easy(store, hub, Property::Name, Value::Text(value.into()), true)
    }

    /// Soft-delete flag; independent of `display`.
    pub fn deleted(&mut self, store: &dyn RecordStore) -> StoreResult<bool> {
        self.flag(store, Property::Deleted)
    }

    pub fn set_deleted(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        value: bool,
    ) -> StoreResult<()> {
        self.set_easy(store, hub, Property::Deleted, Value::Bool(value), true)
    }

    /// Visibility flag; independent of `deleted`.
    pub fn display(&mut self, store: &dyn RecordStore) -> StoreResult<bool> {
        self.flag(store, Property::Display)
    }

    pub fn set_display(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        value: bool,
    ) -> StoreResult<()> {
        self.set_easy(store, hub, Property::Display, Value::Bool(value), true)
    }

    /// Grouping/category path; empty when the entity is unfiled.
    pub fn folder(&mut self, store: &dyn RecordStore) -> StoreResult<String> {
        if let Some(value) = self.folder.value() {
            return Ok(value.clone());
        }
        match self.fetch(store, Property::Folder)?.and_then(text_value) {
            Some(value) => {
                self.folder = CachedField::Persisted(value.clone());
                Ok(value)
            }
            None => Ok(String::new()),
        }
    }

    pub fn set_folder(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        value: impl Into<String>,
        notify: bool,
    ) -> StoreResult<()> {
        self.set_easy(
            store,
            hub,
            Property::Folder,
            Value::Text(value.into()),
            notify,
        )
    }

    /// Writes the stock quantity on the linked inventory row.
    ///
    /// Pass `inv_key == 0` to have the row resolved by owner, creating it
    /// on first use. Requires a persisted owner, since the inventory row
    /// references it.
    pub fn set_inventory(
        &mut self,
        store: &dyn RecordStore,
        hub: &ChangeHub,
        value: Value,
        inv_key: i64,
        notify: bool,
    ) -> StoreResult<()> {
        if self.key == 0 {
            return Err(StoreError::UnsavedEntity {
                table: self.table.sql_name(),
            });
        }

        let inv_key = if inv_key != 0 {
            inv_key
        } else {
            match store.inventory_key(self.table, self.key)? {
                Some(existing) => existing,
                None => store.inventory_create(self.table, self.key)?,
            }
        };

        store.inventory_write(self.table, inv_key, Property::Inventory.column(), &value)?;

        if notify {
            hub.publish(&PropertyChange {
                table: self.table,
                key: self.key,
                property: Property::Inventory,
                value,
            });
        }
        Ok(())
    }

    /// Reads one column of the linked inventory row.
    ///
    /// `Value::None` when the owner is unsaved or no inventory row exists
    /// yet; callers treat that as zero stock.
    pub fn get_inventory(&self, store: &dyn RecordStore, column: &str) -> StoreResult<Value> {
        if self.key == 0 {
            return Ok(Value::None);
        }
        match store.inventory_read(self.table, self.key, column)? {
            Some(value) => Ok(value),
            None => Ok(Value::None),
        }
    }

    /// Column/value list of the base state, used by concrete inserts.
    ///
    /// Unknown caches fall back to the column defaults.
    pub fn base_column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            (
                Property::Name.column(),
                Value::Text(self.name.value().cloned().unwrap_or_default()),
            ),
            (
                Property::Deleted.column(),
                Value::Bool(self.deleted.value().copied().unwrap_or(false)),
            ),
            (
                Property::Display.column(),
                Value::Bool(self.display.value().copied().unwrap_or(false)),
            ),
            (
                Property::Folder.column(),
                Value::Text(self.folder.value().cloned().unwrap_or_default()),
            ),
        ]
    }

    fn flag(&mut self, store: &dyn RecordStore, property: Property) -> StoreResult<bool> {
        let field = match property {
            Property::Deleted => &self.deleted,
            _ => &self.display,
        };
        if let Some(value) = field.value() {
            return Ok(*value);
        }
        match self.fetch(store, property)?.and_then(|v| v.as_bool()) {
            Some(value) => {
                let loaded = CachedField::Persisted(value);
                match property {
                    Property::Deleted => self.deleted = loaded,
                    _ => self.display = loaded,
                }
                Ok(value)
            }
            None => Ok(false),
        }
    }

    /// Raw fetch for lazy materialization; `None` when no row value exists.
    fn fetch(&self, store: &dyn RecordStore, property: Property) -> StoreResult<Option<Value>> {
        if self.key == 0 {
            return Ok(None);
        }
        match store.read_column(self.table, self.key, property.column())? {
            Some(Value::None) | None => Ok(None),
            Some(value) => Ok(Some(value)),
        }
    }

    fn check_base_property(&self, property: Property, value: &Value) -> StoreResult<()> {
        let expected = match property {
            Property::Name | Property::Folder => {
                if matches!(value, Value::Text(_)) {
                    return Ok(());
                }
                "text"
            }
            Property::Deleted | Property::Display => {
                if matches!(value, Value::Bool(_)) {
                    return Ok(());
                }
                "bool"
            }
            _ => return Ok(()),
        };
        Err(StoreError::TypeMismatch {
            column: property.column().to_string(),
            expected,
            found: value.type_name(),
        })
    }

    fn apply_to_cache(&mut self, property: Property, value: &Value) {
        match (property, value) {
            (Property::Name, Value::Text(text)) => {
                self.name = self.cache_state(text.clone());
            }
            (Property::Deleted, Value::Bool(flag)) => {
                self.deleted = self.cache_state(*flag);
            }
            (Property::Display, Value::Bool(flag)) => {
                self.display = self.cache_state(*flag);
            }
            (Property::Folder, Value::Text(text)) => {
                self.folder = self.cache_state(text.clone());
            }
            _ => {}
        }
    }
}

/// Per-type operations the base contract cannot supply itself.
///
/// Resolving a parent key needs the concrete owning collection, and
/// inserting a row needs the full column set of the concrete type, so both
/// live here. Resurrecting a soft-deleted entity goes through
/// `insert_in_database` without the caller naming the concrete type.
pub trait PersistentEntity: Sized {
    /// Interchange format version of this concrete type.
    const VERSION: i32;

    /// Owning collection used to resolve parent keys to live objects.
    type Collection;

    fn core(&self) -> &EntityCore;

    fn core_mut(&mut self) -> &mut EntityCore;

    /// Inserts this never-persisted entity and returns the assigned key.
    fn insert_in_database(&mut self, store: &dyn RecordStore) -> StoreResult<i64>;

    /// Resolves `parent_key` against the owning collection.
    ///
    /// `None` when no parent exists or it is not (yet) in the collection.
    fn parent<'a>(&self, collection: &'a Self::Collection) -> Option<&'a Self>;

    fn version(&self) -> i32 {
        Self::VERSION
    }
}

fn text_value(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        _ => None,
    }
}
