use brewnote_core::db::open_db_in_memory;
use brewnote_core::{
    ChangeHub, EntityCore, Hop, PersistentEntity, Property, PropertyChange, RecordStore,
    SqliteRecordStore, StoreError, Table, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn inventory_reads_none_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let mut hop = Hop::new("Cascade", true, "");
    hop.insert_in_database(&store).unwrap();

    assert_eq!(hop.core().get_inventory(&store, "amount").unwrap(), Value::None);
}

#[test]
fn first_write_creates_the_linked_row_and_later_writes_reuse_it() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let hub = ChangeHub::new();

    let mut hop = Hop::new("Centennial", true, "");
    let key = hop.insert_in_database(&store).unwrap();
    assert_eq!(store.inventory_key(Table::Hop, key).unwrap(), None);

    hop.core_mut()
        .set_inventory(&store, &hub, Value::Double(450.0), 0, true)
        .unwrap();
    let inv_key = store
        .inventory_key(Table::Hop, key)
        .unwrap()
        .expect("linked row should exist");
    assert_eq!(
        hop.core().get_inventory(&store, "amount").unwrap(),
        Value::Double(450.0)
    );

    hop.core_mut()
        .set_inventory(&store, &hub, Value::Double(125.0), 0, true)
        .unwrap();
    assert_eq!(store.inventory_key(Table::Hop, key).unwrap(), Some(inv_key));
    assert_eq!(
        hop.core().get_inventory(&store, "amount").unwrap(),
        Value::Double(125.0)
    );
}

#[test]
fn explicit_inventory_key_skips_resolution() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let hub = ChangeHub::new();

    let mut hop = Hop::new("Columbus", true, "");
    let key = hop.insert_in_database(&store).unwrap();
    let inv_key = store.inventory_create(Table::Hop, key).unwrap();

    hop.core_mut()
        .set_inventory(&store, &hub, Value::Double(90.5), inv_key, false)
        .unwrap();
    assert_eq!(
        hop.core().get_inventory(&store, "amount").unwrap(),
        Value::Double(90.5)
    );
}

#[test]
fn unsaved_entity_cannot_take_inventory() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let hub = ChangeHub::new();

    let mut hop = Hop::new("Galena", true, "");
    let err = hop
        .core_mut()
        .set_inventory(&store, &hub, Value::Double(10.0), 0, true)
        .unwrap_err();
    assert!(matches!(err, StoreError::UnsavedEntity { table: "hop" }));

    // Reads stay lenient: no row, no stock.
    assert_eq!(hop.core().get_inventory(&store, "amount").unwrap(), Value::None);
}

#[test]
fn non_stock_tables_reject_inventory() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let hub = ChangeHub::new();

    let key = store
        .insert_row(Table::Style, &[("name", Value::Text("Pale Ale".to_string()))])
        .unwrap();
    let mut style = EntityCore::from_row(Table::Style, key);

    let err = style
        .set_inventory(&store, &hub, Value::Double(1.0), 0, true)
        .unwrap_err();
    assert!(matches!(err, StoreError::NoInventoryTable { table: "style" }));
}

#[test]
fn inventory_write_notifies_with_inventory_property() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let hub = ChangeHub::new();
    let seen: Rc<RefCell<Vec<PropertyChange>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    hub.subscribe(move |change| sink.borrow_mut().push(change.clone()));

    let mut hop = Hop::new("Hallertau", true, "");
    let key = hop.insert_in_database(&store).unwrap();

    hop.core_mut()
        .set_inventory(&store, &hub, Value::Double(30.0), 0, true)
        .unwrap();

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].property, Property::Inventory);
    assert_eq!(events[0].key, key);
    assert_eq!(events[0].value, Value::Double(30.0));
}
