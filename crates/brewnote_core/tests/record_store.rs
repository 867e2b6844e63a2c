use brewnote_core::db::open_db_in_memory;
use brewnote_core::{RecordStore, SqliteRecordStore, StoreError, Table, Value};
use chrono::NaiveDate;
use rusqlite::Connection;

fn seeded_store(conn: &Connection) -> SqliteRecordStore<'_> {
    SqliteRecordStore::try_new(conn).unwrap()
}

#[test]
fn missing_row_is_distinct_from_null_column() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded_store(&conn);

    assert_eq!(store.read_column(Table::Hop, 42, "name").unwrap(), None);

    let key = store
        .insert_row(
            Table::Hop,
            &[
                ("name", Value::Text("Cascade".to_string())),
                ("notes", Value::None),
            ],
        )
        .unwrap();

    assert_eq!(
        store.read_column(Table::Hop, key, "notes").unwrap(),
        Some(Value::None)
    );
    assert_eq!(
        store.read_column(Table::Hop, key, "name").unwrap(),
        Some(Value::Text("Cascade".to_string()))
    );
}

#[test]
fn unknown_columns_are_rejected_up_front() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded_store(&conn);

    let err = store.read_column(Table::Hop, 1, "color_srm").unwrap_err();
    assert!(matches!(
        err,
        StoreError::UnknownColumn { table: "hop", .. }
    ));

    let err = store
        .write_column(Table::Hop, 1, "abv", &Value::Double(5.0))
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownColumn { .. }));
}

#[test]
fn write_to_missing_row_reports_row_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded_store(&conn);

    let err = store
        .write_column(Table::Hop, 42, "name", &Value::Text("Ghost".to_string()))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::RowNotFound {
            table: "hop",
            key: 42,
        }
    ));
}

#[test]
fn type_mismatches_are_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded_store(&conn);

    let key = store
        .insert_row(Table::Hop, &[("name", Value::Text("Saaz".to_string()))])
        .unwrap();

    let err = store
        .write_column(Table::Hop, key, "alpha", &Value::Text("high".to_string()))
        .unwrap_err();
    match err {
        StoreError::TypeMismatch {
            column,
            expected,
            found,
        } => {
            assert_eq!(column, "alpha");
            assert_eq!(expected, "double");
            assert_eq!(found, "text");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn date_columns_round_trip_through_canonical_text() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded_store(&conn);

    let brewed = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let key = store
        .insert_row(
            Table::Yeast,
            &[
                ("name", Value::Text("WLP001".to_string())),
                ("production_date", Value::Date(brewed)),
            ],
        )
        .unwrap();

    assert_eq!(
        store.read_column(Table::Yeast, key, "production_date").unwrap(),
        Some(Value::Date(brewed))
    );

    // Storage text is the fixed calendar format, independent of locale.
    let raw: String = conn
        .query_row(
            "SELECT production_date FROM yeast WHERE id = ?1;",
            [key],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(raw, "2024-02-29");
}

#[test]
fn corrupt_date_text_reports_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded_store(&conn);

    let key = store
        .insert_row(Table::Yeast, &[("name", Value::Text("S-04".to_string()))])
        .unwrap();
    conn.execute(
        "UPDATE yeast SET production_date = '2023-02-30' WHERE id = ?1;",
        [key],
    )
    .unwrap();

    let err = store
        .read_column(Table::Yeast, key, "production_date")
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn bool_columns_store_zero_or_one() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded_store(&conn);

    let key = store
        .insert_row(
            Table::Hop,
            &[
                ("name", Value::Text("Citra".to_string())),
                ("display", Value::Bool(true)),
            ],
        )
        .unwrap();

    let raw: i64 = conn
        .query_row("SELECT display FROM hop WHERE id = ?1;", [key], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(raw, 1);
    assert_eq!(
        store.read_column(Table::Hop, key, "display").unwrap(),
        Some(Value::Bool(true))
    );
}

#[test]
fn store_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteRecordStore::try_new(&conn).unwrap_err();
    assert!(matches!(
        err,
        StoreError::SchemaNotReady { found: 0, .. }
    ));
}
