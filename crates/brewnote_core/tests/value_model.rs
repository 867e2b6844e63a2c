use brewnote_core::{Property, Table, Value};
use chrono::NaiveDate;

#[test]
fn value_serialization_uses_expected_wire_fields() {
    let json = serde_json::to_value(Value::Double(5.5)).unwrap();
    assert_eq!(json, serde_json::json!({ "double": 5.5 }));

    let json = serde_json::to_value(Value::None).unwrap();
    assert_eq!(json, serde_json::json!("none"));

    let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
    let json = serde_json::to_value(Value::Date(date)).unwrap();
    assert_eq!(json, serde_json::json!({ "date": "2026-08-06" }));

    let decoded: Value = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, Value::Date(date));
}

#[test]
fn table_and_property_serialize_as_snake_case() {
    assert_eq!(
        serde_json::to_value(Table::Fermentable).unwrap(),
        serde_json::json!("fermentable")
    );
    assert_eq!(
        serde_json::to_value(Property::Inventory).unwrap(),
        serde_json::json!("inventory")
    );

    let decoded: Table = serde_json::from_value(serde_json::json!("hop")).unwrap();
    assert_eq!(decoded, Table::Hop);
}

#[test]
fn value_round_trips_through_serde() {
    for value in [
        Value::Bool(true),
        Value::Int(-7),
        Value::Double(0.25),
        Value::Text("Cascade".to_string()),
    ] {
        let json = serde_json::to_value(value.clone()).unwrap();
        let decoded: Value = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, value);
    }
}
