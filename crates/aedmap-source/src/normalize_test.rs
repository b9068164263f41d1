use serde_json::json;

use super::*;
use crate::types::AirtableListResponse;

fn raw(id: Option<&str>, fields: serde_json::Value) -> AirtableRecord {
    AirtableRecord {
        id: id.map_or(serde_json::Value::Null, |id| json!(id)),
        fields,
    }
}

// -----------------------------------------------------------------------
// normalize_record
// -----------------------------------------------------------------------

#[test]
fn normalize_record_maps_canonical_airtable_fields() {
    let record = normalize_record(&raw(
        Some("recA"),
        json!({
            "Name": "Royal Square",
            "Address": "Royal Square, St Helier JE2 4WA",
            "Parish": "St Helier",
            "Latitude": 49.1838,
            "Longitude": -2.1070,
            "Status": "Active",
            "Public Access": true,
            "Access Instructions": "Cabinet on the west wall, code 1234",
            "Last Verified": "2024-03-05",
            "Images": [{"url": "https://img.example.com/square.jpg"}]
        }),
    ))
    .unwrap();

    assert_eq!(record.id, "recA");
    assert_eq!(record.name, "Royal Square");
    assert_eq!(record.address, "Royal Square, St Helier JE2 4WA");
    assert_eq!(record.parish, "St Helier");
    assert_eq!(record.lat, Some(49.1838));
    assert_eq!(record.lng, Some(-2.1070));
    assert_eq!(record.status, Status::Active);
    assert!(record.public_access);
    assert_eq!(
        record.access_instructions,
        "Cabinet on the west wall, code 1234"
    );
    assert_eq!(record.last_verified, "05 Mar 2024");
    assert_eq!(record.images, vec!["https://img.example.com/square.jpg"]);
}

#[test]
fn normalize_record_accepts_lowercase_aliases() {
    let record = normalize_record(&raw(
        Some("recB"),
        json!({
            "name": "Gorey Pier",
            "parish": "Grouville",
            "lat": "49.1985",
            "lng": "-2.0195",
            "status": "out of service",
            "public_access": "yes",
            "access_instructions": "Ask at the kiosk",
            "last_verified": "sometime in May"
        }),
    ))
    .unwrap();

    assert_eq!(record.name, "Gorey Pier");
    assert_eq!(record.parish, "Grouville");
    assert_eq!(record.lat, Some(49.1985));
    assert_eq!(record.lng, Some(-2.0195));
    assert_eq!(record.status, Status::OutOfService);
    assert!(record.public_access);
    assert_eq!(record.access_instructions, "Ask at the kiosk");
    assert_eq!(record.last_verified, "sometime in May");
}

#[test]
fn normalize_record_defaults_missing_fields() {
    let record = normalize_record(&raw(Some("recC"), json!({}))).unwrap();
    assert_eq!(record, Record::new("recC"));
    assert_eq!(record.status, Status::Unknown);
    assert!(!record.public_access);
}

#[test]
fn normalize_record_unrecognized_status_is_unknown() {
    let record = normalize_record(&raw(Some("recD"), json!({"Status": "Being serviced"}))).unwrap();
    assert_eq!(record.status, Status::Unknown);
}

#[test]
fn normalize_record_malformed_coordinates_become_none() {
    let record = normalize_record(&raw(
        Some("recE"),
        json!({"Latitude": "north-ish", "Longitude": ""}),
    ))
    .unwrap();
    assert!(record.lat.is_none());
    assert!(record.lng.is_none());
    assert!(record.coordinates().is_none());
}

#[test]
fn normalize_record_public_access_only_for_truthy_values() {
    for (value, expected) in [
        (json!(true), true),
        (json!("TRUE"), true),
        (json!(1), true),
        (json!("no"), false),
        (json!(0), false),
        (json!("checked"), false),
    ] {
        let record =
            normalize_record(&raw(Some("recF"), json!({ "PublicAccess": value.clone() }))).unwrap();
        assert_eq!(record.public_access, expected, "input {value}");
    }
}

#[test]
fn normalize_record_drops_missing_id() {
    assert!(normalize_record(&raw(None, json!({"Name": "Orphan"}))).is_none());
    assert!(normalize_record(&raw(Some("  "), json!({"Name": "Blank"}))).is_none());
}

#[test]
fn normalize_record_stringifies_numeric_id() {
    let row = AirtableRecord {
        id: json!(12345),
        fields: json!({"Name": "Numbered"}),
    };
    let record = normalize_record(&row).unwrap();
    assert_eq!(record.id, "12345");
    assert_eq!(record.name, "Numbered");
}

#[test]
fn normalize_record_drops_non_scalar_id() {
    for id in [json!(true), json!(["recA"]), json!({"id": "recA"})] {
        let row = AirtableRecord {
            id: id.clone(),
            fields: json!({"Name": "Odd id"}),
        };
        assert!(normalize_record(&row).is_none(), "id {id}");
    }
}

#[test]
fn normalize_record_treats_non_object_fields_as_empty() {
    for fields in [json!(null), json!([1, 2]), json!("Name")] {
        let record = normalize_record(&raw(Some("recG"), fields)).unwrap();
        assert_eq!(record, Record::new("recG"));
    }
}

#[test]
fn normalize_record_blank_cell_does_not_hide_alias() {
    let record = normalize_record(&raw(
        Some("recH"),
        json!({"Name": "", "name": "Gorey Pier", "Parish": " ", "parish": "Grouville"}),
    ))
    .unwrap();
    assert_eq!(record.name, "Gorey Pier");
    assert_eq!(record.parish, "Grouville");
}

#[test]
fn list_response_tolerates_odd_rows() {
    let page: AirtableListResponse = serde_json::from_value(json!({
        "records": [
            {"id": "recA", "fields": {"Name": "Royal Square"}},
            {"id": "recB", "fields": null},
            {"id": 12345, "fields": {"Name": "Numbered"}}
        ]
    }))
    .unwrap();
    let ids: Vec<String> = normalize_records(&page.records)
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["recA", "recB", "12345"]);
}

// -----------------------------------------------------------------------
// normalize_records
// -----------------------------------------------------------------------

#[test]
fn normalize_records_keeps_order_and_drops_only_unidentified() {
    let rows = vec![
        raw(Some("rec1"), json!({"Name": "First"})),
        raw(None, json!({"Name": "No id"})),
        raw(Some("rec3"), json!({"Name": "Third", "Latitude": "bad"})),
    ];
    let records = normalize_records(&rows);
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rec1", "rec3"]);
}
