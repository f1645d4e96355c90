use bclake_types::{FlatRecord, RawRecord, RecordValue, Scalar};
use serde_json::json;

#[test]
fn raw_record_from_odata_json() {
    let record: RawRecord = serde_json::from_value(json!({
        "id": "c-1",
        "balance": 12.5,
        "taxLiable": true,
        "website": null,
        "address": {"city": "Seattle"},
        "tags": ["a", "b"]
    }))
    .unwrap();

    assert_eq!(record["id"], RecordValue::Text("c-1".into()));
    assert_eq!(record["taxLiable"], RecordValue::Bool(true));
    assert!(record["website"].is_null());
    assert!(matches!(record["balance"], RecordValue::Number(_)));
    match &record["address"] {
        RecordValue::Nested(fields) => assert_eq!(fields["city"].as_str(), Some("Seattle")),
        other => panic!("expected nested, got {other:?}"),
    }
    match &record["tags"] {
        RecordValue::List(items) => assert_eq!(items.len(), 2),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn record_value_json_text_is_compact() {
    let tags = RecordValue::List(vec!["a".into(), "b".into()]);
    assert_eq!(tags.to_json_text(), r#"["a","b"]"#);
}

#[test]
fn record_value_serializes_as_plain_json() {
    let value = RecordValue::from(json!({"n": 1, "s": "x", "l": [true, null]}));
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"n": 1, "s": "x", "l": [true, null]})
    );
}

#[test]
fn flat_record_serializes_scalars_untagged() {
    let mut flat = FlatRecord::new();
    flat.insert("a".into(), Scalar::Null);
    flat.insert("b".into(), Scalar::Bool(false));
    flat.insert("c".into(), Scalar::Number(7u64.into()));
    flat.insert("d".into(), "text".into());

    assert_eq!(
        serde_json::to_string(&flat).unwrap(),
        r#"{"a":null,"b":false,"c":7,"d":"text"}"#
    );
}

#[test]
fn field_order_survives_parsing_and_serializing() {
    let body = r#"{"zeta":1,"alpha":{"y":true,"b":null},"mid":"m"}"#;
    let record: RawRecord = serde_json::from_str(body).unwrap();

    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    match &record["alpha"] {
        RecordValue::Nested(fields) => {
            let nested: Vec<&str> = fields.keys().map(String::as_str).collect();
            assert_eq!(nested, vec!["y", "b"]);
        }
        other => panic!("expected nested, got {other:?}"),
    }
    assert_eq!(serde_json::to_string(&record).unwrap(), body);
}
