//! Integration test: converting view models into entities.

mod common;

use common::{engine, Everything, Level2, SubType};
use mgate_core::{ConversionError, ErrorClass, StructuralError, Temporal, Verb};
use mgate_schema::{Entity, FieldSpec, FieldValue, Schema, SchemaEntity};
use serde_json::{json, Value};

struct Appointment;

impl SchemaEntity for Appointment {
    const TYPE_ID: &'static str = "appointment";

    fn schema() -> Result<Schema, StructuralError> {
        Ok(Schema::new()
            .field("when", FieldSpec::temporal().required())
            .field("status", FieldSpec::text().fixed("open"))
            .field("slots", FieldSpec::number().with_default(1)))
    }
}

struct Counter;

impl SchemaEntity for Counter {
    const TYPE_ID: &'static str = "counter";

    fn schema() -> Result<Schema, StructuralError> {
        Ok(Schema::new()
            .field("status", FieldSpec::text().fixed("open"))
            .field("slots", FieldSpec::number().with_default(1))
            .field("note", FieldSpec::text()))
    }
}

async fn convert(input: Value) -> Result<Entity, ConversionError> {
    engine().from_view_model::<Everything>(&input, Verb::Any).await
}

async fn convert_field(field: &str, value: Value) -> Option<FieldValue> {
    let mut input = json!({"_id": "123"});
    input[field] = value;
    convert(input).await.expect("conversion succeeds").get(field).cloned()
}

fn messages(err: &ConversionError) -> Vec<String> {
    err.violations().expect("validation failure").messages().to_vec()
}

#[tokio::test]
async fn test_non_record_input_yields_empty_entity() {
    let entity = convert(json!("this is a test")).await.unwrap();
    assert!(entity.is_empty());
    assert!(entity.is::<Everything>());
}

#[tokio::test]
async fn test_array_input_is_validated_as_record_without_fields() {
    let err = convert(json!([1, 2])).await.unwrap_err();
    assert_eq!(messages(&err), vec!["_id is required"]);

    let err = convert(json!([])).await.unwrap_err();
    assert_eq!(messages(&err), vec!["_id is required"]);
}

#[tokio::test]
async fn test_array_input_still_gets_fixed_values_and_defaults() {
    let entity = engine()
        .from_view_model::<Counter>(&json!([{"note": "x"}]), Verb::Any)
        .await
        .unwrap();
    assert!(entity.is::<Counter>());
    assert_eq!(entity.to_json(), json!({"status": "open", "slots": 1}));
}

#[tokio::test]
async fn test_untyped_fields_are_ignored() {
    let entity = convert(json!({"abc": 123, "_id": "123", "untyped": 1})).await.unwrap();
    assert!(!entity.contains("abc"));
    assert!(!entity.contains("untyped"));
}

#[tokio::test]
async fn test_defaults_fill_absent_fields() {
    let entity = convert(json!({"_id": "123"})).await.unwrap();
    assert_eq!(entity.get("fieldDefaultValue"), Some(&FieldValue::Number(10.0)));
    assert_eq!(entity.get("fieldDefaultValueAsFunction"), Some(&FieldValue::Number(10.0)));
}

#[tokio::test]
async fn test_input_wins_over_default() {
    assert_eq!(
        convert_field("fieldDefaultValue", json!("15")).await,
        Some(FieldValue::Number(15.0))
    );
}

#[tokio::test]
async fn test_unparseable_input_falls_back_to_default() {
    assert_eq!(
        convert_field("fieldDefaultValue", json!("abc")).await,
        Some(FieldValue::Number(10.0))
    );
}

#[tokio::test]
async fn test_fixed_value_ignores_input() {
    assert_eq!(
        convert_field("fieldWithPersistentValue", json!("fdsfsdfsad")).await,
        Some(FieldValue::Number(15.0))
    );
    let entity = convert(json!({"_id": "123"})).await.unwrap();
    assert_eq!(entity.get("fieldWithPersistentValue"), Some(&FieldValue::Number(15.0)));
}

#[tokio::test]
async fn test_identifier_coerced_to_text() {
    let entity = convert(json!({"_id": 1})).await.unwrap();
    assert_eq!(entity.get("_id"), Some(&FieldValue::from("1")));
}

#[tokio::test]
async fn test_missing_required_identifier() {
    let err = convert(json!({})).await.unwrap_err();
    assert_eq!(messages(&err), vec!["_id is required"]);
    assert_eq!(err.class(), ErrorClass::Client);
}

#[tokio::test]
async fn test_null_required_field_is_required() {
    let err = convert(json!({"_id": null})).await.unwrap_err();
    assert_eq!(messages(&err), vec!["_id is required"]);
}

#[tokio::test]
async fn test_length_bounds() {
    let err = convert(json!({"_id": 123, "minLengthField": "a"})).await.unwrap_err();
    assert_eq!(messages(&err), vec!["minLengthField has invalid data"]);

    let err = convert(json!({"_id": 123, "maxLengthField": "abcd"})).await.unwrap_err();
    assert_eq!(messages(&err), vec!["maxLengthField has invalid data"]);

    // Exactly at the bound is accepted.
    let entity = convert(json!({"_id": 123, "minLengthField": "0123456789", "maxLengthField": "abc"}))
        .await
        .unwrap();
    assert_eq!(entity.get("maxLengthField"), Some(&FieldValue::from("abc")));
    assert_eq!(entity.get("minLengthField"), Some(&FieldValue::from("0123456789")));
}

#[tokio::test]
async fn test_numeric_bounds() {
    let err = convert(json!({"_id": "1", "minField": 9})).await.unwrap_err();
    assert_eq!(messages(&err), vec!["minField has invalid data"]);

    let err = convert(json!({"_id": "1", "maxField": 101})).await.unwrap_err();
    assert_eq!(messages(&err), vec!["maxField has invalid data"]);

    let entity = convert(json!({"_id": "1", "minField": "10", "maxField": 100})).await.unwrap();
    assert_eq!(entity.get("minField"), Some(&FieldValue::Number(10.0)));
    assert_eq!(entity.get("maxField"), Some(&FieldValue::Number(100.0)));
}

#[tokio::test]
async fn test_violations_accumulate_in_declaration_order() {
    let err = convert(json!({"minField": 1, "maxLengthField": "long"})).await.unwrap_err();
    assert_eq!(
        messages(&err),
        vec![
            "_id is required",
            "minField has invalid data",
            "maxLengthField has invalid data"
        ]
    );
}

#[tokio::test]
async fn test_dates() {
    let from_millis = convert_field("dateField", json!("1489309333478")).await;
    assert_eq!(
        from_millis.as_ref().and_then(FieldValue::as_temporal).and_then(Temporal::epoch_millis),
        Some(1_489_309_333_478)
    );

    let from_iso = convert_field("dateField", json!("2014-08-13T10:00:39.399Z")).await;
    assert_eq!(
        from_iso.as_ref().and_then(FieldValue::as_temporal).and_then(Temporal::to_rfc3339),
        Some("2014-08-13T10:00:39.399Z".to_string())
    );

    let malformed = convert_field("dateField", json!("not a date")).await;
    assert_eq!(malformed, Some(FieldValue::Temporal(Temporal::Invalid)));
}

#[tokio::test]
async fn test_null_date_resolves_to_epoch() {
    let entity = engine()
        .from_view_model::<Appointment>(&json!({"when": null}), Verb::Any)
        .await
        .unwrap();
    assert_eq!(
        entity.to_json(),
        json!({"when": "1970-01-01T00:00:00.000Z", "status": "open", "slots": 1})
    );

    let err = engine()
        .from_view_model::<Appointment>(&json!({}), Verb::Any)
        .await
        .unwrap_err();
    assert_eq!(messages(&err), vec!["when is required"]);
}

#[tokio::test]
async fn test_numbers() {
    assert_eq!(convert_field("numberField", json!("2000")).await, Some(FieldValue::Number(2000.0)));
    assert_eq!(convert_field("numberField", json!("2014-")).await, None);
    assert_eq!(convert_field("integerField", json!("2000")).await, Some(FieldValue::Number(2000.0)));
    assert_eq!(convert_field("integerField", json!("2000.03")).await, None);
}

#[tokio::test]
async fn test_booleans() {
    for (input, expected) in [
        (json!("true"), true),
        (json!("1"), true),
        (json!(1), true),
        (json!("false"), false),
        (json!("0"), false),
        (json!(0), false),
    ] {
        assert_eq!(
            convert_field("booleanField", input).await,
            Some(FieldValue::Boolean(expected))
        );
    }
}

#[tokio::test]
async fn test_sequence_and_opaque() {
    assert_eq!(
        convert_field("arrString", json!(["abc"])).await,
        Some(FieldValue::Sequence(vec![Some(FieldValue::from("abc"))]))
    );
    assert_eq!(convert_field("objectField", Value::Null).await, None);
    assert_eq!(
        convert_field("objectField", json!({"abc": 123})).await,
        Some(FieldValue::Opaque(json!({"abc": 123})))
    );
}

#[tokio::test]
async fn test_unsupported_kind_resolves_to_nothing() {
    assert_eq!(convert_field("symbolField", json!("2000")).await, None);
}

#[tokio::test]
async fn test_nested_entity() {
    let nested = convert_field("subTypeObjectField", json!({"field1": "abc", "field2": 123}))
        .await
        .unwrap();
    let nested = nested.as_entity().unwrap();
    assert!(nested.is::<SubType>());
    assert_eq!(
        nested.to_json(),
        json!({"field1": "abc", "type": "fakesubtype1", "field2": 123})
    );
}

#[tokio::test]
async fn test_nested_violations_are_unprefixed() {
    let err = convert(json!({"_id": "123", "subTypeObjectField": {}})).await.unwrap_err();
    assert_eq!(messages(&err), vec!["field1 is required"]);
}

#[tokio::test]
async fn test_non_record_nested_value_is_validated_as_empty() {
    for value in [json!("abc"), json!(42), json!([{"field1": "x"}])] {
        let err = convert(json!({"_id": "123", "subTypeObjectField": value})).await.unwrap_err();
        assert_eq!(messages(&err), vec!["field1 is required"]);
    }
}

#[tokio::test]
async fn test_second_level_nesting() {
    let nested = convert_field(
        "subTypeObjectField",
        json!({
            "field1": "abc",
            "field2": 123,
            "type": "fakesubtype1",
            "field3": {"l2F1": 2321, "type": "fakesubtype2"}
        }),
    )
    .await
    .unwrap();
    let level1 = nested.as_entity().unwrap();
    let level2 = level1.get("field3").and_then(FieldValue::as_entity).unwrap();
    assert!(level2.is::<Level2>());
    assert_eq!(level2.to_json(), json!({"l2F1": "2321", "type": "fakesubtype2"}));
}

#[tokio::test]
async fn test_sequence_of_nested_entities() {
    let list = convert_field(
        "subTypeObjectListField",
        json!([
            {"field1": "abc", "field2": 123, "type": "fakesubtype1"},
            {"field1": "abc", "field2": 123, "type": "fakesubtype1", "field3": {"l2F1": 123, "type": "fakesubtype2"}}
        ]),
    )
    .await
    .unwrap();
    let items = list.as_sequence().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|item| item.as_ref().and_then(FieldValue::as_entity).is_some_and(Entity::is::<SubType>)));
    assert_eq!(
        list.to_json()[1]["field3"],
        json!({"l2F1": "123", "type": "fakesubtype2"})
    );
}

#[tokio::test]
async fn test_polymorphic_sequence() {
    let entity = convert(json!({
        "_id": "123",
        "multipleTypedArray": [
            {"l2F1": "123", "type": "fakesubtype2"},
            {"field1": "456", "type": "fakesubtype1"}
        ]
    }))
    .await
    .unwrap();
    let items = entity
        .get("multipleTypedArray")
        .and_then(FieldValue::as_sequence)
        .unwrap();
    let first = items[0].as_ref().and_then(FieldValue::as_entity).unwrap();
    let second = items[1].as_ref().and_then(FieldValue::as_entity).unwrap();
    assert!(first.is::<Level2>());
    assert!(second.is::<SubType>());
}

#[tokio::test]
async fn test_polymorphic_field_with_scalar_input_is_absent() {
    let entity = convert(json!({"_id": "123", "multipleTypedArray": 123})).await.unwrap();
    assert!(!entity.contains("multipleTypedArray"));
}

#[tokio::test]
async fn test_undetectable_element_is_structural() {
    let err = convert(json!({
        "_id": "123",
        "multipleTypedArray": [{"type": "unknown"}]
    }))
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ConversionError::Structural(StructuralError::UndetectedModelType {
            field: "multipleTypedArray".into()
        })
    );
    assert_eq!(err.class(), ErrorClass::Server);
}

#[tokio::test]
async fn test_converted_entity_serializes_in_declaration_order() {
    let entity = convert(json!({"_id": "1", "numberField": "20.5"})).await.unwrap();
    let text = serde_json::to_string(&entity).unwrap();
    assert_eq!(
        text,
        r#"{"_id":"1","numberField":20.5,"fieldDefaultValue":10,"fieldDefaultValueAsFunction":10,"fieldWithPersistentValue":15}"#
    );
}
