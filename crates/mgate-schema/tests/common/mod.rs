//! Entity types shared by the integration tests.

#![allow(dead_code)]

use mgate_core::{EngineConfig, RegistryBuilder, StructuralError, Verb};
use mgate_schema::{ConversionEngine, FieldKind, FieldSpec, FieldValue, Schema, SchemaEntity};

/// Second-level nested entity.
pub struct Level2;

impl SchemaEntity for Level2 {
    const TYPE_ID: &'static str = "level2";
    const TYPE_TAG: Option<&'static str> = Some("fakesubtype2");

    fn schema() -> Result<Schema, StructuralError> {
        Ok(Schema::new()
            .field("l2F1", FieldSpec::text().required())
            .field("type", FieldSpec::text().fixed("fakesubtype2")))
    }
}

/// First-level nested entity with per-verb required fields.
pub struct SubType;

impl SchemaEntity for SubType {
    const TYPE_ID: &'static str = "subtype";
    const TYPE_TAG: Option<&'static str> = Some("fakesubtype1");

    fn schema() -> Result<Schema, StructuralError> {
        Ok(Schema::new()
            .field("field1", FieldSpec::text().required())
            .field("type", FieldSpec::text().fixed("fakesubtype1"))
            .field("field2", FieldSpec::number())
            .field("field3", FieldSpec::nested::<Level2>())
            .field(
                "field4",
                FieldSpec::text().required_update().required_put().required_patch(),
            )
            .field("field5", FieldSpec::text().required_create()))
    }
}

/// One field of every kind and modifier.
pub struct Everything;

impl SchemaEntity for Everything {
    const TYPE_ID: &'static str = "everything";

    fn schema() -> Result<Schema, StructuralError> {
        Ok(Schema::new()
            .field("_id", FieldSpec::text().required())
            .field("dateField", FieldSpec::temporal())
            .field("booleanField", FieldSpec::boolean())
            .field("numberField", FieldSpec::number())
            .field("integerField", FieldSpec::integer())
            .field("arrString", FieldSpec::sequence(FieldKind::Text))
            .field("objectField", FieldSpec::opaque())
            .field("subTypeObjectField", FieldSpec::nested::<SubType>())
            .field(
                "subTypeObjectListField",
                FieldSpec::sequence(FieldKind::Nested(SubType::entity_ref())),
            )
            .field("fieldDefaultValue", FieldSpec::number().with_default(10))
            .field(
                "fieldDefaultValueAsFunction",
                FieldSpec::number().with_default_fn(|| FieldValue::from(10)),
            )
            .field("fieldWithPersistentValue", FieldSpec::number().fixed(15))
            .field("minField", FieldSpec::number().min(10.0))
            .field("maxField", FieldSpec::number().max(100.0))
            .field("minLengthField", FieldSpec::text().min_length(10))
            .field("maxLengthField", FieldSpec::text().max_length(3))
            .field(
                "multipleTypedArray",
                FieldSpec::sequence(FieldKind::OneOf(vec![
                    SubType::entity_ref(),
                    Level2::entity_ref(),
                ])),
            )
            .field(
                "symbolField",
                FieldSpec {
                    integer: true,
                    ..FieldSpec::of(FieldKind::Unsupported("symbol".into()))
                },
            )
            .field("untyped", FieldSpec::inert().required()))
    }
}

/// A hidden and a visible field for every verb that has a visibility flag.
pub struct RestVerbs;

impl SchemaEntity for RestVerbs {
    const TYPE_ID: &'static str = "rest-verbs";

    fn schema() -> Result<Schema, StructuralError> {
        let mut schema = Schema::new();
        for verb in [Verb::Find, Verb::Get, Verb::Create, Verb::Update, Verb::Patch, Verb::Remove] {
            let stem = verb_stem(verb);
            schema.declare(
                Schema::new()
                    .field(format!("{stem}FieldFalse"), FieldSpec::text().can(verb, false))
                    .field(format!("{stem}FieldTrue"), FieldSpec::text().can(verb, true)),
            );
        }
        Ok(schema)
    }
}

/// Field-name stem for a verb's visibility flag.
pub fn verb_stem(verb: Verb) -> &'static str {
    match verb {
        Verb::Find => "canFind",
        Verb::Get => "canGet",
        Verb::Create => "canCreate",
        Verb::Update => "canPut",
        Verb::Patch => "canPatch",
        Verb::Remove => "canRemove",
        Verb::Any => "any",
    }
}

/// Engine with both nested types registered under their tags.
pub fn engine() -> ConversionEngine {
    let mut builder = RegistryBuilder::new();
    builder
        .register_tagged(SubType::entity_ref())
        .expect("tagged");
    builder
        .register_tagged(Level2::entity_ref())
        .expect("tagged");
    ConversionEngine::new(builder.build(), EngineConfig::default())
}
