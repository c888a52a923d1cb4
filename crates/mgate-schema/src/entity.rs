//! # Schema Entities
//!
//! A schema entity is a record type described by an ordered [`Schema`].
//! Statically known types implement [`SchemaEntity`]; the engine works with
//! the type-erased [`EntityRef`], which can also wrap schemas loaded at
//! runtime (see [`crate::catalog`]).
//!
//! ## Identity
//!
//! Two handles denote the same entity type iff their stable ids are equal.
//! Polymorphic dispatch relies on this: a registry hit is matched against
//! the declared candidates by id, never by pointer.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::Value;

use mgate_core::config::DEFAULT_IDENTIFIER_FIELD;
use mgate_core::{StructuralError, TypeTagged};

use crate::descriptor::{self, EntityResolver};
use crate::field::FieldSpec;

/// Ordered list of field specifications.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// A schema that pre-declares the identifier field as text.
    pub fn base() -> Self {
        Self::new().field(DEFAULT_IDENTIFIER_FIELD, FieldSpec::text())
    }

    /// Declare one field. Redeclaring a name merges into the existing spec
    /// and keeps its position.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.merge_field(name.into(), spec);
        self
    }

    /// Merge every field of `fragment` into this schema.
    pub fn declare(&mut self, fragment: Schema) -> &mut Self {
        for (name, spec) in fragment.fields {
            self.merge_field(name, spec);
        }
        self
    }

    /// Merge a JSON fragment of field descriptors.
    ///
    /// # Errors
    ///
    /// [`StructuralError::SchemaNotRecord`] if `fragment` is not an object;
    /// descriptor errors as reported by [`descriptor::parse_fragment`].
    pub fn declare_value(
        &mut self,
        fragment: &Value,
        resolver: &dyn EntityResolver,
    ) -> Result<&mut Self, StructuralError> {
        let parsed = descriptor::parse_fragment(fragment, resolver)?;
        Ok(self.declare(parsed))
    }

    /// Merge a YAML fragment of field descriptors.
    pub fn declare_yaml(
        &mut self,
        fragment: &str,
        resolver: &dyn EntityResolver,
    ) -> Result<&mut Self, StructuralError> {
        let value = descriptor::parse_yaml(fragment)?;
        self.declare_value(&value, resolver)
    }

    fn merge_field(&mut self, name: String, spec: FieldSpec) {
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => existing.merge(spec),
            None => self.fields.push((name, spec)),
        }
    }

    /// Spec of a field.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, spec)| spec)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A record type converted by the engine.
///
/// ```ignore
/// struct Pet;
///
/// impl SchemaEntity for Pet {
///     const TYPE_ID: &'static str = "pet";
///
///     fn schema() -> Result<Schema, StructuralError> {
///         Ok(Schema::base().field("name", FieldSpec::text().required()))
///     }
/// }
/// ```
pub trait SchemaEntity: 'static {
    /// Stable id. Must be unique among the entity types of one process.
    const TYPE_ID: &'static str;
    /// Primary discriminator tag, for self-registration.
    const TYPE_TAG: Option<&'static str> = None;
    /// Secondary discriminator tag.
    const SUB_TYPE_TAG: Option<&'static str> = None;

    /// A fresh blueprint of this type's fields.
    fn schema() -> Result<Schema, StructuralError>;

    /// Capability marker.
    fn is_schema_entity() -> bool {
        true
    }

    /// Type-erased handle.
    fn entity_ref() -> EntityRef
    where
        Self: Sized,
    {
        EntityRef::of::<Self>()
    }
}

type Blueprint = Arc<dyn Fn() -> Result<Schema, StructuralError> + Send + Sync>;

/// Type-erased handle to an entity type.
#[derive(Clone)]
pub struct EntityRef {
    id: Arc<str>,
    type_tag: Option<Arc<str>>,
    sub_type_tag: Option<Arc<str>>,
    blueprint: Blueprint,
}

impl EntityRef {
    /// Handle for a statically known entity type.
    pub fn of<T: SchemaEntity>() -> Self {
        Self {
            id: Arc::from(T::TYPE_ID),
            type_tag: T::TYPE_TAG.map(Arc::from),
            sub_type_tag: T::SUB_TYPE_TAG.map(Arc::from),
            blueprint: Arc::new(T::schema),
        }
    }

    /// Handle for an entity type defined at runtime.
    pub fn dynamic(
        id: impl Into<String>,
        type_tag: Option<String>,
        sub_type_tag: Option<String>,
        blueprint: impl Fn() -> Result<Schema, StructuralError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: Arc::from(id.into()),
            type_tag: type_tag.map(Arc::from),
            sub_type_tag: sub_type_tag.map(Arc::from),
            blueprint: Arc::new(blueprint),
        }
    }

    /// Stable id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Build a fresh blueprint.
    pub fn blueprint(&self) -> Result<Schema, StructuralError> {
        (self.blueprint)()
    }

    /// Whether this handle denotes `T`.
    pub fn is<T: SchemaEntity>(&self) -> bool {
        &*self.id == T::TYPE_ID
    }
}

impl TypeTagged for EntityRef {
    fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    fn sub_type_tag(&self) -> Option<&str> {
        self.sub_type_tag.as_deref()
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("id", &self.id)
            .field("type_tag", &self.type_tag)
            .field("sub_type_tag", &self.sub_type_tag)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::NoEntities;
    use crate::field::FieldKind;
    use serde_json::json;

    struct Pet;

    impl SchemaEntity for Pet {
        const TYPE_ID: &'static str = "pet";
        const TYPE_TAG: Option<&'static str> = Some("pet");

        fn schema() -> Result<Schema, StructuralError> {
            Ok(Schema::base().field("name", FieldSpec::text().required()))
        }
    }

    #[test]
    fn base_declares_identifier() {
        let schema = Schema::base();
        assert_eq!(schema.get("_id").and_then(|s| s.kind.clone()), Some(FieldKind::Text));
    }

    #[test]
    fn redeclared_field_merges_in_place() {
        let mut schema = Schema::new()
            .field("a", FieldSpec::number())
            .field("b", FieldSpec::text());
        schema.declare(Schema::new().field("a", FieldSpec::default().max(3.0)));
        let names: Vec<&str> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        let a = schema.get("a").unwrap();
        assert_eq!(a.kind, Some(FieldKind::Number));
        assert_eq!(a.max, Some(3.0));
    }

    #[test]
    fn non_object_fragment_rejected() {
        let mut schema = Schema::new();
        let err = schema.declare_value(&json!([1, 2]), &NoEntities).unwrap_err();
        assert_eq!(err, StructuralError::SchemaNotRecord);
    }

    #[test]
    fn yaml_fragment_merges_and_resolves_entities() {
        let mut schema = Schema::base();
        let resolver = |name: &str| (name == "pet").then(Pet::entity_ref);
        schema
            .declare_yaml(
                "born: { type: date, required: true }\n\
                 nick: { type: string, maxLength: 8 }\n\
                 pet: { type: entity, ref: pet }\n",
                &resolver,
            )
            .unwrap();
        let names: Vec<&str> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["_id", "born", "nick", "pet"]);
        assert!(schema.get("born").unwrap().required);
        assert_eq!(schema.get("nick").unwrap().max_length, Some(8));
        assert_eq!(schema.get("pet").unwrap().kind, Some(FieldKind::Nested(Pet::entity_ref())));
    }

    #[test]
    fn malformed_yaml_fragment_rejected() {
        let mut schema = Schema::new();
        assert!(matches!(
            schema.declare_yaml("born: { type: [", &NoEntities),
            Err(StructuralError::MalformedDocument(_))
        ));
    }

    #[test]
    fn handles_compare_by_id() {
        let a = EntityRef::of::<Pet>();
        let b = Pet::entity_ref();
        let c = EntityRef::dynamic("pet", None, None, || Ok(Schema::new()));
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(c.is::<Pet>());
        assert_eq!(a.type_tag(), Some("pet"));
        assert_eq!(a.sub_type_tag(), None);
        assert!(Pet::is_schema_entity());
    }

    #[test]
    fn blueprint_is_fresh() {
        let handle = EntityRef::of::<Pet>();
        let first = handle.blueprint().unwrap();
        let second = handle.blueprint().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
    }
}
