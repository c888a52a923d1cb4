//! # Schema Catalog
//!
//! A set of entity types defined in one YAML (or JSON) document, for
//! services that load their schemas at startup instead of compiling them in.
//!
//! ```yaml
//! entities:
//!   cat:
//!     typeTag: cat
//!     fields:
//!       type: { type: string }
//!       lives: { type: number, integer: true, max: 9 }
//!   owner:
//!     fields:
//!       name: { type: string, required: true }
//!       pets: { type: [entity], ref: [cat, dog] }
//! ```
//!
//! Entity definitions may reference each other, including themselves:
//! references become [`EntityRef`] handles whose blueprints are built on
//! demand. Every definition is still parsed once at load time so a broken
//! catalog is rejected before any conversion runs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use mgate_core::{RegistryBuilder, StructuralError, TypeRegistry, TypeTagged};

use crate::descriptor;
use crate::entity::{EntityRef, Schema};

fn default_identifier() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EntityDefinition {
    /// Pre-declare the identifier field.
    #[serde(default = "default_identifier")]
    identifier: bool,
    #[serde(default)]
    type_tag: Option<String>,
    #[serde(default)]
    sub_type_tag: Option<String>,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    entities: BTreeMap<String, EntityDefinition>,
}

#[derive(Debug)]
struct CatalogInner {
    definitions: BTreeMap<String, EntityDefinition>,
}

impl CatalogInner {
    fn entity_ref(self: &Arc<Self>, name: &str) -> Option<EntityRef> {
        let definition = self.definitions.get(name)?;
        let inner = Arc::clone(self);
        let owned = name.to_string();
        Some(EntityRef::dynamic(
            name,
            definition.type_tag.clone(),
            definition.sub_type_tag.clone(),
            move || inner.schema_for(&owned),
        ))
    }

    fn schema_for(self: &Arc<Self>, name: &str) -> Result<Schema, StructuralError> {
        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| StructuralError::UnknownEntity(name.to_string()))?;
        let mut schema = if definition.identifier {
            Schema::base()
        } else {
            Schema::new()
        };
        let resolver = |entity: &str| self.entity_ref(entity);
        schema.declare_value(&Value::Object(definition.fields.clone()), &resolver)?;
        Ok(schema)
    }
}

/// Entity types loaded from a document.
#[derive(Clone)]
pub struct SchemaCatalog {
    inner: Arc<CatalogInner>,
}

impl SchemaCatalog {
    /// Load a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// [`StructuralError::MalformedDocument`] when the text is not a catalog;
    /// any descriptor error of any entity.
    pub fn from_yaml_str(text: &str) -> Result<Self, StructuralError> {
        Self::from_value(descriptor::parse_yaml(text)?)
    }

    /// Load a catalog from an already parsed JSON value.
    pub fn from_value(document: Value) -> Result<Self, StructuralError> {
        let document: CatalogDocument = serde_json::from_value(document)
            .map_err(|e| StructuralError::MalformedDocument(e.to_string()))?;
        let catalog = Self {
            inner: Arc::new(CatalogInner {
                definitions: document.entities,
            }),
        };
        for name in catalog.inner.definitions.keys() {
            catalog.inner.schema_for(name)?;
        }
        tracing::debug!(entities = catalog.inner.definitions.len(), "schema catalog loaded");
        Ok(catalog)
    }

    /// Handle for a named entity.
    pub fn entity_ref(&self, name: &str) -> Result<EntityRef, StructuralError> {
        self.inner
            .entity_ref(name)
            .ok_or_else(|| StructuralError::UnknownEntity(name.to_string()))
    }

    /// Entity names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.inner.definitions.keys().map(String::as_str).collect()
    }

    /// Register every entity that carries a type tag. Returns how many were registered.
    pub fn register_into(&self, builder: &mut RegistryBuilder<EntityRef>) -> Result<usize, StructuralError> {
        let mut registered = 0;
        for name in self.inner.definitions.keys() {
            let Some(entity) = self.inner.entity_ref(name) else {
                continue;
            };
            if entity.type_tag().is_some() {
                builder.register_tagged(entity)?;
                registered += 1;
            }
        }
        Ok(registered)
    }

    /// A frozen registry holding this catalog's tagged entities.
    pub fn registry(&self) -> Result<TypeRegistry<EntityRef>, StructuralError> {
        let mut builder = RegistryBuilder::new();
        self.register_into(&mut builder)?;
        Ok(builder.build())
    }
}

impl fmt::Debug for SchemaCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCatalog")
            .field("entities", &self.names())
            .finish()
    }
}
