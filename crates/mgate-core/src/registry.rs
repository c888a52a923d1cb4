//! # Type Registry
//!
//! Maps string names to registered values and `(type, subtype)`
//! discriminator pairs to entity handles used by polymorphic dispatch.
//!
//! ## Lifecycle
//!
//! Registration happens once, at startup, through a [`RegistryBuilder`].
//! [`RegistryBuilder::build`] freezes it into a [`TypeRegistry`], which is
//! read-only, cheap to clone, and safe to share across threads. There is
//! no process-wide instance: the frozen registry is handed to whatever
//! needs it (normally the conversion engine).
//!
//! Named values and typed entries live in separate key spaces, so a named
//! value can never shadow a type registration.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::StructuralError;

/// Composite lookup key for typed entries. The subtype defaults to `""`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    /// Primary discriminator value.
    pub type_tag: String,
    /// Secondary discriminator value; empty when unused.
    pub sub_type: String,
}

impl TypeKey {
    /// Build a key from both discriminator parts.
    pub fn new(type_tag: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            sub_type: sub_type.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.type_tag, self.sub_type)
    }
}

/// Something that knows its own discriminator tags.
pub trait TypeTagged {
    /// Primary tag, or `None` if the value cannot self-register.
    fn type_tag(&self) -> Option<&str>;

    /// Secondary tag; `None` registers under the empty subtype.
    fn sub_type_tag(&self) -> Option<&str> {
        None
    }
}

type NamedValue = Arc<dyn Any + Send + Sync>;

/// Mutable registration phase.
pub struct RegistryBuilder<E> {
    named: HashMap<String, NamedValue>,
    types: HashMap<TypeKey, E>,
}

impl<E> Default for RegistryBuilder<E> {
    fn default() -> Self {
        Self {
            named: HashMap::new(),
            types: HashMap::new(),
        }
    }
}

impl<E> fmt::Debug for RegistryBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.named.keys().collect();
        names.sort();
        let mut keys: Vec<&TypeKey> = self.types.keys().collect();
        keys.sort();
        f.debug_struct("RegistryBuilder")
            .field("named", &names)
            .field("types", &keys)
            .finish()
    }
}

impl<E> RegistryBuilder<E> {
    /// Start an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn register<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) -> &mut Self {
        let name = name.into();
        tracing::debug!(name = %name, "registered named value");
        self.named.insert(name, Arc::new(value));
        self
    }

    /// Look up a named value registered so far.
    pub fn resolve<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        resolve_named(&self.named, name)
    }

    /// Register `entry` under `(type_tag, sub_type)`, replacing any previous entry.
    pub fn register_type(
        &mut self,
        type_tag: impl Into<String>,
        sub_type: impl Into<String>,
        entry: E,
    ) -> &mut Self {
        let key = TypeKey::new(type_tag, sub_type);
        tracing::debug!(key = %key, "registered type entry");
        self.types.insert(key, entry);
        self
    }

    /// Register `entry` under `(type_tag, "")`.
    pub fn register_type_default(&mut self, type_tag: impl Into<String>, entry: E) -> &mut Self {
        self.register_type(type_tag, "", entry)
    }

    /// Look up a typed entry registered so far.
    pub fn resolve_type(&self, type_tag: &str, sub_type: &str) -> Option<&E> {
        self.types.get(&TypeKey::new(type_tag, sub_type))
    }

    /// Freeze the registry.
    pub fn build(self) -> TypeRegistry<E> {
        tracing::debug!(
            named = self.named.len(),
            types = self.types.len(),
            "type registry frozen"
        );
        TypeRegistry {
            inner: Arc::new(Inner {
                named: self.named,
                types: self.types,
            }),
        }
    }
}

impl<E: TypeTagged> RegistryBuilder<E> {
    /// Register `entry` under the tags it carries itself.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::UnrecognizedRegistration`] when the entry
    /// has no type tag.
    pub fn register_tagged(&mut self, entry: E) -> Result<&mut Self, StructuralError> {
        let type_tag = entry
            .type_tag()
            .ok_or(StructuralError::UnrecognizedRegistration)?
            .to_string();
        let sub_type = entry.sub_type_tag().unwrap_or_default().to_string();
        Ok(self.register_type(type_tag, sub_type, entry))
    }
}

struct Inner<E> {
    named: HashMap<String, NamedValue>,
    types: HashMap<TypeKey, E>,
}

/// Frozen, shareable registry.
pub struct TypeRegistry<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for TypeRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for TypeRegistry<E> {
    fn default() -> Self {
        RegistryBuilder::new().build()
    }
}

impl<E> fmt::Debug for TypeRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("named", &self.inner.named.len())
            .field("types", &self.inner.types.len())
            .finish()
    }
}

impl<E> TypeRegistry<E> {
    /// Start a registration phase.
    pub fn builder() -> RegistryBuilder<E> {
        RegistryBuilder::new()
    }

    /// Named value lookup. Absent names and type mismatches yield `None`.
    pub fn resolve<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        resolve_named(&self.inner.named, name)
    }

    /// Composite-key lookup.
    pub fn resolve_type(&self, type_tag: &str, sub_type: &str) -> Option<&E> {
        self.inner.types.get(&TypeKey::new(type_tag, sub_type))
    }

    /// Lookup with the empty subtype.
    pub fn resolve_type_default(&self, type_tag: &str) -> Option<&E> {
        self.resolve_type(type_tag, "")
    }

    /// Number of typed entries.
    pub fn type_count(&self) -> usize {
        self.inner.types.len()
    }

    /// All typed keys, sorted.
    pub fn type_keys(&self) -> Vec<&TypeKey> {
        let mut keys: Vec<&TypeKey> = self.inner.types.keys().collect();
        keys.sort();
        keys
    }
}

fn resolve_named<T: Any + Send + Sync>(named: &HashMap<String, NamedValue>, name: &str) -> Option<Arc<T>> {
    named
        .get(name)
        .and_then(|value| Arc::clone(value).downcast::<T>().ok())
}
