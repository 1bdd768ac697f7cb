//! Field type registry: the lookup the engine depends on

use crate::field::kind::{FieldTypeDefinition, FieldValueKind};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Source of per-field type information
///
/// The engine only ever reads from a registry. Unknown fields are not an
/// error: callers fall back to [`permissive_definition`].
pub trait FieldTypeRegistry {
    fn lookup(&self, field: &str) -> Option<&FieldTypeDefinition>;
}

impl<R: FieldTypeRegistry + ?Sized> FieldTypeRegistry for &R {
    fn lookup(&self, field: &str) -> Option<&FieldTypeDefinition> {
        (**self).lookup(field)
    }
}

impl<R: FieldTypeRegistry + ?Sized> FieldTypeRegistry for Arc<R> {
    fn lookup(&self, field: &str) -> Option<&FieldTypeDefinition> {
        (**self).lookup(field)
    }
}

/// String-like definition used for fields the registry does not know
static PERMISSIVE: Lazy<FieldTypeDefinition> =
    Lazy::new(|| FieldTypeDefinition::new(FieldValueKind::String));

#[inline]
pub fn permissive_definition() -> &'static FieldTypeDefinition {
    &PERMISSIVE
}

/// Look up `field`, falling back to the permissive definition
pub fn resolve<'r, R: FieldTypeRegistry + ?Sized>(
    registry: &'r R,
    field: &str,
) -> &'r FieldTypeDefinition {
    match registry.lookup(field) {
        Some(definition) => definition,
        None => {
            tracing::trace!(field, "Field not in registry, using permissive definition");
            permissive_definition()
        }
    }
}

/// In-memory registry keyed by field name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    fields: AHashMap<String, FieldTypeDefinition>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field, returning the definition it replaced
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        definition: FieldTypeDefinition,
    ) -> Option<FieldTypeDefinition> {
        self.fields.insert(name.into(), definition)
    }

    pub fn with_field(mut self, name: impl Into<String>, definition: FieldTypeDefinition) -> Self {
        self.insert(name, definition);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldTypeDefinition> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FieldTypeRegistry for SchemaRegistry {
    fn lookup(&self, field: &str) -> Option<&FieldTypeDefinition> {
        self.fields.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Operator;

    #[test]
    fn test_lookup_and_fallback() {
        let registry =
            SchemaRegistry::new().with_field("Price", FieldTypeDefinition::new(FieldValueKind::Number));

        assert_eq!(
            registry.lookup("Price").map(|d| d.kind),
            Some(FieldValueKind::Number)
        );
        assert!(registry.lookup("Unknown").is_none());

        let fallback = resolve(&registry, "Unknown");
        assert_eq!(fallback.kind, FieldValueKind::String);
        assert!(fallback.allows(Operator::Contains));
    }

    #[test]
    fn test_registry_through_reference_and_arc() {
        let registry =
            SchemaRegistry::new().with_field("Active", FieldTypeDefinition::new(FieldValueKind::Boolean));

        let by_ref = &registry;
        assert!(by_ref.lookup("Active").is_some());

        let shared = Arc::new(registry);
        assert!(shared.lookup("Active").is_some());
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = SchemaRegistry::new();
        assert!(registry
            .insert("Name", FieldTypeDefinition::new(FieldValueKind::String))
            .is_none());
        let previous = registry.insert("Name", FieldTypeDefinition::new(FieldValueKind::Enumeration));
        assert_eq!(previous.map(|d| d.kind), Some(FieldValueKind::String));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.field_names(), vec!["Name"]);
    }
}
