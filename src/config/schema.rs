//! Schema document structures

use crate::condition::Operator;
use crate::error::{FilterError, Result};
use crate::field::{EnumOption, FieldTypeDefinition, FieldValueKind, SchemaRegistry};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Schema document: `{"fields": [FieldConfig, ...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// One field of a schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub kind: FieldValueKind,
    /// Restricts the kind's operator set; all legal operators when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<Vec<Operator>>,
    /// Option set, enumerations only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<EnumOption>>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, kind: FieldValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            operators: None,
            options: None,
        }
    }

    fn to_definition(&self) -> Result<FieldTypeDefinition> {
        if self.name.trim().is_empty() {
            return Err(FilterError::InvalidSchema("field name must not be empty".to_string()));
        }

        let mut definition = FieldTypeDefinition::new(self.kind);

        if let Some(options) = &self.options {
            if self.kind != FieldValueKind::Enumeration {
                return Err(FilterError::InvalidSchema(format!(
                    "field {} has options but is a {} field",
                    self.name, self.kind
                )));
            }
            definition = definition.with_options(options.clone());
        }

        if let Some(operators) = &self.operators {
            if let Some(logical) = operators.iter().find(|op| op.is_logical()) {
                return Err(FilterError::InvalidSchema(format!(
                    "field {} lists logical operator {}",
                    self.name, logical
                )));
            }
            definition = definition.with_operators(operators.iter().copied());
        }

        Ok(definition)
    }
}

impl SchemaConfig {
    /// Build a registry, rejecting duplicate and inconsistent fields
    pub fn into_registry(self) -> Result<SchemaRegistry> {
        let mut seen = AHashSet::with_capacity(self.fields.len());
        let mut registry = SchemaRegistry::new();

        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FilterError::InvalidSchema(format!(
                    "duplicate field {}",
                    field.name
                )));
            }
            registry.insert(field.name.clone(), field.to_definition()?);
        }

        tracing::debug!(fields = registry.len(), "Schema loaded");
        Ok(registry)
    }
}

/// Parse a JSON schema document into a registry
pub fn load_schema(json: &str) -> Result<SchemaRegistry> {
    let config: SchemaConfig = serde_json::from_str(json)?;
    config.into_registry()
}
