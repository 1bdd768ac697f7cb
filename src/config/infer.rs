//! Registry inference from sample records

use crate::field::{FieldTypeDefinition, FieldValueKind, SchemaRegistry};
use crate::validation::{parse_date, parse_money};
use ahash::AHashMap;
use serde_json::Value;

/// Kind suggested by a single sample value; `None` for nulls
pub fn infer_kind(value: &Value) -> Option<FieldValueKind> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(FieldValueKind::Boolean),
        Value::Number(_) => Some(FieldValueKind::Number),
        Value::String(_) | Value::Object(_) if parse_money(value).is_some() => {
            Some(FieldValueKind::Currency)
        }
        Value::String(_) if parse_date(value).is_some() => Some(FieldValueKind::Date),
        _ => Some(FieldValueKind::String),
    }
}

/// Derive a registry from sample JSON records
///
/// Each top-level key of each object becomes a field. A field whose samples
/// disagree on a kind, or that was only ever null, is a string field.
/// Non-object samples are skipped.
pub fn infer_registry(samples: &[Value]) -> SchemaRegistry {
    let mut kinds: AHashMap<&str, Option<FieldValueKind>> = AHashMap::new();

    for record in samples.iter().filter_map(Value::as_object) {
        for (name, value) in record {
            let seen = kinds.entry(name.as_str()).or_insert(None);
            *seen = match (*seen, infer_kind(value)) {
                (None, kind) => kind,
                (Some(current), None) => Some(current),
                (Some(current), Some(kind)) if current == kind => Some(current),
                (Some(_), Some(_)) => Some(FieldValueKind::String),
            };
        }
    }

    let mut registry = SchemaRegistry::new();
    for (name, kind) in kinds {
        let kind = kind.unwrap_or(FieldValueKind::String);
        registry.insert(name, FieldTypeDefinition::new(kind));
    }

    tracing::debug!(
        samples = samples.len(),
        fields = registry.len(),
        "Registry inferred"
    );
    registry
}
