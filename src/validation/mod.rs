//! Validation rules module
//!
//! One pure validator per field value kind, plus the pipeline that decides
//! whether a single condition is well-formed: field legality first, then the
//! kind's operator set, then the shape and type of the right-hand value.

mod boolean;
mod currency;
mod date;
mod enumeration;
mod number;
mod result;
mod shape;
mod string;


pub use boolean::*;
pub use currency::*;
pub use date::*;
pub use enumeration::*;
pub use number::*;
pub use result::*;
pub use string::*;

use crate::condition::{Operator, RhsKind};
use crate::field::{registry, FieldTypeDefinition, FieldTypeRegistry, FieldValueKind};
use serde_json::Value;

/// Dispatch to the validator of the definition's kind
pub fn validate_kind(
    definition: &FieldTypeDefinition,
    value: &Value,
    operator: Operator,
) -> ValidationResult {
    match definition.kind {
        FieldValueKind::String => validate_string(value, operator),
        FieldValueKind::Number => validate_number(value, operator),
        FieldValueKind::Date => validate_date(value, operator),
        FieldValueKind::Boolean => validate_boolean(value, operator),
        FieldValueKind::Currency => validate_currency(value, operator),
        FieldValueKind::Enumeration => {
            validate_enumeration(value, operator, definition.options())
        }
    }
}

/// Validate a constant value against a field definition
///
/// An operator outside the field's allowed set fails immediately and skips
/// value validation. The custom validator only runs once the built-in rules
/// have passed.
pub fn validate_value(
    definition: &FieldTypeDefinition,
    field: Option<&str>,
    value: &Value,
    operator: Operator,
) -> ValidationResult {
    if let Some(result) = check_operator(definition, field, operator) {
        return result;
    }

    let result = validate_kind(definition, value, operator);
    if !result.valid {
        return result;
    }

    match definition.custom_validator() {
        Some(validator) => validator(value, operator),
        None => result,
    }
}

/// Operator checks shared by every right-hand-side kind
fn check_operator(
    definition: &FieldTypeDefinition,
    field: Option<&str>,
    operator: Operator,
) -> Option<ValidationResult> {
    if operator.is_logical() {
        return Some(ValidationResult::fail(format!(
            "logical operator {} cannot be used in a condition",
            operator
        )));
    }

    // Kind-illegal operators report the kind, field restrictions the field
    if !definition.kind.supports(operator) {
        return Some(shape::unsupported(definition.kind, operator));
    }

    if !definition.allows(operator) {
        let message = match field {
            Some(field) => format!("operator {} not allowed for field {}", operator, field),
            None => format!("operator {} not allowed for this field", operator),
        };
        return Some(ValidationResult::fail(message));
    }

    None
}

/// Validate a whole condition against the registry
///
/// Unknown fields are validated against the permissive string definition.
pub fn validate_condition<R: FieldTypeRegistry + ?Sized>(
    registry: &R,
    field: &str,
    operator: Operator,
    value: &Value,
    rhs_kind: RhsKind,
) -> ValidationResult {
    if field.trim().is_empty() {
        return ValidationResult::fail("field name is required");
    }

    let definition = registry::resolve(registry, field);

    let result = match rhs_kind {
        RhsKind::Constant => validate_value(definition, Some(field), value, operator),
        RhsKind::FieldReference | RhsKind::Variable => {
            match check_operator(definition, Some(field), operator) {
                Some(result) => result,
                None => validate_reference(value, operator, rhs_kind),
            }
        }
    };

    tracing::trace!(
        field,
        operator = %operator,
        valid = result.valid,
        "Condition validated"
    );
    result
}

/// References carry a name instead of a literal
fn validate_reference(value: &Value, operator: Operator, rhs_kind: RhsKind) -> ValidationResult {
    if operator.is_emptiness() {
        return if value.is_null() {
            ValidationResult::ok()
        } else {
            ValidationResult::fail(format!("operator {} does not take a value", operator))
        };
    }

    match value.as_str() {
        Some(name) if !name.trim().is_empty() => ValidationResult::ok(),
        _ => {
            let what = match rhs_kind {
                RhsKind::Variable => "variable",
                _ => "field reference",
            };
            ValidationResult::fail(format!("a {} must name a non-empty identifier", what))
        }
    }
}
