//! Operator-class shape checks shared by every value kind

use crate::condition::Operator;
use crate::field::FieldValueKind;
use crate::validation::ValidationResult;
use serde_json::Value;
use std::cmp::Ordering;

pub(crate) const VALUE_REQUIRED: &str = "a value is required";
pub(crate) const RANGE_ORDER: &str = "invalid range ordering: start must be less than end";

/// Coercion and ordering for one value kind
pub(crate) trait ValueRule {
    type Item;

    fn coerce(&self, value: &Value) -> Result<Self::Item, String>;

    /// Order two range ends; an `Err` is reported verbatim
    fn compare(&self, start: &Self::Item, end: &Self::Item) -> Result<Ordering, String>;
}

pub(crate) fn unsupported(kind: FieldValueKind, operator: Operator) -> ValidationResult {
    ValidationResult::fail(format!(
        "operator {} not supported for {} fields",
        operator, kind
    ))
}

/// Validate `value` against the generic shape of `operator`
///
/// Ranges need an ordered `[start, end]` pair, membership a non-empty list,
/// emptiness no value at all, everything else exactly one value.
pub(crate) fn check_shape<R: ValueRule>(
    rule: &R,
    operator: Operator,
    value: &Value,
) -> ValidationResult {
    if operator.is_emptiness() {
        return if value.is_null() {
            ValidationResult::ok()
        } else {
            ValidationResult::fail(format!("operator {} does not take a value", operator))
        };
    }

    if operator.is_range() {
        return check_range(rule, operator, value);
    }

    if operator.is_membership() {
        let items = match value.as_array() {
            Some(items) if !items.is_empty() => items,
            _ => {
                return ValidationResult::fail(format!(
                    "operator {} requires a non-empty list of values",
                    operator
                ))
            }
        };

        let errors = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                rule.coerce(item)
                    .err()
                    .map(|e| format!("item {}: {}", i + 1, e))
            })
            .collect();
        return ValidationResult::from_errors(errors);
    }

    if value.is_null() {
        return ValidationResult::fail(VALUE_REQUIRED);
    }
    if value.is_array() {
        return ValidationResult::fail(format!("operator {} expects a single value", operator));
    }

    match rule.coerce(value) {
        Ok(_) => ValidationResult::ok(),
        Err(e) => ValidationResult::fail(e),
    }
}

fn check_range<R: ValueRule>(rule: &R, operator: Operator, value: &Value) -> ValidationResult {
    let pair = match value.as_array() {
        Some(items) if items.len() == 2 => items,
        _ => {
            return ValidationResult::fail(format!(
                "operator {} requires a pair of values [start, end]",
                operator
            ))
        }
    };

    let mut errors = Vec::new();
    let start = rule
        .coerce(&pair[0])
        .map_err(|e| errors.push(format!("range start: {}", e)))
        .ok();
    let end = rule
        .coerce(&pair[1])
        .map_err(|e| errors.push(format!("range end: {}", e)))
        .ok();

    if let (Some(start), Some(end)) = (start, end) {
        match rule.compare(&start, &end) {
            Ok(Ordering::Less) => {}
            Ok(_) => errors.push(RANGE_ORDER.to_string()),
            Err(e) => errors.push(e),
        }
    }

    ValidationResult::from_errors(errors)
}
