//! Enumeration field rules

use crate::condition::Operator;
use crate::field::{EnumOption, FieldValueKind};
use crate::utils::values_equal;
use crate::validation::shape::{check_shape, unsupported, ValueRule};
use crate::validation::ValidationResult;
use serde_json::Value;
use std::cmp::Ordering;

pub(crate) const NOT_AN_OPTION: &str = "value must be one of the available options";

struct EnumerationRule<'a> {
    options: Option<&'a [EnumOption]>,
}

impl ValueRule for EnumerationRule<'_> {
    type Item = ();

    fn coerce(&self, value: &Value) -> Result<(), String> {
        match self.options {
            Some(options) => {
                if options.iter().any(|option| values_equal(&option.value, value)) {
                    Ok(())
                } else {
                    Err(NOT_AN_OPTION.to_string())
                }
            }
            // No option set configured: any scalar goes
            None => match value {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
                _ => Err(NOT_AN_OPTION.to_string()),
            },
        }
    }

    fn compare(&self, _start: &(), _end: &()) -> Result<Ordering, String> {
        Err("enumerations cannot be used in a range".to_string())
    }
}

/// Validate a constant value for an enumeration field with the given options
pub fn validate_enumeration(
    value: &Value,
    operator: Operator,
    options: Option<&[EnumOption]>,
) -> ValidationResult {
    if !FieldValueKind::Enumeration.supports(operator) {
        return unsupported(FieldValueKind::Enumeration, operator);
    }
    check_shape(&EnumerationRule { options }, operator, value)
}
