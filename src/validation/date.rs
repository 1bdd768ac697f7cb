//! Date field rules

use crate::condition::Operator;
use crate::field::FieldValueKind;
use crate::validation::shape::{check_shape, unsupported, ValueRule};
use crate::validation::ValidationResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

struct DateRule;

impl ValueRule for DateRule {
    type Item = DateTime<Utc>;

    fn coerce(&self, value: &Value) -> Result<DateTime<Utc>, String> {
        parse_date(value).ok_or_else(|| "value must be a valid date".to_string())
    }

    fn compare(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<Ordering, String> {
        Ok(start.cmp(end))
    }
}

/// Coerce a value into an instant
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DDTHH:MM:SS[.f]` (as UTC),
/// plain `YYYY-MM-DD` (midnight UTC) and integer epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let millis = match n.as_i64() {
                Some(millis) => millis,
                None => {
                    let f = n.as_f64()?;
                    if f.fract() != 0.0 || !f.is_finite() {
                        return None;
                    }
                    f as i64
                }
            };
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validate a constant value for a date field
pub fn validate_date(value: &Value, operator: Operator) -> ValidationResult {
    if !FieldValueKind::Date.supports(operator) {
        return unsupported(FieldValueKind::Date, operator);
    }
    check_shape(&DateRule, operator, value)
}
