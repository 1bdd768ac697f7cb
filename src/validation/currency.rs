//! Currency field rules

use crate::condition::Operator;
use crate::field::FieldValueKind;
use crate::validation::shape::{check_shape, unsupported, ValueRule};
use crate::validation::ValidationResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

/// `<digits>[.<2 digits>] <CODE>`, e.g. "1250.00 USD"
static FORMATTED_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d{2})?) ([A-Z]{3})$").expect("currency pattern is valid")
});

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency code pattern is valid"));

const CURRENCY_SHAPE: &str =
    "value must be a currency amount (number, {amount, currencyCode} or \"<amount> <CODE>\")";

/// A currency amount, with or without a currency code
#[derive(Debug, Clone, PartialEq)]
pub struct Money {
    pub amount: f64,
    pub code: Option<String>,
}

/// Coerce one of the three accepted currency representations
pub fn parse_money(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => {
            let amount = n.as_f64().filter(|a| a.is_finite())?;
            Some(Money { amount, code: None })
        }
        Value::String(s) => {
            let caps = FORMATTED_AMOUNT.captures(s.trim())?;
            let amount = caps[1].parse::<f64>().ok()?;
            Some(Money {
                amount,
                code: Some(caps[2].to_string()),
            })
        }
        Value::Object(map) => {
            let amount = map
                .get("amount")
                .and_then(Value::as_f64)
                .filter(|a| a.is_finite())?;
            let code = map.get("currencyCode").and_then(Value::as_str)?;
            if !CURRENCY_CODE.is_match(code) {
                return None;
            }
            Some(Money {
                amount,
                code: Some(code.to_string()),
            })
        }
        _ => None,
    }
}

struct CurrencyRule;

impl ValueRule for CurrencyRule {
    type Item = Money;

    fn coerce(&self, value: &Value) -> Result<Money, String> {
        parse_money(value).ok_or_else(|| CURRENCY_SHAPE.to_string())
    }

    fn compare(&self, start: &Money, end: &Money) -> Result<Ordering, String> {
        if let (Some(a), Some(b)) = (&start.code, &end.code) {
            if a != b {
                return Err(format!(
                    "currency codes in a range must match ({} vs {})",
                    a, b
                ));
            }
        }
        start
            .amount
            .partial_cmp(&end.amount)
            .ok_or_else(|| CURRENCY_SHAPE.to_string())
    }
}

/// Validate a constant value for a currency field
pub fn validate_currency(value: &Value, operator: Operator) -> ValidationResult {
    if !FieldValueKind::Currency.supports(operator) {
        return unsupported(FieldValueKind::Currency, operator);
    }
    check_shape(&CurrencyRule, operator, value)
}
