//! Field value kinds and per-field type definitions

use crate::condition::Operator;
use crate::validation::{self, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Value kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValueKind {
    String,
    Number,
    Date,
    Boolean,
    Currency,
    Enumeration,
}

const STRING_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::In,
    Operator::NotIn,
    Operator::Contains,
    Operator::NotContains,
    Operator::MinLength,
    Operator::MaxLength,
    Operator::Empty,
    Operator::NotEmpty,
];

const ORDERED_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Gte,
    Operator::Lt,
    Operator::Lte,
    Operator::Between,
    Operator::NotBetween,
    Operator::In,
    Operator::NotIn,
    Operator::Empty,
    Operator::NotEmpty,
];

const DISCRETE_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::In,
    Operator::NotIn,
    Operator::Empty,
    Operator::NotEmpty,
];

impl FieldValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldValueKind::String => "string",
            FieldValueKind::Number => "number",
            FieldValueKind::Date => "date",
            FieldValueKind::Boolean => "boolean",
            FieldValueKind::Currency => "currency",
            FieldValueKind::Enumeration => "enumeration",
        }
    }

    /// Operators the kind itself accepts, independent of any field
    pub fn legal_operators(self) -> &'static [Operator] {
        match self {
            FieldValueKind::String => STRING_OPERATORS,
            FieldValueKind::Number | FieldValueKind::Date | FieldValueKind::Currency => {
                ORDERED_OPERATORS
            }
            FieldValueKind::Boolean | FieldValueKind::Enumeration => DISCRETE_OPERATORS,
        }
    }

    #[inline]
    pub fn supports(self, operator: Operator) -> bool {
        self.legal_operators().contains(&operator)
    }
}

impl fmt::Display for FieldValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an enumeration's option set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumOption {
    pub label: String,
    pub value: Value,
}

impl EnumOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Extra validation hook attached to a field definition
pub type CustomValidator = Arc<dyn Fn(&Value, Operator) -> ValidationResult + Send + Sync>;

/// Type information for a single field, as supplied by the schema registry
#[derive(Clone)]
pub struct FieldTypeDefinition {
    pub kind: FieldValueKind,
    pub allowed_operators: BTreeSet<Operator>,
    /// Ordered option set, only meaningful for enumerations
    pub options: Option<Vec<EnumOption>>,
    validator: Option<CustomValidator>,
}

impl FieldTypeDefinition {
    /// Definition allowing every operator legal for `kind`
    pub fn new(kind: FieldValueKind) -> Self {
        Self {
            kind,
            allowed_operators: kind.legal_operators().iter().copied().collect(),
            options: None,
            validator: None,
        }
    }

    pub fn enumeration(options: Vec<EnumOption>) -> Self {
        Self::new(FieldValueKind::Enumeration).with_options(options)
    }

    /// Restrict the field to the given operators
    pub fn with_operators(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.allowed_operators = operators.into_iter().collect();
        self
    }

    pub fn with_options(mut self, options: Vec<EnumOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Attach a validator that runs after the built-in rules pass
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value, Operator) -> ValidationResult + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    #[inline]
    pub fn allows(&self, operator: Operator) -> bool {
        self.allowed_operators.contains(&operator)
    }

    pub fn options(&self) -> Option<&[EnumOption]> {
        self.options.as_deref()
    }

    pub(crate) fn custom_validator(&self) -> Option<&CustomValidator> {
        self.validator.as_ref()
    }

    /// Validate a constant right-hand value for `operator`
    pub fn validate(&self, value: &Value, operator: Operator) -> ValidationResult {
        validation::validate_value(self, None, value, operator)
    }
}

impl fmt::Debug for FieldTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeDefinition")
            .field("kind", &self.kind)
            .field("allowed_operators", &self.allowed_operators)
            .field("options", &self.options)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
