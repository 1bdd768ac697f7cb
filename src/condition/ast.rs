//! Operators, right-hand-side kinds and node identifiers

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every operator a filter node can carry
///
/// Logical operators (`And`, `Or`, `Not`) mark a group, everything else a
/// condition leaf. The serde names are the exact wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    /// Equal
    #[serde(rename = "EQ")]
    Eq,
    /// Not equal
    #[serde(rename = "NE")]
    Ne,
    /// Greater than
    #[serde(rename = "GT")]
    Gt,
    /// Greater than or equal
    #[serde(rename = "GTE")]
    Gte,
    /// Less than
    #[serde(rename = "LT")]
    Lt,
    /// Less than or equal
    #[serde(rename = "LTE")]
    Lte,
    /// Inside `[start, end]`
    Between,
    /// Outside `[start, end]`
    NotBetween,
    /// Member of a list
    #[serde(rename = "IN")]
    In,
    /// Not a member of a list
    #[serde(rename = "NIN")]
    NotIn,
    Contains,
    NotContains,
    MinLength,
    MaxLength,
    Empty,
    NotEmpty,
    And,
    Or,
    Not,
}

impl Operator {
    /// All operators in declaration order
    pub const ALL: [Operator; 19] = [
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
        Operator::Contains,
        Operator::NotContains,
        Operator::MinLength,
        Operator::MaxLength,
        Operator::Empty,
        Operator::NotEmpty,
        Operator::And,
        Operator::Or,
        Operator::Not,
    ];

    /// Wire name of the operator
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::Between => "Between",
            Operator::NotBetween => "NotBetween",
            Operator::In => "IN",
            Operator::NotIn => "NIN",
            Operator::Contains => "Contains",
            Operator::NotContains => "NotContains",
            Operator::MinLength => "MinLength",
            Operator::MaxLength => "MaxLength",
            Operator::Empty => "Empty",
            Operator::NotEmpty => "NotEmpty",
            Operator::And => "And",
            Operator::Or => "Or",
            Operator::Not => "Not",
        }
    }

    #[inline]
    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }

    /// The logical counterpart, if this is a group operator
    #[inline]
    pub fn as_logical(self) -> Option<LogicalOperator> {
        match self {
            Operator::And => Some(LogicalOperator::And),
            Operator::Or => Some(LogicalOperator::Or),
            Operator::Not => Some(LogicalOperator::Not),
            _ => None,
        }
    }

    #[inline]
    pub fn is_range(self) -> bool {
        matches!(self, Operator::Between | Operator::NotBetween)
    }

    #[inline]
    pub fn is_membership(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    #[inline]
    pub fn is_emptiness(self) -> bool {
        matches!(self, Operator::Empty | Operator::NotEmpty)
    }

    #[inline]
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }

    /// Operators that only make sense on text
    #[inline]
    pub fn is_string_specific(self) -> bool {
        matches!(
            self,
            Operator::Contains | Operator::NotContains | Operator::MinLength | Operator::MaxLength
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| FilterError::InvalidOperator(s.to_string()))
    }
}

/// Group combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        self.operator().as_str()
    }

    /// Widen into the full operator enumeration
    #[inline]
    pub fn operator(self) -> Operator {
        match self {
            LogicalOperator::And => Operator::And,
            LogicalOperator::Or => Operator::Or,
            LogicalOperator::Not => Operator::Not,
        }
    }

    /// `And` and `Or` do not depend on child order
    #[inline]
    pub fn is_commutative(self) -> bool {
        !matches!(self, LogicalOperator::Not)
    }

    /// Keyword used in display strings
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogicalOperator> for Operator {
    fn from(op: LogicalOperator) -> Self {
        op.operator()
    }
}

impl TryFrom<Operator> for LogicalOperator {
    type Error = FilterError;

    fn try_from(op: Operator) -> Result<Self> {
        op.as_logical()
            .ok_or_else(|| FilterError::InvalidOperator(format!("{} is not a logical operator", op)))
    }
}

/// What the right-hand side of a condition refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RhsKind {
    /// A literal value
    #[default]
    Constant,
    /// The name of another field
    FieldReference,
    /// The name of a variable bound at query time
    Variable,
}

impl RhsKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RhsKind::Constant => "Constant",
            RhsKind::FieldReference => "FieldReference",
            RhsKind::Variable => "Variable",
        }
    }
}

impl FromStr for RhsKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Constant" => Ok(RhsKind::Constant),
            "FieldReference" => Ok(RhsKind::FieldReference),
            "Variable" => Ok(RhsKind::Variable),
            _ => Err(FilterError::MalformedPayload(format!(
                "Unknown RHSType: {}",
                s
            ))),
        }
    }
}

/// Stable identifier of a node within one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    #[inline]
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}
