//! Wire format of a filter payload
//!
//! ```text
//! LogicalNode = { Operator: "And"|"Or"|"Not", Condition: [node, ...] }
//! LeafNode    = { Operator, LHSField, RHSValue, RHSType? }
//! ```

use crate::condition::{LogicalOperator, Operator, RhsKind};
use crate::error::{FilterError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A logical combinator over nested payload nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalNode {
    #[serde(rename = "Operator")]
    pub operator: LogicalOperator,
    #[serde(rename = "Condition")]
    pub condition: Vec<PayloadNode>,
}

/// A single comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafNode {
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "LHSField")]
    pub lhs_field: String,
    #[serde(rename = "RHSValue")]
    pub rhs_value: Value,
    #[serde(rename = "RHSType")]
    pub rhs_type: RhsKind,
}

/// One node of a payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PayloadNode {
    Logical(LogicalNode),
    Leaf(LeafNode),
}

impl PayloadNode {
    /// Constant leaf
    pub fn leaf(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        PayloadNode::Leaf(LeafNode {
            operator,
            lhs_field: field.into(),
            rhs_value: value.into(),
            rhs_type: RhsKind::Constant,
        })
    }

    pub fn group(operator: LogicalOperator, condition: Vec<PayloadNode>) -> Self {
        PayloadNode::Logical(LogicalNode {
            operator,
            condition,
        })
    }

    pub fn operator(&self) -> Operator {
        match self {
            PayloadNode::Logical(node) => node.operator.operator(),
            PayloadNode::Leaf(node) => node.operator,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, PayloadNode::Logical(_))
    }

    /// Children of a logical node; empty for leaves
    pub fn children(&self) -> &[PayloadNode] {
        match self {
            PayloadNode::Logical(node) => &node.condition,
            PayloadNode::Leaf(_) => &[],
        }
    }

    /// Parse a JSON value, rejecting missing discriminating fields
    pub fn from_value(value: &Value) -> Result<Self> {
        parse_node(value, "$")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<'de> Deserialize<'de> for PayloadNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        PayloadNode::from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn malformed(path: &str, message: impl std::fmt::Display) -> FilterError {
    FilterError::MalformedPayload(format!("{}: {}", path, message))
}

fn parse_node(value: &Value, path: &str) -> Result<PayloadNode> {
    let object = value
        .as_object()
        .ok_or_else(|| malformed(path, "expected an object"))?;

    let name = object
        .get("Operator")
        .ok_or_else(|| malformed(path, "missing Operator"))?
        .as_str()
        .ok_or_else(|| malformed(path, "Operator must be a string"))?;
    let operator: Operator = name
        .parse()
        .map_err(|_| malformed(path, format!("unknown operator {}", name)))?;

    match operator.as_logical() {
        Some(logical) => parse_logical(object, logical, path),
        None => parse_leaf(object, operator, path),
    }
}

fn parse_logical(
    object: &Map<String, Value>,
    operator: LogicalOperator,
    path: &str,
) -> Result<PayloadNode> {
    let items = object
        .get("Condition")
        .ok_or_else(|| malformed(path, format!("{} node is missing Condition", operator)))?
        .as_array()
        .ok_or_else(|| malformed(path, "Condition must be an array"))?;

    if operator == LogicalOperator::Not && items.len() != 1 {
        return Err(malformed(
            path,
            format!("Not must have exactly one condition (has {})", items.len()),
        ));
    }

    let condition = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_node(item, &format!("{}.Condition[{}]", path, i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(PayloadNode::group(operator, condition))
}

fn parse_leaf(object: &Map<String, Value>, operator: Operator, path: &str) -> Result<PayloadNode> {
    if object.contains_key("Condition") {
        return Err(malformed(
            path,
            format!("{} is not a logical operator but has a Condition list", operator),
        ));
    }

    let lhs_field = object
        .get("LHSField")
        .ok_or_else(|| malformed(path, "missing LHSField"))?
        .as_str()
        .ok_or_else(|| malformed(path, "LHSField must be a string"))?;
    if lhs_field.trim().is_empty() {
        return Err(malformed(path, "LHSField must not be empty"));
    }

    // null is a defined value (Empty / NotEmpty), a missing key is not
    let rhs_value = object
        .get("RHSValue")
        .cloned()
        .ok_or_else(|| malformed(path, "missing RHSValue"))?;

    let rhs_type = match object.get("RHSType") {
        None | Some(Value::Null) => RhsKind::Constant,
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| malformed(path, format!("unknown RHSType {}", s)))?,
        Some(_) => return Err(malformed(path, "RHSType must be a string")),
    };

    Ok(PayloadNode::Leaf(LeafNode {
        operator,
        lhs_field: lhs_field.to_string(),
        rhs_value,
        rhs_type,
    }))
}
