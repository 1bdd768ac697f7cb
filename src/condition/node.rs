//! Expression tree nodes
//!
//! A node is either a condition leaf or a logical group. Groups refer to
//! their children by id; the nodes themselves live in the builder's arena.

use crate::condition::ast::{LogicalOperator, NodeId, Operator, RhsKind};
use serde_json::Value;

/// A single `field operator value` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionNode {
    pub(crate) id: NodeId,
    pub(crate) operator: Operator,
    pub(crate) field: String,
    pub(crate) rhs_value: Value,
    pub(crate) rhs_kind: RhsKind,
    pub(crate) is_valid: bool,
    pub(crate) errors: Vec<String>,
}

impl ConditionNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn rhs_value(&self) -> &Value {
        &self.rhs_value
    }

    pub fn rhs_kind(&self) -> RhsKind {
        self.rhs_kind
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// An `And` / `Or` / `Not` combinator over child nodes
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub(crate) id: NodeId,
    pub(crate) operator: LogicalOperator,
    pub(crate) children: Vec<NodeId>,
    pub(crate) is_valid: bool,
    pub(crate) errors: Vec<String>,
}

impl GroupNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Valid when structurally sound and every child is valid
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Own structural errors followed by the children's errors
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Errors a group has regardless of its children
pub(crate) fn structural_errors(operator: LogicalOperator, child_count: usize) -> Vec<String> {
    match operator {
        LogicalOperator::Not if child_count != 1 => vec![format!(
            "a Not group must have exactly one child (has {})",
            child_count
        )],
        _ => Vec::new(),
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Condition(ConditionNode),
    Group(GroupNode),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Condition(c) => c.id,
            Node::Group(g) => g.id,
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            Node::Condition(c) => c.operator,
            Node::Group(g) => g.operator.operator(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Node::Condition(c) => c.is_valid,
            Node::Group(g) => g.is_valid,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Node::Condition(c) => &c.errors,
            Node::Group(g) => &g.errors,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub fn as_condition(&self) -> Option<&ConditionNode> {
        match self {
            Node::Condition(c) => Some(c),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(g) => Some(g),
            Node::Condition(_) => None,
        }
    }
}

/// Everything needed to create a condition
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSpec {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    pub rhs_kind: RhsKind,
}

impl ConditionSpec {
    /// A condition comparing `field` against a constant
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            rhs_kind: RhsKind::Constant,
        }
    }

    /// `Empty` / `NotEmpty` take no value
    pub fn emptiness(field: impl Into<String>, operator: Operator) -> Self {
        Self::new(field, operator, Value::Null)
    }

    pub fn with_rhs_kind(mut self, rhs_kind: RhsKind) -> Self {
        self.rhs_kind = rhs_kind;
        self
    }
}

/// Partial update of a condition; `None` leaves the part unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionPatch {
    pub field: Option<String>,
    pub operator: Option<Operator>,
    pub value: Option<Value>,
    pub rhs_kind: Option<RhsKind>,
}

impl ConditionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn rhs_kind(mut self, rhs_kind: RhsKind) -> Self {
        self.rhs_kind = Some(rhs_kind);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_none()
            && self.operator.is_none()
            && self.value.is_none()
            && self.rhs_kind.is_none()
    }

    pub(crate) fn apply(self, condition: &mut ConditionNode) {
        if let Some(field) = self.field {
            condition.field = field;
        }
        if let Some(operator) = self.operator {
            condition.operator = operator;
        }
        if let Some(value) = self.value {
            condition.rhs_value = value;
        }
        if let Some(rhs_kind) = self.rhs_kind {
            condition.rhs_kind = rhs_kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn condition() -> ConditionNode {
        ConditionNode {
            id: NodeId::new(1),
            operator: Operator::Eq,
            field: "Name".to_string(),
            rhs_value: json!("a"),
            rhs_kind: RhsKind::Constant,
            is_valid: true,
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_patch_merges_only_given_parts() {
        let mut node = condition();
        ConditionPatch::new()
            .operator(Operator::Contains)
            .value("b")
            .apply(&mut node);

        assert_eq!(node.field(), "Name");
        assert_eq!(node.operator(), Operator::Contains);
        assert_eq!(node.rhs_value(), &json!("b"));
        assert_eq!(node.rhs_kind(), RhsKind::Constant);
    }

    #[test]
    fn test_structural_errors() {
        assert!(structural_errors(LogicalOperator::Not, 1).is_empty());
        assert_eq!(structural_errors(LogicalOperator::Not, 2).len(), 1);
        assert_eq!(structural_errors(LogicalOperator::Not, 0).len(), 1);
        assert!(structural_errors(LogicalOperator::And, 0).is_empty());
    }

    #[test]
    fn test_node_accessors() {
        let node = Node::Condition(condition());
        assert_eq!(node.id(), NodeId::new(1));
        assert_eq!(node.operator(), Operator::Eq);
        assert!(!node.is_group());
        assert!(node.as_group().is_none());
        assert!(ConditionPatch::new().is_empty());
    }
}
