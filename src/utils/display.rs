//! Human-readable rendering of payloads

use crate::condition::{FilterBuilder, LogicalOperator, RhsKind};
use crate::field::FieldTypeRegistry;
use crate::payload::{LeafNode, PayloadNode};
use serde_json::Value;

/// Infix rendering, e.g. `(Price GT 10 AND NOT (Name Contains test))`
pub fn to_display_string(payload: &PayloadNode) -> String {
    match payload {
        PayloadNode::Leaf(leaf) => render_leaf(leaf),
        PayloadNode::Logical(node) => match (node.operator, node.condition.as_slice()) {
            (_, []) => String::new(),
            (LogicalOperator::Not, children) => {
                let inner: Vec<String> = children.iter().map(render_bare).collect();
                format!("NOT ({})", inner.join(" AND "))
            }
            (_, [single]) => to_display_string(single),
            (operator, children) => format!("({})", join_children(operator, children)),
        },
    }
}

/// Render without the outer parentheses of a multi-child group
fn render_bare(payload: &PayloadNode) -> String {
    match payload {
        PayloadNode::Logical(node)
            if node.operator != LogicalOperator::Not && node.condition.len() > 1 =>
        {
            join_children(node.operator, &node.condition)
        }
        other => to_display_string(other),
    }
}

fn join_children(operator: LogicalOperator, children: &[PayloadNode]) -> String {
    let separator = format!(" {} ", operator.keyword());
    children
        .iter()
        .map(to_display_string)
        .collect::<Vec<_>>()
        .join(&separator)
}

fn render_leaf(leaf: &LeafNode) -> String {
    if leaf.operator.is_emptiness() {
        return format!("{} {}", leaf.lhs_field, leaf.operator);
    }
    format!(
        "{} {} {}",
        leaf.lhs_field,
        leaf.operator,
        render_value(&leaf.rhs_value, leaf.rhs_type)
    )
}

fn render_value(value: &Value, rhs_type: RhsKind) -> String {
    match (rhs_type, value) {
        (RhsKind::Variable, Value::String(name)) => format!("${}", name),
        (_, Value::String(s)) => s.clone(),
        (_, Value::Array(items)) => {
            let items: Vec<String> = items.iter().map(|v| render_value(v, rhs_type)).collect();
            format!("[{}]", items.join(", "))
        }
        (_, Value::Object(map)) => match (map.get("amount"), map.get("currencyCode")) {
            (Some(amount), Some(Value::String(code))) => format!("{} {}", amount, code),
            _ => value.to_string(),
        },
        (_, other) => other.to_string(),
    }
}

impl<R: FieldTypeRegistry> FilterBuilder<R> {
    /// Rendering of the current payload; empty when there is none
    pub fn to_display_string(&self) -> String {
        self.to_payload()
            .map(|payload| to_display_string(&payload))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Operator;
    use serde_json::json;

    #[test]
    fn test_render_leaf() {
        assert_eq!(
            to_display_string(&PayloadNode::leaf("Status", Operator::Eq, "active")),
            "Status EQ active"
        );
        assert_eq!(
            to_display_string(&PayloadNode::leaf("Price", Operator::Between, json!([25, 50]))),
            "Price Between [25, 50]"
        );
        assert_eq!(
            to_display_string(&PayloadNode::leaf("Notes", Operator::Empty, Value::Null)),
            "Notes Empty"
        );
        assert_eq!(
            to_display_string(&PayloadNode::leaf(
                "Total",
                Operator::Gt,
                json!({"amount": 10, "currencyCode": "USD"})
            )),
            "Total GT 10 USD"
        );
    }

    #[test]
    fn test_render_groups() {
        let a = PayloadNode::leaf("A", Operator::Eq, 1);
        let b = PayloadNode::leaf("B", Operator::Eq, 2);

        let and = PayloadNode::group(LogicalOperator::And, vec![a.clone(), b.clone()]);
        assert_eq!(to_display_string(&and), "(A EQ 1 AND B EQ 2)");

        let single = PayloadNode::group(LogicalOperator::Or, vec![a.clone()]);
        assert_eq!(to_display_string(&single), "A EQ 1");

        let not = PayloadNode::group(LogicalOperator::Not, vec![a.clone()]);
        assert_eq!(to_display_string(&not), "NOT (A EQ 1)");

        let not_group = PayloadNode::group(LogicalOperator::Not, vec![and]);
        assert_eq!(to_display_string(&not_group), "NOT (A EQ 1 AND B EQ 2)");

        let nested = PayloadNode::group(
            LogicalOperator::Or,
            vec![
                a.clone(),
                PayloadNode::group(LogicalOperator::And, vec![a, b]),
            ],
        );
        assert_eq!(
            to_display_string(&nested),
            "(A EQ 1 OR (A EQ 1 AND B EQ 2))"
        );
    }

    #[test]
    fn test_render_variable() {
        let node = PayloadNode::Leaf(LeafNode {
            operator: Operator::Gt,
            lhs_field: "Price".to_string(),
            rhs_value: json!("minPrice"),
            rhs_type: RhsKind::Variable,
        });
        assert_eq!(to_display_string(&node), "Price GT $minPrice");
    }
}
