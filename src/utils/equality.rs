//! Structural equality of payloads

use crate::payload::PayloadNode;
use serde_json::Value;

/// JSON equality where numbers compare by value (`25 == 25.0`)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Deep equality; `And` / `Or` children match regardless of order
///
/// Applies at every nesting level. `Not` has a single child, so order is moot.
pub fn equals(a: &PayloadNode, b: &PayloadNode) -> bool {
    nodes_equal(a, b, true)
}

/// Deep equality comparing children positionally
pub fn equals_ordered(a: &PayloadNode, b: &PayloadNode) -> bool {
    nodes_equal(a, b, false)
}

fn nodes_equal(a: &PayloadNode, b: &PayloadNode, unordered: bool) -> bool {
    match (a, b) {
        (PayloadNode::Leaf(x), PayloadNode::Leaf(y)) => {
            x.operator == y.operator
                && x.lhs_field == y.lhs_field
                && x.rhs_type == y.rhs_type
                && values_equal(&x.rhs_value, &y.rhs_value)
        }
        (PayloadNode::Logical(x), PayloadNode::Logical(y)) => {
            if x.operator != y.operator || x.condition.len() != y.condition.len() {
                return false;
            }
            if unordered && x.operator.is_commutative() {
                match_unordered(&x.condition, &y.condition)
            } else {
                x.condition
                    .iter()
                    .zip(&y.condition)
                    .all(|(x, y)| nodes_equal(x, y, unordered))
            }
        }
        _ => false,
    }
}

/// Pair every child of `xs` with a distinct equal child of `ys`
fn match_unordered(xs: &[PayloadNode], ys: &[PayloadNode]) -> bool {
    let mut used = vec![false; ys.len()];
    xs.iter().all(|x| {
        match (0..ys.len()).find(|&i| !used[i] && nodes_equal(x, &ys[i], true)) {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{LogicalOperator, Operator, RhsKind};
    use crate::payload::LeafNode;
    use serde_json::json;

    fn leaf(field: &str, value: i64) -> PayloadNode {
        PayloadNode::leaf(field, Operator::Eq, value)
    }

    #[test]
    fn test_values_equal_numbers() {
        assert!(values_equal(&json!(25), &json!(25.0)));
        assert!(values_equal(&json!([1, 2.0]), &json!([1.0, 2])));
        assert!(values_equal(
            &json!({"amount": 10, "currencyCode": "USD"}),
            &json!({"currencyCode": "USD", "amount": 10.0})
        ));
        assert!(!values_equal(&json!("25"), &json!(25)));
        assert!(!values_equal(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn test_commutative_groups_ignore_order_at_every_level() {
        let a = PayloadNode::group(
            LogicalOperator::And,
            vec![
                leaf("A", 1),
                PayloadNode::group(LogicalOperator::Or, vec![leaf("B", 2), leaf("C", 3)]),
            ],
        );
        let b = PayloadNode::group(
            LogicalOperator::And,
            vec![
                PayloadNode::group(LogicalOperator::Or, vec![leaf("C", 3), leaf("B", 2)]),
                leaf("A", 1),
            ],
        );

        assert!(equals(&a, &b));
        assert!(!equals_ordered(&a, &b));
        assert!(equals_ordered(&a, &a.clone()));
    }

    #[test]
    fn test_operator_and_child_count_must_match() {
        let and = PayloadNode::group(LogicalOperator::And, vec![leaf("A", 1), leaf("B", 2)]);
        let or = PayloadNode::group(LogicalOperator::Or, vec![leaf("A", 1), leaf("B", 2)]);
        let shorter = PayloadNode::group(LogicalOperator::And, vec![leaf("A", 1)]);

        assert!(!equals(&and, &or));
        assert!(!equals(&and, &shorter));
        assert!(!equals(&and, &leaf("A", 1)));
    }

    #[test]
    fn test_duplicates_are_matched_one_to_one() {
        let a = PayloadNode::group(LogicalOperator::Or, vec![leaf("A", 1), leaf("A", 1)]);
        let b = PayloadNode::group(LogicalOperator::Or, vec![leaf("A", 1), leaf("B", 1)]);
        assert!(!equals(&a, &b));
    }

    #[test]
    fn test_rhs_type_participates() {
        let constant = leaf("A", 1);
        let variable = PayloadNode::Leaf(LeafNode {
            operator: Operator::Eq,
            lhs_field: "A".to_string(),
            rhs_value: json!(1),
            rhs_type: RhsKind::Variable,
        });
        assert!(!equals(&constant, &variable));

        // A missing RHSType parses as Constant
        let parsed =
            PayloadNode::from_value(&json!({"Operator": "EQ", "LHSField": "A", "RHSValue": 1.0}))
                .unwrap();
        assert!(equals(&constant, &parsed));
    }
}
