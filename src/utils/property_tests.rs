//! Property tests for utils module
//!
//! Property 4: equality ignores the order of commutative children, and
//! merging concatenates top-level condition lists.

use proptest::prelude::*;

use crate::condition::LogicalOperator;
use crate::payload::property_tests::{payload_strategy, tree_strategy};
use crate::payload::PayloadNode;
use crate::utils::{equals, merge, to_display_string};

// ═══════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Reverse the children of every And / Or group, recursively
fn reverse_commutative(node: &PayloadNode) -> PayloadNode {
    match node {
        PayloadNode::Leaf(_) => node.clone(),
        PayloadNode::Logical(logical) => {
            let mut children: Vec<PayloadNode> =
                logical.condition.iter().map(reverse_commutative).collect();
            if logical.operator.is_commutative() {
                children.reverse();
            }
            PayloadNode::group(logical.operator, children)
        }
    }
}

fn top_level_len(node: &PayloadNode) -> usize {
    match node {
        PayloadNode::Logical(logical) if logical.operator.is_commutative() => {
            logical.condition.len()
        }
        _ => 1,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Property tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Property 4.1: Reordering And / Or children at any depth keeps equality
    #[test]
    fn prop_equals_order_insensitive(tree in tree_strategy()) {
        let reordered = reverse_commutative(&tree);
        prop_assert!(equals(&tree, &reordered));
        prop_assert!(equals(&reordered, &tree));
    }

    /// Property 4.2: Merging one payload returns an equal copy
    #[test]
    fn prop_merge_single(payload in payload_strategy()) {
        let merged = merge(&[Some(payload.clone())], LogicalOperator::And).unwrap();
        prop_assert_eq!(merged, Some(payload));
    }

    /// Property 4.3: Merging two payloads concatenates their top-level lists
    #[test]
    fn prop_merge_counts(p in payload_strategy(), q in payload_strategy()) {
        let merged = merge(&[Some(p.clone()), None, Some(q.clone())], LogicalOperator::Or)
            .unwrap()
            .unwrap();
        prop_assert_eq!(merged.children().len(), top_level_len(&p) + top_level_len(&q));
    }

    /// Property 4.4: Rendering never fails and mentions every field
    #[test]
    fn prop_display_mentions_fields(tree in tree_strategy()) {
        let rendered = to_display_string(&tree);
        let mut stack = vec![&tree];
        while let Some(node) = stack.pop() {
            match node {
                PayloadNode::Leaf(leaf) => prop_assert!(rendered.contains(&leaf.lhs_field)),
                PayloadNode::Logical(logical) => stack.extend(logical.condition.iter()),
            }
        }
    }
}
