//! Conversion between a filter tree and its canonical payload

use crate::condition::{ConditionSpec, FilterBuilder, LogicalOperator, Node, NodeId};
use crate::error::{FilterError, Result};
use crate::field::FieldTypeRegistry;
use crate::payload::wire::{LeafNode, PayloadNode};
use serde_json::Value;

/// Payload together with what was left out of it
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadReport {
    /// `None` when no valid content remains
    pub payload: Option<PayloadNode>,
    /// Whether any node was dropped for being invalid
    pub has_invalid_nodes: bool,
    /// Nodes dropped for being invalid, in depth-first order
    pub excluded: Vec<NodeId>,
}

/// Build the canonical payload from the valid part of a tree
pub fn to_payload<R: FieldTypeRegistry>(builder: &FilterBuilder<R>) -> Option<PayloadNode> {
    to_payload_report(builder).payload
}

/// Like [`to_payload`], but also reports which invalid nodes were excluded
pub fn to_payload_report<R: FieldTypeRegistry>(builder: &FilterBuilder<R>) -> PayloadReport {
    let mut excluded = Vec::new();
    let children: Vec<PayloadNode> = builder
        .roots()
        .iter()
        .filter_map(|id| emit(builder, *id, &mut excluded))
        .collect();

    let root_operator = builder.root_operator();
    let mut root_dropped = false;
    let payload = match root_operator {
        LogicalOperator::Not if builder.roots().len() != 1 => {
            root_dropped = true;
            for root in builder.roots() {
                if !excluded.contains(root) {
                    excluded.push(*root);
                }
            }
            None
        }
        _ if children.is_empty() => None,
        _ => Some(PayloadNode::group(root_operator, children)),
    };

    let has_invalid_nodes = root_dropped || !excluded.is_empty();
    if has_invalid_nodes {
        tracing::warn!(
            excluded = excluded.len(),
            root_dropped,
            "Invalid nodes left out of filter payload"
        );
    }

    PayloadReport {
        payload,
        has_invalid_nodes,
        excluded,
    }
}

fn emit<R: FieldTypeRegistry>(
    builder: &FilterBuilder<R>,
    id: NodeId,
    excluded: &mut Vec<NodeId>,
) -> Option<PayloadNode> {
    match builder.get_node(id)? {
        Node::Condition(condition) => {
            if !condition.is_valid() {
                excluded.push(id);
                return None;
            }
            Some(PayloadNode::Leaf(LeafNode {
                operator: condition.operator(),
                lhs_field: condition.field().to_string(),
                rhs_value: condition.rhs_value().clone(),
                rhs_type: condition.rhs_kind(),
            }))
        }
        Node::Group(group) => {
            let children: Vec<PayloadNode> = group
                .children()
                .iter()
                .filter_map(|child| emit(builder, *child, excluded))
                .collect();

            match group.operator() {
                // Never emit a Not over anything but exactly one child
                LogicalOperator::Not if group.children().len() != 1 => {
                    excluded.push(id);
                    None
                }
                _ if children.is_empty() => None,
                operator => Some(PayloadNode::group(operator, children)),
            }
        }
    }
}

/// Rebuild an editable tree from a payload
///
/// Nodes get fresh ids and are validated against `registry`; nodes that no
/// longer validate are kept but marked invalid. Structurally malformed input
/// is rejected as a whole.
///
/// A top-level leaf is normalised to a single condition under `And`, so it
/// is emitted again as `And[leaf]` rather than as the bare leaf.
pub fn from_payload<R: FieldTypeRegistry>(
    payload: &PayloadNode,
    registry: R,
) -> Result<FilterBuilder<R>> {
    if let Some(problem) = structural_problem(payload, "$") {
        return Err(FilterError::MalformedPayload(problem));
    }

    let mut builder = FilterBuilder::new(registry);
    match payload {
        PayloadNode::Logical(node) => {
            builder.force_root_operator(node.operator);
            for child in &node.condition {
                insert(&mut builder, None, child)?;
            }
        }
        PayloadNode::Leaf(_) => {
            insert(&mut builder, None, payload)?;
        }
    }

    tracing::debug!(
        nodes = builder.node_count(),
        valid = builder.is_valid(),
        "Filter rebuilt from payload"
    );
    Ok(builder)
}

/// Parse JSON and rebuild a tree in one step
pub fn from_json_value<R: FieldTypeRegistry>(value: &Value, registry: R) -> Result<FilterBuilder<R>> {
    let payload = PayloadNode::from_value(value)?;
    from_payload(&payload, registry)
}

fn insert<R: FieldTypeRegistry>(
    builder: &mut FilterBuilder<R>,
    parent: Option<NodeId>,
    node: &PayloadNode,
) -> Result<NodeId> {
    match node {
        PayloadNode::Leaf(leaf) => builder.add_condition(
            parent,
            ConditionSpec::new(leaf.lhs_field.clone(), leaf.operator, leaf.rhs_value.clone())
                .with_rhs_kind(leaf.rhs_type),
        ),
        PayloadNode::Logical(logical) => {
            let id = builder.add_group(parent, logical.operator)?;
            for child in &logical.condition {
                insert(builder, Some(id), child)?;
            }
            Ok(id)
        }
    }
}

/// Structural check only; field types and values are not validated
pub fn is_well_formed(payload: &PayloadNode) -> bool {
    structural_problem(payload, "$").is_none()
}

/// Structural check of raw JSON
pub fn is_well_formed_json(value: &Value) -> bool {
    PayloadNode::from_value(value).map_or(false, |node| is_well_formed(&node))
}

fn structural_problem(node: &PayloadNode, path: &str) -> Option<String> {
    match node {
        PayloadNode::Leaf(leaf) => {
            if leaf.operator.is_logical() {
                Some(format!(
                    "{}: logical operator {} used on a leaf",
                    path, leaf.operator
                ))
            } else if leaf.lhs_field.trim().is_empty() {
                Some(format!("{}: LHSField must not be empty", path))
            } else {
                None
            }
        }
        PayloadNode::Logical(logical) => {
            if logical.operator == LogicalOperator::Not && logical.condition.len() != 1 {
                return Some(format!(
                    "{}: Not must have exactly one condition (has {})",
                    path,
                    logical.condition.len()
                ));
            }
            logical
                .condition
                .iter()
                .enumerate()
                .find_map(|(i, child)| {
                    structural_problem(child, &format!("{}.Condition[{}]", path, i))
                })
        }
    }
}

impl<R: FieldTypeRegistry> FilterBuilder<R> {
    /// See [`to_payload`]
    pub fn to_payload(&self) -> Option<PayloadNode> {
        to_payload(self)
    }

    /// See [`to_payload_report`]
    pub fn to_payload_report(&self) -> PayloadReport {
        to_payload_report(self)
    }

    /// See [`from_payload`]
    pub fn from_payload(payload: &PayloadNode, registry: R) -> Result<Self> {
        from_payload(payload, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ConditionPatch, Operator, RhsKind};
    use crate::field::{EnumOption, FieldTypeDefinition, FieldValueKind, SchemaRegistry};
    use crate::utils::equals;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .with_field(
                "Price",
                FieldTypeDefinition::new(FieldValueKind::Number)
                    .with_operators([Operator::Eq, Operator::Between, Operator::Gt]),
            )
            .with_field(
                "Status",
                FieldTypeDefinition::enumeration(vec![
                    EnumOption::new("Active", "active"),
                    EnumOption::new("Inactive", "inactive"),
                ]),
            )
            .with_field("Name", FieldTypeDefinition::new(FieldValueKind::String))
    }

    #[test]
    fn test_price_between_scenario() {
        let registry = registry();
        let mut builder = FilterBuilder::new(&registry);

        let id = builder
            .add_condition(None, ConditionSpec::new("Price", Operator::Between, json!([50, 25])))
            .unwrap();
        let node = builder.get_node(id).unwrap();
        assert!(!node.is_valid());
        assert!(node.errors()[0].contains("ordering"));
        assert!(builder.to_payload().is_none());

        builder.update_condition(id, ConditionPatch::new().value(json!([25, 50])));
        assert!(builder.get_node(id).unwrap().is_valid());
        assert_eq!(
            builder.to_payload().unwrap().to_value().unwrap(),
            json!({
                "Operator": "And",
                "Condition": [{
                    "Operator": "Between",
                    "LHSField": "Price",
                    "RHSValue": [25, 50],
                    "RHSType": "Constant"
                }]
            })
        );
    }

    #[test]
    fn test_invalid_leaves_are_excluded_and_reported() {
        let registry = registry();
        let mut builder = FilterBuilder::new(&registry);
        builder
            .add_condition(None, ConditionSpec::new("Status", Operator::Eq, "active"))
            .unwrap();
        let bad = builder
            .add_condition(None, ConditionSpec::new("Status", Operator::Eq, "pending"))
            .unwrap();

        let report = builder.to_payload_report();
        assert!(report.has_invalid_nodes);
        assert_eq!(report.excluded, vec![bad]);
        assert_eq!(report.payload.unwrap().children().len(), 1);
    }

    #[test]
    fn test_emptied_group_is_omitted() {
        let registry = registry();
        let mut builder = FilterBuilder::new(&registry);
        builder
            .add_condition(None, ConditionSpec::new("Name", Operator::Eq, "a"))
            .unwrap();
        let group = builder.add_group(None, LogicalOperator::Or).unwrap();
        let a = builder
            .add_condition(Some(group), ConditionSpec::new("Price", Operator::Gt, 1))
            .unwrap();
        let b = builder
            .add_condition(Some(group), ConditionSpec::new("Price", Operator::Gt, 2))
            .unwrap();

        builder.remove_node(a);
        builder.remove_node(b);

        let payload = builder.to_payload().unwrap();
        assert_eq!(
            payload.to_value().unwrap(),
            json!({
                "Operator": "And",
                "Condition": [
                    {"Operator": "EQ", "LHSField": "Name", "RHSValue": "a", "RHSType": "Constant"}
                ]
            })
        );
    }

    #[test]
    fn test_group_with_only_invalid_children_is_absent() {
        let registry = registry();
        let mut builder = FilterBuilder::new(&registry);
        let group = builder.add_group(None, LogicalOperator::And).unwrap();
        builder
            .add_condition(Some(group), ConditionSpec::new("Price", Operator::Gt, "x"))
            .unwrap();

        let report = builder.to_payload_report();
        assert!(report.payload.is_none());
        assert!(report.has_invalid_nodes);
    }

    #[test]
    fn test_not_with_two_children_is_never_serialized() {
        let registry = registry();
        let mut builder = FilterBuilder::new(&registry);
        builder
            .add_condition(None, ConditionSpec::new("Name", Operator::Eq, "a"))
            .unwrap();
        let not = builder.add_group(None, LogicalOperator::Not).unwrap();
        builder
            .add_condition(Some(not), ConditionSpec::new("Price", Operator::Gt, 1))
            .unwrap();
        builder
            .add_condition(Some(not), ConditionSpec::new("Price", Operator::Gt, 2))
            .unwrap();

        let report = builder.to_payload_report();
        assert_eq!(report.excluded, vec![not]);
        let payload = report.payload.unwrap();
        assert_eq!(payload.children().len(), 1);
        assert_eq!(payload.children()[0].operator(), Operator::Eq);

        let malformed = PayloadNode::group(
            LogicalOperator::Not,
            vec![
                PayloadNode::leaf("Price", Operator::Gt, 1),
                PayloadNode::leaf("Price", Operator::Gt, 2),
            ],
        );
        assert!(!is_well_formed(&malformed));
        assert!(matches!(
            from_payload(&malformed, &registry),
            Err(FilterError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_round_trip_nested_payload() {
        let registry = registry();
        let payload = PayloadNode::from_value(&json!({
            "Operator": "Or",
            "Condition": [
                {"Operator": "EQ", "LHSField": "Status", "RHSValue": "active", "RHSType": "Constant"},
                {"Operator": "And", "Condition": [
                    {"Operator": "GT", "LHSField": "Price", "RHSValue": 10, "RHSType": "Constant"},
                    {"Operator": "Not", "Condition": [
                        {"Operator": "Contains", "LHSField": "Name", "RHSValue": "test", "RHSType": "Constant"}
                    ]}
                ]}
            ]
        }))
        .unwrap();

        let builder = from_payload(&payload, &registry).unwrap();
        assert_eq!(builder.root_operator(), LogicalOperator::Or);
        assert_eq!(builder.node_count(), 5);
        assert!(builder.is_valid());

        let emitted = builder.to_payload().unwrap();
        assert_eq!(emitted, payload);
        assert!(equals(&emitted, &payload));
    }

    #[test]
    fn test_round_trip_top_level_not() {
        let registry = registry();
        let payload = PayloadNode::group(
            LogicalOperator::Not,
            vec![PayloadNode::leaf("Price", Operator::Eq, 5)],
        );
        let builder = from_payload(&payload, &registry).unwrap();
        assert_eq!(builder.to_payload(), Some(payload));
    }

    #[test]
    fn test_stale_payload_comes_back_partially_invalid() {
        let registry = registry();
        let payload = PayloadNode::group(
            LogicalOperator::And,
            vec![
                PayloadNode::leaf("Price", Operator::Eq, 5),
                // LT is not allowed on Price in this registry
                PayloadNode::leaf("Price", Operator::Lt, 5),
            ],
        );

        let mut builder = from_payload(&payload, &registry).unwrap();
        let report = builder.validate_all();
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(builder.to_payload().unwrap().children().len(), 1);
    }

    #[test]
    fn test_not_root_with_two_roots_reports_dropped_roots() {
        let registry = registry();
        let payload = PayloadNode::group(
            LogicalOperator::Not,
            vec![PayloadNode::leaf("Price", Operator::Eq, 5)],
        );
        let mut builder = from_payload(&payload, &registry).unwrap();
        let first = builder.roots()[0];
        let second = builder
            .add_condition(None, ConditionSpec::new("Price", Operator::Gt, 1))
            .unwrap();

        let report = builder.to_payload_report();
        assert_eq!(report.payload, None);
        assert!(report.has_invalid_nodes);
        assert_eq!(report.excluded, vec![first, second]);

        builder.remove_node(second);
        builder.remove_node(first);
        let report = builder.to_payload_report();
        assert!(!report.has_invalid_nodes);
        assert!(report.excluded.is_empty());
        assert!(builder.validate_all().valid);
    }

    #[test]
    fn test_bare_leaf_payload() {
        let registry = registry();
        let leaf = PayloadNode::leaf("Name", Operator::Eq, "bob");
        let builder = from_payload(&leaf, &registry).unwrap();
        assert_eq!(
            builder.to_payload(),
            Some(PayloadNode::group(LogicalOperator::And, vec![leaf]))
        );
    }

    #[test]
    fn test_variable_rhs_survives_round_trip() {
        let registry = registry();
        let value = json!({
            "Operator": "And",
            "Condition": [
                {"Operator": "GT", "LHSField": "Price", "RHSValue": "minPrice", "RHSType": "Variable"}
            ]
        });
        let builder = from_json_value(&value, &registry).unwrap();
        let root = builder.roots()[0];
        let condition = builder.get_node(root).unwrap().as_condition().unwrap();
        assert_eq!(condition.rhs_kind(), RhsKind::Variable);
        assert_eq!(builder.to_payload().unwrap().to_value().unwrap(), value);
    }

    #[test]
    fn test_well_formed_json() {
        assert!(is_well_formed_json(&json!({
            "Operator": "Not",
            "Condition": [{"Operator": "EQ", "LHSField": "a", "RHSValue": 1}]
        })));
        assert!(!is_well_formed_json(&json!({"Operator": "Not", "Condition": []})));
        assert!(!is_well_formed_json(&json!({"Operator": "EQ", "LHSField": "a"})));
        assert!(!is_well_formed(&PayloadNode::leaf("a", Operator::And, 1)));
        assert!(!is_well_formed(&PayloadNode::leaf(" ", Operator::Eq, 1)));
    }

    #[test]
    fn test_empty_builder_has_no_payload() {
        let registry = registry();
        let builder = FilterBuilder::new(&registry);
        let report = builder.to_payload_report();
        assert!(report.payload.is_none());
        assert!(!report.has_invalid_nodes);
    }
}
