//! Incremental filter builder
//!
//! Owns the expression tree as an arena keyed by node id. Every mutation
//! re-validates the touched node and recomputes validity up the ancestor
//! chain only.

use crate::condition::ast::{LogicalOperator, NodeId, Operator};
use crate::condition::node::{
    structural_errors, ConditionNode, ConditionPatch, ConditionSpec, GroupNode, Node,
};
use crate::error::{FilterError, Result};
use crate::field::FieldTypeRegistry;
use crate::validation::{validate_condition, ValidationResult};
use ahash::AHashMap;

/// One validation problem, attributed to the node that has it
#[derive(Debug, Clone, PartialEq)]
pub struct NodeError {
    /// `None` for problems with the top-level list itself
    pub node_id: Option<NodeId>,
    pub field: Option<String>,
    pub message: String,
}

/// Aggregate result of [`FilterBuilder::validate_all`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<NodeError>,
}

#[derive(Debug, Clone)]
struct Entry {
    node: Node,
    parent: Option<NodeId>,
}

/// Builder and exclusive owner of one filter tree
///
/// The top level is an ordered list of nodes combined by the root operator
/// (`And` unless changed).
#[derive(Debug, Clone)]
pub struct FilterBuilder<R> {
    registry: R,
    nodes: AHashMap<NodeId, Entry>,
    roots: Vec<NodeId>,
    root_operator: LogicalOperator,
    next_id: u64,
}

impl<R: FieldTypeRegistry> FilterBuilder<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            nodes: AHashMap::with_capacity(16),
            roots: Vec::new(),
            root_operator: LogicalOperator::And,
            next_id: 1,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add a condition under `parent` (or at the top level) and validate it
    pub fn add_condition(
        &mut self,
        parent: Option<NodeId>,
        spec: ConditionSpec,
    ) -> Result<NodeId> {
        self.check_parent(parent)?;

        let id = self.allocate_id();
        let result = validate_condition(
            &self.registry,
            &spec.field,
            spec.operator,
            &spec.value,
            spec.rhs_kind,
        );

        tracing::debug!(
            node_id = %id,
            field = %spec.field,
            operator = %spec.operator,
            valid = result.valid,
            "Condition added"
        );

        let node = Node::Condition(ConditionNode {
            id,
            operator: spec.operator,
            field: spec.field,
            rhs_value: spec.value,
            rhs_kind: spec.rhs_kind,
            is_valid: result.valid,
            errors: result.errors,
        });
        self.nodes.insert(id, Entry { node, parent });
        self.attach(id, parent, None);
        self.refresh_ancestors(parent);

        Ok(id)
    }

    /// Add an empty group; a `Not` group is invalid until it has one child
    pub fn add_group(&mut self, parent: Option<NodeId>, operator: LogicalOperator) -> Result<NodeId> {
        self.check_parent(parent)?;

        let id = self.allocate_id();
        let errors = structural_errors(operator, 0);
        let node = Node::Group(GroupNode {
            id,
            operator,
            children: Vec::new(),
            is_valid: errors.is_empty(),
            errors,
        });
        self.nodes.insert(id, Entry { node, parent });
        self.attach(id, parent, None);
        self.refresh_ancestors(parent);

        tracing::debug!(node_id = %id, operator = %operator, "Group added");
        Ok(id)
    }

    /// Merge `patch` into a condition and re-validate it
    ///
    /// Returns `false` when `id` is unknown or not a condition.
    pub fn update_condition(&mut self, id: NodeId, patch: ConditionPatch) -> bool {
        let parent = match self.nodes.get_mut(&id) {
            Some(Entry {
                node: Node::Condition(condition),
                parent,
            }) => {
                patch.apply(condition);
                *parent
            }
            _ => return false,
        };

        self.revalidate_condition(id);
        self.refresh_ancestors(parent);

        tracing::debug!(node_id = %id, "Condition updated");
        true
    }

    /// Change a group's combinator; `false` when `id` is not a group
    pub fn set_group_operator(&mut self, id: NodeId, operator: LogicalOperator) -> bool {
        match self.nodes.get_mut(&id) {
            Some(Entry {
                node: Node::Group(group),
                ..
            }) => group.operator = operator,
            _ => return false,
        }

        self.refresh_ancestors(Some(id));
        true
    }

    /// Remove a node and its subtree
    ///
    /// Removing the last top-level node leaves an empty, valid filter with
    /// the root operator back at `And`.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let parent = match self.nodes.get(&id) {
            Some(entry) => entry.parent,
            None => return false,
        };

        self.detach(id, parent);

        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.nodes.remove(&current) {
                removed += 1;
                if let Node::Group(group) = entry.node {
                    stack.extend(group.children);
                }
            }
        }

        self.refresh_ancestors(parent);
        if self.roots.is_empty() {
            // An empty filter always combines with And
            self.root_operator = LogicalOperator::And;
        }

        tracing::debug!(node_id = %id, removed, "Node removed");
        true
    }

    /// Move a node to position `index` under `parent` (or the top level)
    ///
    /// `index` is clamped to the number of siblings. Ids are preserved.
    pub fn move_node(&mut self, id: NodeId, parent: Option<NodeId>, index: usize) -> Result<()> {
        let old_parent = self
            .nodes
            .get(&id)
            .map(|entry| entry.parent)
            .ok_or(FilterError::NodeNotFound(id))?;
        self.check_parent(parent)?;

        if let Some(target) = parent {
            if target == id || self.is_descendant(target, id) {
                return Err(FilterError::MoveIntoDescendant(id));
            }
        }

        self.detach(id, old_parent);
        if let Some(entry) = self.nodes.get_mut(&id) {
            entry.parent = parent;
        }
        self.attach(id, parent, Some(index));

        self.refresh_ancestors(old_parent);
        self.refresh_ancestors(parent);

        tracing::debug!(node_id = %id, index, "Node moved");
        Ok(())
    }

    /// Combinator for the top-level list; only `And` and `Or` are accepted
    pub fn set_root_operator(&mut self, operator: LogicalOperator) -> Result<()> {
        match operator {
            LogicalOperator::And | LogicalOperator::Or => {
                self.root_operator = operator;
                Ok(())
            }
            LogicalOperator::Not => Err(FilterError::InvalidRootOperator(Operator::Not)),
        }
    }

    /// Used when rebuilding a tree whose top node was a `Not`
    pub(crate) fn force_root_operator(&mut self, operator: LogicalOperator) {
        self.root_operator = operator;
    }

    /// Drop every node; ids keep counting up
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.root_operator = LogicalOperator::And;
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Re-run validation for one node (its whole subtree for a group)
    pub fn validate_node(&mut self, id: NodeId) -> Option<ValidationResult> {
        let parent = self.nodes.get(&id)?.parent;
        self.revalidate_subtree(id);
        self.refresh_ancestors(parent);

        self.nodes.get(&id).map(|entry| ValidationResult {
            valid: entry.node.is_valid(),
            errors: entry.node.errors().to_vec(),
        })
    }

    /// Re-run validation for the whole tree and list every problem
    pub fn validate_all(&mut self) -> ValidationReport {
        let roots = self.roots.clone();
        for root in &roots {
            self.revalidate_subtree(*root);
        }

        let mut errors = Vec::new();
        for message in self.root_errors() {
            errors.push(NodeError {
                node_id: None,
                field: None,
                message,
            });
        }
        for root in &roots {
            self.collect_errors(*root, &mut errors);
        }

        tracing::debug!(
            nodes = self.nodes.len(),
            errors = errors.len(),
            "Filter validated"
        );

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Current validity of the whole tree, without re-running validation
    pub fn is_valid(&self) -> bool {
        self.root_errors().is_empty()
            && self
                .roots
                .iter()
                .all(|id| self.nodes.get(id).map_or(false, |e| e.node.is_valid()))
    }

    fn root_errors(&self) -> Vec<String> {
        structural_errors(self.root_operator, self.roots.len())
    }

    fn collect_errors(&self, id: NodeId, out: &mut Vec<NodeError>) {
        let Some(entry) = self.nodes.get(&id) else {
            return;
        };

        match &entry.node {
            Node::Condition(condition) => {
                out.extend(condition.errors.iter().map(|message| NodeError {
                    node_id: Some(id),
                    field: Some(condition.field.clone()),
                    message: message.clone(),
                }));
            }
            Node::Group(group) => {
                // Only the group's own problems; children report theirs
                for message in structural_errors(group.operator, group.children.len()) {
                    out.push(NodeError {
                        node_id: Some(id),
                        field: None,
                        message,
                    });
                }
                for child in &group.children {
                    self.collect_errors(*child, out);
                }
            }
        }
    }

    fn revalidate_condition(&mut self, id: NodeId) {
        if let Some(Entry {
            node: Node::Condition(condition),
            ..
        }) = self.nodes.get_mut(&id)
        {
            let result = validate_condition(
                &self.registry,
                &condition.field,
                condition.operator,
                &condition.rhs_value,
                condition.rhs_kind,
            );
            condition.is_valid = result.valid;
            condition.errors = result.errors;
        }
    }

    fn revalidate_subtree(&mut self, id: NodeId) {
        let children = match self.nodes.get(&id) {
            Some(Entry {
                node: Node::Group(group),
                ..
            }) => group.children.clone(),
            Some(_) => {
                self.revalidate_condition(id);
                return;
            }
            None => return,
        };

        for child in children {
            self.revalidate_subtree(child);
        }
        self.recompute_group(id);
    }

    /// Recompute a group's cached state from its children's cached state
    fn recompute_group(&mut self, id: NodeId) {
        let (valid, errors) = match self.nodes.get(&id) {
            Some(Entry {
                node: Node::Group(group),
                ..
            }) => {
                let mut errors = structural_errors(group.operator, group.children.len());
                let mut valid = errors.is_empty();
                for child in &group.children {
                    if let Some(entry) = self.nodes.get(child) {
                        valid &= entry.node.is_valid();
                        errors.extend(entry.node.errors().iter().cloned());
                    }
                }
                (valid, errors)
            }
            _ => return,
        };

        if let Some(Entry {
            node: Node::Group(group),
            ..
        }) = self.nodes.get_mut(&id)
        {
            group.is_valid = valid;
            group.errors = errors;
        }
    }

    /// Walk from `start` to the top, recomputing each group
    fn refresh_ancestors(&mut self, start: Option<NodeId>) {
        let mut current = start;
        while let Some(id) = current {
            self.recompute_group(id);
            current = self.nodes.get(&id).and_then(|entry| entry.parent);
        }
    }

    // ========================================================================
    // Structure helpers
    // ========================================================================

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn check_parent(&self, parent: Option<NodeId>) -> Result<()> {
        match parent {
            None => Ok(()),
            Some(id) => match self.nodes.get(&id) {
                Some(Entry {
                    node: Node::Group(_),
                    ..
                }) => Ok(()),
                Some(_) => Err(FilterError::NotAGroup(id)),
                None => Err(FilterError::NodeNotFound(id)),
            },
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(parent_id) => match self.nodes.get_mut(&parent_id) {
                Some(Entry {
                    node: Node::Group(group),
                    ..
                }) => Some(&mut group.children),
                _ => None,
            },
        }
    }

    fn attach(&mut self, id: NodeId, parent: Option<NodeId>, index: Option<usize>) {
        if let Some(siblings) = self.siblings_mut(parent) {
            let index = index.map_or(siblings.len(), |i| i.min(siblings.len()));
            siblings.insert(index, id);
        }
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|child| *child != id);
        }
    }

    /// Whether `id` sits somewhere below `ancestor`
    fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|entry| entry.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes.get(&parent).and_then(|entry| entry.parent);
        }
        false
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).map(|entry| &entry.node)
    }

    /// Parent group of `id`; `None` for top-level or unknown nodes
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|entry| entry.parent)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.get_node(id)
            .and_then(Node::as_group)
            .map(GroupNode::children)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn root_operator(&self) -> LogicalOperator {
        self.root_operator
    }

    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|entry| !entry.node.is_group())
            .count()
    }

    pub fn group_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Nodes in depth-first, child order
    pub fn iter_depth_first(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(entry) = self.nodes.get(&id) {
                if let Node::Group(group) = &entry.node {
                    stack.extend(group.children.iter().rev().copied());
                }
                out.push(&entry.node);
            }
        }
        out
    }
}
