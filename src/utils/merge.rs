//! Combining several filters into one

use crate::condition::{LogicalOperator, Operator};
use crate::error::{FilterError, Result};
use crate::payload::{is_well_formed, PayloadNode};

/// Deep copy of a payload
#[inline]
pub fn clone_payload(payload: &PayloadNode) -> PayloadNode {
    payload.clone()
}

/// Merge filters under `operator` (`And` or `Or`)
///
/// Absent, malformed and empty inputs are dropped. A single survivor is
/// returned as a copy; several survivors have their top-level condition lists
/// concatenated under `operator` rather than nested. Leaves and `Not` nodes
/// count as one condition each.
///
/// The inputs' own top-level operators are discarded: merging `(a OR b)`
/// with `c` under `And` yields `a AND b AND c`. Wrap an input in a group of
/// its own first when its combinator has to survive the merge.
pub fn merge(
    payloads: &[Option<PayloadNode>],
    operator: LogicalOperator,
) -> Result<Option<PayloadNode>> {
    if operator == LogicalOperator::Not {
        return Err(FilterError::InvalidRootOperator(Operator::Not));
    }

    let usable: Vec<&PayloadNode> = payloads
        .iter()
        .flatten()
        .filter(|payload| {
            let usable = is_well_formed(payload) && !is_empty_group(payload);
            if !usable {
                tracing::debug!("Dropping malformed or empty payload from merge");
            }
            usable
        })
        .collect();

    let merged = match usable.as_slice() {
        [] => None,
        [single] => Some(clone_payload(single)),
        many => {
            let mut condition = Vec::new();
            for payload in many {
                match payload {
                    PayloadNode::Logical(node) if node.operator.is_commutative() => {
                        condition.extend(node.condition.iter().cloned())
                    }
                    other => condition.push(clone_payload(other)),
                }
            }
            Some(PayloadNode::group(operator, condition))
        }
    };

    tracing::debug!(
        inputs = payloads.len(),
        merged = usable.len(),
        operator = %operator,
        "Filters merged"
    );
    Ok(merged)
}

fn is_empty_group(payload: &PayloadNode) -> bool {
    matches!(payload, PayloadNode::Logical(node) if node.condition.is_empty())
}
