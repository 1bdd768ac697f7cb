//! Filter Expression Core - typed filter trees for record queries
//!
//! Builds nested `And` / `Or` / `Not` trees of `field operator value`
//! conditions, validates every condition against the field's declared type,
//! and converts trees to and from the canonical JSON payload:
//!
//! ```text
//! {"Operator": "And", "Condition": [
//!     {"Operator": "Between", "LHSField": "Price", "RHSValue": [25, 50], "RHSType": "Constant"}
//! ]}
//! ```
//!
//! ```
//! use filter_expression_core::{
//!     ConditionSpec, FieldTypeDefinition, FieldValueKind, FilterBuilder, Operator,
//!     SchemaRegistry,
//! };
//!
//! let registry = SchemaRegistry::new()
//!     .with_field("Price", FieldTypeDefinition::new(FieldValueKind::Number));
//! let mut builder = FilterBuilder::new(registry);
//! builder
//!     .add_condition(None, ConditionSpec::new("Price", Operator::Gt, 10))
//!     .unwrap();
//!
//! assert!(builder.is_valid());
//! assert_eq!(builder.to_display_string(), "Price GT 10");
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod field;
pub mod payload;
pub mod utils;
pub mod validation;

// ============================================================================
// Re-exports
// ============================================================================

pub use condition::{
    ConditionNode, ConditionPatch, ConditionSpec, FilterBuilder, GroupNode, LogicalOperator,
    Node, NodeError, NodeId, Operator, RhsKind, ValidationReport,
};
pub use config::{infer_registry, load_schema, FieldConfig, SchemaConfig};
pub use error::{FilterError, Result};
pub use field::{EnumOption, FieldTypeDefinition, FieldTypeRegistry, FieldValueKind, SchemaRegistry};
pub use payload::{
    from_payload, is_well_formed, to_payload, LeafNode, LogicalNode, PayloadNode, PayloadReport,
};
pub use utils::{clone_payload, equals, equals_ordered, merge, to_display_string};
pub use validation::{validate_condition, ValidationResult};
