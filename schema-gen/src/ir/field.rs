//! Field IR definitions.
//!
//! This module defines [`FieldType`], the closed enumeration of universal
//! value kinds, and [`USRField`], the per-field node of the intermediate
//! representation. Fields are schema-agnostic and can be consumed by any
//! code generator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Universal field types supported by the schema compiler.
///
/// There is deliberately no `Optional` variant: optionality is a boolean
/// flag layered on top of the unwrapped classification, so downstream
/// consumers branch on [`USRField::optional`] first, then on the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Date,
    Time,
    Uuid,
    Decimal,
    Bytes,
    List,
    Set,
    FrozenSet,
    Tuple,
    Dict,
    Union,
    Literal,
    Enum,
    NestedSchema,
}

impl FieldType {
    /// Check if this type accepts numeric range constraints.
    pub fn is_numeric_like(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float | FieldType::Decimal)
    }

    /// Check if this is a homogeneous container kind.
    pub fn is_container(&self) -> bool {
        matches!(self, FieldType::List | FieldType::Set | FieldType::FrozenSet)
    }

    /// Check if this type accepts length constraints.
    pub fn is_length_constrained(&self) -> bool {
        matches!(
            self,
            FieldType::String
                | FieldType::Bytes
                | FieldType::List
                | FieldType::Set
                | FieldType::FrozenSet
                | FieldType::Tuple
                | FieldType::Dict
        )
    }
}

/// Universal representation of a schema field.
///
/// Built once by the type mapper from a declaration and effectively
/// immutable thereafter; generators only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct USRField {
    /// Field name as declared.
    pub name: String,

    /// The unwrapped type classification.
    pub field_type: FieldType,

    /// Whether the field may be absent/null. Always layered on top of the
    /// unwrapped classification, never a sentinel type.
    #[serde(default)]
    pub optional: bool,

    /// Declared default value, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Name of a default-factory expression, forwarded verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_factory: Option<String>,

    /// Element type for containers, or the unwrapped type for optional
    /// fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_type: Option<Box<USRField>>,

    /// Ordered member types. Used for true unions AND for fixed-arity
    /// heterogeneous tuples, where the order is positional.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub union_types: Vec<USRField>,

    /// Ordered literal values; duplicates preserved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literal_values: Vec<Value>,

    /// Weak, name-only reference to another schema. Never an owning
    /// pointer; resolved by name at generation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_schema: Option<String>,

    /// Declared name of a user enumeration type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,

    /// Enumeration member values in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    // Validation constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_pattern: Option<String>,
    /// Standard format hint (email, uri, uuid, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_type: Option<String>,

    // Relational metadata
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub index: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub auto_now_add: bool,
    #[serde(default)]
    pub auto_now: bool,
    /// Relationship kind (one_to_many, many_to_one, many_to_many).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_populates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade: Option<String>,
    /// Many-to-many join table name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub through_table: Option<String>,

    // Generation control
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_from: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_only: Vec<String>,

    /// Target-specific configuration fragments, keyed by target id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub target_config: BTreeMap<String, BTreeMap<String, Value>>,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Additional free-form metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl USRField {
    /// Create a new field with the given name and type classification.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            optional: false,
            default: None,
            default_factory: None,
            inner_type: None,
            union_types: Vec::new(),
            literal_values: Vec::new(),
            nested_schema: None,
            enum_name: None,
            enum_values: Vec::new(),
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            regex_pattern: None,
            format_type: None,
            primary_key: false,
            unique: false,
            index: false,
            foreign_key: None,
            auto_increment: false,
            auto_now_add: false,
            auto_now: false,
            relationship: None,
            back_populates: None,
            cascade: None,
            through_table: None,
            exclude_from: Vec::new(),
            include_only: Vec::new(),
            target_config: BTreeMap::new(),
            description: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Mark as optional.
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Set the element type (containers) or unwrapped type (optional).
    pub fn with_inner_type(mut self, inner: USRField) -> Self {
        self.inner_type = Some(Box::new(inner));
        self
    }

    /// Set the ordered union/tuple member types.
    pub fn with_union_types(mut self, members: Vec<USRField>) -> Self {
        self.union_types = members;
        self
    }

    /// Set the ordered literal values.
    pub fn with_literal_values(mut self, values: Vec<Value>) -> Self {
        self.literal_values = values;
        self
    }

    /// Set the weak schema reference name.
    pub fn with_nested_schema(mut self, name: impl Into<String>) -> Self {
        self.nested_schema = Some(name.into());
        self
    }

    /// Set the enumeration name and member values.
    pub fn with_enum(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.enum_name = Some(name.into());
        self.enum_values = values;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the inclusive numeric bounds.
    pub fn with_value_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Set the length bounds.
    pub fn with_length_range(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Mark as a primary key.
    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Set the foreign-key reference.
    pub fn with_foreign_key(mut self, target: impl Into<String>) -> Self {
        self.foreign_key = Some(target.into());
        self
    }

    /// Set the relationship kind.
    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    /// Set a target-specific configuration fragment.
    pub fn with_target_config(
        mut self,
        target: impl Into<String>,
        config: BTreeMap<String, Value>,
    ) -> Self {
        self.target_config.insert(target.into(), config);
        self
    }

    /// Set the format hint (email, uri, uuid, ...).
    pub fn with_format_type(mut self, format: impl Into<String>) -> Self {
        self.format_type = Some(format.into());
        self
    }

    /// Get the configuration fragment for a target, if declared.
    pub fn target_config_for(&self, target: &str) -> Option<&BTreeMap<String, Value>> {
        self.target_config.get(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let field = USRField::new("email", FieldType::String);
        assert_eq!(field.name, "email");
        assert_eq!(field.field_type, FieldType::String);
        assert!(!field.optional);
        assert!(field.inner_type.is_none());
    }

    #[test]
    fn test_field_builder() {
        let field = USRField::new("age", FieldType::Integer)
            .with_optional(true)
            .with_value_range(Some(0.0), Some(150.0))
            .with_description("Age in years");

        assert!(field.optional);
        assert_eq!(field.min_value, Some(0.0));
        assert_eq!(field.max_value, Some(150.0));
        assert_eq!(field.description.as_deref(), Some("Age in years"));
    }

    #[test]
    fn test_field_type_numeric_like() {
        assert!(FieldType::Integer.is_numeric_like());
        assert!(FieldType::Float.is_numeric_like());
        assert!(FieldType::Decimal.is_numeric_like());
        assert!(!FieldType::String.is_numeric_like());
        assert!(!FieldType::DateTime.is_numeric_like());
    }

    #[test]
    fn test_field_type_container() {
        assert!(FieldType::List.is_container());
        assert!(FieldType::Set.is_container());
        assert!(FieldType::FrozenSet.is_container());
        assert!(!FieldType::Dict.is_container());
        assert!(!FieldType::Tuple.is_container());
    }

    #[test]
    fn test_field_type_length_constrained() {
        assert!(FieldType::String.is_length_constrained());
        assert!(FieldType::Bytes.is_length_constrained());
        assert!(FieldType::List.is_length_constrained());
        assert!(!FieldType::Integer.is_length_constrained());
        assert!(!FieldType::Boolean.is_length_constrained());
    }

    #[test]
    fn test_target_config_lookup() {
        let mut config = BTreeMap::new();
        config.insert("precision".to_string(), serde_json::json!(12));
        let field =
            USRField::new("price", FieldType::Decimal).with_target_config("avro", config);

        assert!(field.target_config_for("avro").is_some());
        assert!(field.target_config_for("pydantic").is_none());
    }
}
