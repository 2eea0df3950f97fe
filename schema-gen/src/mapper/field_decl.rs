//! Field declaration object.
//!
//! [`FieldDecl`] carries everything a declaration says about a field apart
//! from its type: defaults, constraints, relational metadata, per-target
//! configuration. Declarations arrive in more than one historical shape, so
//! [`FieldDecl::from_attributes`] performs defensive lookup with inert
//! fallbacks; the IR never depends on which shape produced it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declaration-level field attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_factory: Option<String>,

    // Constraints
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_populates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade: Option<String>,
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

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl FieldDecl {
    /// Empty declaration; every attribute inert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the default-factory expression name.
    pub fn with_default_factory(mut self, factory: impl Into<String>) -> Self {
        self.default_factory = Some(factory.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the length bounds.
    pub fn with_length_range(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Set the inclusive numeric bounds.
    pub fn with_value_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Set the regular-expression pattern.
    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex_pattern = Some(pattern.into());
        self
    }

    /// Set the format hint (email, uri, uuid, ...).
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format_type = Some(format.into());
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

    /// Attach free-form metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Build a declaration from a loose attribute map.
    ///
    /// Lookup is defensive: historical shapes spell some attributes more
    /// than one way (`regex` vs `regex_pattern`, `format` vs `format_type`),
    /// and absent or mistyped values fall back to inert defaults.
    pub fn from_attributes(attrs: &BTreeMap<String, Value>) -> Self {
        let mut decl = FieldDecl::new();

        decl.default = attrs.get("default").cloned();
        decl.default_factory = get_str(attrs, &["default_factory"]);

        decl.min_length = get_usize(attrs, &["min_length"]);
        decl.max_length = get_usize(attrs, &["max_length"]);
        decl.min_value = get_f64(attrs, &["min_value", "ge"]);
        decl.max_value = get_f64(attrs, &["max_value", "le"]);
        decl.regex_pattern = get_str(attrs, &["regex_pattern", "regex", "pattern"]);
        decl.format_type = get_str(attrs, &["format_type", "format"]);

        decl.primary_key = get_bool(attrs, &["primary_key"]);
        decl.unique = get_bool(attrs, &["unique"]);
        decl.index = get_bool(attrs, &["index"]);
        decl.foreign_key = get_str(attrs, &["foreign_key"]);
        decl.auto_increment = get_bool(attrs, &["auto_increment"]);
        decl.auto_now_add = get_bool(attrs, &["auto_now_add"]);
        decl.auto_now = get_bool(attrs, &["auto_now"]);
        decl.relationship = get_str(attrs, &["relationship"]);
        decl.back_populates = get_str(attrs, &["back_populates"]);
        decl.cascade = get_str(attrs, &["cascade"]);
        decl.through_table = get_str(attrs, &["through_table"]);

        decl.exclude_from = get_str_list(attrs, "exclude_from");
        decl.include_only = get_str_list(attrs, "include_only");

        // Per-target fragments appear either nested under "target_config"
        // or flat under the target id itself.
        if let Some(Value::Object(targets)) = attrs.get("target_config") {
            for (target, fragment) in targets {
                if let Value::Object(map) = fragment {
                    decl.target_config
                        .insert(target.clone(), map.clone().into_iter().collect());
                }
            }
        }
        for target in ["pydantic", "avro"] {
            if let Some(Value::Object(map)) = attrs.get(target) {
                decl.target_config
                    .entry(target.to_string())
                    .or_insert_with(|| map.clone().into_iter().collect());
            }
        }

        decl.description = get_str(attrs, &["description"]);
        if let Some(Value::Object(map)) = attrs.get("metadata") {
            decl.metadata = map.clone().into_iter().collect();
        }

        decl
    }
}

fn get_str(attrs: &BTreeMap<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .find_map(|v| v.as_str().map(str::to_string))
}

fn get_f64(attrs: &BTreeMap<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .find_map(Value::as_f64)
}

fn get_usize(attrs: &BTreeMap<String, Value>, keys: &[&str]) -> Option<usize> {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .find_map(Value::as_u64)
        .map(|n| n as usize)
}

fn get_bool(attrs: &BTreeMap<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .find_map(Value::as_bool)
        .unwrap_or(false)
}

fn get_str_list(attrs: &BTreeMap<String, Value>, key: &str) -> Vec<String> {
    match attrs.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let decl = FieldDecl::new()
            .with_description("User age")
            .with_value_range(Some(0.0), Some(150.0))
            .with_primary_key(true);

        assert_eq!(decl.description.as_deref(), Some("User age"));
        assert_eq!(decl.min_value, Some(0.0));
        assert!(decl.primary_key);
    }

    #[test]
    fn test_from_attributes_canonical_shape() {
        let mut attrs = BTreeMap::new();
        attrs.insert("description".to_string(), json!("Email address"));
        attrs.insert("regex_pattern".to_string(), json!("^.+@.+$"));
        attrs.insert("max_length".to_string(), json!(255));
        attrs.insert("unique".to_string(), json!(true));

        let decl = FieldDecl::from_attributes(&attrs);
        assert_eq!(decl.description.as_deref(), Some("Email address"));
        assert_eq!(decl.regex_pattern.as_deref(), Some("^.+@.+$"));
        assert_eq!(decl.max_length, Some(255));
        assert!(decl.unique);
    }

    #[test]
    fn test_from_attributes_historical_spellings() {
        let mut attrs = BTreeMap::new();
        attrs.insert("regex".to_string(), json!("^[a-z]+$"));
        attrs.insert("format".to_string(), json!("email"));
        attrs.insert("ge".to_string(), json!(1));

        let decl = FieldDecl::from_attributes(&attrs);
        assert_eq!(decl.regex_pattern.as_deref(), Some("^[a-z]+$"));
        assert_eq!(decl.format_type.as_deref(), Some("email"));
        assert_eq!(decl.min_value, Some(1.0));
    }

    #[test]
    fn test_from_attributes_mistyped_values_are_inert() {
        let mut attrs = BTreeMap::new();
        attrs.insert("max_length".to_string(), json!("not a number"));
        attrs.insert("primary_key".to_string(), json!("yes"));

        let decl = FieldDecl::from_attributes(&attrs);
        assert_eq!(decl.max_length, None);
        assert!(!decl.primary_key);
    }

    #[test]
    fn test_from_attributes_flat_target_fragment() {
        let mut attrs = BTreeMap::new();
        attrs.insert("avro".to_string(), json!({"precision": 12, "scale": 4}));

        let decl = FieldDecl::from_attributes(&attrs);
        let avro = decl.target_config.get("avro").unwrap();
        assert_eq!(avro.get("precision"), Some(&json!(12)));
    }

    #[test]
    fn test_from_attributes_nested_target_config() {
        let mut attrs = BTreeMap::new();
        attrs.insert(
            "target_config".to_string(),
            json!({"pydantic": {"frozen": true}}),
        );

        let decl = FieldDecl::from_attributes(&attrs);
        let pydantic = decl.target_config.get("pydantic").unwrap();
        assert_eq!(pydantic.get("frozen"), Some(&json!(true)));
    }
}
