//! Schema IR definitions.
//!
//! This module defines the root [`USRSchema`] structure along with user
//! enumerations and opaque per-target custom-code blocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GeneratorError, Result};

use super::field::USRField;
use super::validate::ValidationIssue;

/// A single member of a user enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name as declared.
    pub name: String,
    /// Member value.
    pub value: Value,
}

impl EnumMember {
    /// Create a new enum member.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Universal representation of a user enumeration type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct USREnum {
    /// Enumeration name.
    pub name: String,
    /// Members in declaration order.
    pub members: Vec<EnumMember>,
}

impl USREnum {
    /// Create a new enumeration with the given members.
    pub fn new(name: impl Into<String>, members: Vec<EnumMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    /// Member values in declaration order.
    pub fn values(&self) -> Vec<Value> {
        self.members.iter().map(|m| m.value.clone()).collect()
    }
}

/// Opaque custom-code block for one target.
///
/// Stored and forwarded verbatim; the core never parses or validates its
/// contents. Spliced only into the base (non-variant) rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomCode {
    /// Import lines to prepend to the generated file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Raw code block (validators and the like).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_code: Option<String>,

    /// Method definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<String>,
}

impl CustomCode {
    /// Check if this block carries any content.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.raw_code.is_none() && self.methods.is_none()
    }
}

/// Universal representation of a complete schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct USRSchema {
    /// Schema name.
    pub name: String,

    /// Fields in declaration order.
    pub fields: Vec<USRField>,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// User enumerations referenced by this schema's fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<USREnum>,

    /// Named, ordered field subsets, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<(String, Vec<String>)>,

    /// Opaque per-target custom-code blocks, forwarded verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_code: BTreeMap<String, CustomCode>,

    /// Schema-level target-specific configuration.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub target_config: BTreeMap<String, BTreeMap<String, Value>>,

    /// Additional free-form metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl USRSchema {
    /// Create a new schema with the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<USRField>) -> Self {
        Self {
            name: name.into(),
            fields,
            description: None,
            enums: Vec::new(),
            variants: Vec::new(),
            custom_code: BTreeMap::new(),
            target_config: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a variant: a named, ordered subset of field names.
    pub fn with_variant(
        mut self,
        name: impl Into<String>,
        field_names: Vec<impl Into<String>>,
    ) -> Self {
        self.variants.push((
            name.into(),
            field_names.into_iter().map(|n| n.into()).collect(),
        ));
        self
    }

    /// Attach a user enumeration.
    pub fn with_enum(mut self, declared: USREnum) -> Self {
        self.enums.push(declared);
        self
    }

    /// Attach an opaque custom-code block for a target.
    pub fn with_custom_code(mut self, target: impl Into<String>, code: CustomCode) -> Self {
        self.custom_code.insert(target.into(), code);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&USRField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get all primary-key fields, in declaration order.
    pub fn get_primary_key_fields(&self) -> Vec<&USRField> {
        self.fields.iter().filter(|f| f.primary_key).collect()
    }

    /// Get all relationship fields, in declaration order.
    pub fn get_relationship_fields(&self) -> Vec<&USRField> {
        self.fields
            .iter()
            .filter(|f| f.relationship.is_some())
            .collect()
    }

    /// Declared variant names, in declaration order.
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(name, _)| name.as_str())
    }

    /// Look up the declared field-name list of a variant.
    pub fn variant_field_names(&self, variant: &str) -> Option<&[String]> {
        self.variants
            .iter()
            .find(|(name, _)| name == variant)
            .map(|(_, names)| names.as_slice())
    }

    /// Project a variant: the schema's fields, in declaration order,
    /// filtered to those named under the variant.
    ///
    /// An unknown variant name is an error, never a silent fall-back to
    /// the full field list.
    pub fn variant_fields(&self, variant: &str) -> Result<Vec<&USRField>> {
        let names = self
            .variant_field_names(variant)
            .ok_or_else(|| GeneratorError::unknown_variant(&self.name, variant))?;

        Ok(self
            .fields
            .iter()
            .filter(|f| names.iter().any(|n| n == &f.name))
            .collect())
    }

    /// Fields that recursively reference their own enclosing schema.
    ///
    /// A field qualifies if it names this schema directly, or if it is a
    /// homogeneous container whose element names this schema. This is the
    /// single source of truth for recursion detection; backends consult it
    /// and choose their own resolution primitive.
    pub fn self_referencing_fields(&self) -> Vec<&USRField> {
        self.fields
            .iter()
            .filter(|f| {
                if f.nested_schema.as_deref() == Some(self.name.as_str()) {
                    return true;
                }
                if f.field_type.is_container() {
                    if let Some(inner) = &f.inner_type {
                        return inner.nested_schema.as_deref() == Some(self.name.as_str());
                    }
                }
                false
            })
            .collect()
    }

    /// Run structural validation: every field's issues in declaration
    /// order, then one error per dangling `(variant, field)` reference in
    /// variant-then-name declaration order.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for field in &self.fields {
            issues.extend(field.validate());
        }

        for (variant, names) in &self.variants {
            for name in names {
                if self.get_field(name).is_none() {
                    issues.push(ValidationIssue::schema_error(format!(
                        "variant '{}' references unknown field '{}'",
                        variant, name
                    )));
                }
            }
        }

        issues
    }
}
