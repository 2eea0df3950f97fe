//! Structural validation over the USR.
//!
//! Validation is pure and explicit: it is never run automatically at
//! construction, and the validator itself never raises. Issues are
//! advisory metadata; only the orchestrator decides what is fatal. By
//! convention, unresolved variant references are build-breaking while
//! field-level checks are not.

use serde::{Deserialize, Serialize};

use super::field::USRField;

/// Issue severity. Advisory metadata, not a control-flow signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single structural-consistency finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue severity.
    pub severity: Severity,

    /// Name of the offending field, when field-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    /// Human-readable description of the finding.
    pub message: String,
}

impl ValidationIssue {
    /// Create an error-level issue for a field.
    pub fn error(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field_name: Some(field_name.into()),
            message: message.into(),
        }
    }

    /// Create a warning-level issue for a field.
    pub fn warning(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field_name: Some(field_name.into()),
            message: message.into(),
        }
    }

    /// Create an info-level issue for a field.
    pub fn info(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            field_name: Some(field_name.into()),
            message: message.into(),
        }
    }

    /// Create a schema-scoped issue with no field name.
    pub fn schema_error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field_name: None,
            message: message.into(),
        }
    }
}

impl USRField {
    /// Run every field-level structural check independently, with no
    /// short-circuiting, and return the collected issues.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.primary_key && self.optional {
            issues.push(ValidationIssue::warning(
                &self.name,
                format!("primary key field '{}' is optional", self.name),
            ));
        }

        if self.field_type.is_container() && self.inner_type.is_none() {
            issues.push(ValidationIssue::warning(
                &self.name,
                format!("container field '{}' has no element type", self.name),
            ));
        }

        if (self.min_value.is_some() || self.max_value.is_some())
            && !self.field_type.is_numeric_like()
        {
            issues.push(ValidationIssue::warning(
                &self.name,
                format!(
                    "value range declared on non-numeric field '{}'",
                    self.name
                ),
            ));
        }

        if (self.min_length.is_some() || self.max_length.is_some())
            && !self.field_type.is_length_constrained()
        {
            issues.push(ValidationIssue::warning(
                &self.name,
                format!(
                    "length constraint declared on non-sized field '{}'",
                    self.name
                ),
            ));
        }

        if self.enum_name.is_some() && self.enum_values.is_empty() {
            issues.push(ValidationIssue::error(
                &self.name,
                format!(
                    "enum '{}' on field '{}' declared with no members",
                    self.enum_name.as_deref().unwrap_or_default(),
                    self.name
                ),
            ));
        }

        if self.foreign_key.is_some() && self.relationship.is_none() {
            issues.push(ValidationIssue::info(
                &self.name,
                format!(
                    "field '{}' has a foreign key but no relationship kind",
                    self.name
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::field::FieldType;

    #[test]
    fn test_clean_field_has_no_issues() {
        let field = USRField::new("name", FieldType::String);
        assert!(field.validate().is_empty());
    }

    #[test]
    fn test_optional_primary_key_warns() {
        let field = USRField::new("id", FieldType::Integer)
            .with_primary_key(true)
            .with_optional(true);

        let issues = field.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].message.contains("primary key"));
    }

    #[test]
    fn test_container_without_inner_type_warns() {
        let field = USRField::new("tags", FieldType::List);
        let issues = field.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_value_range_on_string_warns() {
        let field =
            USRField::new("name", FieldType::String).with_value_range(Some(1.0), None);
        let issues = field.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("value range"));
    }

    #[test]
    fn test_length_on_integer_warns() {
        let field =
            USRField::new("count", FieldType::Integer).with_length_range(None, Some(10));
        let issues = field.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("length constraint"));
    }

    #[test]
    fn test_empty_enum_is_error() {
        let field = USRField::new("status", FieldType::Enum).with_enum("Status", vec![]);
        let issues = field.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_foreign_key_without_relationship_is_info() {
        let field =
            USRField::new("owner_id", FieldType::Integer).with_foreign_key("users.id");
        let issues = field.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Info);
    }

    #[test]
    fn test_checks_do_not_short_circuit() {
        // Optional primary key AND a length constraint on an integer.
        let field = USRField::new("id", FieldType::Integer)
            .with_primary_key(true)
            .with_optional(true)
            .with_length_range(Some(1), None);

        let issues = field.validate();
        assert_eq!(issues.len(), 2);
    }
}
