//! Pydantic model generator.
//!
//! Emits Python source defining runtime-validated Pydantic models: one
//! module per schema containing enum classes, the base model with custom
//! code spliced in, every declared variant, and `model_rebuild()` finalize
//! lines for self-referential models.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::Result;
use crate::ir::{CustomCode, FieldType, USREnum, USRField, USRSchema};

use super::traits::{ensure_renderable, variant_type_name, Generator, Provenance};

/// Generates Pydantic model source from USR schemas.
#[derive(Debug, Clone, Default)]
pub struct PydanticGenerator {
    timestamp_override: Option<String>,
}

impl PydanticGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the provenance timestamp so repeated generation is
    /// byte-identical.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp_override = Some(timestamp.into());
        self
    }

    /// Python type annotation for a field, recording required imports.
    fn annotation(&self, field: &USRField, imports: &mut BTreeSet<String>) -> String {
        if field.optional {
            if let Some(inner) = &field.inner_type {
                imports.insert("typing.Optional".to_string());
                return format!("Optional[{}]", self.annotation(inner, imports));
            }
        }

        match field.field_type {
            FieldType::String => {
                if field.format_type.as_deref() == Some("email") {
                    imports.insert("pydantic.EmailStr".to_string());
                    "EmailStr".to_string()
                } else {
                    "str".to_string()
                }
            }
            FieldType::Integer => "int".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Boolean => "bool".to_string(),
            FieldType::Bytes => "bytes".to_string(),
            FieldType::DateTime => {
                imports.insert("datetime.datetime".to_string());
                "datetime".to_string()
            }
            FieldType::Date => {
                imports.insert("datetime.date".to_string());
                "date".to_string()
            }
            FieldType::Time => {
                imports.insert("datetime.time".to_string());
                "time".to_string()
            }
            FieldType::Uuid => {
                imports.insert("uuid.UUID".to_string());
                "UUID".to_string()
            }
            FieldType::Decimal => {
                imports.insert("decimal.Decimal".to_string());
                "Decimal".to_string()
            }
            FieldType::List => {
                imports.insert("typing.List".to_string());
                format!("List[{}]", self.item_annotation(field, imports))
            }
            FieldType::Set => {
                imports.insert("typing.Set".to_string());
                format!("Set[{}]", self.item_annotation(field, imports))
            }
            FieldType::FrozenSet => {
                imports.insert("typing.FrozenSet".to_string());
                format!("FrozenSet[{}]", self.item_annotation(field, imports))
            }
            FieldType::Tuple => {
                imports.insert("typing.Tuple".to_string());
                if field.union_types.is_empty() {
                    imports.insert("typing.Any".to_string());
                    "Tuple[Any, ...]".to_string()
                } else {
                    let members: Vec<String> = field
                        .union_types
                        .iter()
                        .map(|m| self.annotation(m, imports))
                        .collect();
                    format!("Tuple[{}]", members.join(", "))
                }
            }
            FieldType::Dict => {
                imports.insert("typing.Dict".to_string());
                imports.insert("typing.Any".to_string());
                "Dict[str, Any]".to_string()
            }
            FieldType::Union => {
                if field.union_types.is_empty() {
                    imports.insert("typing.Any".to_string());
                    "Any".to_string()
                } else {
                    imports.insert("typing.Union".to_string());
                    let members: Vec<String> = field
                        .union_types
                        .iter()
                        .map(|m| self.annotation(m, imports))
                        .collect();
                    format!("Union[{}]", members.join(", "))
                }
            }
            FieldType::Literal => {
                if field.literal_values.is_empty() {
                    "str".to_string()
                } else {
                    imports.insert("typing.Literal".to_string());
                    let values: Vec<String> =
                        field.literal_values.iter().map(py_value).collect();
                    format!("Literal[{}]", values.join(", "))
                }
            }
            FieldType::Enum => match &field.enum_name {
                Some(name) => name.clone(),
                None => "str".to_string(),
            },
            // Forward reference; resolved by model_rebuild() when the
            // reference is to the enclosing model itself.
            FieldType::NestedSchema => match &field.nested_schema {
                Some(name) => format!("\"{}\"", name),
                None => {
                    imports.insert("typing.Any".to_string());
                    "Any".to_string()
                }
            },
        }
    }

    fn item_annotation(&self, field: &USRField, imports: &mut BTreeSet<String>) -> String {
        match &field.inner_type {
            Some(inner) => self.annotation(inner, imports),
            None => {
                imports.insert("typing.Any".to_string());
                "Any".to_string()
            }
        }
    }

    /// One field line: `    name: Annotation = Field(...)`.
    fn field_definition(&self, field: &USRField, imports: &mut BTreeSet<String>) -> String {
        let annotation = self.annotation(field, imports);
        let mut params = Vec::new();

        if let Some(default) = &field.default {
            params.push(format!("default={}", py_value(default)));
        } else if let Some(factory) = &field.default_factory {
            params.push(format!("default_factory={}", factory));
        } else if field.optional {
            params.push("default=None".to_string());
        } else {
            params.push("...".to_string());
        }

        if let Some(min_length) = field.min_length {
            params.push(format!("min_length={}", min_length));
        }
        if let Some(max_length) = field.max_length {
            params.push(format!("max_length={}", max_length));
        }
        if let Some(min_value) = field.min_value {
            params.push(format!("ge={}", min_value));
        }
        if let Some(max_value) = field.max_value {
            params.push(format!("le={}", max_value));
        }
        if let Some(pattern) = &field.regex_pattern {
            params.push(format!("pattern=r\"{}\"", pattern));
        }
        if let Some(description) = &field.description {
            params.push(format!("description=\"{}\"", description));
        }
        if let Some(config) = field.target_config_for("pydantic") {
            for (key, value) in config {
                params.push(format!("{}={}", key, py_value(value)));
            }
        }

        imports.insert("pydantic.Field".to_string());
        format!(
            "    {}: {} = Field({})",
            field.name,
            annotation,
            params.join(", ")
        )
    }

    fn render_enum(&self, declared: &USREnum) -> String {
        let mut lines = vec![format!("class {}(Enum):", declared.name)];
        if declared.members.is_empty() {
            lines.push("    pass".to_string());
        }
        for member in &declared.members {
            lines.push(format!("    {} = {}", member.name, py_value(&member.value)));
        }
        lines.join("\n")
    }

    fn render_model(
        &self,
        model_name: &str,
        description: Option<&str>,
        field_defs: &[String],
        needs_config: bool,
        custom_code: Option<&CustomCode>,
    ) -> String {
        let mut lines = vec![format!("class {}(BaseModel):", model_name)];

        if let Some(description) = description {
            lines.push(format!("    \"\"\"{}\"\"\"", description));
        }

        lines.extend(field_defs.iter().cloned());

        if let Some(code) = custom_code {
            if let Some(raw_code) = &code.raw_code {
                lines.push(String::new());
                lines.push("    # Custom validators".to_string());
                lines.extend(indent_block(raw_code));
            }
            if let Some(methods) = &code.methods {
                lines.push(String::new());
                lines.push("    # Custom methods".to_string());
                lines.extend(indent_block(methods));
            }
        }

        if needs_config {
            lines.push(String::new());
            lines.push("    class Config:".to_string());
            lines.push("        from_attributes = True".to_string());
        }

        if lines.len() == 1 {
            lines.push("    pass".to_string());
        }

        lines.join("\n")
    }

    fn render_imports(&self, imports: &BTreeSet<String>, custom: &[String]) -> Vec<String> {
        let mut lines = Vec::new();

        let mut pydantic_names = vec!["BaseModel"];
        if imports.contains("pydantic.Field") {
            pydantic_names.push("Field");
        }
        if imports.contains("pydantic.EmailStr") {
            pydantic_names.push("EmailStr");
        }
        lines.push(format!("from pydantic import {}", pydantic_names.join(", ")));

        let typing_names: Vec<&str> = imports
            .iter()
            .filter_map(|i| i.strip_prefix("typing."))
            .collect();
        if !typing_names.is_empty() {
            lines.push(format!("from typing import {}", typing_names.join(", ")));
        }

        let datetime_names: Vec<&str> = imports
            .iter()
            .filter_map(|i| i.strip_prefix("datetime."))
            .collect();
        if !datetime_names.is_empty() {
            lines.push(format!("from datetime import {}", datetime_names.join(", ")));
        }

        if imports.contains("decimal.Decimal") {
            lines.push("from decimal import Decimal".to_string());
        }
        if imports.contains("enum.Enum") {
            lines.push("from enum import Enum".to_string());
        }
        if imports.contains("uuid.UUID") {
            lines.push("from uuid import UUID".to_string());
        }

        lines.extend(custom.iter().cloned());
        lines
    }

    fn render_header(&self, schema: &USRSchema) -> Vec<String> {
        let provenance = Provenance::new(self, schema, self.timestamp_override.as_deref());
        let mut lines = vec!["\"\"\"".to_string()];
        lines.extend(provenance.lines());
        lines.push("\"\"\"".to_string());
        lines
    }
}

impl Generator for PydanticGenerator {
    fn id(&self) -> &'static str {
        "pydantic"
    }

    fn name(&self) -> &'static str {
        "schema-gen Pydantic generator"
    }

    fn file_extension(&self) -> &'static str {
        ".py"
    }

    fn generates_index_file(&self) -> bool {
        true
    }

    fn schema_filename(&self, schema: &USRSchema) -> String {
        format!("{}_models.py", schema.name.to_lowercase())
    }

    fn generate_index(&self, schemas: &[&USRSchema]) -> Option<String> {
        let mut lines = vec!["\"\"\"Generated Pydantic models\"\"\"".to_string(), String::new()];

        for schema in schemas {
            let mut classes = vec![schema.name.clone()];
            classes.extend(
                schema
                    .variant_names()
                    .map(|v| variant_type_name(&schema.name, v)),
            );
            lines.push(format!(
                "from .{}_models import {}",
                schema.name.to_lowercase(),
                classes.join(", ")
            ));
        }

        lines.push(String::new());
        lines.push("__all__ = [".to_string());
        for schema in schemas {
            let mut classes = vec![schema.name.clone()];
            classes.extend(
                schema
                    .variant_names()
                    .map(|v| variant_type_name(&schema.name, v)),
            );
            let quoted: Vec<String> = classes.iter().map(|c| format!("\"{}\"", c)).collect();
            lines.push(format!("    {},", quoted.join(", ")));
        }
        lines.push("]".to_string());
        lines.push(String::new());

        Some(lines.join("\n"))
    }

    fn generate_model(&self, schema: &USRSchema, variant: Option<&str>) -> Result<String> {
        ensure_renderable(schema)?;

        let (model_name, fields): (String, Vec<&USRField>) = match variant {
            Some(variant) => (
                variant_type_name(&schema.name, variant),
                schema.variant_fields(variant)?,
            ),
            None => (schema.name.clone(), schema.fields.iter().collect()),
        };

        let mut imports = BTreeSet::new();
        let field_defs: Vec<String> = fields
            .iter()
            .map(|field| self.field_definition(field, &mut imports))
            .collect();
        let needs_config = fields.iter().any(|f| f.relationship.is_some());

        let mut lines = self.render_header(schema);
        lines.push(String::new());
        lines.extend(self.render_imports(&imports, &[]));
        lines.push(String::new());
        lines.push(String::new());
        lines.push(self.render_model(
            &model_name,
            schema.description.as_deref(),
            &field_defs,
            needs_config,
            None,
        ));
        lines.push(String::new());

        Ok(lines.join("\n"))
    }

    fn generate_file(&self, schema: &USRSchema) -> Result<String> {
        ensure_renderable(schema)?;

        let mut imports = BTreeSet::new();
        let custom_code = schema.custom_code.get("pydantic");
        let custom_imports = custom_code.map(|c| c.imports.clone()).unwrap_or_default();

        let mut blocks = Vec::new();

        if !schema.enums.is_empty() {
            imports.insert("enum.Enum".to_string());
            for declared in &schema.enums {
                blocks.push(self.render_enum(declared));
            }
        }

        // Base model carries the custom code; variants never do.
        let base_defs: Vec<String> = schema
            .fields
            .iter()
            .map(|field| self.field_definition(field, &mut imports))
            .collect();
        let base_config = schema.fields.iter().any(|f| f.relationship.is_some());
        blocks.push(self.render_model(
            &schema.name,
            schema.description.as_deref(),
            &base_defs,
            base_config,
            custom_code,
        ));

        let self_ref_names: BTreeSet<&str> = schema
            .self_referencing_fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        let mut rebuild_names = Vec::new();
        if !self_ref_names.is_empty() {
            rebuild_names.push(schema.name.clone());
        }

        for (variant, _) in &schema.variants {
            let fields = schema.variant_fields(variant)?;
            let defs: Vec<String> = fields
                .iter()
                .map(|field| self.field_definition(field, &mut imports))
                .collect();
            let needs_config = fields.iter().any(|f| f.relationship.is_some());
            let variant_name = variant_type_name(&schema.name, variant);

            if fields.iter().any(|f| self_ref_names.contains(f.name.as_str())) {
                rebuild_names.push(variant_name.clone());
            }

            blocks.push(self.render_model(
                &variant_name,
                schema.description.as_deref(),
                &defs,
                needs_config,
                None,
            ));
        }

        let mut lines = self.render_header(schema);
        lines.push(String::new());
        lines.extend(self.render_imports(&imports, &custom_imports));
        lines.push(String::new());
        lines.push(String::new());
        lines.push(blocks.join("\n\n\n"));

        if !rebuild_names.is_empty() {
            lines.push(String::new());
            lines.push(String::new());
            for name in rebuild_names {
                lines.push(format!("{}.model_rebuild()", name));
            }
        }

        lines.push(String::new());
        Ok(lines.join("\n"))
    }
}

/// Render a JSON value as a Python literal.
fn py_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

/// Normalize a custom-code block to class-body indentation. Lines already
/// indented are kept as-is.
fn indent_block(code: &str) -> Vec<String> {
    code.trim()
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else if line.starts_with("    ") {
                line.to_string()
            } else {
                format!("    {}", line)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::EnumMember;
    use serde_json::json;

    const TS: &str = "2026-01-01 00:00:00 UTC";

    fn generator() -> PydanticGenerator {
        PydanticGenerator::new().with_timestamp(TS)
    }

    fn user_schema() -> USRSchema {
        USRSchema::new(
            "User",
            vec![
                USRField::new("id", FieldType::Integer).with_primary_key(true),
                USRField::new("email", FieldType::String).with_format_type("email"),
                USRField::new("name", FieldType::String)
                    .with_length_range(Some(1), Some(100)),
                USRField::new("age", FieldType::Integer)
                    .with_optional(true)
                    .with_inner_type(USRField::new("age_inner", FieldType::Integer)),
            ],
        )
        .with_variant("create", vec!["email", "name"])
    }

    #[test]
    fn test_header_contract() {
        let output = generator().generate_file(&user_schema()).unwrap();
        assert!(output.starts_with("\"\"\"\nAUTO-GENERATED FILE - DO NOT EDIT MANUALLY"));
        assert!(output.contains("Generated from: User"));
        assert!(output.contains(&format!("Generated at: {}", TS)));
        assert!(output.contains("Generator: schema-gen Pydantic generator"));
        assert!(output.contains("    schema-gen generate --target pydantic"));
        assert!(output.contains("Changes to this file will be overwritten."));
    }

    #[test]
    fn test_optional_field_rendering() {
        let output = generator().generate_file(&user_schema()).unwrap();
        assert!(output.contains("age: Optional[int] = Field(default=None)"));
    }

    #[test]
    fn test_email_format_uses_emailstr() {
        let output = generator().generate_file(&user_schema()).unwrap();
        assert!(output.contains("from pydantic import BaseModel, Field, EmailStr"));
        assert!(output.contains("email: EmailStr"));
    }

    #[test]
    fn test_length_constraints() {
        let output = generator().generate_file(&user_schema()).unwrap();
        assert!(output.contains("min_length=1"));
        assert!(output.contains("max_length=100"));
    }

    #[test]
    fn test_variant_class_and_projection() {
        let output = generator().generate_file(&user_schema()).unwrap();
        assert!(output.contains("class UserCreate(BaseModel):"));
        // The variant omits id and age.
        let variant_block = output.split("class UserCreate").nth(1).unwrap();
        assert!(!variant_block.contains("    id:"));
        assert!(!variant_block.contains("    age:"));
    }

    #[test]
    fn test_unknown_variant_errors() {
        let err = generator()
            .generate_model(&user_schema(), Some("missing"))
            .unwrap_err();
        assert_eq!(
            err,
            crate::error::GeneratorError::unknown_variant("User", "missing")
        );
    }

    #[test]
    fn test_literal_annotation() {
        let schema = USRSchema::new(
            "Task",
            vec![USRField::new("status", FieldType::Literal)
                .with_literal_values(vec![json!("open"), json!("closed")])],
        );
        let output = generator().generate_file(&schema).unwrap();
        assert!(output.contains("status: Literal[\"open\", \"closed\"]"));
        assert!(output.contains("from typing import Literal"));
    }

    #[test]
    fn test_enum_class_emitted_before_models() {
        let schema = USRSchema::new(
            "Task",
            vec![USRField::new("color", FieldType::Enum)
                .with_enum("Color", vec![json!("red"), json!("green")])],
        )
        .with_enum(USREnum::new(
            "Color",
            vec![
                EnumMember::new("RED", json!("red")),
                EnumMember::new("GREEN", json!("green")),
            ],
        ));

        let output = generator().generate_file(&schema).unwrap();
        assert!(output.contains("from enum import Enum"));
        assert!(output.contains("class Color(Enum):\n    RED = \"red\"\n    GREEN = \"green\""));
        let enum_pos = output.find("class Color(Enum):").unwrap();
        let model_pos = output.find("class Task(BaseModel):").unwrap();
        assert!(enum_pos < model_pos);
        assert!(output.contains("color: Color"));
    }

    #[test]
    fn test_custom_code_spliced_into_base_only() {
        let schema = user_schema().with_custom_code(
            "pydantic",
            CustomCode {
                imports: vec!["from pydantic import field_validator".to_string()],
                raw_code: Some(
                    "@field_validator(\"email\")\ndef check_email(cls, v):\n    return v"
                        .to_string(),
                ),
                methods: None,
            },
        );

        let output = generator().generate_file(&schema).unwrap();
        assert!(output.contains("from pydantic import field_validator"));
        assert!(output.contains("    # Custom validators"));
        assert!(output.contains("    @field_validator(\"email\")"));

        // Only the base model carries the custom code.
        let variant_block = output.split("class UserCreate").nth(1).unwrap();
        assert!(!variant_block.contains("Custom validators"));
    }

    #[test]
    fn test_self_referential_schema_gets_rebuild() {
        let schema = USRSchema::new(
            "TreeNode",
            vec![
                USRField::new("value", FieldType::String),
                USRField::new("children", FieldType::List).with_inner_type(
                    USRField::new("children_item", FieldType::NestedSchema)
                        .with_nested_schema("TreeNode"),
                ),
            ],
        )
        .with_variant("slim", vec!["value"])
        .with_variant("full", vec!["value", "children"]);

        let output = generator().generate_file(&schema).unwrap();
        assert!(output.contains("children: List[\"TreeNode\"]"));
        assert!(output.contains("TreeNode.model_rebuild()"));
        // Only the variant that kept the self-referencing field rebuilds.
        assert!(output.contains("TreeNodeFull.model_rebuild()"));
        assert!(!output.contains("TreeNodeSlim.model_rebuild()"));
    }

    #[test]
    fn test_relationship_adds_config() {
        let schema = USRSchema::new(
            "Post",
            vec![USRField::new("author", FieldType::NestedSchema)
                .with_nested_schema("User")
                .with_relationship("many_to_one")],
        );
        let output = generator().generate_file(&schema).unwrap();
        assert!(output.contains("    class Config:\n        from_attributes = True"));
    }

    #[test]
    fn test_target_config_params_forwarded() {
        let mut config = std::collections::BTreeMap::new();
        config.insert("alias".to_string(), json!("userName"));
        let schema = USRSchema::new(
            "User",
            vec![USRField::new("name", FieldType::String).with_target_config("pydantic", config)],
        );
        let output = generator().generate_file(&schema).unwrap();
        assert!(output.contains("alias=\"userName\""));
    }

    #[test]
    fn test_index_file_contents() {
        let user = user_schema();
        let task = USRSchema::new("Task", vec![USRField::new("id", FieldType::Integer)]);
        let schemas = vec![&user, &task];

        let index = generator().generate_index(&schemas).unwrap();
        assert!(index.starts_with("\"\"\"Generated Pydantic models\"\"\""));
        assert!(index.contains("from .user_models import User, UserCreate"));
        assert!(index.contains("from .task_models import Task"));
        assert!(index.contains("    \"User\", \"UserCreate\","));
        assert!(index.contains("__all__ = ["));
    }

    #[test]
    fn test_generation_is_idempotent_with_fixed_timestamp() {
        let schema = user_schema();
        let first = generator().generate_file(&schema).unwrap();
        let second = generator().generate_file(&schema).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_filename_and_metadata() {
        let gen = generator();
        assert_eq!(gen.schema_filename(&user_schema()), "user_models.py");
        assert_eq!(gen.file_extension(), ".py");
        assert!(gen.generates_index_file());
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let schema = USRSchema::new(
            "Bad",
            vec![USRField::new("status", FieldType::Enum).with_enum("Status", vec![])],
        );
        let err = generator().generate_file(&schema).unwrap_err();
        assert!(matches!(
            err,
            crate::error::GeneratorError::InvalidSchema { .. }
        ));
    }
}
