//! Generator trait definition and shared algorithms.
//!
//! This module defines the [`Generator`] trait that all backends implement,
//! plus the pieces every backend must agree on: variant class naming, the
//! validation render gate, and the provenance header of generated files.

use std::collections::BTreeMap;

use chrono::Utc;
use convert_case::{Case, Casing};

use crate::error::{GeneratorError, Result};
use crate::ir::{Severity, USRSchema};

/// Trait for schema generators.
///
/// Implement this trait to add support for a new target format. Each
/// generator transforms USR schemas into target source text; file-structure
/// knowledge (filenames, index files, extra files) lives here too so the
/// orchestrating layer stays target-agnostic.
pub trait Generator {
    /// Unique identifier for this generator, used in regeneration commands
    /// (e.g. "pydantic", "avro").
    fn id(&self) -> &'static str;

    /// Human-readable generator name, used in provenance headers.
    fn name(&self) -> &'static str;

    /// File extension for generated files, including the leading dot.
    fn file_extension(&self) -> &'static str;

    /// Whether this generator produces an index/init file.
    fn generates_index_file(&self) -> bool {
        false
    }

    /// Output filename for a schema. Default: lowercase name + extension.
    fn schema_filename(&self, schema: &USRSchema) -> String {
        format!("{}{}", schema.name.to_lowercase(), self.file_extension())
    }

    /// Content of the index/init file, or `None` when the target has none.
    fn generate_index(&self, _schemas: &[&USRSchema]) -> Option<String> {
        None
    }

    /// Additional files beyond per-schema files and the index, keyed by
    /// relative filename.
    fn extra_files(&self, _schemas: &[&USRSchema]) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Generate a single model: the base type when `variant` is `None`,
    /// otherwise the named variant's projection.
    fn generate_model(&self, schema: &USRSchema, variant: Option<&str>) -> Result<String>;

    /// Generate the complete file for a schema: provenance header, base
    /// type, then every declared variant in declaration order.
    fn generate_file(&self, schema: &USRSchema) -> Result<String>;
}

/// Class/record name for a variant: schema name + PascalCase variant name.
///
/// Every backend must produce the same name for the same variant, or
/// cross-target references break.
pub fn variant_type_name(schema_name: &str, variant: &str) -> String {
    format!("{}{}", schema_name, variant.to_case(Case::Pascal))
}

/// Render gate: refuse to render a schema that carries error-level
/// validation issues.
pub fn ensure_renderable(schema: &USRSchema) -> Result<()> {
    let errors: Vec<String> = schema
        .validate()
        .into_iter()
        .filter(|issue| issue.severity == Severity::Error)
        .map(|issue| issue.message)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(GeneratorError::InvalidSchema {
            schema: schema.name.clone(),
            details: errors.join("; "),
        })
    }
}

/// Provenance header of a generated artifact.
///
/// Carries generator identity, source schema, generation timestamp, the
/// exact regeneration command, and the do-not-edit notice. Backends wrap
/// [`Provenance::lines`] in their own comment syntax.
#[derive(Debug, Clone)]
pub struct Provenance {
    pub generator_name: String,
    pub target_id: String,
    pub schema_name: String,
    pub timestamp: String,
}

impl Provenance {
    /// Build provenance for one generated file. A `timestamp_override`
    /// pins the timestamp so regeneration is byte-identical in tests.
    pub fn new(
        generator: &dyn Generator,
        schema: &USRSchema,
        timestamp_override: Option<&str>,
    ) -> Self {
        Self {
            generator_name: generator.name().to_string(),
            target_id: generator.id().to_string(),
            schema_name: schema.name.clone(),
            timestamp: match timestamp_override {
                Some(ts) => ts.to_string(),
                None => Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            },
        }
    }

    /// The exact command that regenerates this file.
    pub fn regenerate_command(&self) -> String {
        format!("schema-gen generate --target {}", self.target_id)
    }

    /// Header lines, without comment markers.
    pub fn lines(&self) -> Vec<String> {
        vec![
            "AUTO-GENERATED FILE - DO NOT EDIT MANUALLY".to_string(),
            format!("Generated from: {}", self.schema_name),
            format!("Generated at: {}", self.timestamp),
            format!("Generator: {}", self.generator_name),
            String::new(),
            "To regenerate this file, run:".to_string(),
            format!("    {}", self.regenerate_command()),
            String::new(),
            "Changes to this file will be overwritten.".to_string(),
        ]
    }
}
