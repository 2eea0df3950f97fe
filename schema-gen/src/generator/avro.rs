//! Avro schema generator.
//!
//! Emits an Avro schema JSON collection per schema: a `_meta` provenance
//! block plus one record for the base type and one per declared variant.
//! Optional fields become null-first unions; integer width is chosen from
//! the declared value bounds.

use serde_json::{json, Map, Value};

use crate::error::{GeneratorError, Result};
use crate::ir::{FieldType, USRField, USRSchema};

use convert_case::{Case, Casing};

use super::traits::{ensure_renderable, variant_type_name, Generator, Provenance};

const I32_MAX: f64 = 2_147_483_647.0;
const U32_MAX: f64 = 4_294_967_295.0;

/// Generates Avro schema JSON from USR schemas.
#[derive(Debug, Clone, Default)]
pub struct AvroGenerator {
    timestamp_override: Option<String>,
}

impl AvroGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the provenance timestamp so repeated generation is
    /// byte-identical.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp_override = Some(timestamp.into());
        self
    }

    /// Full Avro type for a field, including the null union for optionals.
    fn avro_type(&self, field: &USRField) -> Value {
        if field.optional {
            let base = match &field.inner_type {
                Some(inner) => {
                    // Constraints and target config are declared on the
                    // outer field; the unwrapped member inherits them.
                    let mut inner = (**inner).clone();
                    if inner.min_value.is_none() {
                        inner.min_value = field.min_value;
                    }
                    if inner.max_value.is_none() {
                        inner.max_value = field.max_value;
                    }
                    if inner.target_config.is_empty() {
                        inner.target_config = field.target_config.clone();
                    }
                    self.base_type(&inner)
                }
                None => self.base_type(field),
            };
            return null_first(base);
        }
        self.base_type(field)
    }

    /// Base Avro type, without the optional null union.
    fn base_type(&self, field: &USRField) -> Value {
        match field.field_type {
            FieldType::String => json!("string"),
            FieldType::Integer => json!(integer_width(field)),
            FieldType::Float => json!("double"),
            FieldType::Boolean => json!("boolean"),
            FieldType::Bytes => json!("bytes"),
            FieldType::DateTime => json!({
                "type": "long",
                "logicalType": "timestamp-millis"
            }),
            FieldType::Date => json!({
                "type": "int",
                "logicalType": "date"
            }),
            FieldType::Time => json!({
                "type": "int",
                "logicalType": "time-millis"
            }),
            FieldType::Uuid => json!({
                "type": "string",
                "logicalType": "uuid"
            }),
            FieldType::Decimal => {
                let config = field.target_config_for("avro");
                let precision = config
                    .and_then(|c| c.get("precision"))
                    .and_then(Value::as_u64)
                    .unwrap_or(10);
                let scale = config
                    .and_then(|c| c.get("scale"))
                    .and_then(Value::as_u64)
                    .unwrap_or(2);
                json!({
                    "type": "bytes",
                    "logicalType": "decimal",
                    "precision": precision,
                    "scale": scale
                })
            }
            FieldType::List | FieldType::Set | FieldType::FrozenSet => {
                let items = match &field.inner_type {
                    Some(inner) => self.base_type(inner),
                    None => json!("string"),
                };
                json!({ "type": "array", "items": items })
            }
            FieldType::Tuple => {
                // No positional product type in Avro; the closest encoding
                // is an array whose items may be any member type.
                let members: Vec<Value> = field
                    .union_types
                    .iter()
                    .map(|member| self.base_type(member))
                    .collect();
                let items = if members.is_empty() {
                    json!("string")
                } else {
                    Value::Array(members)
                };
                json!({ "type": "array", "items": items })
            }
            FieldType::Dict => json!({ "type": "map", "values": "string" }),
            FieldType::Union => {
                if field.union_types.is_empty() {
                    json!("string")
                } else {
                    Value::Array(
                        field
                            .union_types
                            .iter()
                            .map(|member| self.base_type(member))
                            .collect(),
                    )
                }
            }
            FieldType::Literal => {
                if field.literal_values.is_empty() {
                    json!("string")
                } else {
                    json!({
                        "type": "enum",
                        "name": format!("{}Enum", field.name.to_case(Case::Pascal)),
                        "symbols": field
                            .literal_values
                            .iter()
                            .map(enum_symbol)
                            .collect::<Vec<String>>()
                    })
                }
            }
            FieldType::Enum => match &field.enum_name {
                Some(name) => json!({
                    "type": "enum",
                    "name": name,
                    "symbols": field
                        .enum_values
                        .iter()
                        .map(enum_symbol)
                        .collect::<Vec<String>>()
                }),
                None => json!("string"),
            },
            // A name reference; the reading side resolves it against the
            // records in the same file or its own registry.
            FieldType::NestedSchema => match &field.nested_schema {
                Some(name) => json!(name),
                None => json!("string"),
            },
        }
    }

    fn field_definition(&self, field: &USRField) -> Value {
        let mut def = Map::new();
        def.insert("name".to_string(), json!(field.name));
        def.insert("type".to_string(), self.avro_type(field));

        if let Some(description) = &field.description {
            def.insert("doc".to_string(), json!(description));
        }

        if let Some(default) = &field.default {
            def.insert("default".to_string(), default.clone());
        } else if field.optional {
            // A null-first union requires a null default to be readable.
            def.insert("default".to_string(), Value::Null);
        }

        if let Some(aliases @ Value::Array(_)) = field.metadata.get("avro_aliases") {
            def.insert("aliases".to_string(), aliases.clone());
        }

        Value::Object(def)
    }

    fn record(&self, name: &str, description: Option<&str>, fields: &[&USRField]) -> Value {
        let mut record = Map::new();
        record.insert("type".to_string(), json!("record"));
        record.insert("name".to_string(), json!(name));
        record.insert(
            "namespace".to_string(),
            json!(format!("com.example.{}", name.to_lowercase())),
        );
        if let Some(description) = description {
            record.insert("doc".to_string(), json!(description));
        }
        record.insert(
            "fields".to_string(),
            Value::Array(
                fields
                    .iter()
                    .map(|field| self.field_definition(field))
                    .collect(),
            ),
        );
        Value::Object(record)
    }
}

impl Generator for AvroGenerator {
    fn id(&self) -> &'static str {
        "avro"
    }

    fn name(&self) -> &'static str {
        "schema-gen Avro generator"
    }

    fn file_extension(&self) -> &'static str {
        ".avsc"
    }

    fn generate_model(&self, schema: &USRSchema, variant: Option<&str>) -> Result<String> {
        ensure_renderable(schema)?;

        let (record_name, fields): (String, Vec<&USRField>) = match variant {
            Some(variant) => (
                variant_type_name(&schema.name, variant),
                schema.variant_fields(variant)?,
            ),
            None => (schema.name.clone(), schema.fields.iter().collect()),
        };

        let record = self.record(&record_name, schema.description.as_deref(), &fields);
        serde_json::to_string_pretty(&record)
            .map_err(|e| GeneratorError::render(&schema.name, e.to_string()))
    }

    fn generate_file(&self, schema: &USRSchema) -> Result<String> {
        ensure_renderable(schema)?;

        let provenance = Provenance::new(self, schema, self.timestamp_override.as_deref());
        let mut meta = Map::new();
        meta.insert("generator".to_string(), json!(provenance.generator_name));
        meta.insert("generated_from".to_string(), json!(schema.name));
        meta.insert("generated_at".to_string(), json!(provenance.timestamp));
        meta.insert(
            "note".to_string(),
            json!("AUTO-GENERATED FILE - DO NOT EDIT MANUALLY"),
        );
        meta.insert(
            "regenerate_with".to_string(),
            json!(provenance.regenerate_command()),
        );

        let base_fields: Vec<&USRField> = schema.fields.iter().collect();
        let mut records =
            vec![self.record(&schema.name, schema.description.as_deref(), &base_fields)];

        for (variant, _) in &schema.variants {
            let fields = schema.variant_fields(variant)?;
            records.push(self.record(
                &variant_type_name(&schema.name, variant),
                schema.description.as_deref(),
                &fields,
            ));
        }

        let collection = json!({
            "_meta": Value::Object(meta),
            "schemas": records
        });
        serde_json::to_string_pretty(&collection)
            .map_err(|e| GeneratorError::render(&schema.name, e.to_string()))
    }
}

/// Integer width from the declared bounds.
///
/// A non-negative lower bound selects an unsigned-range encoding sized by
/// the upper bound; otherwise both bounds must be declared and fit i32 to
/// narrow below long.
fn integer_width(field: &USRField) -> &'static str {
    match field.min_value {
        Some(min) if min >= 0.0 => match field.max_value {
            Some(max) if max <= U32_MAX => "int",
            _ => "long",
        },
        _ => match (field.min_value, field.max_value) {
            (Some(min), Some(max)) if min >= -I32_MAX && max <= I32_MAX => "int",
            _ => "long",
        },
    }
}

/// Place (or move) "null" at the head of a union.
fn null_first(base: Value) -> Value {
    match base {
        Value::Array(mut members) => {
            if let Some(pos) = members.iter().position(|m| m == &json!("null")) {
                if pos != 0 {
                    let null = members.remove(pos);
                    members.insert(0, null);
                }
            } else {
                members.insert(0, json!("null"));
            }
            Value::Array(members)
        }
        other => json!(["null", other]),
    }
}

/// Sanitize a literal/enum value into a valid Avro symbol.
fn enum_symbol(value: &Value) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.replace([' ', '-'], "_")
}
