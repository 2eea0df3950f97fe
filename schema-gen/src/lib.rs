//! # schema-gen
//!
//! Declare-once, compile-to-many schema compiler core.
//!
//! A schema is declared once as a [`mapper::TypeExpr`] tree plus
//! [`mapper::FieldDecl`] attributes, normalized by the
//! [`mapper::TypeMapper`] into the Universal Schema Representation
//! ([`ir::USRSchema`]), validated structurally, and rendered by target
//! backends implementing the [`generator::Generator`] contract.
//!
//! Two backends ship with the core: [`generator::PydanticGenerator`]
//! (runtime-validated Python object models) and
//! [`generator::AvroGenerator`] (Avro schema JSON). The core performs no
//! I/O; every backend is a pure, synchronous text transformation.
//!
//! ```
//! use schema_gen::generator::{Generator, PydanticGenerator};
//! use schema_gen::ir::USRSchema;
//! use schema_gen::mapper::{FieldDecl, TypeExpr, TypeMapper};
//!
//! let email = TypeMapper::map_field(
//!     "email",
//!     &TypeExpr::String,
//!     &FieldDecl::new().with_format("email"),
//! );
//! let schema = USRSchema::new("User", vec![email]);
//!
//! let source = PydanticGenerator::new().generate_file(&schema).unwrap();
//! assert!(source.contains("class User(BaseModel):"));
//! ```

pub mod error;
pub mod generator;
pub mod ir;
pub mod mapper;
pub mod registry;

pub use error::{GeneratorError, Result};
pub use generator::{AvroGenerator, Generator, PydanticGenerator};
pub use ir::{
    CustomCode, EnumMember, FieldType, Severity, USREnum, USRField, USRSchema, ValidationIssue,
};
pub use mapper::{FieldDecl, TypeExpr, TypeMapper};
pub use registry::SchemaRegistry;
