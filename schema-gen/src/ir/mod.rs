//! Universal Schema Representation (USR).
//!
//! This module defines the backend-agnostic data structures that represent
//! a declared schema. USR nodes are built once by the type mapper, read by
//! every generator, and discarded at the end of a generation run.

pub mod field;
pub mod schema;
pub mod validate;

pub use field::{FieldType, USRField};
pub use schema::{CustomCode, EnumMember, USREnum, USRSchema};
pub use validate::{Severity, ValidationIssue};
