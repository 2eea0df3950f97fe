//! Target backends.
//!
//! The [`Generator`] trait is the contract every backend implements; the
//! shared algorithms (variant naming, render gating, provenance headers)
//! live in [`traits`] so backends cannot drift apart on them.

pub mod avro;
pub mod pydantic;
pub mod traits;

pub use avro::AvroGenerator;
pub use pydantic::PydanticGenerator;
pub use traits::{ensure_renderable, variant_type_name, Generator, Provenance};
