//! Declaration front end.
//!
//! A [`TypeExpr`] tree plus a [`FieldDecl`] declaration object go in, a
//! fully populated [`crate::ir::USRField`] comes out. Any surface syntax
//! (reflection, macros, hand-written builders) can populate the inputs.

pub mod field_decl;
pub mod type_expr;
pub mod type_mapper;

pub use field_decl::FieldDecl;
pub use type_expr::{AnnotationItem, ConstraintHints, TypeExpr};
pub use type_mapper::TypeMapper;
