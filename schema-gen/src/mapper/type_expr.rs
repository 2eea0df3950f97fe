//! Type-expression input adapter.
//!
//! [`TypeExpr`] is a small, closed tagged-variant tree describing a field's
//! declared type. It is deliberately surface-agnostic: a derive macro, a
//! config parser, or a hand-written builder can all produce it. The mapper
//! consumes it and never sees the original declaration syntax.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A declared type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    String,
    Integer,
    Float,
    Boolean,
    Bytes,
    /// The null/none type. Only meaningful as a union member.
    Null,
    DateTime,
    Date,
    Time,
    Uuid,
    Decimal,
    /// Homogeneous list, optionally parametrized.
    List(Option<Box<TypeExpr>>),
    /// Homogeneous set, optionally parametrized.
    Set(Option<Box<TypeExpr>>),
    /// Homogeneous frozen set, optionally parametrized.
    FrozenSet(Option<Box<TypeExpr>>),
    /// Tuple with positional element types. A two-element form whose second
    /// element is [`TypeExpr::Ellipsis`] means "variadic of the first".
    Tuple(Vec<TypeExpr>),
    /// Variadic marker inside a tuple.
    Ellipsis,
    Dict,
    /// Union of member types, order preserved.
    Union(Vec<TypeExpr>),
    /// One-of-these-values construct; order and duplicates preserved.
    Literal(Vec<Value>),
    /// A user enumeration type with its members in declaration order.
    Enum {
        name: String,
        members: Vec<(String, Value)>,
    },
    /// A name used before its schema declaration is complete.
    ForwardRef(String),
    /// A reference to another declared schema (or any named type).
    Named(String),
    /// A base type wrapped with auxiliary metadata items.
    Annotated {
        base: Box<TypeExpr>,
        items: Vec<AnnotationItem>,
    },
}

impl TypeExpr {
    /// `T | null`, the conventional optional spelling.
    pub fn optional(inner: TypeExpr) -> TypeExpr {
        TypeExpr::Union(vec![inner, TypeExpr::Null])
    }

    /// A parametrized list.
    pub fn list(item: TypeExpr) -> TypeExpr {
        TypeExpr::List(Some(Box::new(item)))
    }

    /// A parametrized set.
    pub fn set(item: TypeExpr) -> TypeExpr {
        TypeExpr::Set(Some(Box::new(item)))
    }

    /// A parametrized frozen set.
    pub fn frozen_set(item: TypeExpr) -> TypeExpr {
        TypeExpr::FrozenSet(Some(Box::new(item)))
    }

    /// Wrap a base type with metadata items.
    pub fn annotated(base: TypeExpr, items: Vec<AnnotationItem>) -> TypeExpr {
        TypeExpr::Annotated {
            base: Box::new(base),
            items,
        }
    }

    /// Check if this is the null/none type.
    pub fn is_null(&self) -> bool {
        matches!(self, TypeExpr::Null)
    }
}

/// One auxiliary metadata item on an annotated type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationItem {
    /// Plain documentation text.
    Doc(String),
    /// Free-form metadata map, shallow-merged into the field's metadata.
    Map(BTreeMap<String, Value>),
    /// Constraint-like attributes recognized on annotation objects.
    Constraints(ConstraintHints),
}

/// Constraint attributes carried by an annotation item.
///
/// The declaration's own constraints always win over these; an annotation
/// hint fills a constraint slot only when the declaration left it unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}
