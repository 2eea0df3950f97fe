//! Type classification and field construction.
//!
//! [`TypeMapper`] turns a [`TypeExpr`] declaration into a [`USRField`].
//! Classification is total: every expression maps to some [`FieldType`],
//! with unknown named types landing on [`FieldType::NestedSchema`]. Nothing
//! here ever panics or returns an error.

use crate::ir::{FieldType, USRField};

use super::field_decl::FieldDecl;
use super::type_expr::{AnnotationItem, TypeExpr};

/// Maps type expressions into USR fields.
pub struct TypeMapper;

impl TypeMapper {
    /// Classify a type expression into its universal field type.
    ///
    /// An optional-shaped union (two members, one null) classifies as the
    /// non-null member: optionality is a flag on the produced field, never
    /// a type tag.
    pub fn classify(expr: &TypeExpr) -> FieldType {
        match expr {
            TypeExpr::String => FieldType::String,
            TypeExpr::Integer => FieldType::Integer,
            TypeExpr::Float => FieldType::Float,
            TypeExpr::Boolean => FieldType::Boolean,
            TypeExpr::Bytes => FieldType::Bytes,
            TypeExpr::DateTime => FieldType::DateTime,
            TypeExpr::Date => FieldType::Date,
            TypeExpr::Time => FieldType::Time,
            TypeExpr::Uuid => FieldType::Uuid,
            TypeExpr::Decimal => FieldType::Decimal,
            TypeExpr::List(_) => FieldType::List,
            TypeExpr::Set(_) => FieldType::Set,
            TypeExpr::FrozenSet(_) => FieldType::FrozenSet,
            TypeExpr::Dict => FieldType::Dict,
            TypeExpr::Tuple(elems) => {
                if is_variadic_tuple(elems) {
                    FieldType::List
                } else {
                    FieldType::Tuple
                }
            }
            TypeExpr::Union(members) => match optional_member(members) {
                Some(inner) => Self::classify(inner),
                None => FieldType::Union,
            },
            TypeExpr::Literal(_) => FieldType::Literal,
            TypeExpr::Enum { .. } => FieldType::Enum,
            TypeExpr::Annotated { base, .. } => Self::classify(base),
            // Everything else, including unrecognized named types, falls
            // through to a nested-schema reference.
            TypeExpr::ForwardRef(_)
            | TypeExpr::Named(_)
            | TypeExpr::Null
            | TypeExpr::Ellipsis => FieldType::NestedSchema,
        }
    }

    /// Build a complete USR field from a declaration.
    pub fn map_field(name: &str, expr: &TypeExpr, decl: &FieldDecl) -> USRField {
        if let TypeExpr::Annotated { base, items } = expr {
            let mut field = Self::map_field(name, base, decl);
            for item in items {
                fold_annotation(&mut field, item);
            }
            return field;
        }

        let mut field = match expr {
            TypeExpr::Union(members) => Self::map_union(name, members),
            TypeExpr::List(item) | TypeExpr::Set(item) | TypeExpr::FrozenSet(item) => {
                let mut field = USRField::new(name, Self::classify(expr));
                if let Some(item) = item {
                    field = field.with_inner_type(Self::map_field(
                        &format!("{}_item", name),
                        item,
                        &FieldDecl::new(),
                    ));
                }
                field
            }
            TypeExpr::Tuple(elems) => Self::map_tuple(name, elems),
            TypeExpr::Literal(values) => {
                USRField::new(name, FieldType::Literal).with_literal_values(values.clone())
            }
            TypeExpr::Enum {
                name: enum_name,
                members,
            } => USRField::new(name, FieldType::Enum).with_enum(
                enum_name.clone(),
                members.iter().map(|(_, value)| value.clone()).collect(),
            ),
            TypeExpr::ForwardRef(target) | TypeExpr::Named(target) => {
                USRField::new(name, FieldType::NestedSchema).with_nested_schema(target.clone())
            }
            TypeExpr::Null => {
                USRField::new(name, FieldType::NestedSchema).with_nested_schema("None")
            }
            TypeExpr::Ellipsis => {
                USRField::new(name, FieldType::NestedSchema).with_nested_schema("Ellipsis")
            }
            _ => USRField::new(name, Self::classify(expr)),
        };

        apply_decl(&mut field, decl);
        field
    }

    fn map_union(name: &str, members: &[TypeExpr]) -> USRField {
        if let Some(non_null) = optional_member(members) {
            let inner =
                Self::map_field(&format!("{}_inner", name), non_null, &FieldDecl::new());
            let mut field = USRField::new(name, inner.field_type).with_optional(true);
            // Hoisted so self-reference detection sees through optionality.
            field.nested_schema = inner.nested_schema.clone();
            field.inner_type = Some(Box::new(inner));
            return field;
        }

        let mapped = members
            .iter()
            .enumerate()
            .map(|(i, member)| {
                Self::map_field(&format!("{}_{}", name, i), member, &FieldDecl::new())
            })
            .collect();
        USRField::new(name, FieldType::Union).with_union_types(mapped)
    }

    fn map_tuple(name: &str, elems: &[TypeExpr]) -> USRField {
        if is_variadic_tuple(elems) {
            // (T, ...) is a homogeneous sequence, not a pair.
            return USRField::new(name, FieldType::List).with_inner_type(Self::map_field(
                &format!("{}_item", name),
                &elems[0],
                &FieldDecl::new(),
            ));
        }

        let mapped = elems
            .iter()
            .enumerate()
            .map(|(i, elem)| {
                Self::map_field(&format!("{}_{}", name, i), elem, &FieldDecl::new())
            })
            .collect();
        USRField::new(name, FieldType::Tuple).with_union_types(mapped)
    }
}

/// The non-null member of an optional-shaped union, if this is one.
fn optional_member(members: &[TypeExpr]) -> Option<&TypeExpr> {
    if members.len() != 2 {
        return None;
    }
    match (members[0].is_null(), members[1].is_null()) {
        (false, true) => Some(&members[0]),
        (true, false) => Some(&members[1]),
        _ => None,
    }
}

fn is_variadic_tuple(elems: &[TypeExpr]) -> bool {
    elems.len() == 2 && elems[1] == TypeExpr::Ellipsis
}

/// Fold one annotation item into a mapped field. Declaration-supplied
/// values always win; annotations only fill unset slots.
fn fold_annotation(field: &mut USRField, item: &AnnotationItem) {
    match item {
        AnnotationItem::Doc(text) => {
            if field.description.is_none() {
                field.description = Some(text.clone());
            }
        }
        AnnotationItem::Map(map) => {
            for (key, value) in map {
                field
                    .metadata
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        AnnotationItem::Constraints(hints) => {
            if field.min_value.is_none() {
                field.min_value = hints.min_value.or(hints.exclusive_min);
            }
            if field.max_value.is_none() {
                field.max_value = hints.max_value.or(hints.exclusive_max);
            }
            if field.regex_pattern.is_none() {
                field.regex_pattern = hints.pattern.clone();
            }
        }
    }
}

/// Copy every declaration attribute onto the produced field.
fn apply_decl(field: &mut USRField, decl: &FieldDecl) {
    field.default = decl.default.clone();
    field.default_factory = decl.default_factory.clone();
    field.min_length = decl.min_length;
    field.max_length = decl.max_length;
    field.min_value = decl.min_value;
    field.max_value = decl.max_value;
    field.regex_pattern = decl.regex_pattern.clone();
    field.format_type = decl.format_type.clone();
    field.primary_key = decl.primary_key;
    field.unique = decl.unique;
    field.index = decl.index;
    field.foreign_key = decl.foreign_key.clone();
    field.auto_increment = decl.auto_increment;
    field.auto_now_add = decl.auto_now_add;
    field.auto_now = decl.auto_now;
    field.relationship = decl.relationship.clone();
    field.back_populates = decl.back_populates.clone();
    field.cascade = decl.cascade.clone();
    field.through_table = decl.through_table.clone();
    field.exclude_from = decl.exclude_from.clone();
    field.include_only = decl.include_only.clone();
    field.target_config = decl.target_config.clone();
    field.description = decl.description.clone();
    field.metadata = decl.metadata.clone();
}
