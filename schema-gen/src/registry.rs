//! Externally owned schema registry.
//!
//! The registry is a plain, insertion-ordered collection with a
//! populate/drain lifecycle: callers register schemas, hand them (or
//! slices of them) to generators, and drain when the run is over. The
//! core never reaches into a registry implicitly, and no dependency
//! ordering is computed: schema references are weak names resolved by
//! each target's own reader.

use std::collections::HashMap;

use crate::ir::USRSchema;

/// Insertion-ordered collection of registered schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    order: Vec<String>,
    schemas: HashMap<String, USRSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema. Re-registering a name replaces the schema but
    /// keeps its original position.
    pub fn register(&mut self, schema: USRSchema) {
        if !self.schemas.contains_key(&schema.name) {
            self.order.push(schema.name.clone());
        }
        self.schemas.insert(schema.name.clone(), schema);
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&USRSchema> {
        self.schemas.get(name)
    }

    /// Check whether a schema is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered schemas in registration order.
    pub fn schemas(&self) -> Vec<&USRSchema> {
        self.order
            .iter()
            .filter_map(|name| self.schemas.get(name))
            .collect()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Remove and return all schemas in registration order, leaving the
    /// registry empty.
    pub fn drain(&mut self) -> Vec<USRSchema> {
        let mut drained = Vec::with_capacity(self.order.len());
        for name in self.order.drain(..) {
            if let Some(schema) = self.schemas.remove(&name) {
                drained.push(schema);
            }
        }
        drained
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ir::{FieldType, USRField};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    proptest! {
        #[test]
        fn registration_order_is_stable(names in prop::collection::vec("[A-Z][a-z]{1,8}", 1..12)) {
            let mut registry = SchemaRegistry::new();
            let mut seen = BTreeSet::new();
            let mut expected = Vec::new();
            for name in &names {
                if seen.insert(name.clone()) {
                    expected.push(name.clone());
                }
                registry.register(USRSchema::new(
                    name.clone(),
                    vec![USRField::new("id", FieldType::Integer)],
                ));
            }

            let got: Vec<_> = registry.names().map(str::to_string).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
