//! Named schema definitions accumulated over one generation run.
//!
//! - [`model::ModelSchemaGenerator`] emits data model definitions
//! - [`handlers`] emits error definitions

pub mod handlers;
pub mod model;

use crate::schema::Schema;
use indexmap::IndexMap;
use log::debug;

/// Insert-once store of definitions, keyed by definition name
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: IndexMap<String, Schema>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.definitions.get(name)
    }

    /// Register a definition unless the name is taken.
    ///
    /// Returns `true` when the definition was added.
    pub fn insert(&mut self, name: &str, schema: Schema) -> bool {
        if self.definitions.contains_key(name) {
            debug!("Definition {} already registered", name);
            return false;
        }
        debug!("Registering definition {}", name);
        self.definitions.insert(name.to_string(), schema);
        true
    }

    /// Attach a property to an existing definition
    pub fn set_property(&mut self, definition: &str, property: &str, schema: Schema) {
        if let Some(existing) = self.definitions.get_mut(definition) {
            existing.set_property(property, schema);
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All definitions, most recently registered first
    pub fn into_definitions(self) -> IndexMap<String, Schema> {
        self.definitions.into_iter().rev().collect()
    }
}
