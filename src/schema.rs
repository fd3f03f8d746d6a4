//! JSON-Schema-shaped values shared by definitions, parameters and responses.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix of every definition reference in a Swagger 2.0 document
pub const DEFINITIONS_REF_PREFIX: &str = "#/definitions/";

/// Swagger 2.0 Schema object (the subset this generator emits)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a named definition
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g. "float", "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Properties for object types, in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Allowed values, kept verbatim
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl Schema {
    /// Create a schema with only a type
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    /// Create an empty object schema
    pub fn object() -> Self {
        Self::of_type("object")
    }

    /// Create a `$ref` to a named definition
    pub fn reference_to(definition: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", DEFINITIONS_REF_PREFIX, definition)),
            ..Default::default()
        }
    }

    /// Create an array schema around `items`
    pub fn array_of(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_example(mut self, example: serde_json::Value) -> Self {
        self.example = Some(example);
        self
    }

    /// Whether this schema has the given type
    pub fn is_type(&self, schema_type: &str) -> bool {
        self.schema_type.as_deref() == Some(schema_type)
    }

    /// Definition named by this schema's `$ref`, or by its items' `$ref`
    pub fn referenced_definition(&self) -> Option<&str> {
        match &self.reference {
            Some(reference) => reference.strip_prefix(DEFINITIONS_REF_PREFIX),
            None => self.items.as_deref().and_then(Schema::referenced_definition),
        }
    }

    /// Whether properties or items are attached
    pub fn has_children(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty()) || self.items.is_some()
    }

    /// Set a property, replacing any previous schema under that name
    pub fn set_property(&mut self, name: &str, schema: Schema) {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), schema);
    }

    /// Add a name to the required list, keeping it free of duplicates
    pub fn mark_required(&mut self, name: &str) {
        let required = self.required.get_or_insert_with(Vec::new);
        if !required.iter().any(|r| r == name) {
            required.push(name.to_string());
        }
    }
}
