use super::handlers::generate_error_definitions;
use super::DefinitionRegistry;
use crate::config::VersionConfig;
use crate::context::RouteContext;
use crate::error::{Error, Result};
use crate::metadata::{Cardinality, Cast, DataModelDescriptor, HttpMethod, ModelCatalog};
use crate::schema::Schema;
use indexmap::IndexMap;
use log::debug;

/// Methods a route may expose for its model to be documented
const MODEL_METHODS: [HttpMethod; 2] = [HttpMethod::Get, HttpMethod::Post];

/// Generates definitions for a route's model, its related models and its
/// error responses.
pub struct ModelSchemaGenerator<'a, C: ?Sized> {
    catalog: &'a C,
    config: &'a VersionConfig,
}

impl<'a, C> ModelSchemaGenerator<'a, C>
where
    C: ModelCatalog + ?Sized,
{
    pub fn new(catalog: &'a C, config: &'a VersionConfig) -> Self {
        Self { catalog, config }
    }

    pub fn generate(&self, ctx: &RouteContext<'_>, registry: &mut DefinitionRegistry) -> Result<()> {
        if !allows_model_definitions(ctx) {
            debug!("Route {} exposes methods outside get/post, skipping model definitions", ctx.path);
        } else if let Some(model) = &ctx.model {
            self.emit(model, registry);
            if self.config.parse_relationships {
                self.generate_relations(model, registry)?;
            }
        }

        generate_error_definitions(ctx, self.config, registry);
        Ok(())
    }

    /// Register `model` unless present; returns whether it was added
    fn emit(&self, model: &DataModelDescriptor, registry: &mut DefinitionRegistry) -> bool {
        let name = model.base_name();
        if registry.contains(name) {
            return false;
        }
        registry.insert(name, self.model_schema(model))
    }

    fn generate_relations(&self, model: &DataModelDescriptor, registry: &mut DefinitionRegistry) -> Result<()> {
        for relation in &model.relations {
            let related = self
                .catalog
                .model(&relation.related)?
                .ok_or_else(|| Error::NotAModel {
                    model: relation.related.clone(),
                })?;

            let reference = Schema::reference_to(related.base_name());
            let property = match relation.cardinality {
                Cardinality::One => reference,
                Cardinality::Many => Schema::array_of(reference),
            };
            registry.set_property(model.base_name(), &relation.accessor, property);

            // Only new definitions are walked, which breaks relation cycles
            if self.emit(&related, registry) {
                self.generate_relations(&related, registry)?;
            }
        }
        Ok(())
    }

    fn model_schema(&self, model: &DataModelDescriptor) -> Schema {
        let example = if self.config.generate_examples {
            self.example(model)
        } else {
            None
        };

        let mut schema = Schema::object();
        schema.properties = Some(Default::default());
        for field in model.visible_fields() {
            let mut property = column_schema(model, field);
            if let Some(value) = example.as_ref().and_then(|e| e.get(field)) {
                if let Some(rendered) = render_example(value) {
                    property.example = Some(serde_json::Value::String(rendered));
                }
            }
            schema.set_property(field, property);
        }
        schema
    }

    fn example(&self, model: &DataModelDescriptor) -> Option<IndexMap<String, serde_json::Value>> {
        match self.catalog.example(model) {
            Ok(example) => Some(example),
            Err(e) => {
                debug!("No example instance for {}: {}", model.name, e);
                None
            }
        }
    }
}

/// Every documented method must be one that returns the model
pub fn allows_model_definitions(ctx: &RouteContext<'_>) -> bool {
    ctx.route
        .valid_methods()
        .iter()
        .all(|method| MODEL_METHODS.contains(method))
}

/// Schema of one model column
pub fn column_schema(model: &DataModelDescriptor, column: &str) -> Schema {
    if model.is_date(column) {
        return Schema::of_type("string").with_format("date-time");
    }

    match model.cast_of(column) {
        Cast::Float => Schema::of_type("number").with_format("float"),
        Cast::Int => Schema::of_type("integer"),
        Cast::Boolean => Schema::of_type("boolean"),
        Cast::String | Cast::Date => Schema::of_type("string"),
    }
}

/// Example values are always rendered as strings
fn render_example(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Bool(b) => Some(if *b { "1" } else { "" }.to_string()),
        other => Some(other.to_string()),
    }
}
