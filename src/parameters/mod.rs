//! Parameter objects compiled from URI templates and validation rules.
//!
//! Three generators share the rule derivation in [`rules`]:
//!
//! - [`path::PathParameterGenerator`] - URI template variables
//! - [`query::QueryParameterGenerator`] - flat query parameters
//! - [`body::BodyParameterGenerator`] - one nested `body` schema
//!
//! Which of query or body applies depends on the HTTP method, see
//! [`generator_for`].

pub mod body;
pub mod path;
pub mod query;
pub mod rules;

use crate::context::RouteContext;
use crate::metadata::{HttpMethod, RuleSet};
use crate::schema::Schema;
use log::debug;
use serde::{Deserialize, Serialize};

/// Where a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
}

/// Swagger 2.0 Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Schema>,
    /// Body parameters only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    pub fn new(location: ParameterLocation, name: &str) -> Self {
        Self {
            location,
            name: name.to_string(),
            param_type: None,
            required: None,
            description: String::new(),
            format: None,
            enum_values: None,
            items: None,
            schema: None,
        }
    }
}

/// Trait for producing the parameters of one location
pub trait ParameterGenerator {
    fn location(&self) -> ParameterLocation;

    fn parameters(&self) -> Vec<Parameter>;
}

/// Body generator for methods carrying a payload, query generator otherwise
pub fn generator_for(method: HttpMethod, rules: &RuleSet) -> Box<dyn ParameterGenerator + '_> {
    match method {
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
            Box::new(body::BodyParameterGenerator::new(rules))
        }
        _ => Box::new(query::QueryParameterGenerator::new(rules)),
    }
}

/// Path parameters followed by the validator's body or query parameters
pub fn generate(ctx: &RouteContext) -> Vec<Parameter> {
    let original_uri = ctx.route.original_uri();
    let mut parameters = path::PathParameterGenerator::new(&original_uri).parameters();

    if let Some(validator) = &ctx.validator {
        let generator = generator_for(ctx.method, &validator.rules);
        debug!(
            "Compiling {} rules of {} as {:?} parameters",
            validator.rules.len(),
            validator.name,
            generator.location()
        );
        parameters.extend(generator.parameters());
    }

    parameters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RuleExpr;

    fn rules() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.insert("name".to_string(), RuleExpr::from("required"));
        rules
    }

    #[test]
    fn test_generator_for_payload_methods() {
        let rules = rules();

        for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch] {
            assert_eq!(generator_for(method, &rules).location(), ParameterLocation::Body);
        }
        for method in [HttpMethod::Get, HttpMethod::Delete] {
            assert_eq!(generator_for(method, &rules).location(), ParameterLocation::Query);
        }
    }

    #[test]
    fn test_parameter_serialization_skips_absent_fields() {
        let mut parameter = Parameter::new(ParameterLocation::Query, "page");
        parameter.param_type = Some("integer".to_string());
        parameter.required = Some(false);

        let value = serde_json::to_value(&parameter).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "in": "query",
                "name": "page",
                "type": "integer",
                "required": false,
                "description": ""
            })
        );
    }
}
