//! Composition of an operation's `responses` object.
//!
//! Responses come from three sources, first writer wins per status code:
//!
//! 1. the request-body validator (validation error response)
//! 2. the exceptions the route can raise
//! 3. the documented model (success response)
//!
//! A route with none of these gets a bare `200 OK`. Success responses always
//! reference the model definition; [`crate::openapi_builder::OpenApiBuilder`]
//! drops references that no definition satisfies once every route is done.

use crate::config::{ErrorDefinitionMapping, VersionConfig};
use crate::context::RouteContext;
use crate::definitions::handlers::definition_name;
use crate::error::{Error, Result};
use crate::metadata::HttpMethod;
use crate::schema::Schema;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Status code → response
pub type Responses = IndexMap<String, Response>;

/// Swagger 2.0 Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Response {
    pub fn new(description: impl Into<String>, schema: Option<Schema>) -> Self {
        Self {
            description: description.into(),
            schema,
        }
    }
}

pub struct ResponseComposer<'a> {
    config: &'a VersionConfig,
}

impl<'a> ResponseComposer<'a> {
    pub fn new(config: &'a VersionConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, ctx: &RouteContext<'_>) -> Result<Responses> {
        let mut responses = Responses::new();

        if let Some(validator) = &ctx.validator {
            if let Some(mapping) = self.config.error_mapping(&self.config.validation_exception) {
                responses.insert(
                    mapping.http_code.to_string(),
                    Response::new(
                        describe(mapping),
                        Some(Schema::reference_to(validator.base_name())),
                    ),
                );
            }
        }

        for exception in &ctx.exceptions {
            let mapping = self
                .config
                .error_mapping(exception)
                .ok_or_else(|| Error::MissingErrorMapping {
                    exception: exception.to_string(),
                    route: ctx.path.clone(),
                })?;
            let name = definition_name(mapping, exception, ctx, self.config);

            responses
                .entry(mapping.http_code.to_string())
                .or_insert_with(|| Response::new(describe(mapping), Some(Schema::reference_to(&name))));
        }

        if let Some((code, response)) = self.success_response(ctx) {
            responses.entry(code.to_string()).or_insert(response);
        }

        if responses.is_empty() {
            responses.insert("200".to_string(), Response::new(description_for(200), None));
        }

        debug!("Composed {} responses for {} {}", responses.len(), ctx.method, ctx.path);
        Ok(responses)
    }

    fn success_response(&self, ctx: &RouteContext<'_>) -> Option<(u16, Response)> {
        let model = ctx.model.as_ref()?;
        // Multi-verb routes are described by their first verb
        let method = ctx.route.valid_methods().into_iter().next()?;
        let code = success_code(method)?;

        if code == 204 {
            return Some((code, Response::new(description_for(code), None)));
        }

        let reference = Schema::reference_to(model.base_name());
        let schema = if ctx.is_collection() {
            Schema::array_of(reference)
        } else {
            reference
        };

        Some((code, Response::new(description_for(code), Some(schema))))
    }
}

/// Success status of a verb; verbs without one get no success response
pub fn success_code(method: HttpMethod) -> Option<u16> {
    match method {
        HttpMethod::Get => Some(200),
        HttpMethod::Post => Some(201),
        HttpMethod::Put | HttpMethod::Delete => Some(204),
        _ => None,
    }
}

fn describe(mapping: &ErrorDefinitionMapping) -> String {
    mapping
        .description
        .clone()
        .unwrap_or_else(|| description_for(mapping.http_code).to_string())
}

/// Default description of a status code
pub fn description_for(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthenticated",
        403 => "Forbidden",
        404 => "Model not found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        422 => "Validation errors",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Error",
    }
}
