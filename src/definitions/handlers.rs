//! Error definitions for the exceptions a route can raise.

use super::DefinitionRegistry;
use crate::config::{ErrorDefinitionMapping, HandlerKind, VersionConfig};
use crate::context::RouteContext;
use crate::metadata::{ExceptionTag, RuleSet};
use crate::schema::Schema;
use log::debug;
use serde_json::json;

const DEFAULT_MESSAGE_EXAMPLE: &str = "The given data was invalid";

/// Produces the schema of one error definition
pub trait ErrorDefinitionHandler {
    fn definition(&self) -> Schema;
}

/// `{message}` error body
pub struct DefaultErrorHandler;

/// `{message, errors}` body with one `errors` entry per validated field
pub struct ValidationErrorHandler<'a> {
    rules: Option<&'a RuleSet>,
}

impl ErrorDefinitionHandler for DefaultErrorHandler {
    fn definition(&self) -> Schema {
        let mut schema = Schema::object();
        schema.mark_required("message");
        schema.set_property("message", message_schema());
        schema
    }
}

impl ErrorDefinitionHandler for ValidationErrorHandler<'_> {
    fn definition(&self) -> Schema {
        let mut errors = Schema::object();
        errors.properties = Some(Default::default());
        for field in self.rules.into_iter().flat_map(|rules| rules.keys()) {
            errors.set_property(
                field,
                Schema::array_of(Schema::of_type("string"))
                    .with_description(format!("Errors on \"{}\" parameter", field)),
            );
        }

        let mut schema = Schema::object();
        schema.mark_required("message");
        schema.mark_required("errors");
        schema.set_property("message", message_schema());
        schema.set_property("errors", errors);
        schema
    }
}

fn message_schema() -> Schema {
    Schema::of_type("string").with_example(json!(DEFAULT_MESSAGE_EXAMPLE))
}

/// Handler for a mapping, bound to the route's validator rules
pub fn handler_for<'a>(kind: HandlerKind, ctx: &'a RouteContext<'_>) -> Box<dyn ErrorDefinitionHandler + 'a> {
    match kind {
        HandlerKind::Default => Box::new(DefaultErrorHandler),
        HandlerKind::Validation => Box::new(ValidationErrorHandler {
            rules: ctx.validator.as_ref().map(|v| &v.rules),
        }),
    }
}

/// Definition name of an exception's error body.
///
/// Validation failures of a route with a validator are named after the
/// validator, everything else after the mapping.
pub fn definition_name(
    mapping: &ErrorDefinitionMapping,
    exception: &ExceptionTag,
    ctx: &RouteContext<'_>,
    config: &VersionConfig,
) -> String {
    match &ctx.validator {
        Some(validator) if exception.matches(&config.validation_exception) => {
            validator.base_name().to_string()
        }
        _ => mapping.name.clone(),
    }
}

/// Register an error definition for every mapped exception of the route.
///
/// Unmapped exceptions are skipped here; the response composer reports them.
pub fn generate_error_definitions(
    ctx: &RouteContext<'_>,
    config: &VersionConfig,
    registry: &mut DefinitionRegistry,
) {
    for exception in &ctx.exceptions {
        let Some(mapping) = config.error_mapping(exception) else {
            debug!("No error definition mapped for {}", exception);
            continue;
        };

        let name = definition_name(mapping, exception, ctx, config);
        if registry.contains(&name) {
            continue;
        }
        registry.insert(&name, handler_for(mapping.handler, ctx).definition());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Validator;
    use crate::metadata::{Action, HttpMethod, RouteDescriptor, RuleExpr};
    use crate::annotation::Annotations;
    use pretty_assertions::assert_eq;

    fn context<'r>(route: &'r RouteDescriptor, validator: Option<Validator>, exceptions: &[&str]) -> RouteContext<'r> {
        RouteContext {
            route,
            method: HttpMethod::Post,
            path: "/customers".to_string(),
            annotations: Annotations::default(),
            model: None,
            validator,
            exceptions: exceptions.iter().map(|e| ExceptionTag::new(e)).collect(),
        }
    }

    fn store_customer_request() -> Validator {
        let mut rules = RuleSet::new();
        rules.insert("name".to_string(), RuleExpr::from("required"));
        rules.insert("email".to_string(), RuleExpr::from("required|email"));
        Validator {
            name: "App\\Http\\Requests\\StoreCustomerRequest".to_string(),
            rules,
        }
    }

    #[test]
    fn test_default_definition() {
        let value = serde_json::to_value(DefaultErrorHandler.definition()).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "object",
                "required": ["message"],
                "properties": {
                    "message": {"type": "string", "example": "The given data was invalid"}
                }
            })
        );
    }

    #[test]
    fn test_validation_definition_lists_fields() {
        let validator = store_customer_request();
        let handler = ValidationErrorHandler {
            rules: Some(&validator.rules),
        };
        let value = serde_json::to_value(handler.definition()).unwrap();

        assert_eq!(value["required"], json!(["message", "errors"]));
        assert_eq!(
            value["properties"]["errors"]["properties"]["email"],
            json!({
                "type": "array",
                "description": "Errors on \"email\" parameter",
                "items": {"type": "string"}
            })
        );
    }

    #[test]
    fn test_validation_definition_named_after_validator() {
        let route = RouteDescriptor::new("/customers", vec![HttpMethod::Post], Action::Closure);
        let ctx = context(
            &route,
            Some(store_customer_request()),
            &["Illuminate\\Validation\\ValidationException"],
        );
        let config = VersionConfig::default();
        let mut registry = DefinitionRegistry::new();

        generate_error_definitions(&ctx, &config, &mut registry);

        assert!(registry.contains("StoreCustomerRequest"));
        assert!(!registry.contains("UnprocessableEntity"));
    }

    #[test]
    fn test_mapped_names_and_skipped_exceptions() {
        let route = RouteDescriptor::new("/customers", vec![HttpMethod::Get], Action::Closure);
        let ctx = context(
            &route,
            None,
            &[
                "Illuminate\\Auth\\AuthenticationException",
                "App\\Exceptions\\PaymentRequired",
            ],
        );
        let config = VersionConfig::default();
        let mut registry = DefinitionRegistry::new();

        generate_error_definitions(&ctx, &config, &mut registry);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Unauthenticated"));
    }
}
