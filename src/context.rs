//! Everything resolved about one route × method before generation starts.

use crate::annotation::Annotations;
use crate::config::VersionConfig;
use crate::error::{Error, Result};
use crate::metadata::{
    base_name, strip_optional_char, DataModelDescriptor, ExceptionTag, HttpMethod,
    MetadataProvider, RouteDescriptor, RuleSet,
};
use log::{debug, warn};

/// A request-body validator and its rules
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    pub name: String,
    pub rules: RuleSet,
}

impl Validator {
    /// Definition name of the validator's error response
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }
}

/// Immutable per route × method input of every generation step
#[derive(Debug, Clone)]
pub struct RouteContext<'r> {
    pub route: &'r RouteDescriptor,
    pub method: HttpMethod,
    /// Key under `paths` in the document
    pub path: String,
    pub annotations: Annotations,
    pub model: Option<DataModelDescriptor>,
    pub validator: Option<Validator>,
    /// Exceptions the route can raise, first occurrence order
    pub exceptions: Vec<ExceptionTag>,
}

impl<'r> RouteContext<'r> {
    /// Resolve annotations, model, validator and exceptions of a route
    pub fn resolve<P>(
        route: &'r RouteDescriptor,
        method: HttpMethod,
        provider: &P,
        config: &VersionConfig,
    ) -> Result<Self>
    where
        P: MetadataProvider + ?Sized,
    {
        let metadata = provider.action_metadata(&route.action).unwrap_or_default();

        let annotations = Annotations::parse(&metadata.doc_comment, config.parse_doc_block);
        let class_annotations =
            Annotations::parse(&metadata.class_doc_comment, config.parse_doc_block);

        let model = match annotations
            .first_tag("model")
            .or_else(|| class_annotations.first_tag("model"))
        {
            Some(name) => {
                let model = provider.model(name)?.ok_or_else(|| Error::NotAModel {
                    model: name.to_string(),
                })?;
                debug!("Route {} documents model {}", route.uri, model.name);
                Some(model)
            }
            None => None,
        };

        let validator = metadata.validator.map(|name| {
            let rules = provider.rules(&name).unwrap_or_else(|| {
                warn!("No rules known for validator {}", name);
                RuleSet::new()
            });
            Validator { name, rules }
        });

        let mut exceptions = annotations.throws();
        if validator.is_some() {
            push_unique(&mut exceptions, config.validation_exception.clone());
        }
        if route.has_auth_middleware() {
            push_unique(&mut exceptions, config.authentication_exception.clone());
        }

        Ok(Self {
            route,
            method,
            path: path_key(route, &config.base_path),
            annotations,
            model,
            validator,
            exceptions,
        })
    }

    /// Whether the route returns a collection of its model
    pub fn is_collection(&self) -> bool {
        self.route.name_contains("index")
    }

    pub fn has_auth(&self) -> bool {
        self.route.has_auth_middleware()
    }
}

fn push_unique(exceptions: &mut Vec<ExceptionTag>, exception: ExceptionTag) {
    if !exceptions.contains(&exception) {
        exceptions.push(exception);
    }
}

/// Document path of a route: base path removed, optional markers stripped
pub fn path_key(route: &RouteDescriptor, base_path: &str) -> String {
    let uri = route.original_uri();
    let base = base_path.trim_end_matches('/');

    let relative = match uri.strip_prefix(base) {
        Some(rest) if !base.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
        _ => uri.as_str(),
    };

    let anchored = if relative.starts_with('/') {
        relative.to_string()
    } else {
        format!("/{}", relative)
    };
    strip_optional_char(&anchored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::manifest::Manifest;
    use crate::metadata::{Action, MiddlewareDescriptor};

    const MANIFEST: &str = r#"
actions:
  App\Http\Controllers\CustomerController:
    doc_comment: "/** @model App\\Models\\Customer */"
    methods:
      store:
        doc_comment: |
          /**
           * Create a customer.
           *
           * @throws \Illuminate\Auth\Access\AuthorizationException
           */
        validator: App\Http\Requests\StoreCustomerRequest
      show:
        doc_comment: "/** @model App\\Models\\Invoice */"
models:
  App\Models\Customer:
    table: customers
    columns: [id, name]
validators:
  App\Http\Requests\StoreCustomerRequest:
    name: required
"#;

    fn route(action: &str) -> RouteDescriptor {
        RouteDescriptor::new(
            "api/customers/{customer?}",
            vec![HttpMethod::Post],
            Action::parse(action),
        )
    }

    #[test]
    fn test_resolve_collects_everything() {
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        let route = route("App\\Http\\Controllers\\CustomerController@store")
            .with_middleware(MiddlewareDescriptor::parse("auth:api"));
        let config = VersionConfig {
            base_path: "/api".to_string(),
            ..Default::default()
        };

        let ctx = RouteContext::resolve(&route, HttpMethod::Post, &manifest, &config).unwrap();

        assert_eq!(ctx.path, "/customers/{customer}");
        assert_eq!(ctx.annotations.summary, "Create a customer.");
        assert_eq!(ctx.model.as_ref().unwrap().base_name(), "Customer");
        let validator = ctx.validator.as_ref().unwrap();
        assert_eq!(validator.base_name(), "StoreCustomerRequest");
        assert_eq!(validator.rules.len(), 1);
        assert_eq!(
            ctx.exceptions,
            vec![
                ExceptionTag::new("Illuminate\\Auth\\Access\\AuthorizationException"),
                ExceptionTag::new("Illuminate\\Validation\\ValidationException"),
                ExceptionTag::new("Illuminate\\Auth\\AuthenticationException"),
            ]
        );
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        let route = route("App\\Http\\Controllers\\CustomerController@show");

        let result = RouteContext::resolve(&route, HttpMethod::Get, &manifest, &VersionConfig::default());

        assert!(matches!(result, Err(Error::NotAModel { .. })));
    }

    #[test]
    fn test_closure_route_resolves_empty() {
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        let route = RouteDescriptor::new("users", vec![HttpMethod::Get], Action::Closure);

        let ctx =
            RouteContext::resolve(&route, HttpMethod::Get, &manifest, &VersionConfig::default())
                .unwrap();

        assert_eq!(ctx.path, "/users");
        assert!(ctx.model.is_none());
        assert!(ctx.validator.is_none());
        assert!(ctx.exceptions.is_empty());
    }

    #[test]
    fn test_doc_block_parsing_disabled_ignores_tags() {
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        let route = route("App\\Http\\Controllers\\CustomerController@store");
        let config = VersionConfig {
            parse_doc_block: false,
            ..Default::default()
        };

        let ctx = RouteContext::resolve(&route, HttpMethod::Post, &manifest, &config).unwrap();

        assert!(ctx.model.is_none());
        assert_eq!(ctx.annotations.summary, "");
        assert_eq!(
            ctx.exceptions,
            vec![ExceptionTag::new("Illuminate\\Validation\\ValidationException")]
        );
    }

    #[test]
    fn test_path_key() {
        let route = RouteDescriptor::new("/api/users/{id?}", vec![HttpMethod::Get], Action::Closure);

        assert_eq!(path_key(&route, "/"), "/api/users/{id}");
        assert_eq!(path_key(&route, "/api"), "/users/{id}");
        assert_eq!(path_key(&route, "/api/"), "/users/{id}");
        assert_eq!(path_key(&route, "/ap"), "/api/users/{id}");

        let root = RouteDescriptor::new("/api", vec![HttpMethod::Get], Action::Closure);
        assert_eq!(path_key(&root, "/api"), "/");
    }
}
