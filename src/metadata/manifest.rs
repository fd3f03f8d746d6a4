//! Static application description loaded from a JSON or YAML file.
//!
//! A manifest stands in for live reflection: it lists the routes, the comment
//! blocks and validators of controller actions, the data models and the rules
//! of each request-body validator.
//!
//! ```yaml
//! routes:
//!   - uri: customers
//!     methods: [POST]
//!     action: App\Http\Controllers\CustomerController@store
//!     name: customers.store
//!     middleware: ["auth:api"]
//! actions:
//!   App\Http\Controllers\CustomerController:
//!     doc_comment: "/** @model App\\Models\\Customer */"
//!     methods:
//!       store:
//!         validator: App\Http\Requests\StoreCustomerRequest
//! validators:
//!   App\Http\Requests\StoreCustomerRequest:
//!     name: required|string
//! ```

use super::{
    base_name, Action, ActionMetadata, ActionReflector, Cast, DataModelDescriptor, HttpMethod,
    MiddlewareDescriptor, ModelCatalog, RelationDescriptor, RouteDescriptor, RouteTable,
    RuleCatalog, RuleSet,
};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// An application description implementing every metadata provider trait
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub routes: Vec<ManifestRoute>,
    /// Controller type name → declared metadata
    pub actions: IndexMap<String, ManifestController>,
    /// Middleware alias → middleware type name
    pub middleware_aliases: IndexMap<String, String>,
    /// Model type name → model description
    pub models: IndexMap<String, ManifestModel>,
    /// Validator type name → field rules
    pub validators: IndexMap<String, RuleSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestRoute {
    pub uri: String,
    pub methods: Vec<HttpMethod>,
    #[serde(default = "closure_action")]
    pub action: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub middleware: Vec<String>,
}

fn closure_action() -> String {
    "Closure".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManifestController {
    /// Comment block of the controller type
    pub doc_comment: String,
    pub methods: IndexMap<String, ManifestAction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManifestAction {
    pub doc_comment: String,
    pub validator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManifestModel {
    pub table: String,
    pub columns: Vec<String>,
    pub casts: IndexMap<String, Cast>,
    pub dates: Vec<String>,
    pub hidden: Vec<String>,
    /// Kept loose so that a malformed declaration is reported per model
    pub appends: serde_json::Value,
    pub relations: Vec<RelationDescriptor>,
    /// Example instance returned by the example factory
    pub example: Option<IndexMap<String, serde_json::Value>>,
}

impl Manifest {
    /// Load a manifest from a JSON or YAML file
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading application manifest from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a manifest from YAML (or JSON) text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        debug!(
            "Manifest holds {} routes, {} models, {} validators",
            manifest.routes.len(),
            manifest.models.len(),
            manifest.validators.len()
        );
        Ok(manifest)
    }

    /// Find a model entry by full name, falling back to its base name
    fn find_model(&self, name: &str) -> Option<(&String, &ManifestModel)> {
        let wanted = name.trim().trim_matches('\\');
        self.models
            .iter()
            .find(|(key, _)| key.trim_matches('\\') == wanted)
            .or_else(|| {
                self.models
                    .iter()
                    .find(|(key, _)| base_name(key) == base_name(wanted))
            })
    }

    fn resolve_middleware(&self, raw: &str) -> MiddlewareDescriptor {
        let middleware = MiddlewareDescriptor::parse(raw);
        let resolved = self.middleware_aliases.get(&middleware.name).cloned();
        middleware.with_resolved(resolved)
    }
}

impl ManifestModel {
    fn appends(&self, model: &str) -> Result<Vec<String>> {
        match &self.appends {
            serde_json::Value::Null => Ok(Vec::new()),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| Error::InvalidAppends {
                            model: model.to_string(),
                        })
                })
                .collect(),
            _ => Err(Error::InvalidAppends {
                model: model.to_string(),
            }),
        }
    }
}

impl RouteTable for Manifest {
    fn routes(&self) -> Vec<RouteDescriptor> {
        self.routes
            .iter()
            .map(|route| {
                let mut descriptor =
                    RouteDescriptor::new(route.uri.clone(), route.methods.clone(), Action::parse(&route.action));
                descriptor.name = route.name.clone();
                descriptor.middleware = route
                    .middleware
                    .iter()
                    .map(|m| self.resolve_middleware(m))
                    .collect();
                descriptor
            })
            .collect()
    }
}

impl ActionReflector for Manifest {
    fn action_metadata(&self, action: &Action) -> Option<ActionMetadata> {
        let Action::Controller { class, method: Some(method) } = action else {
            return None;
        };

        let controller = self.actions.get(class)?;
        let Some(declared) = controller.methods.get(method) else {
            debug!("Action {}@{} is not declared in the manifest", class, method);
            return None;
        };

        Some(ActionMetadata {
            doc_comment: declared.doc_comment.clone(),
            class_doc_comment: controller.doc_comment.clone(),
            validator: declared.validator.clone(),
        })
    }
}

impl ModelCatalog for Manifest {
    fn model(&self, name: &str) -> Result<Option<DataModelDescriptor>> {
        let Some((full_name, model)) = self.find_model(name) else {
            return Ok(None);
        };

        let full_name = full_name.trim_matches('\\').to_string();
        Ok(Some(DataModelDescriptor {
            appends: model.appends(&full_name)?,
            name: full_name,
            table: model.table.clone(),
            columns: model.columns.clone(),
            casts: model.casts.clone(),
            dates: model.dates.clone(),
            hidden: model.hidden.clone(),
            relations: model.relations.clone(),
        }))
    }

    fn example(&self, model: &DataModelDescriptor) -> anyhow::Result<IndexMap<String, serde_json::Value>> {
        self.find_model(&model.name)
            .and_then(|(_, m)| m.example.clone())
            .ok_or_else(|| anyhow::anyhow!("no example instance declared for {}", model.name))
    }
}

impl RuleCatalog for Manifest {
    fn rules(&self, validator: &str) -> Option<RuleSet> {
        let wanted = validator.trim_matches('\\');
        self.validators
            .iter()
            .find(|(key, _)| key.trim_matches('\\') == wanted)
            .map(|(_, rules)| rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Cardinality, RuleExpr};

    const MANIFEST: &str = r#"
routes:
  - uri: users
    methods: [GET, HEAD]
    action: App\Http\Controllers\UserController@index
    name: users.index
    middleware: ["scope:user-read", "auth:api"]
  - uri: /health
    methods: [GET]
actions:
  App\Http\Controllers\UserController:
    doc_comment: "/** @model App\\Models\\User */"
    methods:
      index:
        doc_comment: "/** List users. */"
        validator: App\Http\Requests\ListUsersRequest
middleware_aliases:
  scope: Laravel\Passport\Http\Middleware\CheckForAnyScope
models:
  App\Models\User:
    table: users
    columns: [id, email, created_at]
    casts:
      id: integer
    dates: [created_at]
    appends: [full_name]
    relations:
      - accessor: orders
        cardinality: hasMany
        related: App\Models\Order
    example:
      id: 1
  App\Models\Broken:
    table: broken
    appends: full_name
validators:
  App\Http\Requests\ListUsersRequest:
    page: integer
"#;

    fn manifest() -> Manifest {
        Manifest::from_yaml(MANIFEST).unwrap()
    }

    #[test]
    fn test_routes_are_converted() {
        let routes = manifest().routes();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].uri, "users");
        assert_eq!(routes[0].methods, vec![HttpMethod::Get, HttpMethod::Head]);
        assert_eq!(routes[0].name.as_deref(), Some("users.index"));
        assert_eq!(routes[1].action, Action::Closure);
    }

    #[test]
    fn test_middleware_aliases_are_resolved() {
        let routes = manifest().routes();
        let scope = &routes[0].middleware[0];

        assert_eq!(scope.name, "scope");
        assert_eq!(scope.parameters, vec!["user-read"]);
        assert_eq!(
            scope.resolved.as_deref(),
            Some("Laravel\\Passport\\Http\\Middleware\\CheckForAnyScope")
        );
        assert!(routes[0].middleware[1].resolved.is_none());
    }

    #[test]
    fn test_action_metadata() {
        let manifest = manifest();
        let action = Action::parse("App\\Http\\Controllers\\UserController@index");
        let metadata = manifest.action_metadata(&action).unwrap();

        assert_eq!(metadata.doc_comment, "/** List users. */");
        assert!(metadata.class_doc_comment.contains("@model"));
        assert_eq!(
            metadata.validator.as_deref(),
            Some("App\\Http\\Requests\\ListUsersRequest")
        );

        assert!(manifest.action_metadata(&Action::Closure).is_none());
        assert!(manifest
            .action_metadata(&Action::parse("App\\Http\\Controllers\\UserController@show"))
            .is_none());
    }

    #[test]
    fn test_model_lookup_by_full_and_base_name() {
        let manifest = manifest();

        let user = manifest.model("\\App\\Models\\User").unwrap().unwrap();
        assert_eq!(user.name, "App\\Models\\User");
        assert_eq!(user.cast_of("id"), Cast::Int);
        assert_eq!(user.appends, vec!["full_name"]);
        assert_eq!(user.relations[0].cardinality, Cardinality::Many);

        assert!(manifest.model("User").unwrap().is_some());
        assert!(manifest.model("App\\Models\\Invoice").unwrap().is_none());
    }

    #[test]
    fn test_invalid_appends_is_an_error() {
        let result = manifest().model("App\\Models\\Broken");

        assert!(matches!(result, Err(Error::InvalidAppends { .. })));
    }

    #[test]
    fn test_example_instance() {
        let manifest = manifest();
        let user = manifest.model("User").unwrap().unwrap();

        let example = manifest.example(&user).unwrap();
        assert_eq!(example["id"], serde_json::json!(1));

        let broken = DataModelDescriptor {
            name: "App\\Models\\Invoice".to_string(),
            ..Default::default()
        };
        assert!(manifest.example(&broken).is_err());
    }

    #[test]
    fn test_rules_lookup() {
        let rules = manifest().rules("\\App\\Http\\Requests\\ListUsersRequest").unwrap();

        assert_eq!(rules["page"], RuleExpr::Pipe("integer".to_string()));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = Manifest::from_path(Path::new("/nonexistent/app.yaml"));

        assert!(matches!(result, Err(Error::Io(_))));
    }
}
