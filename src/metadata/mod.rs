//! Application metadata consumed by the generator.
//!
//! The generator never inspects an application directly. Everything it knows
//! about routes, controller actions, data models and validation rules comes
//! through the provider traits defined here, so any reflection mechanism can
//! feed it.
//!
//! # Providers
//!
//! - [`RouteTable`] - the registered routes
//! - [`ActionReflector`] - comment blocks and validator types of actions
//! - [`ModelCatalog`] - data model descriptors and example instances
//! - [`RuleCatalog`] - validation rules of request-body validators
//!
//! [`manifest::Manifest`] implements all of them from a static JSON/YAML file.
//!
//! # Example
//!
//! ```no_run
//! use swagger_from_routes::metadata::{manifest::Manifest, RouteTable};
//! use std::path::Path;
//!
//! let manifest = Manifest::from_path(Path::new("app.yaml")).unwrap();
//! println!("Found {} routes", manifest.routes().len());
//! ```

pub mod manifest;

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source of the application's registered routes.
pub trait RouteTable {
    /// Returns every registered route, in registration order.
    fn routes(&self) -> Vec<RouteDescriptor>;
}

/// Resolves an action reference to the metadata declared on it.
pub trait ActionReflector {
    /// Returns the comment blocks and validator of a controller action, or
    /// `None` when the action cannot be resolved (e.g. closures).
    fn action_metadata(&self, action: &Action) -> Option<ActionMetadata>;
}

/// Resolves data model type names to their descriptors.
pub trait ModelCatalog {
    /// Looks up a model by (fully-qualified or base) type name.
    ///
    /// `Ok(None)` means the name is not a known data model. Structural
    /// problems in a known model are returned as errors.
    fn model(&self, name: &str) -> Result<Option<DataModelDescriptor>>;

    /// Produces a representative instance of `model` as column → value.
    ///
    /// This is best-effort: callers ignore every failure. Implementations that
    /// touch persistent storage must run inside a transaction that is always
    /// rolled back.
    fn example(&self, model: &DataModelDescriptor) -> anyhow::Result<IndexMap<String, serde_json::Value>> {
        anyhow::bail!("no example factory registered for {}", model.name)
    }
}

/// Resolves request-body validator types to their field rules.
pub trait RuleCatalog {
    fn rules(&self, validator: &str) -> Option<RuleSet>;
}

/// Everything the generator needs from an application.
pub trait MetadataProvider: RouteTable + ActionReflector + ModelCatalog + RuleCatalog {}

impl<T> MetadataProvider for T where T: RouteTable + ActionReflector + ModelCatalog + RuleCatalog + ?Sized {}

/// One registered (URI template, HTTP methods, action) binding.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    /// The URI template as registered (e.g. "users/{id?}")
    pub uri: String,
    /// The HTTP methods, in registration order
    pub methods: Vec<HttpMethod>,
    /// The action handling the route
    pub action: Action,
    /// Gathered middleware, in order
    pub middleware: Vec<MiddlewareDescriptor>,
    /// The route name, if any
    pub name: Option<String>,
}

impl RouteDescriptor {
    /// Create a new RouteDescriptor with no middleware and no name
    pub fn new(uri: impl Into<String>, methods: Vec<HttpMethod>, action: Action) -> Self {
        Self {
            uri: uri.into(),
            methods,
            action,
            middleware: Vec::new(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_middleware(mut self, middleware: MiddlewareDescriptor) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// The URI anchored at `/`, optional markers kept
    pub fn original_uri(&self) -> String {
        if self.uri.starts_with('/') {
            self.uri.clone()
        } else {
            format!("/{}", self.uri)
        }
    }

    /// The URI anchored at `/` with optional markers removed
    pub fn uri(&self) -> String {
        strip_optional_char(&self.original_uri())
    }

    /// Methods that can carry documentation (HEAD excluded)
    pub fn valid_methods(&self) -> Vec<HttpMethod> {
        self.methods
            .iter()
            .copied()
            .filter(|m| *m != HttpMethod::Head)
            .collect()
    }

    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.as_deref().is_some_and(|n| n.contains(needle))
    }

    /// Whether any middleware looks like an authentication guard
    pub fn has_auth_middleware(&self) -> bool {
        self.middleware.iter().any(|m| m.name.contains("auth"))
    }
}

/// Remove every optional-segment marker from a URI
pub fn strip_optional_char(uri: &str) -> String {
    uri.replace('?', "")
}

/// The unqualified name of a type (`App\Models\User` → `User`)
pub fn base_name(type_name: &str) -> &str {
    let trimmed = type_name.trim().trim_matches('\\');
    trimmed.rsplit('\\').next().unwrap_or(trimmed)
}

/// Normalized fully-qualified exception identifier.
///
/// Surrounding whitespace and backslashes are trimmed, so `\App\Foo` and
/// `App\Foo` name the same exception.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ExceptionTag(String);

impl ExceptionTag {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().trim_matches('\\').trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether both tags name the same exception.
    ///
    /// An unqualified name matches any qualified name with the same base name.
    pub fn matches(&self, other: &ExceptionTag) -> bool {
        if self.0 == other.0 {
            return true;
        }
        let unqualified = !self.0.contains('\\') || !other.0.contains('\\');
        unqualified && base_name(&self.0) == base_name(&other.0)
    }
}

impl fmt::Display for ExceptionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ExceptionTag {
    fn from(value: String) -> Self {
        ExceptionTag::new(&value)
    }
}

impl From<&str> for ExceptionTag {
    fn from(value: &str) -> Self {
        ExceptionTag::new(value)
    }
}

impl From<ExceptionTag> for String {
    fn from(tag: ExceptionTag) -> Self {
        tag.0
    }
}

/// HTTP methods a route can answer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// Lowercase name, as used for Swagger path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            "options" => Ok(HttpMethod::Options),
            "head" => Ok(HttpMethod::Head),
            other => Err(format!("unknown HTTP method: {}", other)),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// The action bound to a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// A controller member, parsed from `Class@method`
    Controller { class: String, method: Option<String> },
    /// An inline closure; nothing can be reflected on it
    Closure,
}

impl Action {
    /// Parse a `Class@method` callback string
    pub fn parse(callback: &str) -> Self {
        let callback = callback.trim();
        if callback.is_empty() || callback == "Closure" {
            return Action::Closure;
        }

        match callback.split_once('@') {
            Some((class, method)) => Action::Controller {
                class: class.to_string(),
                method: Some(method.to_string()).filter(|m| !m.is_empty()),
            },
            None => Action::Controller {
                class: callback.to_string(),
                method: None,
            },
        }
    }

    pub fn class(&self) -> Option<&str> {
        match self {
            Action::Controller { class, .. } => Some(class),
            Action::Closure => None,
        }
    }
}

/// Metadata declared on a controller action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionMetadata {
    /// Comment block of the action member
    pub doc_comment: String,
    /// Comment block of the declaring type
    pub class_doc_comment: String,
    /// Fully-qualified name of the request-body validator parameter, if any
    pub validator: Option<String>,
}

/// A middleware entry such as `throttle:60,1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewareDescriptor {
    pub name: String,
    pub parameters: Vec<String>,
    /// What the name resolves to in the application's alias map
    pub resolved: Option<String>,
}

impl MiddlewareDescriptor {
    /// Parse `name:param1,param2`
    pub fn parse(middleware: &str) -> Self {
        let (name, parameters) = match middleware.split_once(':') {
            Some((name, params)) => (name, params.split(',').map(str::to_string).collect()),
            None => (middleware, Vec::new()),
        };

        Self {
            name: name.to_string(),
            parameters,
            resolved: None,
        }
    }

    pub fn with_resolved(mut self, resolved: Option<String>) -> Self {
        self.resolved = resolved;
        self
    }
}

/// Declared cast of a model column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cast {
    Int,
    Float,
    Boolean,
    #[default]
    String,
    Date,
}

impl From<String> for Cast {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Cast::Int,
            "float" | "double" | "real" => Cast::Float,
            "boolean" | "bool" => Cast::Boolean,
            "date" | "datetime" | "timestamp" => Cast::Date,
            _ => Cast::String,
        }
    }
}

impl From<Cast> for String {
    fn from(cast: Cast) -> Self {
        match cast {
            Cast::Int => "int",
            Cast::Float => "float",
            Cast::Boolean => "boolean",
            Cast::String => "string",
            Cast::Date => "date",
        }
        .to_string()
    }
}

/// Cardinality of a model relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cardinality {
    One,
    Many,
}

impl From<String> for Cardinality {
    /// Accepts `one`/`many` as well as relation kinds such as `hasMany`
    fn from(value: String) -> Self {
        if value.to_ascii_lowercase().contains("many") {
            Cardinality::Many
        } else {
            Cardinality::One
        }
    }
}

impl From<Cardinality> for String {
    fn from(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::One => "one".to_string(),
            Cardinality::Many => "many".to_string(),
        }
    }
}

/// A relation accessor on a data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Accessor name (becomes the property name)
    pub accessor: String,
    pub cardinality: Cardinality,
    /// Type name of the related model, resolved through the catalog
    pub related: String,
}

/// Column-level description of a data model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataModelDescriptor {
    /// Fully-qualified type name
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub casts: IndexMap<String, Cast>,
    /// Columns declared as dates
    pub dates: Vec<String>,
    pub hidden: Vec<String>,
    /// Virtual (computed) fields
    pub appends: Vec<String>,
    pub relations: Vec<RelationDescriptor>,
}

impl DataModelDescriptor {
    /// The definition name of this model
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }

    pub fn cast_of(&self, column: &str) -> Cast {
        self.casts.get(column).copied().unwrap_or_default()
    }

    pub fn is_date(&self, column: &str) -> bool {
        self.dates.iter().any(|d| d == column) || self.cast_of(column) == Cast::Date
    }

    pub fn is_hidden(&self, column: &str) -> bool {
        self.hidden.iter().any(|h| h == column)
    }

    /// Columns and appended fields, hidden ones removed
    pub fn visible_fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .chain(self.appends.iter())
            .map(String::as_str)
            .filter(|field| !self.is_hidden(field))
            .collect()
    }
}

/// Validation rules of one request-body validator, in declaration order
pub type RuleSet = IndexMap<String, RuleExpr>;

/// A rule expression: `"required|integer"` or a list of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleExpr {
    Pipe(String),
    List(Vec<Rule>),
}

/// One element of a list rule expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rule {
    /// A rule name such as `required` or `in:1,2`
    Name(String),
    /// A rule object or executable validator; carries no schema information
    Opaque(serde_json::Value),
}

impl From<&str> for RuleExpr {
    fn from(value: &str) -> Self {
        RuleExpr::Pipe(value.to_string())
    }
}
