//! Generator configuration.
//!
//! One file describes shared document info plus any number of API versions.
//! Every field has a default, so a minimal file only needs what differs:
//!
//! ```yaml
//! title: Shop API
//! host: https://shop.test
//! default_version: "1.0.0"
//! versions:
//!   - app_version: "1.0.0"
//!     base_path: /api
//!     parse_security: true
//!     security_type: jwt
//! ```

use crate::error::{Error, Result};
use crate::metadata::{ExceptionTag, HttpMethod};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const VALIDATION_EXCEPTION: &str = "Illuminate\\Validation\\ValidationException";
pub const AUTHENTICATION_EXCEPTION: &str = "Illuminate\\Auth\\AuthenticationException";
pub const AUTHORIZATION_EXCEPTION: &str = "Illuminate\\Auth\\Access\\AuthorizationException";
pub const MODEL_NOT_FOUND_EXCEPTION: &str = "Illuminate\\Database\\Eloquent\\ModelNotFoundException";

/// Top-level configuration shared by all versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwaggerConfig {
    pub title: String,
    pub description: String,
    pub host: String,
    pub default_version: String,
    pub versions: Vec<VersionConfig>,
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            title: "Generated API".to_string(),
            description: String::new(),
            host: "http://localhost".to_string(),
            default_version: "1.0.0".to_string(),
            versions: vec![VersionConfig::default()],
        }
    }
}

impl SwaggerConfig {
    /// Load and validate a configuration file (YAML or JSON)
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: SwaggerConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.versions.is_empty() {
            return Err(Error::Config("at least one version must be configured".to_string()));
        }
        for version in &self.versions {
            version.validate()?;
        }
        Ok(())
    }
}

/// Whether the security layer emits OAuth2 or JWT definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityType {
    #[default]
    OAuth2,
    Jwt,
}

/// Settings of one API version.
///
/// `title`, `description` and `host` are normally injected from
/// [`SwaggerConfig`] by [`crate::versions::DocsManager`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
    pub app_version: String,
    pub title: String,
    pub description: String,
    pub host: String,
    pub base_path: String,
    pub schemes: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub ignored_methods: Vec<HttpMethod>,
    /// Route names left out of the document
    pub ignored_routes: Vec<String>,
    pub parse_doc_block: bool,
    pub parse_security: bool,
    pub security_type: SecurityType,
    pub auth_flow: String,
    /// Scope name → description
    pub oauth_scopes: IndexMap<String, String>,
    /// Middleware names or resolved types that carry OAuth scopes
    pub scope_middleware: Vec<String>,
    pub generate_examples: bool,
    pub parse_relationships: bool,
    pub validation_exception: ExceptionTag,
    pub authentication_exception: ExceptionTag,
    pub errors_definitions: Vec<ErrorDefinitionMapping>,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            app_version: "1.0.0".to_string(),
            title: String::new(),
            description: String::new(),
            host: String::new(),
            base_path: "/".to_string(),
            schemes: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            ignored_methods: vec![HttpMethod::Head],
            ignored_routes: Vec::new(),
            parse_doc_block: true,
            parse_security: false,
            security_type: SecurityType::OAuth2,
            auth_flow: "accessCode".to_string(),
            oauth_scopes: IndexMap::new(),
            scope_middleware: vec![
                "Laravel\\Passport\\Http\\Middleware\\CheckScopes".to_string(),
                "Laravel\\Passport\\Http\\Middleware\\CheckForAnyScope".to_string(),
            ],
            generate_examples: false,
            parse_relationships: true,
            validation_exception: ExceptionTag::new(VALIDATION_EXCEPTION),
            authentication_exception: ExceptionTag::new(AUTHENTICATION_EXCEPTION),
            errors_definitions: default_errors_definitions(),
        }
    }
}

impl VersionConfig {
    /// Reject error mappings that bind one HTTP code twice
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for mapping in &self.errors_definitions {
            if !seen.insert(mapping.http_code) {
                return Err(Error::DuplicateErrorMapping(mapping.http_code));
            }
        }
        Ok(())
    }

    /// The mapping whose exception matches `exception`
    pub fn error_mapping(&self, exception: &ExceptionTag) -> Option<&ErrorDefinitionMapping> {
        self.errors_definitions
            .iter()
            .find(|mapping| mapping.exception.matches(exception))
    }

    pub fn is_method_ignored(&self, method: HttpMethod) -> bool {
        self.ignored_methods.contains(&method)
    }
}

/// How an error definition is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    #[default]
    Default,
    Validation,
}

/// Binds an exception to an HTTP code and a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDefinitionMapping {
    /// Definition name (e.g. `NotFound`)
    pub name: String,
    pub http_code: u16,
    pub exception: ExceptionTag,
    #[serde(default)]
    pub handler: HandlerKind,
    /// Overrides the default response description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ErrorDefinitionMapping {
    pub fn new(name: &str, http_code: u16, exception: &str, handler: HandlerKind) -> Self {
        Self {
            name: name.to_string(),
            http_code,
            exception: ExceptionTag::new(exception),
            handler,
            description: None,
        }
    }
}

pub fn default_errors_definitions() -> Vec<ErrorDefinitionMapping> {
    vec![
        ErrorDefinitionMapping::new(
            "UnprocessableEntity",
            422,
            VALIDATION_EXCEPTION,
            HandlerKind::Validation,
        ),
        ErrorDefinitionMapping::new("Forbidden", 403, AUTHORIZATION_EXCEPTION, HandlerKind::Default),
        ErrorDefinitionMapping::new("NotFound", 404, MODEL_NOT_FOUND_EXCEPTION, HandlerKind::Default),
        ErrorDefinitionMapping::new(
            "Unauthenticated",
            401,
            AUTHENTICATION_EXCEPTION,
            HandlerKind::Default,
        ),
    ]
}
