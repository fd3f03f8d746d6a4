//! Security scheme definitions and per-operation requirements.
//!
//! Two strategies implement [`SecurityDefinitionsGenerator`]:
//! [`OAuthSecurityDefinitionsGenerator`] (OAuth2 with scopes taken from scope
//! middleware) and [`JwtSecurityDefinitionsGenerator`] (bearer token in the
//! `Authorization` header). [`create_generator`] picks one from configuration.

use crate::config::{SecurityType, VersionConfig};
use crate::context::RouteContext;
use crate::error::{Error, Result};
use crate::metadata::{MiddlewareDescriptor, RouteDescriptor};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const OAUTH_DEFINITION_NAME: &str = "OAuth2";
pub const JWT_DEFINITION_NAME: &str = "Bearer";
pub const OAUTH_TOKEN_PATH: &str = "/oauth/token";
pub const OAUTH_AUTHORIZE_PATH: &str = "/oauth/authorize";

/// Scheme name → scheme
pub type SecurityDefinitions = IndexMap<String, SecurityScheme>;

/// Scheme name → required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Swagger 2.0 Security Scheme object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Trait for security strategies
pub trait SecurityDefinitionsGenerator {
    /// Scheme definitions for the whole document
    fn generate(&self, routes: &[RouteDescriptor]) -> Result<SecurityDefinitions>;

    /// Requirements of one operation; empty when the route is unprotected
    fn generate_for_route(&self, ctx: &RouteContext<'_>) -> Vec<SecurityRequirement>;
}

/// Strategy selected by `security_type`, or `None` when security parsing is off
pub fn create_generator(config: &VersionConfig) -> Result<Option<Box<dyn SecurityDefinitionsGenerator>>> {
    if !config.parse_security {
        return Ok(None);
    }

    let generator: Box<dyn SecurityDefinitionsGenerator> = match config.security_type {
        SecurityType::OAuth2 => Box::new(OAuthSecurityDefinitionsGenerator::new(config)?),
        SecurityType::Jwt => Box::new(JwtSecurityDefinitionsGenerator),
    };
    debug!("Using {:?} security definitions", config.security_type);
    Ok(Some(generator))
}

/// OAuth2 grant flows of Swagger 2.0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    Password,
    Application,
    Implicit,
    AccessCode,
}

impl AuthFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFlow::Password => "password",
            AuthFlow::Application => "application",
            AuthFlow::Implicit => "implicit",
            AuthFlow::AccessCode => "accessCode",
        }
    }

    fn uses_authorization_url(&self) -> bool {
        matches!(self, AuthFlow::Implicit | AuthFlow::AccessCode)
    }

    fn uses_token_url(&self) -> bool {
        matches!(self, AuthFlow::Password | AuthFlow::Application | AuthFlow::AccessCode)
    }
}

impl FromStr for AuthFlow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "password" => Ok(AuthFlow::Password),
            "application" => Ok(AuthFlow::Application),
            "implicit" => Ok(AuthFlow::Implicit),
            "accessCode" => Ok(AuthFlow::AccessCode),
            other => Err(Error::InvalidAuthFlow(other.to_string())),
        }
    }
}

pub struct OAuthSecurityDefinitionsGenerator {
    flow: AuthFlow,
    host: String,
    scopes: IndexMap<String, String>,
    scope_middleware: Vec<String>,
}

impl OAuthSecurityDefinitionsGenerator {
    /// Fails when the configured flow is not an OAuth2 flow
    pub fn new(config: &VersionConfig) -> Result<Self> {
        Ok(Self {
            flow: config.auth_flow.parse()?,
            host: config.host.clone(),
            scopes: config.oauth_scopes.clone(),
            scope_middleware: config.scope_middleware.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let host = self.host.trim_end_matches('/');
        let host = host
            .strip_prefix("https://")
            .or_else(|| host.strip_prefix("http://"))
            .unwrap_or(host);
        format!("{}{}", host, path)
    }

    fn is_scope_middleware(&self, middleware: &MiddlewareDescriptor) -> bool {
        self.scope_middleware.iter().any(|candidate| {
            candidate == &middleware.name || middleware.resolved.as_deref() == Some(candidate.as_str())
        })
    }
}

impl SecurityDefinitionsGenerator for OAuthSecurityDefinitionsGenerator {
    fn generate(&self, routes: &[RouteDescriptor]) -> Result<SecurityDefinitions> {
        let has_oauth_routes = routes.iter().any(|route| {
            let uri = route.uri();
            uri == OAUTH_TOKEN_PATH || uri == OAUTH_AUTHORIZE_PATH
        });
        if !has_oauth_routes {
            return Err(Error::MissingOAuthRoutes {
                token: OAUTH_TOKEN_PATH,
                authorize: OAUTH_AUTHORIZE_PATH,
            });
        }

        let scheme = SecurityScheme {
            scheme_type: "oauth2".to_string(),
            flow: Some(self.flow.as_str().to_string()),
            authorization_url: self
                .flow
                .uses_authorization_url()
                .then(|| self.endpoint(OAUTH_AUTHORIZE_PATH)),
            token_url: self.flow.uses_token_url().then(|| self.endpoint(OAUTH_TOKEN_PATH)),
            scopes: Some(self.scopes.clone()),
            name: None,
            location: None,
        };

        let mut definitions = SecurityDefinitions::new();
        definitions.insert(OAUTH_DEFINITION_NAME.to_string(), scheme);
        Ok(definitions)
    }

    fn generate_for_route(&self, ctx: &RouteContext<'_>) -> Vec<SecurityRequirement> {
        // The last scope middleware wins
        ctx.route
            .middleware
            .iter()
            .filter(|m| self.is_scope_middleware(m))
            .last()
            .map(|m| {
                let mut requirement = SecurityRequirement::new();
                requirement.insert(OAUTH_DEFINITION_NAME.to_string(), m.parameters.clone());
                vec![requirement]
            })
            .unwrap_or_default()
    }
}

pub struct JwtSecurityDefinitionsGenerator;

impl SecurityDefinitionsGenerator for JwtSecurityDefinitionsGenerator {
    fn generate(&self, _routes: &[RouteDescriptor]) -> Result<SecurityDefinitions> {
        let scheme = SecurityScheme {
            scheme_type: "apiKey".to_string(),
            flow: None,
            authorization_url: None,
            token_url: None,
            scopes: None,
            name: Some("Authorization".to_string()),
            location: Some("header".to_string()),
        };

        let mut definitions = SecurityDefinitions::new();
        definitions.insert(JWT_DEFINITION_NAME.to_string(), scheme);
        Ok(definitions)
    }

    fn generate_for_route(&self, ctx: &RouteContext<'_>) -> Vec<SecurityRequirement> {
        if !ctx.has_auth() {
            return Vec::new();
        }

        let mut requirement = SecurityRequirement::new();
        requirement.insert(JWT_DEFINITION_NAME.to_string(), Vec::new());
        vec![requirement]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotations;
    use crate::metadata::{Action, HttpMethod};
    use serde_json::json;

    fn context<'r>(route: &'r RouteDescriptor) -> RouteContext<'r> {
        RouteContext {
            route,
            method: HttpMethod::Get,
            path: route.uri(),
            annotations: Annotations::default(),
            model: None,
            validator: None,
            exceptions: Vec::new(),
        }
    }

    fn oauth_config(flow: &str) -> VersionConfig {
        VersionConfig {
            parse_security: true,
            auth_flow: flow.to_string(),
            host: "https://shop.test/".to_string(),
            ..Default::default()
        }
    }

    fn oauth_routes() -> Vec<RouteDescriptor> {
        vec![RouteDescriptor::new(
            "oauth/token",
            vec![HttpMethod::Post],
            Action::Closure,
        )]
    }

    #[test]
    fn test_disabled_security_creates_no_generator() {
        let config = VersionConfig::default();

        assert!(create_generator(&config).unwrap().is_none());
    }

    #[test]
    fn test_invalid_flow_is_rejected() {
        let result = create_generator(&oauth_config("clientCredentials"));

        assert!(matches!(result, Err(Error::InvalidAuthFlow(_))));
    }

    #[test]
    fn test_access_code_flow_has_both_urls() {
        let generator = OAuthSecurityDefinitionsGenerator::new(&oauth_config("accessCode")).unwrap();
        let definitions = generator.generate(&oauth_routes()).unwrap();

        assert_eq!(
            serde_json::to_value(&definitions).unwrap(),
            json!({
                "OAuth2": {
                    "type": "oauth2",
                    "flow": "accessCode",
                    "authorizationUrl": "shop.test/oauth/authorize",
                    "tokenUrl": "shop.test/oauth/token",
                    "scopes": {}
                }
            })
        );
    }

    #[test]
    fn test_password_and_implicit_flows() {
        let password = OAuthSecurityDefinitionsGenerator::new(&oauth_config("password"))
            .unwrap()
            .generate(&oauth_routes())
            .unwrap();
        assert!(password["OAuth2"].authorization_url.is_none());
        assert!(password["OAuth2"].token_url.is_some());

        let implicit = OAuthSecurityDefinitionsGenerator::new(&oauth_config("implicit"))
            .unwrap()
            .generate(&oauth_routes())
            .unwrap();
        assert!(implicit["OAuth2"].authorization_url.is_some());
        assert!(implicit["OAuth2"].token_url.is_none());
    }

    #[test]
    fn test_missing_oauth_routes() {
        let generator = OAuthSecurityDefinitionsGenerator::new(&oauth_config("password")).unwrap();
        let routes = vec![RouteDescriptor::new("users", vec![HttpMethod::Get], Action::Closure)];

        assert!(matches!(
            generator.generate(&routes),
            Err(Error::MissingOAuthRoutes { .. })
        ));
    }

    #[test]
    fn test_oauth_scopes_from_last_scope_middleware() {
        let generator = OAuthSecurityDefinitionsGenerator::new(&oauth_config("password")).unwrap();
        let route = RouteDescriptor::new("users", vec![HttpMethod::Get], Action::Closure)
            .with_middleware(
                MiddlewareDescriptor::parse("scopes:user-read").with_resolved(Some(
                    "Laravel\\Passport\\Http\\Middleware\\CheckScopes".to_string(),
                )),
            )
            .with_middleware(
                MiddlewareDescriptor::parse("scope:user-read,user-write").with_resolved(Some(
                    "Laravel\\Passport\\Http\\Middleware\\CheckForAnyScope".to_string(),
                )),
            )
            .with_middleware(MiddlewareDescriptor::parse("throttle:60,1"));

        let requirements = generator.generate_for_route(&context(&route));

        assert_eq!(
            serde_json::to_value(&requirements).unwrap(),
            json!([{"OAuth2": ["user-read", "user-write"]}])
        );
    }

    #[test]
    fn test_oauth_route_without_scopes() {
        let generator = OAuthSecurityDefinitionsGenerator::new(&oauth_config("password")).unwrap();
        let route = RouteDescriptor::new("users", vec![HttpMethod::Get], Action::Closure)
            .with_middleware(MiddlewareDescriptor::parse("auth:api"));

        assert!(generator.generate_for_route(&context(&route)).is_empty());
    }

    #[test]
    fn test_jwt_definitions() {
        let definitions = JwtSecurityDefinitionsGenerator.generate(&[]).unwrap();

        assert_eq!(
            serde_json::to_value(&definitions).unwrap(),
            json!({"Bearer": {"type": "apiKey", "name": "Authorization", "in": "header"}})
        );
    }

    #[test]
    fn test_jwt_requirement_follows_auth_middleware() {
        let protected = RouteDescriptor::new("users", vec![HttpMethod::Get], Action::Closure)
            .with_middleware(MiddlewareDescriptor::parse("auth:api"));
        let public = RouteDescriptor::new("users", vec![HttpMethod::Get], Action::Closure);

        assert_eq!(
            serde_json::to_value(JwtSecurityDefinitionsGenerator.generate_for_route(&context(&protected)))
                .unwrap(),
            json!([{"Bearer": []}])
        );
        assert!(JwtSecurityDefinitionsGenerator
            .generate_for_route(&context(&public))
            .is_empty());
    }
}
