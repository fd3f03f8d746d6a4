use thiserror::Error;

/// Result type alias for the generator
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the generator
///
/// Every variant is fatal for the generation run that raised it. Best-effort
/// failures (docblock parsing, example instances) never surface here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid OAuth flow passed: {0}")]
    InvalidAuthFlow(String),

    #[error("No OAuth2 route defined, expected {token} or {authorize} in the route table")]
    MissingOAuthRoutes {
        token: &'static str,
        authorize: &'static str,
    },

    #[error("No error definition mapped for exception {exception} (route {route})")]
    MissingErrorMapping { exception: String, route: String },

    #[error("Error definitions map HTTP code {0} more than once")]
    DuplicateErrorMapping(u16),

    #[error("{model} @model must reference a known data model")]
    NotAModel { model: String },

    #[error("The appends of model {model} must be a list of field names")]
    InvalidAppends { model: String },

    #[error("Invalid generated file name: {0}")]
    InvalidFileName(String),

    #[error("API version not configured: {0}")]
    VersionNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
