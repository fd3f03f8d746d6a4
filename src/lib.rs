//! Swagger from routes - Swagger 2.0 documents from an application's own metadata.
//!
//! The generator never inspects source code. Everything it knows comes from a
//! metadata provider: the route table, the doc comments of controller actions,
//! the validation rules of request validators and the shape of data models.
//! From those it synthesizes paths, parameters, responses, definitions and
//! security requirements.
//!
//! # Architecture
//!
//! 1. [`metadata`] - Provider traits and the manifest-backed implementation
//! 2. [`annotation`] - Doc comment parsing (`@model`, `@throws`, `@deprecated`)
//! 3. [`context`] - Per route × method resolution of everything above
//! 4. [`parameters`] - Path, query and body parameters from URIs and rules
//! 5. [`definitions`] - Model schemas and error definitions
//! 6. [`responses`] - Success and error responses of an operation
//! 7. [`security`] - OAuth2 and JWT security definitions
//! 8. [`openapi_builder`] - Assembles the complete document
//! 9. [`versions`] - Version selection and output file names
//! 10. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use swagger_from_routes::{
//!     config::VersionConfig,
//!     metadata::manifest::Manifest,
//!     openapi_builder::OpenApiBuilder,
//!     serializer::serialize_json,
//! };
//! use std::path::Path;
//!
//! let manifest = Manifest::from_path(Path::new("app.yaml")).unwrap();
//! let document = OpenApiBuilder::new(VersionConfig::default())
//!     .unwrap()
//!     .generate(&manifest)
//!     .unwrap();
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod cli;
pub mod config;
pub mod context;
pub mod definitions;
pub mod error;
pub mod metadata;
pub mod openapi_builder;
pub mod parameters;
pub mod responses;
pub mod schema;
pub mod security;
pub mod serializer;
pub mod versions;
