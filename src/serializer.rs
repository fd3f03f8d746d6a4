//! Serialization module for converting Swagger documents to YAML or JSON format.
//!
//! This module provides functions to serialize documents into standard formats
//! and write them to files or return them as strings.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use clap::ValueEnum;
use log::debug;
use std::fs;
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl Format {
    /// File extension of the format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }
}

/// Serializes a document in the requested format
pub fn serialize(doc: &OpenApiDocument, format: Format) -> Result<String> {
    match format {
        Format::Json => serialize_json(doc),
        Format::Yaml => serialize_yaml(doc),
    }
}

/// Serializes a Swagger document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing Swagger document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize Swagger document to YAML")
}

/// Serializes a Swagger document to JSON format with pretty printing.
///
/// The output is indented for readability, making it suitable for human review
/// and version control.
///
/// # Example
///
/// ```ignore
/// use swagger_from_routes::config::VersionConfig;
/// use swagger_from_routes::openapi_builder::OpenApiBuilder;
/// use swagger_from_routes::serializer::serialize_json;
///
/// let doc = OpenApiBuilder::new(VersionConfig::default())?.build();
/// let json = serialize_json(&doc)?;
/// println!("{}", json);
/// ```
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing Swagger document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize Swagger document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Parent
/// directories are created as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VersionConfig;
    use crate::openapi_builder::OpenApiBuilder;
    use tempfile::TempDir;

    /// Helper function to create a minimal document for testing
    fn create_test_document() -> OpenApiDocument {
        let config = VersionConfig {
            title: "Test API".to_string(),
            description: "A test API".to_string(),
            host: "http://api.test".to_string(),
            ..Default::default()
        };
        OpenApiBuilder::new(config).unwrap().build()
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("swagger: '2.0'") || yaml.contains("swagger: \"2.0\""));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("host: api.test"));
        assert!(yaml.contains("basePath:"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["swagger"], "2.0");
        assert_eq!(parsed["info"]["title"], "Test API");
        assert_eq!(parsed["info"]["description"], "A test API");
        assert!(parsed["paths"].is_object());
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.contains('\n'));
        assert!(json.lines().count() > 5, "Pretty printed JSON should have multiple lines");
    }

    #[test]
    fn test_json_keys_keep_document_order() {
        let json = serialize_json(&create_test_document()).unwrap();

        let swagger = json.find("\"swagger\"").unwrap();
        let info = json.find("\"info\"").unwrap();
        let paths = json.find("\"paths\"").unwrap();
        assert!(swagger < info && info < paths);
    }

    #[test]
    fn test_serialize_by_format() {
        let doc = create_test_document();

        assert!(serialize(&doc, Format::Json).unwrap().starts_with('{'));
        assert!(!serialize(&doc, Format::Yaml).unwrap().starts_with('{'));
        assert_eq!(Format::Yaml.extension(), "yaml");
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("public").join("docs").join("swagger.json");

        write_to_file("{}", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("swagger.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_roundtrip_yaml_serialization() {
        let doc = create_test_document();
        let yaml = serialize_yaml(&doc).unwrap();

        let deserialized: OpenApiDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(deserialized, doc);
    }
}
