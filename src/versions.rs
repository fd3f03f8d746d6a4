//! Selection of the API versions to generate and their output file names.

use crate::config::{SwaggerConfig, VersionConfig};
use crate::error::{Error, Result};
use crate::serializer::Format;
use once_cell::sync::Lazy;
use regex::Regex;

static VALID_FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-_.\w]+$").expect("file name pattern is valid"));

/// Version selector matching every configured version
pub const ALL_VERSIONS: &str = "*";

/// Builds the output file name of a version
pub type FileNameStrategy = Box<dyn Fn(&str, Format) -> String>;

fn default_file_name(version: &str, format: Format) -> String {
    format!("swagger-{}.{}", version, format.extension())
}

pub struct DocsManager {
    config: SwaggerConfig,
    file_names: FileNameStrategy,
}

impl DocsManager {
    pub fn new(config: SwaggerConfig) -> Self {
        Self {
            config,
            file_names: Box::new(default_file_name),
        }
    }

    /// Replace the `swagger-{version}.{ext}` naming
    pub fn with_file_name_strategy<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&str, Format) -> String + 'static,
    {
        self.file_names = Box::new(strategy);
        self
    }

    pub fn default_version(&self) -> &str {
        &self.config.default_version
    }

    pub fn default_version_config(&self) -> Result<VersionConfig> {
        self.find_version_config(&self.config.default_version)
    }

    /// The first version configured as `version`, with shared info filled in
    pub fn find_version_config(&self, version: &str) -> Result<VersionConfig> {
        self.filter_versions(version)
            .into_iter()
            .next()
            .ok_or_else(|| Error::VersionNotFound(version.to_string()))
    }

    /// All versions configured as `version`; `*` selects every version
    pub fn filter_versions(&self, version: &str) -> Vec<VersionConfig> {
        self.config
            .versions
            .iter()
            .filter(|v| version == ALL_VERSIONS || v.app_version == version)
            .map(|v| self.with_shared_info(v))
            .collect()
    }

    pub fn all_versions(&self) -> Vec<VersionConfig> {
        self.filter_versions(ALL_VERSIONS)
    }

    /// Output file name of a version, restricted to `[-_.\w]` characters
    pub fn file_name(&self, version: &str, format: Format) -> Result<String> {
        let name = (self.file_names)(version, format);
        if !VALID_FILE_NAME.is_match(&name) {
            return Err(Error::InvalidFileName(name));
        }
        Ok(name)
    }

    /// Fill title, description and host a version leaves blank
    fn with_shared_info(&self, version: &VersionConfig) -> VersionConfig {
        let mut version = version.clone();
        if version.title.is_empty() {
            version.title = self.config.title.clone();
        }
        if version.description.is_empty() {
            version.description = self.config.description.clone();
        }
        if version.host.is_empty() {
            version.host = self.config.host.clone();
        }
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SwaggerConfig {
        SwaggerConfig {
            title: "Shop API".to_string(),
            description: "Shop".to_string(),
            host: "https://shop.test".to_string(),
            default_version: "2.0.0".to_string(),
            versions: vec![
                VersionConfig {
                    app_version: "1.0.0".to_string(),
                    ..Default::default()
                },
                VersionConfig {
                    app_version: "2.0.0".to_string(),
                    title: "Shop API v2".to_string(),
                    base_path: "/v2".to_string(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_default_version_config() {
        let manager = DocsManager::new(config());
        let version = manager.default_version_config().unwrap();

        assert_eq!(version.app_version, "2.0.0");
        assert_eq!(version.base_path, "/v2");
        assert_eq!(version.title, "Shop API v2");
        assert_eq!(version.description, "Shop");
        assert_eq!(version.host, "https://shop.test");
    }

    #[test]
    fn test_find_unknown_version() {
        let manager = DocsManager::new(config());

        assert!(matches!(
            manager.find_version_config("3.0.0"),
            Err(Error::VersionNotFound(_))
        ));
    }

    #[test]
    fn test_filter_versions() {
        let manager = DocsManager::new(config());

        assert_eq!(manager.filter_versions("1.0.0").len(), 1);
        assert_eq!(manager.filter_versions("*").len(), 2);
        assert!(manager.filter_versions("9").is_empty());
        assert_eq!(manager.all_versions()[0].title, "Shop API");
    }

    #[test]
    fn test_default_file_name() {
        let manager = DocsManager::new(config());

        assert_eq!(manager.file_name("1.0.0", Format::Json).unwrap(), "swagger-1.0.0.json");
        assert_eq!(manager.file_name("1.0.0", Format::Yaml).unwrap(), "swagger-1.0.0.yaml");
    }

    #[test]
    fn test_custom_file_name_strategy() {
        let manager = DocsManager::new(config())
            .with_file_name_strategy(|version, format| format!("api_{}.{}", version, format.extension()));

        assert_eq!(manager.file_name("2.0.0", Format::Json).unwrap(), "api_2.0.0.json");
    }

    #[test]
    fn test_invalid_file_name_is_rejected() {
        let manager = DocsManager::new(config())
            .with_file_name_strategy(|version, _| format!("../docs/{}.json", version));

        assert!(matches!(
            manager.file_name("1.0.0", Format::Json),
            Err(Error::InvalidFileName(_))
        ));
    }
}
