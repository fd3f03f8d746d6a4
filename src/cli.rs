use crate::config::{SwaggerConfig, VersionConfig};
use crate::metadata::manifest::Manifest;
use crate::openapi_builder::OpenApiBuilder;
use crate::serializer::{serialize, write_to_file, Format};
use crate::versions::{DocsManager, ALL_VERSIONS};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

/// Swagger generator - builds Swagger 2.0 documents from an application manifest
#[derive(Parser, Debug)]
#[command(name = "swagger-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the application manifest (JSON or YAML)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Generator configuration file (defaults apply when absent)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub format: Format,

    /// Version to generate (defaults to the configured default version, "*" for all)
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Generate every configured version
    #[arg(long = "all-versions")]
    pub all_versions: bool,

    /// Only document routes whose URI starts with this prefix (defaults to the base path)
    #[arg(long = "filter", value_name = "PREFIX")]
    pub filter: Option<String>,

    /// Output directory (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.is_file() {
        anyhow::bail!("Manifest file does not exist: {}", args.manifest_path.display());
    }

    if let Some(ref config) = args.config_path {
        if !config.is_file() {
            anyhow::bail!("Configuration file does not exist: {}", config.display());
        }
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.format);
    match &args.output_dir {
        Some(dir) => info!("Output directory: {}", dir.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Load the configuration file, or the defaults when none was given
pub fn load_config(args: &CliArgs) -> Result<SwaggerConfig> {
    match &args.config_path {
        Some(path) => SwaggerConfig::from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(SwaggerConfig::default()),
    }
}

/// The versions selected by `--all-versions` / `--api-version`
pub fn versions_to_generate(args: &CliArgs, manager: &DocsManager) -> Result<Vec<VersionConfig>> {
    if args.all_versions {
        return Ok(manager.all_versions());
    }

    let version = args
        .api_version
        .as_deref()
        .unwrap_or_else(|| manager.default_version());
    let versions = manager.filter_versions(version);
    if versions.is_empty() && version != ALL_VERSIONS {
        anyhow::bail!("API version not configured: {}", version);
    }
    Ok(versions)
}

/// Route prefix filter of a version: the explicit filter, else its base path
fn route_filter(args: &CliArgs, version: &VersionConfig) -> Option<String> {
    args.filter.clone().or_else(|| {
        let base_path = version.base_path.trim();
        (!base_path.is_empty() && base_path != "/").then(|| base_path.to_string())
    })
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");

    // Step 1: Load configuration and manifest
    let config = load_config(&args)?;
    let manifest = Manifest::from_path(&args.manifest_path)
        .with_context(|| format!("Failed to load manifest from {}", args.manifest_path.display()))?;
    info!("Loaded manifest with {} routes", manifest.routes.len());

    // Step 2: Select versions
    let manager = DocsManager::new(config);
    let versions = versions_to_generate(&args, &manager)?;
    info!("Generating {} version(s)", versions.len());

    // Step 3: Generate, serialize and output each version
    for version in versions {
        let app_version = version.app_version.clone();
        let filter = route_filter(&args, &version);

        let mut builder = OpenApiBuilder::new(version)
            .with_context(|| format!("Invalid configuration for version {}", app_version))?;
        if let Some(prefix) = filter {
            debug!("Filtering routes by prefix {}", prefix);
            builder = builder.with_route_filter(prefix);
        }

        let document = builder
            .generate(&manifest)
            .with_context(|| format!("Failed to generate version {}", app_version))?;
        info!(
            "Version {}: {} paths, {} definitions",
            app_version,
            document.paths.len(),
            document.definitions.len()
        );

        let content = serialize(&document, args.format)?;

        match &args.output_dir {
            Some(dir) => {
                let file_name = manager.file_name(&app_version, args.format)?;
                let path = dir.join(file_name);
                write_to_file(&content, &path)?;
                info!("Successfully wrote version {} to {}", app_version, path.display());
            }
            None => println!("{}", content),
        }
    }

    info!("Generation complete!");
    Ok(())
}
