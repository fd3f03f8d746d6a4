//! Swagger generator - command-line tool for documenting an application's HTTP API.
//!
//! Reads an application manifest (routes, controller doc comments, validation
//! rules and data models) and writes one Swagger 2.0 document per configured
//! API version.
//!
//! # Usage
//!
//! ```bash
//! swagger-from-routes [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Print the default version as JSON:
//! ```bash
//! swagger-from-routes app.yaml -c swagger.yaml
//! ```
//!
//! Write every version as YAML into `public/`:
//! ```bash
//! swagger-from-routes app.yaml -c swagger.yaml --all-versions -f yaml -o public
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! swagger-from-routes app.yaml -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swagger_from_routes::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Swagger generator starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
