//! restdoc - command-line tool for documenting Rust REST resource modules.
//!
//! The tool analyzes a module's resources and prints, per resource and verb, the
//! documentation, consulted parameters and response schemas with example payloads.
//!
//! # Usage
//!
//! ```bash
//! restdoc [OPTIONS] <MODULE_PATH> [OUTPUT]
//! ```
//!
//! # Examples
//!
//! Print JSON documentation to stdout:
//! ```bash
//! restdoc ./my-service
//! ```
//!
//! Write YAML documentation to a file:
//! ```bash
//! restdoc ./my-service docs/api.yaml -f yaml
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! restdoc ./my-service -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use restdoc::cli;

fn main() -> Result<()> {
    // Parse once so the verbose flag can configure the logger before validation logs
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("restdoc starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
