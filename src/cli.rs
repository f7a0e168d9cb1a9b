use crate::config::Config;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::{analyze, AnalyzeOptions};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// restdoc - Generate resource documentation with schemas and examples from a Rust REST module
#[derive(Parser, Debug)]
#[command(name = "restdoc")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the module directory (a crate directory uses its `src/`)
    #[arg(value_name = "MODULE_PATH")]
    pub module_path: PathBuf,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(value_name = "OUTPUT")]
    pub output_path: Option<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Configuration file (defaults to restdoc.toml in the module path, if present)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Seed for example generation, overriding the configuration
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,

    /// Leave out resources that implement no verb
    #[arg(long = "skip-empty")]
    pub skip_empty: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.module_path.exists() {
        anyhow::bail!("Module path does not exist: {}", args.module_path.display());
    }

    if !args.module_path.is_dir() {
        anyhow::bail!("Module path is not a directory: {}", args.module_path.display());
    }

    if let Some(ref config) = args.config_path {
        if !config.is_file() {
            anyhow::bail!("Configuration file does not exist: {}", config.display());
        }
    }

    info!("Module path: {}", args.module_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::parser::AstParser;

    info!("Starting documentation generation...");

    // Step 1: Load configuration
    let mut config = Config::load(args.config_path.as_deref(), &args.module_path)
        .context("Failed to load configuration")?;
    if let Some(seed) = args.seed {
        debug!("Seed overridden from the command line: {}", seed);
        config.synthesis.seed = seed;
    }
    debug!("Configuration: {:?}", config);

    // Step 2: Load and parse the module
    let sources = AstParser::load_module(&args.module_path)
        .with_context(|| format!("Failed to load module {}", args.module_path.display()))?;
    if sources.files.is_empty() {
        log::warn!("No Rust files found in {}", args.module_path.display());
    }

    // Step 3: Analyze resources
    let options = AnalyzeOptions {
        skip_empty: args.skip_empty,
    };
    let document = analyze(&sources, &config, &options).context("Analysis failed")?;

    // Step 4: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Json => serialize_json(&document)?,
        OutputFormat::Yaml => serialize_yaml(&document)?,
    };

    // Step 5: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    // Step 6: Display summary
    let methods: usize = document
        .resources
        .values()
        .map(|r| [&r.get, &r.post, &r.put, &r.delete].iter().filter(|m| m.is_some()).count())
        .sum();
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files parsed: {}", sources.files.len());
    info!("  - Resources: {}", document.resources.len());
    info!("  - Verb methods: {}", methods);

    Ok(())
}
