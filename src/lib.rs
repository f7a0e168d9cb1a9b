//! restdoc - resource documentation from Rust REST modules.
//!
//! This library statically analyzes a module of REST resources and reports, per resource and
//! per HTTP verb, the method's documentation, the request parameters it consults and every
//! response shape it can return, each with a structural schema and a synthesized example.
//!
//! A resource is any module-level `struct` or `enum`; its `get`, `post`, `put` and `delete`
//! methods are the verbs. Responses are the calls to the response facility (`rest::json`,
//! `rest::json_error`, `rest::json_errorf`, `rest::json_success`) found in return position,
//! and parameters are the string arguments of method calls on `rest::Request`.
//!
//! # Architecture
//!
//! The analysis is a single sequential pass:
//!
//! 1. [`scanner`] and [`parser`] - load and parse every source file of the module
//! 2. [`detector`] - find the names the response facility is imported under
//! 3. [`binder`] - resolve declarations and expressions into a [`type_graph`]
//! 4. [`discoverer`] - turn declarations into resources and attach verb methods
//! 5. [`matcher`] - collect responses and parameters from method bodies
//! 6. [`schema_renderer`] and [`synthesizer`] - describe and exemplify each response
//! 7. [`emitter`] - assemble the report, which [`serializer`] writes as JSON or YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use restdoc::config::Config;
//! use restdoc::serializer::serialize_json;
//! use restdoc::{analyze_module, AnalyzeOptions};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let document = analyze_module(Path::new("./my-service"), &config, &AnalyzeOptions::default()).unwrap();
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod binder;
pub mod cli;
pub mod config;
pub mod detector;
pub mod discoverer;
pub mod emitter;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod resource;
pub mod response;
pub mod scanner;
pub mod schema_renderer;
pub mod serializer;
pub mod synthesizer;
pub mod type_graph;

use binder::TypeBinder;
use config::Config;
use detector::CapabilityDetector;
use discoverer::ResourceDiscoverer;
use emitter::{ApiDocument, DocumentBuilder};
use error::Result;
use log::info;
use matcher::CallPatternMatcher;
use parser::{AstParser, SourceSet};
use std::path::Path;
use synthesizer::{ExampleSynthesizer, FillerRegistry};

/// Options that shape the report but not the analysis
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Leave out resources that implement no verb
    pub skip_empty: bool,
}

/// Loads the module at `root` and analyzes it with the built-in example fillers
pub fn analyze_module(root: &Path, config: &Config, options: &AnalyzeOptions) -> Result<ApiDocument> {
    let sources = AstParser::load_module(root)?;
    analyze(&sources, config, options)
}

/// Analyzes already loaded sources with the built-in example fillers
pub fn analyze(sources: &SourceSet, config: &Config, options: &AnalyzeOptions) -> Result<ApiDocument> {
    analyze_with_fillers(sources, config, options, FillerRegistry::with_builtin())
}

/// Analyzes `sources`, producing examples with `fillers`.
///
/// # Errors
///
/// Fails on the first type or expression that cannot be resolved. Example synthesis never
/// fails the run; its diagnostics are embedded as example text.
pub fn analyze_with_fillers(
    sources: &SourceSet,
    config: &Config,
    options: &AnalyzeOptions,
    fillers: FillerRegistry,
) -> Result<ApiDocument> {
    let aliases = CapabilityDetector::detect(sources, &config.capability);

    let mut binder = TypeBinder::new(sources, config)?;
    let discovered = ResourceDiscoverer::discover(&mut binder)?;
    let resources = CallPatternMatcher::new(&mut binder, &aliases).match_resources(discovered)?;
    let graph = binder.into_graph();
    info!("Resolved {} types", graph.len());

    let synthesizer = ExampleSynthesizer::new(&graph, &config.synthesis, fillers);
    let mut builder = DocumentBuilder::new(&graph, synthesizer).skip_empty(options.skip_empty);
    for resource in &resources {
        builder.add_resource(resource);
    }
    Ok(builder.build())
}
