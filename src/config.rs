//! Analyzer configuration.
//!
//! The configuration carries the capability vocabulary the call pattern matcher
//! recognizes, the verb method names, the example synthesis settings and any
//! extra external types the binder should accept. It is loaded once at startup
//! from TOML and then shared read-only by every component.
//!
//! ```toml
//! require-pub-fields = false
//!
//! [capability]
//! name = "rest"
//! request-type = "Request"
//!
//! [synthesis]
//! seed = 0
//! min-slice-len = 3
//! max-slice-len = 7
//!
//! [external-types]
//! "rust_decimal::Decimal" = "string"
//! ```

use crate::error::{Error, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name looked up in the module root when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "restdoc.toml";

pub const DEFAULT_CAPABILITY: &str = "rest";
pub const DEFAULT_REQUEST_TYPE: &str = "Request";
pub const DEFAULT_SEED: u64 = 0;
pub const DEFAULT_ROUTE_DIRECTIVE: &str = "+route";

/// Top-level analyzer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Response-construction and request-parameter vocabulary
    pub capability: Vocabulary,
    /// Method names treated as HTTP verbs
    pub verbs: VerbNames,
    /// Example synthesis settings
    pub synthesis: SynthesisConfig,
    /// Extra external types, mapped from full path to a scalar name
    pub external_types: BTreeMap<String, String>,
    /// Only `pub` fields are documented when set
    pub require_pub_fields: bool,
    /// Doc-comment prefix declaring a resource URL
    pub route_directive: RouteDirective,
}

/// The fixed capability surface the call pattern matcher recognizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Vocabulary {
    /// Base identifier (and crate name) of the response facility
    pub name: String,
    pub json: String,
    pub json_error: String,
    pub json_errorf: String,
    pub json_success: String,
    /// Type whose methods count as parameter accessors
    pub request_type: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            name: DEFAULT_CAPABILITY.to_string(),
            json: "json".to_string(),
            json_error: "json_error".to_string(),
            json_errorf: "json_errorf".to_string(),
            json_success: "json_success".to_string(),
            request_type: DEFAULT_REQUEST_TYPE.to_string(),
        }
    }
}

/// Method names bound to the four documented HTTP verbs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerbNames {
    pub get: String,
    pub post: String,
    pub put: String,
    pub delete: String,
}

impl Default for VerbNames {
    fn default() -> Self {
        Self {
            get: "get".to_string(),
            post: "post".to_string(),
            put: "put".to_string(),
            delete: "delete".to_string(),
        }
    }
}

/// Settings for the example synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SynthesisConfig {
    pub seed: u64,
    pub min_slice_len: usize,
    pub max_slice_len: usize,
    /// Nesting depth after which generation fails
    pub max_depth: usize,
    /// Maximum number of filled values per example
    pub max_nodes: usize,
    /// Wall-clock budget per example in milliseconds
    pub timeout_ms: u64,
    pub string_placeholder: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            min_slice_len: 3,
            max_slice_len: 7,
            max_depth: 32,
            max_nodes: 10_000,
            timeout_ms: 2_000,
            string_placeholder: "string".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteDirective(pub String);

impl Default for RouteDirective {
    fn default() -> Self {
        Self(DEFAULT_ROUTE_DIRECTIVE.to_string())
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, `restdoc.toml` in the module
    /// root is used when present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>, module_root: &Path) -> Result<Self> {
        let candidate = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = module_root.join(CONFIG_FILE_NAME);
                default_path.is_file().then_some(default_path)
            }
        };

        let config = match candidate {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&content)?
            }
            None => {
                debug!("No configuration file, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let synthesis = &self.synthesis;
        if synthesis.min_slice_len > synthesis.max_slice_len {
            return Err(Error::Config(format!(
                "min-slice-len ({}) exceeds max-slice-len ({})",
                synthesis.min_slice_len, synthesis.max_slice_len
            )));
        }
        if self.capability.name.is_empty() {
            return Err(Error::Config("capability name must not be empty".to_string()));
        }
        Ok(())
    }
}
