use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the analysis library
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Any of these aborts the run before output is written.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error in {} at {line}:{column}: {message}", .file.display())]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("cannot resolve in module `{module}`: {message}")]
    Bind { module: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Builds a bind error for the module at `module_path`
    pub fn bind(module_path: &[String], message: impl Into<String>) -> Self {
        let module = if module_path.is_empty() {
            "crate".to_string()
        } else {
            format!("crate::{}", module_path.join("::"))
        };
        Error::Bind {
            module,
            message: message.into(),
        }
    }

    /// Builds a parse error from a syn error, keeping its location
    pub fn parse(file: PathBuf, err: &syn::Error) -> Self {
        let start = err.span().start();
        Error::Parse {
            file,
            line: start.line,
            column: start.column + 1,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
