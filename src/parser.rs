use crate::error::{Error, Result};
use crate::scanner::FileScanner;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Module path of a file or inline module, relative to the module root.
///
/// The root module (`lib.rs` / `main.rs`) has an empty path.
pub type ModulePath = Vec<String>;

/// Source loader for the module under analysis.
///
/// The `AstParser` uses the `syn` crate to parse Rust source code into syntax trees. Unlike a
/// best-effort scan, loading a module is all-or-nothing: documentation is generated from code
/// assumed to compile, so the first syntax error aborts the run.
///
/// # Example
///
/// ```no_run
/// use restdoc::parser::AstParser;
/// use std::path::Path;
///
/// let sources = AstParser::load_module(Path::new("./my-service")).unwrap();
/// println!("Loaded {} files", sources.files.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Module path the file defines
    pub module_path: ModulePath,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

/// All parsed files of one logical module.
///
/// The set is the shared reference table for cross-file resolution: files are addressed by
/// their index in `files`, which never changes after loading.
#[derive(Debug, Default)]
pub struct SourceSet {
    /// Root directory the module paths are relative to
    pub root: PathBuf,
    pub files: Vec<ParsedFile>,
}

impl SourceSet {
    pub fn new(root: PathBuf, files: Vec<ParsedFile>) -> Self {
        Self { root, files }
    }
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust syntax. Syntax
    /// errors carry the line and column reported by `syn`.
    pub fn parse_file(path: &Path, module_path: ModulePath) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)?;
        let syntax_tree =
            syn::parse_file(&content).map_err(|e| Error::parse(path.to_path_buf(), &e))?;

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.to_path_buf(),
            module_path,
            syntax_tree,
        })
    }

    /// Loads every source file of the module rooted at `root`.
    ///
    /// When `root` is a crate directory (it has a `Cargo.toml` and a `src/` directory), the
    /// crate's `src/` directory becomes the module root.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be read or parsed; no partial set is returned.
    pub fn load_module(root: &Path) -> Result<SourceSet> {
        let module_root = Self::module_root(root);
        info!("Loading module from {}", module_root.display());

        let scanner = FileScanner::new(module_root.clone());
        let scan_result = scanner.scan()?;

        let mut files = Vec::with_capacity(scan_result.rust_files.len());
        for path in &scan_result.rust_files {
            let module_path = Self::module_path_for(&module_root, path);
            files.push(Self::parse_file(path, module_path)?);
        }

        info!("Parsed {} files", files.len());
        Ok(SourceSet::new(module_root, files))
    }

    /// Resolves the directory module paths are computed from
    pub fn module_root(root: &Path) -> PathBuf {
        let src = root.join("src");
        if root.join("Cargo.toml").is_file() && src.is_dir() {
            src
        } else {
            root.to_path_buf()
        }
    }

    /// Derives the module path defined by `file`.
    ///
    /// `lib.rs`, `main.rs` and `mod.rs` define their directory's module; any other file
    /// `foo.rs` defines the child module `foo`.
    pub fn module_path_for(root: &Path, file: &Path) -> ModulePath {
        let relative = file.strip_prefix(root).unwrap_or(file);
        let mut segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        if let Some(last) = segments.pop() {
            let stem = last.strip_suffix(".rs").unwrap_or(&last).to_string();
            let is_dir_module = matches!(stem.as_str(), "mod")
                || (segments.is_empty() && matches!(stem.as_str(), "lib" | "main"));
            if !is_dir_module {
                segments.push(stem);
            }
        }

        segments
    }
}

/// Extracts the text of `///` documentation comments.
///
/// Each `#[doc = "..."]` attribute contributes one line with a single leading space removed.
/// Leading and trailing blank lines are dropped.
pub fn doc_text(attrs: &[syn::Attribute]) -> String {
    let mut lines = Vec::new();

    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(name_value) = &attr.meta {
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(text),
                ..
            }) = &name_value.value
            {
                let value = text.value();
                for line in value.lines() {
                    let line = line.strip_prefix(' ').unwrap_or(line);
                    lines.push(line.trim_end().to_string());
                }
            }
        }
    }

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}
