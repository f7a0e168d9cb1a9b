use crate::error::{Error, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into
const SKIPPED_DIRS: &[&str] = &["target"];

/// Lists the source files of a module tree.
///
/// Build output (`target/`) and hidden directories are pruned. The listing is sorted by
/// path, which fixes the order declarations are discovered in and keeps reports stable.
///
/// # Example
///
/// ```no_run
/// use restdoc::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-service/src"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Source files found under a module root
pub struct ScanResult {
    /// `.rs` files in path order
    pub rust_files: Vec<PathBuf>,
    /// Entries that could not be read; the walk goes on without them
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Walks the module tree.
    ///
    /// # Errors
    ///
    /// Fails only when the root is not a directory. Unreadable entries below it are
    /// logged and reported in [`ScanResult::warnings`].
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("module root is not a directory: {}", self.root_path.display()),
            )));
        }

        let mut result = ScanResult {
            rust_files: Vec::new(),
            warnings: Vec::new(),
        };

        // Depth-first with sorted siblings yields files in path order
        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry));

        for entry in walker {
            match entry {
                Ok(entry) if is_source_file(&entry) => result.rust_files.push(entry.into_path()),
                Ok(_) => {}
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    result.warnings.push(err.to_string());
                }
            }
        }

        debug!(
            "Found {} source files under {}",
            result.rust_files.len(),
            self.root_path.display()
        );
        Ok(result)
    }
}

fn is_pruned(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn is_source_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "rs")
}
