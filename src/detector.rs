use crate::config::Vocabulary;
use crate::parser::SourceSet;
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};
use syn::{Item, UseTree};

/// Capability detector for finding the names the response facility goes by.
///
/// The `CapabilityDetector` examines `use` and `extern crate` items, including those inside
/// inline modules, for the configured capability crate. A file may refer to it by its own
/// name or through any number of renames:
///
/// - `use rest as api;`
/// - `use rest::{self as api};`
/// - `extern crate rest as api;`
pub struct CapabilityDetector;

/// Identifiers naming the capability, per file
#[derive(Debug, Clone, Default)]
pub struct CapabilityAliases {
    capability: String,
    by_file: HashMap<usize, BTreeSet<String>>,
    /// Whether any file imports the capability at all
    pub imported: bool,
}

impl CapabilityAliases {
    /// Whether `ident` names the capability in the file at `file`
    pub fn is_capability(&self, file: usize, ident: &str) -> bool {
        ident == self.capability
            || self
                .by_file
                .get(&file)
                .is_some_and(|aliases| aliases.contains(ident))
    }

    /// Aliases declared in one file, excluding the capability name itself
    pub fn aliases(&self, file: usize) -> impl Iterator<Item = &str> {
        self.by_file
            .get(&file)
            .into_iter()
            .flat_map(|aliases| aliases.iter().map(String::as_str))
    }
}

impl CapabilityDetector {
    /// Collects capability aliases across all files of `sources`.
    ///
    /// A module that never imports the capability is not an error: with 2018-edition paths
    /// `rest::json(..)` needs no `use`. A warning is logged since it usually means the
    /// configured capability name is wrong.
    pub fn detect(sources: &SourceSet, vocabulary: &Vocabulary) -> CapabilityAliases {
        debug!("Detecting capability `{}` in {} files", vocabulary.name, sources.files.len());

        let mut result = CapabilityAliases {
            capability: vocabulary.name.clone(),
            ..CapabilityAliases::default()
        };

        for (file_idx, parsed_file) in sources.files.iter().enumerate() {
            let mut aliases = BTreeSet::new();
            Self::check_items(&parsed_file.syntax_tree.items, &vocabulary.name, &mut aliases, &mut result.imported);
            if !aliases.is_empty() {
                debug!("{}: capability aliases {:?}", parsed_file.path.display(), aliases);
                result.by_file.insert(file_idx, aliases);
            }
        }

        if !result.imported {
            warn!(
                "No file imports `{}`; only fully qualified `{}::..` calls will be recognized",
                vocabulary.name, vocabulary.name
            );
        }
        result
    }

    fn check_items(items: &[Item], capability: &str, aliases: &mut BTreeSet<String>, imported: &mut bool) {
        for item in items {
            match item {
                Item::Use(use_item) => {
                    Self::check_use_tree(&use_item.tree, capability, true, aliases, imported);
                }
                Item::ExternCrate(krate) if krate.ident == capability => {
                    *imported = true;
                    if let Some((_, rename)) = &krate.rename {
                        if rename != "_" {
                            aliases.insert(rename.to_string());
                        }
                    }
                }
                Item::Mod(module) => {
                    if let Some((_, content)) = &module.content {
                        Self::check_items(content, capability, aliases, imported);
                    }
                }
                _ => {}
            }
        }
    }

    /// Recursively check a use tree. `at_root` is true until the first path segment.
    fn check_use_tree(
        tree: &UseTree,
        capability: &str,
        at_root: bool,
        aliases: &mut BTreeSet<String>,
        imported: &mut bool,
    ) {
        match tree {
            UseTree::Path(path) => {
                if at_root && path.ident == capability {
                    *imported = true;
                    // `use rest::{self as api}`
                    Self::check_self_renames(&path.tree, aliases);
                }
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    Self::check_use_tree(item, capability, at_root, aliases, imported);
                }
            }
            UseTree::Rename(rename) => {
                if at_root && rename.ident == capability {
                    *imported = true;
                    if rename.rename != "_" {
                        aliases.insert(rename.rename.to_string());
                    }
                }
            }
            UseTree::Name(name) => {
                if at_root && name.ident == capability {
                    *imported = true;
                }
            }
            UseTree::Glob(_) => {}
        }
    }

    fn check_self_renames(tree: &UseTree, aliases: &mut BTreeSet<String>) {
        match tree {
            UseTree::Rename(rename) if rename.ident == "self" && rename.rename != "_" => {
                aliases.insert(rename.rename.to_string());
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    Self::check_self_renames(item, aliases);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AstParser, ParsedFile};
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    /// Helper function to parse a file and return ParsedFile
    fn parse_test_file(dir: &TempDir, name: &str, content: &str) -> ParsedFile {
        let file_path = create_temp_file(dir, name, content);
        AstParser::parse_file(&file_path, vec![name.trim_end_matches(".rs").to_string()]).unwrap()
    }

    fn detect(files: Vec<ParsedFile>) -> CapabilityAliases {
        let sources = SourceSet::new(PathBuf::from("."), files);
        CapabilityDetector::detect(&sources, &Vocabulary::default())
    }

    #[test]
    fn test_detect_plain_import() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            use rest::{json, Request};

            pub struct UserResource;
        "#;

        let result = detect(vec![parse_test_file(&temp_dir, "users.rs", code)]);

        assert!(result.imported);
        assert!(result.is_capability(0, "rest"));
        assert_eq!(result.aliases(0).count(), 0);
    }

    #[test]
    fn test_detect_renamed_import() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            use rest as api;
            use api::Request;
        "#;

        let result = detect(vec![parse_test_file(&temp_dir, "renamed.rs", code)]);

        assert!(result.imported);
        assert!(result.is_capability(0, "api"));
        assert!(result.is_capability(0, "rest"));
        assert!(!result.is_capability(0, "Request"));
    }

    #[test]
    fn test_detect_extern_crate_and_self_rename() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            extern crate rest as web;
            use rest::{self as http, Request};
        "#;

        let result = detect(vec![parse_test_file(&temp_dir, "legacy.rs", code)]);

        let aliases: Vec<&str> = result.aliases(0).collect();
        assert_eq!(aliases, vec!["http", "web"]);
    }

    #[test]
    fn test_aliases_are_per_file() {
        let temp_dir = TempDir::new().unwrap();
        let first = parse_test_file(&temp_dir, "first.rs", "use rest as api;");
        let second = parse_test_file(&temp_dir, "second.rs", "pub fn api() {}");

        let result = detect(vec![first, second]);

        assert!(result.is_capability(0, "api"));
        assert!(!result.is_capability(1, "api"));
    }

    #[test]
    fn test_detect_inside_inline_module() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            mod handlers {
                use rest as r;
            }
        "#;

        let result = detect(vec![parse_test_file(&temp_dir, "nested.rs", code)]);

        assert!(result.is_capability(0, "r"));
    }

    #[test]
    fn test_detect_ignores_nested_segments() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            use other::rest as not_it;
            use serde::{Serialize, Deserialize};
        "#;

        let result = detect(vec![parse_test_file(&temp_dir, "other.rs", code)]);

        assert!(!result.imported);
        assert!(!result.is_capability(0, "not_it"));
    }

    #[test]
    fn test_detect_empty_file_list() {
        let result = detect(Vec::new());

        assert!(!result.imported);
        assert!(result.is_capability(0, "rest"));
    }
}
