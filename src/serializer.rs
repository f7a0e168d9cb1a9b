//! Serialization of the documentation report to JSON or YAML.
//!
//! This module turns an [`ApiDocument`] into text and writes it to a file or returns it as
//! a string. JSON is the default output format of the command-line tool.

use crate::emitter::ApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a documentation report to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &ApiDocument) -> Result<String> {
    debug!("Serializing documentation to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize documentation to YAML")
}

/// Serializes a documentation report to JSON with pretty printing.
///
/// Resources are ordered by qualified path, so the output is stable across runs and
/// suitable for version control.
///
/// # Example
///
/// ```
/// use restdoc::emitter::ApiDocument;
/// use restdoc::serializer::serialize_json;
/// use std::collections::BTreeMap;
///
/// let doc = ApiDocument { resources: BTreeMap::new() };
/// assert_eq!(serialize_json(&doc).unwrap(), "{\n  \"Resources\": {}\n}");
/// ```
pub fn serialize_json(doc: &ApiDocument) -> Result<String> {
    debug!("Serializing documentation to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize documentation to JSON")
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::{MethodDoc, ResourceDoc, ResponseDoc};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    /// Helper function to create a small report for testing
    fn create_test_document() -> ApiDocument {
        let get = MethodDoc {
            doc: "Returns one user.".to_string(),
            params: vec!["age".to_string()],
            responses: vec![ResponseDoc {
                schema: "{\n\tname: string\n}".to_string(),
                example: "{\n  \"name\": \"string\"\n}".to_string(),
            }],
        };
        let resource = ResourceDoc {
            name: "UserResource".to_string(),
            doc: "Manages users.".to_string(),
            url: Some("/user/{age}".to_string()),
            get: Some(get),
            post: None,
            put: None,
            delete: None,
        };
        let mut resources = BTreeMap::new();
        resources.insert("users::UserResource".to_string(), resource);
        ApiDocument { resources }
    }

    #[test]
    fn test_serialize_yaml() {
        let doc = create_test_document();
        let yaml = serialize_yaml(&doc).unwrap();

        assert!(yaml.contains("Resources:"));
        assert!(yaml.contains("users::UserResource"));
        assert!(yaml.contains("Name: UserResource"));
        assert!(yaml.contains("Post: null"));
        assert!(yaml.contains("Params:"));
    }

    #[test]
    fn test_serialize_json() {
        let doc = create_test_document();
        let json = serialize_json(&doc).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let resource = &parsed["Resources"]["users::UserResource"];
        assert_eq!(resource["Url"], "/user/{age}");
        assert_eq!(resource["Get"]["Params"][0], "age");
        assert_eq!(resource["Get"]["Responses"][0]["Schema"], "{\n\tname: string\n}");
        assert!(resource["Delete"].is_null());
    }

    #[test]
    fn test_serialize_json_field_order() {
        let doc = create_test_document();
        let json = serialize_json(&doc).unwrap();

        let name = json.find("\"Name\"").unwrap();
        let url = json.find("\"Url\"").unwrap();
        let get = json.find("\"Get\"").unwrap();
        let delete = json.find("\"Delete\"").unwrap();
        assert!(name < url && url < get && get < delete);
        assert!(json.lines().count() > 5, "Pretty printed JSON should have multiple lines");
    }

    #[test]
    fn test_url_omitted_when_absent() {
        let mut doc = create_test_document();
        if let Some(resource) = doc.resources.get_mut("users::UserResource") {
            resource.url = None;
        }
        let json = serialize_json(&doc).unwrap();
        assert!(!json.contains("\"Url\""));
    }

    #[test]
    fn test_write_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("api.json");
        let content = "test content";

        write_to_file(content, &file_path).unwrap();

        let read_content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(read_content, content);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("api.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert!(file_path.exists());
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("api.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        let read_content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(read_content, "new content");
    }

    #[test]
    fn test_roundtrip_yaml_serialization() {
        let doc = create_test_document();
        let yaml = serialize_yaml(&doc).unwrap();

        let deserialized: ApiDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(deserialized, doc);
    }

    #[test]
    fn test_write_json_file_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("api.json");

        let doc = create_test_document();
        write_to_file(&serialize_json(&doc).unwrap(), &file_path).unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        let deserialized: ApiDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(deserialized.resources["users::UserResource"].name, "UserResource");
    }
}
