//! Resource serialization formats.
//!
//! Two codecs exist: YAML (the tree-native format) and JSON (pretty-printed,
//! trailing newline). The format of a resource is selected once, from the
//! file extension at load time or explicitly at creation time, and never
//! changes afterwards.

use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use thiserror::Error;

use crate::resource::{Namespace, Translation};

/// Errors produced by format detection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported file extension: '{0}'")]
    UnsupportedExtension(String),

    #[error("Unknown resource format name: '{0}'")]
    UnknownFormatName(String),
}

/// The serialization format of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFormat {
    Yaml,
    Json,
}

impl ResourceFormat {
    /// Infer the format from a file path's extension.
    ///
    /// Recognizes `.yml`, `.yaml` and `.json`; anything else is an error.
    pub fn from_path(path: &Path) -> Result<ResourceFormat, FormatError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "yml" | "yaml" => Ok(ResourceFormat::Yaml),
            "json" => Ok(ResourceFormat::Json),
            _ => Err(FormatError::UnsupportedExtension(extension)),
        }
    }

    /// The canonical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ResourceFormat::Yaml => "yml",
            ResourceFormat::Json => "json",
        }
    }

    /// Decode a document into a namespace tree.
    ///
    /// The document root must be a mapping. Values that are neither strings
    /// nor mappings are skipped, as are mapping entries with non-string keys;
    /// neither is an error.
    pub fn decode(&self, text: &str) -> Result<Namespace> {
        match self {
            ResourceFormat::Yaml => {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(text).context("Failed to parse YAML document")?;
                match value {
                    // An empty file parses as null; treat it as an empty document.
                    serde_yaml::Value::Null => Ok(Namespace::new()),
                    serde_yaml::Value::Mapping(mapping) => Ok(namespace_from_yaml(&mapping)),
                    _ => bail!("YAML document root must be a mapping"),
                }
            }
            ResourceFormat::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(text).context("Failed to parse JSON document")?;
                match value {
                    serde_json::Value::Object(object) => Ok(namespace_from_json(&object)),
                    _ => bail!("JSON document root must be an object"),
                }
            }
        }
    }

    /// Encode a namespace tree into document text.
    ///
    /// JSON output is pretty-printed and ends with a trailing newline; YAML
    /// output is the serializer's native block style.
    pub fn encode(&self, root: &Namespace) -> Result<String> {
        match self {
            ResourceFormat::Yaml => {
                let value = namespace_to_yaml(root);
                serde_yaml::to_string(&value).context("Failed to encode YAML document")
            }
            ResourceFormat::Json => {
                let value = namespace_to_json(root);
                let mut text =
                    serde_json::to_string_pretty(&value).context("Failed to encode JSON document")?;
                text.push('\n');
                Ok(text)
            }
        }
    }
}

impl FromStr for ResourceFormat {
    type Err = FormatError;

    fn from_str(name: &str) -> Result<ResourceFormat, FormatError> {
        match name.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => Ok(ResourceFormat::Yaml),
            "json" => Ok(ResourceFormat::Json),
            other => Err(FormatError::UnknownFormatName(other.to_string())),
        }
    }
}

// ==================== Value conversions ====================

fn namespace_from_yaml(mapping: &serde_yaml::Mapping) -> Namespace {
    let mut namespace = Namespace::new();
    for (key, value) in mapping {
        let Some(key) = key.as_str() else { continue };
        match value {
            serde_yaml::Value::String(text) => {
                namespace.insert(key.to_string(), Translation::Text(text.clone()));
            }
            serde_yaml::Value::Mapping(child) => {
                namespace.insert(
                    key.to_string(),
                    Translation::Namespace(namespace_from_yaml(child)),
                );
            }
            // Numbers, booleans, nulls, sequences: not valid leaves, skipped.
            _ => {}
        }
    }
    namespace
}

fn namespace_from_json(object: &serde_json::Map<String, serde_json::Value>) -> Namespace {
    let mut namespace = Namespace::new();
    for (key, value) in object {
        match value {
            serde_json::Value::String(text) => {
                namespace.insert(key.clone(), Translation::Text(text.clone()));
            }
            serde_json::Value::Object(child) => {
                namespace.insert(
                    key.clone(),
                    Translation::Namespace(namespace_from_json(child)),
                );
            }
            _ => {}
        }
    }
    namespace
}

fn namespace_to_yaml(namespace: &Namespace) -> serde_yaml::Value {
    let mut mapping = serde_yaml::Mapping::new();
    for (key, value) in namespace {
        let value = match value {
            Translation::Text(text) => serde_yaml::Value::String(text.clone()),
            Translation::Namespace(child) => namespace_to_yaml(child),
        };
        mapping.insert(serde_yaml::Value::String(key.clone()), value);
    }
    serde_yaml::Value::Mapping(mapping)
}

fn namespace_to_json(namespace: &Namespace) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    for (key, value) in namespace {
        let value = match value {
            Translation::Text(text) => serde_json::Value::String(text.clone()),
            Translation::Namespace(child) => namespace_to_json(child),
        };
        object.insert(key.clone(), value);
    }
    serde_json::Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // ==================== Format Detection Tests ====================

    #[test]
    fn test_from_path_yaml_extensions() {
        assert_eq!(
            ResourceFormat::from_path(&PathBuf::from("common.yml")),
            Ok(ResourceFormat::Yaml)
        );
        assert_eq!(
            ResourceFormat::from_path(&PathBuf::from("nested/deep.yaml")),
            Ok(ResourceFormat::Yaml)
        );
        assert_eq!(
            ResourceFormat::from_path(&PathBuf::from("UPPER.YML")),
            Ok(ResourceFormat::Yaml)
        );
    }

    #[test]
    fn test_from_path_json_extension() {
        assert_eq!(
            ResourceFormat::from_path(&PathBuf::from("app.json")),
            Ok(ResourceFormat::Json)
        );
    }

    #[test]
    fn test_from_path_unrecognized_extension_is_an_error() {
        assert_eq!(
            ResourceFormat::from_path(&PathBuf::from("notes.txt")),
            Err(FormatError::UnsupportedExtension("txt".to_string()))
        );
        assert_eq!(
            ResourceFormat::from_path(&PathBuf::from("Makefile")),
            Err(FormatError::UnsupportedExtension(String::new()))
        );
    }

    #[test]
    fn test_from_str_names() {
        assert_eq!("yaml".parse(), Ok(ResourceFormat::Yaml));
        assert_eq!("yml".parse(), Ok(ResourceFormat::Yaml));
        assert_eq!("JSON".parse(), Ok(ResourceFormat::Json));
        assert!("toml".parse::<ResourceFormat>().is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(ResourceFormat::Yaml.extension(), "yml");
        assert_eq!(ResourceFormat::Json.extension(), "json");
    }

    // ==================== Decode Tests ====================

    #[test]
    fn test_decode_yaml_nested_mapping() {
        let root = ResourceFormat::Yaml
            .decode("greeting: Hello\nnav:\n  home: Home\n")
            .expect("should decode");

        assert_eq!(
            root.get("greeting"),
            Some(&Translation::Text("Hello".to_string()))
        );
        match root.get("nav") {
            Some(Translation::Namespace(nav)) => {
                assert_eq!(nav.get("home"), Some(&Translation::Text("Home".to_string())));
            }
            other => panic!("Expected nav namespace, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_yaml_empty_document() {
        let root = ResourceFormat::Yaml.decode("").expect("should decode");
        assert!(root.is_empty());
    }

    #[test]
    fn test_decode_yaml_skips_non_string_leaves() {
        let root = ResourceFormat::Yaml
            .decode("count: 42\nenabled: true\nempty: null\nitems:\n  - a\ngreeting: Hello\n")
            .expect("should decode");

        // Only the string leaf survives; the rest is skipped, not an error.
        assert_eq!(root.len(), 1);
        assert_eq!(
            root.get("greeting"),
            Some(&Translation::Text("Hello".to_string()))
        );
    }

    #[test]
    fn test_decode_yaml_non_mapping_root_is_an_error() {
        assert!(ResourceFormat::Yaml.decode("- just\n- a\n- list\n").is_err());
        assert!(ResourceFormat::Yaml.decode("plain scalar").is_err());
    }

    #[test]
    fn test_decode_json_nested_object() {
        let root = ResourceFormat::Json
            .decode(r#"{"greeting": "Hello", "nav": {"home": "Home"}}"#)
            .expect("should decode");

        assert_eq!(root.len(), 2);
        assert_eq!(
            root.get("greeting"),
            Some(&Translation::Text("Hello".to_string()))
        );
    }

    #[test]
    fn test_decode_json_skips_non_string_leaves() {
        let root = ResourceFormat::Json
            .decode(r#"{"count": 3, "greeting": "Hi", "flags": [true]}"#)
            .expect("should decode");

        assert_eq!(root.len(), 1);
        assert!(root.contains_key("greeting"));
    }

    #[test]
    fn test_decode_json_invalid_text_is_an_error() {
        assert!(ResourceFormat::Json.decode("not json at all").is_err());
        assert!(ResourceFormat::Json.decode(r#"["array", "root"]"#).is_err());
    }

    #[test]
    fn test_decode_preserves_document_order() {
        let root = ResourceFormat::Yaml
            .decode("zebra: Z\napple: A\nmango: M\n")
            .expect("should decode");

        let keys: Vec<&String> = root.keys().collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
    }

    // ==================== Encode Tests ====================

    #[test]
    fn test_encode_yaml_roundtrip() {
        let text = "greeting: Hello\nnav:\n  home: Home\n  about: About\n";
        let root = ResourceFormat::Yaml.decode(text).expect("should decode");
        let encoded = ResourceFormat::Yaml.encode(&root).expect("should encode");
        let reparsed = ResourceFormat::Yaml.decode(&encoded).expect("should reparse");
        assert_eq!(reparsed, root);
    }

    #[test]
    fn test_encode_json_is_pretty_with_trailing_newline() {
        let root = ResourceFormat::Json
            .decode(r#"{"nav": {"home": "Home"}}"#)
            .expect("should decode");
        let encoded = ResourceFormat::Json.encode(&root).expect("should encode");

        assert!(encoded.ends_with('\n'));
        assert!(encoded.contains("  \"nav\""), "expected indentation: {}", encoded);

        let reparsed = ResourceFormat::Json.decode(&encoded).expect("should reparse");
        assert_eq!(reparsed, root);
    }

    #[test]
    fn test_encode_preserves_key_order() {
        let root = ResourceFormat::Json
            .decode(r#"{"zebra": "Z", "apple": "A"}"#)
            .expect("should decode");
        let encoded = ResourceFormat::Json.encode(&root).expect("should encode");

        let zebra = encoded.find("zebra").expect("zebra present");
        let apple = encoded.find("apple").expect("apple present");
        assert!(zebra < apple, "document order should be preserved: {}", encoded);
    }
}
