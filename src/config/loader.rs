//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::node::{ConfigNode, NodeValue, SourceLocation};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// `.yaml` and `.yml` are YAML, everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Toml,
        }
    }
}

/// Load a configuration document into a node tree.
pub fn load_document(path: &Path) -> Result<ConfigNode, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, DocumentFormat::from_path(path), Some(path))
}

/// Parse an in-memory document. `file` is only used for diagnostics.
pub fn parse_document(
    content: &str,
    format: DocumentFormat,
    file: Option<&Path>,
) -> Result<ConfigNode, ConfigError> {
    let root = SourceLocation::root(file);
    match format {
        DocumentFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(content)?;
            Ok(from_yaml(value, root))
        }
        DocumentFormat::Toml => {
            let table: toml::Table = toml::from_str(content)?;
            Ok(from_toml(toml::Value::Table(table), root))
        }
    }
}

fn flag(b: bool) -> &'static str {
    if b {
        "ON"
    } else {
        "OFF"
    }
}

fn from_yaml(value: serde_yaml::Value, location: SourceLocation) -> ConfigNode {
    use serde_yaml::Value;

    let value = match value {
        Value::Null => NodeValue::Null,
        Value::Bool(b) => NodeValue::Scalar(flag(b).to_string()),
        Value::Number(n) => NodeValue::Scalar(n.to_string()),
        Value::String(s) => NodeValue::Scalar(s),
        Value::Sequence(items) => NodeValue::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| from_yaml(item, location.child(format!("[{}]", i))))
                .collect(),
        ),
        Value::Mapping(mapping) => NodeValue::Mapping(
            mapping
                .into_iter()
                .map(|(k, v)| {
                    let key = yaml_key(k);
                    let node = from_yaml(v, location.child(key.clone()));
                    (key, node)
                })
                .collect(),
        ),
        Value::Tagged(tagged) => {
            let tagged = *tagged;
            return from_yaml(tagged.value, location);
        }
    };

    ConfigNode { location, value }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match key {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => format!("{:?}", other),
    }
}

fn from_toml(value: toml::Value, location: SourceLocation) -> ConfigNode {
    use toml::Value;

    let value = match value {
        Value::String(s) => NodeValue::Scalar(s),
        Value::Integer(i) => NodeValue::Scalar(i.to_string()),
        Value::Float(f) => NodeValue::Scalar(f.to_string()),
        Value::Boolean(b) => NodeValue::Scalar(flag(b).to_string()),
        Value::Datetime(dt) => NodeValue::Scalar(dt.to_string()),
        Value::Array(items) => NodeValue::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| from_toml(item, location.child(format!("[{}]", i))))
                .collect(),
        ),
        Value::Table(table) => NodeValue::Mapping(
            table
                .into_iter()
                .map(|(key, v)| {
                    let node = from_toml(v, location.child(key.clone()));
                    (key, node)
                })
                .collect(),
        ),
    };

    ConfigNode { location, value }
}
