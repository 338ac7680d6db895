//! Generic configuration tree handed to the configurator.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a node lives: the document it came from and its key path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    file: Option<Arc<PathBuf>>,
    keys: Vec<String>,
}

impl SourceLocation {
    /// Location of a document root.
    pub fn root(file: Option<&Path>) -> Self {
        Self {
            file: file.map(|p| Arc::new(p.to_path_buf())),
            keys: Vec::new(),
        }
    }

    /// Location of the value stored under `key` below this one.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut keys = self.keys.clone();
        keys.push(key.into());
        Self {
            file: self.file.clone(),
            keys,
        }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref().map(PathBuf::as_path)
    }

    /// Key path from the document root.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}: ", file.display())?;
        }
        if self.keys.is_empty() {
            return write!(f, "<root>");
        }
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, " > ")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

/// Value of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Scalar(String),
    /// Entries in document order.
    Mapping(Vec<(String, ConfigNode)>),
    Sequence(Vec<ConfigNode>),
    /// An empty value (`key:` with nothing after it, or an empty file).
    Null,
}

/// A located node of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    pub location: SourceLocation,
    pub value: NodeValue,
}

impl ConfigNode {
    pub fn scalar(location: SourceLocation, value: impl Into<String>) -> Self {
        Self {
            location,
            value: NodeValue::Scalar(value.into()),
        }
    }

    pub fn mapping(location: SourceLocation, entries: Vec<(String, ConfigNode)>) -> Self {
        Self {
            location,
            value: NodeValue::Mapping(entries),
        }
    }

    /// The scalar token, if this node is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.value {
            NodeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The mapping entries, if this node is a mapping.
    ///
    /// A null node reads as an empty mapping.
    pub fn entries(&self) -> Option<&[(String, ConfigNode)]> {
        match &self.value {
            NodeValue::Mapping(entries) => Some(entries),
            NodeValue::Null => Some(&[]),
            _ => None,
        }
    }

    /// Short description of the node kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self.value {
            NodeValue::Scalar(_) => "scalar",
            NodeValue::Mapping(_) => "mapping",
            NodeValue::Sequence(_) => "sequence",
            NodeValue::Null => "null",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let root = SourceLocation::root(Some(Path::new("proxy.yaml")));
        assert_eq!(root.to_string(), "proxy.yaml: <root>");

        let loc = root.child("hosts").child("example.com").child("proxy.timeout.io");
        assert_eq!(
            loc.to_string(),
            "proxy.yaml: hosts > example.com > proxy.timeout.io"
        );
        assert_eq!(loc.keys().len(), 3);
    }

    #[test]
    fn test_location_without_file() {
        let loc = SourceLocation::root(None).child("paths");
        assert_eq!(loc.to_string(), "paths");
        assert!(loc.file().is_none());
    }

    #[test]
    fn test_node_accessors() {
        let loc = SourceLocation::root(None);
        let leaf = ConfigNode::scalar(loc.child("a"), "ON");
        let node = ConfigNode::mapping(loc, vec![("a".to_string(), leaf.clone())]);

        assert_eq!(leaf.as_scalar(), Some("ON"));
        assert!(leaf.entries().is_none());
        assert_eq!(node.entries().unwrap().len(), 1);
        assert_eq!(node.kind(), "mapping");
    }
}
