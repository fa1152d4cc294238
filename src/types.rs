use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

/// One section of a configuration file: the selector heading it and the raw
/// assignments that follow, in file order.
///
/// `selector` is `None` for the preamble (everything before the first
/// `[...]` line). Keys are already lowercased; values are stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSection {
    pub selector: Option<String>,
    pub properties: Vec<(String, String)>,
}

impl RawSection {
    pub fn new(selector: Option<String>) -> Self {
        Self {
            selector,
            properties: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Assign `key`, keeping the position of an earlier assignment of the
    /// same key.
    pub fn set(&mut self, key: String, value: String) {
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((key, value)),
        }
    }
}

/// A parsed configuration file, named by its path (or any caller-chosen name
/// for pre-supplied contents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub name: String,
    pub sections: Arc<[RawSection]>,
}

impl ConfigFile {
    pub fn new(name: impl Into<String>, sections: Arc<[RawSection]>) -> Self {
        Self {
            name: name.into(),
            sections,
        }
    }

    /// Directory selectors in this file are relative to.
    pub fn dir(&self) -> &Path {
        Path::new(&self.name).parent().unwrap_or(Path::new(""))
    }

    /// True when the preamble declares `root = true`.
    pub fn is_root(&self) -> bool {
        self.sections
            .iter()
            .find(|s| s.selector.is_none())
            .and_then(|s| s.get("root"))
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Raw contents of one configuration file, supplied by the caller instead of
/// being discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub name: String,
    pub contents: Vec<u8>,
}

impl ConfigSource {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// A section that matched the target during a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visited {
    pub file_name: String,
    pub selector: String,
}

/// A resolved property value after coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(i64),
    String(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

/// The effective properties for one target file. Absent keys are
/// unspecified.
pub type PropertyMap = BTreeMap<String, PropertyValue>;
