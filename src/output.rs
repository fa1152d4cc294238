//! Rendering resolved properties for display.
//!
//! The INI form prints `key=value` per line. When more than one target was
//! resolved, each block is headed by `[target]`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::EditorConfigError;
use crate::types::PropertyMap;

/// Resolved properties for one or more targets, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub entries: Vec<(PathBuf, PropertyMap)>,
}

impl Report {
    pub fn push(&mut self, target: PathBuf, properties: PropertyMap) {
        self.entries.push((target, properties));
    }

    /// JSON rendering. A single target prints its property object directly;
    /// several targets print an object keyed by target path.
    pub fn to_json(&self) -> Result<String, EditorConfigError> {
        if let [(_, properties)] = self.entries.as_slice() {
            return Ok(serde_json::to_string_pretty(properties)?);
        }
        let keyed: BTreeMap<String, &PropertyMap> = self
            .entries
            .iter()
            .map(|(target, properties)| (target.display().to_string(), properties))
            .collect();
        Ok(serde_json::to_string_pretty(&keyed)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headed = self.entries.len() > 1;
        let mut first = true;
        for (target, properties) in &self.entries {
            if headed {
                if !first {
                    writeln!(f)?;
                }
                write!(f, "[{}]", target.display())?;
                first = false;
            }
            for (key, value) in properties {
                if !first {
                    writeln!(f)?;
                }
                write!(f, "{key}={value}")?;
                first = false;
            }
        }
        Ok(())
    }
}
