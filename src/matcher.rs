//! Property lookup against a single configuration file.
//!
//! Useful when the caller already holds one file's contents and knows which
//! directory it belongs to: no directory walk, no cache, every target is
//! answered from the same parsed sections.

use std::path::Path;

use crate::error::EditorConfigError;
use crate::file::DEFAULT_CONFIG_NAME;
use crate::merge;
use crate::parse;
use crate::types::{ConfigFile, PropertyMap};

#[derive(Debug, Clone)]
pub struct FileMatcher {
    file: ConfigFile,
    drop_unset: bool,
}

impl FileMatcher {
    /// Treat `contents` as the configuration file located in `dir`.
    pub fn new(dir: impl AsRef<Path>, contents: &[u8]) -> Result<Self, EditorConfigError> {
        let name = dir
            .as_ref()
            .join(DEFAULT_CONFIG_NAME)
            .to_string_lossy()
            .into_owned();
        let sections = parse::parse_bytes(&name, contents)?;
        Ok(Self {
            file: ConfigFile::new(name, sections.into()),
            drop_unset: true,
        })
    }

    /// Keep `unset` as a literal value instead of removing the key.
    pub fn keep_unset(mut self) -> Self {
        self.drop_unset = false;
        self
    }

    pub fn properties(&self, target: impl AsRef<Path>) -> PropertyMap {
        merge::resolve_properties(
            target.as_ref(),
            std::slice::from_ref(&self.file),
            self.drop_unset,
            None,
        )
    }
}
