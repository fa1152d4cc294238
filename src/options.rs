use std::path::{Path, PathBuf};

use confique::Config;

use crate::error::EditorConfigError;
use crate::file::DEFAULT_CONFIG_NAME;

/// Knobs for a resolution. Every field has a default, so an empty file or
/// environment yields [`ResolveOptions::default()`].
#[derive(Config, Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// Name of the configuration file looked up in each directory.
    #[config(default = ".editorconfig", env = "EDITORCONFIG_NAME")]
    pub config_name: String,

    /// Remove keys whose value is `unset` instead of keeping the string.
    #[config(default = true, env = "EDITORCONFIG_UNSET")]
    pub unset: bool,

    /// Highest directory consulted. The walk never goes above it.
    #[config(env = "EDITORCONFIG_ROOT")]
    pub root: Option<PathBuf>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            unset: true,
            root: None,
        }
    }
}

impl ResolveOptions {
    /// Defaults overridden by `EDITORCONFIG_*` environment variables.
    pub fn from_env() -> Result<Self, EditorConfigError> {
        Ok(Self::builder().env().load()?)
    }

    /// Options from a TOML file, with environment variables taking priority.
    pub fn from_file(path: &Path) -> Result<Self, EditorConfigError> {
        Ok(Self::builder().env().file(path).load()?)
    }
}
