//! Clap adapter.
//!
//! Compiled only with the `clap` feature (on by default). [`ResolveArgs`] is
//! a clap derive struct you can flatten into your own parser or use as a
//! whole command line. [`ResolveArgs::run`] resolves every listed file from
//! the local filesystem and renders the result.
//!
//! Flags layer on top of the [`ResolveOptions`] passed in, so options loaded
//! from a file or the environment are only overridden by flags the user
//! actually gave.

use std::path::PathBuf;

use clap::Args;

use crate::builder::EditorConfig;
use crate::error::EditorConfigError;
use crate::options::ResolveOptions;
use crate::output::Report;

/// Clap-derived args for resolving properties of one or more files.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     resolve: ResolveArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Files to resolve properties for.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Configuration file name to look for in each directory.
    #[arg(short = 'f', long = "config-name")]
    pub config_name: Option<String>,

    /// Do not look for configuration files above this directory.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Keep `unset` values instead of removing the key.
    #[arg(long)]
    pub keep_unset: bool,

    /// Print JSON instead of `key=value` lines.
    #[arg(long)]
    pub json: bool,
}

impl ResolveArgs {
    /// Apply the flags that were given on top of `options`.
    pub fn apply(&self, mut options: ResolveOptions) -> ResolveOptions {
        if let Some(name) = &self.config_name {
            options.config_name = name.clone();
        }
        if let Some(root) = &self.root {
            options.root = Some(root.clone());
        }
        if self.keep_unset {
            options.unset = false;
        }
        options
    }

    /// Resolve every file and render the combined output.
    pub fn run(&self, options: ResolveOptions) -> Result<String, EditorConfigError> {
        let options = self.apply(options);
        let mut report = Report::default();
        for file in &self.files {
            let properties = EditorConfig::builder()
                .options(options.clone())
                .resolve(file)?;
            report.push(file.clone(), properties);
        }
        if self.json {
            report.to_json()
        } else {
            Ok(report.to_string())
        }
    }
}
