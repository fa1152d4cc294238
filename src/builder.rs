use std::future::Future;
use std::path::{Path, PathBuf};

use crate::cache::SectionCache;
use crate::error::EditorConfigError;
use crate::file::{self, AsyncFileSource, ChainSpec, FileSource, FsSource};
use crate::merge;
use crate::options::ResolveOptions;
use crate::types::{ConfigFile, ConfigSource, PropertyMap, Visited};

/// Entry point for resolving properties.
pub struct EditorConfig;

impl EditorConfig {
    pub fn builder<'a>() -> EditorConfigBuilder<'a> {
        EditorConfigBuilder::new()
    }
}

/// Builder for one resolution.
///
/// Holds the [`ResolveOptions`] plus two borrowed collaborators that outlive
/// the call: an optional [`SectionCache`] shared between resolutions, and an
/// optional list that receives every section that matched.
///
/// The same chain yields the same result in every mode: the filesystem
/// ([`resolve`](Self::resolve)), any [`FileSource`]
/// ([`resolve_with`](Self::resolve_with)), any [`AsyncFileSource`]
/// ([`resolve_async`](Self::resolve_async)), or files supplied up front
/// ([`resolve_from_files`](Self::resolve_from_files)).
pub struct EditorConfigBuilder<'a> {
    options: ResolveOptions,
    cache: Option<&'a dyn SectionCache>,
    visited: Option<&'a mut Vec<Visited>>,
}

impl<'a> EditorConfigBuilder<'a> {
    fn new() -> Self {
        Self {
            options: ResolveOptions::default(),
            cache: None,
            visited: None,
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the configuration file name (default: `.editorconfig`).
    pub fn config_name(mut self, name: &str) -> Self {
        self.options.config_name = name.to_string();
        self
    }

    /// Never look above `dir`, even without a `root = true` marker.
    pub fn root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.root = Some(dir.into());
        self
    }

    /// Keep `unset` as a literal value instead of removing the key.
    pub fn keep_unset(mut self) -> Self {
        self.options.unset = false;
        self
    }

    /// Reuse parsed files across resolutions.
    pub fn cache(mut self, cache: &'a dyn SectionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Record every matching (file, selector) pair, in application order.
    pub fn visited(mut self, visited: &'a mut Vec<Visited>) -> Self {
        self.visited = Some(visited);
        self
    }

    /// Resolve `target` against configuration files on the local filesystem.
    pub fn resolve(self, target: impl AsRef<Path>) -> Result<PropertyMap, EditorConfigError> {
        self.resolve_with(target, &FsSource)
    }

    /// Resolve `target` reading configuration files through `source`.
    pub fn resolve_with(
        self,
        target: impl AsRef<Path>,
        source: &dyn FileSource,
    ) -> Result<PropertyMap, EditorConfigError> {
        let target = absolute(target.as_ref())?;
        let chain = file::load_chain(&target, self.chain_spec(), source)?;
        Ok(self.finish(&target, &chain))
    }

    /// Resolve `target` reading configuration files through an async
    /// `source`, one directory at a time.
    pub async fn resolve_async(
        self,
        target: impl AsRef<Path>,
        source: &dyn AsyncFileSource,
    ) -> Result<PropertyMap, EditorConfigError> {
        let target = absolute(target.as_ref())?;
        let chain = file::load_chain_async(&target, self.chain_spec(), source).await?;
        Ok(self.finish(&target, &chain))
    }

    /// Resolve `target` against files supplied by the caller, nearest
    /// directory first. No directory walk happens; the `config_name` and
    /// `root` options are ignored.
    pub fn resolve_from_files(
        self,
        target: impl AsRef<Path>,
        sources: &[ConfigSource],
    ) -> Result<PropertyMap, EditorConfigError> {
        let target = absolute(target.as_ref())?;
        let chain = file::chain_from_sources(sources, self.cache)?;
        Ok(self.finish(&target, &chain))
    }

    /// Like [`resolve_from_files`](Self::resolve_from_files), waiting for
    /// the files to arrive first.
    pub async fn resolve_from_files_async<F>(
        self,
        target: impl AsRef<Path>,
        sources: F,
    ) -> Result<PropertyMap, EditorConfigError>
    where
        F: Future<Output = Result<Vec<ConfigSource>, EditorConfigError>>,
    {
        let sources = sources.await?;
        self.resolve_from_files(target, &sources)
    }

    fn chain_spec(&self) -> ChainSpec<'_> {
        ChainSpec {
            config_name: &self.options.config_name,
            boundary: self.options.root.as_deref(),
            cache: self.cache,
        }
    }

    fn finish(self, target: &Path, chain: &[ConfigFile]) -> PropertyMap {
        merge::resolve_properties(target, chain, self.options.unset, self.visited)
    }
}

fn absolute(target: &Path) -> Result<PathBuf, EditorConfigError> {
    if target.is_absolute() {
        return Ok(target.to_path_buf());
    }
    std::path::absolute(target).map_err(|e| EditorConfigError::Io {
        path: target.to_path_buf(),
        source: e,
    })
}
