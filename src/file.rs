//! Configuration file discovery: the directory chain for one target.
//!
//! Starting at the directory containing the target, each ancestor is asked
//! for `{dir}/{config_name}` through a [`FileSource`] (or, in async mode, an
//! [`AsyncFileSource`]). The walk stops after a file whose preamble says
//! `root = true`, at an explicit boundary directory, or at the filesystem
//! root. The returned chain is ordered **root-ward first**, so later files
//! override earlier ones when merged.
//!
//! Missing files are silently skipped. Only real read failures (permissions,
//! etc.) and undecodable contents are propagated.
//!
//! Directories are visited strictly one after another in both modes: whether
//! the next one is read at all depends on the `root` marker of the previous.
//!
//! With a [`SectionCache`], each candidate path is looked up before any I/O.
//! A missing file is cached as an empty section list, so a warm cache
//! answers the whole walk without touching the source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::cache::{self, CachedSections, SectionCache};
use crate::error::EditorConfigError;
use crate::parse;
use crate::types::{ConfigFile, ConfigSource};

/// Default configuration file name looked up in every directory.
pub const DEFAULT_CONFIG_NAME: &str = ".editorconfig";

/// Supplies configuration file contents by path. `Ok(None)` means the file
/// does not exist.
pub trait FileSource {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, EditorConfigError>;
}

impl<F> FileSource for F
where
    F: Fn(&Path) -> Result<Option<Vec<u8>>, EditorConfigError>,
{
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, EditorConfigError> {
        self(path)
    }
}

/// Async counterpart of [`FileSource`].
#[async_trait]
pub trait AsyncFileSource: Send + Sync {
    async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, EditorConfigError>;
}

/// Reads configuration files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, EditorConfigError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EditorConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// Reads configuration files through `tokio::fs`.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFsSource;

#[cfg(feature = "tokio")]
#[async_trait]
impl AsyncFileSource for TokioFsSource {
    async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, EditorConfigError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EditorConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// In-memory file tree, for tests and sources that are not a filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl FileSource for MemorySource {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, EditorConfigError> {
        Ok(self.files.get(path).cloned())
    }
}

#[async_trait]
impl AsyncFileSource for MemorySource {
    async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, EditorConfigError> {
        Ok(self.files.get(path).cloned())
    }
}

/// Where to look and how far to go.
#[derive(Clone, Copy)]
pub struct ChainSpec<'a> {
    pub config_name: &'a str,
    /// Highest directory consulted (inclusive). `None` walks to the root.
    pub boundary: Option<&'a Path>,
    pub cache: Option<&'a dyn SectionCache>,
}

impl Default for ChainSpec<'_> {
    fn default() -> Self {
        Self {
            config_name: DEFAULT_CONFIG_NAME,
            boundary: None,
            cache: None,
        }
    }
}

/// Directories that may hold configuration for `target`, nearest first.
pub fn candidate_dirs(
    target: &Path,
    boundary: Option<&Path>,
) -> Result<Vec<PathBuf>, EditorConfigError> {
    let start = target
        .parent()
        .ok_or_else(|| EditorConfigError::InvalidTarget(target.to_path_buf()))?;

    let mut dirs = Vec::new();
    let mut current = Some(start);
    while let Some(dir) = current {
        dirs.push(dir.to_path_buf());
        if boundary.is_some_and(|b| b == dir) {
            break;
        }
        current = dir.parent();
    }
    Ok(dirs)
}

/// Walk upward from `target` collecting configuration files.
pub fn load_chain(
    target: &Path,
    spec: ChainSpec<'_>,
    source: &dyn FileSource,
) -> Result<Vec<ConfigFile>, EditorConfigError> {
    let mut chain = Vec::new();
    for dir in candidate_dirs(target, spec.boundary)? {
        let path = dir.join(spec.config_name);
        let name = path.to_string_lossy().into_owned();
        let sections = match spec.cache.and_then(|c| c.get(&name)) {
            Some(hit) => hit,
            None => store(spec.cache, &name, source.read(&path)?)?,
        };
        if push_file(&mut chain, name, sections) {
            break;
        }
    }
    chain.reverse();
    Ok(chain)
}

/// Async variant of [`load_chain`]. Each directory is awaited before the
/// next is considered.
pub async fn load_chain_async(
    target: &Path,
    spec: ChainSpec<'_>,
    source: &dyn AsyncFileSource,
) -> Result<Vec<ConfigFile>, EditorConfigError> {
    let mut chain = Vec::new();
    for dir in candidate_dirs(target, spec.boundary)? {
        let path = dir.join(spec.config_name);
        let name = path.to_string_lossy().into_owned();
        let sections = match spec.cache.and_then(|c| c.get(&name)) {
            Some(hit) => hit,
            None => store(spec.cache, &name, source.read(&path).await?)?,
        };
        if push_file(&mut chain, name, sections) {
            break;
        }
    }
    chain.reverse();
    Ok(chain)
}

/// Build a chain from caller-supplied files given nearest first, the order
/// an upward walk would find them. Files past a root marker are ignored.
pub fn chain_from_sources(
    sources: &[ConfigSource],
    cache: Option<&dyn SectionCache>,
) -> Result<Vec<ConfigFile>, EditorConfigError> {
    let mut chain = Vec::new();
    for src in sources {
        let sections = cache::get_or_parse(cache, &src.name, || {
            parse::parse_bytes(&src.name, &src.contents)
        })?;
        if push_file(&mut chain, src.name.clone(), sections) {
            break;
        }
    }
    chain.reverse();
    Ok(chain)
}

fn store(
    cache: Option<&dyn SectionCache>,
    name: &str,
    bytes: Option<Vec<u8>>,
) -> Result<CachedSections, EditorConfigError> {
    let sections: CachedSections = match bytes {
        Some(bytes) => parse::parse_bytes(name, &bytes)?.into(),
        None => Vec::new().into(),
    };
    if let Some(cache) = cache {
        cache.set(name, sections.clone());
    }
    Ok(sections)
}

/// Append a found file to the nearest-first chain. Returns true when the
/// walk should stop.
fn push_file(chain: &mut Vec<ConfigFile>, name: String, sections: CachedSections) -> bool {
    if sections.is_empty() {
        return false;
    }
    let file = ConfigFile::new(name, sections);
    let root = file.is_root();
    tracing::debug!(file = %file.name, root, "found config file");
    chain.push(file);
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::fs;
    use tempfile::TempDir;

    fn names(chain: &[ConfigFile]) -> Vec<&str> {
        chain.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn candidate_dirs_nearest_first() {
        let dirs = candidate_dirs(Path::new("/a/b/c.txt"), None).unwrap();
        assert_eq!(
            dirs,
            vec![PathBuf::from("/a/b"), PathBuf::from("/a"), PathBuf::from("/")]
        );
    }

    #[test]
    fn candidate_dirs_stop_at_boundary() {
        let dirs = candidate_dirs(Path::new("/a/b/c/d.txt"), Some(Path::new("/a/b"))).unwrap();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c"), PathBuf::from("/a/b")]);
    }

    #[test]
    fn root_path_is_invalid_target() {
        assert!(matches!(
            candidate_dirs(Path::new("/"), None),
            Err(EditorConfigError::InvalidTarget(_))
        ));
    }

    #[test]
    fn chain_is_rootward_first() {
        let source = MemorySource::new()
            .with("/r/.editorconfig", "[*]\nx = 1\n")
            .with("/r/a/.editorconfig", "[*]\nx = 2\n");
        let chain = load_chain(Path::new("/r/a/b/f.txt"), ChainSpec::default(), &source).unwrap();
        assert_eq!(names(&chain), vec!["/r/.editorconfig", "/r/a/.editorconfig"]);
    }

    #[test]
    fn root_marker_stops_walk() {
        let source = MemorySource::new()
            .with("/.editorconfig", "[*]\nx = 0\n")
            .with("/r/.editorconfig", "root = true\n[*]\nx = 1\n")
            .with("/r/a/.editorconfig", "[*]\nx = 2\n");
        let chain = load_chain(Path::new("/r/a/f.txt"), ChainSpec::default(), &source).unwrap();
        assert_eq!(names(&chain), vec!["/r/.editorconfig", "/r/a/.editorconfig"]);
    }

    #[test]
    fn boundary_stops_walk() {
        let source = MemorySource::new()
            .with("/r/.editorconfig", "[*]\nx = 1\n")
            .with("/r/a/.editorconfig", "[*]\nx = 2\n");
        let spec = ChainSpec {
            boundary: Some(Path::new("/r/a")),
            ..ChainSpec::default()
        };
        let chain = load_chain(Path::new("/r/a/f.txt"), spec, &source).unwrap();
        assert_eq!(names(&chain), vec!["/r/a/.editorconfig"]);
    }

    #[test]
    fn custom_config_name() {
        let source = MemorySource::new()
            .with("/r/.editorconfig", "[*]\nx = 1\n")
            .with("/r/.myconfig", "[*]\nx = 2\n");
        let spec = ChainSpec {
            config_name: ".myconfig",
            ..ChainSpec::default()
        };
        let chain = load_chain(Path::new("/r/f.txt"), spec, &source).unwrap();
        assert_eq!(names(&chain), vec!["/r/.myconfig"]);
    }

    #[test]
    fn closure_source_and_error_propagation() {
        let source = |path: &Path| -> Result<Option<Vec<u8>>, EditorConfigError> {
            Err(EditorConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        };
        let result = load_chain(Path::new("/r/f.txt"), ChainSpec::default(), &source);
        assert!(matches!(result, Err(EditorConfigError::Io { .. })));
    }

    #[test]
    fn warm_cache_skips_reads() {
        let cache: Mutex<HashMap<String, CachedSections>> = Mutex::default();
        let source = MemorySource::new().with("/r/.editorconfig", "root = true\n[*]\nx = 1\n");
        let spec = ChainSpec {
            cache: Some(&cache),
            ..ChainSpec::default()
        };
        let first = load_chain(Path::new("/r/a/f.txt"), spec, &source).unwrap();
        // /r/a (missing) and /r
        assert_eq!(cache.lock().unwrap().len(), 2);

        let failing = |_: &Path| -> Result<Option<Vec<u8>>, EditorConfigError> {
            panic!("cache should answer every lookup")
        };
        let second = load_chain(Path::new("/r/a/f.txt"), spec, &failing).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sources_truncate_at_root() {
        let sources = vec![
            ConfigSource::new("/r/a/.editorconfig", "[*]\nx = 2\n"),
            ConfigSource::new("/r/.editorconfig", "root = true\n"),
            ConfigSource::new("/.editorconfig", "[*]\nx = 0\n"),
        ];
        let chain = chain_from_sources(&sources, None).unwrap();
        assert_eq!(names(&chain), vec!["/r/.editorconfig", "/r/a/.editorconfig"]);
    }

    #[test]
    fn sources_populate_cache_including_empty_files() {
        let cache: Mutex<HashMap<String, CachedSections>> = Mutex::default();
        let sources = vec![
            ConfigSource::new("early", Vec::new()),
            ConfigSource::new("/r/.editorconfig", "root = true\n"),
        ];
        chain_from_sources(&sources, Some(&cache)).unwrap();
        chain_from_sources(&sources, Some(&cache)).unwrap();
        assert_eq!(cache.lock().unwrap().len(), 2);
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let source = MemorySource::new().with("/r/.editorconfig", vec![0xff, 0xfe]);
        let result = load_chain(Path::new("/r/f.txt"), ChainSpec::default(), &source);
        assert!(matches!(result, Err(EditorConfigError::Decode { .. })));
    }

    #[test]
    fn fs_source_reads_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join(".editorconfig"), "root = true\n[*]\nx = 1\n").unwrap();

        let chain = load_chain(&nested.join("f.txt"), ChainSpec::default(), &FsSource).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain[0].name.ends_with(".editorconfig"));
    }

    #[cfg(unix)]
    #[test]
    fn fs_source_propagates_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join(".editorconfig");
        fs::write(&file_path, "root = true\n").unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o000)).unwrap();

        let result = FsSource.read(&file_path);
        // root may read anything; only assert when permissions are enforced
        if fs::read(&file_path).is_err() {
            assert!(matches!(result, Err(EditorConfigError::Io { .. })));
        }

        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[tokio::test]
    async fn async_walk_matches_sync_walk() {
        let source = MemorySource::new()
            .with("/.editorconfig", "[*]\nx = 0\n")
            .with("/r/.editorconfig", "root = true\n[*]\nx = 1\n")
            .with("/r/a/.editorconfig", "[*]\nx = 2\n");
        let target = Path::new("/r/a/b/f.txt");
        let sync = load_chain(target, ChainSpec::default(), &source).unwrap();
        let async_chain = load_chain_async(target, ChainSpec::default(), &source)
            .await
            .unwrap();
        assert_eq!(sync, async_chain);
    }
}
