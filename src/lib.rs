//! Resolve the effective [EditorConfig](https://editorconfig.org) properties
//! for a file.
//!
//! ```ignore
//! let props = EditorConfig::builder().resolve("src/main.rs")?;
//! assert_eq!(props["indent_style"], PropertyValue::from("space"));
//! ```
//!
//! That single call walks from `src/` toward the filesystem root reading
//! every `.editorconfig` on the way, stops at the first one declaring
//! `root = true`, applies each section whose selector matches the file, and
//! hands back a typed property map.
//!
//! # Pipeline
//!
//! ```text
//! target path
//!   → file:  walk upward, collect config files (root-ward first)
//!   → parse: split each file into (selector, raw properties) sections
//!   → merge: compile selectors against each file's directory, overlay
//!            matching sections, normalize and coerce
//!   → PropertyMap
//! ```
//!
//! Each stage works on plain data and is usable on its own:
//! [`parse_str`] for section introspection, [`load_chain`] to discover the
//! files, [`resolve_properties`] to merge a chain you already hold, and
//! [`Glob`] to test a single selector.
//!
//! # Precedence
//!
//! Within a file, later sections override earlier ones. Across files, files
//! closer to the target override those further away. The value `unset`
//! (any case) removes a key that a less specific section set.
//!
//! # Selectors
//!
//! Selectors are matched against the target path relative to the directory
//! of the file that declares them. Only the selector is a pattern: directory
//! names on either side are compared literally, so a directory named
//! `[src]` or `{a,b}` needs no escaping. See [`glob`] for the dialect.
//! A selector that cannot be compiled matches nothing rather than failing
//! the resolution.
//!
//! # Normalization
//!
//! | key | type |
//! |-----|------|
//! | `indent_size`, `tab_width`, `max_line_length` | integer, otherwise the raw string (`tab`, `off`) |
//! | `trim_trailing_whitespace`, `insert_final_newline` | `true`/`false`, otherwise the raw string |
//! | `indent_style`, `end_of_line`, `charset` | lowercased string |
//! | anything else | the raw string, case preserved |
//!
//! `indent_size` and `tab_width` fill in for each other when only one is
//! given, and `indent_style = tab` implies `indent_size = tab`.
//!
//! # Sources and modes
//!
//! Configuration contents reach the engine through a [`FileSource`]
//! ([`FsSource`] reads the local filesystem, [`MemorySource`] holds files in
//! memory, any closure over `&Path` works too), an [`AsyncFileSource`] for
//! async callers, or a list of [`ConfigSource`]s supplied up front. All
//! modes produce the same result for the same chain. In async mode
//! directories are still awaited one at a time, since a `root = true` marker
//! decides whether the next directory is read at all.
//!
//! # Caching
//!
//! Pass any [`SectionCache`] to [`EditorConfigBuilder::cache`] to reuse
//! parsed files across resolutions. The engine only reads and fills it;
//! invalidation is up to the owner. Caches are `Send + Sync`, so async
//! resolutions sharing one stay spawnable on a multi-threaded runtime.
//! Implementations ship for `Mutex<HashMap<..>>` and `RwLock<HashMap<..>>`.
//!
//! # Errors
//!
//! Missing files, malformed property lines and malformed selectors are not
//! errors. A resolution fails with [`EditorConfigError`] only when a source
//! cannot read a file that exists, or when contents are not valid UTF-8.
//!
//! # Clap adapter
//!
//! With the `clap` feature (default), [`ResolveArgs`] provides a ready-made
//! argument struct that resolves and prints properties for a list of files.

pub mod error;
pub mod glob;
pub mod types;

mod builder;
mod cache;
#[cfg(feature = "clap")]
mod cli;
mod file;
#[cfg(test)]
mod fixtures;
mod matcher;
mod merge;
mod options;
mod output;
mod parse;

pub use builder::{EditorConfig, EditorConfigBuilder};
pub use cache::{CachedSections, SectionCache};
#[cfg(feature = "clap")]
pub use cli::ResolveArgs;
pub use error::{EditorConfigError, PatternError};
#[cfg(feature = "tokio")]
pub use file::TokioFsSource;
pub use file::{
    AsyncFileSource, ChainSpec, DEFAULT_CONFIG_NAME, FileSource, FsSource, MemorySource,
    candidate_dirs, chain_from_sources, load_chain, load_chain_async,
};
pub use glob::{Glob, Pattern};
pub use matcher::FileMatcher;
pub use merge::{normalize, overlay, resolve_properties};
pub use options::ResolveOptions;
pub use output::Report;
pub use parse::{parse_bytes, parse_str};
pub use types::{ConfigFile, ConfigSource, PropertyMap, PropertyValue, RawSection, Visited};
