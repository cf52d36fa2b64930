//! # Core Configuration Module
//!
//! Provides configuration for the script file system bridge.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding the native [`FileSystem`] the bridge forwards to, plus the settings
//! that shape the script-facing surface. Validation is fail-fast: a config
//! that would produce a broken bridge is rejected by `build()`.
//!
//! ## Dependencies
//!
//! - `FileSystem` - required; when the `desktop-shims` feature is enabled and
//!   nothing is injected, a `TokioFileSystem` rooted at `base_dir` is created.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .namespace("_fileSystem")
//!     .file_system(Arc::new(MyFileSystem))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::FileSystem;
use std::path::PathBuf;
use std::sync::Arc;

/// Name the entry points are bound under on the script global object.
pub const DEFAULT_NAMESPACE: &str = "_fileSystem";

const DEFAULT_WORKER_THREADS: usize = 2;
const MAX_WORKER_THREADS: usize = 64;

/// Configuration for the script file system bridge.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Global property the entry points are installed under
    pub namespace: String,

    /// Directory relative script paths are resolved against by the default
    /// desktop file system
    pub base_dir: PathBuf,

    /// I/O threads for the default desktop file system
    pub worker_threads: usize,

    /// Native file system the bridge forwards to
    pub file_system: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("namespace", &self.namespace)
            .field("base_dir", &self.base_dir)
            .field("worker_threads", &self.worker_threads)
            .field("file_system", &"FileSystem { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The namespace is a usable script identifier
    /// - The base directory is not empty
    /// - The worker thread count is within 1..=64
    pub fn validate(&self) -> Result<()> {
        validate_settings(&self.namespace, &self.base_dir, self.worker_threads)
    }
}

fn validate_settings(namespace: &str, base_dir: &std::path::Path, worker_threads: usize) -> Result<()> {
    validate_namespace(namespace)?;

    if base_dir.as_os_str().is_empty() {
        return Err(Error::Config("Base directory cannot be empty".to_string()));
    }

    if worker_threads == 0 || worker_threads > MAX_WORKER_THREADS {
        return Err(Error::Config(format!(
            "Worker thread count must be between 1 and {}, got {}",
            MAX_WORKER_THREADS, worker_threads
        )));
    }

    Ok(())
}

fn validate_namespace(namespace: &str) -> Result<()> {
    let mut chars = namespace.chars();
    let Some(first) = chars.next() else {
        return Err(Error::Config("Namespace cannot be empty".to_string()));
    };

    let valid_start = first == '_' || first == '$' || first.is_ascii_alphabetic();
    if !valid_start || !chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric()) {
        return Err(Error::Config(format!(
            "Namespace '{}' is not a valid script identifier",
            namespace
        )));
    }

    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn file_system_missing_error() -> Error {
    Error::capability_missing(
        "FileSystem",
        "A native FileSystem implementation is required. \
         Desktop: enable the 'desktop-shims' feature to use the default TokioFileSystem. \
         Other hosts: inject the platform file system with CoreConfigBuilder::file_system.",
    )
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system(
    base_dir: &std::path::Path,
    worker_threads: usize,
) -> Result<Arc<dyn FileSystem>> {
    use bridge_desktop::TokioFileSystem;

    let fs = TokioFileSystem::with_worker_threads(base_dir, worker_threads).map_err(|e| {
        Error::Internal(format!("Failed to initialize default FileSystem: {}", e))
    })?;
    tracing::debug!(base_dir = ?base_dir, worker_threads, "Using desktop file system");

    let fs: Arc<dyn FileSystem> = Arc::new(fs);
    Ok(fs)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system(
    _base_dir: &std::path::Path,
    _worker_threads: usize,
) -> Result<Arc<dyn FileSystem>> {
    Err(file_system_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn default_base_dir() -> PathBuf {
    bridge_desktop::TokioFileSystem::default_base_dir()
}

#[cfg(not(feature = "desktop-shims"))]
fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    namespace: Option<String>,
    base_dir: Option<PathBuf>,
    worker_threads: Option<usize>,
    file_system: Option<Arc<dyn FileSystem>>,
}

impl CoreConfigBuilder {
    /// Sets the global property name for the entry points.
    ///
    /// Default: `_fileSystem`
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the directory relative paths resolve against.
    ///
    /// Only used by the default desktop file system.
    pub fn base_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.base_dir = Some(path.into());
        self
    }

    /// Sets the number of I/O threads of the default desktop file system.
    ///
    /// Default: 2
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Sets the native file system implementation.
    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Builds the final configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when a setting is out of range
    /// - [`Error::CapabilityMissing`] when no file system was injected and no
    ///   desktop default is compiled in
    pub fn build(self) -> Result<CoreConfig> {
        let namespace = self
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let base_dir = self.base_dir.unwrap_or_else(default_base_dir);
        let worker_threads = self.worker_threads.unwrap_or(DEFAULT_WORKER_THREADS);

        // Checked before the default file system spins up its runtime.
        validate_settings(&namespace, &base_dir, worker_threads)?;

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system(&base_dir, worker_threads)?,
        };

        Ok(CoreConfig {
            namespace,
            base_dir,
            worker_threads,
            file_system,
        })
    }
}
