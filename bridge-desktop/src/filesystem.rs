//! File System Implementation using Tokio

use bridge_traits::{
    error::{BridgeError, Result},
    filesystem::{FileSystem, IoBuffer, StatResult},
    platform::Completion,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, trace};

const DEFAULT_WORKER_THREADS: usize = 2;

/// Tokio-based native file system
///
/// Each operation is spawned onto a Tokio runtime and its completion handler
/// runs on whichever worker thread finished the I/O. Relative paths are
/// resolved against `base_dir`; absolute paths are used as given.
pub struct TokioFileSystem {
    base_dir: PathBuf,
    handle: Handle,
    // Only set when this instance built its own runtime.
    runtime: Option<Runtime>,
}

impl TokioFileSystem {
    /// Create a file system backed by its own runtime with two worker threads
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_worker_threads(base_dir, DEFAULT_WORKER_THREADS)
    }

    /// Create a file system backed by its own runtime
    pub fn with_worker_threads(base_dir: impl Into<PathBuf>, worker_threads: usize) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("fs-bridge-io")
            .enable_all()
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to start file system runtime: {}", e))
            })?;

        Ok(Self {
            base_dir: base_dir.into(),
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    /// Create a file system that spawns onto an existing runtime
    pub fn with_handle(base_dir: impl Into<PathBuf>, handle: Handle) -> Self {
        Self {
            base_dir: base_dir.into(),
            handle,
            runtime: None,
        }
    }

    /// Platform data directory used when no base directory is configured
    pub fn default_base_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
            })
            .join("script-fs-bridge")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(task);
    }
}

impl Drop for TokioFileSystem {
    fn drop(&mut self) {
        // A blocking shutdown would panic when dropped from async code.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn millis_since_epoch(time: std::time::SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp_millis()
}

impl FileSystem for TokioFileSystem {
    fn read(&self, path: &str, done: Completion<IoBuffer>) {
        let full_path = self.resolve(path);
        let path = path.to_string();
        self.spawn(async move {
            let result = fs::read(&full_path)
                .await
                .map(Bytes::from)
                .map_err(|e| BridgeError::io(&path, e));
            match &result {
                Ok(data) => debug!(path = %path, size = data.len(), "Read file"),
                Err(e) => debug!(path = %path, error = %e, "Read failed"),
            }
            done(result);
        });
    }

    fn write(&self, path: &str, data: IoBuffer, done: Completion<()>) {
        let full_path = self.resolve(path);
        let path = path.to_string();
        self.spawn(async move {
            let result = async {
                if let Some(parent) = full_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).await?;
                        trace!(path = ?parent, "Ensured parent directory");
                    }
                }
                fs::write(&full_path, data.as_ref()).await
            }
            .await
            .map_err(|e| BridgeError::io(&path, e));
            debug!(path = %path, size = data.len(), ok = result.is_ok(), "Wrote file");
            done(result);
        });
    }

    fn move_file(&self, from: &str, to: &str, done: Completion<()>) {
        let full_from = self.resolve(from);
        let full_to = self.resolve(to);
        let from = from.to_string();
        let to = to.to_string();
        self.spawn(async move {
            let result = fs::rename(&full_from, &full_to)
                .await
                .map_err(|e| BridgeError::io(&from, e));
            debug!(from = %from, to = %to, ok = result.is_ok(), "Moved file");
            done(result);
        });
    }

    fn remove(&self, path: &str, done: Completion<()>) {
        let full_path = self.resolve(path);
        let path = path.to_string();
        self.spawn(async move {
            let result = fs::remove_file(&full_path)
                .await
                .map_err(|e| BridgeError::io(&path, e));
            debug!(path = %path, ok = result.is_ok(), "Removed file");
            done(result);
        });
    }

    fn stat(&self, path: &str, done: Completion<StatResult>) {
        let full_path = self.resolve(path);
        let path = path.to_string();
        self.spawn(async move {
            let result = match fs::metadata(&full_path).await {
                Ok(metadata) => Ok(StatResult {
                    exists: true,
                    is_directory: metadata.is_dir(),
                    is_file: metadata.is_file(),
                    last_modified: metadata.modified().map(millis_since_epoch).unwrap_or(0),
                }),
                // A missing path is an answer, not a failure.
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(StatResult::missing()),
                Err(e) => Err(BridgeError::io(&path, e)),
            };
            debug!(path = %path, ok = result.is_ok(), "Stat file");
            done(result);
        });
    }
}
