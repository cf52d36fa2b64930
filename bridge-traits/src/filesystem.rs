//! Native File System Abstraction
//!
//! The native service performs the actual I/O on behalf of script code. Every
//! operation is fire-and-forget from the caller's point of view: the call
//! returns immediately and the result is delivered later through a one-shot
//! [`Completion`] handler, possibly on a thread other than the caller's.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::platform::{Completion, PlatformSendSync};

/// Immutable file content.
///
/// Reference-counted, so moving it across the asynchronous boundary never
/// copies the bytes and the buffer stays valid for as long as any stage holds
/// it.
pub type IoBuffer = Bytes;

/// Result of a `stat` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatResult {
    pub exists: bool,
    pub is_directory: bool,
    pub is_file: bool,
    /// Milliseconds since the Unix epoch, `0` when unknown.
    pub last_modified: i64,
}

impl StatResult {
    /// Record describing a path that does not exist.
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Asynchronous native file system.
///
/// Implementations must invoke each completion exactly once. They are free to
/// do so on any thread, or even synchronously before the method returns.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::filesystem::FileSystem;
///
/// fn log_size(fs: &dyn FileSystem) {
///     fs.read("patterns.ini", Box::new(|result| match result {
///         Ok(content) => println!("{} bytes", content.len()),
///         Err(err) => eprintln!("read failed: {err}"),
///     }));
/// }
/// ```
pub trait FileSystem: PlatformSendSync {
    /// Read the whole file into memory.
    fn read(&self, path: &str, done: Completion<IoBuffer>);

    /// Replace the file content with `data`, creating the file if needed.
    ///
    /// The implementation owns `data` until the completion fires.
    fn write(&self, path: &str, data: IoBuffer, done: Completion<()>);

    /// Move or rename `from` to `to`.
    fn move_file(&self, from: &str, to: &str, done: Completion<()>);

    /// Delete a file.
    fn remove(&self, path: &str, done: Completion<()>);

    /// Query existence and modification time.
    fn stat(&self, path: &str, done: Completion<StatResult>);
}
