//! # Host Bridge Traits
//!
//! Contracts between the script bridge and the native platform.
//!
//! ## Overview
//!
//! Script code never touches the disk itself. Each request is forwarded to a
//! native [`FileSystem`](filesystem::FileSystem) supplied by the host, which
//! performs the I/O asynchronously and reports back through a one-shot
//! completion handler. The same crate defines the
//! [`LoggerSink`](logging::LoggerSink) a host can use to receive bridge logs.
//!
//! ## Traits
//!
//! - [`FileSystem`](filesystem::FileSystem) - read, write, move, remove, stat
//! - [`LoggerSink`](logging::LoggerSink) - forward structured logs to the host
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Mobile   | host-provided       | 📋 Inject via `CoreConfig` |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). The message of
//! a failed operation ends up in front of script authors, so implementations
//! should include the offending path.
//!
//! ## Thread Safety
//!
//! On native targets every trait requires `Send + Sync` and every completion
//! handler is `Send`: completions may run on any thread.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::filesystem::{FileSystem, IoBuffer, StatResult};
//! use bridge_traits::platform::Completion;
//!
//! struct ReadOnlyFs;
//!
//! impl FileSystem for ReadOnlyFs {
//!     fn read(&self, path: &str, done: Completion<IoBuffer>) {
//!         done(std::fs::read(path).map(IoBuffer::from).map_err(|e| BridgeError::io(path, e)));
//!     }
//!     // ...
//! }
//! ```

pub mod error;
pub mod filesystem;
pub mod logging;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use filesystem::{FileSystem, IoBuffer, StatResult};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use platform::{Completion, PlatformSendSync};
