//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `FileSystem` using `tokio::fs`, completing on Tokio worker threads
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::TokioFileSystem;
//! use bridge_traits::FileSystem;
//!
//! let fs = TokioFileSystem::new(TokioFileSystem::default_base_dir())?;
//! fs.read("patterns.ini", Box::new(|result| {
//!     // runs on a Tokio worker thread
//! }));
//! ```

mod filesystem;

pub use filesystem::TokioFileSystem;
