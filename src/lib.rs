//! Workspace facade crate.
//!
//! Re-exports the workspace crates so an embedder can depend on
//! `script-fs-bridge` alone and toggle the documented features:
//!
//! - `desktop-shims` (default): fall back to the tokio-backed
//!   `TokioFileSystem` when no native file system is injected.
//!
//! ```ignore
//! use script_fs_bridge::{CoreConfig, ScriptEngine};
//!
//! let config = CoreConfig::builder().base_dir("/var/lib/app").build()?;
//! let engine = ScriptEngine::from_config(&config)?;
//! ```

pub use bridge_traits;
pub use core_runtime;
pub use core_script;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

pub use core_runtime::config::CoreConfig;
pub use core_script::{ScriptEngine, ScriptValue};
