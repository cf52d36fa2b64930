//! # Script File System Bridge
//!
//! Exposes an asynchronous native [`FileSystem`](bridge_traits::FileSystem)
//! to code running in a single-threaded script engine.
//!
//! ## Overview
//!
//! Script code calls one of the entry points on the `_fileSystem` object
//! (see [`filesystem`]). The call stores its callbacks in the engine's
//! [`HandleRegistry`], starts the native operation and returns at once. When
//! the native service completes, possibly on another thread, the completion
//! re-enters the engine through [`PendingCallbacks::resume`] and hands the
//! marshalled result to the stored callbacks.
//!
//! Completions only keep a weak reference to the engine. If the engine was
//! dropped in the meantime the result is discarded without touching any
//! script state.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_script::{ScriptEngine, ScriptFunction, ScriptValue};
//!
//! let config = CoreConfig::builder().base_dir("/var/lib/app").build()?;
//! let engine = ScriptEngine::from_config(&config)?;
//!
//! let namespace = engine.global().as_object().unwrap().get("_fileSystem");
//! let read = namespace.as_object().unwrap().get("readFromFile");
//!
//! let context = engine.enter();
//! read.as_function().unwrap().call(&context, vec![
//!     "patterns.ini".into(),
//!     ScriptFunction::new("onLine", |args| { println!("{}", args.get(0)); Ok(ScriptValue::Undefined) }).into(),
//!     ScriptFunction::new("onDone", |_| Ok(ScriptValue::Undefined)).into(),
//! ])?;
//! ```

pub mod engine;
pub mod error;
pub mod filesystem;
pub mod lines;
pub mod marshal;
pub mod registry;
pub mod value;

pub use engine::{ExecutionContext, PendingCallbacks, ScriptEngine};
pub use error::{Result, ScriptError};
pub use lines::{lines, Lines};
pub use registry::{HandleRegistry, OperationHandle};
pub use value::{
    Arguments, CallResult, ExceptionKind, ScriptException, ScriptFunction, ScriptObject,
    ScriptValue,
};
