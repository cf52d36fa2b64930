//! The embedded script runtime as seen by the bridge.
//!
//! A [`ScriptEngine`] is always owned through an `Arc`. Native completions
//! only ever hold a `Weak` to it, so tearing the engine down while I/O is in
//! flight turns every outstanding completion into a silent no-op.
//!
//! Script execution is single-threaded: code runs only while an
//! [`ExecutionContext`] is held, and at most one thread holds it at a time.
//! The lock is re-entrant so a native service that completes synchronously,
//! inside the entry point that issued the call, does not deadlock.

use bridge_traits::FileSystem;
use core_runtime::config::CoreConfig;
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

use crate::error::{Result, ScriptError};
use crate::registry::{HandleRegistry, OperationHandle};
use crate::value::{ScriptObject, ScriptValue};

type FatalErrorHandler = Arc<dyn Fn(&ScriptError) + Send + Sync>;

pub struct ScriptEngine {
    this: Weak<ScriptEngine>,
    context_lock: ReentrantMutex<()>,
    global: Mutex<ScriptValue>,
    registry: HandleRegistry,
    file_system: Arc<dyn FileSystem>,
    fatal_handler: Mutex<Option<FatalErrorHandler>>,
}

impl ScriptEngine {
    /// Create an engine with an empty global object.
    pub fn new(file_system: Arc<dyn FileSystem>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            context_lock: ReentrantMutex::new(()),
            global: Mutex::new(ScriptValue::Object(ScriptObject::new())),
            registry: HandleRegistry::new(),
            file_system,
            fatal_handler: Mutex::new(None),
        })
    }

    /// Create an engine from `config` and install the file system entry
    /// points under `config.namespace`.
    pub fn from_config(config: &CoreConfig) -> Result<Arc<Self>> {
        let engine = Self::new(Arc::clone(&config.file_system));
        crate::filesystem::install(&engine, &config.namespace)?;
        debug!(namespace = %config.namespace, "Script engine ready");
        Ok(engine)
    }

    /// Non-owning reference for code that may outlive the engine.
    pub fn weak(&self) -> Weak<ScriptEngine> {
        self.this.clone()
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.file_system.as_ref()
    }

    /// Block until this thread may run script code.
    pub fn enter(&self) -> ExecutionContext<'_> {
        ExecutionContext {
            engine: self,
            _guard: self.context_lock.lock(),
        }
    }

    /// The ambient global value.
    pub fn global(&self) -> ScriptValue {
        self.global.lock().clone()
    }

    /// Replace the ambient global value.
    pub fn set_global(&self, global: ScriptValue) {
        *self.global.lock() = global;
    }

    /// Park `values` until a native completion resumes them.
    pub fn store_values(&self, values: Vec<ScriptValue>) -> PendingCallbacks {
        let handle = self.registry.store(values);
        PendingCallbacks {
            handle,
            engine: self.weak(),
        }
    }

    /// Number of operations whose completion has not arrived yet
    pub fn pending_operations(&self) -> usize {
        self.registry.len()
    }

    /// Install the hook receiving unrecoverable internal errors.
    ///
    /// Without a hook such errors are logged at `error` level.
    pub fn on_fatal_error<F>(&self, handler: F)
    where
        F: Fn(&ScriptError) + Send + Sync + 'static,
    {
        *self.fatal_handler.lock() = Some(Arc::new(handler));
    }

    pub(crate) fn report_fatal(&self, err: ScriptError) {
        let handler = self.fatal_handler.lock().clone();
        match handler {
            Some(handler) => handler(&err),
            None => error!(error = %err, "Fatal error in script embedding"),
        }
    }
}

impl fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("pending_operations", &self.registry.len())
            .field("file_system", &"FileSystem { ... }")
            .finish_non_exhaustive()
    }
}

/// Proof that the current thread may run script code.
pub struct ExecutionContext<'e> {
    engine: &'e ScriptEngine,
    _guard: ReentrantMutexGuard<'e, ()>,
}

impl<'e> ExecutionContext<'e> {
    pub fn engine(&self) -> &'e ScriptEngine {
        self.engine
    }

    pub fn global(&self) -> ScriptValue {
        self.engine.global()
    }
}

/// Script values waiting for one native completion.
///
/// Holds only a weak engine reference. Consumed by [`resume`], so the stored
/// values can be taken at most once.
///
/// [`resume`]: PendingCallbacks::resume
#[must_use = "dropping PendingCallbacks leaves its values parked until the engine is dropped"]
#[derive(Debug)]
pub struct PendingCallbacks {
    handle: OperationHandle,
    engine: Weak<ScriptEngine>,
}

impl PendingCallbacks {
    pub fn handle(&self) -> OperationHandle {
        self.handle
    }

    /// Re-enter the engine and hand the stored values to `deliver`.
    ///
    /// Does nothing when the engine is gone. Safe to call from any thread: it
    /// waits for the execution context first. An error from `deliver` is an
    /// internal failure and goes to the engine's fatal error hook.
    pub fn resume<F>(self, deliver: F)
    where
        F: FnOnce(&ExecutionContext<'_>, Vec<ScriptValue>) -> Result<()>,
    {
        let Some(engine) = self.engine.upgrade() else {
            debug!(handle = %self.handle, "Script engine gone, dropping completion");
            return;
        };

        let outcome = {
            let context = engine.enter();
            match engine.registry.take(self.handle) {
                Ok(values) => deliver(&context, values),
                Err(err) => {
                    warn!(handle = %self.handle, error = %err, "Completion without stored values");
                    return;
                }
            }
        };

        if let Err(err) = outcome {
            engine.report_fatal(err);
        }
    }
}
