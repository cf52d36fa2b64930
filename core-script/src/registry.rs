//! Handle table for script values awaiting a native completion.
//!
//! A registering call stores its callbacks and gets back an
//! [`OperationHandle`]; the completion later takes them out exactly once.
//! The table is shared between the script thread (storing) and native
//! completion threads (taking), hence the mutex.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, ScriptError};
use crate::value::ScriptValue;

/// Opaque identifier of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationHandle(u64);

impl OperationHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: AtomicU64,
    entries: Mutex<HashMap<OperationHandle, Vec<ScriptValue>>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `values` together under a fresh handle.
    pub fn store(&self, values: Vec<ScriptValue>) -> OperationHandle {
        let handle = OperationHandle(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.entries.lock().insert(handle, values);
        handle
    }

    /// Remove and return everything stored under `handle`.
    ///
    /// A second `take` of the same handle fails with
    /// [`ScriptError::HandleNotFound`] instead of handing out values twice.
    pub fn take(&self, handle: OperationHandle) -> Result<Vec<ScriptValue>> {
        self.entries
            .lock()
            .remove(&handle)
            .ok_or(ScriptError::HandleNotFound(handle))
    }

    /// Number of registrations still waiting for their completion
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
