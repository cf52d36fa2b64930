use thiserror::Error;

use crate::registry::OperationHandle;

/// Internal failures of the embedding.
///
/// These never reach script code: script-visible failures are
/// [`ScriptException`](crate::value::ScriptException)s or error strings
/// handed to callbacks.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The execution context is unusable, e.g. the global is not an object.
    #[error("Invalid execution context: {0}")]
    InvalidContext(String),

    #[error("Unknown or already consumed operation handle {0}")]
    HandleNotFound(OperationHandle),

    #[error("Operation {handle} stored {found} values, expected {expected}")]
    StoredValueMismatch {
        handle: OperationHandle,
        expected: usize,
        found: usize,
    },

    #[error("Operation {handle} stored a non-function value at position {index}")]
    NotCallable {
        handle: OperationHandle,
        index: usize,
    },

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, ScriptError>;
