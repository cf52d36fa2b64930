//! The `_fileSystem` namespace object.
//!
//! Six entry points forward script requests to the engine's native
//! [`FileSystem`](bridge_traits::FileSystem):
//!
//! | Entry point    | Arguments                | Callback                                  |
//! |----------------|--------------------------|-------------------------------------------|
//! | `read`         | path, callback           | `callback({content, [error]})`            |
//! | `readFromFile` | path, onLine, onDone     | `onLine(line)` per line, then `onDone([error])` |
//! | `write`        | path, content, callback  | `callback([error])`                       |
//! | `move`         | from, to, callback       | `callback([error])`                       |
//! | `remove`       | path, callback           | `callback([error])`                       |
//! | `stat`         | path, callback           | `callback({exists, lastModified, [error]})` |
//!
//! Each entry point validates its arguments, parks its callbacks in the
//! engine's handle registry and returns `undefined` right away. Wrong
//! arguments throw a `TypeError` and nothing reaches the native service.
//! Native failures only ever arrive through callback arguments.

use bridge_traits::error::Result as NativeResult;
use bridge_traits::{IoBuffer, StatResult};
use core_runtime::logging::strip_path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::engine::{ExecutionContext, ScriptEngine};
use crate::error::{Result, ScriptError};
use crate::lines::lines;
use crate::marshal;
use crate::registry::OperationHandle;
use crate::value::{
    Arguments, CallResult, ScriptException, ScriptFunction, ScriptObject, ScriptValue,
};

type EntryPoint = fn(&str, Arguments<'_, '_>) -> CallResult;

/// Bind the six entry points onto `namespace`.
///
/// `label` is the name script code reaches the object by; it only shows up
/// in error messages.
pub fn setup(label: &str, namespace: &ScriptObject) {
    let label: Arc<str> = Arc::from(label);
    bind(namespace, &label, "read", read);
    bind(namespace, &label, "readFromFile", read_from_file);
    bind(namespace, &label, "write", write);
    bind(namespace, &label, "move", move_file);
    bind(namespace, &label, "remove", remove);
    bind(namespace, &label, "stat", stat);
}

/// Create the namespace object and publish it on the engine's global as
/// `name`.
pub fn install(engine: &ScriptEngine, name: &str) -> Result<ScriptObject> {
    let global = engine.global();
    let Some(global) = global.as_object() else {
        return Err(ScriptError::InvalidContext(
            "global has to be an object to install the file system".to_string(),
        ));
    };

    let namespace = ScriptObject::new();
    setup(name, &namespace);
    global.set(name, namespace.clone());
    debug!(name, "Installed file system entry points");
    Ok(namespace)
}

fn bind(namespace: &ScriptObject, label: &Arc<str>, name: &'static str, entry: EntryPoint) {
    let label = Arc::clone(label);
    let function = ScriptFunction::new(name, move |args| entry(&label, args));
    namespace.set(name, function);
}

fn require_arguments(
    label: &str,
    op: &str,
    args: &Arguments<'_, '_>,
    count: usize,
) -> std::result::Result<(), ScriptException> {
    if args.len() != count {
        return Err(ScriptException::type_error(format!(
            "{label}.{op} requires {count} parameters"
        )));
    }
    Ok(())
}

fn require_function(
    label: &str,
    op: &str,
    args: &Arguments<'_, '_>,
    index: usize,
    role: Option<&str>,
) -> std::result::Result<(), ScriptException> {
    if args.get(index).is_function() {
        return Ok(());
    }

    let ordinal = match index {
        0 => "First",
        1 => "Second",
        2 => "Third",
        _ => "Trailing",
    };
    let suffix = role.map(|r| format!(" ({r})")).unwrap_or_default();
    Err(ScriptException::type_error(format!(
        "{ordinal} argument to {label}.{op} must be a function{suffix}"
    )))
}

/// Validate the values a completion got back and narrow them to functions.
fn stored_callbacks<const N: usize>(
    handle: OperationHandle,
    values: Vec<ScriptValue>,
) -> Result<[ScriptFunction; N]> {
    let found = values.len();
    let callbacks = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            ScriptValue::Function(function) => Ok(function),
            _ => Err(ScriptError::NotCallable { handle, index }),
        })
        .collect::<Result<Vec<_>>>()?;

    callbacks
        .try_into()
        .map_err(|_| ScriptError::StoredValueMismatch {
            handle,
            expected: N,
            found,
        })
}

/// Invoke a script callback from a completion. A throwing callback has no one
/// to report to, so the exception is logged and dropped.
fn call_stored(
    context: &ExecutionContext<'_>,
    op: &str,
    callback: &ScriptFunction,
    args: Vec<ScriptValue>,
) {
    if let Err(exception) = callback.call(context, args) {
        warn!(op, callback = callback.name(), %exception, "Script callback threw");
    }
}

fn read(label: &str, args: Arguments<'_, '_>) -> CallResult {
    require_arguments(label, "read", &args, 2)?;
    require_function(label, "read", &args, 1, None)?;

    let path = args.get(0).as_string();
    let engine = args.context().engine();
    let pending = engine.store_values(vec![args.get(1).clone()]);
    let handle = pending.handle();
    debug!(%handle, file = %strip_path(&path), "read");

    engine.file_system().read(
        &path,
        Box::new(move |result: NativeResult<IoBuffer>| {
            pending.resume(move |context, values| {
                let [callback] = stored_callbacks::<1>(handle, values)?;
                call_stored(context, "read", &callback, vec![marshal::read_result(result)]);
                Ok(())
            });
        }),
    );
    Ok(ScriptValue::Undefined)
}

fn read_from_file(label: &str, args: Arguments<'_, '_>) -> CallResult {
    require_arguments(label, "readFromFile", &args, 3)?;
    require_function(label, "readFromFile", &args, 1, Some("listener callback"))?;
    require_function(label, "readFromFile", &args, 2, Some("done callback"))?;

    let path = args.get(0).as_string();
    let engine = args.context().engine();
    let pending = engine.store_values(vec![args.get(1).clone(), args.get(2).clone()]);
    let handle = pending.handle();
    debug!(%handle, file = %strip_path(&path), "readFromFile");

    engine.file_system().read(
        &path,
        Box::new(move |result: NativeResult<IoBuffer>| {
            pending.resume(move |context, values| {
                let [listener, done] = stored_callbacks::<2>(handle, values)?;

                let content = match result {
                    Ok(content) => content,
                    Err(err) => {
                        let text = marshal::error_text(&err);
                        call_stored(context, "readFromFile", &done, vec![text.into()]);
                        return Ok(());
                    }
                };

                let global = context.global();
                if !global.is_object() {
                    return Err(ScriptError::InvalidContext(
                        "`this` pointer has to be an object".to_string(),
                    ));
                }

                let done_args = match emit_lines(context, &global, &listener, &content) {
                    Ok(count) => {
                        trace!(%handle, lines = count, "All lines delivered");
                        Vec::new()
                    }
                    Err(exception) => {
                        debug!(%handle, %exception, "Line listener threw, stopping");
                        vec![marshal::exception_text(&exception)]
                    }
                };
                call_stored(context, "readFromFile", &done, done_args);
                Ok(())
            });
        }),
    );
    Ok(ScriptValue::Undefined)
}

/// Feed `content` to `listener` one line at a time. Stops at the first
/// exception and returns it; otherwise returns the number of lines.
fn emit_lines(
    context: &ExecutionContext<'_>,
    this: &ScriptValue,
    listener: &ScriptFunction,
    content: &[u8],
) -> std::result::Result<usize, ScriptException> {
    let mut emitted = 0;
    for line in lines(content) {
        listener.call_with_this(context, this.clone(), vec![marshal::line_value(line)])?;
        emitted += 1;
    }
    Ok(emitted)
}

fn write(label: &str, args: Arguments<'_, '_>) -> CallResult {
    require_arguments(label, "write", &args, 3)?;
    require_function(label, "write", &args, 2, None)?;

    let path = args.get(0).as_string();
    let content = args.get(1).as_buffer();
    let engine = args.context().engine();
    let pending = engine.store_values(vec![args.get(2).clone()]);
    let handle = pending.handle();
    debug!(%handle, file = %strip_path(&path), bytes = content.len(), "write");

    engine.file_system().write(
        &path,
        content,
        Box::new(move |result: NativeResult<()>| {
            pending.resume(move |context, values| {
                let [callback] = stored_callbacks::<1>(handle, values)?;
                call_stored(context, "write", &callback, marshal::completion_args(result));
                Ok(())
            });
        }),
    );
    Ok(ScriptValue::Undefined)
}

fn move_file(label: &str, args: Arguments<'_, '_>) -> CallResult {
    require_arguments(label, "move", &args, 3)?;
    require_function(label, "move", &args, 2, None)?;

    let from = args.get(0).as_string();
    let to = args.get(1).as_string();
    let engine = args.context().engine();
    let pending = engine.store_values(vec![args.get(2).clone()]);
    let handle = pending.handle();
    debug!(%handle, from = %strip_path(&from), to = %strip_path(&to), "move");

    engine.file_system().move_file(
        &from,
        &to,
        Box::new(move |result: NativeResult<()>| {
            pending.resume(move |context, values| {
                let [callback] = stored_callbacks::<1>(handle, values)?;
                call_stored(context, "move", &callback, marshal::completion_args(result));
                Ok(())
            });
        }),
    );
    Ok(ScriptValue::Undefined)
}

fn remove(label: &str, args: Arguments<'_, '_>) -> CallResult {
    require_arguments(label, "remove", &args, 2)?;
    require_function(label, "remove", &args, 1, None)?;

    let path = args.get(0).as_string();
    let engine = args.context().engine();
    let pending = engine.store_values(vec![args.get(1).clone()]);
    let handle = pending.handle();
    debug!(%handle, file = %strip_path(&path), "remove");

    engine.file_system().remove(
        &path,
        Box::new(move |result: NativeResult<()>| {
            pending.resume(move |context, values| {
                let [callback] = stored_callbacks::<1>(handle, values)?;
                call_stored(context, "remove", &callback, marshal::completion_args(result));
                Ok(())
            });
        }),
    );
    Ok(ScriptValue::Undefined)
}

fn stat(label: &str, args: Arguments<'_, '_>) -> CallResult {
    require_arguments(label, "stat", &args, 2)?;
    require_function(label, "stat", &args, 1, None)?;

    let path = args.get(0).as_string();
    let engine = args.context().engine();
    let pending = engine.store_values(vec![args.get(1).clone()]);
    let handle = pending.handle();
    debug!(%handle, file = %strip_path(&path), "stat");

    engine.file_system().stat(
        &path,
        Box::new(move |result: NativeResult<StatResult>| {
            pending.resume(move |context, values| {
                let [callback] = stored_callbacks::<1>(handle, values)?;
                call_stored(context, "stat", &callback, vec![marshal::stat_result(result)]);
                Ok(())
            });
        }),
    );
    Ok(ScriptValue::Undefined)
}
