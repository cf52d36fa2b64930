//! Conversions from native results to the values script callbacks receive.

use bridge_traits::{BridgeError, IoBuffer, StatResult};

use crate::value::{ScriptException, ScriptObject, ScriptValue};

const UNKNOWN_ERROR: &str = "Unknown error";

/// Text handed to script code for a native failure. Never empty, since an
/// empty string would read as success on the script side.
pub fn error_text(err: &BridgeError) -> String {
    let text = err.to_string();
    if text.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        text
    }
}

/// `{content, [error]}` for `read`.
///
/// A failed read still carries `content`, as an empty buffer.
pub fn read_result(result: bridge_traits::error::Result<IoBuffer>) -> ScriptValue {
    let object = ScriptObject::new();
    match result {
        Ok(content) => object.set("content", content),
        Err(err) => {
            object.set("content", IoBuffer::new());
            object.set("error", error_text(&err));
        }
    }
    object.into()
}

/// Callback arguments for `write`, `move` and `remove`: none on success, the
/// error text otherwise.
pub fn completion_args(result: bridge_traits::error::Result<()>) -> Vec<ScriptValue> {
    match result {
        Ok(()) => Vec::new(),
        Err(err) => vec![ScriptValue::from(error_text(&err))],
    }
}

/// `{exists, lastModified, [error]}` for `stat`. Always an object.
pub fn stat_result(result: bridge_traits::error::Result<StatResult>) -> ScriptValue {
    let object = ScriptObject::new();
    let (stat, error) = match result {
        Ok(stat) => (stat, None),
        Err(err) => (StatResult::missing(), Some(error_text(&err))),
    };

    object.set("exists", stat.exists);
    object.set("lastModified", stat.last_modified as f64);
    if let Some(error) = error {
        object.set("error", error);
    }
    object.into()
}

/// A decoded line as a script string. Invalid UTF-8 is replaced, not rejected.
pub fn line_value(line: &[u8]) -> ScriptValue {
    ScriptValue::String(String::from_utf8_lossy(line).into_owned())
}

pub fn exception_text(exception: &ScriptException) -> ScriptValue {
    ScriptValue::String(exception.to_string())
}
