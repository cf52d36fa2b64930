//! Script value model.
//!
//! Just enough of a dynamic value system to express what crosses the bridge:
//! primitives, byte buffers, property bags and callable functions. Objects and
//! functions are reference types, so cloning a [`ScriptValue`] never copies
//! them and equality on them is identity.

use bridge_traits::IoBuffer;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::ExecutionContext;

/// Outcome of invoking a script function.
pub type CallResult = std::result::Result<ScriptValue, ScriptException>;

#[derive(Clone, Default)]
pub enum ScriptValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Raw bytes, e.g. file content
    Buffer(IoBuffer),
    Object(ScriptObject),
    Function(ScriptFunction),
}

static UNDEFINED: ScriptValue = ScriptValue::Undefined;

impl ScriptValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, ScriptValue::Undefined)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ScriptValue::Object(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, ScriptValue::Function(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ScriptObject> {
        match self {
            ScriptValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&ScriptFunction> {
        match self {
            ScriptValue::Function(f) => Some(f),
            _ => None,
        }
    }

    /// String conversion with script semantics (`undefined`, `1`, `1.5`, ...).
    pub fn as_string(&self) -> String {
        self.to_string()
    }

    /// Byte view of the value.
    ///
    /// Buffers are shared, not copied; everything else is converted to its
    /// string form and encoded as UTF-8.
    pub fn as_buffer(&self) -> IoBuffer {
        match self {
            ScriptValue::Buffer(bytes) => bytes.clone(),
            ScriptValue::String(s) => IoBuffer::from(s.clone().into_bytes()),
            other => IoBuffer::from(other.to_string().into_bytes()),
        }
    }
}

fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // Covers -0 as well.
        f.write_str("0")
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form with an explicit sign on positive exponents: `1e+21`.
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                write!(f, "{}e+{}", mantissa, exponent)
            }
            _ => f.write_str(&formatted),
        }
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Undefined => f.write_str("undefined"),
            ScriptValue::Null => f.write_str("null"),
            ScriptValue::Bool(b) => write!(f, "{}", b),
            ScriptValue::Number(n) => format_number(*n, f),
            ScriptValue::String(s) => f.write_str(s),
            ScriptValue::Buffer(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            ScriptValue::Object(_) => f.write_str("[object Object]"),
            ScriptValue::Function(func) => {
                write!(f, "function {}() {{ [native code] }}", func.name())
            }
        }
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Undefined => f.write_str("Undefined"),
            ScriptValue::Null => f.write_str("Null"),
            ScriptValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            ScriptValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            ScriptValue::String(s) => f.debug_tuple("String").field(s).finish(),
            ScriptValue::Buffer(bytes) => f.debug_tuple("Buffer").field(bytes).finish(),
            ScriptValue::Object(o) => fmt::Debug::fmt(o, f),
            ScriptValue::Function(func) => fmt::Debug::fmt(func, f),
        }
    }
}

impl PartialEq for ScriptValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScriptValue::Undefined, ScriptValue::Undefined) => true,
            (ScriptValue::Null, ScriptValue::Null) => true,
            (ScriptValue::Bool(a), ScriptValue::Bool(b)) => a == b,
            (ScriptValue::Number(a), ScriptValue::Number(b)) => a == b,
            (ScriptValue::String(a), ScriptValue::String(b)) => a == b,
            (ScriptValue::Buffer(a), ScriptValue::Buffer(b)) => a == b,
            (ScriptValue::Object(a), ScriptValue::Object(b)) => a.ptr_eq(b),
            (ScriptValue::Function(a), ScriptValue::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        ScriptValue::Bool(value)
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        ScriptValue::Number(value)
    }
}

impl From<i64> for ScriptValue {
    fn from(value: i64) -> Self {
        ScriptValue::Number(value as f64)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        ScriptValue::String(value.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        ScriptValue::String(value)
    }
}

impl From<IoBuffer> for ScriptValue {
    fn from(value: IoBuffer) -> Self {
        ScriptValue::Buffer(value)
    }
}

impl From<ScriptObject> for ScriptValue {
    fn from(value: ScriptObject) -> Self {
        ScriptValue::Object(value)
    }
}

impl From<ScriptFunction> for ScriptValue {
    fn from(value: ScriptFunction) -> Self {
        ScriptValue::Function(value)
    }
}

/// Shared, mutable property bag.
#[derive(Clone, Default)]
pub struct ScriptObject {
    properties: Arc<Mutex<BTreeMap<String, ScriptValue>>>,
}

impl ScriptObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Property value, `undefined` when absent.
    pub fn get(&self, key: &str) -> ScriptValue {
        self.properties.lock().get(key).cloned().unwrap_or_default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<ScriptValue>) {
        self.properties.lock().insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.properties.lock().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<ScriptValue> {
        self.properties.lock().remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.properties.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.properties.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.lock().is_empty()
    }

    pub fn ptr_eq(&self, other: &ScriptObject) -> bool {
        Arc::ptr_eq(&self.properties, &other.properties)
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.properties.try_lock() {
            Some(properties) => f.debug_map().entries(properties.iter()).finish(),
            None => f.write_str("{ <locked> }"),
        }
    }
}

type NativeCallable = dyn Fn(Arguments<'_, '_>) -> CallResult + Send + Sync;

/// Callable script function backed by native code.
#[derive(Clone)]
pub struct ScriptFunction {
    name: Arc<str>,
    callable: Arc<NativeCallable>,
}

impl ScriptFunction {
    pub fn new<F>(name: &str, callable: F) -> Self
    where
        F: Fn(Arguments<'_, '_>) -> CallResult + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            callable: Arc::new(callable),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke with `undefined` as the receiver.
    pub fn call(&self, context: &ExecutionContext<'_>, args: Vec<ScriptValue>) -> CallResult {
        self.call_with_this(context, ScriptValue::Undefined, args)
    }

    pub fn call_with_this(
        &self,
        context: &ExecutionContext<'_>,
        this: ScriptValue,
        args: Vec<ScriptValue>,
    ) -> CallResult {
        (self.callable)(Arguments {
            context,
            this,
            values: args,
        })
    }

    pub fn ptr_eq(&self, other: &ScriptFunction) -> bool {
        Arc::ptr_eq(&self.callable, &other.callable)
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Call site information handed to a native function.
pub struct Arguments<'a, 'e> {
    context: &'a ExecutionContext<'e>,
    this: ScriptValue,
    values: Vec<ScriptValue>,
}

impl<'a, 'e> Arguments<'a, 'e> {
    pub fn context(&self) -> &'a ExecutionContext<'e> {
        self.context
    }

    pub fn this(&self) -> &ScriptValue {
        &self.this
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument at `index`, `undefined` when not supplied.
    pub fn get(&self, index: usize) -> &ScriptValue {
        self.values.get(index).unwrap_or(&UNDEFINED)
    }

    pub fn values(&self) -> &[ScriptValue] {
        &self.values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    Error,
    TypeError,
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceptionKind::Error => f.write_str("Error"),
            ExceptionKind::TypeError => f.write_str("TypeError"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

/// Exception thrown by script code or raised towards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptException {
    pub kind: ExceptionKind,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl ScriptException {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ExceptionKind::Error,
            message: message.into(),
            location: None,
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self {
            kind: ExceptionKind::TypeError,
            message: message.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(SourceLocation {
            file: file.into(),
            line,
        });
        self
    }
}

impl fmt::Display for ScriptException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {}:{}", location.file, location.line)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptException {}
