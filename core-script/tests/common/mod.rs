//! Shared fixtures for the bridge integration tests

#![allow(dead_code)]

use bridge_traits::{Completion, FileSystem, IoBuffer, StatResult};
use core_script::{filesystem, CallResult, ScriptEngine, ScriptFunction, ScriptValue};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A native call whose completion has not been fired yet
pub enum Parked {
    Read(String, Completion<IoBuffer>),
    Write(String, IoBuffer, Completion<()>),
    Move(String, String, Completion<()>),
    Remove(String, Completion<()>),
    Stat(String, Completion<StatResult>),
}

/// File system that records every call and holds on to its completion
/// until the test fires it.
#[derive(Default)]
pub struct RecordingFileSystem {
    calls: AtomicUsize,
    parked: Mutex<VecDeque<Parked>>,
}

impl RecordingFileSystem {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Oldest parked call
    pub fn next(&self) -> Parked {
        self.parked
            .lock()
            .unwrap()
            .pop_front()
            .expect("no parked native call")
    }

    pub fn complete_read(&self, result: bridge_traits::error::Result<IoBuffer>) {
        match self.next() {
            Parked::Read(_, done) => done(result),
            _ => panic!("next parked call is not a read"),
        }
    }

    pub fn complete_unit(&self, result: bridge_traits::error::Result<()>) {
        match self.next() {
            Parked::Write(_, _, done) | Parked::Move(_, _, done) | Parked::Remove(_, done) => {
                done(result)
            }
            _ => panic!("next parked call has no unit completion"),
        }
    }

    pub fn complete_stat(&self, result: bridge_traits::error::Result<StatResult>) {
        match self.next() {
            Parked::Stat(_, done) => done(result),
            _ => panic!("next parked call is not a stat"),
        }
    }

    fn park(&self, call: Parked) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.parked.lock().unwrap().push_back(call);
    }
}

impl FileSystem for RecordingFileSystem {
    fn read(&self, path: &str, done: Completion<IoBuffer>) {
        self.park(Parked::Read(path.to_string(), done));
    }

    fn write(&self, path: &str, data: IoBuffer, done: Completion<()>) {
        self.park(Parked::Write(path.to_string(), data, done));
    }

    fn move_file(&self, from: &str, to: &str, done: Completion<()>) {
        self.park(Parked::Move(from.to_string(), to.to_string(), done));
    }

    fn remove(&self, path: &str, done: Completion<()>) {
        self.park(Parked::Remove(path.to_string(), done));
    }

    fn stat(&self, path: &str, done: Completion<StatResult>) {
        self.park(Parked::Stat(path.to_string(), done));
    }
}

/// Script callback that records the arguments of every invocation
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Vec<ScriptValue>>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(&self, name: &str) -> ScriptValue {
        let calls = Arc::clone(&self.calls);
        ScriptFunction::new(name, move |args| {
            calls.lock().unwrap().push(args.values().to_vec());
            Ok(ScriptValue::Undefined)
        })
        .into()
    }

    pub fn calls(&self) -> Vec<Vec<ScriptValue>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Engine with the entry points installed as `_fileSystem`
pub fn engine_with(fs: Arc<dyn FileSystem>) -> Arc<ScriptEngine> {
    let engine = ScriptEngine::new(fs);
    filesystem::install(&engine, "_fileSystem").unwrap();
    engine
}

/// Call `_fileSystem.<op>` the way script code would
pub fn call(engine: &ScriptEngine, op: &str, args: Vec<ScriptValue>) -> CallResult {
    call_in(engine, "_fileSystem", op, args)
}

pub fn call_in(engine: &ScriptEngine, namespace: &str, op: &str, args: Vec<ScriptValue>) -> CallResult {
    let namespace = engine.global().as_object().unwrap().get(namespace);
    let function = namespace.as_object().unwrap().get(op);

    let context = engine.enter();
    function.as_function().unwrap().call(&context, args)
}
