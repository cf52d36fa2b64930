//! Integration tests for the `_fileSystem` entry points
//!
//! Completions are parked by a recording file system and fired by hand, so
//! each test controls exactly when and in which state the engine is
//! re-entered.

mod common;

use bridge_traits::{BridgeError, IoBuffer, StatResult};
use common::{call, call_in, engine_with, CallLog, Parked, RecordingFileSystem};
use core_script::{
    filesystem, ExceptionKind, ScriptEngine, ScriptError, ScriptException, ScriptFunction,
    ScriptValue,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn failed(msg: &str) -> BridgeError {
    BridgeError::OperationFailed(msg.to_string())
}

fn s(value: &str) -> ScriptValue {
    ScriptValue::from(value)
}

#[test]
fn test_read_delivers_content_without_error() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let callback = CallLog::new();

    let returned = call(&engine, "read", vec![s("patterns.ini"), callback.function("cb")]).unwrap();
    assert!(returned.is_undefined());
    assert_eq!(callback.count(), 0);

    let content = IoBuffer::from_static(b"[Adblock Plus 2.0]\n||ads.example^");
    fs.complete_read(Ok(content.clone()));

    let calls = callback.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 1);
    let result = calls[0][0].as_object().unwrap().clone();
    assert_eq!(result.get("content"), ScriptValue::Buffer(content));
    assert!(!result.has("error"));
}

#[test]
fn test_read_failure_sets_error_field() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let callback = CallLog::new();

    call(&engine, "read", vec![s("missing.ini"), callback.function("cb")]).unwrap();
    fs.complete_read(Err(failed("File not found")));

    let calls = callback.calls();
    assert_eq!(calls.len(), 1);
    let result = calls[0][0].as_object().unwrap().clone();
    assert_eq!(result.get("error"), s("File not found"));
}

#[test]
fn test_read_from_file_emits_each_line_then_done() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let listener = CallLog::new();
    let done = CallLog::new();

    call(
        &engine,
        "readFromFile",
        vec![s("list.txt"), listener.function("onLine"), done.function("onDone")],
    )
    .unwrap();
    fs.complete_read(Ok(IoBuffer::from_static(b"x\ny\nz")));

    assert_eq!(listener.calls(), vec![vec![s("x")], vec![s("y")], vec![s("z")]]);
    assert_eq!(done.calls(), vec![Vec::<ScriptValue>::new()]);
}

#[test]
fn test_read_from_file_normalizes_terminators() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let listener = CallLog::new();
    let done = CallLog::new();

    call(
        &engine,
        "readFromFile",
        vec![s("list.txt"), listener.function("onLine"), done.function("onDone")],
    )
    .unwrap();
    fs.complete_read(Ok(IoBuffer::from_static(b"\r\n\r\na\r\n\n\rb\r\n")));

    assert_eq!(listener.calls(), vec![vec![s("a")], vec![s("b")]]);
    assert_eq!(done.count(), 1);
}

#[test]
fn test_read_from_file_listener_runs_with_global_receiver() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let done = CallLog::new();
    let receivers = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&receivers);
    let listener = ScriptFunction::new("onLine", move |args| {
        seen.lock().unwrap().push(args.this().clone());
        Ok(ScriptValue::Undefined)
    });

    call(
        &engine,
        "readFromFile",
        vec![s("list.txt"), listener.into(), done.function("onDone")],
    )
    .unwrap();
    fs.complete_read(Ok(IoBuffer::from_static(b"one")));

    let receivers = receivers.lock().unwrap();
    assert_eq!(receivers.len(), 1);
    assert_eq!(receivers[0], engine.global());
}

#[test]
fn test_read_from_file_stops_at_listener_exception() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let done = CallLog::new();
    let seen = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&seen);
    let listener = ScriptFunction::new("onLine", move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
            return Err(ScriptException::error("bad filter").with_location("init.js", 7));
        }
        Ok(ScriptValue::Undefined)
    });

    call(
        &engine,
        "readFromFile",
        vec![s("list.txt"), listener.into(), done.function("onDone")],
    )
    .unwrap();
    fs.complete_read(Ok(IoBuffer::from_static(b"x\ny\nz")));

    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert_eq!(done.calls(), vec![vec![s("Error: bad filter at init.js:7")]]);
}

#[test]
fn test_read_from_file_native_failure_skips_listener() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let listener = CallLog::new();
    let done = CallLog::new();

    call(
        &engine,
        "readFromFile",
        vec![s("list.txt"), listener.function("onLine"), done.function("onDone")],
    )
    .unwrap();
    fs.complete_read(Err(failed("Access denied")));

    assert_eq!(listener.count(), 0);
    assert_eq!(done.calls(), vec![vec![s("Access denied")]]);
}

#[test]
fn test_read_from_file_empty_content_completes_cleanly() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let listener = CallLog::new();
    let done = CallLog::new();

    call(
        &engine,
        "readFromFile",
        vec![s("empty.txt"), listener.function("onLine"), done.function("onDone")],
    )
    .unwrap();
    fs.complete_read(Ok(IoBuffer::new()));

    assert_eq!(listener.count(), 0);
    assert_eq!(done.calls(), vec![Vec::<ScriptValue>::new()]);
}

#[test]
fn test_read_from_file_with_non_object_global_is_fatal() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let listener = CallLog::new();
    let done = CallLog::new();
    let fatal = Arc::new(Mutex::new(Vec::new()));

    let reported = Arc::clone(&fatal);
    engine.on_fatal_error(move |err| reported.lock().unwrap().push(err.to_string()));

    call(
        &engine,
        "readFromFile",
        vec![s("list.txt"), listener.function("onLine"), done.function("onDone")],
    )
    .unwrap();
    engine.set_global(ScriptValue::Null);
    fs.complete_read(Ok(IoBuffer::from_static(b"a\nb")));

    assert_eq!(listener.count(), 0);
    assert_eq!(done.count(), 0);
    let fatal = fatal.lock().unwrap();
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].contains("`this` pointer has to be an object"));
}

#[test]
fn test_completion_after_engine_dropped_does_nothing() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let sentinel = Arc::new(());
    let fired = Arc::new(AtomicUsize::new(0));

    let held = Arc::clone(&sentinel);
    let counter = Arc::clone(&fired);
    let callback = ScriptFunction::new("cb", move |_| {
        let _ = &held;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptValue::Undefined)
    });

    call(&engine, "read", vec![s("patterns.ini"), callback.into()]).unwrap();
    assert_eq!(Arc::strong_count(&sentinel), 2);

    let weak = engine.weak();
    drop(engine);
    assert!(weak.upgrade().is_none());
    // Stored callbacks go away with the engine.
    assert_eq!(Arc::strong_count(&sentinel), 1);

    fs.complete_read(Ok(IoBuffer::from_static(b"late")));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn test_every_operation_after_engine_dropped_does_nothing() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let log = CallLog::new();

    call(&engine, "readFromFile", vec![s("a"), log.function("l"), log.function("d")]).unwrap();
    call(&engine, "write", vec![s("a"), s("data"), log.function("w")]).unwrap();
    call(&engine, "move", vec![s("a"), s("b"), log.function("m")]).unwrap();
    call(&engine, "remove", vec![s("a"), log.function("r")]).unwrap();
    call(&engine, "stat", vec![s("a"), log.function("s")]).unwrap();
    assert_eq!(engine.pending_operations(), 5);
    drop(engine);

    fs.complete_read(Ok(IoBuffer::from_static(b"x")));
    fs.complete_unit(Ok(()));
    fs.complete_unit(Err(failed("gone")));
    fs.complete_unit(Ok(()));
    fs.complete_stat(Ok(StatResult::missing()));

    assert_eq!(log.count(), 0);
}

#[test]
fn test_write_passes_buffer_without_copy() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let callback = CallLog::new();

    let content = IoBuffer::from(b"||tracker.example^".to_vec());
    let address = content.as_ptr();
    call(
        &engine,
        "write",
        vec![s("patterns.ini"), ScriptValue::Buffer(content), callback.function("cb")],
    )
    .unwrap();

    let Parked::Write(path, data, done) = fs.next() else {
        panic!("expected a parked write");
    };
    assert_eq!(path, "patterns.ini");
    assert_eq!(data.as_ptr(), address);
    assert_eq!(&data[..], b"||tracker.example^");

    done(Ok(()));
    assert_eq!(callback.calls(), vec![Vec::<ScriptValue>::new()]);
}

#[test]
fn test_write_encodes_string_content() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let callback = CallLog::new();

    call(&engine, "write", vec![s("notes.txt"), s("héllo"), callback.function("cb")]).unwrap();

    let Parked::Write(_, data, done) = fs.next() else {
        panic!("expected a parked write");
    };
    assert_eq!(&data[..], "héllo".as_bytes());
    done(Err(failed("Disk full")));
    assert_eq!(callback.calls(), vec![vec![s("Disk full")]]);
}

#[test]
fn test_move_and_remove_report_errors_as_argument() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let moved = CallLog::new();
    let removed = CallLog::new();

    call(&engine, "move", vec![s("old.ini"), s("new.ini"), moved.function("cb")]).unwrap();
    call(&engine, "remove", vec![s("new.ini"), removed.function("cb")]).unwrap();

    let Parked::Move(from, to, done) = fs.next() else {
        panic!("expected a parked move");
    };
    assert_eq!((from.as_str(), to.as_str()), ("old.ini", "new.ini"));
    done(Ok(()));

    fs.complete_unit(Err(failed("new.ini: No such file or directory")));

    assert_eq!(moved.calls(), vec![Vec::<ScriptValue>::new()]);
    assert_eq!(removed.calls(), vec![vec![s("new.ini: No such file or directory")]]);
}

#[test]
fn test_stat_always_delivers_object() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let callback = CallLog::new();

    call(&engine, "stat", vec![s("patterns.ini"), callback.function("cb")]).unwrap();
    call(&engine, "stat", vec![s("locked.ini"), callback.function("cb")]).unwrap();

    fs.complete_stat(Ok(StatResult {
        exists: true,
        is_directory: false,
        is_file: true,
        last_modified: 1_696_000_000_000,
    }));
    fs.complete_stat(Err(failed("Permission denied")));

    let calls = callback.calls();
    assert_eq!(calls.len(), 2);

    let found = calls[0][0].as_object().unwrap().clone();
    assert_eq!(found.get("exists"), ScriptValue::Bool(true));
    assert_eq!(found.get("lastModified"), ScriptValue::Number(1_696_000_000_000.0));
    assert!(!found.has("error"));

    let denied = calls[1][0].as_object().unwrap().clone();
    assert_eq!(denied.get("exists"), ScriptValue::Bool(false));
    assert_eq!(denied.get("error"), s("Permission denied"));
}

#[test]
fn test_throwing_callback_is_contained() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let fatal = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&fatal);
    engine.on_fatal_error(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let thrower = ScriptFunction::new("cb", |_| Err(ScriptException::error("oops")));
    call(&engine, "remove", vec![s("a"), thrower.into()]).unwrap();
    fs.complete_unit(Ok(()));

    assert_eq!(fatal.load(Ordering::SeqCst), 0);
    assert_eq!(engine.pending_operations(), 0);
}

#[test]
fn test_completions_fire_in_any_order() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());
    let first = CallLog::new();
    let second = CallLog::new();

    call(&engine, "read", vec![s("one"), first.function("cb")]).unwrap();
    call(&engine, "read", vec![s("two"), second.function("cb")]).unwrap();
    assert_eq!(engine.pending_operations(), 2);

    let Parked::Read(_, done_one) = fs.next() else {
        panic!("expected a parked read");
    };
    let Parked::Read(_, done_two) = fs.next() else {
        panic!("expected a parked read");
    };

    done_two(Ok(IoBuffer::from_static(b"2")));
    assert_eq!((first.count(), second.count()), (0, 1));
    done_one(Ok(IoBuffer::from_static(b"1")));
    assert_eq!((first.count(), second.count()), (1, 1));
    assert_eq!(engine.pending_operations(), 0);
}

#[test]
fn test_argument_errors_name_custom_namespace() {
    let fs = RecordingFileSystem::new();
    let engine = ScriptEngine::new(fs.clone());
    filesystem::install(&engine, "fs").unwrap();

    let err = call_in(&engine, "fs", "read", vec![s("a")]).unwrap_err();
    assert_eq!(err.message, "fs.read requires 2 parameters");
    assert_eq!(fs.calls(), 0);
}

#[test]
fn test_install_requires_object_global() {
    let engine = ScriptEngine::new(RecordingFileSystem::new());
    engine.set_global(ScriptValue::Undefined);

    let err = filesystem::install(&engine, "_fileSystem").unwrap_err();
    assert!(matches!(err, ScriptError::InvalidContext(_)));
}

#[test]
fn test_argument_error_is_type_error() {
    let fs = RecordingFileSystem::new();
    let engine = engine_with(fs.clone());

    let err = call(&engine, "stat", vec![s("a"), s("not a function")]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(err.message, "Second argument to _fileSystem.stat must be a function");
    assert_eq!(engine.pending_operations(), 0);
}
