//! # Core Runtime Module
//!
//! Ambient infrastructure shared by the bridge crates:
//! - Logging and tracing setup
//! - Configuration and capability injection
//!
//! ## Overview
//!
//! The embedder builds a [`CoreConfig`](config::CoreConfig), optionally calls
//! [`init_logging`](logging::init_logging), and hands the config to
//! `core_script::ScriptEngine::from_config`.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
