//! Runtime Adapters
//!
//! Scripting runtimes exposed as components. Each adapter owns its interpreter,
//! installs the host API from [`crate::api`] into it and drives the script's
//! callbacks from the component lifecycle.

pub mod lua;

pub use lua::{LuaScript, LuaScriptConfig, ScriptState};
