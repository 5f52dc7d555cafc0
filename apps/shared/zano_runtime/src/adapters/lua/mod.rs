//! Lua Runtime Adapter (mlua, Lua 5.4)
//!
//! Provides per-object Lua scripts as [`LuaScript`] components.

mod config;
mod script;
mod value;

pub use config::LuaScriptConfig;
pub use script::{LuaScript, ScriptState};
pub use value::to_script_value;

/// Runtime name used in the `runtime` field of script log records
pub const RUNTIME_NAME: &str = "lua";
