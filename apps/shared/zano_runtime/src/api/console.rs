//! Console API abstraction
//!
//! Bridges script output to the tracing system. Every event carries the
//! `runtime` and `object` fields so the log formatter can render it as
//! `lua::<object>: message`.

use mlua::{Function, Lua, Value, Variadic};
use tracing::{error, info};

/// Console API implementation
#[derive(Clone)]
pub struct ConsoleApi;

impl ConsoleApi {
    /// Log an info message
    pub fn log(runtime: &str, object: &str, message: &str) {
        info!(runtime = runtime, object = object, "{}", message);
    }

    /// Log an error message
    pub fn error(runtime: &str, object: &str, message: &str) {
        error!(runtime = runtime, object = object, "{}", message);
    }
}

/// Build the script-side `print(...)` function for one object
///
/// Arguments are converted with Lua's own `tostring` and joined with tabs,
/// matching stock Lua `print` output.
pub(crate) fn create_print_function(lua: &Lua, runtime: &'static str, object: String) -> mlua::Result<Function> {
    lua.create_function(move |lua, args: Variadic<Value>| {
        let tostring: Function = lua.globals().get("tostring")?;
        let mut parts = Vec::with_capacity(args.len());
        for value in args.iter() {
            parts.push(tostring.call::<String>(value.clone())?);
        }
        ConsoleApi::log(runtime, &object, &parts.join("\t"));
        Ok(())
    })
}
