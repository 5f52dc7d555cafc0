use std::fmt;
use std::path::Path;
use std::time::Instant;

use mlua::{HookTriggers, IntoLuaMulti, Lua, Value, VmState};
use tracing::{debug, warn};

use super::{LuaScriptConfig, RUNTIME_NAME, to_script_value};
use crate::ScriptValue;
use crate::api::{ConsoleApi, install_host_api};
use crate::component::{Component, ComponentKind, Owner};
use crate::error::{Result, RuntimeError};
use crate::loader::{FsScriptLoader, ScriptLoader, resolve_script};
use crate::time::FrameTime;

/// Lifecycle state of a [`LuaScript`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptState {
    /// Not attached; no VM exists
    Detached,
    /// VM created and source executed
    Loaded,
    /// `init` has run (or there was none)
    Initialized,
    /// At least one `update` has been dispatched
    Running,
}

impl ScriptState {
    pub fn is_initialized(&self) -> bool {
        matches!(self, ScriptState::Initialized | ScriptState::Running)
    }
}

/// Component that runs a Lua script against its owning instance
///
/// The script gets its own VM when attached and loses it when removed. While
/// attached, `init()` is called once and `update(total_seconds)` every frame, if
/// the script defines them. Script failures never propagate: they are logged
/// with the `runtime` and `object` fields and counted in
/// [`error_count`](LuaScript::error_count).
pub struct LuaScript {
    owner: Owner,
    source: String,
    chunk_name: String,
    config: LuaScriptConfig,
    lua: Option<Lua>,
    state: ScriptState,
    error_count: u32,
}

impl LuaScript {
    /// Create a script from source text
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            owner: Owner::default(),
            source: source.into(),
            chunk_name: "inline".to_string(),
            config: LuaScriptConfig::default(),
            lua: None,
            state: ScriptState::Detached,
            error_count: 0,
        }
    }

    /// Load a script file, looking next to the executable first
    ///
    /// # Errors
    /// [`RuntimeError::ScriptNotFound`] if the file exists in neither location
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with(&FsScriptLoader::new(), path)
    }

    /// Load a script file through `loader`
    pub fn from_file_with(loader: &dyn ScriptLoader, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (resolved, source) = resolve_script(loader, path)?;
        debug!("Loaded Lua script {} ({} bytes)", resolved.display(), source.len());

        let mut script = Self::new(source);
        script.chunk_name = path.display().to_string();
        Ok(script)
    }

    pub fn with_config(mut self, config: LuaScriptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    /// Name the source was loaded under (`"inline"` or the requested path)
    pub fn chunk_name(&self) -> &str {
        &self.chunk_name
    }

    pub fn config(&self) -> &LuaScriptConfig {
        &self.config
    }

    /// Number of script failures caught so far
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Whether the script defines a global function called `name`
    pub fn has_function(&self, name: &str) -> bool {
        self.lua
            .as_ref()
            .and_then(|lua| lua.globals().get::<Value>(name).ok())
            .is_some_and(|value| matches!(value, Value::Function(_)))
    }

    /// Call a global script function and return its first result
    ///
    /// Returns [`ScriptValue::Nil`] if the script is not attached, the function
    /// does not exist, or the call fails. Failures are logged.
    pub fn call_function(&mut self, name: &str, args: impl IntoLuaMulti) -> ScriptValue {
        let Some(lua) = self.lua.as_ref() else {
            debug!("call_function('{}') on detached script {}", name, self.chunk_name);
            return ScriptValue::Nil;
        };

        let function = match lua.globals().get::<Value>(name) {
            Ok(Value::Function(function)) => function,
            Ok(_) => return ScriptValue::Nil,
            Err(e) => {
                self.report(name, e);
                return ScriptValue::Nil;
            }
        };

        match call_with_budget(lua, &self.config, || function.call::<Value>(args)) {
            Ok(value) => to_script_value(&value),
            Err(e) => {
                self.report(name, e);
                ScriptValue::Nil
            }
        }
    }

    fn object_name(&self) -> String {
        self.owner
            .instance()
            .map(|instance| instance.name().to_string())
            .unwrap_or_else(|| "<detached>".to_string())
    }

    fn report(&mut self, phase: &str, err: mlua::Error) {
        self.error_count += 1;
        let err = RuntimeError::from(err);
        ConsoleApi::error(
            RUNTIME_NAME,
            &self.object_name(),
            &format!("{} failed in {}: {}", self.chunk_name, phase, err),
        );
    }

    /// Call the global function `name` if the script defines one
    fn call_hook(&mut self, name: &str, args: impl IntoLuaMulti) {
        let Some(lua) = self.lua.as_ref() else {
            return;
        };
        let result = match lua.globals().get::<Value>(name) {
            Ok(Value::Function(function)) => {
                call_with_budget(lua, &self.config, || function.call::<()>(args))
            }
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            self.report(name, e);
        }
    }
}

/// Run `f` with the configured call budget enforced by an instruction hook
fn call_with_budget<T>(
    lua: &Lua,
    config: &LuaScriptConfig,
    f: impl FnOnce() -> mlua::Result<T>,
) -> mlua::Result<T> {
    let Some(max_duration) = config.max_call_duration() else {
        return f();
    };

    let started = Instant::now();
    let budget_ms = max_duration.as_secs_f64() * 1000.0;
    lua.set_hook(
        HookTriggers::new().every_nth_instruction(config.instruction_interval()),
        move |_lua, _debug| {
            if started.elapsed() >= max_duration {
                return Err(mlua::Error::RuntimeError(format!(
                    "Script execution budget exceeded ({budget_ms:.1}ms)"
                )));
            }
            Ok(VmState::Continue)
        },
    );
    let out = f();
    lua.remove_hook();
    out
}

impl Component for LuaScript {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Script
    }

    fn owner(&self) -> &Owner {
        &self.owner
    }

    fn owner_mut(&mut self) -> &mut Owner {
        &mut self.owner
    }

    fn on_added(&mut self) {
        let Some(instance) = self.owner.weak().cloned() else {
            warn!("Lua script {} attached without an owner", self.chunk_name);
            return;
        };

        let lua = Lua::new();
        if let Err(e) = install_host_api(&lua, RUNTIME_NAME, &instance) {
            self.report("host API setup", e);
        }

        let chunk = lua.load(self.source.as_str()).set_name(self.chunk_name.as_str());
        if let Err(e) = call_with_budget(&lua, &self.config, || chunk.exec()) {
            self.report("load", e);
        }
        self.lua = Some(lua);
        self.state = ScriptState::Loaded;
        debug!("Lua script {} loaded for '{}'", self.chunk_name, self.object_name());

        self.call_hook("init", ());
        self.state = ScriptState::Initialized;
    }

    fn on_removed(&mut self) {
        self.lua = None;
        self.state = ScriptState::Detached;
        debug!("Lua script {} unloaded", self.chunk_name);
    }

    fn update(&mut self, time: &FrameTime) {
        if !self.state.is_initialized() {
            return;
        }
        self.state = ScriptState::Running;
        self.call_hook("update", time.total);
    }
}

impl fmt::Debug for LuaScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuaScript")
            .field("chunk_name", &self.chunk_name)
            .field("owner", &self.owner)
            .field("state", &self.state)
            .field("error_count", &self.error_count)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
