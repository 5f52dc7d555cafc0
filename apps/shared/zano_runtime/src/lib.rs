//! Zano Runtime
//!
//! A minimal entity-component runtime with an embedded Lua bridge. An [`Instance`]
//! owns at most one component per [`ComponentKind`] and fans out the per-frame
//! `update`/`draw` calls; a [`LuaScript`] component owns its own Lua VM and lets
//! script code observe and mutate the other components of its object.
//!
//! # Architecture
//!
//! - **Component**: Trait implemented by every attachable unit (lifecycle hooks + kind)
//! - **Instance**: Registry that owns the components of one object and drives them each frame
//! - **Adapters**: Scripting runtimes exposed as components (currently Lua via mlua)
//! - **Api**: Host functions and projections installed into each script's globals
//! - **Renderer / ScriptLoader**: Seams to the collaborators that draw sprites and read files
//!
//! The runtime is single-threaded: components are shared through `Rc<RefCell<_>>`
//! and are intentionally `!Send`.

pub mod adapters;
pub mod api;
pub mod component;
pub mod components;
pub mod error;
pub mod instance;
pub mod loader;
pub mod math;
pub mod render;
pub mod time;

pub use adapters::{LuaScript, LuaScriptConfig, ScriptState};
pub use component::{Component, ComponentKind, ComponentRef, DynComponentRef, Owner};
pub use components::{SpriteRenderer, Transform2D};
pub use error::{Result, RuntimeError};
pub use instance::{Instance, WeakInstance};
pub use loader::{FsScriptLoader, ScriptLoader};
pub use math::{Color, Rect, Vec2};
pub use render::{DrawRequest, RecordingRenderer, Renderer, TextureHandle};
pub use time::FrameTime;

/// Value returned from a script function call
///
/// Script values are converted into this host-side form at the call boundary so
/// callers never hold interpreter-owned data. `Nil` doubles as the "no value"
/// result of a failed or missing call.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Nil,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Vec2(Vec2),
    /// A value with no host representation (tables, functions, foreign userdata)
    Opaque(&'static str),
}

impl ScriptValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, ScriptValue::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the value, accepting both integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Integer(value) => Some(*value as f64),
            ScriptValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            ScriptValue::Vec2(value) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_value_accessors() {
        assert!(ScriptValue::Nil.is_nil());
        assert_eq!(ScriptValue::Integer(5).as_f64(), Some(5.0));
        assert_eq!(ScriptValue::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(ScriptValue::String("hi".into()).as_str(), Some("hi"));
        assert_eq!(ScriptValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ScriptValue::Opaque("table").as_f64(), None);
        assert_eq!(
            ScriptValue::Vec2(Vec2::new(1.0, 2.0)).as_vec2(),
            Some(Vec2::new(1.0, 2.0))
        );
    }
}
