use mlua::Value;

use crate::ScriptValue;
use crate::api::LuaVec2;

/// Convert a Lua value into its host-side form
///
/// Strings are decoded lossily. Values without a host representation become
/// [`ScriptValue::Opaque`] carrying the Lua type name.
pub fn to_script_value(value: &Value) -> ScriptValue {
    match value {
        Value::Nil => ScriptValue::Nil,
        Value::Boolean(b) => ScriptValue::Bool(*b),
        Value::Integer(i) => ScriptValue::Integer(*i),
        Value::Number(n) => ScriptValue::Number(*n),
        Value::String(s) => ScriptValue::String(s.to_string_lossy().to_string()),
        Value::UserData(ud) => match ud.borrow::<LuaVec2>() {
            Ok(v) => ScriptValue::Vec2(v.0),
            Err(_) => ScriptValue::Opaque(value.type_name()),
        },
        other => ScriptValue::Opaque(other.type_name()),
    }
}
