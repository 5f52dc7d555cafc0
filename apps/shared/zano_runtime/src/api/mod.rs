//! Host API exposed to scripts
//!
//! The host API is runtime-agnostic in its semantics (which object a script sees,
//! how values are copied), while the `UserData` impls in [`projections`] bind it
//! to Lua. Every script VM gets exactly the globals in [`HOST_GLOBALS`] on top of
//! the Lua standard library.

pub mod console;
pub mod projections;

pub use console::ConsoleApi;
pub use projections::{LuaInstance, LuaSprite, LuaTransform, LuaVec2};

use mlua::Lua;

use crate::instance::WeakInstance;
use crate::math::Vec2;

/// Globals installed by [`install_host_api`]
pub const HOST_GLOBALS: [&str; 3] = ["instance", "print", "vec2"];

/// Install the host API into a fresh VM
///
/// # Arguments
/// * `lua` - The VM owned by the script component
/// * `runtime` - Runtime name used in log records (`"lua"`)
/// * `instance` - The object that owns the script
pub fn install_host_api(lua: &Lua, runtime: &'static str, instance: &WeakInstance) -> mlua::Result<()> {
    let globals = lua.globals();
    let object = instance
        .upgrade()
        .map(|i| i.name().to_string())
        .unwrap_or_default();

    globals.set("instance", LuaInstance::new(instance.clone()))?;
    globals.set("print", console::create_print_function(lua, runtime, object)?)?;
    globals.set(
        "vec2",
        lua.create_function(|_, (x, y): (Option<f32>, Option<f32>)| {
            Ok(LuaVec2(Vec2::new(x.unwrap_or(0.0), y.unwrap_or(0.0))))
        })?,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{SpriteRenderer, Transform2D};
    use crate::instance::Instance;
    use crate::math::Color;
    use crate::render::TextureHandle;
    use crate::ComponentKind;

    fn vm_for(instance: &Instance) -> Lua {
        let lua = Lua::new();
        install_host_api(&lua, "lua", &instance.downgrade()).unwrap();
        lua
    }

    #[test]
    fn test_globals_installed() {
        let instance = Instance::new("probe");
        let lua = vm_for(&instance);
        for name in HOST_GLOBALS {
            let value: mlua::Value = lua.globals().get(name).unwrap();
            assert!(!matches!(value, mlua::Value::Nil), "{name} missing");
        }
        let name: String = lua.load("return instance.name").eval().unwrap();
        assert_eq!(name, "probe");
    }

    #[test]
    fn test_vec2_arithmetic() {
        let instance = Instance::new("math");
        let lua = vm_for(&instance);

        let (x, y): (f32, f32) = lua
            .load("local v = vec2(1, 2):add(vec2(1, 1)):scale(2) return v.x, v.y")
            .eval()
            .unwrap();
        assert_eq!((x, y), (4.0, 6.0));

        let (x, y): (f32, f32) = lua
            .load("local v = 2 * (vec2(3, 4) - vec2(1, 1)) return v.x, v.y")
            .eval()
            .unwrap();
        assert_eq!((x, y), (4.0, 6.0));

        let len: f32 = lua.load("return vec2(3, 4):length()").eval().unwrap();
        assert_eq!(len, 5.0);

        let equal: bool = lua.load("return vec2(1, 2) == vec2(1, 2)").eval().unwrap();
        assert!(equal);

        let neg: f32 = lua.load("return (-vec2(1, 2)).y").eval().unwrap();
        assert_eq!(neg, -2.0);

        let text: String = lua.load("return tostring(vec2(3, 4))").eval().unwrap();
        assert_eq!(text, "(3, 4)");
    }

    #[test]
    fn test_vec2_compares_unequal_to_other_userdata() {
        let instance = Instance::new("mover");
        instance.add(Transform2D::default()).unwrap();
        let lua = vm_for(&instance);

        let (eq, ne): (bool, bool) = lua
            .load(
                r#"
                local t = instance:getTransform()
                return vec2(1, 2) == t, vec2(0, 0) ~= instance
                "#,
            )
            .eval()
            .unwrap();

        assert!(!eq);
        assert!(ne);
    }

    #[test]
    fn test_vec2_accepts_tables() {
        let instance = Instance::new("math");
        let lua = vm_for(&instance);
        let x: f32 = lua.load("return vec2(1, 1):add({x = 2, y = 3}).x").eval().unwrap();
        assert_eq!(x, 3.0);

        let err = lua.load("return vec2(1, 1):add(5)").eval::<f32>().unwrap_err();
        assert!(err.to_string().contains("expected vec2"));
    }

    #[test]
    fn test_transform_projection_is_live() {
        let instance = Instance::new("mover");
        let transform = instance.add(Transform2D::default()).unwrap();
        let lua = vm_for(&instance);

        lua.load(
            r#"
            local t = instance.getTransform()
            t.position = vec2(10, 20)
            t.rotation = 1.5
            t.scale = {x = 2, y = 2}
            "#,
        )
        .exec()
        .unwrap();

        let t = transform.borrow();
        assert_eq!(t.position, Vec2::new(10.0, 20.0));
        assert_eq!(t.rotation, 1.5);
        assert_eq!(t.scale, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_vec2_snapshot_does_not_write_back() {
        let instance = Instance::new("mover");
        let transform = instance.add(Transform2D::new(Vec2::new(1.0, 2.0))).unwrap();
        let lua = vm_for(&instance);

        lua.load("local p = instance:getTransform().position p.x = 999")
            .exec()
            .unwrap();

        assert_eq!(transform.borrow().position, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_missing_components_are_nil() {
        let instance = Instance::new("bare");
        let lua = vm_for(&instance);
        let (t, s): (bool, bool) = lua
            .load("return instance.getTransform() == nil, instance:getSprite() == nil")
            .eval()
            .unwrap();
        assert!(t && s);
    }

    #[test]
    fn test_transform_projection_errors_after_removal() {
        let instance = Instance::new("mover");
        instance.add(Transform2D::default()).unwrap();
        let lua = vm_for(&instance);
        lua.load("held = instance.getTransform()").exec().unwrap();

        assert!(instance.remove(ComponentKind::Transform));

        let err = lua.load("return held.position").exec().unwrap_err();
        assert!(err.to_string().contains("no longer attached"));
    }

    #[test]
    fn test_sprite_projection() {
        let instance = Instance::new("sprite");
        let sprite = instance
            .add(SpriteRenderer::new(TextureHandle::new(1, 50, 50)))
            .unwrap();
        let lua = vm_for(&instance);

        let (r, g, b, a, textured): (u8, u8, u8, u8, bool) = lua
            .load(
                r#"
                local s = instance.getSprite()
                s.layer = 0.5
                s:setColor(10, 20, 30)
                local r, g, b, a = s:getColor()
                return r, g, b, a, s:hasTexture()
                "#,
            )
            .eval()
            .unwrap();

        assert_eq!((r, g, b, a), (10, 20, 30, 255));
        assert!(textured);
        let sprite = sprite.borrow();
        assert_eq!(sprite.layer, 0.5);
        assert_eq!(sprite.color, Color::rgba(10, 20, 30, 255));
    }
}
