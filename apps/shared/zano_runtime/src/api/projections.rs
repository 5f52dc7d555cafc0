//! Script-visible projections of host data
//!
//! Every host type a script can see is listed here together with its copy
//! semantics:
//!
//! | Type | Semantics | Script surface |
//! |---|---|---|
//! | [`LuaInstance`] | reference | `name`, `getTransform()`, `getSprite()` |
//! | [`LuaTransform`] | reference | `position`, `rotation`, `scale`, `origin` |
//! | [`LuaSprite`] | reference | `layer`, `getColor()`, `setColor(r, g, b[, a])`, `hasTexture()` |
//! | [`LuaVec2`] | snapshot | `x`, `y`, `add`, `subtract`, `scale`, `multiply`, `length`, `+ - * ==`, `tostring` |
//!
//! Reference projections hold a weak handle to a live component and read/write
//! through it on every access. Snapshot projections are plain copies: changing
//! `x` on a vector read from `transform.position` does not move the transform;
//! the whole vector has to be assigned back.

use std::cell::RefCell;
use std::rc::Weak;

use mlua::{FromLua, Lua, MetaMethod, UserData, UserDataFields, UserDataMethods, Value};

use crate::component::{Component, ComponentKind, ComponentRef};
use crate::components::{SpriteRenderer, Transform2D};
use crate::instance::WeakInstance;
use crate::math::{Color, Vec2};

/// Snapshot projection of a [`Vec2`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuaVec2(pub Vec2);

impl UserData for LuaVec2 {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("x", |_, this| Ok(this.0.x));
        fields.add_field_method_set("x", |_, this, value: f32| {
            this.0.x = value;
            Ok(())
        });
        fields.add_field_method_get("y", |_, this| Ok(this.0.y));
        fields.add_field_method_set("y", |_, this, value: f32| {
            this.0.y = value;
            Ok(())
        });
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("add", |_, this, other: LuaVec2| Ok(LuaVec2(this.0 + other.0)));
        methods.add_method("subtract", |_, this, other: LuaVec2| Ok(LuaVec2(this.0 - other.0)));
        methods.add_method("scale", |_, this, scalar: f32| Ok(LuaVec2(this.0 * scalar)));
        methods.add_method("multiply", |_, this, scalar: f32| Ok(LuaVec2(this.0 * scalar)));
        methods.add_method("length", |_, this, ()| Ok(this.0.length()));

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.0.to_string()));
        // Comparing against any other userdata is plain inequality
        methods.add_meta_method(MetaMethod::Eq, |_, this, other: Value| {
            Ok(match other {
                Value::UserData(other) => other
                    .borrow::<LuaVec2>()
                    .is_ok_and(|other| this.0 == other.0),
                _ => false,
            })
        });
        methods.add_meta_method(MetaMethod::Unm, |_, this, ()| Ok(LuaVec2(-this.0)));
        methods.add_meta_function(MetaMethod::Add, |_, (lhs, rhs): (LuaVec2, LuaVec2)| {
            Ok(LuaVec2(lhs.0 + rhs.0))
        });
        methods.add_meta_function(MetaMethod::Sub, |_, (lhs, rhs): (LuaVec2, LuaVec2)| {
            Ok(LuaVec2(lhs.0 - rhs.0))
        });
        // Accept both `v * 2` and `2 * v`
        methods.add_meta_function(MetaMethod::Mul, |lua, (lhs, rhs): (Value, Value)| {
            let (vector, scalar) = if matches!(lhs, Value::UserData(_)) {
                (lhs, rhs)
            } else {
                (rhs, lhs)
            };
            let vector = LuaVec2::from_lua(vector, lua)?;
            let scalar = f32::from_lua(scalar, lua)?;
            Ok(LuaVec2(vector.0 * scalar))
        });
    }
}

impl FromLua for LuaVec2 {
    fn from_lua(value: Value, _lua: &Lua) -> mlua::Result<Self> {
        match value {
            Value::UserData(ud) => Ok(*ud.borrow::<LuaVec2>()?),
            Value::Table(table) => Ok(LuaVec2(Vec2::new(table.get("x")?, table.get("y")?))),
            other => Err(mlua::Error::RuntimeError(format!(
                "expected vec2(x, y) or {{x = .., y = ..}}, got {}",
                other.type_name()
            ))),
        }
    }
}

/// Run `f` on a live component behind a weak handle
///
/// Fails if the component was dropped, detached from its instance, or is
/// currently borrowed elsewhere.
fn with_live<T: Component, R>(
    target: &Weak<RefCell<T>>,
    what: &str,
    f: impl FnOnce(&mut T) -> R,
) -> mlua::Result<R> {
    let handle = target
        .upgrade()
        .ok_or_else(|| mlua::Error::RuntimeError(format!("{what} is no longer attached")))?;
    let mut component = handle
        .try_borrow_mut()
        .map_err(|_| mlua::Error::RuntimeError(format!("{what} is in use")))?;
    if !component.owner().is_attached() {
        return Err(mlua::Error::RuntimeError(format!("{what} is no longer attached")));
    }
    Ok(f(&mut component))
}

/// Reference projection of a [`Transform2D`]
#[derive(Clone)]
pub struct LuaTransform {
    transform: Weak<RefCell<Transform2D>>,
}

impl LuaTransform {
    pub fn new(transform: &ComponentRef<Transform2D>) -> Self {
        Self {
            transform: std::rc::Rc::downgrade(transform),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Transform2D) -> R) -> mlua::Result<R> {
        with_live(&self.transform, "transform", f)
    }
}

impl UserData for LuaTransform {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("position", |_, this| this.with(|t| LuaVec2(t.position)));
        fields.add_field_method_set("position", |_, this, value: LuaVec2| {
            this.with(|t| t.position = value.0)
        });

        fields.add_field_method_get("rotation", |_, this| this.with(|t| t.rotation as f64));
        fields.add_field_method_set("rotation", |_, this, value: f64| {
            this.with(|t| t.rotation = value as f32)
        });

        fields.add_field_method_get("scale", |_, this| this.with(|t| LuaVec2(t.scale)));
        fields.add_field_method_set("scale", |_, this, value: LuaVec2| {
            this.with(|t| t.scale = value.0)
        });

        fields.add_field_method_get("origin", |_, this| this.with(|t| LuaVec2(t.origin)));
        fields.add_field_method_set("origin", |_, this, value: LuaVec2| {
            this.with(|t| t.origin = value.0)
        });
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            this.with(|t| {
                format!(
                    "Transform2D(position={}, rotation={}, scale={}, origin={})",
                    t.position, t.rotation, t.scale, t.origin
                )
            })
        });
    }
}

/// Reference projection of a [`SpriteRenderer`]
#[derive(Clone)]
pub struct LuaSprite {
    sprite: Weak<RefCell<SpriteRenderer>>,
}

impl LuaSprite {
    pub fn new(sprite: &ComponentRef<SpriteRenderer>) -> Self {
        Self {
            sprite: std::rc::Rc::downgrade(sprite),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SpriteRenderer) -> R) -> mlua::Result<R> {
        with_live(&self.sprite, "sprite", f)
    }
}

impl UserData for LuaSprite {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("layer", |_, this| this.with(|s| s.layer as f64));
        fields.add_field_method_set("layer", |_, this, value: f64| {
            this.with(|s| s.layer = value as f32)
        });
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("getColor", |_, this, ()| {
            this.with(|s| (s.color.r, s.color.g, s.color.b, s.color.a))
        });
        methods.add_method(
            "setColor",
            |_, this, (r, g, b, a): (u8, u8, u8, Option<u8>)| {
                this.with(|s| s.color = Color::rgba(r, g, b, a.unwrap_or(255)))
            },
        );
        methods.add_method("hasTexture", |_, this, ()| this.with(|s| s.texture.is_some()));
    }
}

/// Reference projection of the owning [`Instance`](crate::Instance)
///
/// `getTransform` and `getSprite` are exposed as fields holding functions, so
/// both `instance.getTransform()` and `instance:getTransform()` work.
pub struct LuaInstance {
    instance: WeakInstance,
}

impl LuaInstance {
    pub fn new(instance: WeakInstance) -> Self {
        Self { instance }
    }
}

fn transform_projection(instance: &WeakInstance) -> Option<LuaTransform> {
    let handle = instance
        .upgrade()?
        .get_as::<Transform2D>(ComponentKind::Transform)?;
    Some(LuaTransform::new(&handle))
}

fn sprite_projection(instance: &WeakInstance) -> Option<LuaSprite> {
    let handle = instance
        .upgrade()?
        .get_as::<SpriteRenderer>(ComponentKind::Sprite)?;
    Some(LuaSprite::new(&handle))
}

impl UserData for LuaInstance {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("name", |_, this| {
            Ok(this.instance.upgrade().map(|i| i.name().to_string()))
        });
        fields.add_field_method_get("getTransform", |lua, this| {
            let instance = this.instance.clone();
            lua.create_function(move |_, ()| Ok(transform_projection(&instance)))
        });
        fields.add_field_method_get("getSprite", |lua, this| {
            let instance = this.instance.clone();
            lua.create_function(move |_, ()| Ok(sprite_projection(&instance)))
        });
    }
}
