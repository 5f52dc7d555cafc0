//! Built-in components
//!
//! - [`Transform2D`]: position, rotation, scale and origin of an object
//! - [`SpriteRenderer`]: draws a texture at the object's transform

mod sprite;
mod transform;

pub use sprite::SpriteRenderer;
pub use transform::Transform2D;
