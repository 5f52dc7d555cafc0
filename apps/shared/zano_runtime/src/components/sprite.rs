use tracing::trace;

use crate::component::{Component, ComponentKind, Owner};
use crate::components::Transform2D;
use crate::math::{Color, Rect};
use crate::render::{DrawRequest, Renderer, TextureHandle};
use crate::time::FrameTime;

/// Draws a texture using the transform of the owning instance
///
/// Nothing is drawn while the sprite has no texture or its instance has no
/// [`Transform2D`].
#[derive(Debug, Clone)]
pub struct SpriteRenderer {
    owner: Owner,
    pub texture: Option<TextureHandle>,
    /// Region of the texture to draw; the whole texture when `None`
    pub source_rect: Option<Rect>,
    pub color: Color,
    /// Layer depth (0 = front, 1 = back)
    pub layer: f32,
}

impl SpriteRenderer {
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            owner: Owner::default(),
            texture: Some(texture),
            source_rect: None,
            color: Color::WHITE,
            layer: 0.0,
        }
    }

    /// Create a sprite that draws only `source_rect` of `texture`
    pub fn with_source_rect(texture: TextureHandle, source_rect: Rect) -> Self {
        Self {
            source_rect: Some(source_rect),
            ..Self::new(texture)
        }
    }

    /// Build the draw request for the current frame, if anything should be drawn
    pub fn draw_request(&self) -> Option<DrawRequest> {
        let texture = self.texture?;
        let instance = self.owner.instance()?;
        let transform = instance.get_as::<Transform2D>(ComponentKind::Transform)?;
        let transform = transform.try_borrow().ok()?;

        Some(DrawRequest {
            texture,
            position: transform.position,
            source: self.source_rect.unwrap_or_else(|| texture.full_rect()),
            tint: self.color,
            rotation: transform.rotation,
            origin: transform.origin,
            scale: transform.scale,
            layer: self.layer,
        })
    }
}

impl Component for SpriteRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Sprite
    }

    fn owner(&self) -> &Owner {
        &self.owner
    }

    fn owner_mut(&mut self) -> &mut Owner {
        &mut self.owner
    }

    fn draw(&mut self, _time: &FrameTime, renderer: &mut dyn Renderer) {
        match self.draw_request() {
            Some(request) => renderer.draw(&request),
            None => trace!("Sprite has nothing to draw"),
        }
    }
}
