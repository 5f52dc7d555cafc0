//! Renderer seam
//!
//! The runtime never talks to a graphics backend directly. Components that draw
//! build a [`DrawRequest`] and hand it to whatever [`Renderer`] the frame driver
//! passes to [`Instance::draw`](crate::Instance::draw).

use crate::math::{Color, Rect, Vec2};

/// Opaque reference to a texture owned by the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

impl TextureHandle {
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    /// Rectangle covering the whole texture
    pub fn full_rect(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

/// A single textured-quad draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRequest {
    pub texture: TextureHandle,
    pub position: Vec2,
    pub source: Rect,
    pub tint: Color,
    /// Rotation in radians
    pub rotation: f32,
    pub origin: Vec2,
    pub scale: Vec2,
    /// Layer depth (0 = front, 1 = back)
    pub layer: f32,
}

/// Backend that accepts draw requests synchronously during `draw`
pub trait Renderer {
    fn draw(&mut self, request: &DrawRequest);
}

/// Renderer that keeps every request it receives
///
/// Useful for headless runs and for asserting on what a frame drew.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub requests: Vec<DrawRequest>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&DrawRequest> {
        self.requests.last()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, request: &DrawRequest) {
        self.requests.push(request.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_rect() {
        let texture = TextureHandle::new(7, 50, 40);
        assert_eq!(texture.full_rect(), Rect::new(0, 0, 50, 40));
    }
}
