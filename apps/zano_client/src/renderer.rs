use tracing::trace;
use zano_runtime::{DrawRequest, Renderer};

/// Headless renderer that logs draw calls instead of issuing them
#[derive(Debug, Default)]
pub struct TracingRenderer {
    draws: u64,
    last: Option<DrawRequest>,
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of draw calls received so far
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn last(&self) -> Option<&DrawRequest> {
        self.last.as_ref()
    }
}

impl Renderer for TracingRenderer {
    fn draw(&mut self, request: &DrawRequest) {
        self.draws += 1;
        trace!(
            "draw texture #{} at {} rot={:.3} scale={} tint=({}, {}, {}, {}) layer={}",
            request.texture.id,
            request.position,
            request.rotation,
            request.scale,
            request.tint.r,
            request.tint.g,
            request.tint.b,
            request.tint.a,
            request.layer
        );
        self.last = Some(request.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zano_runtime::{Color, Rect, TextureHandle, Vec2};

    #[test]
    fn test_counts_and_keeps_last_request() {
        let mut renderer = TracingRenderer::new();
        let request = DrawRequest {
            texture: TextureHandle::new(7, 8, 8),
            position: Vec2::new(1.0, 2.0),
            source: Rect::new(0, 0, 8, 8),
            tint: Color::WHITE,
            rotation: 0.0,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            layer: 0.0,
        };

        renderer.draw(&request);
        renderer.draw(&request);

        assert_eq!(renderer.draws(), 2);
        assert_eq!(renderer.last().map(|r| r.texture.id), Some(7));
    }
}
