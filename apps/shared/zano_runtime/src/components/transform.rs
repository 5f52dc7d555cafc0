use crate::component::{Component, ComponentKind, Owner};
use crate::math::Vec2;

/// Stores the 2D transformation of an object
#[derive(Debug, Clone)]
pub struct Transform2D {
    owner: Owner,
    pub position: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    pub scale: Vec2,
    /// Pivot for rotation and scaling, in texture pixels (0,0 = top-left)
    pub origin: Vec2,
}

impl Transform2D {
    pub fn new(position: Vec2) -> Self {
        Self {
            owner: Owner::default(),
            position,
            rotation: 0.0,
            scale: Vec2::ONE,
            origin: Vec2::ZERO,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Component for Transform2D {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Transform
    }

    fn owner(&self) -> &Owner {
        &self.owner
    }

    fn owner_mut(&mut self) -> &mut Owner {
        &mut self.owner
    }
}
