//! Component trait and kind identifiers
//!
//! A component is an attachable unit of data or behavior. Each concrete
//! component reports a [`ComponentKind`], which is the key it is stored under in
//! its owning [`Instance`]; an instance holds at most one component per kind.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::instance::{Instance, WeakInstance};
use crate::render::Renderer;
use crate::time::FrameTime;

/// Shared handle to a concrete component
pub type ComponentRef<T> = Rc<RefCell<T>>;

/// Type-erased handle to an attached component
pub type DynComponentRef = Rc<RefCell<dyn Component>>;

/// Stable identifier of a component variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Transform,
    Sprite,
    Script,
    /// Application-defined component kind
    Custom(&'static str),
}

impl ComponentKind {
    /// Get the lowercase name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Transform => "transform",
            ComponentKind::Sprite => "sprite",
            ComponentKind::Script => "script",
            ComponentKind::Custom(name) => *name,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-owning back-reference from a component to the instance it is attached to
///
/// Set by the registry right before `on_added` and cleared right after
/// `on_removed`. It never keeps the instance alive.
#[derive(Clone, Default)]
pub struct Owner(Option<WeakInstance>);

impl Owner {
    /// The owning instance, if attached and still alive
    pub fn instance(&self) -> Option<Instance> {
        self.0.as_ref().and_then(WeakInstance::upgrade)
    }

    pub fn weak(&self) -> Option<&WeakInstance> {
        self.0.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.0.is_some()
    }

    pub(crate) fn set(&mut self, instance: WeakInstance) {
        self.0 = Some(instance);
    }

    pub(crate) fn clear(&mut self) {
        self.0 = None;
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance() {
            Some(instance) => write!(f, "Owner({})", instance.name()),
            None if self.is_attached() => f.write_str("Owner(<dropped>)"),
            None => f.write_str("Owner(<detached>)"),
        }
    }
}

/// Trait that every attachable unit implements
///
/// Lifecycle: `on_added` fires once per attach, then `update`/`draw` once per
/// frame while attached, then `on_removed` on detach. A component can be attached
/// again after removal; it then gets a fresh `on_added`.
pub trait Component: Any {
    /// Kind this component is registered under
    fn kind(&self) -> ComponentKind;

    fn owner(&self) -> &Owner;

    fn owner_mut(&mut self) -> &mut Owner;

    /// Called right after the component has been attached to an instance
    fn on_added(&mut self) {}

    /// Called right before the component is detached from its instance
    fn on_removed(&mut self) {}

    /// Called once per frame during the update pass
    fn update(&mut self, _time: &FrameTime) {}

    /// Called once per frame during the draw pass
    fn draw(&mut self, _time: &FrameTime, _renderer: &mut dyn Renderer) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ComponentKind::Transform.to_string(), "transform");
        assert_eq!(ComponentKind::Sprite.name(), "sprite");
        assert_eq!(ComponentKind::Script.name(), "script");
        assert_eq!(ComponentKind::Custom("health").to_string(), "health");
    }

    #[test]
    fn test_owner_starts_detached() {
        let owner = Owner::default();
        assert!(!owner.is_attached());
        assert!(owner.instance().is_none());
        assert_eq!(format!("{:?}", owner), "Owner(<detached>)");
    }

    #[test]
    fn test_owner_does_not_keep_instance_alive() {
        let instance = Instance::new("temp");
        let mut owner = Owner::default();
        owner.set(instance.downgrade());
        assert_eq!(owner.instance().map(|i| i.name().to_string()), Some("temp".into()));

        drop(instance);
        assert!(owner.is_attached());
        assert!(owner.instance().is_none());
    }
}
