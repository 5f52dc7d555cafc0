//! Instance - per-object component registry
//!
//! An [`Instance`] owns the components attached to one object, keyed by
//! [`ComponentKind`], and fans out the per-frame `update`/`draw` calls to them in
//! attach order.
//!
//! # Ownership
//!
//! The registry is the sole owner of attached components. Components point back
//! to their instance through a [`WeakInstance`], so dropping the last
//! [`Instance`] handle frees the object even while components still reference it.
//!
//! # Mutation during a frame pass
//!
//! `update` and `draw` iterate a snapshot of the attached components taken when
//! the pass starts. A component added during a pass is first visited on the next
//! pass; a component removed during a pass is still visited in the current one.
//!
//! A component that removes itself from inside its own hook is erased from the
//! registry at once, but its `on_removed` runs and its owner is cleared only
//! after that hook returns.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::component::{Component, ComponentKind, ComponentRef, DynComponentRef};
use crate::error::{Result, RuntimeError};
use crate::render::Renderer;
use crate::time::FrameTime;

/// One attached component, reachable both through dynamic dispatch and by type
struct Slot {
    kind: ComponentKind,
    component: DynComponentRef,
    typed: Rc<dyn Any>,
}

struct InstanceInner {
    name: String,
    slots: RefCell<Vec<Slot>>,
    /// Erased while borrowed; `on_removed` still owed
    pending_removals: RefCell<Vec<(ComponentKind, DynComponentRef)>>,
}

/// Handle to an object and its component registry
///
/// Cloning the handle is cheap and shares the same registry.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

/// Non-owning handle to an [`Instance`]
#[derive(Clone)]
pub struct WeakInstance {
    inner: Weak<InstanceInner>,
}

impl WeakInstance {
    pub fn upgrade(&self) -> Option<Instance> {
        self.inner.upgrade().map(|inner| Instance { inner })
    }
}

impl fmt::Debug for WeakInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(instance) => write!(f, "WeakInstance({})", instance.name()),
            None => f.write_str("WeakInstance(<dropped>)"),
        }
    }
}

impl Instance {
    /// Create a new empty instance
    ///
    /// # Arguments
    /// * `name` - Object name, used to tag log output from its scripts
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(InstanceInner {
                name: name.into(),
                slots: RefCell::new(Vec::new()),
                pending_removals: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same object
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Attach a component to this instance
    ///
    /// The component is stored under its [`Component::kind`], its owner is set to
    /// this instance and `on_added` is invoked.
    ///
    /// # Returns
    /// A shared handle to the attached component
    ///
    /// # Errors
    /// Returns [`RuntimeError::DuplicateKind`] if a component of the same kind is
    /// already attached. The existing component is left untouched.
    pub fn add<T: Component>(&self, component: T) -> Result<ComponentRef<T>> {
        self.attach(Rc::new(RefCell::new(component)))
    }

    /// Attach a component the caller already holds a handle to
    ///
    /// Used to re-attach a component after [`Instance::remove`].
    ///
    /// # Errors
    /// Besides [`RuntimeError::DuplicateKind`], returns
    /// [`RuntimeError::AlreadyAttached`] if the component still belongs to a live
    /// instance (this one or another) and [`RuntimeError::ComponentBusy`] if the
    /// handle is mutably borrowed.
    pub fn attach<T: Component>(&self, handle: ComponentRef<T>) -> Result<ComponentRef<T>> {
        let mut component = handle
            .try_borrow_mut()
            .map_err(|_| RuntimeError::ComponentBusy(std::any::type_name::<T>().to_string()))?;
        let kind = component.kind();

        if let Some(current) = component.owner().instance() {
            return Err(RuntimeError::AlreadyAttached {
                kind,
                owner: current.name().to_string(),
            });
        }

        {
            let mut slots = self.inner.slots.borrow_mut();
            if slots.iter().any(|slot| slot.kind == kind) {
                return Err(RuntimeError::DuplicateKind(kind));
            }

            let dyn_ref: DynComponentRef = handle.clone();
            let typed: Rc<dyn Any> = handle.clone();
            slots.push(Slot {
                kind,
                component: dyn_ref,
                typed,
            });
        }

        debug!("Attached {} component to '{}'", kind, self.name());
        component.owner_mut().set(self.downgrade());
        component.on_added();
        drop(component);

        Ok(handle)
    }

    /// Get the component attached under `kind`
    pub fn get(&self, kind: ComponentKind) -> Option<DynComponentRef> {
        self.inner
            .slots
            .borrow()
            .iter()
            .find(|slot| slot.kind == kind)
            .map(|slot| slot.component.clone())
    }

    /// Get the component attached under `kind` as its concrete type
    ///
    /// Returns `None` if nothing is attached under `kind` or if the attached
    /// component is not a `T`.
    pub fn get_as<T: Component>(&self, kind: ComponentKind) -> Option<ComponentRef<T>> {
        let typed = self
            .inner
            .slots
            .borrow()
            .iter()
            .find(|slot| slot.kind == kind)
            .map(|slot| slot.typed.clone())?;
        typed.downcast::<RefCell<T>>().ok()
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.inner.slots.borrow().iter().any(|slot| slot.kind == kind)
    }

    /// Detach the component attached under `kind`
    ///
    /// Invokes `on_removed`, clears the component's owner and drops it from the
    /// registry.
    ///
    /// If the component is borrowed (it is removing itself from its own hook),
    /// it leaves the registry now and `on_removed` runs once the borrow is
    /// released, at the latest when the next frame pass starts.
    ///
    /// # Returns
    /// `true` if a component was removed, `false` if nothing was attached under `kind`
    pub fn remove(&self, kind: ComponentKind) -> bool {
        let component = match self.get(kind) {
            Some(component) => component,
            None => return false,
        };

        let busy = match component.try_borrow_mut() {
            Ok(mut component) => {
                detach(&mut *component);
                false
            }
            Err(_) => true,
        };

        self.inner.slots.borrow_mut().retain(|slot| slot.kind != kind);
        if busy {
            debug!(
                "{} component of '{}' is in use; on_removed deferred",
                kind,
                self.name()
            );
            self.inner.pending_removals.borrow_mut().push((kind, component));
        } else {
            debug!("Removed {} component from '{}'", kind, self.name());
        }
        true
    }

    /// Run the deferred `on_removed` of components that are no longer borrowed
    fn finish_pending_removals(&self) {
        if self.inner.pending_removals.borrow().is_empty() {
            return;
        }

        let pending = std::mem::take(&mut *self.inner.pending_removals.borrow_mut());
        let mut still_busy = Vec::new();
        for (kind, component) in pending {
            if let Ok(mut component) = component.try_borrow_mut() {
                detach(&mut *component);
                debug!("Removed {} component from '{}'", kind, self.name());
            } else {
                still_busy.push((kind, component));
            }
        }
        if !still_busy.is_empty() {
            warn!(
                "{} removed component(s) of '{}' still in use",
                still_busy.len(),
                self.name()
            );
            self.inner.pending_removals.borrow_mut().extend(still_busy);
        }
    }

    /// Detach every component, most recently attached first
    pub fn clear(&self) {
        for kind in self.kinds().into_iter().rev() {
            self.remove(kind);
        }
    }

    /// Kinds of the attached components, in attach order
    pub fn kinds(&self) -> Vec<ComponentKind> {
        self.inner.slots.borrow().iter().map(|slot| slot.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.borrow().is_empty()
    }

    /// Run the update pass: `update` once on every attached component
    pub fn update(&self, time: &FrameTime) {
        self.finish_pending_removals();
        for (kind, component) in self.snapshot() {
            match component.try_borrow_mut() {
                Ok(mut component) => component.update(time),
                Err(_) => debug!("Skipping update of busy {} component", kind),
            }
            self.finish_pending_removals();
        }
    }

    /// Run the draw pass: `draw` once on every attached component
    pub fn draw(&self, time: &FrameTime, renderer: &mut dyn Renderer) {
        self.finish_pending_removals();
        for (kind, component) in self.snapshot() {
            match component.try_borrow_mut() {
                Ok(mut component) => component.draw(time, renderer),
                Err(_) => debug!("Skipping draw of busy {} component", kind),
            }
            self.finish_pending_removals();
        }
    }

    fn snapshot(&self) -> Vec<(ComponentKind, DynComponentRef)> {
        self.inner
            .slots
            .borrow()
            .iter()
            .map(|slot| (slot.kind, slot.component.clone()))
            .collect()
    }
}

fn detach(component: &mut dyn Component) {
    component.on_removed();
    component.owner_mut().clear();
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name())
            .field("components", &self.kinds())
            .finish()
    }
}
