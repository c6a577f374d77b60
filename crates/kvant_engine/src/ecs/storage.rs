//! Typed component storage
//!
//! Each component type lives in its own dense-keyed secondary map, indexed by
//! entity handle. A storage can optionally park removed components so a
//! system can inspect them after the fact.

use std::any::Any;

use slotmap::SecondaryMap;

use super::{Component, ComponentMask, Entity};

/// Why a component left its entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// The component was explicitly removed
    Removed,
    /// The owning entity was destroyed
    Destroyed,
}

/// A component that has been detached from its entity
#[derive(Debug)]
pub struct Removed<T> {
    /// The entity the component belonged to (no longer owns it)
    pub entity: Entity,
    /// The detached value
    pub component: T,
    /// What triggered the removal
    pub cause: RemovalCause,
}

/// Type-erased view of a storage, used when destroying entities
pub(crate) trait AnyStorage: Send + Sync {
    /// Remove the entity's component if present
    fn remove_entity(&mut self, entity: Entity, cause: RemovalCause) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Storage for one component type
pub(crate) struct Storage<T: Component> {
    components: SecondaryMap<Entity, T>,
    bit: ComponentMask,
    track_removals: bool,
    removed: Vec<Removed<T>>,
}

impl<T: Component> Storage<T> {
    pub(crate) fn new(bit: ComponentMask) -> Self {
        Self {
            components: SecondaryMap::new(),
            bit,
            track_removals: false,
            removed: Vec::new(),
        }
    }

    pub(crate) fn bit(&self) -> ComponentMask {
        self.bit
    }

    pub(crate) fn insert(&mut self, entity: Entity, component: T) -> &mut T {
        self.components.insert(entity, component);
        &mut self.components[entity]
    }

    pub(crate) fn get(&self, entity: Entity) -> Option<&T> {
        self.components.get(entity)
    }

    pub(crate) fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(entity)
    }

    pub(crate) fn set_tracking(&mut self, enabled: bool) {
        self.track_removals = enabled;
    }

    pub(crate) fn drain_removed(&mut self) -> Vec<Removed<T>> {
        std::mem::take(&mut self.removed)
    }

    pub(crate) fn take(&mut self, entity: Entity, cause: RemovalCause) -> bool {
        match self.components.remove(entity) {
            Some(component) => {
                if self.track_removals {
                    self.removed.push(Removed { entity, component, cause });
                }
                true
            }
            None => false,
        }
    }
}

impl<T: Component> AnyStorage for Storage<T> {
    fn remove_entity(&mut self, entity: Entity, cause: RemovalCause) -> bool {
        self.take(entity, cause)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
