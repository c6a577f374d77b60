//! ECS World implementation

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use slotmap::SlotMap;
use thiserror::Error;

use super::component::MAX_COMPONENT_TYPES;
use super::storage::{AnyStorage, Removed, RemovalCause, Storage};
use super::{Component, ComponentMask, Entity};

/// Errors raised by the component substrate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity handle is stale or null
    #[error("Entity {0:?} is not alive")]
    InvalidEntity(Entity),

    /// The entity already owns a component of this type
    #[error("Entity {entity:?} already has a {component} component")]
    DuplicateComponent {
        /// Target entity
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// The per-world bitset has no room for another component type
    #[error("Cannot register {0}: component type limit reached")]
    TooManyComponentTypes(&'static str),
}

/// ECS World containing all entities and components
///
/// Entities own at most one component of each type. Ownership of component
/// data is entirely the world's; everything else refers to entities by
/// handle.
#[derive(Default)]
pub struct World {
    entities: SlotMap<Entity, ComponentMask>,
    storages: HashMap<TypeId, Box<dyn AnyStorage>>,
    groups: HashMap<String, Vec<Entity>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity with no components
    pub fn create(&mut self) -> Entity {
        let entity = self.entities.insert(ComponentMask::EMPTY);
        log::trace!("Created entity {:?}", entity);
        entity
    }

    /// Whether the handle refers to a live entity
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world has no live entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Attach a component to an entity
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive or already owns a `T`. Both are
    /// authoring errors; use [`World::try_assign`] to handle them instead.
    pub fn assign<T: Component>(&mut self, entity: Entity, component: T) -> &mut T {
        match self.try_assign(entity, component) {
            Ok(component) => component,
            Err(err) => panic!("assign failed: {err}"),
        }
    }

    /// Attach a component to an entity, reporting precondition failures
    pub fn try_assign<T: Component>(&mut self, entity: Entity, component: T) -> Result<&mut T, EcsError> {
        if !self.is_valid(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }

        let bit = self.register::<T>()?;
        let mask = &mut self.entities[entity];
        if mask.contains(bit) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: type_name::<T>(),
            });
        }
        mask.insert(bit);

        Ok(self.storage_mut::<T>()
            .ok_or(EcsError::TooManyComponentTypes(type_name::<T>()))?
            .insert(entity, component))
    }

    /// Get a component, or `None` for dead entities and missing components
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.is_valid(entity) {
            return None;
        }
        self.storage::<T>()?.get(entity)
    }

    /// Get a component mutably
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_valid(entity) {
            return None;
        }
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Whether the entity owns a `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        match (self.entities.get(entity), self.mask_of::<T>()) {
            (Some(mask), Some(bit)) => mask.contains(bit),
            _ => false,
        }
    }

    /// The component bitset of a live entity
    pub fn mask(&self, entity: Entity) -> Option<ComponentMask> {
        self.entities.get(entity).copied()
    }

    /// The bit assigned to `T`, if the type has been seen by this world
    pub fn mask_of<T: Component>(&self) -> Option<ComponentMask> {
        self.storage::<T>().map(Storage::bit)
    }

    /// Detach a component
    ///
    /// Returns whether a component was removed. If removal tracking is on for
    /// `T`, the value is parked for [`World::drain_removed`].
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        let Some(bit) = self.mask_of::<T>() else {
            return false;
        };
        let Some(mask) = self.entities.get_mut(entity) else {
            return false;
        };
        if !mask.contains(bit) {
            return false;
        }
        mask.remove(bit);

        self.storage_mut::<T>()
            .is_some_and(|storage| storage.take(entity, RemovalCause::Removed))
    }

    /// Destroy an entity and all of its components
    ///
    /// The handle stops resolving immediately. Tracked component types see
    /// a [`RemovalCause::Destroyed`] record.
    pub fn destroy(&mut self, entity: Entity) {
        let Some(mask) = self.entities.remove(entity) else {
            log::trace!("Ignoring destroy of dead entity {:?}", entity);
            return;
        };

        if !mask.is_empty() {
            for storage in self.storages.values_mut() {
                storage.remove_entity(entity, RemovalCause::Destroyed);
            }
        }

        for members in self.groups.values_mut() {
            members.retain(|member| *member != entity);
        }

        log::debug!("Destroyed entity {:?} ({} components)", entity, mask.count());
    }

    /// Park removed `T` components instead of dropping them
    pub fn track_removals<T: Component>(&mut self) {
        match self.register::<T>() {
            Ok(_) => {
                if let Some(storage) = self.storage_mut::<T>() {
                    storage.set_tracking(true);
                }
            }
            Err(err) => log::error!("Cannot track removals: {err}"),
        }
    }

    /// Take every parked `T` removal, oldest first
    pub fn drain_removed<T: Component>(&mut self) -> Vec<Removed<T>> {
        self.storage_mut::<T>()
            .map(Storage::drain_removed)
            .unwrap_or_default()
    }

    /// Iterate over all live entities
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }

    /// Iterate over live entities that own a `T`
    pub fn entities_with<T: Component>(&self) -> impl Iterator<Item = Entity> + '_ {
        let bit = self.mask_of::<T>();
        self.entities
            .iter()
            .filter(move |(_, mask)| bit.is_some_and(|bit| mask.contains(bit)))
            .map(|(entity, _)| entity)
    }

    /// Iterate over live entities whose bitset contains all of `required`
    pub fn entities_with_mask(&self, required: ComponentMask) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter()
            .filter(move |(_, mask)| mask.contains(required))
            .map(|(entity, _)| entity)
    }

    /// Add a live entity to a named group
    pub fn add_to_group(&mut self, entity: Entity, group: &str) {
        if !self.is_valid(entity) {
            return;
        }
        let members = self.groups.entry(group.to_string()).or_default();
        if !members.contains(&entity) {
            members.push(entity);
        }
    }

    /// Remove an entity from a named group
    pub fn remove_from_group(&mut self, entity: Entity, group: &str) {
        if let Some(members) = self.groups.get_mut(group) {
            members.retain(|member| *member != entity);
        }
    }

    /// Whether the entity belongs to the group
    pub fn in_group(&self, entity: Entity, group: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|members| members.contains(&entity))
    }

    /// Members of a named group, in insertion order
    pub fn group(&self, group: &str) -> impl Iterator<Item = Entity> + '_ {
        self.groups.get(group).into_iter().flatten().copied()
    }

    fn register<T: Component>(&mut self) -> Result<ComponentMask, EcsError> {
        if let Some(bit) = self.mask_of::<T>() {
            return Ok(bit);
        }

        let index = self.storages.len();
        if index >= MAX_COMPONENT_TYPES {
            return Err(EcsError::TooManyComponentTypes(type_name::<T>()));
        }

        let bit = ComponentMask::bit(index);
        self.storages.insert(TypeId::of::<T>(), Box::new(Storage::<T>::new(bit)));
        log::trace!("Registered component type {} as bit {}", type_name::<T>(), index);
        Ok(bit)
    }

    fn storage<T: Component>(&self) -> Option<&Storage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref::<Storage<T>>())
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut Storage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<Storage<T>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health(u32);
    impl Component for Health {}

    #[derive(Debug, PartialEq)]
    struct Name(&'static str);
    impl Component for Name {}

    #[test]
    fn test_create_and_assign() {
        let mut world = World::new();
        let entity = world.create();

        assert!(world.is_valid(entity));
        assert!(!world.has::<Health>(entity));

        world.assign(entity, Health(10));
        assert!(world.has::<Health>(entity));
        assert_eq!(world.get::<Health>(entity), Some(&Health(10)));

        world.get_mut::<Health>(entity).unwrap().0 = 7;
        assert_eq!(world.get::<Health>(entity), Some(&Health(7)));
    }

    #[test]
    #[should_panic(expected = "already has")]
    fn test_duplicate_assign_panics() {
        let mut world = World::new();
        let entity = world.create();
        world.assign(entity, Health(1));
        world.assign(entity, Health(2));
    }

    #[test]
    fn test_try_assign_reports_errors() {
        let mut world = World::new();
        let entity = world.create();
        world.assign(entity, Health(1));

        let err = world.try_assign(entity, Health(2)).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        // The first component is untouched
        assert_eq!(world.get::<Health>(entity), Some(&Health(1)));

        world.destroy(entity);
        assert_eq!(world.try_assign(entity, Name("x")).unwrap_err(), EcsError::InvalidEntity(entity));
    }

    #[test]
    fn test_destroy_invalidates_handles() {
        let mut world = World::new();
        let entity = world.create();
        world.assign(entity, Health(3));
        world.destroy(entity);

        assert!(!world.is_valid(entity));
        assert!(world.get::<Health>(entity).is_none());
        assert!(!world.has::<Health>(entity));

        // A reused slot must not resurrect the old handle
        let fresh = world.create();
        assert_ne!(fresh, entity);
        assert!(!world.is_valid(entity));
        assert!(world.get::<Health>(fresh).is_none());

        // Destroying twice is a no-op
        world.destroy(entity);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_remove_without_tracking_is_dropped() {
        let mut world = World::new();
        let entity = world.create();
        world.assign(entity, Health(3));

        assert!(world.remove::<Health>(entity));
        assert!(!world.remove::<Health>(entity));
        assert!(world.drain_removed::<Health>().is_empty());
        assert!(world.is_valid(entity));
    }

    #[test]
    fn test_tracked_removals_record_cause() {
        let mut world = World::new();
        world.track_removals::<Health>();

        let removed = world.create();
        let destroyed = world.create();
        world.assign(removed, Health(1));
        world.assign(destroyed, Health(2));
        world.assign(destroyed, Name("doomed"));

        world.remove::<Health>(removed);
        world.destroy(destroyed);

        let records = world.drain_removed::<Health>();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity, removed);
        assert_eq!(records[0].component, Health(1));
        assert_eq!(records[0].cause, RemovalCause::Removed);
        assert_eq!(records[1].entity, destroyed);
        assert_eq!(records[1].cause, RemovalCause::Destroyed);

        assert!(world.drain_removed::<Health>().is_empty());
        // Untracked types are still cleaned up on destroy
        assert!(world.drain_removed::<Name>().is_empty());
    }

    #[test]
    fn test_bitset_queries() {
        let mut world = World::new();
        let a = world.create();
        let b = world.create();
        let c = world.create();
        world.assign(a, Health(1));
        world.assign(b, Health(2));
        world.assign(b, Name("b"));
        world.assign(c, Name("c"));

        let with_health: Vec<_> = world.entities_with::<Health>().collect();
        assert_eq!(with_health, vec![a, b]);

        let both = world.mask_of::<Health>().unwrap() | world.mask_of::<Name>().unwrap();
        let with_both: Vec<_> = world.entities_with_mask(both).collect();
        assert_eq!(with_both, vec![b]);

        assert_eq!(world.mask(b).map(|mask| mask.count()), Some(2));

        struct Unused;
        impl Component for Unused {}
        assert_eq!(world.entities_with::<Unused>().count(), 0);
    }

    #[test]
    fn test_groups_drop_destroyed_members() {
        let mut world = World::new();
        let a = world.create();
        let b = world.create();

        world.add_to_group(a, "enemies");
        world.add_to_group(b, "enemies");
        world.add_to_group(a, "enemies");
        assert_eq!(world.group("enemies").count(), 2);
        assert!(world.in_group(a, "enemies"));

        world.destroy(a);
        assert_eq!(world.group("enemies").collect::<Vec<_>>(), vec![b]);

        world.remove_from_group(b, "enemies");
        assert!(!world.in_group(b, "enemies"));
        assert_eq!(world.group("missing").count(), 0);
    }
}
