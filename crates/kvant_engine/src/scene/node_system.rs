//! Node reconciliation
//!
//! Once per frame, before anything reads world transforms, the node system:
//!
//! 1. reacts to nodes that were removed or destroyed since the last frame
//! 2. commits each active node's staged removals, then its staged additions
//! 3. recomputes the world transform of every active node
//!
//! Step 3 runs only after every commit of the frame, so a node re-parented
//! this frame is never composed against its previous parent.

use crate::ecs::{Entity, System, World};
use crate::foundation::math::Mat4;

use super::node::Node;

/// Commits staged hierarchy edits and computes world transforms
#[derive(Debug, Default)]
pub struct NodeSystem {
    configured: bool,
}

impl NodeSystem {
    /// Create a node system
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to node removals
    ///
    /// Must be called before nodes are removed, otherwise detached nodes
    /// leave dangling links in their parent and children.
    pub fn configure(&mut self, world: &mut World) {
        world.track_removals::<Node>();
        self.configured = true;
    }

    /// Run one reconciliation pass
    pub fn update(&mut self, world: &mut World) {
        if !self.configured {
            log::warn!("NodeSystem updated before configure, enabling removal tracking now");
            self.configure(world);
        }

        Self::handle_removed_nodes(world);

        let nodes: Vec<Entity> = world.entities_with::<Node>().collect();
        let active: Vec<Entity> = nodes
            .into_iter()
            .filter(|entity| !Self::is_frozen(world, *entity))
            .collect();

        for &entity in &active {
            if !Self::is_frozen(world, entity) {
                Self::apply_removals(world, entity);
                Self::apply_additions(world, entity);
            }
        }

        for &entity in &active {
            if !Self::is_frozen(world, entity) {
                Self::update_world_transform(world, entity);
            }
        }
    }

    /// True when `entity` or any committed ancestor is inactive
    fn is_frozen(world: &World, entity: Entity) -> bool {
        let mut current = world.get::<Node>(entity);
        let mut steps = 0usize;

        while let Some(node) = current {
            if !node.is_active() {
                return true;
            }
            steps += 1;
            if steps > world.len() {
                log::error!("Cycle in the parent chain of {:?}, treating it as frozen", entity);
                return true;
            }
            current = node.parent.and_then(|parent| world.get::<Node>(parent));
        }
        // Nodes without a component are never reconciled
        world.get::<Node>(entity).is_none()
    }

    /// Detach nodes whose component went away from both sides of the tree
    fn handle_removed_nodes(world: &mut World) {
        for removed in world.drain_removed::<Node>() {
            let entity = removed.entity;
            let node = removed.component;
            log::debug!("Node {:?} ({}) left the scene: {:?}", entity, node.name, removed.cause);

            if let Some(parent) = node.parent.and_then(|parent| world.get_mut::<Node>(parent)) {
                parent.remove_child(entity);
            }

            for child in &node.children {
                if let Some(child_node) = world.get_mut::<Node>(*child) {
                    if child_node.parent == Some(entity) {
                        child_node.parent = None;
                    }
                }
                Self::apply_removals(world, *child);
            }
        }
    }

    /// Erase staged removals from the committed children, cascading into
    /// whatever each detached child already had staged
    fn apply_removals(world: &mut World, entity: Entity) {
        let mut pending = vec![entity];

        while let Some(current) = pending.pop() {
            let Some(node) = world.get_mut::<Node>(current) else {
                continue;
            };
            let staged = std::mem::take(&mut node.children_to_remove);
            let mut detached = Vec::with_capacity(staged.len());

            for child in staged {
                if let Some(index) = node.children.iter().position(|c| *c == child) {
                    node.children.remove(index);
                    detached.push(child);
                }
            }

            for child in detached {
                log::trace!("Detached {:?} from {:?}", child, current);
                if let Some(child_node) = world.get_mut::<Node>(child) {
                    if child_node.parent == Some(current) {
                        child_node.parent = None;
                    }
                }
                pending.push(child);
            }
        }
    }

    /// Commit staged additions, migrating children from their old parent
    fn apply_additions(world: &mut World, entity: Entity) {
        let staged = match world.get_mut::<Node>(entity) {
            Some(node) => std::mem::take(&mut node.children_to_add),
            None => return,
        };

        for candidate in staged {
            if candidate == entity {
                log::warn!("Rejected self-parenting of {:?}", entity);
                continue;
            }
            let (Some(node), Some(candidate_node)) = (world.get::<Node>(entity), world.get::<Node>(candidate)) else {
                log::trace!("Skipping addition of {:?}: not a live node", candidate);
                continue;
            };
            if node.has_child(world, candidate) {
                continue;
            }
            if candidate_node.has_child(world, entity) {
                log::warn!("Rejected adding {:?} under its own descendant {:?}", candidate, entity);
                continue;
            }

            if let Some(old_parent) = candidate_node.parent {
                if let Some(previous) = world.get_mut::<Node>(old_parent) {
                    previous.children.retain(|child| *child != candidate);
                    log::trace!("Migrating {:?} from {:?} to {:?}", candidate, old_parent, entity);
                }
            }

            if let Some(candidate_node) = world.get_mut::<Node>(candidate) {
                candidate_node.parent = Some(entity);
            }
            if let Some(node) = world.get_mut::<Node>(entity) {
                node.children.push(candidate);
            }
        }
    }

    /// Compose local transforms from the root down to `entity`
    fn update_world_transform(world: &mut World, entity: Entity) {
        let Some(node) = world.get::<Node>(entity) else {
            return;
        };

        let mut transform: Mat4 = node.local_transform();
        let mut parent = node.parent;
        let mut steps = 0usize;

        while let Some(ancestor) = parent.and_then(|p| world.get::<Node>(p)) {
            steps += 1;
            if steps > world.len() {
                log::error!("Cycle in the parent chain of {:?}, world transform left unchanged", entity);
                return;
            }
            transform = ancestor.local_transform() * transform;
            parent = ancestor.parent;
        }

        if let Some(node) = world.get_mut::<Node>(entity) {
            node.world_transform = transform;
        }
    }
}

impl System for NodeSystem {
    fn run(&mut self, world: &mut World) {
        self.update(world);
    }
}
