//! Node component
//!
//! A node is one placement in the scene hierarchy: a local pose, visibility
//! flags, tags, and the parent/child relation. Hierarchy edits are staged in
//! pending sets and only committed by [`NodeSystem`](super::NodeSystem).

use bitflags::bitflags;

use crate::ecs::{Component, Entity, World};
use crate::foundation::math::{compose_trs, utils::deg_to_rad, Mat4, Vec2, Vec3};

bitflags! {
    /// Classification tags carried by a node
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeTags: u32 {
        /// Regular scene object
        const SCENE = 1 << 0;
        /// Interface element drawn with the UI camera
        const GUI = 1 << 1;
    }
}

/// Default display name for new nodes
pub const DEFAULT_NODE_NAME: &str = "GameObject";

/// Scene hierarchy component
#[derive(Debug, Clone)]
pub struct Node {
    /// Display name
    pub name: String,

    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    active: bool,
    visible: bool,
    tags: NodeTags,

    pub(crate) parent: Option<Entity>,
    pub(crate) children: Vec<Entity>,
    pub(crate) children_to_add: Vec<Entity>,
    pub(crate) children_to_remove: Vec<Entity>,
    pub(crate) world_transform: Mat4,
}

impl Component for Node {}

impl Default for Node {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Node {
    /// Create a node from a local pose, rotation in radians per axis
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            name: DEFAULT_NODE_NAME.to_string(),
            position,
            rotation,
            scale,
            active: true,
            visible: true,
            tags: NodeTags::empty(),
            parent: None,
            children: Vec::new(),
            children_to_add: Vec::new(),
            children_to_remove: Vec::new(),
            world_transform: Mat4::identity(),
        }
    }

    /// Create a flat node at `(x, y, 0)` rotated about Z by `angle` degrees
    pub fn from_2d(x: f32, y: f32, angle: f32, scale: f32) -> Self {
        Self::new(
            Vec3::new(x, y, 0.0),
            Vec3::new(0.0, 0.0, deg_to_rad(angle)),
            Vec3::new(scale, scale, scale),
        )
    }

    /// Builder-style name assignment
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style tag assignment
    pub fn with_tags(mut self, tags: NodeTags) -> Self {
        self.tags = tags;
        self
    }

    /// Local transform, `T * Rz * Ry * Rx * S`, recomputed on every call
    pub fn local_transform(&self) -> Mat4 {
        compose_trs(&self.position, &self.rotation, &self.scale)
    }

    /// World transform as of the last reconciliation
    pub fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Set local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Local position projected onto the XY plane
    pub fn position_2d(&self) -> Vec2 {
        self.position.xy()
    }

    /// Set X and Y, keeping the current Z
    pub fn set_position_2d(&mut self, x: f32, y: f32) {
        self.position.x = x;
        self.position.y = y;
    }

    /// Move by an offset in local space
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Per-axis rotation in radians
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Set per-axis rotation in radians
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    /// Set per-axis rotation from degrees
    pub fn set_rotation_degrees(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vec3::new(deg_to_rad(x), deg_to_rad(y), deg_to_rad(z));
    }

    /// Set the Z rotation from degrees, leaving X and Y untouched
    pub fn set_angle(&mut self, degrees: f32) {
        self.rotation.z = deg_to_rad(degrees);
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Whether the node takes part in reconciliation and drawing
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate or freeze the node
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the node issues its own draw call
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the node (children are unaffected)
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Tag set
    pub fn tags(&self) -> NodeTags {
        self.tags
    }

    /// Add tags
    pub fn add_tag(&mut self, tag: NodeTags) {
        self.tags.insert(tag);
    }

    /// Remove tags
    pub fn remove_tag(&mut self, tag: NodeTags) {
        self.tags.remove(tag);
    }

    /// Whether all of `tag` is set
    pub fn has_tag(&self, tag: NodeTags) -> bool {
        self.tags.contains(tag)
    }

    /// Committed parent
    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    /// Committed children, in commit order
    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    /// Children staged for addition
    pub fn pending_additions(&self) -> &[Entity] {
        &self.children_to_add
    }

    /// Children staged for removal
    pub fn pending_removals(&self) -> &[Entity] {
        &self.children_to_remove
    }

    /// Stage `child` for addition on the next reconciliation
    ///
    /// Nothing is validated here; the commit phase rejects bad candidates.
    pub fn add_child(&mut self, child: Entity) {
        if !self.children_to_add.contains(&child) {
            self.children_to_add.push(child);
        }
    }

    /// Stage `child` for removal on the next reconciliation
    pub fn remove_child(&mut self, child: Entity) {
        if !self.children_to_remove.contains(&child) {
            self.children_to_remove.push(child);
        }
    }

    /// Stage every committed child for removal
    pub fn remove_children(&mut self) {
        for index in 0..self.children.len() {
            let child = self.children[index];
            self.remove_child(child);
        }
    }

    /// Whether `entity` is anywhere in this node's committed subtree
    pub fn has_child(&self, world: &World, entity: Entity) -> bool {
        let mut stack: Vec<Entity> = self.children.clone();
        let mut visited = 0usize;
        let limit = world.len();

        while let Some(current) = stack.pop() {
            if current == entity {
                return true;
            }
            visited += 1;
            if visited > limit {
                log::error!("Node subtree larger than the world, hierarchy is corrupt");
                return false;
            }
            if let Some(node) = world.get::<Node>(current) {
                stack.extend_from_slice(&node.children);
            }
        }
        false
    }
}

/// Walk committed parent links up to the topmost node
///
/// Returns `None` if `entity` has no node.
pub fn root_of(world: &World, entity: Entity) -> Option<Entity> {
    let mut current = entity;
    let mut node = world.get::<Node>(current)?;
    for _ in 0..world.len() {
        match node.parent.and_then(|parent| world.get::<Node>(parent).map(|n| (parent, n))) {
            Some((parent, parent_node)) => {
                current = parent;
                node = parent_node;
            }
            None => return Some(current),
        }
    }
    log::error!("Parent chain of {:?} does not terminate", entity);
    None
}

/// Number of committed ancestors above `entity`
pub fn depth_of(world: &World, entity: Entity) -> Option<usize> {
    let mut node = world.get::<Node>(entity)?;
    let mut depth = 0;
    while let Some(parent) = node.parent.and_then(|parent| world.get::<Node>(parent)) {
        depth += 1;
        if depth > world.len() {
            log::error!("Parent chain of {:?} does not terminate", entity);
            return None;
        }
        node = parent;
    }
    Some(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::transform_point;

    #[test]
    fn test_default_node() {
        let node = Node::default();
        assert_eq!(node.name, DEFAULT_NODE_NAME);
        assert!(node.is_active());
        assert!(node.is_visible());
        assert!(node.parent().is_none());
        assert!(node.children().is_empty());
        assert_relative_eq!(node.local_transform(), Mat4::identity(), epsilon = 1e-6);
        assert_relative_eq!(*node.world_transform(), Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_2d_constructor_uses_degrees() {
        let node = Node::from_2d(1.0, 2.0, 90.0, 2.0);
        assert_relative_eq!(node.rotation().z, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(node.scale(), Vec3::new(2.0, 2.0, 2.0));

        // Scale, then rotate +X onto +Y, then translate
        let p = transform_point(&node.local_transform(), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Vec3::new(1.0, 4.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_setters() {
        let mut node = Node::default();
        node.set_position(Vec3::new(0.0, 0.0, 5.0));
        node.set_position_2d(1.0, 2.0);
        assert_relative_eq!(node.position(), Vec3::new(1.0, 2.0, 5.0));

        node.set_rotation_degrees(180.0, 0.0, 0.0);
        node.set_angle(90.0);
        assert_relative_eq!(node.rotation().x, std::f32::consts::PI, epsilon = 1e-6);
        assert_relative_eq!(node.rotation().z, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_staging_is_idempotent_and_deferred() {
        let mut world = World::new();
        let child = world.create();

        let mut node = Node::default();
        node.add_child(child);
        node.add_child(child);
        node.remove_child(child);
        node.remove_child(child);

        assert_eq!(node.pending_additions(), &[child]);
        assert_eq!(node.pending_removals(), &[child]);
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_tags() {
        let mut node = Node::default().with_tags(NodeTags::SCENE);
        assert!(node.has_tag(NodeTags::SCENE));
        assert!(!node.has_tag(NodeTags::GUI));

        node.add_tag(NodeTags::GUI);
        node.remove_tag(NodeTags::SCENE);
        assert_eq!(node.tags(), NodeTags::GUI);
    }
}
