//! Render system
//!
//! Draws one subtree against one camera per call. The walk is post-order:
//! every child subtree is drawn before the node that owns it, so a parent
//! can overlay what its children drew. Visibility is evaluated per node and
//! is not inherited.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::ecs::{Entity, World};
use crate::foundation::math::Mat4;
use crate::scene::Node;

use super::backend::GraphicsBackend;
use super::camera::{Camera, CameraView};
use super::material::{uniforms, Material, ShaderProgram, Uniform};
use super::mesh::MeshRenderer;
use super::texture::TextureProvider;

/// Texture units available to a single draw
pub const MAX_TEXTURE_UNITS: usize = 32;

/// Everything a render pass borrows from outside the world
pub struct RenderContext<'a> {
    /// Device the draws are submitted to
    pub backend: &'a mut dyn GraphicsBackend,
    /// Named texture lookup
    pub textures: &'a dyn TextureProvider,
    /// Seconds since the scene started, written to the `time` uniform
    pub elapsed: f32,
}

/// Counters from one render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Nodes reached by the traversal
    pub nodes_visited: usize,
    /// Draw calls accepted by the backend
    pub draw_calls: usize,
}

impl std::ops::AddAssign for RenderStats {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes_visited += rhs.nodes_visited;
        self.draw_calls += rhs.draw_calls;
    }
}

struct CameraMatrices {
    projection: Mat4,
    view: Mat4,
}

/// Post-order renderer for a node subtree
pub struct RenderSystem<C: CameraView = Camera> {
    root: Option<Entity>,
    camera: Option<Entity>,
    reported_missing: HashSet<String>,
    _camera: PhantomData<fn() -> C>,
}

impl<C: CameraView> Default for RenderSystem<C> {
    fn default() -> Self {
        Self {
            root: None,
            camera: None,
            reported_missing: HashSet::new(),
            _camera: PhantomData,
        }
    }
}

impl<C: CameraView> RenderSystem<C> {
    /// Create a render system with no root or camera
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `entity` as the traversal root
    ///
    /// Ignored (keeping the previous root) unless the entity is alive and
    /// owns a node. Returns whether the root was accepted.
    pub fn set_render_root(&mut self, world: &World, entity: Entity) -> bool {
        if world.has::<Node>(entity) {
            self.root = Some(entity);
            true
        } else {
            log::debug!("Ignoring render root {:?}: not a live node", entity);
            false
        }
    }

    /// Use `entity` as the camera
    ///
    /// Ignored unless the entity is alive and owns a `C`.
    pub fn set_camera(&mut self, world: &World, entity: Entity) -> bool {
        if world.has::<C>(entity) {
            self.camera = Some(entity);
            true
        } else {
            log::debug!("Ignoring camera {:?}: no camera component", entity);
            false
        }
    }

    /// Current traversal root
    pub fn render_root(&self) -> Option<Entity> {
        self.root
    }

    /// Current camera entity
    pub fn camera(&self) -> Option<Entity> {
        self.camera
    }

    /// Draw the root subtree
    ///
    /// Does nothing if the root or the camera is unset or no longer valid.
    pub fn update(&mut self, world: &mut World, ctx: &mut RenderContext<'_>) -> RenderStats {
        let mut stats = RenderStats::default();

        let Some(root) = self.root.filter(|root| world.has::<Node>(*root)) else {
            log::trace!("Render skipped: no valid root");
            return stats;
        };
        let Some(camera) = self.camera.and_then(|camera| world.get::<C>(camera)) else {
            log::trace!("Render skipped: no valid camera");
            return stats;
        };
        let matrices = CameraMatrices {
            projection: camera.projection_matrix(),
            view: camera.view_matrix(),
        };

        // Each node is reached once in a well-formed forest
        let budget = world.len();
        let mut stack: Vec<(Entity, bool)> = vec![(root, false)];

        while let Some((entity, children_done)) = stack.pop() {
            if children_done {
                self.draw_node(world, entity, &matrices, ctx, &mut stats);
                continue;
            }

            if stats.nodes_visited >= budget {
                log::error!("Render traversal exceeded {} nodes, hierarchy is corrupt", budget);
                break;
            }
            let Some(node) = world.get::<Node>(entity) else {
                continue;
            };
            stats.nodes_visited += 1;

            stack.push((entity, true));
            // Reversed so the first child is drawn first
            for child in node.children().iter().rev() {
                stack.push((*child, false));
            }
        }

        stats
    }

    fn draw_node(
        &mut self,
        world: &mut World,
        entity: Entity,
        matrices: &CameraMatrices,
        ctx: &mut RenderContext<'_>,
        stats: &mut RenderStats,
    ) {
        let Some(node) = world.get::<Node>(entity) else {
            return;
        };
        if !node.is_active() || !node.is_visible() {
            return;
        }
        let model = *node.world_transform();

        let Some(material) = world.get::<Material>(entity) else {
            return;
        };
        let program: Arc<dyn ShaderProgram> = Arc::clone(material.program());

        program.use_program();
        program.set_uniform(uniforms::PROJECTION, Uniform::Mat4(matrices.projection));
        program.set_uniform(uniforms::CAMERA, Uniform::Mat4(matrices.view));
        program.set_uniform(uniforms::MODEL, Uniform::Mat4(model));
        program.set_uniform(uniforms::TIME, Uniform::Float(ctx.elapsed));

        let Some(mesh) = world.get_mut::<MeshRenderer>(entity) else {
            return;
        };

        let buffers = match mesh.ensure_uploaded(ctx.backend) {
            Ok(buffers) => buffers,
            Err(err) => {
                log::error!("Skipping draw of {:?}: mesh upload failed: {}", entity, err);
                return;
            }
        };

        if mesh.textures().len() > MAX_TEXTURE_UNITS {
            log::warn!(
                "{:?} lists {} textures, only the first {} are bound",
                entity,
                mesh.textures().len(),
                MAX_TEXTURE_UNITS
            );
        }
        for (unit, name) in (0u32..).zip(mesh.textures().iter().take(MAX_TEXTURE_UNITS)) {
            match ctx.textures.get(name) {
                Some(texture) => texture.bind(unit),
                None => {
                    if self.reported_missing.insert(name.clone()) {
                        log::warn!("Texture '{}' not found, drawing without it", name);
                    }
                }
            }
        }

        match ctx.backend.draw_indexed(&buffers) {
            Ok(()) => stats.draw_calls += 1,
            Err(err) => log::error!("Draw of {:?} failed: {}", entity, err),
        }
    }
}
