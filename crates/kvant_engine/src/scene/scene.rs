//! Scene: one world with its layers, cameras and systems
//!
//! Every game state owns a scene. The four layer roots and the two cameras
//! are created up front and live as long as the scene.

use crate::config::EngineConfig;
use crate::ecs::{Entity, World};
use crate::foundation::math::{utils::deg_to_rad, Vec3};
use crate::input::{ControlSystem, InputEvent, KeyboardState};
use crate::render::{Camera, GraphicsBackend, RenderContext, RenderStats, RenderSystem, TextureRegistry};

use super::{Layer, Node, NodeSystem, NodeTags};

/// A world plus the systems that reconcile and draw it
pub struct Scene {
    world: World,
    nodes: NodeSystem,
    renderer: RenderSystem,
    controls: ControlSystem,
    keyboard: KeyboardState,
    textures: TextureRegistry,
    layers: [Entity; Layer::COUNT],
    world_camera: Entity,
    ui_camera: Entity,
    elapsed: f32,
}

impl Scene {
    /// Build a scene with empty layers and both cameras
    pub fn new(config: &EngineConfig) -> Self {
        let mut world = World::new();
        let mut nodes = NodeSystem::new();
        nodes.configure(&mut world);

        let layers = Layer::ALL.map(|layer| {
            let tags = if layer.is_ui() { NodeTags::GUI } else { NodeTags::SCENE };
            let entity = world.create();
            world.assign(entity, Node::from_2d(0.0, 0.0, 0.0, 1.0).with_name(layer.name()).with_tags(tags));
            entity
        });

        let ui_camera = world.create();
        world.assign(ui_camera, Camera::orthographic_identity());

        let camera = &config.camera;
        let world_camera = world.create();
        world.assign(
            world_camera,
            Camera::perspective(
                Vec3::from(camera.position),
                deg_to_rad(camera.fov_degrees),
                config.window.aspect_ratio(),
                camera.near,
                camera.far,
            ),
        );

        log::debug!("Scene created with {} layers", Layer::COUNT);

        Self {
            world,
            nodes,
            renderer: RenderSystem::new(),
            controls: ControlSystem::new(),
            keyboard: KeyboardState::new(),
            textures: TextureRegistry::new(),
            layers,
            world_camera,
            ui_camera,
            elapsed: 0.0,
        }
    }

    /// Fold an input event into the keyboard state
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.keyboard.handle_event(event);
    }

    /// Advance one step: steer controllable nodes, then reconcile the tree
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        self.controls.update(&mut self.world, &self.keyboard);
        self.nodes.update(&mut self.world);
    }

    /// Draw every layer, scene layers with the world camera and then the
    /// UI layer with the UI camera
    pub fn draw(&mut self, backend: &mut dyn GraphicsBackend) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut ctx = RenderContext {
            backend,
            textures: &self.textures,
            elapsed: self.elapsed,
        };

        let (world_camera, ui_camera) = (self.world_camera, self.ui_camera);
        let passes = Layer::ALL
            .into_iter()
            .filter(|layer| !layer.is_ui())
            .map(|layer| (layer, world_camera))
            .chain(Layer::ALL.into_iter().filter(|layer| layer.is_ui()).map(|layer| (layer, ui_camera)));

        for (layer, camera) in passes {
            self.renderer.set_camera(&self.world, camera);
            self.renderer.set_render_root(&self.world, self.layers[layer.index()]);
            stats += self.renderer.update(&mut self.world, &mut ctx);
        }

        log::trace!("Drew {} nodes, {} draw calls", stats.nodes_visited, stats.draw_calls);
        stats
    }

    /// Stage `entity` as a top-level object of `layer`
    pub fn add_to_layer(&mut self, layer: Layer, entity: Entity) {
        if let Some(root) = self.world.get_mut::<Node>(self.layers[layer.index()]) {
            root.add_child(entity);
        }
    }

    /// Create an entity carrying `node`
    pub fn spawn(&mut self, node: Node) -> Entity {
        let entity = self.world.create();
        self.world.assign(entity, node);
        entity
    }

    /// Root node of a layer
    pub fn layer(&self, layer: Layer) -> Entity {
        self.layers[layer.index()]
    }

    /// Camera used for the non-UI layers
    pub fn world_camera(&self) -> Entity {
        self.world_camera
    }

    /// Camera used for the UI layer
    pub fn ui_camera(&self) -> Entity {
        self.ui_camera
    }

    /// Seconds accumulated by [`Scene::update`]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The scene's world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The scene's world, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Textures available to this scene
    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    /// Textures available to this scene, mutably
    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    /// Held keys
    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }
}
