//! Intro demo
//!
//! Two textured quads in the foreground layer, one of them steerable with
//! WASD. Runs headless against a scripted input stream: holds D for a while,
//! then quits.
//!
//! Pass a `.toml` or `.ron` path to override the engine configuration.

use std::sync::Arc;

use kvant_engine::foundation::logging;
use kvant_engine::prelude::*;

const HOLD_FRAMES: usize = 30;
const IDLE_FRAMES: usize = 30;

struct IntroState {
    program: Arc<HeadlessProgram>,
    player: Option<Entity>,
}

impl IntroState {
    fn new() -> Self {
        Self {
            program: Arc::new(HeadlessProgram::new()),
            player: None,
        }
    }

    fn create_quad(&self, scene: &mut Scene, x: f32, y: f32, red: f32, texture: &str) -> Entity {
        let color = [red, 1.0, 0.0];
        let vertices = vec![
            Vertex::new([-0.5, -0.5, 0.0], color, [0.0, 0.0]),
            Vertex::new([-0.5, 0.5, 0.0], color, [0.0, 1.0]),
            Vertex::new([0.5, 0.5, 0.0], color, [1.0, 1.0]),
            Vertex::new([0.5, -0.5, 0.0], color, [1.0, 0.0]),
        ];

        let entity = scene.spawn(Node::from_2d(x, y, 0.0, 1.0).with_tags(NodeTags::SCENE));
        let world = scene.world_mut();
        world.assign(entity, Material::new(self.program.clone()));
        world.assign(entity, MeshRenderer::new(vertices, vec![0, 1, 3, 1, 2, 3]).with_texture(texture));
        entity
    }
}

impl GameState for IntroState {
    fn name(&self) -> &str {
        "Intro"
    }

    fn on_init(&mut self, scene: &mut Scene) {
        log::info!("Inside IntroState");

        for name in ["C.png", "brick.png"] {
            scene.textures_mut().insert(name, Arc::new(HeadlessTexture::new()));
        }

        let logo = self.create_quad(scene, 0.0, 0.0, 1.0, "C.png");
        let player = self.create_quad(scene, 0.5, 0.5, 0.0, "brick.png");
        if let Some(node) = scene.world_mut().get_mut::<Node>(player) {
            node.set_angle(-10.0);
        }
        scene.world_mut().assign(player, Controllable::default());

        scene.add_to_layer(Layer::Foreground, logo);
        scene.add_to_layer(Layer::Foreground, player);
        self.player = Some(player);
    }

    fn on_cleanup(&mut self, scene: &mut Scene) {
        if let Some(node) = self.player.and_then(|player| scene.world().get::<Node>(player)) {
            log::info!("Player finished at {:?}", node.position());
        }
        log::info!("Shader program was bound {} times", self.program.use_count());
    }
}

fn load_config() -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            let config = EngineConfig::load_from_file(&path)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn script() -> ScriptedEvents {
    let mut frames = vec![vec![InputEvent::KeyPressed(KeyCode::D)]];
    frames.extend(std::iter::repeat_with(Vec::new).take(HOLD_FRAMES));
    frames.push(vec![InputEvent::KeyReleased(KeyCode::D)]);
    frames.extend(std::iter::repeat_with(Vec::new).take(IDLE_FRAMES));
    frames.push(vec![InputEvent::Quit]);
    ScriptedEvents::new(frames)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = load_config()?;
    let mut engine = Engine::new(config)?;
    engine.push_state(Box::new(IntroState::new()));

    let mut backend = HeadlessBackend::new();
    engine.run(&mut script(), &mut backend)?;

    log::info!(
        "Rendered {} frames with {} draw calls",
        backend.frame_count(),
        backend.total_draw_calls()
    );
    Ok(())
}
