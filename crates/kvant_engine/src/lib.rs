//! # Kvant Engine
//!
//! A small scene-graph game engine: an entity-component world, a node
//! hierarchy whose edits are staged and committed once per frame, a
//! post-order layer renderer, and a stack of game states.
//!
//! ## Features
//!
//! - **ECS**: generation-checked entities, typed component storage, groups
//! - **Deferred hierarchy**: `add_child`/`remove_child` are committed by the
//!   node system, never mid-traversal
//! - **Layered drawing**: background to UI, with separate world and UI cameras
//! - **Backend-agnostic rendering**: shader programs, textures and the device
//!   are supplied through traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kvant_engine::prelude::*;
//!
//! struct Intro;
//!
//! impl GameState for Intro {
//!     fn on_init(&mut self, scene: &mut Scene) {
//!         let player = scene.spawn(Node::from_2d(0.0, 0.0, 0.0, 0.2));
//!         scene.add_to_layer(Layer::Middleground, player);
//!     }
//! }
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!     engine.push_state(Box::new(Intro));
//!     engine.run(&mut ScriptedEvents::quit_after(60), &mut HeadlessBackend::new())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;
pub mod state;

mod engine;

pub use engine::{Engine, EngineError, FrameReport};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineError,
        config::{Config, EngineConfig},
        foundation::math::{Mat4, Vec2, Vec3},
        ecs::{Component, Entity, World},
        input::{Controllable, EventSource, InputEvent, KeyCode, ScriptedEvents},
        render::{
            Camera, GraphicsBackend, HeadlessBackend, HeadlessProgram, HeadlessTexture, Material, MeshRenderer,
            Vertex,
        },
        scene::{Layer, Node, NodeTags, Scene},
        state::{GameState, StateManager, Transition},
    };
}
