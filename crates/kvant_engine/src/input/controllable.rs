//! Keyboard-driven nodes

use crate::ecs::{Component, World};
use crate::foundation::math::Vec3;
use crate::scene::Node;

use super::{KeyCode, KeyboardState};

/// Marks a node as steerable with WASD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controllable {
    /// Whether input currently moves the node
    pub enabled: bool,
    /// Distance moved per update step while a key is held
    pub speed: f32,
}

impl Component for Controllable {}

impl Default for Controllable {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 0.01,
        }
    }
}

impl Controllable {
    /// Enable steering
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disable steering
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

/// Moves controllable nodes from the held keys
#[derive(Debug, Default)]
pub struct ControlSystem;

impl ControlSystem {
    /// Create a control system
    pub fn new() -> Self {
        Self
    }

    /// Apply one step of movement to every enabled controllable node
    pub fn update(&mut self, world: &mut World, keyboard: &KeyboardState) {
        let direction = Self::direction(keyboard);
        if direction == Vec3::zeros() {
            return;
        }

        let entities: Vec<_> = world.entities_with::<Controllable>().collect();
        for entity in entities {
            let Some(control) = world.get::<Controllable>(entity).copied() else {
                continue;
            };
            if !control.enabled {
                continue;
            }
            if let Some(node) = world.get_mut::<Node>(entity) {
                node.translate(direction * control.speed);
            }
        }
    }

    fn direction(keyboard: &KeyboardState) -> Vec3 {
        let mut direction = Vec3::zeros();
        if keyboard.is_pressed(KeyCode::D) {
            direction.x += 1.0;
        }
        if keyboard.is_pressed(KeyCode::A) {
            direction.x -= 1.0;
        }
        if keyboard.is_pressed(KeyCode::W) {
            direction.y += 1.0;
        }
        if keyboard.is_pressed(KeyCode::S) {
            direction.y -= 1.0;
        }
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::input::InputEvent;

    #[test]
    fn test_wasd_moves_enabled_nodes() {
        let mut world = World::new();
        let steered = world.create();
        world.assign(steered, Node::default());
        world.assign(steered, Controllable::default());

        let disabled = world.create();
        world.assign(disabled, Node::default());
        world.assign(disabled, Controllable { enabled: false, speed: 1.0 });

        let mut keyboard = KeyboardState::new();
        keyboard.handle_event(&InputEvent::KeyPressed(KeyCode::D));
        keyboard.handle_event(&InputEvent::KeyPressed(KeyCode::W));

        let mut system = ControlSystem::new();
        system.update(&mut world, &keyboard);
        system.update(&mut world, &keyboard);

        let moved = world.get::<Node>(steered).unwrap().position();
        assert_relative_eq!(moved, Vec3::new(0.02, 0.02, 0.0), epsilon = 1e-6);
        assert_relative_eq!(world.get::<Node>(disabled).unwrap().position(), Vec3::zeros());
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut world = World::new();
        let entity = world.create();
        world.assign(entity, Node::default());
        world.assign(entity, Controllable::default());

        let mut keyboard = KeyboardState::new();
        keyboard.handle_event(&InputEvent::KeyPressed(KeyCode::A));
        keyboard.handle_event(&InputEvent::KeyPressed(KeyCode::D));

        ControlSystem::new().update(&mut world, &keyboard);
        assert_relative_eq!(world.get::<Node>(entity).unwrap().position(), Vec3::zeros());
    }
}
