//! System trait

use super::World;

/// A per-frame pass over the world
pub trait System {
    /// Run the system once
    fn run(&mut self, world: &mut World);
}
