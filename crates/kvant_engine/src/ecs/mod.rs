//! Entity-Component-System implementation
//!
//! Generation-checked entity handles, typed component storage with a
//! per-entity component bitset, named groups, and a removal channel that
//! lets systems react to components disappearing.

pub mod world;
pub mod entity;
pub mod component;
pub mod storage;
pub mod system;

pub use world::{World, EcsError};
pub use entity::Entity;
pub use component::{Component, ComponentMask};
pub use storage::{Removed, RemovalCause};
pub use system::System;
