//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and transform composition
//! - Frame timing and the fixed-timestep accumulator
//! - Logging setup

pub mod math;
pub mod time;
pub mod logging;
