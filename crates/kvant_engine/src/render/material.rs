//! Materials and shader programs

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};

/// Uniform names bound by the render system for every drawn node
pub mod uniforms {
    /// Camera projection matrix
    pub const PROJECTION: &str = "projection";
    /// Camera view matrix
    pub const CAMERA: &str = "camera";
    /// Node world transform
    pub const MODEL: &str = "model";
    /// Elapsed time in seconds
    pub const TIME: &str = "time";
}

/// A value that can be written to a shader uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    /// Integer (also used for sampler units)
    Int(i32),
    /// Scalar
    Float(f32),
    /// 2-component vector
    Vec2(Vec2),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
}

/// A compiled shader program
///
/// Compilation and linking happen elsewhere; the renderer only binds the
/// program and writes uniforms.
pub trait ShaderProgram: Send + Sync {
    /// Make this the active program
    fn use_program(&self);

    /// Write a uniform on this program
    fn set_uniform(&self, name: &str, value: Uniform);
}

/// Material component: the program a node is drawn with
#[derive(Clone)]
pub struct Material {
    program: Arc<dyn ShaderProgram>,
}

impl Component for Material {}

impl Material {
    /// Create a material around a shared program
    pub fn new(program: Arc<dyn ShaderProgram>) -> Self {
        Self { program }
    }

    /// The shader program
    pub fn program(&self) -> &Arc<dyn ShaderProgram> {
        &self.program
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material").finish_non_exhaustive()
    }
}

/// Program that stores the last value of each uniform
#[derive(Debug, Default)]
pub struct HeadlessProgram {
    uses: AtomicUsize,
    values: Mutex<HashMap<String, Uniform>>,
}

impl HeadlessProgram {
    /// Create an empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the program was made active
    pub fn use_count(&self) -> usize {
        self.uses.load(Ordering::Relaxed)
    }

    /// Last value written to `name`
    pub fn uniform(&self, name: &str) -> Option<Uniform> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }
}

impl ShaderProgram for HeadlessProgram {
    fn use_program(&self) {
        self.uses.fetch_add(1, Ordering::Relaxed);
    }

    fn set_uniform(&self, name: &str, value: Uniform) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value);
    }
}
