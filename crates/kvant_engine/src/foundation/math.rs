//! Math utilities and types
//!
//! Provides the nalgebra aliases used by the scene graph and renderer, and the
//! fixed translate-rotate-scale composition used for node transforms.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Compose a local transform as `T * Rz * Ry * Rx * S`
///
/// `rotation` holds per-axis Euler angles in radians. The rotation order is
/// fixed: X is applied to the (scaled) geometry first, Z last.
pub fn compose_trs(position: &Vec3, rotation: &Vec3, scale: &Vec3) -> Mat4 {
    let rot_x = Mat4::from_axis_angle(&Vec3::x_axis(), rotation.x);
    let rot_y = Mat4::from_axis_angle(&Vec3::y_axis(), rotation.y);
    let rot_z = Mat4::from_axis_angle(&Vec3::z_axis(), rotation.z);

    Mat4::new_translation(position) * (rot_z * rot_y * rot_x) * Mat4::new_nonuniform_scaling(scale)
}

/// Transform a point by a homogeneous matrix
pub fn transform_point(matrix: &Mat4, point: Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(point)).coords
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants::{DEG_TO_RAD, RAD_TO_DEG};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * RAD_TO_DEG
    }
}
