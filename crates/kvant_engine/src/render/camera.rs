//! Cameras
//!
//! The render system only needs a projection and a view matrix, so it is
//! generic over [`CameraView`]. [`Camera`] is the stock implementation.

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Point3, Vec3};

/// Anything that can supply projection and view matrices
pub trait CameraView: Component {
    /// Camera-to-clip transform
    fn projection_matrix(&self) -> Mat4;

    /// World-to-camera transform
    fn view_matrix(&self) -> Mat4;
}

/// Camera component with a position, orientation vectors and a fixed projection
///
/// Matrices are computed on demand; the view is a right-handed look-at along
/// `forward`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Viewing direction
    pub forward: Vec3,
    /// Up vector (typically +Y)
    pub up: Vec3,
    projection: Mat4,
}

impl Component for Camera {}

impl Default for Camera {
    fn default() -> Self {
        Self::orthographic_identity()
    }
}

impl Camera {
    /// Camera at `(0, 0, 1)` looking down -Z with an identity projection
    ///
    /// Geometry in `[-1, 1]` maps straight to the screen, which is what UI
    /// layers use.
    pub fn orthographic_identity() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            forward: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Mat4::identity(),
        }
    }

    /// Perspective camera looking down -Z
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov` - Vertical field of view in radians
    /// * `aspect` - Viewport width / height
    /// * `near` - Near clipping plane (must be > 0)
    /// * `far` - Far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            projection: Mat4::new_perspective(aspect, fov, near, far),
            ..Self::orthographic_identity()
        }
    }

    /// Move the camera
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Replace the projection matrix
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }
}

impl CameraView for Camera {
    fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    fn view_matrix(&self) -> Mat4 {
        let eye = Point3::from(self.position);
        let target = Point3::from(self.position + self.forward);
        Mat4::look_at_rh(&eye, &target, &self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::transform_point;

    #[test]
    fn test_identity_camera_view() {
        let camera = Camera::orthographic_identity();
        assert_relative_eq!(camera.projection_matrix(), Mat4::identity());

        // The camera sits at z = 1, so the origin ends up one unit in front
        let p = transform_point(&camera.view_matrix(), Vec3::zeros());
        assert_relative_eq!(p, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_perspective_projection() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_3, 1.0, 0.1, 10.0);
        let projection = camera.projection_matrix();

        // cot(fov / 2) on the diagonal for a square viewport
        let focal = 1.0 / (std::f32::consts::FRAC_PI_6).tan();
        assert_relative_eq!(projection[(0, 0)], focal, epsilon = 1e-5);
        assert_relative_eq!(projection[(1, 1)], focal, epsilon = 1e-5);
        assert_relative_eq!(projection[(3, 2)], -1.0);
    }
}
