use glam::{Mat4, Vec3};

pub const CAMERA_FOV_Y_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Perspective camera. Field of view and clip planes are fixed; the aspect
/// ratio follows the viewport and is recomputed on every resize.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            fov_y: CAMERA_FOV_Y_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            aspect: aspect_ratio(viewport_width, viewport_height),
            position: Vec3::ZERO,
        }
    }

    /// Recompute the aspect ratio from new viewport dimensions.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view(&self, target: Vec3) -> Mat4 {
        Mat4::look_at_rh(self.position, target, Vec3::Y)
    }

    pub fn view_projection(&self, target: Vec3) -> Mat4 {
        self.projection() * self.view(target)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_tracks_viewport() {
        let mut camera = PerspectiveCamera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);

        camera.set_viewport(1920, 1080);
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let camera = PerspectiveCamera::new(800, 0);
        assert!(camera.aspect.is_finite());
    }

    #[test]
    fn view_looks_at_target() {
        let mut camera = PerspectiveCamera::new(100, 100);
        camera.position = Vec3::new(0.0, 0.0, 5.0);

        let view = camera.view(Vec3::ZERO);
        // The target should land on the negative Z axis in view space.
        let target_view = view.transform_point3(Vec3::ZERO);
        assert!(target_view.z < 0.0);
        assert!(target_view.x.abs() < 1e-5);
        assert!(target_view.y.abs() < 1e-5);
    }
}
