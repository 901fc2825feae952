//! Perspective camera with pointer-driven orbit controls.
//!
//! The camera orbits the scene origin: yaw and pitch from pointer drag, zoom
//! from scroll. Pitch is clamped short of the poles so the view never flips.

use glam::{Mat4, Vec3};

/// Pitch clamp, just shy of straight up/down.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Orbit camera around the origin.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Rotation around the vertical axis, radians.
    pub yaw: f32,
    /// Elevation above the orbital plane, radians, clamped to avoid the poles.
    pub pitch: f32,
    /// Distance from the origin.
    pub distance: f32,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Zoom limits.
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    /// Create a camera looking at the origin from `position`.
    pub fn from_position(
        position: Vec3,
        fov_y: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
        min_distance: f32,
        max_distance: f32,
    ) -> Self {
        let distance = position.length().max(min_distance);
        let pitch = (position.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = position.x.atan2(position.z);
        Self {
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance,
            fov_y,
            aspect_ratio,
            near,
            far,
            min_distance,
            max_distance,
        }
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        let horizontal = self.distance * self.pitch.cos();
        Vec3::new(
            horizontal * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            horizontal * self.yaw.cos(),
        )
    }

    /// Apply a pointer drag of `(dx, dy)` in radians-per-pixel-scaled units.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx;
        self.pitch = (self.pitch + dy).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Apply a scroll zoom; positive zooms in.
    pub fn zoom(&mut self, amount: f32) {
        self.distance =
            (self.distance * (1.0 - amount * 0.1)).clamp(self.min_distance, self.max_distance);
    }

    /// Update the aspect ratio after a viewport resize.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height.max(1.0);
    }

    /// View matrix looking at the origin.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    /// Perspective projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    /// Combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::from_position(
            Vec3::new(-90.0, 140.0, 140.0),
            45f32.to_radians(),
            16.0 / 9.0,
            0.1,
            1000.0,
            30.0,
            600.0,
        )
    }

    #[test]
    fn test_from_position_preserves_distance_and_height() {
        let start = Vec3::new(-90.0, 140.0, 140.0);
        let camera = camera();
        let position = camera.position();
        assert!((position.length() - start.length()).abs() < 1e-3);
        assert!((position.y - start.y).abs() < 1e-3);
        assert!((position - start).length() < 1e-2);
    }

    #[test]
    fn test_pitch_clamped_at_poles() {
        let mut camera = camera();
        for _ in 0..100 {
            camera.orbit(0.0, 1.0);
        }
        assert!(camera.pitch <= PITCH_LIMIT);
        for _ in 0..200 {
            camera.orbit(0.0, -1.0);
        }
        assert!(camera.pitch >= -PITCH_LIMIT);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut camera = camera();
        for _ in 0..500 {
            camera.zoom(1.0);
        }
        assert!((camera.distance - camera.min_distance).abs() < 1e-3);
        for _ in 0..500 {
            camera.zoom(-1.0);
        }
        assert!((camera.distance - camera.max_distance).abs() < 1e-3);
    }

    #[test]
    fn test_view_matrix_looks_at_origin() {
        let camera = camera();
        let view = camera.view_matrix();
        // The origin should land on the view-space -Z axis at the camera's
        // distance.
        let origin_in_view = view.transform_point3(Vec3::ZERO);
        assert!(origin_in_view.x.abs() < 1e-3);
        assert!(origin_in_view.y.abs() < 1e-3);
        assert!((origin_in_view.z + camera.distance).abs() < 1e-2);
    }

    #[test]
    fn test_projection_is_perspective() {
        let camera = camera();
        let proj = camera.projection_matrix();
        // Perspective matrices put -1 in the w-generating slot.
        assert!((proj.z_axis.w + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_aspect_ratio_update() {
        let mut camera = camera();
        camera.set_aspect_ratio(1000.0, 500.0);
        assert!((camera.aspect_ratio - 2.0).abs() < 1e-6);
    }
}
