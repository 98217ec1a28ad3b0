use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use crate::types::CameraUniform;

pub const MIN_DISTANCE: f32 = 20.0;
pub const MAX_DISTANCE: f32 = 300.0;
pub const DAMPING: f32 = 0.05;
/// One full orbit every 30 seconds
pub const AUTO_ROTATE_SPEED: f32 = TAU / 30.0;

const MAX_ELEVATION: f32 = PI / 2.0 - 0.01;

/// Damped orbit camera around a fixed target.
///
/// Azimuth is measured around +Y from +Z towards +X, the convention the
/// progress driver folds.
pub struct OrbitCamera {
    pub target: Vec3,
    distance: f32,
    azimuth: f32,
    elevation: f32,
    pending: Vec2,
    pub auto_rotate: bool,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub mouse_sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(Vec3::new(1.0, 1.0, 40.0), Vec3::new(0.0, 10.0, 0.0))
    }
}

impl OrbitCamera {
    /// Camera at `eye` orbiting `target`
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let azimuth = offset.x.atan2(offset.z);
        let elevation = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-MAX_ELEVATION, MAX_ELEVATION);

        Self {
            target,
            distance,
            azimuth,
            elevation,
            pending: Vec2::ZERO,
            auto_rotate: true,
            fov: 75.0_f32.to_radians(),
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 5000.0,
            mouse_sensitivity: 0.005,
            zoom_speed: 4.0,
        }
    }

    /// Azimuth in radians, wrapped to (-PI, PI]
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn position(&self) -> Vec3 {
        self.target
            + self.distance
                * Vec3::new(
                    self.azimuth.sin() * self.elevation.cos(),
                    self.elevation.sin(),
                    self.azimuth.cos() * self.elevation.cos(),
                )
    }

    /// Drag in pixels; queued and eased in by `update`
    pub fn process_mouse_drag(&mut self, delta: Vec2) {
        self.pending.x -= delta.x * self.mouse_sensitivity;
        self.pending.y += delta.y * self.mouse_sensitivity;
    }

    pub fn process_scroll(&mut self, lines: f32) {
        self.distance = (self.distance - lines * self.zoom_speed).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Advance auto rotation and damping by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.auto_rotate && dt.is_finite() {
            self.azimuth -= AUTO_ROTATE_SPEED * dt;
        }

        self.azimuth += self.pending.x * DAMPING;
        self.elevation = (self.elevation + self.pending.y * DAMPING).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self.pending *= 1.0 - DAMPING;

        self.azimuth = wrap_angle(self.azimuth);
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            position: self.position().to_array(),
            _pad: 0.0,
        }
    }
}

/// Wrap an angle into (-PI, PI]
fn wrap_angle(a: f32) -> f32 {
    let w = (a + PI).rem_euclid(TAU) - PI;
    if w <= -PI {
        w + TAU
    } else {
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn azimuth_matches_eye_offset() {
        let cam = OrbitCamera::looking_from(Vec3::new(40.0, 0.0, 0.0), Vec3::ZERO);
        assert!((cam.azimuth() - PI / 2.0).abs() < 1e-5);
        assert!((cam.position() - Vec3::new(40.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn distance_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.process_scroll(1000.0);
        assert_eq!(cam.distance(), MIN_DISTANCE);
        cam.process_scroll(-1000.0);
        assert_eq!(cam.distance(), MAX_DISTANCE);
    }

    #[test]
    fn azimuth_stays_wrapped_while_rotating() {
        let mut cam = OrbitCamera::default();
        for _ in 0..2000 {
            cam.update(0.1);
            assert!(cam.azimuth() > -PI && cam.azimuth() <= PI);
        }
    }

    #[test]
    fn drag_is_eased_in() {
        let mut cam = OrbitCamera::default();
        cam.auto_rotate = false;
        let start = cam.azimuth();
        cam.process_mouse_drag(Vec2::new(-100.0, 0.0));
        cam.update(0.016);
        let first = cam.azimuth() - start;
        assert!(first > 0.0 && first < 0.5);
    }
}
