use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;

pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;
pub const DEFAULT_AUTO_ROTATE_SPEED: f32 = 50.0;

/// Keep the orbit away from the poles so the view never flips.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 0.5;

/// Damped orbit interaction around a target point.
///
/// Input mutates goal angles; `update` eases the current state toward the
/// goals once per frame and yields the camera position. Skipping `update`
/// freezes the damping interpolation.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub damping_enabled: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// Matches the familiar convention: a speed of 2.0 is one orbit every
    /// 30 seconds.
    pub auto_rotate_speed: f32,
    pub zoom_enabled: bool,

    yaw: f32,
    pitch: f32,
    distance: f32,
    yaw_goal: f32,
    pitch_goal: f32,
    distance_goal: f32,
}

impl OrbitControls {
    /// Derive orbit state from an initial camera position and target.
    pub fn new(camera_position: Vec3, target: Vec3) -> Self {
        let offset = camera_position - target;
        let distance = offset.length().max(MIN_DISTANCE);
        let yaw = offset.x.atan2(offset.z);
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        let pitch = offset.y.atan2(horizontal);

        Self {
            target,
            damping_enabled: true,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            auto_rotate: false,
            auto_rotate_speed: DEFAULT_AUTO_ROTATE_SPEED,
            zoom_enabled: true,
            yaw,
            pitch,
            distance,
            yaw_goal: yaw,
            pitch_goal: pitch,
            distance_goal: distance,
        }
    }

    /// Apply a pointer drag, in radians.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw_goal += delta_yaw;
        self.pitch_goal = (self.pitch_goal + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Apply a scroll step; positive zooms in. Ignored while zoom is
    /// disabled.
    pub fn zoom(&mut self, steps: f32) {
        if !self.zoom_enabled {
            return;
        }
        let factor = 0.95_f32.powf(steps);
        self.distance_goal = (self.distance_goal * factor).max(MIN_DISTANCE);
    }

    /// Recenter the orbit. The only supported way to move the view to a new
    /// point of interest.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Advance damping and auto-rotation by `delta` seconds and return the
    /// camera position for this frame.
    pub fn update(&mut self, delta: f32) -> Vec3 {
        if self.auto_rotate {
            self.yaw_goal += 2.0 * PI * self.auto_rotate_speed / 60.0 * delta;
        }

        let t = if self.damping_enabled {
            // Frame-rate-compensated easing equivalent to the classic
            // per-frame `state += (goal - state) * factor` at 60 fps.
            (self.damping_factor * delta * 60.0).min(1.0)
        } else {
            1.0
        };

        self.yaw += (self.yaw_goal - self.yaw) * t;
        self.pitch += (self.pitch_goal - self.pitch) * t;
        self.distance += (self.distance_goal - self.distance) * t;

        self.position()
    }

    /// Current camera position in world space.
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();

        self.target
            + Vec3::new(
                self.distance * cos_pitch * sin_yaw,
                self.distance * sin_pitch,
                self.distance * cos_pitch * cos_yaw,
            )
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_matches_camera_placement() {
        let controls = OrbitControls::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let pos = controls.position();
        assert!((pos - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
        assert!((controls.distance() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn damping_eases_toward_the_goal() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        controls.rotate(1.0, 0.0);

        let before = controls.position();
        controls.update(1.0 / 60.0);
        let after_one = controls.position();

        // One damped step moves the camera but does not reach the goal.
        assert!((after_one - before).length() > 1e-4);

        for _ in 0..600 {
            controls.update(1.0 / 60.0);
        }
        let settled = controls.position();
        let expected = Vec3::new(10.0 * 1.0_f32.sin(), 0.0, 10.0 * 1.0_f32.cos());
        assert!((settled - expected).length() < 1e-2);
    }

    #[test]
    fn disabled_damping_snaps_immediately() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        controls.damping_enabled = false;
        controls.rotate(0.5, 0.0);
        controls.update(1.0 / 60.0);

        let expected = Vec3::new(10.0 * 0.5_f32.sin(), 0.0, 10.0 * 0.5_f32.cos());
        assert!((controls.position() - expected).length() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped_away_from_the_poles() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        controls.damping_enabled = false;
        controls.rotate(0.0, 10.0);
        controls.update(1.0 / 60.0);

        let pos = controls.position();
        // Never exactly on the pole.
        assert!(pos.y < 10.0);
        assert!((pos.x * pos.x + pos.z * pos.z).sqrt() > 1e-3);
    }

    #[test]
    fn zoom_respects_the_toggle() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        controls.damping_enabled = false;

        controls.zoom(1.0);
        controls.update(1.0 / 60.0);
        assert!(controls.distance() < 10.0);

        let frozen = controls.distance();
        controls.zoom_enabled = false;
        controls.zoom(1.0);
        controls.update(1.0 / 60.0);
        assert!((controls.distance() - frozen).abs() < 1e-5);
    }

    #[test]
    fn auto_rotate_advances_yaw_over_time() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        controls.damping_enabled = false;
        controls.auto_rotate = true;
        controls.auto_rotate_speed = 2.0;

        // 15 seconds of a 30-second orbit is half a revolution.
        for _ in 0..900 {
            controls.update(1.0 / 60.0);
        }
        let pos = controls.position();
        assert!((pos - Vec3::new(0.0, 0.0, -10.0)).length() < 0.5);
    }

    #[test]
    fn retargeting_moves_the_orbit_center() {
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        controls.set_target(Vec3::new(1.0, 2.0, 3.0));
        let pos = controls.position();
        assert!((pos - Vec3::new(1.0, 2.0, 8.0)).length() < 1e-4);
    }
}
