//! Free-camera input: held movement keys and pointer-drag orbiting.

use std::collections::BTreeSet;

use glam::Vec3;

use crate::camera::Camera;
use crate::config::MovementConfig;

/// Keeps the orbit away from the poles where `look_at` loses its up vector.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.017;
const MIN_ORBIT_DISTANCE: f32 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
}

impl MoveKey {
    /// WASD and the arrow keys, by DOM key name. Case-insensitive for letters.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => return Some(MoveKey::Forward),
            "ArrowDown" => return Some(MoveKey::Back),
            "ArrowLeft" => return Some(MoveKey::Left),
            "ArrowRight" => return Some(MoveKey::Right),
            _ => {}
        }
        match key.to_ascii_lowercase().as_str() {
            "w" => Some(MoveKey::Forward),
            "s" => Some(MoveKey::Back),
            "a" => Some(MoveKey::Left),
            "d" => Some(MoveKey::Right),
            _ => None,
        }
    }
}

/// Which movement keys are currently down.
#[derive(Clone, Debug, Default)]
pub struct HeldKeys {
    keys: BTreeSet<MoveKey>,
}

impl HeldKeys {
    pub fn press(&mut self, key: MoveKey) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: MoveKey) {
        self.keys.remove(&key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Unit-free intent in camera space: x is right, y is forward.
    pub fn intent(&self) -> (f32, f32) {
        let axis = |pos: MoveKey, neg: MoveKey| {
            (self.is_held(pos) as i8 - self.is_held(neg) as i8) as f32
        };
        (
            axis(MoveKey::Right, MoveKey::Left),
            axis(MoveKey::Forward, MoveKey::Back),
        )
    }
}

/// Move the camera along its own facing. Returns the applied displacement.
pub fn integrate_movement(
    camera: &mut Camera,
    keys: &HeldKeys,
    dt: f32,
    config: &MovementConfig,
) -> Vec3 {
    let (strafe, advance) = keys.intent();
    if strafe == 0.0 && advance == 0.0 {
        return Vec3::ZERO;
    }
    let direction = (camera.forward() * advance + camera.right() * strafe).normalize_or_zero();
    let before = camera.position;
    camera.position = clamp_to_bounds(before + direction * config.speed * dt, config.bounds_extent);
    camera.position - before
}

pub fn clamp_to_bounds(position: Vec3, extent: f32) -> Vec3 {
    position.clamp(Vec3::splat(-extent), Vec3::splat(extent))
}

/// Orbit the camera about `target` by a pointer drag in pixels.
pub fn orbit(camera: &mut Camera, target: Vec3, dx: f32, dy: f32, config: &MovementConfig) {
    let offset = camera.position - target;
    let distance = offset.length();
    if distance < MIN_ORBIT_DISTANCE {
        return;
    }
    let k = config.orbit_sensitivity;
    let yaw = offset.z.atan2(offset.x) - dx * k;
    let pitch = ((offset.y / distance).clamp(-1.0, 1.0).asin() + dy * k)
        .clamp(-PITCH_LIMIT, PITCH_LIMIT);

    let eye = Vec3::new(
        distance * yaw.cos() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.sin() * pitch.cos(),
    );
    camera.position = clamp_to_bounds(target + eye, config.bounds_extent);
    camera.look_at(target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default())
    }

    #[test]
    fn test_key_names() {
        assert_eq!(MoveKey::from_key("w"), Some(MoveKey::Forward));
        assert_eq!(MoveKey::from_key("W"), Some(MoveKey::Forward));
        assert_eq!(MoveKey::from_key("ArrowLeft"), Some(MoveKey::Left));
        assert_eq!(MoveKey::from_key("q"), None);
        assert_eq!(MoveKey::from_key("arrowleft"), None);
    }

    #[test]
    fn test_forward_moves_along_facing() {
        let mut cam = camera();
        let mut keys = HeldKeys::default();
        keys.press(MoveKey::Forward);
        let moved = integrate_movement(&mut cam, &keys, 0.5, &MovementConfig::default());
        // Intro camera faces -Z at speed 8.
        assert_relative_eq!(moved.z, -4.0, epsilon = 1e-4);
        assert_relative_eq!(moved.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_opposed_keys_cancel() {
        let mut cam = camera();
        let mut keys = HeldKeys::default();
        keys.press(MoveKey::Left);
        keys.press(MoveKey::Right);
        let moved = integrate_movement(&mut cam, &keys, 1.0, &MovementConfig::default());
        assert_eq!(moved, Vec3::ZERO);
    }

    #[test]
    fn test_diagonal_is_not_faster() {
        let mut cam = camera();
        let mut keys = HeldKeys::default();
        keys.press(MoveKey::Forward);
        keys.press(MoveKey::Right);
        let moved = integrate_movement(&mut cam, &keys, 1.0, &MovementConfig::default());
        assert_relative_eq!(moved.length(), 8.0, epsilon = 1e-4);
    }

    #[test]
    fn test_movement_clamped_to_bounds() {
        let mut cam = camera();
        let mut keys = HeldKeys::default();
        keys.press(MoveKey::Back);
        let config = MovementConfig {
            bounds_extent: 15.0,
            ..MovementConfig::default()
        };
        for _ in 0..100 {
            integrate_movement(&mut cam, &keys, 0.1, &config);
        }
        assert_relative_eq!(cam.position.z, 15.0);
    }

    #[test]
    fn test_orbit_keeps_distance_and_faces_target() {
        let mut cam = camera();
        let target = Vec3::ZERO;
        orbit(&mut cam, target, 120.0, -40.0, &MovementConfig::default());
        assert_relative_eq!(cam.position.length(), 12.0, epsilon = 1e-3);
        let facing = (target - cam.position).normalize();
        assert!((cam.forward() - facing).length() < 1e-4);
    }

    #[test]
    fn test_orbit_pitch_is_limited() {
        let mut cam = camera();
        orbit(&mut cam, Vec3::ZERO, 0.0, 100_000.0, &MovementConfig::default());
        assert!(cam.position.y < 12.0);
        assert!(cam.forward().is_finite());
    }

    #[test]
    fn test_release_clears_intent() {
        let mut keys = HeldKeys::default();
        keys.press(MoveKey::Back);
        keys.release(MoveKey::Back);
        assert!(keys.is_empty());
        assert_eq!(keys.intent(), (0.0, 0.0));
    }
}
