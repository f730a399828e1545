//! Time-based tweening with named ease curves.
//!
//! A [`Track`] holds at most one tween for one transform target. Starting a
//! new tween on a track replaces whatever was in flight.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    QuadOut,
    #[default]
    CubicOut,
    CubicInOut,
    ExpoOut,
    SineInOut,
}

impl Ease {
    /// Map normalized time in [0, 1] to eased progress. Endpoints are exact.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::CubicOut => 1.0 - (1.0 - t).powi(3),
            Ease::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Ease::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Ease::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Values a tween can interpolate.
pub trait Lerp: Copy {
    fn lerp_to(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

impl Lerp for Quat {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        self.slerp(other, t)
    }
}

/// Model position and orientation, the target of section focus.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Lerp for Placement {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    duration: f32,
    elapsed: f32,
    ease: Ease,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: f32, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease,
        }
    }

    /// Advance by `dt` seconds and return the value at the new time.
    pub fn advance(&mut self, dt: f32) -> T {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> T {
        if self.duration <= 0.0 || self.is_finished() {
            return self.to;
        }
        self.from
            .lerp_to(self.to, self.ease.apply(self.elapsed / self.duration))
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> T {
        self.to
    }
}

/// What happened to a track during one advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackStatus {
    Idle,
    Running,
    Finished,
}

/// Single-slot tween holder for one transform target.
#[derive(Clone, Debug)]
pub struct Track<T: Lerp> {
    active: Option<Tween<T>>,
}

impl<T: Lerp> Default for Track<T> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<T: Lerp> Track<T> {
    /// Replace any in-flight tween.
    pub fn start(&mut self, tween: Tween<T>) {
        self.active = Some(tween);
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<T> {
        self.active.as_ref().map(Tween::target)
    }

    /// Write the next value into `out`. The finishing step writes the exact
    /// target and empties the track.
    pub fn advance(&mut self, dt: f32, out: &mut T) -> TrackStatus {
        let Some(tween) = self.active.as_mut() else {
            return TrackStatus::Idle;
        };
        *out = tween.advance(dt);
        if tween.is_finished() {
            self.active = None;
            TrackStatus::Finished
        } else {
            TrackStatus::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 6] = [
        Ease::Linear,
        Ease::QuadOut,
        Ease::CubicOut,
        Ease::CubicInOut,
        Ease::ExpoOut,
        Ease::SineInOut,
    ];

    #[test]
    fn test_ease_endpoints() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1e-6, "{ease:?} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{ease:?} at 1");
        }
    }

    #[test]
    fn test_ease_monotonic() {
        for ease in ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = ease.apply(i as f32 / 100.0);
                assert!(v + 1e-6 >= prev, "{ease:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_ease_out_leads_linear() {
        assert!(Ease::CubicOut.apply(0.3) > 0.3);
        assert!(Ease::QuadOut.apply(0.3) > 0.3);
    }

    #[test]
    fn test_tween_is_time_based() {
        // Same total time in different step sizes lands on the same value
        let mut a = Tween::new(0.0f32, 10.0, 1.0, Ease::CubicOut);
        let mut b = a;
        for _ in 0..10 {
            a.advance(0.05);
        }
        b.advance(0.5);
        assert!((a.value() - b.value()).abs() < 1e-5);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut t = Tween::new(Vec3::ZERO, Vec3::ONE, 0.0, Ease::Linear);
        assert_eq!(t.advance(0.0), Vec3::ONE);
        assert!(t.is_finished());
    }

    #[test]
    fn test_track_finishes_on_exact_target() {
        let mut track = Track::default();
        let mut v = 0.0f32;
        track.start(Tween::new(0.0, 2.0, 0.5, Ease::QuadOut));
        assert_eq!(track.advance(0.25, &mut v), TrackStatus::Running);
        assert!(v > 0.0 && v < 2.0);
        assert_eq!(track.advance(1.0, &mut v), TrackStatus::Finished);
        assert_eq!(v, 2.0);
        assert_eq!(track.advance(0.1, &mut v), TrackStatus::Idle);
    }

    #[test]
    fn test_track_start_overrides_in_flight() {
        let mut track = Track::default();
        let mut v = 0.0f32;
        track.start(Tween::new(0.0, 10.0, 1.0, Ease::Linear));
        track.advance(0.5, &mut v);
        track.start(Tween::new(v, -4.0, 1.0, Ease::Linear));
        assert_eq!(track.target(), Some(-4.0));
        track.advance(2.0, &mut v);
        assert_eq!(v, -4.0);
    }

    #[test]
    fn test_placement_lerp_midpoint() {
        let a = Placement {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        };
        let b = Placement {
            position: Vec3::new(2.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        };
        let mid = a.lerp_to(b, 0.5);
        assert!((mid.position.x - 1.0).abs() < 1e-6);
        let angle = mid.rotation.angle_between(Quat::IDENTITY);
        assert!((angle - std::f32::consts::FRAC_PI_4).abs() < 1e-4);
    }
}
