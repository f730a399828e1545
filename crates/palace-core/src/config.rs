//! Tunable parameters. Every section defaults to the values the page ships with,
//! so a config file only needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{PalaceError, Result};
use crate::tween::Ease;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PalaceConfig {
    pub camera: CameraConfig,
    pub backdrop: BackdropConfig,
    pub nodes: NodeConfig,
    pub choreography: ChoreographyConfig,
    pub movement: MovementConfig,
    pub overlay: OverlayConfig,
    pub proximity: ProximityConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub intro_position: [f32; 3],
    pub viewport: [f32; 2],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 2000.0,
            intro_position: [0.0, 0.0, 12.0],
            viewport: [1280.0, 720.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    pub background: Color,
    pub star_count: usize,
    pub star_extent: f32,
    pub dust_count: usize,
    pub dust_radius: f32,
    pub cloud_count: usize,
    pub cloud_min_radius: f32,
    pub cloud_max_radius: f32,
    /// Radians per second about Y.
    pub star_spin: f32,
    pub cloud_spin: f32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            background: Color::DEEP_SPACE,
            star_count: 1500,
            star_extent: 400.0,
            dust_count: 1200,
            dust_radius: 200.0,
            cloud_count: 240,
            cloud_min_radius: 18.0,
            cloud_max_radius: 30.0,
            star_spin: 0.03,
            cloud_spin: 0.036,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node positions are scaled outward from the origin by this factor.
    pub expansion: f32,
    pub breath_frequency: f32,
    pub breath_amplitude: f32,
    /// Radians per second.
    pub spin: f32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            expansion: 1.5,
            breath_frequency: 2.0,
            breath_amplitude: 0.04,
            spin: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreographyConfig {
    pub section_duration: f32,
    pub section_ease: Ease,
    pub explore_duration: f32,
    pub explore_ease: Ease,
    pub explore_camera_target: [f32; 3],
    pub explore_model_scale: f32,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            section_duration: 1.2,
            section_ease: Ease::CubicOut,
            explore_duration: 4.0,
            explore_ease: Ease::CubicInOut,
            explore_camera_target: [0.0, 4.0, 30.0],
            explore_model_scale: 1.15,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// World units per second.
    pub speed: f32,
    /// Camera position is clamped to `[-extent, extent]` on every axis.
    pub bounds_extent: f32,
    /// Radians per dragged pixel.
    pub orbit_sensitivity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 8.0,
            bounds_extent: 90.0,
            orbit_sensitivity: 0.005,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub fade_near: f32,
    pub fade_far: f32,
    pub ring_radius: f32,
    pub ring_pulse: f32,
    pub ring_frequency: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fade_near: 30.0,
            fade_far: 80.0,
            ring_radius: 72.0,
            ring_pulse: 8.0,
            ring_frequency: 1.6,
        }
    }
}

/// Distance thresholds, strictly descending: approaching, locking, in-range, interact-now.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub thresholds: [f32; 4],
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            thresholds: [45.0, 28.0, 16.0, 8.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Seconds per revealed summary character.
    pub type_interval: f32,
    pub reveal_duration: f32,
    pub keyword_radius: f32,
    pub banner_seconds: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            type_interval: 0.03,
            reveal_duration: 0.9,
            keyword_radius: 140.0,
            banner_seconds: 2.5,
        }
    }
}

impl PalaceConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PalaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Every named scalar, for the finiteness check.
    fn scalars(&self) -> Vec<(&'static str, f32)> {
        let (cam, b, n, c) = (&self.camera, &self.backdrop, &self.nodes, &self.choreography);
        let (m, o, d) = (&self.movement, &self.overlay, &self.dashboard);
        let mut out = vec![
            ("camera.fov_y_degrees", cam.fov_y_degrees),
            ("camera.near", cam.near),
            ("camera.far", cam.far),
            ("backdrop.star_extent", b.star_extent),
            ("backdrop.dust_radius", b.dust_radius),
            ("backdrop.cloud_min_radius", b.cloud_min_radius),
            ("backdrop.cloud_max_radius", b.cloud_max_radius),
            ("backdrop.star_spin", b.star_spin),
            ("backdrop.cloud_spin", b.cloud_spin),
            ("nodes.expansion", n.expansion),
            ("nodes.breath_frequency", n.breath_frequency),
            ("nodes.breath_amplitude", n.breath_amplitude),
            ("nodes.spin", n.spin),
            ("choreography.section_duration", c.section_duration),
            ("choreography.explore_duration", c.explore_duration),
            ("choreography.explore_model_scale", c.explore_model_scale),
            ("movement.speed", m.speed),
            ("movement.bounds_extent", m.bounds_extent),
            ("movement.orbit_sensitivity", m.orbit_sensitivity),
            ("overlay.fade_near", o.fade_near),
            ("overlay.fade_far", o.fade_far),
            ("overlay.ring_radius", o.ring_radius),
            ("overlay.ring_pulse", o.ring_pulse),
            ("overlay.ring_frequency", o.ring_frequency),
            ("dashboard.type_interval", d.type_interval),
            ("dashboard.reveal_duration", d.reveal_duration),
            ("dashboard.keyword_radius", d.keyword_radius),
            ("dashboard.banner_seconds", d.banner_seconds),
        ];
        out.extend(cam.intro_position.map(|v| ("camera.intro_position", v)));
        out.extend(cam.viewport.map(|v| ("camera.viewport", v)));
        out.extend(c.explore_camera_target.map(|v| ("choreography.explore_camera_target", v)));
        out.extend(self.proximity.thresholds.map(|v| ("proximity.thresholds", v)));
        out
    }

    pub fn validate(&self) -> Result<()> {
        if let Some((name, value)) = self.scalars().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }
        let cam = &self.camera;
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(invalid(format!(
                "camera near {} must be positive and below far {}",
                cam.near, cam.far
            )));
        }
        if !(cam.fov_y_degrees > 0.0 && cam.fov_y_degrees < 180.0) {
            return Err(invalid(format!("camera fov {} out of range", cam.fov_y_degrees)));
        }
        if !cam.viewport.iter().all(|&v| v > 0.0) {
            return Err(invalid("camera viewport must be positive".into()));
        }
        let b = &self.backdrop;
        if !(b.cloud_min_radius >= 0.0 && b.cloud_min_radius <= b.cloud_max_radius) {
            return Err(invalid("backdrop cloud radius band is not ordered".into()));
        }
        let n = &self.nodes;
        if !(n.expansion > 0.0) {
            return Err(invalid(format!("nodes expansion {} must be positive", n.expansion)));
        }
        if !(0.0..1.0).contains(&n.breath_amplitude) {
            return Err(invalid(format!(
                "nodes breath_amplitude {} must be in [0, 1)",
                n.breath_amplitude
            )));
        }
        let c = &self.choreography;
        if !(c.section_duration >= 0.0 && c.explore_duration >= 0.0) {
            return Err(invalid("choreography durations must not be negative".into()));
        }
        if !(c.explore_model_scale > 0.0) {
            return Err(invalid("choreography explore_model_scale must be positive".into()));
        }
        let o = &self.overlay;
        if !(o.fade_near >= 0.0 && o.fade_near < o.fade_far) {
            return Err(invalid(format!(
                "overlay fade_near {} must be below fade_far {}",
                o.fade_near, o.fade_far
            )));
        }
        if !self.proximity.thresholds.windows(2).all(|w| w[0] > w[1]) {
            return Err(invalid("proximity thresholds must be strictly descending".into()));
        }
        let m = &self.movement;
        if !(m.speed >= 0.0 && m.bounds_extent > 0.0) {
            return Err(invalid("movement speed and bounds must be positive".into()));
        }
        let d = &self.dashboard;
        if !(d.type_interval > 0.0) {
            return Err(invalid("dashboard type_interval must be positive".into()));
        }
        if !(d.reveal_duration >= 0.0 && d.banner_seconds >= 0.0) {
            return Err(invalid("dashboard durations must not be negative".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> PalaceError {
    PalaceError::InvalidConfig(msg)
}
