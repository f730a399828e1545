//! Per-frame projection of world anchors onto overlay elements.

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::OverlayConfig;
use crate::phase::Phase;
use crate::registry::Registry;
use crate::scene::NodeSubtree;
use crate::surface::{ElementKey, ElementUpdate, Overlay, OverlaySurface};

/// Clamped-linear falloff: 1 up to `near`, 0 from `far` on.
pub fn fade_opacity(distance: f32, near: f32, far: f32) -> f32 {
    if distance <= near {
        1.0
    } else if distance >= far {
        0.0
    } else {
        1.0 - (distance - near) / (far - near)
    }
}

/// Where and how strongly one anchor shows this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenAnchor {
    pub pixel: Vec2,
    pub opacity: f32,
    pub visible: bool,
}

impl ScreenAnchor {
    const HIDDEN: ScreenAnchor = ScreenAnchor {
        pixel: Vec2::ZERO,
        opacity: 0.0,
        visible: false,
    };
}

pub fn project_anchor(camera: &Camera, world: Vec3, config: &OverlayConfig) -> ScreenAnchor {
    let Some(pixel) = camera.project_to_pixel(world) else {
        return ScreenAnchor::HIDDEN;
    };
    let opacity = fade_opacity(camera.position.distance(world), config.fade_near, config.fade_far);
    ScreenAnchor {
        pixel,
        opacity,
        visible: opacity > 0.0,
    }
}

/// Screen offset of keyword `index` of `count` around its anchor at time `t`.
pub fn ring_offset(index: usize, count: usize, t: f32, config: &OverlayConfig) -> Vec2 {
    let angle = std::f32::consts::TAU * index as f32 / count.max(1) as f32;
    let pulse = Phase::for_ring_label(index).oscillate(t, config.ring_frequency);
    let radius = config.ring_radius + pulse * config.ring_pulse;
    Vec2::new(angle.cos(), angle.sin()) * radius
}

fn write_anchor<S: OverlaySurface>(overlay: &mut Overlay<S>, key: ElementKey, anchor: ScreenAnchor, at: Vec2) {
    overlay.update(key, ElementUpdate::Visible(anchor.visible));
    if anchor.visible {
        overlay.update(key, ElementUpdate::Position { x: at.x, y: at.y });
        overlay.update(key, ElementUpdate::Opacity(anchor.opacity));
    }
}

/// Position every node label and its keyword ring. Returns the visible label count.
pub fn sync_labels<S: OverlaySurface>(
    overlay: &mut Overlay<S>,
    camera: &Camera,
    nodes: &[NodeSubtree],
    registry: &Registry,
    t: f32,
    config: &OverlayConfig,
) -> usize {
    let mut visible = 0;
    for subtree in nodes {
        let anchor = project_anchor(camera, subtree.center(), config);
        visible += anchor.visible as usize;
        write_anchor(overlay, ElementKey::NodeLabel(subtree.node), anchor, anchor.pixel);

        let count = registry.node(subtree.node).map_or(0, |n| n.keywords.len());
        for k in 0..count {
            let at = anchor.pixel + ring_offset(k, count, t, config);
            write_anchor(overlay, ElementKey::KeywordLabel(subtree.node, k), anchor, at);
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, NodeConfig};
    use crate::registry::NodeId;
    use crate::scene::SceneGraph;
    use crate::surface::RecordingSurface;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade_opacity(0.0, 30.0, 80.0), 1.0);
        assert_eq!(fade_opacity(30.0, 30.0, 80.0), 1.0);
        assert!((fade_opacity(55.0, 30.0, 80.0) - 0.5).abs() < 1e-6);
        assert_eq!(fade_opacity(80.0, 30.0, 80.0), 0.0);
        assert_eq!(fade_opacity(500.0, 30.0, 80.0), 0.0);
    }

    #[test]
    fn test_opacity_non_increasing_moving_away() {
        let config = OverlayConfig::default();
        let mut camera = Camera::new(&CameraConfig::default());
        let anchor = Vec3::ZERO;
        let mut prev = f32::INFINITY;
        for step in 0..200 {
            camera.position = Vec3::new(0.0, 0.0, 1.0 + step as f32);
            let a = project_anchor(&camera, anchor, &config);
            assert!(a.opacity <= prev);
            prev = a.opacity;
            if camera.position.z >= config.fade_far {
                assert_eq!(a.opacity, 0.0);
                assert!(!a.visible);
            }
        }
    }

    #[test]
    fn test_anchor_behind_camera_hidden() {
        let camera = Camera::new(&CameraConfig::default());
        let a = project_anchor(&camera, Vec3::new(0.0, 0.0, 20.0), &OverlayConfig::default());
        assert!(!a.visible);
    }

    #[test]
    fn test_centre_anchor_projects_to_viewport_centre() {
        let camera = Camera::new(&CameraConfig::default());
        let a = project_anchor(&camera, Vec3::ZERO, &OverlayConfig::default());
        assert!((a.pixel - Vec2::new(640.0, 360.0)).length() < 1e-2);
    }

    #[test]
    fn test_ring_radius_stays_in_pulse_band() {
        let config = OverlayConfig::default();
        for k in 0..6 {
            for step in 0..50 {
                let r = ring_offset(k, 6, step as f32 * 0.1, &config).length();
                assert!(r >= config.ring_radius - config.ring_pulse - 1e-3);
                assert!(r <= config.ring_radius + config.ring_pulse + 1e-3);
            }
        }
    }

    #[test]
    fn test_rings_are_out_of_step() {
        let config = OverlayConfig::default();
        let a = ring_offset(0, 4, 0.0, &config).length();
        let b = ring_offset(1, 4, 0.0, &config).length();
        assert!((a - b).abs() > 1e-3);
    }

    #[test]
    fn test_sync_writes_labels_and_skips_absent() {
        let registry = Registry::builtin();
        let mut scene = SceneGraph::default();
        let mut rng = SmallRng::seed_from_u64(42);
        scene.populate_nodes(&registry, &NodeConfig::default(), &mut rng);

        // Only node 0's label exists in this document.
        let surface = RecordingSurface::with_elements(&[ElementKey::NodeLabel(NodeId(0))]);
        let mut overlay = Overlay::new(surface);
        overlay.resolve(&ElementKey::node_keys(&registry));

        let mut camera = Camera::new(&CameraConfig::default());
        camera.position = Vec3::new(0.0, 4.0, 30.0);
        camera.look_at(Vec3::ZERO);

        let visible = sync_labels(&mut overlay, &camera, scene.nodes(), &registry, 0.0, &OverlayConfig::default());
        assert!(visible > 0);
        let label = overlay.surface().state(ElementKey::NodeLabel(NodeId(0))).unwrap();
        assert!(label.writes >= 1);
    }
}
