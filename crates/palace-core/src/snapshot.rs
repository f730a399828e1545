//! JSON snapshot of the live scene for inspection.
//!
//! Field names are camelCase. Rotations are `[w, x, y, z]` arrays.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::choreographer::SceneState;
use crate::clock::CivilTime;
use crate::constants::SNAPSHOT_VERSION;
use crate::error::Result;
use crate::registry::Registry;
use crate::scene::{SceneGraph, Transform};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireSnapshot {
    pub version: String,
    pub timestamp: String,
    pub state: String,
    pub camera: WireCamera,
    pub model: WireTransform,
    #[serde(rename = "modelVertices", default)]
    pub model_vertices: usize,
    pub backdrop: WireBackdrop,
    pub nodes: Vec<WireNode>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireCamera {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    #[serde(rename = "fovY")]
    pub fov_y: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireTransform {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireBackdrop {
    pub background: String,
    pub stars: usize,
    pub dust: usize,
    pub cloud: usize,
    #[serde(rename = "starRotation")]
    pub star_rotation: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireNode {
    pub id: String,
    pub name: String,
    pub title: String,
    pub shape: String,
    pub position: [f32; 3],
    pub satellites: usize,
    pub filaments: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub points: Option<Vec<[f32; 3]>>,
}

fn wire_quat(q: Quat) -> [f32; 4] {
    [q.w, q.x, q.y, q.z]
}

fn wire_transform(t: &Transform) -> WireTransform {
    WireTransform {
        position: t.translation.to_array(),
        rotation: wire_quat(t.rotation),
        scale: t.scale,
    }
}

fn state_label(state: SceneState) -> String {
    match state {
        SceneState::Intro => "intro".into(),
        SceneState::ScrollSection(i) => format!("section:{i}"),
        SceneState::Exploring => "exploring".into(),
        SceneState::DashboardOpen(node) => format!("dashboard:{}", node.0),
    }
}

/// Capture the scene. `points` adds each node's satellite positions in world space.
pub fn capture(
    camera: &Camera,
    scene: &SceneGraph,
    registry: &Registry,
    state: SceneState,
    points: bool,
) -> WireSnapshot {
    let nodes = scene
        .nodes()
        .iter()
        .map(|subtree| {
            let node = registry.node(subtree.node);
            let matrix = subtree.transform.matrix();
            WireNode {
                id: subtree.id.to_string(),
                name: node.map(|n| n.name.clone()).unwrap_or_default(),
                title: node.map(|n| n.title.clone()).unwrap_or_default(),
                shape: subtree.core.shape.as_str().to_string(),
                position: subtree.center().to_array(),
                satellites: subtree.satellites.len(),
                filaments: subtree.filaments.len(),
                points: points.then(|| {
                    subtree
                        .satellites
                        .positions()
                        .iter()
                        .map(|&p: &Vec3| matrix.transform_point3(p).to_array())
                        .collect()
                }),
            }
        })
        .collect();

    let backdrop = &scene.backdrop;
    WireSnapshot {
        version: SNAPSHOT_VERSION.to_string(),
        timestamp: CivilTime::now().iso8601(),
        state: state_label(state),
        camera: WireCamera {
            position: camera.position.to_array(),
            rotation: wire_quat(camera.orientation),
            fov_y: camera.fov_y_degrees,
        },
        model: wire_transform(&scene.model.transform),
        model_vertices: scene.model.vertex_count(),
        backdrop: WireBackdrop {
            background: backdrop.background.to_string(),
            stars: backdrop.stars.len(),
            dust: backdrop.dust.len(),
            cloud: backdrop.cloud.len(),
            star_rotation: backdrop.star_rotation,
        },
        nodes,
    }
}

pub fn to_json(snapshot: &WireSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn from_json(json: &str) -> Result<WireSnapshot> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, NodeConfig};
    use crate::registry::NodeId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn scene() -> (SceneGraph, Registry) {
        let registry = Registry::builtin();
        let mut scene = SceneGraph::default();
        let mut rng = SmallRng::seed_from_u64(42);
        scene.populate_nodes(&registry, &NodeConfig::default(), &mut rng);
        (scene, registry)
    }

    #[test]
    fn test_capture_counts() {
        let (scene, registry) = scene();
        let camera = Camera::new(&CameraConfig::default());
        let snap = capture(&camera, &scene, &registry, SceneState::Exploring, false);
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert_eq!(snap.state, "exploring");
        assert_eq!(snap.nodes.len(), 5);
        assert_eq!(snap.nodes[1].shape, "cube");
        assert!(snap.nodes.iter().all(|n| n.points.is_none()));
        assert_eq!(snap.camera.position, [0.0, 0.0, 12.0]);
    }

    #[test]
    fn test_json_field_names() {
        let (scene, registry) = scene();
        let camera = Camera::new(&CameraConfig::default());
        let snap = capture(&camera, &scene, &registry, SceneState::DashboardOpen(NodeId(2)), true);
        let json = to_json(&snap).unwrap();
        assert!(json.contains("\"fovY\""));
        assert!(json.contains("\"modelVertices\""));
        assert!(json.contains("\"dashboard:2\""));
        let back = from_json(&json).unwrap();
        assert_eq!(back.nodes[0].points.as_ref().map(Vec::len), Some(40));
    }

    #[test]
    fn test_points_are_world_space() {
        let (scene, registry) = scene();
        let camera = Camera::new(&CameraConfig::default());
        let snap = capture(&camera, &scene, &registry, SceneState::Exploring, true);
        let node = &snap.nodes[4];
        let centre = Vec3::from_array(node.position);
        for p in node.points.as_ref().unwrap() {
            let r = Vec3::from_array(*p).distance(centre);
            assert!((1.8 - 1e-3..=3.6 + 1e-3).contains(&r));
        }
    }
}
