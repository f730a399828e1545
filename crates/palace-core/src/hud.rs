//! HUD readouts: camera position, depth, nearest node and proximity band.

use glam::Vec3;
use serde::Serialize;

use crate::interaction::{Proximity, nearest_node};
use crate::registry::{NodeId, Registry};
use crate::scene::NodeSubtree;
use crate::surface::{ElementKey, Overlay, OverlaySurface};

/// Region label for the camera's whereabouts.
///
/// Placeholder: fixed axis thresholds around the model, with no anatomical basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lobe {
    Frontal,
    Parietal,
    Temporal,
    Occipital,
    Cerebellum,
    Core,
}

const LOBE_THRESHOLD: f32 = 12.0;

impl Lobe {
    pub fn from_position(p: Vec3) -> Self {
        if p.y < -LOBE_THRESHOLD {
            Lobe::Cerebellum
        } else if p.z > LOBE_THRESHOLD {
            Lobe::Frontal
        } else if p.z < -LOBE_THRESHOLD {
            Lobe::Occipital
        } else if p.x.abs() > LOBE_THRESHOLD {
            Lobe::Temporal
        } else if p.y > LOBE_THRESHOLD {
            Lobe::Parietal
        } else {
            Lobe::Core
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Lobe::Frontal => "Frontal",
            Lobe::Parietal => "Parietal",
            Lobe::Temporal => "Temporal",
            Lobe::Occipital => "Occipital",
            Lobe::Cerebellum => "Cerebellum",
            Lobe::Core => "Core",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HudReadout {
    pub camera: Vec3,
    /// Distance from the scene origin.
    pub depth: f32,
    pub nearest: Option<(NodeId, f32)>,
    pub proximity: Proximity,
    pub lobe: Lobe,
}

impl HudReadout {
    pub fn compute(camera: Vec3, nodes: &[NodeSubtree], thresholds: &[f32; 4]) -> Self {
        let nearest = nearest_node(camera, nodes);
        let proximity = nearest.map_or(Proximity::Far, |(_, d)| Proximity::classify(d, thresholds));
        Self {
            camera,
            depth: camera.length(),
            nearest,
            proximity,
            lobe: Lobe::from_position(camera),
        }
    }

    pub fn write<S: OverlaySurface>(&self, overlay: &mut Overlay<S>, registry: &Registry) {
        let c = self.camera;
        overlay.text(ElementKey::HudCamera, format!("{:.1}, {:.1}, {:.1}", c.x, c.y, c.z));
        overlay.text(ElementKey::HudDepth, format!("{:.1}", self.depth));
        let nearest = match self.nearest {
            Some((id, d)) => {
                let name = registry.node(id).map_or("?", |n| n.title.as_str());
                format!("{name} {d:.1}")
            }
            None => "--".to_string(),
        };
        overlay.text(ElementKey::HudNearest, nearest);
        overlay.text(ElementKey::HudProximity, self.proximity.label());
        overlay.text(ElementKey::HudLobe, self.lobe.label());
    }
}
