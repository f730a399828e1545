use std::collections::HashSet;

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{PalaceError, Result};

/// Index of a node in its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Geometry of a node's core marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Sphere,
    Cube,
    Diamond,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Cube => "cube",
            Self::Diamond => "diamond",
        }
    }
}

/// Core marker look. `size` is the sphere radius, the cube half-extent, or
/// the diamond's centre-to-vertex distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub shape: Shape,
    pub size: f32,
    pub color: Color,
    pub opacity: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            shape: Shape::Sphere,
            size: 1.2,
            color: Color::CYAN,
            opacity: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteStyle {
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub size: f32,
    pub color: Color,
    pub opacity: f32,
}

impl Default for SatelliteStyle {
    fn default() -> Self {
        Self {
            count: 40,
            min_radius: 1.8,
            max_radius: 3.6,
            size: 0.15,
            color: Color::CYAN,
            opacity: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NodeStyle {
    pub core: MarkerStyle,
    pub satellites: SatelliteStyle,
}

/// A selectable facet of a node. Overrides are shown in place of the node's
/// own photo/summary/body while the keyword is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub label: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl Keyword {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            image: None,
            summary: None,
            body: None,
        }
    }
}

/// An authored point of interest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryNode {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub style: NodeStyle,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MemoryNode {
    pub fn new(name: &str, position: [f32; 3], title: &str, summary: &str) -> Self {
        Self {
            name: name.to_string(),
            position,
            style: NodeStyle::default(),
            keywords: Vec::new(),
            title: title.to_string(),
            summary: summary.to_string(),
            body_html: String::new(),
            photo: None,
            tags: Vec::new(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Model placement a scroll section drives: position plus Euler degrees (Y, X, Z order).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlacementPreset {
    pub position: [f32; 3],
    pub rotation_degrees: [f32; 3],
}

impl PlacementPreset {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn rotation(&self) -> Quat {
        let [x, y, z] = self.rotation_degrees;
        Quat::from_euler(EulerRot::YXZ, y.to_radians(), x.to_radians(), z.to_radians())
    }
}

/// A scroll region of the page and the pose it puts the model into.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub placement: PlacementPreset,
}

impl Section {
    fn new(id: &str, title: &str, description: &str, position: [f32; 3], rotation: [f32; 3]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            placement: PlacementPreset {
                position,
                rotation_degrees: rotation,
            },
        }
    }
}

/// Static, author-defined content. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Registry {
    #[serde(default)]
    pub nodes: Vec<MemoryNode>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Registry {
    pub fn new(nodes: Vec<MemoryNode>, sections: Vec<Section>) -> Result<Self> {
        let registry = Self { nodes, sections };
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let registry: Registry = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name.eq_ignore_ascii_case(name))
            .map(NodeId)
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for node in &self.nodes {
            if node.name.trim().is_empty() {
                return Err(PalaceError::InvalidRegistry("node with empty name".into()));
            }
            if !names.insert(node.name.to_lowercase()) {
                return Err(PalaceError::InvalidRegistry(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
            if node.position.iter().any(|c| !c.is_finite()) {
                return Err(PalaceError::InvalidRegistry(format!(
                    "node '{}' has a non-finite position",
                    node.name
                )));
            }
            let core = &node.style.core;
            if !(core.size > 0.0) {
                return Err(PalaceError::InvalidRegistry(format!(
                    "node '{}' core size must be positive",
                    node.name
                )));
            }
            let sats = &node.style.satellites;
            for opacity in [core.opacity, sats.opacity] {
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(PalaceError::InvalidRegistry(format!(
                        "node '{}' opacity {opacity} outside [0, 1]",
                        node.name
                    )));
                }
            }
            if !(sats.min_radius >= 0.0 && sats.min_radius <= sats.max_radius) {
                return Err(PalaceError::InvalidRegistry(format!(
                    "node '{}' satellite band [{}, {}] is not ordered",
                    node.name, sats.min_radius, sats.max_radius
                )));
            }
        }

        let mut ids = HashSet::new();
        for section in &self.sections {
            if !ids.insert(section.id.as_str()) {
                return Err(PalaceError::InvalidRegistry(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
        }
        Ok(())
    }

    /// The five hotspots of the portfolio page with intro and outro sections.
    pub fn builtin() -> Self {
        let mut nodes = vec![
            MemoryNode::new(
                "curiosity",
                [-10.0, 5.0, -20.0],
                "Curiosity",
                "Drawn to unfamiliar starlight: curiosity 0.82",
            ),
            MemoryNode::new(
                "focus",
                [15.0, 10.0, -25.0],
                "Focus",
                "Moments of deep immersion: focus 0.76",
            ),
            MemoryNode::new(
                "values",
                [-20.0, -5.0, -28.0],
                "Values",
                "Inquiry, precision, humour",
            ),
            MemoryNode::new(
                "memory",
                [5.0, -15.0, -22.0],
                "Memory",
                "The self that remains as data",
            ),
            MemoryNode::new(
                "connection",
                [0.0, 0.0, -36.0],
                "Connection",
                "Relationships linked like starlight",
            ),
        ];

        nodes[1].style.core.shape = Shape::Cube;
        nodes[2].style.core.shape = Shape::Diamond;
        nodes[0].keywords = vec![Keyword::new("Exploration"), Keyword::new("Questions")];
        nodes[1].keywords = vec![Keyword::new("Flow"), Keyword::new("Depth")];
        nodes[0].tags = vec!["trait".into()];
        nodes[1].tags = vec!["trait".into()];

        let mut sections = vec![Section::new(
            "intro",
            "Scroll to begin exploring",
            "As each section arrives the model turns to face that point.",
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
        )];
        for (i, node) in nodes.iter().enumerate() {
            let yaw = -60.0 + 30.0 * i as f32;
            sections.push(Section::new(
                &node.name,
                &node.title,
                &node.summary,
                [0.0, 0.0, 0.0],
                [10.0, yaw, 0.0],
            ));
        }
        sections.push(Section::new(
            "outro",
            "The end",
            "Scroll back up to revisit another point.",
            [0.0, 0.0, -8.0],
            [0.0, 0.0, 0.0],
        ));

        Self { nodes, sections }
    }
}
