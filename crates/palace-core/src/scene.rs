//! Scene graph: backdrop clouds, the brain model, and one subtree per memory node.

use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use uuid::Uuid;

use crate::color::Color;
use crate::config::{BackdropConfig, NodeConfig};
use crate::particles::{Distribution, FilamentSet, ParticleBuffer};
use crate::phase::Phase;
use crate::registry::{MemoryNode, NodeId, Registry, SatelliteStyle, Shape};
use crate::tween::Placement;

/// Translation, rotation and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.translation)
    }

    pub fn placement(&self) -> Placement {
        Placement {
            position: self.translation,
            rotation: self.rotation,
        }
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.translation = placement.position;
        self.rotation = placement.rotation;
    }
}

/// The hit-testable marker at the centre of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreMarker {
    pub shape: Shape,
    pub size: f32,
    pub color: Color,
    pub opacity: f32,
}

/// Everything built for one memory node, grouped under one transform.
///
/// Satellites and filaments are stored in the group's local frame. The group
/// transform is owned by the ambient breathing/spin animation only.
#[derive(Clone, Debug)]
pub struct NodeSubtree {
    pub id: Uuid,
    pub node: NodeId,
    pub transform: Transform,
    pub core: CoreMarker,
    pub satellites: ParticleBuffer,
    pub satellite_style: SatelliteStyle,
    pub filaments: FilamentSet,
    spin_angle: f32,
    breath: Phase,
}

impl NodeSubtree {
    pub fn build(
        id: NodeId,
        node: &MemoryNode,
        expansion: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let sats = &node.style.satellites;
        let satellites = ParticleBuffer::generate(
            sats.count,
            Distribution::Shell {
                min_radius: sats.min_radius,
                max_radius: sats.max_radius,
            },
            rng,
        );
        let filaments = FilamentSet::generate(Vec3::ZERO, &satellites, rng);
        let core = &node.style.core;

        Self {
            id: Uuid::new_v4(),
            node: id,
            transform: Transform::at(node.position() * expansion),
            core: CoreMarker {
                shape: core.shape,
                size: core.size,
                color: core.color,
                opacity: core.opacity,
            },
            satellites,
            satellite_style: sats.clone(),
            filaments,
            spin_angle: 0.0,
            breath: Phase::for_node(id.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.transform.translation
    }

    /// Breathing scale and slow spin. Runs every frame regardless of choreography.
    pub fn animate(&mut self, t: f32, dt: f32, config: &NodeConfig) {
        self.transform.scale = self
            .breath
            .breathe(t, config.breath_frequency, config.breath_amplitude);
        self.spin_angle = (self.spin_angle + config.spin * dt).rem_euclid(std::f32::consts::TAU);
        self.transform.rotation = Quat::from_rotation_y(self.spin_angle);
    }
}

/// Starfield, dust sphere and neural cloud behind everything else.
#[derive(Clone, Debug, Default)]
pub struct Backdrop {
    pub background: Color,
    pub stars: ParticleBuffer,
    pub dust: ParticleBuffer,
    /// Drawn twice: small bright points and a large faint glow layer.
    pub cloud: ParticleBuffer,
    pub star_rotation: f32,
    pub cloud_rotation: f32,
    pub star_spin: f32,
    pub cloud_spin: f32,
}

impl Backdrop {
    pub fn generate(config: &BackdropConfig, rng: &mut impl Rng) -> Self {
        Self {
            background: config.background,
            stars: ParticleBuffer::generate(
                config.star_count,
                Distribution::Box {
                    extent: config.star_extent,
                },
                rng,
            ),
            dust: ParticleBuffer::generate(
                config.dust_count,
                Distribution::SphereVolume {
                    radius: config.dust_radius,
                },
                rng,
            ),
            cloud: ParticleBuffer::generate(
                config.cloud_count,
                Distribution::Shell {
                    min_radius: config.cloud_min_radius,
                    max_radius: config.cloud_max_radius,
                },
                rng,
            ),
            star_rotation: 0.0,
            cloud_rotation: 0.0,
            star_spin: config.star_spin,
            cloud_spin: config.cloud_spin,
        }
    }

    pub fn animate(&mut self, dt: f32) {
        let tau = std::f32::consts::TAU;
        self.star_rotation = (self.star_rotation + self.star_spin * dt).rem_euclid(tau);
        self.cloud_rotation = (self.cloud_rotation + self.cloud_spin * dt).rem_euclid(tau);
    }

    pub fn point_count(&self) -> usize {
        self.stars.len() + self.dust.len() + self.cloud.len()
    }
}

/// One flattened model mesh, positions already in model space.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum AssetState {
    #[default]
    Pending,
    Loaded,
    Failed(String),
}

/// The choreographed brain. Its transform exists before the asset arrives.
#[derive(Clone, Debug, Default)]
pub struct BrainModel {
    pub transform: Transform,
    pub meshes: Vec<ModelMesh>,
    pub state: AssetState,
}

impl BrainModel {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    pub fn is_loaded(&self) -> bool {
        self.state == AssetState::Loaded
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    pub backdrop: Backdrop,
    pub model: BrainModel,
    nodes: Vec<NodeSubtree>,
}

impl SceneGraph {
    pub fn new(backdrop: Backdrop) -> Self {
        Self {
            backdrop,
            model: BrainModel::default(),
            nodes: Vec::new(),
        }
    }

    /// Build one subtree per registry node. Returns the number built.
    pub fn populate_nodes(
        &mut self,
        registry: &Registry,
        config: &NodeConfig,
        rng: &mut impl Rng,
    ) -> usize {
        let before = self.nodes.len();
        for (id, node) in registry.node_ids().zip(&registry.nodes) {
            self.nodes
                .push(NodeSubtree::build(id, node, config.expansion, rng));
        }
        self.nodes.len() - before
    }

    pub fn nodes(&self) -> &[NodeSubtree] {
        &self.nodes
    }

    pub fn subtree(&self, node: NodeId) -> Option<&NodeSubtree> {
        self.nodes.iter().find(|s| s.node == node)
    }

    pub fn animate(&mut self, t: f32, dt: f32, config: &NodeConfig) {
        self.backdrop.animate(dt);
        for subtree in &mut self.nodes {
            subtree.animate(t, dt, config);
        }
    }
}
