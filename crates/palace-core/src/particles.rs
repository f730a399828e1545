//! Procedural point clouds: starfield, dust, node satellites and filaments.
//!
//! Every buffer is generated once and never mutated afterwards. Only the
//! transform of the object that owns it animates.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{EPSILON, FILAMENT_EXTRA_RATIO};

/// How points are scattered.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Uniform density inside a ball of `radius`.
    SphereVolume { radius: f32 },
    /// Radius uniform in `[min_radius, max_radius]`, direction uniform.
    Shell { min_radius: f32, max_radius: f32 },
    /// Each axis uniform over `[-extent, extent]`.
    Box { extent: f32 },
}

/// Immutable flat list of 3D points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
}

impl ParticleBuffer {
    pub fn generate(count: usize, distribution: Distribution, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| sample(distribution, rng))
            .collect();
        Self { positions }
    }

    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Flattened `[x, y, z, x, y, z, ...]`, the layout a GPU vertex buffer wants.
    pub fn to_flat(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }
}

/// Uniformly distributed unit vector: `theta = 2πu`, `phi = acos(2v - 1)`.
pub fn random_direction(rng: &mut impl Rng) -> Vec3 {
    let theta = std::f32::consts::TAU * rng.random::<f32>();
    let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

fn sample(distribution: Distribution, rng: &mut impl Rng) -> Vec3 {
    match distribution {
        Distribution::SphereVolume { radius } => {
            // cbrt keeps density uniform instead of clustering at the centre
            let r = radius * rng.random::<f32>().cbrt();
            random_direction(rng) * r
        }
        Distribution::Shell {
            min_radius,
            max_radius,
        } => {
            let r = min_radius + rng.random::<f32>() * (max_radius - min_radius);
            random_direction(rng) * r
        }
        Distribution::Box { extent } => Vec3::new(
            (rng.random::<f32>() * 2.0 - 1.0) * extent,
            (rng.random::<f32>() * 2.0 - 1.0) * extent,
            (rng.random::<f32>() * 2.0 - 1.0) * extent,
        ),
    }
}

/// Line segments joining a node centre to its satellites.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilamentSet {
    segments: Vec<[Vec3; 2]>,
    spokes: usize,
    extra_attempted: usize,
    extra_skipped: usize,
}

impl FilamentSet {
    /// One spoke per satellite plus `floor(0.8 * S)` random satellite pairs.
    /// Pairs whose endpoints coincide are dropped, not redrawn.
    pub fn generate(center: Vec3, satellites: &ParticleBuffer, rng: &mut impl Rng) -> Self {
        let points = satellites.positions();
        let mut segments: Vec<[Vec3; 2]> = points.iter().map(|&p| [center, p]).collect();
        let spokes = segments.len();

        let extra_attempted = if points.is_empty() {
            0
        } else {
            (points.len() as f32 * FILAMENT_EXTRA_RATIO).floor() as usize
        };
        let mut extra_skipped = 0;

        for _ in 0..extra_attempted {
            let a = points[rng.random_range(0..points.len())];
            let b = points[rng.random_range(0..points.len())];
            if a.distance_squared(b) <= EPSILON * EPSILON {
                extra_skipped += 1;
                continue;
            }
            segments.push([a, b]);
        }

        Self {
            segments,
            spokes,
            extra_attempted,
            extra_skipped,
        }
    }

    pub fn segments(&self) -> &[[Vec3; 2]] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn spokes(&self) -> usize {
        self.spokes
    }

    pub fn extra_attempted(&self) -> usize {
        self.extra_attempted
    }

    pub fn extra_skipped(&self) -> usize {
        self.extra_skipped
    }
}
