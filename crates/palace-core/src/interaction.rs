//! Pointer picking against node core markers and distance feedback.

use glam::Vec3;
use serde::Serialize;

use crate::camera::Ray;
use crate::registry::{NodeId, Shape};
use crate::scene::NodeSubtree;

const PARALLEL_EPS: f32 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    /// Distance along the ray in world units.
    pub distance: f32,
}

/// Nearest core marker under the ray. Satellites and filaments never count.
pub fn pick(ray: &Ray, nodes: &[NodeSubtree]) -> Option<Hit> {
    nodes
        .iter()
        .filter_map(|subtree| {
            intersect_marker(ray, subtree).map(|distance| Hit {
                node: subtree.node,
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Ray parameter of the first hit on a subtree's core marker, tested in the
/// subtree's local frame so spin and breathing are honoured.
pub fn intersect_marker(ray: &Ray, subtree: &NodeSubtree) -> Option<f32> {
    let inverse = subtree.transform.matrix().inverse();
    let origin = inverse.transform_point3(ray.origin);
    // Unnormalized on purpose: the parameter then stays in world units.
    let direction = inverse.transform_vector3(ray.direction);
    let size = subtree.core.size;

    match subtree.core.shape {
        Shape::Sphere => ray_sphere(origin, direction, size),
        Shape::Cube => ray_slabs(origin, direction, &[(Vec3::X, size), (Vec3::Y, size), (Vec3::Z, size)]),
        Shape::Diamond => {
            let h = size / 3f32.sqrt();
            ray_slabs(
                origin,
                direction,
                &[
                    (Vec3::new(1.0, 1.0, 1.0).normalize(), h),
                    (Vec3::new(1.0, 1.0, -1.0).normalize(), h),
                    (Vec3::new(1.0, -1.0, 1.0).normalize(), h),
                    (Vec3::new(-1.0, 1.0, 1.0).normalize(), h),
                ],
            )
        }
    }
}

fn ray_sphere(origin: Vec3, direction: Vec3, radius: f32) -> Option<f32> {
    let a = direction.dot(direction);
    if a < PARALLEL_EPS {
        return None;
    }
    let b = 2.0 * origin.dot(direction);
    let c = origin.dot(origin) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    let near = (-b - sqrt) / (2.0 * a);
    let far = (-b + sqrt) / (2.0 * a);
    if far < 0.0 {
        None
    } else {
        Some(near.max(0.0))
    }
}

/// Intersection of slabs `|n · p| <= h`. Covers boxes and octahedra.
fn ray_slabs(origin: Vec3, direction: Vec3, slabs: &[(Vec3, f32)]) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for &(normal, half) in slabs {
        let num = normal.dot(origin);
        let denom = normal.dot(direction);
        if denom.abs() < PARALLEL_EPS {
            if num.abs() > half {
                return None;
            }
            continue;
        }
        let t1 = (-half - num) / denom;
        let t2 = (half - num) / denom;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_max < t_min {
            return None;
        }
    }
    if t_max < 0.0 {
        None
    } else {
        Some(t_min.max(0.0))
    }
}

/// HUD urgency band. Ordered from least to most urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Proximity {
    Far,
    Approaching,
    Locking,
    InRange,
    InteractNow,
}

impl Proximity {
    /// `thresholds` are strictly descending; each one crossed raises urgency.
    pub fn classify(distance: f32, thresholds: &[f32; 4]) -> Self {
        let crossed = thresholds.iter().filter(|&&limit| distance <= limit).count();
        match crossed {
            0 => Proximity::Far,
            1 => Proximity::Approaching,
            2 => Proximity::Locking,
            3 => Proximity::InRange,
            _ => Proximity::InteractNow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Proximity::Far => "FAR",
            Proximity::Approaching => "APPROACHING",
            Proximity::Locking => "LOCKING",
            Proximity::InRange => "IN RANGE",
            Proximity::InteractNow => "INTERACT NOW",
        }
    }
}

/// Closest node centre to `position`.
pub fn nearest_node(position: Vec3, nodes: &[NodeSubtree]) -> Option<(NodeId, f32)> {
    nodes
        .iter()
        .map(|s| (s.node, s.center().distance(position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// What a pointer move did to the hover preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverChange {
    Unchanged,
    Entered(NodeId),
    Cleared,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
    hovered: Option<NodeId>,
}

impl HoverState {
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn update(&mut self, hit: Option<NodeId>) -> HoverChange {
        if hit == self.hovered {
            return HoverChange::Unchanged;
        }
        self.hovered = hit;
        match hit {
            Some(node) => HoverChange::Entered(node),
            None => HoverChange::Cleared,
        }
    }

    pub fn clear(&mut self) -> HoverChange {
        self.update(None)
    }
}
