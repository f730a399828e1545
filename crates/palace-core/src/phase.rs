//! Offsets into the shared sine wave behind breathing nodes and pulsing
//! keyword rings.

use std::f32::consts::TAU;

use crate::constants::GOLDEN_ANGLE;

/// Radians added to `t * frequency` before taking the sine.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Phase(f32);

impl Phase {
    /// Node `i` breathes as `sin(t·f + i)`.
    pub fn for_node(index: usize) -> Self {
        Self(index as f32)
    }

    /// Ring labels step by the golden angle so neighbours never pulse together.
    pub fn for_ring_label(index: usize) -> Self {
        Self((index as f32 * GOLDEN_ANGLE).rem_euclid(TAU))
    }

    pub fn radians(self) -> f32 {
        self.0
    }

    /// In [-1, 1].
    pub fn oscillate(self, t: f32, frequency: f32) -> f32 {
        (t * frequency + self.0).sin()
    }

    /// Scale factor around 1; positive while `amplitude < 1`.
    pub fn breathe(self, t: f32, frequency: f32, amplitude: f32) -> f32 {
        1.0 + self.oscillate(t, frequency) * amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shortest distance between two angles.
    fn gap(a: Phase, b: Phase) -> f32 {
        let d = (a.radians() - b.radians()).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn test_node_breath_offsets_by_index() {
        assert_eq!(Phase::for_node(0).radians(), 0.0);
        assert_eq!(Phase::for_node(3).radians(), 3.0);
        // At t = 0 node 0 sits at rest while node 1 is already inflated.
        assert_eq!(Phase::for_node(0).breathe(0.0, 2.0, 0.04), 1.0);
        assert!(Phase::for_node(1).breathe(0.0, 2.0, 0.04) > 1.0);
    }

    #[test]
    fn test_breathe_stays_positive_below_unit_amplitude() {
        for i in 0..5 {
            let p = Phase::for_node(i);
            for k in 0..200 {
                let s = p.breathe(k as f32 * 0.05, 2.0, 0.99);
                assert!(s > 0.0 && s <= 1.99, "node {i} scale {s}");
            }
        }
    }

    #[test]
    fn test_ring_labels_wrap_into_one_turn() {
        for i in 0..32 {
            let r = Phase::for_ring_label(i).radians();
            assert!((0.0..TAU).contains(&r), "label {i} at {r}");
        }
        assert_eq!(Phase::for_ring_label(0).oscillate(0.0, 1.6), 0.0);
    }

    #[test]
    fn test_ring_neighbours_not_in_step() {
        let phases: Vec<Phase> = (0..10).map(Phase::for_ring_label).collect();
        for i in 0..phases.len() {
            for j in (i + 1)..phases.len() {
                let d = gap(phases[i], phases[j]);
                assert!(d > 0.25, "labels {i} and {j} too close: {d} rad");
            }
        }
    }
}
