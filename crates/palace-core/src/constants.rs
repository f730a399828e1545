/// Golden angle in radians: 2π / φ²
pub const GOLDEN_ANGLE: f32 = 2.399_963_3;

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f32 = 1e-6;

/// Extra satellite-to-satellite filaments attempted per satellite.
pub const FILAMENT_EXTRA_RATIO: f32 = 0.8;

/// Visible-fraction steps reported for scroll sections (0, 1/20, ..., 1).
pub const SECTION_THRESHOLD_STEPS: usize = 20;

/// Standard NDC depth limit. Anything at or past it is behind the camera or clipped.
pub const FAR_CLIP_DEPTH: f32 = 1.0;

/// Snapshot wire format version.
pub const SNAPSHOT_VERSION: &str = "1";
