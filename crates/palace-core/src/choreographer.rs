//! Scene state machine driving the camera and the brain model's transform.
//!
//! Scroll sections tween the model while the camera holds still. Entering
//! exploration is one-way: scroll links are dropped for the session, the model
//! snaps to its canonical pose, and the camera flies to the exploration
//! viewpoint. Once it lands the user owns the camera.
//!
//! [`Writer`] is the single rule for who may change each transform. Ambient
//! breathing on node subtrees is outside this machine entirely.

use glam::{Quat, Vec3};
use serde::Serialize;

use crate::camera::Camera;
use crate::config::ChoreographyConfig;
use crate::registry::{NodeId, PlacementPreset};
use crate::scene::Transform;
use crate::tween::{Placement, Track, TrackStatus, Tween};

/// Mutually exclusive scene modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "target", rename_all = "snake_case")]
pub enum SceneState {
    Intro,
    ScrollSection(usize),
    Exploring,
    DashboardOpen(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorePhase {
    NotStarted,
    /// Camera is flying to the exploration viewpoint.
    Flying,
    Free,
}

/// Who may write a transform right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Writer {
    /// Nobody; the transform holds.
    Fixed,
    SectionTween,
    ExploreTween,
    /// Keyboard movement and drag orbit.
    User,
}

/// The pose the model snaps to on exploration entry.
pub const CANONICAL_PLACEMENT: Placement = Placement {
    position: Vec3::ZERO,
    rotation: Quat::IDENTITY,
};

#[derive(Clone, Debug)]
pub struct Choreographer {
    config: ChoreographyConfig,
    state: SceneState,
    phase: ExplorePhase,
    scroll_linked: bool,
    placement: Track<Placement>,
    scale: Track<f32>,
    camera: Track<Vec3>,
    nodes_built: bool,
}

impl Choreographer {
    pub fn new(config: ChoreographyConfig) -> Self {
        Self {
            config,
            state: SceneState::Intro,
            phase: ExplorePhase::NotStarted,
            scroll_linked: true,
            placement: Track::default(),
            scale: Track::default(),
            camera: Track::default(),
            nodes_built: false,
        }
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn phase(&self) -> ExplorePhase {
        self.phase
    }

    pub fn is_scroll_linked(&self) -> bool {
        self.scroll_linked
    }

    pub fn model_writer(&self) -> Writer {
        match (self.state, self.phase) {
            (SceneState::Intro | SceneState::ScrollSection(_), _) => Writer::SectionTween,
            (SceneState::Exploring, ExplorePhase::Flying) => Writer::ExploreTween,
            _ => Writer::Fixed,
        }
    }

    pub fn camera_writer(&self) -> Writer {
        match (self.state, self.phase) {
            (SceneState::Exploring, ExplorePhase::Flying) => Writer::ExploreTween,
            (SceneState::Exploring, ExplorePhase::Free) => Writer::User,
            _ => Writer::Fixed,
        }
    }

    /// Movement, hover and click are live only in free exploration.
    pub fn input_enabled(&self) -> bool {
        self.camera_writer() == Writer::User
    }

    pub fn is_transitioning(&self) -> bool {
        self.placement.is_active() || self.scale.is_active() || self.camera.is_active()
    }

    /// Tween the model toward a section's preset. Ignored once scroll links are gone.
    pub fn focus_section(&mut self, index: usize, preset: &PlacementPreset, model: &Transform) -> bool {
        if !self.scroll_linked || self.state == SceneState::ScrollSection(index) {
            return false;
        }
        let target = Placement {
            position: preset.position(),
            rotation: preset.rotation(),
        };
        self.placement.start(Tween::new(
            model.placement(),
            target,
            self.config.section_duration,
            self.config.section_ease,
        ));
        self.state = SceneState::ScrollSection(index);
        tracing::debug!(section = index, "section focus");
        true
    }

    /// Start the exploration flight. Returns false if it was already started.
    pub fn enter_exploration(&mut self, model: &mut Transform, camera: &Camera) -> bool {
        if self.phase != ExplorePhase::NotStarted {
            return false;
        }
        self.scroll_linked = false;
        self.placement.cancel();
        self.scale.cancel();
        model.set_placement(CANONICAL_PLACEMENT);
        model.scale = 1.0;

        let duration = self.config.explore_duration;
        let ease = self.config.explore_ease;
        self.camera.start(Tween::new(
            camera.position,
            Vec3::from_array(self.config.explore_camera_target),
            duration,
            ease,
        ));
        self.scale
            .start(Tween::new(1.0, self.config.explore_model_scale, duration, ease));
        self.state = SceneState::Exploring;
        self.phase = ExplorePhase::Flying;
        tracing::info!("exploration started");
        true
    }

    /// Advance every active track. Returns true on the step the camera lands.
    pub fn step(&mut self, dt: f32, model: &mut Transform, camera: &mut Camera) -> bool {
        let mut placement = model.placement();
        if self.placement.advance(dt, &mut placement) != TrackStatus::Idle {
            model.set_placement(placement);
        }
        self.scale.advance(dt, &mut model.scale);

        let mut position = camera.position;
        match self.camera.advance(dt, &mut position) {
            TrackStatus::Idle => false,
            TrackStatus::Running => {
                camera.position = position;
                camera.look_at(model.translation);
                false
            }
            TrackStatus::Finished => {
                camera.position = position;
                camera.look_at(model.translation);
                self.phase = ExplorePhase::Free;
                tracing::info!(?position, "exploration camera arrived");
                true
            }
        }
    }

    /// True exactly once: after the camera lands and the model is available.
    pub fn take_node_build(&mut self, model_ready: bool) -> bool {
        if self.nodes_built || self.phase != ExplorePhase::Free || !model_ready {
            return false;
        }
        self.nodes_built = true;
        true
    }

    pub fn nodes_built(&self) -> bool {
        self.nodes_built
    }

    pub fn open_node(&mut self, node: NodeId) -> bool {
        if !self.input_enabled() {
            return false;
        }
        self.state = SceneState::DashboardOpen(node);
        true
    }

    /// Back to free exploration. Returns the node whose dashboard closed.
    pub fn close_node(&mut self) -> Option<NodeId> {
        let SceneState::DashboardOpen(node) = self.state else {
            return None;
        };
        self.state = SceneState::Exploring;
        Some(node)
    }

    pub fn open_node_id(&self) -> Option<NodeId> {
        match self.state {
            SceneState::DashboardOpen(node) => Some(node),
            _ => None,
        }
    }

    /// Drop every track. An interrupted flight can be started again.
    pub fn cancel_all(&mut self) {
        self.placement.cancel();
        self.scale.cancel();
        self.camera.cancel();
        if self.phase == ExplorePhase::Flying {
            self.phase = ExplorePhase::NotStarted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use approx::assert_relative_eq;

    fn setup() -> (Choreographer, Transform, Camera) {
        (
            Choreographer::new(ChoreographyConfig::default()),
            Transform::default(),
            Camera::new(&CameraConfig::default()),
        )
    }

    fn preset(yaw: f32) -> PlacementPreset {
        PlacementPreset {
            position: [0.0, 1.0, 0.0],
            rotation_degrees: [0.0, yaw, 0.0],
        }
    }

    fn run(c: &mut Choreographer, model: &mut Transform, cam: &mut Camera, seconds: f32) -> bool {
        let mut arrived = false;
        let steps = (seconds * 60.0).ceil() as usize;
        for _ in 0..steps {
            arrived |= c.step(1.0 / 60.0, model, cam);
        }
        arrived
    }

    #[test]
    fn test_section_focus_moves_model_not_camera() {
        let (mut c, mut model, mut cam) = setup();
        let cam_before = cam.position;
        assert!(c.focus_section(1, &preset(90.0), &model));
        assert_eq!(c.state(), SceneState::ScrollSection(1));
        run(&mut c, &mut model, &mut cam, 1.5);
        assert_relative_eq!(model.translation.y, 1.0, epsilon = 1e-5);
        let target = preset(90.0).rotation();
        assert_relative_eq!(model.rotation.dot(target).abs(), 1.0, epsilon = 1e-6);
        assert_eq!(cam.position, cam_before);
    }

    #[test]
    fn test_section_refocus_overrides() {
        let (mut c, mut model, mut cam) = setup();
        c.focus_section(1, &preset(90.0), &model);
        run(&mut c, &mut model, &mut cam, 0.3);
        c.focus_section(2, &preset(-45.0), &model);
        run(&mut c, &mut model, &mut cam, 2.0);
        let target = preset(-45.0).rotation();
        assert_relative_eq!(model.rotation.dot(target).abs(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_exploration_snaps_and_cancels_section_tween() {
        let (mut c, mut model, mut cam) = setup();
        c.focus_section(1, &preset(90.0), &model);
        run(&mut c, &mut model, &mut cam, 0.3);
        assert!(c.enter_exploration(&mut model, &cam));
        assert_eq!(model.placement(), CANONICAL_PLACEMENT);
        c.step(1.0 / 60.0, &mut model, &mut cam);
        // Only the explore tweens remain; the model stays at the origin.
        assert_eq!(model.translation, Vec3::ZERO);
        assert!(!c.focus_section(3, &preset(10.0), &model));
        assert_eq!(c.state(), SceneState::Exploring);
    }

    #[test]
    fn test_exploration_entry_is_idempotent() {
        let (mut c, mut model, mut cam) = setup();
        assert!(c.enter_exploration(&mut model, &cam));
        assert!(!c.enter_exploration(&mut model, &cam));
        assert!(run(&mut c, &mut model, &mut cam, 4.5));
        assert!(!c.enter_exploration(&mut model, &cam));
        assert!(c.take_node_build(true));
        assert!(!c.take_node_build(true));
    }

    #[test]
    fn test_flight_lands_on_target_and_scales_model() {
        let (mut c, mut model, mut cam) = setup();
        c.enter_exploration(&mut model, &cam);
        assert_eq!(c.camera_writer(), Writer::ExploreTween);
        run(&mut c, &mut model, &mut cam, 1.0);
        // Re-aimed at the model while flying.
        let facing = (model.translation - cam.position).normalize();
        assert!((cam.forward() - facing).length() < 1e-4);

        run(&mut c, &mut model, &mut cam, 3.5);
        assert_eq!(cam.position, Vec3::new(0.0, 4.0, 30.0));
        assert_relative_eq!(model.scale, 1.15);
        assert_eq!(c.phase(), ExplorePhase::Free);
        assert!(c.input_enabled());
        assert!(!c.is_transitioning());
    }

    #[test]
    fn test_cancel_mid_flight_resets_phase() {
        let (mut c, mut model, mut cam) = setup();
        c.enter_exploration(&mut model, &cam);
        run(&mut c, &mut model, &mut cam, 0.5);
        c.cancel_all();
        assert_eq!(c.phase(), ExplorePhase::NotStarted);
        assert!(!c.input_enabled());
        assert!(c.enter_exploration(&mut model, &cam));
        assert_eq!(c.phase(), ExplorePhase::Flying);
    }

    #[test]
    fn test_cancel_after_landing_keeps_free_control() {
        let (mut c, mut model, mut cam) = setup();
        c.enter_exploration(&mut model, &cam);
        run(&mut c, &mut model, &mut cam, 5.0);
        c.cancel_all();
        assert_eq!(c.phase(), ExplorePhase::Free);
        assert!(c.input_enabled());
    }

    #[test]
    fn test_node_build_waits_for_model() {
        let (mut c, mut model, mut cam) = setup();
        c.enter_exploration(&mut model, &cam);
        assert!(!c.take_node_build(true));
        run(&mut c, &mut model, &mut cam, 4.5);
        assert!(!c.take_node_build(false));
        assert!(!c.nodes_built());
        assert!(c.take_node_build(true));
    }

    #[test]
    fn test_open_requires_free_exploration() {
        let (mut c, mut model, mut cam) = setup();
        assert!(!c.open_node(NodeId(0)));
        c.enter_exploration(&mut model, &cam);
        assert!(!c.open_node(NodeId(0)));
        run(&mut c, &mut model, &mut cam, 4.5);
        assert!(c.open_node(NodeId(1)));
        assert!(!c.input_enabled());
        assert_eq!(c.camera_writer(), Writer::Fixed);
        assert!(!c.open_node(NodeId(0)));
        assert_eq!(c.close_node(), Some(NodeId(1)));
        assert!(c.input_enabled());
        assert_eq!(c.close_node(), None);
    }

    #[test]
    fn test_writer_table() {
        let (mut c, mut model, cam) = setup();
        assert_eq!(c.model_writer(), Writer::SectionTween);
        assert_eq!(c.camera_writer(), Writer::Fixed);
        c.enter_exploration(&mut model, &cam);
        assert_eq!(c.model_writer(), Writer::ExploreTween);
    }
}
