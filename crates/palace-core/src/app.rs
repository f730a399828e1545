//! The application context. One [`Palace`] owns the scene, the camera, the
//! state machine and the overlay, and is driven by input events, frames and
//! timer ticks from a single thread.

use rand::rngs::SmallRng;

use crate::audio::{AudioBackend, AudioToggle};
use crate::camera::Camera;
use crate::choreographer::{Choreographer, SceneState};
use crate::clock::{CivilTime, now_unix_secs};
use crate::command::{Command, parse_script};
use crate::config::PalaceConfig;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::hud::HudReadout;
use crate::input::{HeldKeys, MoveKey, clamp_to_bounds, integrate_movement, orbit};
use crate::interaction::{HoverChange, HoverState, pick};
use crate::overlay::sync_labels;
use crate::registry::{NodeId, Registry};
use crate::scene::{AssetState, Backdrop, ModelMesh, SceneGraph};
use crate::sections::{SectionLayout, SectionTracker};
use crate::snapshot::{WireSnapshot, capture};
use crate::surface::{ElementKey, ElementUpdate, Overlay, OverlaySurface};
use crate::timers::Banner;

/// Pixel offset of the hover preview from the pointer.
const PREVIEW_OFFSET: [f32; 2] = [16.0, 16.0];

/// What a renderer sees once per frame.
pub struct RenderFrame<'a> {
    pub camera: &'a Camera,
    pub scene: &'a SceneGraph,
    pub time: f32,
}

/// Draws the scene. The engine never depends on how.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame<'_>);
}

/// Counts frames and draws nothing.
#[derive(Debug, Default, Clone)]
pub struct NullRenderer {
    pub frames: usize,
    pub last_points: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        self.last_points = frame.scene.backdrop.point_count()
            + frame
                .scene
                .nodes()
                .iter()
                .map(|n| n.satellites.len())
                .sum::<usize>();
    }
}

pub struct Palace<S: OverlaySurface> {
    config: PalaceConfig,
    registry: Registry,
    scene: SceneGraph,
    camera: Camera,
    choreographer: Choreographer,
    sections: SectionTracker,
    dashboard: Dashboard,
    hover: HoverState,
    held: HeldKeys,
    overlay: Overlay<S>,
    banner: Banner,
    audio: AudioToggle,
    hud: Option<HudReadout>,
    rng: SmallRng,
    time: f32,
    frames: u64,
    clock_secs: Option<u64>,
}

impl<S: OverlaySurface> Palace<S> {
    pub fn new(config: PalaceConfig, registry: Registry, surface: S, mut rng: SmallRng) -> Result<Self> {
        config.validate()?;
        registry.validate()?;
        let backdrop = Backdrop::generate(&config.backdrop, &mut rng);
        let camera = Camera::new(&config.camera);
        tracing::info!(
            nodes = registry.nodes.len(),
            sections = registry.sections.len(),
            backdrop_points = backdrop.point_count(),
            "palace initialised"
        );
        Ok(Self {
            choreographer: Choreographer::new(config.choreography.clone()),
            sections: SectionTracker::new(registry.sections.len()),
            dashboard: Dashboard::new(config.dashboard.clone()),
            scene: SceneGraph::new(backdrop),
            overlay: Overlay::new(surface),
            hover: HoverState::default(),
            held: HeldKeys::default(),
            banner: Banner::default(),
            audio: AudioToggle::default(),
            hud: None,
            time: 0.0,
            frames: 0,
            clock_secs: None,
            camera,
            config,
            registry,
            rng,
        })
    }

    // --- accessors ---

    pub fn config(&self) -> &PalaceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn choreographer(&self) -> &Choreographer {
        &self.choreographer
    }

    pub fn state(&self) -> SceneState {
        self.choreographer.state()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hover.hovered()
    }

    pub fn hud(&self) -> Option<&HudReadout> {
        self.hud.as_ref()
    }

    pub fn overlay(&self) -> &Overlay<S> {
        &self.overlay
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.message()
    }

    pub fn audio_on(&self) -> bool {
        self.audio.is_on()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Hover, click and movement are live.
    pub fn interaction_enabled(&self) -> bool {
        self.choreographer.input_enabled() && !self.dashboard.is_open()
    }

    pub fn snapshot(&self, points: bool) -> WireSnapshot {
        capture(&self.camera, &self.scene, &self.registry, self.state(), points)
    }

    // --- asset events ---

    pub fn on_model_loaded(&mut self, meshes: Vec<ModelMesh>) {
        let vertices: usize = meshes.iter().map(|m| m.positions.len()).sum();
        tracing::info!(meshes = meshes.len(), vertices, "model loaded");
        self.scene.model.meshes = meshes;
        self.scene.model.state = AssetState::Loaded;
        self.try_build_nodes();
    }

    /// Node subtrees and clicking never activate after this.
    pub fn on_model_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%reason, "model failed to load");
        self.scene.model.state = AssetState::Failed(reason);
    }

    fn try_build_nodes(&mut self) {
        if !self.choreographer.take_node_build(self.scene.model.is_loaded()) {
            return;
        }
        let built = self
            .scene
            .populate_nodes(&self.registry, &self.config.nodes, &mut self.rng);
        let resolved = self.overlay.resolve(&ElementKey::node_keys(&self.registry));
        for (id, node) in self.registry.node_ids().zip(&self.registry.nodes) {
            self.overlay.text(ElementKey::NodeLabel(id), node.title.clone());
            for (k, keyword) in node.keywords.iter().enumerate() {
                self.overlay
                    .text(ElementKey::KeywordLabel(id, k), keyword.label.clone());
            }
        }
        tracing::info!(built, labels = resolved, "node subtrees constructed");
    }

    // --- scroll ---

    /// One visibility report for one section.
    pub fn on_section_visibility(&mut self, index: usize, ratio: f32) {
        if let Some(dominant) = self.sections.update(index, ratio) {
            self.focus_section(dominant);
        }
    }

    /// A scroll step against a page layout.
    pub fn on_scroll(&mut self, layout: &SectionLayout, scroll_y: f32) {
        let ratios = layout.visible_ratios(scroll_y, self.camera.viewport.height);
        if let Some(dominant) = self.sections.update_all(&ratios) {
            self.focus_section(dominant);
        }
    }

    fn focus_section(&mut self, index: usize) {
        let Some(section) = self.registry.sections.get(index) else {
            return;
        };
        if self
            .choreographer
            .focus_section(index, &section.placement, &self.scene.model.transform)
        {
            self.overlay.text(ElementKey::SectionTitle, section.title.clone());
            self.overlay
                .text(ElementKey::SectionDescription, section.description.clone());
        }
    }

    // --- explicit actions ---

    pub fn enter_exploration(&mut self) -> bool {
        let started = self
            .choreographer
            .enter_exploration(&mut self.scene.model.transform, &self.camera);
        if started {
            self.overlay
                .update(ElementKey::SectionTitle, ElementUpdate::Visible(false));
            self.overlay
                .update(ElementKey::SectionDescription, ElementUpdate::Visible(false));
        }
        started
    }

    pub fn on_pointer_move(&mut self, px: f32, py: f32) {
        if !self.interaction_enabled() {
            return;
        }
        let ray = self.camera.ray_from_pixel(px, py);
        let hit = pick(&ray, self.scene.nodes()).map(|h| h.node);
        match self.hover.update(hit) {
            HoverChange::Unchanged if hit.is_some() => self.place_preview(px, py),
            HoverChange::Unchanged => {}
            HoverChange::Entered(id) => {
                let node = self.registry.node(id);
                self.overlay.text(
                    ElementKey::HoverPreview,
                    node.map(|n| n.title.clone()).unwrap_or_default(),
                );
                self.overlay.update(
                    ElementKey::HoverPreviewImage,
                    ElementUpdate::Image(node.and_then(|n| n.photo.clone())),
                );
                self.place_preview(px, py);
                self.overlay
                    .update(ElementKey::HoverPreview, ElementUpdate::Visible(true));
            }
            HoverChange::Cleared => self.hide_preview(),
        }
    }

    /// The preview follows the pointer while it stays over a node.
    fn place_preview(&mut self, px: f32, py: f32) {
        self.overlay.update(
            ElementKey::HoverPreview,
            ElementUpdate::Position {
                x: px + PREVIEW_OFFSET[0],
                y: py + PREVIEW_OFFSET[1],
            },
        );
    }

    fn hide_preview(&mut self) {
        self.overlay
            .update(ElementKey::HoverPreview, ElementUpdate::Visible(false));
    }

    /// Returns the node whose dashboard opened.
    pub fn on_pointer_click(&mut self, px: f32, py: f32) -> Option<NodeId> {
        if !self.interaction_enabled() {
            return None;
        }
        let ray = self.camera.ray_from_pixel(px, py);
        let hit = pick(&ray, self.scene.nodes())?;
        self.open_node(hit.node).then_some(hit.node)
    }

    fn open_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.registry.node(id) else {
            return false;
        };
        if !self.choreographer.open_node(id) {
            return false;
        }
        self.held.clear();
        if self.hover.clear() == HoverChange::Cleared {
            self.overlay
                .update(ElementKey::HoverPreview, ElementUpdate::Visible(false));
        }
        self.dashboard.open(id, node);
        self.dashboard.flush(&mut self.overlay);
        tracing::info!(node = %node.name, "dashboard opened");
        true
    }

    /// Orbit the camera about the model by a drag in pixels.
    pub fn on_pointer_drag(&mut self, dx: f32, dy: f32) {
        if !self.interaction_enabled() {
            return;
        }
        orbit(
            &mut self.camera,
            self.scene.model.transform.translation,
            dx,
            dy,
            &self.config.movement,
        );
    }

    /// Key presses count only while moving is allowed; releases always count.
    pub fn on_key(&mut self, key: &str, down: bool) {
        let Some(key) = MoveKey::from_key(key) else {
            return;
        };
        if !down {
            self.held.release(key);
        } else if self.interaction_enabled() {
            self.held.press(key);
        }
    }

    pub fn close_dashboard(&mut self) -> bool {
        if self.choreographer.close_node().is_none() {
            return false;
        }
        self.dashboard.close();
        self.dashboard.flush(&mut self.overlay);
        true
    }

    pub fn select_keyword(&mut self, index: usize) -> bool {
        let Some(node) = self
            .choreographer
            .open_node_id()
            .and_then(|id| self.registry.node(id))
        else {
            return false;
        };
        let selected = self.dashboard.select_keyword(node, index);
        if selected {
            self.dashboard.flush(&mut self.overlay);
        }
        selected
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    pub fn show_banner(&mut self, message: impl Into<String>) {
        self.banner.show(message, self.config.dashboard.banner_seconds);
        self.banner.flush(&mut self.overlay);
    }

    pub fn toggle_audio(&mut self, backend: &mut dyn AudioBackend) -> bool {
        let on = self.audio.toggle(backend);
        self.overlay
            .update(ElementKey::AudioToggle, ElementUpdate::Class { name: "on", on });
        on
    }

    // --- console ---

    /// Run a console script. Returns the number of commands applied.
    pub fn run_console(&mut self, script: &str) -> usize {
        let commands = parse_script(script);
        for command in &commands {
            self.apply_command(command);
        }
        commands.len()
    }

    pub fn apply_command(&mut self, command: &Command) {
        tracing::debug!(?command, "console");
        match *command {
            Command::Background(color) => self.scene.backdrop.background = color,
            Command::BrainPosition(p) => self.scene.model.transform.translation = p,
            Command::BrainOffset(d) => self.scene.model.transform.translation += d,
            Command::CameraSpeed(v) => self.config.movement.speed = v,
            Command::StarSpin(v) => self.scene.backdrop.star_spin = v,
            Command::BoundsExtent(v) => {
                self.config.movement.bounds_extent = v;
                if self.choreographer.input_enabled() {
                    self.camera.position = clamp_to_bounds(self.camera.position, v);
                }
            }
        }
    }

    // --- frame and timers ---

    /// One render step: ambient motion, choreography, movement, HUD, overlay, render.
    pub fn frame(&mut self, dt: f32, renderer: &mut impl Renderer) {
        let dt = dt.max(0.0);
        self.time += dt;
        self.frames += 1;

        self.scene.animate(self.time, dt, &self.config.nodes);

        if self
            .choreographer
            .step(dt, &mut self.scene.model.transform, &mut self.camera)
        {
            self.try_build_nodes();
        }

        if self.interaction_enabled() {
            integrate_movement(&mut self.camera, &self.held, dt, &self.config.movement);
        }

        let hud = HudReadout::compute(
            self.camera.position,
            self.scene.nodes(),
            &self.config.proximity.thresholds,
        );
        hud.write(&mut self.overlay, &self.registry);
        self.hud = Some(hud);

        sync_labels(
            &mut self.overlay,
            &self.camera,
            self.scene.nodes(),
            &self.registry,
            self.time,
            &self.config.overlay,
        );

        renderer.render(&RenderFrame {
            camera: &self.camera,
            scene: &self.scene,
            time: self.time,
        });
    }

    /// Typewriter, dashboard reveal, banner and clock. Independent of frames.
    pub fn tick_timers(&mut self, dt: f32) {
        self.dashboard.tick(dt);
        self.dashboard.flush(&mut self.overlay);
        self.banner.tick(dt);
        self.banner.flush(&mut self.overlay);

        let secs = now_unix_secs();
        if self.clock_secs != Some(secs) {
            self.clock_secs = Some(secs);
            self.overlay
                .text(ElementKey::Clock, CivilTime::from_unix(secs).label());
        }
    }

    /// Run frames and timer ticks in lockstep for `seconds` at `fps`.
    pub fn simulate(&mut self, seconds: f32, fps: f32, renderer: &mut impl Renderer) {
        let fps = fps.max(1.0);
        let dt = 1.0 / fps;
        let steps = (seconds * fps).round() as usize;
        for _ in 0..steps {
            self.frame(dt, renderer);
            self.tick_timers(dt);
        }
    }

    /// Cancel timers and drop transient state. The palace stays usable.
    pub fn teardown(&mut self, audio: &mut dyn AudioBackend) {
        self.choreographer.cancel_all();
        self.choreographer.close_node();
        self.dashboard.reset();
        self.dashboard.flush(&mut self.overlay);
        self.banner.cancel();
        self.banner.flush(&mut self.overlay);
        self.audio.stop(audio);
        self.held.clear();
        self.hover.clear();
        self.overlay.release();
        tracing::info!(frames = self.frames, "palace torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentAudio;
    use crate::command::Command;
    use crate::surface::RecordingSurface;
    use glam::Vec3;
    use rand::SeedableRng;

    fn palace() -> Palace<RecordingSurface> {
        let mut config = PalaceConfig::default();
        config.backdrop.star_count = 50;
        config.backdrop.dust_count = 50;
        config.backdrop.cloud_count = 20;
        Palace::new(
            config,
            Registry::builtin(),
            RecordingSurface::permissive(),
            SmallRng::seed_from_u64(42),
        )
        .unwrap()
    }

    fn mesh() -> Vec<ModelMesh> {
        vec![ModelMesh {
            name: "brain".into(),
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        }]
    }

    fn explored() -> Palace<RecordingSurface> {
        let mut p = palace();
        p.on_model_loaded(mesh());
        p.enter_exploration();
        p.simulate(4.5, 60.0, &mut NullRenderer::default());
        p
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = PalaceConfig::default();
        config.camera.near = -1.0;
        let result = Palace::new(
            config,
            Registry::builtin(),
            RecordingSurface::permissive(),
            SmallRng::seed_from_u64(42),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_scroll_focus_writes_section_text() {
        let mut p = palace();
        p.on_section_visibility(2, 0.8);
        assert_eq!(p.state(), SceneState::ScrollSection(2));
        assert_eq!(
            p.overlay().surface().text(ElementKey::SectionTitle),
            Some("Focus")
        );
    }

    #[test]
    fn test_nodes_wait_for_model() {
        let mut p = palace();
        p.enter_exploration();
        p.simulate(4.5, 60.0, &mut NullRenderer::default());
        assert!(p.scene().nodes().is_empty());
        p.on_model_loaded(mesh());
        assert_eq!(p.scene().nodes().len(), 5);
    }

    #[test]
    fn test_model_failure_keeps_nodes_off() {
        let mut p = palace();
        p.on_model_failed("404");
        p.enter_exploration();
        p.simulate(4.5, 60.0, &mut NullRenderer::default());
        assert!(p.scene().nodes().is_empty());
        assert!(p.interaction_enabled());
        assert_eq!(p.on_pointer_click(640.0, 360.0), None);
    }

    #[test]
    fn test_input_ignored_before_exploration() {
        let mut p = palace();
        let before = p.camera().position;
        p.on_key("w", true);
        p.on_pointer_drag(50.0, 0.0);
        p.frame(0.5, &mut NullRenderer::default());
        assert_eq!(p.camera().position, before);
    }

    #[test]
    fn test_console_applies_and_skips() {
        let mut p = explored();
        let applied = p.run_console(
            "scene.background('#102030')\ncamera.speed(20)\nbrain.offset(1, 0, 0)\nbrain.offset(1, oops, 0)",
        );
        assert_eq!(applied, 3);
        assert_eq!(p.scene().backdrop.background.to_string(), "#102030");
        assert_eq!(p.config().movement.speed, 20.0);
        assert_eq!(p.scene().model.transform.translation, Vec3::X);
    }

    #[test]
    fn test_bounds_command_clamps_camera() {
        let mut p = explored();
        p.apply_command(&Command::BoundsExtent(10.0));
        assert!(p.camera().position.abs().max_element() <= 10.0);
    }

    #[test]
    fn test_renderer_sees_every_frame() {
        let mut p = palace();
        let mut renderer = NullRenderer::default();
        p.simulate(1.0, 30.0, &mut renderer);
        assert_eq!(renderer.frames, 30);
        assert_eq!(renderer.last_points, 120);
        assert!(p.hud().is_some());
    }

    #[test]
    fn test_audio_toggle_marks_control() {
        let mut p = palace();
        let mut audio = SilentAudio::default();
        assert!(p.toggle_audio(&mut audio));
        let state = p.overlay().surface().state(ElementKey::AudioToggle).unwrap();
        assert!(state.classes.contains("on"));
    }

    #[test]
    fn test_teardown_clears_transient_state() {
        let mut p = explored();
        let mut audio = SilentAudio::default();
        p.toggle_audio(&mut audio);
        p.show_banner("hello");
        let (px, py) = {
            let c = p.scene().nodes()[0].center();
            let pix = p.camera().project_to_pixel(c).unwrap();
            (pix.x, pix.y)
        };
        p.on_pointer_click(px, py);
        p.teardown(&mut audio);
        assert!(!p.dashboard().is_open());
        assert_eq!(p.state(), SceneState::Exploring);
        assert!(p.banner().is_none());
        assert!(!p.audio_on());
        assert!(!audio.playing);
    }

    #[test]
    fn test_teardown_mid_flight_allows_reentry() {
        let mut p = palace();
        p.on_model_loaded(mesh());
        assert!(p.enter_exploration());
        p.simulate(1.0, 60.0, &mut NullRenderer::default());
        p.teardown(&mut SilentAudio::default());
        assert!(!p.interaction_enabled());

        assert!(p.enter_exploration());
        p.simulate(4.5, 60.0, &mut NullRenderer::default());
        assert!(p.interaction_enabled());
        assert_eq!(p.scene().nodes().len(), 5);
    }

    #[test]
    fn test_preview_follows_pointer_over_same_node() {
        let mut p = explored();
        let centre = p.scene().nodes()[0].center();
        let pix = p.camera().project_to_pixel(centre).unwrap();

        p.on_pointer_move(pix.x, pix.y);
        let hovered = p.hovered();
        assert!(hovered.is_some());
        p.on_pointer_move(pix.x + 1.0, pix.y + 1.0);
        assert_eq!(p.hovered(), hovered);

        let preview = p.overlay().surface().state(ElementKey::HoverPreview).unwrap();
        assert_eq!(
            preview.position,
            Some((pix.x + 1.0 + PREVIEW_OFFSET[0], pix.y + 1.0 + PREVIEW_OFFSET[1]))
        );
    }
}
