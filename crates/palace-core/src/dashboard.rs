//! Node dashboard: content population, typewriter summary, staged reveal.
//!
//! The reveal runs on one progress value in [0, 1]. Opening drives it up and
//! closing drives it down, so a reversal mid-animation continues from where
//! the panel is instead of restarting. The dashboard reads the registry and
//! never writes to it; keyword selection only changes what is displayed.

use glam::Vec2;

use crate::config::DashboardConfig;
use crate::registry::{MemoryNode, NodeId};
use crate::surface::{ElementKey, ElementUpdate, ListItem, Overlay, OverlaySurface};
use crate::tween::Ease;

/// Pixels the panel travels while sliding in.
const PANEL_SLIDE: f32 = 48.0;

/// Character-by-character reveal at a fixed interval.
#[derive(Clone, Debug)]
pub struct Typewriter {
    chars: Vec<char>,
    shown: usize,
    interval: f32,
    carry: f32,
}

impl Typewriter {
    pub fn new(interval: f32) -> Self {
        Self {
            chars: Vec::new(),
            shown: 0,
            interval: interval.max(f32::EPSILON),
            carry: 0.0,
        }
    }

    /// Restart from empty with new text, dropping any reveal in progress.
    pub fn start(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.shown = 0;
        self.carry = 0.0;
    }

    pub fn cancel(&mut self) {
        self.chars.clear();
        self.shown = 0;
        self.carry = 0.0;
    }

    /// Returns true when more text became visible.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_done() {
            return false;
        }
        self.carry += dt.max(0.0);
        let before = self.shown;
        while self.carry >= self.interval && self.shown < self.chars.len() {
            self.carry -= self.interval;
            self.shown += 1;
        }
        self.shown != before
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.chars.len()
    }

    pub fn visible(&self) -> String {
        self.chars[..self.shown].iter().collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    Hidden,
    Opening,
    Open,
    Closing,
}

/// Opacity and offset of each reveal layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealLayers {
    pub backdrop_opacity: f32,
    pub panel_opacity: f32,
    pub panel_offset: f32,
    pub content_opacity: f32,
}

/// Eased 0..1 over the `[start, end]` slice of the overall progress.
fn stage(progress: f32, start: f32, end: f32) -> f32 {
    Ease::CubicOut.apply((progress - start) / (end - start))
}

#[derive(Clone, Debug)]
pub struct Reveal {
    progress: f32,
    direction: f32,
    duration: f32,
}

impl Reveal {
    pub fn new(duration: f32) -> Self {
        Self {
            progress: 0.0,
            direction: 0.0,
            duration: duration.max(f32::EPSILON),
        }
    }

    pub fn open(&mut self) {
        self.direction = 1.0;
    }

    pub fn close(&mut self) {
        self.direction = -1.0;
    }

    /// Jump to fully hidden with no motion.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.direction = 0.0;
    }

    /// Returns true while the progress moved.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.direction == 0.0 {
            return false;
        }
        let before = self.progress;
        self.progress = (self.progress + self.direction * dt / self.duration).clamp(0.0, 1.0);
        if self.progress == 0.0 || self.progress == 1.0 {
            self.direction = 0.0;
        }
        self.progress != before
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn phase(&self) -> RevealPhase {
        if self.direction > 0.0 {
            RevealPhase::Opening
        } else if self.direction < 0.0 {
            RevealPhase::Closing
        } else if self.progress >= 1.0 {
            RevealPhase::Open
        } else {
            RevealPhase::Hidden
        }
    }

    pub fn layers(&self) -> RevealLayers {
        let p = self.progress;
        let panel = stage(p, 0.2, 0.8);
        RevealLayers {
            backdrop_opacity: stage(p, 0.0, 0.4),
            panel_opacity: panel,
            panel_offset: (1.0 - panel) * PANEL_SLIDE,
            content_opacity: stage(p, 0.6, 1.0),
        }
    }
}

/// What the panel currently displays.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub node: NodeId,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub body_html: String,
    pub photo: Option<String>,
    pub keywords: Vec<String>,
    pub active_keyword: Option<usize>,
}

/// Evenly spaced offsets on a circle, starting at the top and going clockwise on screen.
pub fn radial_layout(count: usize, radius: f32) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / count as f32 - std::f32::consts::FRAC_PI_2;
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

const CONTENT: [ElementKey; 6] = [
    ElementKey::DashboardTitle,
    ElementKey::DashboardSummary,
    ElementKey::DashboardTags,
    ElementKey::DashboardBody,
    ElementKey::DashboardPhoto,
    ElementKey::DashboardKeywords,
];

#[derive(Clone, Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    view: Option<DashboardView>,
    open: bool,
    typewriter: Typewriter,
    reveal: Reveal,
    content_dirty: bool,
    summary_dirty: bool,
    reveal_dirty: bool,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            typewriter: Typewriter::new(config.type_interval),
            reveal: Reveal::new(config.reveal_duration),
            config,
            view: None,
            open: false,
            content_dirty: false,
            summary_dirty: false,
            reveal_dirty: false,
        }
    }

    /// False from the moment close is requested, even while the panel animates out.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn typed_summary(&self) -> String {
        self.typewriter.visible()
    }

    pub fn reveal(&self) -> &Reveal {
        &self.reveal
    }

    pub fn open(&mut self, id: NodeId, node: &MemoryNode) {
        self.view = Some(DashboardView {
            node: id,
            title: node.title.clone(),
            summary: node.summary.clone(),
            tags: node.tags.clone(),
            body_html: node.body_html.clone(),
            photo: node.photo.clone(),
            keywords: node.keywords.iter().map(|k| k.label.clone()).collect(),
            active_keyword: None,
        });
        self.open = true;
        self.typewriter.start(&node.summary);
        self.reveal.open();
        self.content_dirty = true;
        self.summary_dirty = true;
        self.reveal_dirty = true;
        tracing::debug!(node = id.0, "dashboard open");
    }

    /// Swap in keyword `index`'s overrides. The node's own fields fill any gap.
    pub fn select_keyword(&mut self, node: &MemoryNode, index: usize) -> bool {
        if !self.open {
            return false;
        }
        let (Some(view), Some(keyword)) = (self.view.as_mut(), node.keywords.get(index)) else {
            return false;
        };
        view.summary = keyword.summary.clone().unwrap_or_else(|| node.summary.clone());
        view.body_html = keyword.body.clone().unwrap_or_else(|| node.body_html.clone());
        view.photo = keyword.image.clone().or_else(|| node.photo.clone());
        view.active_keyword = Some(index);
        self.typewriter.start(&view.summary);
        self.content_dirty = true;
        self.summary_dirty = true;
        true
    }

    pub fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.typewriter.cancel();
        self.reveal.close();
        self.reveal_dirty = true;
        tracing::debug!("dashboard close");
        true
    }

    /// Drop everything immediately, with no exit animation.
    pub fn reset(&mut self) {
        self.open = false;
        self.view = None;
        self.typewriter.cancel();
        self.reveal.reset();
        self.reveal_dirty = true;
    }

    /// Advance the typewriter and the reveal.
    pub fn tick(&mut self, dt: f32) {
        if self.typewriter.tick(dt) {
            self.summary_dirty = true;
        }
        if self.reveal.tick(dt) {
            self.reveal_dirty = true;
        }
    }

    /// Write whatever changed since the last flush.
    pub fn flush<S: OverlaySurface>(&mut self, overlay: &mut Overlay<S>) {
        if self.content_dirty {
            self.content_dirty = false;
            if let Some(view) = &self.view {
                overlay.text(ElementKey::DashboardTitle, view.title.clone());
                overlay.update(
                    ElementKey::DashboardTags,
                    ElementUpdate::Items(
                        view.tags
                            .iter()
                            .map(|tag| ListItem {
                                label: tag.clone(),
                                active: false,
                                offset: [0.0, 0.0],
                            })
                            .collect(),
                    ),
                );
                overlay.update(ElementKey::DashboardBody, ElementUpdate::Html(view.body_html.clone()));
                overlay.update(ElementKey::DashboardPhoto, ElementUpdate::Image(view.photo.clone()));
                let offsets = radial_layout(view.keywords.len(), self.config.keyword_radius);
                let items = view
                    .keywords
                    .iter()
                    .zip(offsets)
                    .enumerate()
                    .map(|(i, (label, at))| ListItem {
                        label: label.clone(),
                        active: view.active_keyword == Some(i),
                        offset: at.to_array(),
                    })
                    .collect();
                overlay.update(ElementKey::DashboardKeywords, ElementUpdate::Items(items));
            }
        }
        if self.summary_dirty {
            self.summary_dirty = false;
            overlay.text(ElementKey::DashboardSummary, self.typewriter.visible());
        }
        if self.reveal_dirty {
            self.reveal_dirty = false;
            let layers = self.reveal.layers();
            let shown = self.reveal.phase() != RevealPhase::Hidden;
            overlay.update(ElementKey::Dashboard, ElementUpdate::Visible(shown));
            overlay.update(ElementKey::Dashboard, ElementUpdate::Opacity(layers.backdrop_opacity));
            overlay.update(
                ElementKey::DashboardPanel,
                ElementUpdate::Position {
                    x: 0.0,
                    y: layers.panel_offset,
                },
            );
            overlay.update(ElementKey::DashboardPanel, ElementUpdate::Opacity(layers.panel_opacity));
            for key in CONTENT {
                overlay.update(key, ElementUpdate::Opacity(layers.content_opacity));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Keyword, Registry};
    use crate::surface::RecordingSurface;

    fn node() -> MemoryNode {
        let mut node = MemoryNode::new("a", [0.0; 3], "Alpha", "base summary");
        node.body_html = "<p>base</p>".into();
        node.photo = Some("base.png".into());
        node.tags = vec!["t1".into(), "t2".into()];
        let mut k = Keyword::new("Swap");
        k.summary = Some("keyword summary".into());
        k.image = Some("k.png".into());
        node.keywords = vec![k, Keyword::new("Plain")];
        node
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(DashboardConfig::default())
    }

    #[test]
    fn test_typewriter_reveals_at_interval() {
        let mut tw = Typewriter::new(0.1);
        tw.start("abc");
        assert_eq!(tw.visible(), "");
        assert!(!tw.tick(0.05));
        assert!(tw.tick(0.06));
        assert_eq!(tw.visible(), "a");
        tw.tick(1.0);
        assert_eq!(tw.visible(), "abc");
        assert!(tw.is_done());
    }

    #[test]
    fn test_typewriter_restart_starts_empty() {
        let mut tw = Typewriter::new(0.1);
        tw.start("first");
        tw.tick(0.35);
        tw.start("second");
        assert_eq!(tw.visible(), "");
        tw.tick(0.1);
        assert_eq!(tw.visible(), "s");
    }

    #[test]
    fn test_typewriter_multibyte() {
        let mut tw = Typewriter::new(0.1);
        tw.start("héllo");
        tw.tick(0.25);
        assert_eq!(tw.visible(), "hé");
    }

    #[test]
    fn test_reveal_reverses_from_current_progress() {
        let mut r = Reveal::new(1.0);
        r.open();
        r.tick(0.6);
        assert_eq!(r.phase(), RevealPhase::Opening);
        r.close();
        r.tick(0.2);
        assert!((r.progress() - 0.4).abs() < 1e-6);
        r.open();
        r.tick(0.1);
        assert!((r.progress() - 0.5).abs() < 1e-6);
        r.tick(5.0);
        assert_eq!(r.phase(), RevealPhase::Open);
    }

    #[test]
    fn test_layers_are_staged() {
        let mut r = Reveal::new(1.0);
        r.open();
        r.tick(0.3);
        let l = r.layers();
        assert!(l.backdrop_opacity > 0.0);
        assert_eq!(l.content_opacity, 0.0);
        r.tick(1.0);
        let l = r.layers();
        assert_eq!(l.content_opacity, 1.0);
        assert_eq!(l.panel_offset, 0.0);
    }

    #[test]
    fn test_keyword_swap_leaves_registry_untouched() {
        let mut registry = Registry::builtin();
        registry.nodes[0] = node();
        let before = registry.nodes[0].clone();
        let mut d = dashboard();

        d.open(NodeId(0), &registry.nodes[0]);
        assert!(d.select_keyword(&registry.nodes[0], 0));
        let view = d.view().unwrap();
        assert_eq!(view.summary, "keyword summary");
        assert_eq!(view.photo.as_deref(), Some("k.png"));
        assert_eq!(view.body_html, "<p>base</p>");
        assert_eq!(view.active_keyword, Some(0));
        assert_eq!(view.title, "Alpha");

        d.close();
        d.open(NodeId(0), &registry.nodes[0]);
        assert_eq!(d.view().unwrap().summary, "base summary");
        assert_eq!(d.view().unwrap().active_keyword, None);
        assert_eq!(registry.nodes[0], before);
    }

    #[test]
    fn test_keyword_swap_restarts_typewriter() {
        let n = node();
        let mut d = dashboard();
        d.open(NodeId(0), &n);
        d.tick(1.0);
        assert!(!d.typed_summary().is_empty());
        d.select_keyword(&n, 1);
        assert_eq!(d.typed_summary(), "");
    }

    #[test]
    fn test_select_requires_open_and_valid_index() {
        let n = node();
        let mut d = dashboard();
        assert!(!d.select_keyword(&n, 0));
        d.open(NodeId(0), &n);
        assert!(!d.select_keyword(&n, 9));
        d.close();
        assert!(!d.is_open());
        assert!(!d.select_keyword(&n, 0));
    }

    #[test]
    fn test_flush_marks_single_active_keyword() {
        let n = node();
        let mut d = dashboard();
        let mut overlay = Overlay::new(RecordingSurface::permissive());
        d.open(NodeId(0), &n);
        d.select_keyword(&n, 1);
        d.flush(&mut overlay);
        let items = &overlay.surface().state(ElementKey::DashboardKeywords).unwrap().items;
        assert_eq!(items.len(), 2);
        assert_eq!(items.iter().filter(|i| i.active).count(), 1);
        assert!(items[1].active);
        assert_eq!(overlay.surface().text(ElementKey::DashboardTitle), Some("Alpha"));
    }

    #[test]
    fn test_close_hides_after_reveal_runs_out() {
        let n = node();
        let mut d = dashboard();
        let mut overlay = Overlay::new(RecordingSurface::permissive());
        d.open(NodeId(0), &n);
        d.tick(2.0);
        d.close();
        d.tick(2.0);
        d.flush(&mut overlay);
        let state = overlay.surface().state(ElementKey::Dashboard).unwrap();
        assert!(!state.visible);
    }

    #[test]
    fn test_radial_layout_starts_at_top() {
        let offsets = radial_layout(4, 10.0);
        assert!((offsets[0] - Vec2::new(0.0, -10.0)).length() < 1e-5);
        assert!((offsets[1] - Vec2::new(10.0, 0.0)).length() < 1e-5);
    }
}
