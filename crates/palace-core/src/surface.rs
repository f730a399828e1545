//! The overlay surface: HUD readouts, labels and the dashboard panel.
//!
//! Elements are looked up once into a [`HandleTable`]. A missing element is a
//! disabled feature, and every update aimed at it is silently dropped.

use std::collections::{BTreeSet, HashMap};

use crate::registry::{NodeId, Registry};

/// Every element the engine knows how to drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKey {
    HudCamera,
    HudDepth,
    HudNearest,
    HudProximity,
    HudLobe,
    Clock,
    Banner,
    AudioToggle,
    SectionTitle,
    SectionDescription,
    HoverPreview,
    HoverPreviewImage,
    Dashboard,
    DashboardPanel,
    DashboardTitle,
    DashboardSummary,
    DashboardTags,
    DashboardBody,
    DashboardPhoto,
    DashboardKeywords,
    NodeLabel(NodeId),
    KeywordLabel(NodeId, usize),
}

impl ElementKey {
    /// Keys resolved at startup. Per-node labels are resolved when nodes are built.
    pub const STATIC: [ElementKey; 20] = [
        ElementKey::HudCamera,
        ElementKey::HudDepth,
        ElementKey::HudNearest,
        ElementKey::HudProximity,
        ElementKey::HudLobe,
        ElementKey::Clock,
        ElementKey::Banner,
        ElementKey::AudioToggle,
        ElementKey::SectionTitle,
        ElementKey::SectionDescription,
        ElementKey::HoverPreview,
        ElementKey::HoverPreviewImage,
        ElementKey::Dashboard,
        ElementKey::DashboardPanel,
        ElementKey::DashboardTitle,
        ElementKey::DashboardSummary,
        ElementKey::DashboardTags,
        ElementKey::DashboardBody,
        ElementKey::DashboardPhoto,
        ElementKey::DashboardKeywords,
    ];

    /// Label and keyword-ring keys for every node of a registry.
    pub fn node_keys(registry: &Registry) -> Vec<ElementKey> {
        let mut keys = Vec::new();
        for (id, node) in registry.node_ids().zip(&registry.nodes) {
            keys.push(ElementKey::NodeLabel(id));
            for k in 0..node.keywords.len() {
                keys.push(ElementKey::KeywordLabel(id, k));
            }
        }
        keys
    }
}

/// Opaque reference issued by a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u32);

/// One entry of a chip or keyword list.
#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub label: String,
    pub active: bool,
    /// Offset in pixels from the list's anchor.
    pub offset: [f32; 2],
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementUpdate {
    Text(String),
    Html(String),
    Image(Option<String>),
    Position { x: f32, y: f32 },
    Opacity(f32),
    Visible(bool),
    Items(Vec<ListItem>),
    Class { name: &'static str, on: bool },
}

/// A document that can show overlay elements.
pub trait OverlaySurface {
    fn lookup(&mut self, key: ElementKey) -> Option<ElementHandle>;
    fn apply(&mut self, handle: ElementHandle, update: ElementUpdate);
}

/// Keys resolved once against a surface.
#[derive(Clone, Debug, Default)]
pub struct HandleTable {
    handles: HashMap<ElementKey, ElementHandle>,
}

impl HandleTable {
    pub fn resolve(&mut self, surface: &mut impl OverlaySurface, keys: &[ElementKey]) -> usize {
        let mut found = 0;
        for &key in keys {
            if let Some(handle) = surface.lookup(key) {
                self.handles.insert(key, handle);
                found += 1;
            } else {
                tracing::debug!(?key, "overlay element absent, feature disabled");
            }
        }
        found
    }

    pub fn get(&self, key: ElementKey) -> Option<ElementHandle> {
        self.handles.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

/// A surface plus its resolved handles.
pub struct Overlay<S: OverlaySurface> {
    surface: S,
    table: HandleTable,
}

impl<S: OverlaySurface> Overlay<S> {
    pub fn new(mut surface: S) -> Self {
        let mut table = HandleTable::default();
        table.resolve(&mut surface, &ElementKey::STATIC);
        Self { surface, table }
    }

    pub fn resolve(&mut self, keys: &[ElementKey]) -> usize {
        self.table.resolve(&mut self.surface, keys)
    }

    pub fn has(&self, key: ElementKey) -> bool {
        self.table.get(key).is_some()
    }

    /// No-op when the element is absent.
    pub fn update(&mut self, key: ElementKey, update: ElementUpdate) {
        if let Some(handle) = self.table.get(key) {
            self.surface.apply(handle, update);
        }
    }

    pub fn text(&mut self, key: ElementKey, text: impl Into<String>) {
        self.update(key, ElementUpdate::Text(text.into()));
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn release(&mut self) {
        self.table.clear();
    }
}

/// Last state written to one element of a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub struct ElementState {
    pub text: String,
    pub html: String,
    pub image: Option<String>,
    pub position: Option<(f32, f32)>,
    pub opacity: f32,
    pub visible: bool,
    pub items: Vec<ListItem>,
    pub classes: BTreeSet<&'static str>,
    pub writes: usize,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            text: String::new(),
            html: String::new(),
            image: None,
            position: None,
            opacity: 1.0,
            visible: true,
            items: Vec::new(),
            classes: BTreeSet::new(),
            writes: 0,
        }
    }
}

/// In-memory document. Either holds a fixed element set or accepts any key.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    keys: Vec<ElementKey>,
    index: HashMap<ElementKey, ElementHandle>,
    states: Vec<ElementState>,
    permissive: bool,
}

impl RecordingSurface {
    /// A document that contains every element asked for.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// A document containing exactly `keys`.
    pub fn with_elements(keys: &[ElementKey]) -> Self {
        let mut surface = Self::default();
        for &key in keys {
            surface.insert(key);
        }
        surface
    }

    fn insert(&mut self, key: ElementKey) -> ElementHandle {
        if let Some(&handle) = self.index.get(&key) {
            return handle;
        }
        let handle = ElementHandle(self.keys.len() as u32);
        self.keys.push(key);
        self.states.push(ElementState::default());
        self.index.insert(key, handle);
        handle
    }

    pub fn state(&self, key: ElementKey) -> Option<&ElementState> {
        self.index.get(&key).map(|h| &self.states[h.0 as usize])
    }

    pub fn text(&self, key: ElementKey) -> Option<&str> {
        self.state(key).map(|s| s.text.as_str())
    }

    pub fn total_writes(&self) -> usize {
        self.states.iter().map(|s| s.writes).sum()
    }
}

impl OverlaySurface for RecordingSurface {
    fn lookup(&mut self, key: ElementKey) -> Option<ElementHandle> {
        if self.permissive {
            Some(self.insert(key))
        } else {
            self.index.get(&key).copied()
        }
    }

    fn apply(&mut self, handle: ElementHandle, update: ElementUpdate) {
        let Some(state) = self.states.get_mut(handle.0 as usize) else {
            return;
        };
        state.writes += 1;
        match update {
            ElementUpdate::Text(text) => state.text = text,
            ElementUpdate::Html(html) => state.html = html,
            ElementUpdate::Image(image) => state.image = image,
            ElementUpdate::Position { x, y } => state.position = Some((x, y)),
            ElementUpdate::Opacity(opacity) => state.opacity = opacity,
            ElementUpdate::Visible(visible) => state.visible = visible,
            ElementUpdate::Items(items) => state.items = items,
            ElementUpdate::Class { name, on } => {
                if on {
                    state.classes.insert(name);
                } else {
                    state.classes.remove(name);
                }
            }
        }
    }
}
