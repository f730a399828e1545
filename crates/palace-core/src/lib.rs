//! Memory palace scene engine.
//!
//! Procedural particle clouds, a scroll/explore choreography state machine,
//! ray picking against memory nodes, overlay projection and the node
//! dashboard, all behind one frame-driven application context.
//!
//! Zero I/O. Assets, config files and the document surface come from outside.

pub mod app;
pub mod audio;
pub mod camera;
pub mod choreographer;
pub mod clock;
pub mod color;
pub mod command;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod hud;
pub mod input;
pub mod interaction;
pub mod overlay;
pub mod particles;
pub mod phase;
pub mod registry;
pub mod scene;
pub mod sections;
pub mod snapshot;
pub mod surface;
pub mod timers;
pub mod tween;

pub use app::{NullRenderer, Palace, RenderFrame, Renderer};
pub use audio::{AudioBackend, AudioError, AudioToggle, SilentAudio};
pub use camera::{Camera, Ray, Viewport};
pub use choreographer::{Choreographer, ExplorePhase, SceneState, Writer};
pub use color::Color;
pub use command::{Command, CommandError, parse_line, parse_script};
pub use config::PalaceConfig;
pub use constants::{EPSILON, GOLDEN_ANGLE, SNAPSHOT_VERSION};
pub use error::{PalaceError, Result};
pub use interaction::{Hit, Proximity, pick};
pub use particles::{Distribution, FilamentSet, ParticleBuffer};
pub use registry::{Keyword, MemoryNode, NodeId, Registry, Section, Shape};
pub use scene::{AssetState, ModelMesh, NodeSubtree, SceneGraph, Transform};
pub use sections::SectionLayout;
pub use snapshot::WireSnapshot;
pub use surface::{ElementKey, ElementUpdate, OverlaySurface, RecordingSurface};
pub use tween::Ease;
