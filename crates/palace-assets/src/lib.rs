//! File-facing side of the memory palace: where the palace directory is, and
//! how its config, registry and model become `palace-core` values.

pub mod error;
pub mod loader;
pub mod model;
pub mod paths;

pub use error::{AssetError, Result};
pub use loader::{Assets, ModelLoad, config_from_toml, load_config, load_registry};
pub use model::{load_model, model_from_slice};
pub use paths::{DIR_ENV, PalacePaths, resolve_root};
