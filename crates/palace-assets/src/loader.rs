//! Config and registry loading.
//!
//! A missing file means built-in defaults. A present but invalid file is an
//! error: it was written by hand and silently ignoring it hides the typo.

use std::fs;
use std::path::Path;

use palace_core::{ModelMesh, PalaceConfig, Registry};

use crate::error::{AssetError, Result};
use crate::model::load_model;
use crate::paths::PalacePaths;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn config_from_toml(text: &str, path: &Path) -> Result<PalaceConfig> {
    let config: PalaceConfig = toml::from_str(text).map_err(|source| AssetError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<PalaceConfig> {
    config_from_toml(&read(path)?, path)
}

/// `.json` parses as JSON, anything else as TOML.
pub fn load_registry(path: &Path) -> Result<Registry> {
    let text = read(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let registry: Registry = if is_json {
        serde_json::from_str(&text)?
    } else {
        toml::from_str(&text).map_err(|source| AssetError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    };
    registry.validate()?;
    tracing::debug!(
        path = %path.display(),
        nodes = registry.nodes.len(),
        sections = registry.sections.len(),
        "registry loaded"
    );
    Ok(registry)
}

/// Outcome of the model load. Failure is not an error for the caller: the
/// palace runs without nodes.
#[derive(Debug)]
pub enum ModelLoad {
    Missing,
    Loaded(Vec<ModelMesh>),
    Failed(String),
}

#[derive(Debug)]
pub struct Assets {
    pub config: PalaceConfig,
    pub registry: Registry,
    pub model: ModelLoad,
}

impl Assets {
    pub fn load(paths: &PalacePaths) -> Result<Self> {
        let config = match &paths.config {
            Some(path) => load_config(path)?,
            None => PalaceConfig::default(),
        };
        let registry = match &paths.registry {
            Some(path) => load_registry(path)?,
            None => Registry::builtin(),
        };
        let model = match &paths.model {
            None => ModelLoad::Missing,
            Some(path) => match load_model(path) {
                Ok(meshes) => ModelLoad::Loaded(meshes),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "model failed to load");
                    ModelLoad::Failed(e.to_string())
                }
            },
        };
        Ok(Self {
            config,
            registry,
            model,
        })
    }
}
