//! Palace directory discovery.
//!
//! The directory is `--dir` if given, then `$PALACE_DIR`, then the current
//! directory. Every file in it is optional.

use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "palace.toml";
pub const REGISTRY_FILES: [&str; 2] = ["registry.toml", "registry.json"];
pub const MODEL_FILES: [&str; 2] = ["model.glb", "model.gltf"];
pub const DIR_ENV: &str = "PALACE_DIR";

// ---------------------------------------------------------------------------
// Pure resolution (no I/O)
// ---------------------------------------------------------------------------

/// Pick the palace root from the explicit flag, the environment, or the cwd.
pub fn resolve_root(explicit: Option<&Path>, env_dir: Option<&str>, cwd: &Path) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    match env_dir.map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => cwd.to_path_buf(),
    }
}

/// First candidate name for which `exists` holds.
fn first_existing(root: &Path, names: &[&str], exists: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    names.iter().map(|name| root.join(name)).find(|p| exists(p))
}

// ---------------------------------------------------------------------------
// Filesystem discovery
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PalacePaths {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    pub model: Option<PathBuf>,
}

impl PalacePaths {
    /// Resolve the root and look for the known files in it.
    pub fn discover(explicit: Option<&Path>) -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let env_dir = env::var(DIR_ENV).ok();
        Self::in_dir(resolve_root(explicit, env_dir.as_deref(), &cwd))
    }

    pub fn in_dir(root: PathBuf) -> Self {
        let is_file = |p: &Path| p.is_file();
        let paths = Self {
            config: first_existing(&root, &[CONFIG_FILE], is_file),
            registry: first_existing(&root, &REGISTRY_FILES, is_file),
            model: first_existing(&root, &MODEL_FILES, is_file),
            root,
        };
        tracing::debug!(
            root = %paths.root.display(),
            config = paths.config.is_some(),
            registry = paths.registry.is_some(),
            model = paths.model.is_some(),
            "palace directory"
        );
        paths
    }
}
