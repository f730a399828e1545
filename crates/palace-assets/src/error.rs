use std::fmt;
use std::path::PathBuf;

use palace_core::PalaceError;

#[derive(Debug)]
pub enum AssetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    Json(serde_json::Error),
    Gltf(gltf::Error),
    InvalidData(String),
    Core(PalaceError),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            AssetError::Toml { path, source } => {
                write!(f, "TOML error in {}: {source}", path.display())
            }
            AssetError::Json(e) => write!(f, "JSON error: {e}"),
            AssetError::Gltf(e) => write!(f, "glTF error: {e}"),
            AssetError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            AssetError::Core(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            AssetError::Toml { source, .. } => Some(source),
            AssetError::Json(e) => Some(e),
            AssetError::Gltf(e) => Some(e),
            AssetError::Core(e) => Some(e),
            AssetError::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(e: serde_json::Error) -> Self {
        AssetError::Json(e)
    }
}

impl From<gltf::Error> for AssetError {
    fn from(e: gltf::Error) -> Self {
        AssetError::Gltf(e)
    }
}

impl From<PalaceError> for AssetError {
    fn from(e: PalaceError) -> Self {
        AssetError::Core(e)
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;
