use std::fmt;

#[derive(Debug)]
pub enum PalaceError {
    InvalidRegistry(String),
    InvalidConfig(String),
    Json(serde_json::Error),
}

impl fmt::Display for PalaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PalaceError::InvalidRegistry(msg) => write!(f, "invalid registry: {msg}"),
            PalaceError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            PalaceError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for PalaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PalaceError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PalaceError {
    fn from(e: serde_json::Error) -> Self {
        PalaceError::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, PalaceError>;
