//! Error types for configuration, host calls and runs

use std::path::PathBuf;

use crate::host::ItemId;

/// Configuration loading and validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A range has `min > max`, a non-finite bound, or a width that overflows
    #[error("invalid range {name}: {min}..{max} needs finite bounds, min <= max and a finite width")]
    InvalidRange { name: &'static str, min: f64, max: f64 },
}

/// Scene fixture loading and saving error
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to access scene {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize scene: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A baked record refers past the end of its item's polygon list
    #[error("item {item:?} has no polygon {polygon}")]
    UnknownPolygon { item: String, polygon: usize },
}

/// Failure reported by a [`SceneHost`](crate::host::SceneHost) operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("host operation `{op}` failed: {message}")]
pub struct HostError {
    /// Name of the host operation that failed (e.g. "move_polygons")
    pub op: &'static str,
    /// Host-supplied description
    pub message: String,
}

impl HostError {
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }

    /// The operation referenced an item the host doesn't know about
    pub fn unknown_item(op: &'static str, item: ItemId) -> Self {
        Self::new(op, format!("unknown item {item}"))
    }
}

/// Error aborting a transform run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// No mesh items were selected
    #[error("no mesh items selected")]
    EmptySelection,

    /// Pivot position is not one of the recognized anchors
    #[error("invalid pivot position {0:?}")]
    InvalidPivot(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Host(#[from] HostError),

    /// Polygons were lost or duplicated during island reassembly
    #[error("item {item} has {actual} polygons after reassembly, expected {expected}")]
    PolygonCountMismatch {
        item: ItemId,
        expected: usize,
        actual: usize,
    },
}

impl RunError {
    /// Message shown to the user for guard failures, if this error is one
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            RunError::EmptySelection => Some("No mesh items selected"),
            RunError::InvalidPivot(_) => Some("Invalid pivot position"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_errors_have_user_messages() {
        assert_eq!(
            RunError::EmptySelection.user_message(),
            Some("No mesh items selected")
        );
        assert_eq!(
            RunError::InvalidPivot("Middle".into()).user_message(),
            Some("Invalid pivot position")
        );
        let host = RunError::from(HostError::new("set_scale", "boom"));
        assert_eq!(host.user_message(), None);
    }

    #[test]
    fn test_host_error_display() {
        let err = HostError::unknown_item("polygons", ItemId(7));
        assert_eq!(err.to_string(), "host operation `polygons` failed: unknown item #7");
    }
}
