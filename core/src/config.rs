//! Transform configuration (randxform.toml)
//!
//! Holds the sampling ranges, the mode flags and the pivot anchor. The
//! configuration is loaded and validated once, then passed by reference to
//! every component; nothing mutates it during a run.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Closed interval `[min, max]` sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always samples `value`
    pub const fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        // The sampler also needs a finite width
        let width = self.max - self.min;
        if !self.min.is_finite()
            || !self.max.is_finite()
            || self.min > self.max
            || !width.is_finite()
        {
            return Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Scale sampling ranges: one per axis plus the uniform range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleRanges {
    pub x: Range,
    pub y: Range,
    pub z: Range,
    /// Used instead of the per-axis ranges when `uniform_scale` is set
    pub uniform: Range,
}

impl Default for ScaleRanges {
    fn default() -> Self {
        Self {
            x: default_scale_range(),
            y: default_scale_range(),
            z: default_scale_range(),
            uniform: default_scale_range(),
        }
    }
}

/// Rotation sampling ranges in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationRanges {
    pub x: Range,
    pub y: Range,
    pub z: Range,
}

impl Default for RotationRanges {
    fn default() -> Self {
        Self {
            x: Range::fixed(0.0),
            y: Range::new(0.0, 360.0),
            z: Range::fixed(0.0),
        }
    }
}

/// Named bounding-box anchor used as the pivot for island transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PivotAnchor {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

impl PivotAnchor {
    pub const ALL: [PivotAnchor; 7] = [
        PivotAnchor::Center,
        PivotAnchor::Top,
        PivotAnchor::Bottom,
        PivotAnchor::Left,
        PivotAnchor::Right,
        PivotAnchor::Front,
        PivotAnchor::Back,
    ];

    /// Configuration name of the anchor ("Center", "Top", ...)
    pub fn name(self) -> &'static str {
        match self {
            PivotAnchor::Center => "Center",
            PivotAnchor::Top => "Top",
            PivotAnchor::Bottom => "Bottom",
            PivotAnchor::Left => "Left",
            PivotAnchor::Right => "Right",
            PivotAnchor::Front => "Front",
            PivotAnchor::Back => "Back",
        }
    }

    /// Exact, case-sensitive lookup by configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|anchor| anchor.name() == name)
    }
}

impl fmt::Display for PivotAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete transform configuration.
///
/// Serialized to/from TOML. Every key is optional; missing keys take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    /// Seed for reproducible runs (default: random per run)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Write the scale channels (default: true)
    #[serde(default = "default_true")]
    pub apply_scale: bool,
    /// Write the rotation channels (default: true)
    #[serde(default = "default_true")]
    pub apply_rotation: bool,
    /// Sample one value for all three scale axes (default: false)
    #[serde(default)]
    pub uniform_scale: bool,
    /// Transform each polygon island instead of whole items (default: false)
    #[serde(default)]
    pub polygon_islands: bool,
    /// Anchor name for island pivots (default: "Center").
    ///
    /// Kept as a string so an unrecognized name survives loading and is
    /// reported by the run guard in island mode only.
    #[serde(default = "default_pivot_position")]
    pub pivot_position: String,
    #[serde(default)]
    pub scale: ScaleRanges,
    #[serde(default)]
    pub rotation: RotationRanges,
}

fn default_true() -> bool {
    true
}
fn default_pivot_position() -> String {
    PivotAnchor::Center.name().to_string()
}
fn default_scale_range() -> Range {
    Range::new(0.8, 1.2)
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            seed: None,
            apply_scale: default_true(),
            apply_rotation: default_true(),
            uniform_scale: false,
            polygon_islands: false,
            pivot_position: default_pivot_position(),
            scale: ScaleRanges::default(),
            rotation: RotationRanges::default(),
        }
    }
}

impl TransformConfig {
    /// Parse a configuration from TOML text without validating it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every range: bounds and width must be finite and `min <= max`.
    ///
    /// All seven ranges are checked regardless of the mode flags.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("scale.x", self.scale.x),
            ("scale.y", self.scale.y),
            ("scale.z", self.scale.z),
            ("scale.uniform", self.scale.uniform),
            ("rotation.x", self.rotation.x),
            ("rotation.y", self.rotation.y),
            ("rotation.z", self.rotation.z),
        ];
        for (name, range) in ranges {
            range.validate(name)?;
        }
        Ok(())
    }
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or
/// contains an invalid range.
pub fn load(path: &Path) -> Result<TransformConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = TransformConfig::from_toml_str(&content)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded transform config");
    Ok(config)
}

/// Writes a configuration file, creating parent directories as needed.
pub fn save(config: &TransformConfig, path: &Path) -> Result<(), ConfigError> {
    let content = config.to_toml_string()?;
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)
}
