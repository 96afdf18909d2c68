//! randxform core - random scale and rotation over a host scene
//!
//! Applies random scale/rotation samples, drawn from configured ranges, to
//! selected mesh items or to each connected polygon island inside them. The
//! scene itself belongs to a host application reached through [`SceneHost`].
//!
//! # Architecture
//!
//! - [`TransformConfig`] - Immutable ranges, flags and pivot anchor
//! - [`RangeSampler`] - Uniform sampling over configured ranges
//! - [`apply_transform`] - Writes one fresh sample to a host item
//! - [`transform_islands`] - Isolates, transforms and reassembles islands
//! - [`run`] - Guards plus per-item dispatch
//! - [`MemoryScene`] - In-memory host for tests and the CLI
//!
//! # Example
//!
//! ```
//! use randxform_core::{MemoryScene, TransformConfig, run};
//!
//! let mut scene = MemoryScene::new();
//! scene.add_selected_mesh("rocks", vec![vec![0, 1, 2], vec![3, 4, 5]]);
//!
//! let mut config = TransformConfig::default();
//! config.polygon_islands = true;
//! config.seed = Some(42);
//!
//! let report = run(&mut scene, &config)?;
//! assert_eq!(report.units(), 2);
//! # Ok::<(), randxform_core::RunError>(())
//! ```

pub mod applier;
pub mod config;
pub mod error;
pub mod guard;
pub mod host;
#[cfg(test)]
mod integration;
pub mod islands;
pub mod memory;
pub mod runner;
pub mod sampler;

pub use applier::{apply_sample, apply_transform};
pub use config::{PivotAnchor, Range, RotationRanges, ScaleRanges, TransformConfig};
pub use error::{ConfigError, HostError, RunError, SceneError};
pub use guard::{validate_config, validate_pivot, validate_selection};
pub use host::{Channels, ItemId, PolygonId, SceneHost, Severity};
pub use islands::{
    ISLAND_CONTAINER_NAME, IslandOutcome, IslandPhase, IslandReport, RESULT_CONTAINER_NAME,
    partition_islands, transform_islands,
};
pub use memory::{
    BakedDescription, BakedTransform, HostOp, ItemDescription, MemoryScene, Notification,
    SceneDescription,
};
pub use runner::{ItemOutcome, RunMode, RunReport, run};
pub use sampler::{RangeSampler, SampledTransform};
