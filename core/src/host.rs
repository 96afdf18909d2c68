//! Host scene capabilities
//!
//! The host application owns the scene: selection, polygon connectivity,
//! containers, pivots and transform channels. The transform logic only talks
//! to it through [`SceneHost`], so it can run against any host adapter or the
//! in-memory [`MemoryScene`](crate::memory::MemoryScene).

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::config::PivotAnchor;
use crate::error::HostError;

/// Opaque handle to a scene item (mesh or container)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque handle to a polygon.
///
/// Ids are stable while a polygon moves between items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolygonId(pub u64);

/// Transform channels of an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Channels {
    pub scale: DVec3,
    /// Rotation in degrees
    pub rotation: DVec3,
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            scale: DVec3::ONE,
            rotation: DVec3::ZERO,
        }
    }
}

/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Capability set the transform logic needs from the host application.
///
/// Every mutating call targets an explicit item; there is no implicit
/// "active item" or clipboard. Failures are returned as [`HostError`] and
/// propagate unchanged to the caller of [`run`](crate::runner::run).
pub trait SceneHost {
    /// Mesh-bearing items in the current selection, in selection order
    fn selected_meshes(&self) -> Result<Vec<ItemId>, HostError>;

    /// Current polygons of an item
    fn polygons(&self, item: ItemId) -> Result<Vec<PolygonId>, HostError>;

    /// Grow `seed` to its full connected island within `item`.
    ///
    /// The result includes `seed` itself.
    fn connect_island(&self, item: ItemId, seed: PolygonId) -> Result<Vec<PolygonId>, HostError>;

    /// Create an empty mesh container
    fn create_container(&mut self, name: &str) -> Result<ItemId, HostError>;

    /// Remove a container from the scene
    fn destroy_container(&mut self, item: ItemId) -> Result<(), HostError>;

    /// Move polygons from one item to another.
    ///
    /// Replaces the cut/paste pair: after a successful call each polygon is
    /// on `to` and no longer on `from`.
    fn move_polygons(
        &mut self,
        from: ItemId,
        to: ItemId,
        polygons: &[PolygonId],
    ) -> Result<(), HostError>;

    /// Place the item's pivot at the given bounding-box anchor
    fn recenter_pivot(&mut self, item: ItemId, anchor: PivotAnchor) -> Result<(), HostError>;

    fn set_scale(&mut self, item: ItemId, scale: DVec3) -> Result<(), HostError>;

    /// Set rotation channels (degrees)
    fn set_rotation(&mut self, item: ItemId, rotation: DVec3) -> Result<(), HostError>;

    fn channels(&self, item: ItemId) -> Result<Channels, HostError>;

    /// Present a blocking message to the user
    fn notify(&mut self, severity: Severity, title: &str, message: &str);
}
