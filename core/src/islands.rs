//! Per-island transforms
//!
//! Each connected polygon island of a target is moved into its own temporary
//! container, pivoted at the configured anchor, given an independent random
//! transform, and collected into a result container. Once every island is
//! done the result container is emptied back into the target.
//!
//! The island list is computed once up front from a snapshot of the target's
//! polygons, so the loop never iterates a collection the host is mutating.

use hashbrown::HashSet;

use crate::applier::apply_transform;
use crate::config::{PivotAnchor, TransformConfig};
use crate::error::{HostError, RunError};
use crate::host::{ItemId, PolygonId, SceneHost};
use crate::sampler::{RangeSampler, SampledTransform};

/// Name of the per-island temporary container
pub const ISLAND_CONTAINER_NAME: &str = "zbTempScaleMesh";

/// Name of the per-target container that accumulates transformed islands
pub const RESULT_CONTAINER_NAME: &str = "zbFinalScaledMeshes";

/// Stage of the per-target island procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IslandPhase {
    /// Reading the target's polygons and partitioning them into islands
    Scanning,
    /// Moving one island into a temporary container
    Isolating,
    /// Pivoting and transforming the temporary container
    Transforming,
    /// Moving the island into the result container
    Reintegrating,
    /// Result container emptied back into the target
    Done,
}

/// One transformed island
#[derive(Debug, Clone, PartialEq)]
pub struct IslandOutcome {
    pub polygons: Vec<PolygonId>,
    pub sample: SampledTransform,
}

/// Result of processing every island of one target
#[derive(Debug, Clone, PartialEq)]
pub struct IslandReport {
    pub target: ItemId,
    pub islands: Vec<IslandOutcome>,
}

impl IslandReport {
    pub fn polygon_count(&self) -> usize {
        self.islands.iter().map(|island| island.polygons.len()).sum()
    }
}

/// Partition the item's polygons into connected islands.
///
/// Asks the host to grow each not-yet-assigned polygon into its island. A
/// polygon is assigned to the first island that claims it, and every seed
/// belongs to its own island even if the host leaves it out, so the result
/// covers each polygon exactly once. No host state is modified.
pub fn partition_islands<H: SceneHost + ?Sized>(
    host: &H,
    item: ItemId,
) -> Result<Vec<Vec<PolygonId>>, HostError> {
    let polygons = host.polygons(item)?;
    let mut assigned: HashSet<PolygonId> = HashSet::with_capacity(polygons.len());
    let mut islands = Vec::new();

    for &seed in &polygons {
        if assigned.contains(&seed) {
            continue;
        }
        let mut island: Vec<PolygonId> = host
            .connect_island(item, seed)?
            .into_iter()
            .filter(|polygon| assigned.insert(*polygon))
            .collect();
        if assigned.insert(seed) {
            island.push(seed);
        }
        islands.push(island);
    }

    Ok(islands)
}

/// Give every island of `item` its own random transform.
///
/// Islands are processed strictly one after another. A host failure aborts
/// immediately without rollback; polygons may be left in a temporary or
/// result container in that case.
///
/// # Errors
///
/// Returns [`RunError::Host`] on any host failure and
/// [`RunError::PolygonCountMismatch`] if the target doesn't end up with the
/// polygons it started with.
pub fn transform_islands<H: SceneHost + ?Sized>(
    host: &mut H,
    item: ItemId,
    config: &TransformConfig,
    anchor: PivotAnchor,
    sampler: &mut RangeSampler,
) -> Result<IslandReport, RunError> {
    let span = tracing::debug_span!("islands", %item);
    let _enter = span.enter();

    tracing::trace!(phase = ?IslandPhase::Scanning);
    let islands = partition_islands(host, item)?;
    let expected: usize = islands.iter().map(Vec::len).sum();
    let mut report = IslandReport {
        target: item,
        islands: Vec::with_capacity(islands.len()),
    };

    if islands.is_empty() {
        tracing::debug!("item has no polygons, skipping");
        return Ok(report);
    }
    tracing::debug!(islands = islands.len(), polygons = expected, "partitioned item");

    let result = host.create_container(RESULT_CONTAINER_NAME)?;

    for polygons in islands {
        tracing::trace!(phase = ?IslandPhase::Isolating, polygons = polygons.len());
        let temp = host.create_container(ISLAND_CONTAINER_NAME)?;
        host.move_polygons(item, temp, &polygons)?;

        tracing::trace!(phase = ?IslandPhase::Transforming, %anchor);
        host.recenter_pivot(temp, anchor)?;
        let sample = apply_transform(host, temp, config, sampler)?;

        tracing::trace!(phase = ?IslandPhase::Reintegrating);
        host.move_polygons(temp, result, &polygons)?;
        host.destroy_container(temp)?;

        report.islands.push(IslandOutcome { polygons, sample });
    }

    let accumulated = host.polygons(result)?;
    host.move_polygons(result, item, &accumulated)?;
    host.destroy_container(result)?;
    tracing::trace!(phase = ?IslandPhase::Done);

    let actual = host.polygons(item)?.len();
    if actual != expected {
        return Err(RunError::PolygonCountMismatch {
            item,
            expected,
            actual,
        });
    }

    tracing::debug!(islands = report.islands.len(), "transformed islands");
    Ok(report)
}
