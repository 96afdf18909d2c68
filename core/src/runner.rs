//! Run orchestration
//!
//! Validates the configuration and selection, then transforms each selected
//! item either as a whole or island by island.

use crate::applier::apply_transform;
use crate::config::TransformConfig;
use crate::error::RunError;
use crate::guard;
use crate::host::{ItemId, SceneHost, Severity};
use crate::islands::{IslandReport, transform_islands};
use crate::sampler::{RangeSampler, SampledTransform};

/// Title of the dialog shown for guard failures
pub const WARNING_TITLE: &str = "Warning";

/// Which unit receives a random transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One sample per selected item
    WholeItems,
    /// One sample per connected polygon island
    PolygonIslands,
}

impl RunMode {
    pub fn from_config(config: &TransformConfig) -> Self {
        if config.polygon_islands {
            RunMode::PolygonIslands
        } else {
            RunMode::WholeItems
        }
    }
}

/// What happened to one selected item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Whole {
        target: ItemId,
        sample: SampledTransform,
    },
    Islands(IslandReport),
}

impl ItemOutcome {
    pub fn target(&self) -> ItemId {
        match self {
            ItemOutcome::Whole { target, .. } => *target,
            ItemOutcome::Islands(report) => report.target,
        }
    }

    /// Number of independently sampled transforms applied for this item
    pub fn units(&self) -> usize {
        match self {
            ItemOutcome::Whole { .. } => 1,
            ItemOutcome::Islands(report) => report.islands.len(),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub mode: RunMode,
    pub items: Vec<ItemOutcome>,
}

impl RunReport {
    /// Total number of transform samples applied
    pub fn units(&self) -> usize {
        self.items.iter().map(ItemOutcome::units).sum()
    }
}

/// Transform the host's selected mesh items according to `config`.
///
/// Checks run before any mutation, in this order: configuration ranges,
/// pivot name (island mode only), non-empty selection. Pivot and selection
/// failures are shown to the user via [`SceneHost::notify`] before the error
/// is returned. Host failures after that point abort the run without
/// rollback.
pub fn run<H: SceneHost + ?Sized>(
    host: &mut H,
    config: &TransformConfig,
) -> Result<RunReport, RunError> {
    guard::validate_config(config)?;
    let mode = RunMode::from_config(config);

    let anchor = match mode {
        RunMode::PolygonIslands => Some(surface(
            host,
            guard::validate_pivot(&config.pivot_position),
        )?),
        RunMode::WholeItems => None,
    };

    let items = host.selected_meshes()?;
    surface(host, guard::validate_selection(&items))?;

    tracing::info!(?mode, items = items.len(), "transforming selection");

    let mut sampler = RangeSampler::new(config.seed);
    let mut outcomes = Vec::with_capacity(items.len());

    for item in items {
        let outcome = match anchor {
            Some(anchor) => {
                ItemOutcome::Islands(transform_islands(host, item, config, anchor, &mut sampler)?)
            }
            None => ItemOutcome::Whole {
                target: item,
                sample: apply_transform(host, item, config, &mut sampler)?,
            },
        };
        outcomes.push(outcome);
    }

    let report = RunReport {
        mode,
        items: outcomes,
    };
    tracing::info!(units = report.units(), "run complete");
    Ok(report)
}

/// Show guard failures to the user before handing them back
fn surface<H: SceneHost + ?Sized, T>(
    host: &mut H,
    result: Result<T, RunError>,
) -> Result<T, RunError> {
    if let Err(err) = &result {
        if let Some(message) = err.user_message() {
            tracing::warn!("{message}");
            host.notify(Severity::Warning, WARNING_TITLE, message);
        }
    }
    result
}
