//! Writes sampled transforms to host items

use crate::config::TransformConfig;
use crate::error::HostError;
use crate::host::{ItemId, SceneHost};
use crate::sampler::{RangeSampler, SampledTransform};

/// Draw a fresh sample and write it to `target`.
///
/// Only the enabled channel groups are written; a disabled group keeps
/// whatever value the target already had. Every call draws new values.
/// Returns the sample that was applied.
pub fn apply_transform<H: SceneHost + ?Sized>(
    host: &mut H,
    target: ItemId,
    config: &TransformConfig,
    sampler: &mut RangeSampler,
) -> Result<SampledTransform, HostError> {
    let sample = sampler.draw(config);
    apply_sample(host, target, &sample)?;
    Ok(sample)
}

/// Write an existing sample to `target`
pub fn apply_sample<H: SceneHost + ?Sized>(
    host: &mut H,
    target: ItemId,
    sample: &SampledTransform,
) -> Result<(), HostError> {
    if let Some(scale) = sample.scale {
        host.set_scale(target, scale)?;
    }
    if let Some(rotation) = sample.rotation {
        host.set_rotation(target, rotation)?;
    }
    tracing::trace!(item = %target, scale = ?sample.scale, rotation = ?sample.rotation, "applied transform");
    Ok(())
}
