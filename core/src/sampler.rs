//! Range sampling for scale and rotation values

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::config::{Range, TransformConfig};

/// One set of sampled transform values.
///
/// `None` means the channel group is disabled and must not be written.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampledTransform {
    pub scale: Option<DVec3>,
    /// Rotation in degrees
    pub rotation: Option<DVec3>,
}

/// Uniform sampler over configured ranges.
///
/// Seeded samplers are deterministic: two samplers built from the same seed
/// yield the same sequence of values.
pub struct RangeSampler {
    rng: Pcg64,
}

impl RangeSampler {
    /// Create a sampler, seeded when `seed` is given and from the thread RNG otherwise
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }

    /// Draw a value uniformly from `[min, max]`.
    ///
    /// Degenerate ranges return `min` without touching the generator. Ranges
    /// are validated with the configuration, so `min <= max` holds here.
    pub fn sample(&mut self, range: Range) -> f64 {
        if range.is_degenerate() {
            return range.min;
        }
        self.rng.random_range(range.min..=range.max)
    }

    /// Draw a fresh transform sample for one unit (item or island).
    ///
    /// With `uniform_scale` a single value from `scale.uniform` fills all
    /// three axes and the per-axis ranges are ignored. Scale values are not
    /// clamped; zero and negative samples pass through.
    pub fn draw(&mut self, config: &TransformConfig) -> SampledTransform {
        let scale = config.apply_scale.then(|| {
            if config.uniform_scale {
                DVec3::splat(self.sample(config.scale.uniform))
            } else {
                DVec3::new(
                    self.sample(config.scale.x),
                    self.sample(config.scale.y),
                    self.sample(config.scale.z),
                )
            }
        });

        let rotation = config.apply_rotation.then(|| {
            DVec3::new(
                self.sample(config.rotation.x),
                self.sample(config.rotation.y),
                self.sample(config.rotation.z),
            )
        });

        SampledTransform { scale, rotation }
    }
}
