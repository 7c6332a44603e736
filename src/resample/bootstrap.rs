use num_traits::Float;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Re;
use super::group::{DrawRange, Grouping, check_drawable, resolve, sample_groups};
use crate::error::ResampleError;
use crate::rdm::{Axis, DescriptorValue, Rdms};

/// Result of resampling a single axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSample<F> {
    /// The resampled collection.
    pub rdms: Rdms<F>,
    /// Descriptor the groups were taken from (`"index"` for identity groups).
    pub descriptor: String,
    /// Labels drawn, in draw order.
    pub sample: Vec<DescriptorValue>,
}

/// Result of resampling both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapSample<F> {
    /// The resampled collection.
    pub rdms: Rdms<F>,
    /// Rdm-axis labels drawn, in draw order.
    pub rdm_sample: Vec<DescriptorValue>,
    /// Pattern-axis labels drawn, in draw order. The same draw applies to every instance.
    pub pattern_sample: Vec<DescriptorValue>,
}

fn bootstrap_axis<F: Float, R: Rng + ?Sized>(
    rdms: &Rdms<F>,
    axis: Axis,
    descriptor: Option<&str>,
    range: DrawRange,
    rng: &mut R,
) -> Result<AxisSample<F>, ResampleError> {
    let grouping = resolve(rdms, axis, descriptor)?;
    draw_axis(rdms, axis, grouping, range, rng)
}

fn draw_axis<F: Float, R: Rng + ?Sized>(
    rdms: &Rdms<F>,
    axis: Axis,
    grouping: Grouping<'_>,
    range: DrawRange,
    rng: &mut R,
) -> Result<AxisSample<F>, ResampleError> {
    let sample = sample_groups(&grouping.labels, axis, range, rng)?;
    let resampled = rdms.subsample_grouped(axis, &grouping, &sample)?;

    log::debug!(
        "{axis} bootstrap by '{}': {} group(s), {} -> {} member(s)",
        grouping.descriptor,
        grouping.labels.len(),
        rdms.len(axis),
        resampled.len(axis),
    );

    Ok(AxisSample {
        rdms: resampled,
        descriptor: grouping.descriptor,
        sample,
    })
}

/// Bootstrap the rdm axis.
///
/// Each group of `rdm_descriptor` is drawn with replacement; a drawn group
/// contributes all of its instances. Without a descriptor every instance is
/// its own group and the result carries an `"index"` descriptor.
pub fn bootstrap_sample_rdm<F: Float, R: Rng + ?Sized>(
    rdms: &Rdms<F>,
    rdm_descriptor: Option<&str>,
    rng: &mut R,
) -> Result<AxisSample<F>, ResampleError> {
    bootstrap_axis(rdms, Axis::Rdm, rdm_descriptor, DrawRange::default(), rng)
}

/// Bootstrap the pattern axis.
///
/// Drawn pattern groups select rows and columns of every matrix alike, so a
/// group drawn twice appears twice along both dimensions.
pub fn bootstrap_sample_pattern<F: Float, R: Rng + ?Sized>(
    rdms: &Rdms<F>,
    pattern_descriptor: Option<&str>,
    rng: &mut R,
) -> Result<AxisSample<F>, ResampleError> {
    bootstrap_axis(rdms, Axis::Pattern, pattern_descriptor, DrawRange::default(), rng)
}

/// Bootstrap both axes: the rdm axis first, then the pattern axis of that result.
pub fn bootstrap_sample<F: Float, R: Rng + ?Sized>(
    rdms: &Rdms<F>,
    rdm_descriptor: Option<&str>,
    pattern_descriptor: Option<&str>,
    rng: &mut R,
) -> Result<BootstrapSample<F>, ResampleError> {
    let config = BootstrapConfig {
        rdm_descriptor: rdm_descriptor.map(str::to_owned),
        pattern_descriptor: pattern_descriptor.map(str::to_owned),
        range: DrawRange::default(),
    };
    config.sample(rdms, rng)
}

/// Grouping descriptors and draw range of a bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Descriptor grouping the rdm axis; `None` treats instances independently.
    pub rdm_descriptor: Option<String>,
    /// Descriptor grouping the pattern axis; `None` treats patterns independently.
    pub pattern_descriptor: Option<String>,
    /// Width of each group draw.
    pub range: DrawRange,
}

impl BootstrapConfig {
    /// Ungrouped axes, [`DrawRange::ExcludeLast`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Group the rdm axis by `name`.
    #[must_use]
    pub fn with_rdm_descriptor(mut self, name: impl Into<String>) -> Self {
        self.rdm_descriptor = Some(name.into());
        self
    }

    /// Group the pattern axis by `name`.
    #[must_use]
    pub fn with_pattern_descriptor(mut self, name: impl Into<String>) -> Self {
        self.pattern_descriptor = Some(name.into());
        self
    }

    /// Select the draw range.
    #[must_use]
    pub fn with_range(mut self, range: DrawRange) -> Self {
        self.range = range;
        self
    }

    /// Joint draw over both axes with this configuration.
    ///
    /// Both groupings are validated before the first draw, so a failing
    /// call leaves `rng` untouched.
    pub fn sample<F: Float, R: Rng + ?Sized>(
        &self,
        rdms: &Rdms<F>,
        rng: &mut R,
    ) -> Result<BootstrapSample<F>, ResampleError> {
        let rdm_grouping = resolve(rdms, Axis::Rdm, self.rdm_descriptor.as_deref())?;
        check_drawable(rdm_grouping.labels.len(), Axis::Rdm, self.range)?;
        // rdm subsampling carries pattern descriptors over unchanged
        let pattern_grouping = resolve(rdms, Axis::Pattern, self.pattern_descriptor.as_deref())?;
        check_drawable(pattern_grouping.labels.len(), Axis::Pattern, self.range)?;

        let by_rdm = draw_axis(rdms, Axis::Rdm, rdm_grouping, self.range, rng)?;
        let by_pattern = draw_axis(&by_rdm.rdms, Axis::Pattern, pattern_grouping, self.range, rng)?;

        Ok(BootstrapSample {
            rdms: by_pattern.rdms,
            rdm_sample: by_rdm.sample,
            pattern_sample: by_pattern.sample,
        })
    }
}

/// Grouped two-axis bootstrap over RDM collections.
///
/// Through [`Re`] every iterator starts from a clone of `rng`, so repeated
/// calls replay the same sequence of draws.
#[derive(Clone, Default)]
pub struct RdmBootstrap<R: Rng> {
    /// Generator every draw is taken from.
    pub rng: R,
    /// Groupings and draw range.
    pub config: BootstrapConfig,
}

impl<R: Rng> RdmBootstrap<R> {
    /// Ungrouped bootstrap driven by `rng`.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            config: BootstrapConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// One joint draw, advancing the owned generator.
    pub fn draw<F: Float>(&mut self, rdms: &Rdms<F>) -> Result<BootstrapSample<F>, ResampleError> {
        self.config.sample(rdms, &mut self.rng)
    }
}

impl<F: Float, R: Rng + Clone> Re<Rdms<F>> for RdmBootstrap<R> {
    type Item = Result<BootstrapSample<F>, ResampleError>;

    fn re(&self, rdms: &Rdms<F>) -> impl Iterator<Item = Self::Item> {
        BootstrapIter {
            rdms: rdms.clone(),
            config: self.config.clone(),
            rng: self.rng.clone(),
        }
    }
}

/// Endless stream of joint draws over an owned copy of the collection.
pub struct BootstrapIter<F, R: Rng> {
    rdms: Rdms<F>,
    config: BootstrapConfig,
    rng: R,
}

impl<F: Float, R: Rng> Iterator for BootstrapIter<F, R> {
    type Item = Result<BootstrapSample<F>, ResampleError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.config.sample(&self.rdms, &mut self.rng))
    }
}
