mod bootstrap;
mod group;
#[cfg(feature = "rayon")]
mod parallel;

pub use bootstrap::{
    AxisSample, BootstrapConfig, BootstrapSample, RdmBootstrap, bootstrap_sample,
    bootstrap_sample_pattern, bootstrap_sample_rdm,
};
pub use group::{DrawRange, Grouping, check_drawable, resolve, sample_groups};

/// A resampler yielding an endless stream of draws over `T`.
pub trait Re<T> {
    type Item;
    fn re(&self, t: &T) -> impl Iterator<Item = Self::Item>;
}
