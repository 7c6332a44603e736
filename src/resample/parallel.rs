use num_traits::Float;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::bootstrap::{BootstrapSample, RdmBootstrap};
use crate::error::ResampleError;
use crate::rdm::Rdms;

impl<R: Rng + SeedableRng> RdmBootstrap<R> {
    /// Draw `n` joint samples in parallel.
    ///
    /// Draw `i` runs on its own generator seeded with `seed + i`, so the batch
    /// does not depend on thread scheduling. The owned generator is not used.
    pub fn par_samples<F>(
        &self,
        rdms: &Rdms<F>,
        n: usize,
        seed: u64,
    ) -> Result<Vec<BootstrapSample<F>>, ResampleError>
    where
        F: Float + Send + Sync,
        R: Sync,
    {
        (0..n)
            .into_par_iter()
            .map(|i| {
                let mut rng = R::seed_from_u64(seed.wrapping_add(i as u64));
                self.config.sample(rdms, &mut rng)
            })
            .collect()
    }
}
