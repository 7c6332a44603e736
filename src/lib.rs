//! Grouped bootstrap resampling of representational dissimilarity matrix
//! (RDM) collections.
//!
//! A collection is indexed by two independent axes: the rdm axis (one matrix
//! per measurement or subject) and the pattern axis (the conditions forming
//! the rows and columns of every matrix). Either axis can be resampled with
//! replacement, optionally treating every value of a grouping descriptor as
//! one indivisible unit.
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use rdmboot::{Rdms, bootstrap_sample};
//!
//! let rdms = Rdms::new(vec![vec![0.0_f64; 16]; 5], 4)?
//!     .with_rdm_descriptor("subject", [1_i64, 1, 2, 3, 4])?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let sample = bootstrap_sample(&rdms, Some("subject"), None, &mut rng)?;
//! assert_eq!(sample.rdm_sample.len(), 4);
//! assert_eq!(sample.pattern_sample.len(), 4);
//! # Ok::<(), rdmboot::ResampleError>(())
//! ```

mod display;
mod error;
mod rdm;
mod resample;

pub use crate::error::ResampleError;
pub use crate::rdm::{
    Axis, DescriptorValue, Descriptors, INDEX_DESCRIPTOR, Rdms, index_column, read_descriptors, unique,
};
pub use crate::resample::*;
pub use rand;
pub use rand::Rng;
