use std::io;

use thiserror::Error;

use crate::rdm::{Axis, DescriptorValue};

/// Error type for descriptor lookup, group sampling, and collection loading.
#[derive(Debug, Error)]
pub enum ResampleError {
    /// A grouping descriptor is not present on the axis.
    #[error("no {axis} descriptor named '{name}'")]
    UnknownDescriptor {
        /// Axis that was searched.
        axis: Axis,
        /// Requested descriptor name.
        name: String,
    },
    /// Too few groups for the draw range to be non-empty.
    #[error("cannot draw from the {axis} axis: {groups} group(s) leave an empty sampling range")]
    DegenerateAxis {
        /// Axis being resampled.
        axis: Axis,
        /// Number of distinct labels.
        groups: usize,
    },
    /// A requested label selects no member.
    #[error("label {label} has no members in {axis} descriptor '{descriptor}'")]
    UnknownLabel {
        /// Axis being subsampled.
        axis: Axis,
        /// Descriptor the label was looked up in.
        descriptor: String,
        /// The missing label.
        label: DescriptorValue,
    },
    /// A matrix, descriptor column, or grouping has the wrong length.
    #[error("{what}: expected length {expected}, found {found}")]
    ShapeMismatch {
        /// What was checked.
        what: String,
        /// Required length.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// Reading a file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A CSV record could not be parsed.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    /// A CSV file has a header but no records.
    #[error("CSV file contains no data records")]
    EmptyFile,
}
