mod descriptor;
mod read;

use std::borrow::Cow;
use std::fmt;

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::error::ResampleError;
use crate::resample::Grouping;

pub use descriptor::{DescriptorValue, Descriptors, INDEX_DESCRIPTOR, index_column, unique};
pub use read::read_descriptors;

use descriptor::member_positions;

/// The two independent axes of an RDM collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Measurement/instance axis: one matrix per repetition or subject.
    Rdm,
    /// Condition axis: the rows and columns of every matrix.
    Pattern,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Rdm => f.write_str("rdm"),
            Axis::Pattern => f.write_str("pattern"),
        }
    }
}

/// Ordered collection of square dissimilarity matrices over a shared pattern set.
///
/// Each matrix is stored row-major in its own buffer of `n_pattern²` entries.
/// Descriptor columns on either axis always match that axis' length.
#[derive(Debug, Clone, PartialEq)]
pub struct Rdms<F> {
    n_pattern: usize,
    matrices: Vec<Vec<F>>,
    rdm_descriptors: Descriptors,
    pattern_descriptors: Descriptors,
}

impl<F: Float> Rdms<F> {
    /// Create a collection from row-major `n_pattern × n_pattern` matrices.
    pub fn new(matrices: Vec<Vec<F>>, n_pattern: usize) -> Result<Self, ResampleError> {
        let expected = n_pattern * n_pattern;
        if let Some((i, m)) = matrices.iter().enumerate().find(|(_, m)| m.len() != expected) {
            return Err(ResampleError::ShapeMismatch {
                what: format!("rdm {i}"),
                expected,
                found: m.len(),
            });
        }

        Ok(Self {
            n_pattern,
            matrices,
            rdm_descriptors: Descriptors::new(),
            pattern_descriptors: Descriptors::new(),
        })
    }

    /// Number of matrices (rdm axis cardinality).
    pub fn n_rdm(&self) -> usize {
        self.matrices.len()
    }

    /// Number of patterns per matrix (pattern axis cardinality).
    pub fn n_pattern(&self) -> usize {
        self.n_pattern
    }

    /// Cardinality of `axis`.
    pub fn len(&self, axis: Axis) -> usize {
        match axis {
            Axis::Rdm => self.n_rdm(),
            Axis::Pattern => self.n_pattern(),
        }
    }

    /// `true` when the collection holds no matrices.
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Per-instance descriptor table.
    pub fn rdm_descriptors(&self) -> &Descriptors {
        &self.rdm_descriptors
    }

    /// Per-pattern descriptor table.
    pub fn pattern_descriptors(&self) -> &Descriptors {
        &self.pattern_descriptors
    }

    /// Descriptor table of `axis`.
    pub fn descriptors(&self, axis: Axis) -> &Descriptors {
        match axis {
            Axis::Rdm => &self.rdm_descriptors,
            Axis::Pattern => &self.pattern_descriptors,
        }
    }

    /// Look up a descriptor column by name.
    pub fn descriptor(&self, axis: Axis, name: &str) -> Result<&[DescriptorValue], ResampleError> {
        self.descriptors(axis)
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ResampleError::UnknownDescriptor {
                axis,
                name: name.to_owned(),
            })
    }

    /// Insert or replace a descriptor column on `axis`.
    pub fn set_descriptor<V>(&mut self, axis: Axis, name: &str, values: V) -> Result<(), ResampleError>
    where
        V: IntoIterator,
        V::Item: Into<DescriptorValue>,
    {
        let values: Vec<DescriptorValue> = values.into_iter().map(Into::into).collect();
        let expected = self.len(axis);
        if values.len() != expected {
            return Err(ResampleError::ShapeMismatch {
                what: format!("{axis} descriptor '{name}'"),
                expected,
                found: values.len(),
            });
        }

        let table = match axis {
            Axis::Rdm => &mut self.rdm_descriptors,
            Axis::Pattern => &mut self.pattern_descriptors,
        };
        table.insert(name.to_owned(), values);
        Ok(())
    }

    /// Insert or replace a per-instance descriptor column.
    pub fn set_rdm_descriptor<V>(&mut self, name: &str, values: V) -> Result<(), ResampleError>
    where
        V: IntoIterator,
        V::Item: Into<DescriptorValue>,
    {
        self.set_descriptor(Axis::Rdm, name, values)
    }

    /// Insert or replace a per-pattern descriptor column.
    pub fn set_pattern_descriptor<V>(&mut self, name: &str, values: V) -> Result<(), ResampleError>
    where
        V: IntoIterator,
        V::Item: Into<DescriptorValue>,
    {
        self.set_descriptor(Axis::Pattern, name, values)
    }

    /// Builder form of [`Rdms::set_rdm_descriptor`].
    pub fn with_rdm_descriptor<V>(mut self, name: &str, values: V) -> Result<Self, ResampleError>
    where
        V: IntoIterator,
        V::Item: Into<DescriptorValue>,
    {
        self.set_rdm_descriptor(name, values)?;
        Ok(self)
    }

    /// Builder form of [`Rdms::set_pattern_descriptor`].
    pub fn with_pattern_descriptor<V>(mut self, name: &str, values: V) -> Result<Self, ResampleError>
    where
        V: IntoIterator,
        V::Item: Into<DescriptorValue>,
    {
        self.set_pattern_descriptor(name, values)?;
        Ok(self)
    }

    /// Persist the identity `"index"` column on the rdm axis.
    #[must_use]
    pub fn with_rdm_index(mut self) -> Self {
        self.rdm_descriptors
            .insert(INDEX_DESCRIPTOR.to_owned(), index_column(self.n_rdm()));
        self
    }

    /// Persist the identity `"index"` column on the pattern axis.
    #[must_use]
    pub fn with_pattern_index(mut self) -> Self {
        self.pattern_descriptors
            .insert(INDEX_DESCRIPTOR.to_owned(), index_column(self.n_pattern));
        self
    }

    /// Resolve the grouping of the pattern axis.
    ///
    /// With a name, the named column and its unique labels are returned. Without
    /// one, an identity column (one group per pattern) is synthesized under
    /// [`INDEX_DESCRIPTOR`]; the collection itself is left untouched.
    pub fn pattern_index(&self, descriptor: Option<&str>) -> Result<Grouping<'_>, ResampleError> {
        match descriptor {
            Some(name) => Ok(Grouping::named(name, self.descriptor(Axis::Pattern, name)?)),
            None => Ok(Grouping::identity(self.n_pattern)),
        }
    }

    /// Matrix `i` in row-major order.
    pub fn matrix(&self, i: usize) -> Option<&[F]> {
        self.matrices.get(i).map(Vec::as_slice)
    }

    /// Entry `(row, col)` of matrix `i`.
    pub fn dissimilarity(&self, i: usize, row: usize, col: usize) -> Option<F> {
        if row >= self.n_pattern || col >= self.n_pattern {
            return None;
        }
        self.matrix(i)?.get(row * self.n_pattern + col).copied()
    }

    /// Iterate over matrices in instance order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[F]> + '_ {
        self.matrices.iter().map(Vec::as_slice)
    }

    /// New collection with, for each label in order, every instance whose
    /// `descriptor` value equals it. Repeated labels repeat their instances.
    pub fn subsample(&self, descriptor: &str, labels: &[DescriptorValue]) -> Result<Self, ResampleError> {
        let values = self.descriptor(Axis::Rdm, descriptor)?;
        let grouping = Grouping::named(descriptor, values);
        self.subsample_grouped(Axis::Rdm, &grouping, labels)
    }

    /// New collection restricted along the pattern axis: rows and columns of
    /// every matrix follow the members of `labels` in order, duplicates included.
    pub fn subsample_pattern(
        &self,
        descriptor: &str,
        labels: &[DescriptorValue],
    ) -> Result<Self, ResampleError> {
        let values = self.descriptor(Axis::Pattern, descriptor)?;
        let grouping = Grouping::named(descriptor, values);
        self.subsample_grouped(Axis::Pattern, &grouping, labels)
    }

    /// Subsample along `axis` using an already resolved grouping.
    ///
    /// The grouping column must have one value per member of `axis`. A
    /// synthesized grouping column is carried into the result under its
    /// descriptor name, re-indexed like every other column.
    pub fn subsample_grouped(
        &self,
        axis: Axis,
        grouping: &Grouping<'_>,
        labels: &[DescriptorValue],
    ) -> Result<Self, ResampleError> {
        let expected = self.len(axis);
        if grouping.values.len() != expected {
            return Err(ResampleError::ShapeMismatch {
                what: format!("{axis} grouping '{}'", grouping.descriptor),
                expected,
                found: grouping.values.len(),
            });
        }

        let positions =
            member_positions(&grouping.values, labels).map_err(|label| ResampleError::UnknownLabel {
                axis,
                descriptor: grouping.descriptor.clone(),
                label,
            })?;

        let taken = match axis {
            Axis::Rdm => self.take_rdms(&positions),
            Axis::Pattern => self.take_patterns(&positions),
        };
        let mut out = taken.ok_or_else(|| ResampleError::ShapeMismatch {
            what: format!("{axis} subsample of '{}'", grouping.descriptor),
            expected,
            found: positions.iter().max().map_or(0, |p| p + 1),
        })?;

        if let Cow::Owned(values) = &grouping.values {
            let column = gather(values, &positions).unwrap_or_default();
            match axis {
                Axis::Rdm => out.rdm_descriptors.insert(grouping.descriptor.clone(), column),
                Axis::Pattern => out.pattern_descriptors.insert(grouping.descriptor.clone(), column),
            };
        }
        Ok(out)
    }

    fn take_rdms(&self, positions: &[usize]) -> Option<Self> {
        Some(Self {
            n_pattern: self.n_pattern,
            matrices: gather(&self.matrices, positions)?,
            rdm_descriptors: reindex_table(&self.rdm_descriptors, positions)?,
            pattern_descriptors: self.pattern_descriptors.clone(),
        })
    }

    fn take_patterns(&self, positions: &[usize]) -> Option<Self> {
        let n = self.n_pattern;
        if positions.iter().any(|&p| p >= n) {
            return None;
        }
        let matrices = self
            .matrices
            .iter()
            .map(|m| {
                positions
                    .iter()
                    .flat_map(|&r| positions.iter().map(move |&c| m.get(r * n + c).copied()))
                    .collect::<Option<Vec<F>>>()
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            n_pattern: positions.len(),
            matrices,
            rdm_descriptors: self.rdm_descriptors.clone(),
            pattern_descriptors: reindex_table(&self.pattern_descriptors, positions)?,
        })
    }
}

/// `items` at `positions`, or `None` if any position is out of range.
fn gather<T: Clone>(items: &[T], positions: &[usize]) -> Option<Vec<T>> {
    positions.iter().map(|&p| items.get(p).cloned()).collect()
}

fn reindex_table(table: &Descriptors, positions: &[usize]) -> Option<Descriptors> {
    table
        .iter()
        .map(|(name, values)| Some((name.clone(), gather(values, positions)?)))
        .collect()
}
