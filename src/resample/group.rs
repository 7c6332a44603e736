use std::borrow::Cow;

use num_traits::Float;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ResampleError;
use crate::rdm::{Axis, DescriptorValue, INDEX_DESCRIPTOR, Rdms, index_column, unique};

/// Resolved grouping of one axis: the descriptor column that defines the
/// groups and its sorted unique labels.
///
/// A borrowed column comes from the collection; an owned one was synthesized
/// (identity grouping) and is not stored on the source collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping<'a> {
    /// Name of the grouping descriptor.
    pub descriptor: String,
    /// Group value of every axis member.
    pub values: Cow<'a, [DescriptorValue]>,
    /// Sorted unique group labels, the sampling universe.
    pub labels: Vec<DescriptorValue>,
}

impl<'a> Grouping<'a> {
    /// Group by an existing column.
    pub fn named(name: &str, values: &'a [DescriptorValue]) -> Self {
        Self {
            descriptor: name.to_owned(),
            labels: unique(values),
            values: Cow::Borrowed(values),
        }
    }

    /// One singleton group per member, under [`INDEX_DESCRIPTOR`].
    pub fn identity(n: usize) -> Self {
        let values = index_column(n);
        Self {
            descriptor: INDEX_DESCRIPTOR.to_owned(),
            labels: values.clone(),
            values: Cow::Owned(values),
        }
    }

    /// `true` if the column was synthesized rather than read from the collection.
    pub fn is_synthesized(&self) -> bool {
        matches!(self.values, Cow::Owned(_))
    }
}

/// Width of the integer range each group draw is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawRange {
    /// Draw indices from `0..k - 1`: the last of `k` labels is never drawn.
    ///
    /// Reproduces the established resampling distribution exactly. A
    /// single-group axis has no valid draw.
    #[default]
    ExcludeLast,
    /// Draw indices from `0..k`, uniform over every label.
    Full,
}

impl DrawRange {
    fn upper(self, groups: usize) -> usize {
        match self {
            DrawRange::ExcludeLast => groups.saturating_sub(1),
            DrawRange::Full => groups,
        }
    }
}

/// Resolve the grouping of `axis`.
///
/// Without a descriptor name every member becomes its own group. The
/// collection is never modified.
pub fn resolve<'a, F: Float>(
    rdms: &'a Rdms<F>,
    axis: Axis,
    descriptor: Option<&str>,
) -> Result<Grouping<'a>, ResampleError> {
    match (axis, descriptor) {
        (Axis::Rdm, Some(name)) => Ok(Grouping::named(name, rdms.descriptor(Axis::Rdm, name)?)),
        (Axis::Rdm, None) => Ok(Grouping::identity(rdms.n_rdm())),
        (Axis::Pattern, _) => rdms.pattern_index(descriptor),
    }
}

/// Fail with [`ResampleError::DegenerateAxis`] if `groups` labels leave an
/// empty draw range.
pub fn check_drawable(groups: usize, axis: Axis, range: DrawRange) -> Result<(), ResampleError> {
    if range.upper(groups) == 0 {
        return Err(ResampleError::DegenerateAxis { axis, groups });
    }
    Ok(())
}

/// Draw `labels.len()` labels with replacement.
///
/// One `gen_range` call per output element, consumed in output order.
pub fn sample_groups<R: Rng + ?Sized>(
    labels: &[DescriptorValue],
    axis: Axis,
    range: DrawRange,
    rng: &mut R,
) -> Result<Vec<DescriptorValue>, ResampleError> {
    check_drawable(labels.len(), axis, range)?;
    let upper = range.upper(labels.len());

    let sample: Vec<DescriptorValue> = (0..labels.len())
        .filter_map(|_| labels.get(rng.gen_range(0..upper)).cloned())
        .collect();
    log::trace!("{axis} draw over {} group(s): {sample:?}", labels.len());
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::collections::BTreeSet;

    fn ints(n: usize) -> Vec<DescriptorValue> {
        index_column(n)
    }

    #[test]
    fn last_label_is_never_drawn() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let labels = ints(5);
        let mut seen: BTreeSet<DescriptorValue> = BTreeSet::new();
        for _ in 0..2_000 {
            seen.extend(sample_groups(&labels, Axis::Rdm, DrawRange::ExcludeLast, &mut rng).unwrap());
        }
        let expected: BTreeSet<DescriptorValue> = ints(4).into_iter().collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn highest_accepted_output_maps_to_second_to_last_label() {
        // index = top two bits for a span of 4; 0xDFFF.. is the largest accepted output
        let mut rng = StepRng::new(0xDFFF_FFFF_FFFF_FFFF, 0);
        let labels = ints(5);
        let sample = sample_groups(&labels, Axis::Rdm, DrawRange::ExcludeLast, &mut rng).unwrap();
        assert_eq!(sample, vec![DescriptorValue::Int(3); 5]);
    }

    #[test]
    fn full_range_reaches_every_label() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let labels = ints(5);
        let mut seen: BTreeSet<DescriptorValue> = BTreeSet::new();
        for _ in 0..2_000 {
            seen.extend(sample_groups(&labels, Axis::Rdm, DrawRange::Full, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn draw_length_matches_group_count() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        for k in 2..20 {
            let sample = sample_groups(&ints(k), Axis::Pattern, DrawRange::ExcludeLast, &mut rng).unwrap();
            assert_eq!(sample.len(), k);
        }
    }

    #[test]
    fn zero_rng_always_picks_first_label() {
        let mut rng = StepRng::new(0, 0);
        let labels: Vec<DescriptorValue> = vec!["b".into(), "c".into(), "d".into()];
        let sample = sample_groups(&labels, Axis::Rdm, DrawRange::ExcludeLast, &mut rng).unwrap();
        let expected: Vec<DescriptorValue> = vec!["b".into(); 3];
        assert_eq!(sample, expected);
    }

    #[test]
    fn single_group_is_degenerate_under_faithful_range() {
        let mut rng = StepRng::new(0, 0);
        let err = sample_groups(&ints(1), Axis::Pattern, DrawRange::ExcludeLast, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ResampleError::DegenerateAxis { axis: Axis::Pattern, groups: 1 }
        ));

        let ok = sample_groups(&ints(1), Axis::Pattern, DrawRange::Full, &mut rng).unwrap();
        assert_eq!(ok, ints(1));
    }

    #[test]
    fn empty_axis_is_degenerate_under_any_range() {
        let mut rng = StepRng::new(0, 0);
        for range in [DrawRange::ExcludeLast, DrawRange::Full] {
            assert!(sample_groups(&[], Axis::Rdm, range, &mut rng).is_err());
        }
    }

    #[test]
    fn same_seed_gives_same_draw() {
        let labels = ints(9);
        let a = sample_groups(
            &labels,
            Axis::Rdm,
            DrawRange::ExcludeLast,
            &mut Xoshiro256PlusPlus::seed_from_u64(3),
        )
        .unwrap();
        let b = sample_groups(
            &labels,
            Axis::Rdm,
            DrawRange::ExcludeLast,
            &mut Xoshiro256PlusPlus::seed_from_u64(3),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn resolve_named_uses_sorted_unique_labels() {
        let rdms = Rdms::new(vec![vec![0.0_f64]; 4], 1)
            .unwrap()
            .with_rdm_descriptor("subject", [3_i64, 1, 3, 2])
            .unwrap();
        let grouping = resolve(&rdms, Axis::Rdm, Some("subject")).unwrap();
        assert!(!grouping.is_synthesized());
        let expected: Vec<DescriptorValue> = vec![1_i64.into(), 2_i64.into(), 3_i64.into()];
        assert_eq!(grouping.labels, expected);
    }

    #[test]
    fn resolve_without_name_synthesizes_identity() {
        let rdms = Rdms::new(vec![vec![0.0_f64; 4]; 3], 2).unwrap();
        let rdm = resolve(&rdms, Axis::Rdm, None).unwrap();
        let pattern = resolve(&rdms, Axis::Pattern, None).unwrap();
        assert!(rdm.is_synthesized());
        assert_eq!(rdm.descriptor, INDEX_DESCRIPTOR);
        assert_eq!(rdm.labels, ints(3));
        assert_eq!(pattern.labels, ints(2));
        assert!(rdms.rdm_descriptors().is_empty());
    }

    #[test]
    fn resolve_unknown_name_fails() {
        let rdms = Rdms::new(vec![vec![0.0_f64; 4]; 3], 2).unwrap();
        let err = resolve(&rdms, Axis::Pattern, Some("category")).unwrap_err();
        assert!(matches!(err, ResampleError::UnknownDescriptor { axis: Axis::Pattern, .. }));
    }
}
