use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

use serde::{Deserialize, Serialize};

/// Named per-axis metadata columns.
pub type Descriptors = BTreeMap<String, Vec<DescriptorValue>>;

/// Name of the identity descriptor synthesized when no grouping is given.
pub const INDEX_DESCRIPTOR: &str = "index";

/// A single descriptor cell.
///
/// Values are totally ordered so that the unique label set of a column has
/// one stable order: numbers first, in numeric order (an integer sorts before
/// a float of equal value), then text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorValue {
    /// Integer label, e.g. a subject number or an instance index.
    Int(i64),
    /// Non-integer numeric label, e.g. a stimulus intensity.
    Float(f64),
    /// Free-form label, e.g. a condition name.
    Text(String),
}

impl DescriptorValue {
    /// Parse a raw cell.
    ///
    /// Integers become [`DescriptorValue::Int`], other finite numbers
    /// [`DescriptorValue::Float`], anything else text. Numbers written with a
    /// leading zero (`007`, `-01.5`) stay text so they never merge with `7`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let digits = trimmed.trim_start_matches(['-', '+']);
        let zero_padded = digits.len() > 1
            && digits.starts_with('0')
            && digits.chars().nth(1).is_some_and(|c| c.is_ascii_digit());
        if zero_padded {
            return Self::Text(trimmed.to_owned());
        }

        if let Ok(v) = trimmed.parse::<i64>() {
            return Self::Int(v);
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Float(v),
            _ => Self::Text(trimmed.to_owned()),
        }
    }
}

impl Ord for DescriptorValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use DescriptorValue::{Float, Int, Text};
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Text(a), Text(b)) => a.cmp(b),
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for DescriptorValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DescriptorValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DescriptorValue {}

impl Hash for DescriptorValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            DescriptorValue::Int(v) => v.hash(state),
            DescriptorValue::Float(v) => v.to_bits().hash(state),
            DescriptorValue::Text(v) => v.hash(state),
        }
    }
}

impl fmt::Display for DescriptorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorValue::Int(v) => write!(f, "{v}"),
            DescriptorValue::Float(v) => write!(f, "{v}"),
            DescriptorValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for DescriptorValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for DescriptorValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for DescriptorValue {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<&str> for DescriptorValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for DescriptorValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Sorted unique values of a descriptor column.
pub fn unique(values: &[DescriptorValue]) -> Vec<DescriptorValue> {
    let mut labels = values.to_vec();
    labels.sort_unstable();
    labels.dedup();
    labels
}

/// Identity column `0..n`: every member is its own group.
pub fn index_column(n: usize) -> Vec<DescriptorValue> {
    (0..n).map(DescriptorValue::from).collect()
}

/// Positions of the members carrying each label, in label order.
///
/// Labels may repeat; a repeated label repeats its members. Returns the
/// first label that has no members as the error value.
pub(crate) fn member_positions(
    values: &[DescriptorValue],
    labels: &[DescriptorValue],
) -> Result<Vec<usize>, DescriptorValue> {
    let mut members: BTreeMap<&DescriptorValue, Vec<usize>> = BTreeMap::new();
    for (i, value) in values.iter().enumerate() {
        members.entry(value).or_default().push(i);
    }

    let mut positions = Vec::with_capacity(labels.len());
    for label in labels {
        match members.get(label) {
            Some(idx) => positions.extend_from_slice(idx),
            None => return Err(label.clone()),
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_distinguishes_integers_from_text() {
        assert_eq!(DescriptorValue::parse(" 42 "), DescriptorValue::Int(42));
        assert_eq!(DescriptorValue::parse("-3"), DescriptorValue::Int(-3));
        assert_eq!(DescriptorValue::parse("face"), DescriptorValue::from("face"));
        assert_eq!(DescriptorValue::parse("1.5"), DescriptorValue::Float(1.5));
        assert_eq!(DescriptorValue::parse("nan"), DescriptorValue::from("nan"));
        assert_eq!(DescriptorValue::parse("inf"), DescriptorValue::from("inf"));
    }

    #[test]
    fn zero_padded_numbers_stay_text() {
        assert_eq!(DescriptorValue::parse("007"), DescriptorValue::from("007"));
        assert_eq!(DescriptorValue::parse("-01.5"), DescriptorValue::from("-01.5"));
        assert_eq!(DescriptorValue::parse("0"), DescriptorValue::Int(0));
        assert_eq!(DescriptorValue::parse("0.25"), DescriptorValue::Float(0.25));
        assert_ne!(DescriptorValue::parse("007"), DescriptorValue::parse("7"));
    }

    #[test]
    fn float_labels_sort_numerically() {
        let values: Vec<DescriptorValue> = ["2.5", "10.5", "1.5", "2.5"]
            .iter()
            .map(|raw| DescriptorValue::parse(raw))
            .collect();
        let labels = unique(&values);
        let expected: Vec<DescriptorValue> = vec![1.5_f64.into(), 2.5_f64.into(), 10.5_f64.into()];
        assert_eq!(labels, expected);
        assert_eq!(labels.last(), Some(&DescriptorValue::Float(10.5)));
    }

    #[test]
    fn integers_and_floats_interleave_numerically() {
        let values: Vec<DescriptorValue> =
            vec![3_i64.into(), 2.5_f64.into(), "a".into(), 2_i64.into(), 2.0_f64.into(), (-1.5_f64).into()];
        let expected: Vec<DescriptorValue> = vec![
            (-1.5_f64).into(),
            2_i64.into(),
            2.0_f64.into(),
            2.5_f64.into(),
            3_i64.into(),
            "a".into(),
        ];
        assert_eq!(unique(&values), expected);
        assert_ne!(DescriptorValue::Int(2), DescriptorValue::Float(2.0));
    }

    #[test]
    fn integers_order_before_text() {
        let values: Vec<DescriptorValue> =
            vec!["b".into(), 3_i64.into(), "a".into(), 1_i64.into(), 3_i64.into()];
        let expected: Vec<DescriptorValue> = vec![1_i64.into(), 3_i64.into(), "a".into(), "b".into()];
        assert_eq!(unique(&values), expected);
    }

    #[test]
    fn member_positions_follow_label_order_and_repeat() {
        let values: Vec<DescriptorValue> = vec!["x".into(), "y".into(), "x".into(), "z".into()];
        let labels: Vec<DescriptorValue> = vec!["z".into(), "x".into(), "z".into()];
        assert_eq!(member_positions(&values, &labels), Ok(vec![3, 0, 2, 3]));
    }

    #[test]
    fn member_positions_reports_missing_label() {
        let values = index_column(3);
        let labels: Vec<DescriptorValue> = vec![1_i64.into(), 7_i64.into()];
        assert_eq!(member_positions(&values, &labels), Err(DescriptorValue::Int(7)));
    }

    #[test]
    fn untagged_serde_reads_every_kind() {
        let values: Vec<DescriptorValue> = serde_json::from_str(r#"[1, "cat", -2, 0.5]"#).unwrap();
        let expected: Vec<DescriptorValue> = vec![1_i64.into(), "cat".into(), (-2_i64).into(), 0.5_f64.into()];
        assert_eq!(values, expected);
    }
}
