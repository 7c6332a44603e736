use std::path::Path;

use csv::ReaderBuilder;
use num_traits::Float;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{DescriptorValue, Descriptors, Rdms};
use crate::error::ResampleError;

#[derive(Debug, Deserialize)]
struct DissimilarityRecord<F> {
    rdm: usize,
    row: usize,
    col: usize,
    dissimilarity: F,
}

impl<F: Float + DeserializeOwned> Rdms<F> {
    /// Read a collection from a long-format CSV file with header
    /// `rdm,row,col,dissimilarity`.
    ///
    /// Entries given only on one side of the diagonal are mirrored. The
    /// diagonal defaults to zero; any other missing entry is NaN.
    pub fn read_long<P: AsRef<Path>>(path: P) -> Result<Self, ResampleError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut records: Vec<DissimilarityRecord<F>> = Vec::new();
        for result in rdr.deserialize() {
            records.push(result?);
        }

        if records.is_empty() {
            return Err(ResampleError::EmptyFile);
        }

        let n_rdm = records.iter().map(|r| r.rdm + 1).max().unwrap_or(0);
        let n = records.iter().map(|r| r.row.max(r.col) + 1).max().unwrap_or(0);

        let mut matrices: Vec<Vec<F>> = (0..n_rdm)
            .map(|_| {
                (0..n * n)
                    .map(|k| if k / n == k % n { F::zero() } else { F::nan() })
                    .collect()
            })
            .collect();
        let mut explicit = vec![vec![false; n * n]; n_rdm];

        for r in &records {
            let (Some(m), Some(seen)) = (matrices.get_mut(r.rdm), explicit.get_mut(r.rdm)) else {
                continue;
            };
            let at = r.row * n + r.col;
            let mirror = r.col * n + r.row;
            if let (Some(cell), Some(flag)) = (m.get_mut(at), seen.get_mut(at)) {
                *cell = r.dissimilarity;
                *flag = true;
            }
            if !seen.get(mirror).copied().unwrap_or(true) {
                if let Some(cell) = m.get_mut(mirror) {
                    *cell = r.dissimilarity;
                }
            }
        }

        log::debug!("read {n_rdm} rdm(s) over {n} pattern(s) from {} record(s)", records.len());
        Self::new(matrices, n)
    }
}

/// Read a descriptor table: the header names the descriptors, each record is
/// one axis member. Cells are typed by [`DescriptorValue::parse`].
pub fn read_descriptors<P: AsRef<Path>>(path: P) -> Result<Descriptors, ResampleError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let names: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_owned()).collect();

    let mut columns: Vec<Vec<DescriptorValue>> = vec![Vec::new(); names.len()];
    for result in rdr.records() {
        let record = result?;
        for (column, cell) in columns.iter_mut().zip(record.iter()) {
            column.push(DescriptorValue::parse(cell));
        }
    }

    if columns.first().is_none_or(Vec::is_empty) {
        return Err(ResampleError::EmptyFile);
    }

    Ok(names.into_iter().zip(columns).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdm::Axis;
    use approx::assert_abs_diff_eq;
    use std::fs;
    use tempfile::NamedTempFile;

    fn temp_csv(contents: &str) -> NamedTempFile {
        let tmp = NamedTempFile::new().unwrap();
        fs::write(tmp.path(), contents).unwrap();
        tmp
    }

    #[test]
    fn long_format_mirrors_one_sided_entries() {
        let tmp = temp_csv(
            "rdm,row,col,dissimilarity\n\
             0,0,1,0.5\n\
             0,0,2,0.7\n\
             0,1,2,0.2\n\
             1,0,1,1.5\n\
             1,1,0,1.25\n",
        );
        let rdms = Rdms::<f64>::read_long(tmp.path()).unwrap();

        assert_eq!(rdms.n_rdm(), 2);
        assert_eq!(rdms.n_pattern(), 3);
        assert_abs_diff_eq!(rdms.dissimilarity(0, 2, 1).unwrap(), 0.2);
        assert_abs_diff_eq!(rdms.dissimilarity(0, 1, 1).unwrap(), 0.0);
        // both sides given: neither overwrites the other
        assert_abs_diff_eq!(rdms.dissimilarity(1, 0, 1).unwrap(), 1.5);
        assert_abs_diff_eq!(rdms.dissimilarity(1, 1, 0).unwrap(), 1.25);
        assert!(rdms.dissimilarity(1, 0, 2).unwrap().is_nan());
    }

    #[test]
    fn header_only_file_is_empty() {
        let tmp = temp_csv("rdm,row,col,dissimilarity\n");
        let err = Rdms::<f32>::read_long(tmp.path()).unwrap_err();
        assert!(matches!(err, ResampleError::EmptyFile));
    }

    #[test]
    fn descriptor_table_parses_mixed_cells() {
        let tmp = temp_csv("subject,session\nsub-01,1\nsub-02,1\nsub-01,2\n");
        let table = read_descriptors(tmp.path()).unwrap();

        let sessions: Vec<DescriptorValue> = vec![1_i64.into(), 1_i64.into(), 2_i64.into()];
        assert_eq!(table.get("session"), Some(&sessions));
        assert_eq!(table.get("subject").map(Vec::len), Some(3));

        let mut rdms = Rdms::new(vec![vec![0.0_f64]; 3], 1).unwrap();
        for (name, values) in table {
            rdms.set_rdm_descriptor(&name, values).unwrap();
        }
        assert!(rdms.descriptor(Axis::Rdm, "subject").is_ok());
    }
}
