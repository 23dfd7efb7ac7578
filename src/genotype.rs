//!
//! Genotype matrix from PLINK `--recode A` output (`.raw`)
//!
//! ```text
//! FID IID PAT MAT SEX PHENOTYPE rs1_A rs2_G
//! f1  A   0   0   1   -9        1     0
//! f2  B   0   0   2   -9        2     NA
//! ```
//!
//! The first six columns are the pedigree prefix; every other column is the
//! additive genotype (0/1/2 copies of the counted allele) of one variant.
//! An IID may appear under several FIDs; each (FID, IID) pair must be unique.
//!
use crate::common::{Fid, Iid};
use crate::error::{Error, Result};
use crate::segment::reader::open_text_file;
use fnv::FnvHashMap as HashMap;
use log::debug;
use ndarray::Array2;
use std::io::BufRead;
use std::path::Path;

/// number of pedigree columns before the genotype columns
pub const N_PREFIX_COLUMNS: usize = 6;

/// position of the FID and IID columns in the prefix
const FID_COLUMN: usize = 0;
const IID_COLUMN: usize = 1;

/// stored value of a missing genotype
pub const MISSING: u8 = u8::MAX;

#[derive(Debug, Clone)]
pub struct GenotypeMatrix {
    fids: Vec<Fid>,
    iids: Vec<Iid>,
    /// IID -> rows of that IID (one per FID)
    rows: HashMap<Iid, Vec<usize>>,
    columns: Vec<String>,
    /// individuals x columns
    data: Array2<u8>,
}

fn parse_genotype(s: &str) -> Option<u8> {
    match s {
        "0" => Some(0),
        "1" => Some(1),
        "2" => Some(2),
        "NA" | "." | "-9" => Some(MISSING),
        _ => None,
    }
}

impl GenotypeMatrix {
    ///
    /// parse a whitespace separated `.raw` table
    ///
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(Error::MalformedGenotype {
                    line: 1,
                    reason: "empty file".to_owned(),
                })
            }
        };
        let header: Vec<&str> = header.split_whitespace().collect();
        if header.len() < N_PREFIX_COLUMNS || header[IID_COLUMN] != "IID" {
            return Err(Error::MalformedGenotype {
                line: 1,
                reason: format!(
                    "expected {} pedigree columns with IID second, found {:?}",
                    N_PREFIX_COLUMNS,
                    header.iter().take(N_PREFIX_COLUMNS).collect::<Vec<_>>()
                ),
            });
        }
        let columns: Vec<String> = header[N_PREFIX_COLUMNS..]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let n_columns = columns.len();

        let mut fids: Vec<Fid> = Vec::new();
        let mut iids: Vec<Iid> = Vec::new();
        let mut rows: HashMap<Iid, Vec<usize>> = HashMap::default();
        let mut values: Vec<u8> = Vec::new();
        for (i, line) in lines.enumerate() {
            let line_no = i + 2;
            let text = line?;
            let fields: Vec<&str> = text.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != N_PREFIX_COLUMNS + n_columns {
                return Err(Error::MalformedGenotype {
                    line: line_no,
                    reason: format!(
                        "expected {} columns, found {}",
                        N_PREFIX_COLUMNS + n_columns,
                        fields.len()
                    ),
                });
            }
            let fid = fields[FID_COLUMN];
            let iid = fields[IID_COLUMN];
            let same_iid = rows.entry(iid.to_owned()).or_insert_with(Vec::new);
            if same_iid.iter().any(|&row| fids[row] == fid) {
                return Err(Error::MalformedGenotype {
                    line: line_no,
                    reason: format!("duplicated individual FID={} IID={}", fid, iid),
                });
            }
            if !same_iid.is_empty() {
                debug!("IID {} appears under several FIDs", iid);
            }
            same_iid.push(iids.len());
            fids.push(fid.to_owned());
            iids.push(iid.to_owned());
            for field in &fields[N_PREFIX_COLUMNS..] {
                let value = parse_genotype(field).ok_or_else(|| Error::MalformedGenotype {
                    line: line_no,
                    reason: format!("invalid genotype `{}`", field),
                })?;
                values.push(value);
            }
        }
        let data = Array2::from_shape_vec((iids.len(), n_columns), values).map_err(|e| {
            Error::MalformedGenotype {
                line: 0,
                reason: e.to_string(),
            }
        })?;
        debug!("genotype matrix {} individuals x {} variants", iids.len(), n_columns);
        Ok(GenotypeMatrix {
            fids,
            iids,
            rows,
            columns,
            data,
        })
    }
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_text_file(path).map_err(|e| e.in_file(path))?;
        Self::from_reader(reader).map_err(|e| e.in_file(path))
    }
    pub fn n_individuals(&self) -> usize {
        self.iids.len()
    }
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
    /// IID of each row
    pub fn iids(&self) -> &[Iid] {
        &self.iids
    }
    /// FID of each row
    pub fn fids(&self) -> &[Fid] {
        &self.fids
    }
    /// genotype column headers, e.g. `rs1_A`
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    ///
    /// row indices of the IID, one per FID it appears under. Empty if the IID
    /// is not in the matrix.
    ///
    pub fn rows(&self, iid: &str) -> &[usize] {
        self.rows.get(iid).map_or(&[], |rows| rows.as_slice())
    }
    ///
    /// genotype of (individual, column). `None` if missing.
    ///
    pub fn genotype(&self, row: usize, column: usize) -> Option<u8> {
        match self.data[[row, column]] {
            MISSING => None,
            value => Some(value),
        }
    }
    ///
    /// Indices of the columns of `variant`: a header equal to the variant id
    /// or `<variant>_<allele>` as written by PLINK.
    ///
    pub fn columns_of_variant(&self, variant: &str) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column_variant(column) == variant || column.as_str() == variant)
            .map(|(i, _)| i)
            .collect()
    }
}

///
/// variant id part of a PLINK `.raw` column header (`rs1_A` -> `rs1`)
///
pub fn column_variant(column: &str) -> &str {
    match column.rfind('_') {
        Some(i) if i > 0 => &column[..i],
        _ => column,
    }
}
