//!
//! Column layouts of IBD detection programs
//!
//! ## iLASH (`.match.gz`)
//!
//! ```text
//! FID1 IID1 FID2 IID2 chr start end snp_start snp_end length_cM score
//! ```
//!
//! ## hap-IBD (`.ibd.gz`)
//!
//! ```text
//! sample1 hap1 sample2 hap2 chr start end length_cM
//! ```
//!
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

///
/// IBD detection program that produced a segment file.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IbdProgram {
    #[serde(rename = "ilash")]
    Ilash,
    #[serde(rename = "hapibd")]
    HapIbd,
}

///
/// Zero-origin column positions of the required fields.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSchema {
    pub id_a: usize,
    pub id_b: usize,
    pub chrom: usize,
    pub start: usize,
    pub end: usize,
    pub length_cm: usize,
}

impl SegmentSchema {
    /// minimum number of columns a row needs
    pub fn n_required_columns(&self) -> usize {
        [
            self.id_a,
            self.id_b,
            self.chrom,
            self.start,
            self.end,
            self.length_cm,
        ]
        .iter()
        .max()
        .map_or(0, |&i| i + 1)
    }
}

const ILASH_SCHEMA: SegmentSchema = SegmentSchema {
    id_a: 1,
    id_b: 3,
    chrom: 4,
    start: 5,
    end: 6,
    length_cm: 9,
};

const HAPIBD_SCHEMA: SegmentSchema = SegmentSchema {
    id_a: 0,
    id_b: 2,
    chrom: 4,
    start: 5,
    end: 6,
    length_cm: 7,
};

impl IbdProgram {
    pub fn all() -> [IbdProgram; 2] {
        [IbdProgram::Ilash, IbdProgram::HapIbd]
    }
    pub fn name(&self) -> &'static str {
        match self {
            IbdProgram::Ilash => "ilash",
            IbdProgram::HapIbd => "hapibd",
        }
    }
    /// file suffix of the (compressed) segment files
    pub fn suffix(&self) -> &'static str {
        match self {
            IbdProgram::Ilash => ".match.gz",
            IbdProgram::HapIbd => ".ibd.gz",
        }
    }
    pub fn schema(&self) -> SegmentSchema {
        match self {
            IbdProgram::Ilash => ILASH_SCHEMA,
            IbdProgram::HapIbd => HAPIBD_SCHEMA,
        }
    }
    /// true if `filename` is a segment file of this program,
    /// either gzipped or already decompressed.
    pub fn matches_filename(&self, filename: &str) -> bool {
        let suffix = self.suffix();
        filename.ends_with(suffix) || filename.ends_with(suffix.trim_end_matches(".gz"))
    }
}

impl std::fmt::Display for IbdProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for IbdProgram {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ilash" => Ok(IbdProgram::Ilash),
            "hapibd" | "hap-ibd" => Ok(IbdProgram::HapIbd),
            _ => Err(Error::UnknownProgram(s.to_owned())),
        }
    }
}
