//!
//! IBD segment records
//!
//! * `schema`: per-program column layouts
//! * `reader`: lazy parsing of segment files
//! * `filter`: length threshold and merging across programs
//!
pub mod filter;
pub mod reader;
pub mod schema;

use crate::common::Iid;
use crate::error::{Error, Result};
use schema::IbdProgram;

///
/// A shared IBD segment between two individuals reported by one program.
///
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    id_a: Iid,
    id_b: Iid,
    program: IbdProgram,
    length_cm: f64,
    chrom: String,
    start: u64,
    end: u64,
}

impl SegmentRecord {
    ///
    /// Create a segment. `length_cm` must be finite and non-negative.
    ///
    pub fn new(
        id_a: &str,
        id_b: &str,
        program: IbdProgram,
        length_cm: f64,
        chrom: &str,
        start: u64,
        end: u64,
    ) -> Result<Self> {
        if !length_cm.is_finite() || length_cm < 0.0 {
            return Err(Error::MalformedRecord {
                line: 0,
                reason: format!("invalid segment length {}", length_cm),
            });
        }
        Ok(SegmentRecord {
            id_a: id_a.to_owned(),
            id_b: id_b.to_owned(),
            program,
            length_cm,
            chrom: chrom.to_owned(),
            start,
            end,
        })
    }
    pub fn id_a(&self) -> &str {
        &self.id_a
    }
    pub fn id_b(&self) -> &str {
        &self.id_b
    }
    pub fn program(&self) -> IbdProgram {
        self.program
    }
    pub fn length_cm(&self) -> f64 {
        self.length_cm
    }
    pub fn chrom(&self) -> &str {
        &self.chrom
    }
    pub fn start(&self) -> u64 {
        self.start
    }
    pub fn end(&self) -> u64 {
        self.end
    }
    /// pair of ids in sorted order
    pub fn unordered_pair(&self) -> (&str, &str) {
        if self.id_a <= self.id_b {
            (&self.id_a, &self.id_b)
        } else {
            (&self.id_b, &self.id_a)
        }
    }
    pub fn is_self_pair(&self) -> bool {
        self.id_a == self.id_b
    }
}

impl std::fmt::Display for SegmentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // chromosome names may already carry the prefix
        let prefix = if self.chrom.starts_with("chr") { "" } else { "chr" };
        write!(
            f,
            "{}\t{}\t{}\t{}{}:{}-{}\t{}cM",
            self.program,
            self.id_a,
            self.id_b,
            prefix,
            self.chrom,
            self.start,
            self.end,
            self.length_cm
        )
    }
}
