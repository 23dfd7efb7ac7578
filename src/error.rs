//!
//! Error types
//!
//! Per-record errors (`MalformedRecord`, `InvalidEdge`, `MalformedPedigreeRow`) are
//! recovered by the caller (skip and count). Per-variant errors are wrapped into
//! `VariantFailure` by the pipeline so sibling variants keep running.
//!
use crate::segment::schema::IbdProgram;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed segment record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("invalid edge {id_a} -- {id_b}: {reason}")]
    InvalidEdge {
        id_a: String,
        id_b: String,
        reason: String,
    },

    #[error("malformed pedigree row {row}: {reason}")]
    MalformedPedigreeRow { row: usize, reason: String },

    #[error("no carrier set for variant {variant}")]
    MissingCarrierSet { variant: String },

    #[error(
        "no segment source could be read for variant {variant} ({} failed)",
        .failures.len()
    )]
    MissingSegments {
        variant: String,
        failures: Vec<SourceFailure>,
    },

    #[error("malformed genotype matrix at line {line}: {reason}")]
    MalformedGenotype { line: usize, reason: String },

    #[error("unknown IBD program `{0}` (expected `ilash` or `hapibd`)")]
    UnknownProgram(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// attach the path of the file being processed
    pub fn in_file<P: Into<PathBuf>>(self, path: P) -> Error {
        Error::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
    /// true if the error only concerns a single row/record
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MalformedRecord { .. }
                | Error::InvalidEdge { .. }
                | Error::MalformedPedigreeRow { .. }
        )
    }
}

///
/// Failure of a whole variant run, with the variant identity attached.
///
#[derive(Debug, thiserror::Error)]
#[error("variant {variant} failed: {source}")]
pub struct VariantFailure {
    pub variant: String,
    #[source]
    pub source: Error,
}

///
/// Failure of one segment source. The other sources of the variant are still
/// used.
///
#[derive(Debug, thiserror::Error)]
#[error("{program} segment source failed: {source}")]
pub struct SourceFailure {
    pub program: IbdProgram,
    pub path: PathBuf,
    #[source]
    pub source: Error,
}

pub type Result<T> = std::result::Result<T, Error>;
