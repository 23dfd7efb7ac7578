//!
//! Run configuration
//!
//! ```text
//! {
//!   "min_cm": 3.0,
//!   "threads": 3,
//!   "programs": ["ilash", "hapibd"],
//!   "pop_codes": ["EUR"],
//!   "pop_info": "pop_info.txt",
//!   "variants": [
//!     {
//!       "variant": "rs12345",
//!       "carriers": "carriers/rs12345.txt",
//!       "segments": [
//!         { "program": "ilash", "path": "ilash/rs12345.match.gz" },
//!         { "program": "hapibd", "path": "hapibd/rs12345.ibd.gz" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
use crate::common::VariantId;
use crate::error::{Error, Result};
use crate::segment::reader::find_segment_files;
use crate::segment::schema::IbdProgram;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// default minimum segment length in centimorgans
pub const DEFAULT_MIN_CM: f64 = 3.0;

/// default size of the worker pool
pub const DEFAULT_THREADS: usize = 3;

///
/// One IBD segment file of a variant.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSource {
    pub program: IbdProgram,
    pub path: PathBuf,
}

///
/// Inputs for a single variant of interest.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantInput {
    pub variant: VariantId,
    /// carrier list (one IID per line). `None` means no carrier analysis was
    /// done for this variant, which fails the variant.
    pub carriers: Option<PathBuf>,
    #[serde(default)]
    pub segments: Vec<SegmentSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// minimum shared segment length (cM)
    pub min_cm: f64,
    /// number of worker threads
    pub threads: usize,
    /// IBD programs to use. Segment sources of other programs are ignored.
    pub programs: Vec<IbdProgram>,
    /// population codes to keep. Empty keeps every carrier.
    pub pop_codes: Vec<String>,
    /// population table with `Pop` and `grid` columns
    pub pop_info: Option<PathBuf>,
    pub variants: Vec<VariantInput>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_cm: DEFAULT_MIN_CM,
            threads: DEFAULT_THREADS,
            programs: vec![IbdProgram::Ilash, IbdProgram::HapIbd],
            pop_codes: Vec::new(),
            pop_info: None,
            variants: Vec::new(),
        }
    }
}

impl Config {
    ///
    /// load config from JSON file
    ///
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .map_err(|e| Error::from(e).in_file(path.as_ref()))?;
        let reader = std::io::BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .map_err(|e| Error::from(e).in_file(path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }
    ///
    /// write config as pretty JSON
    ///
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
    ///
    /// check value ranges
    ///
    pub fn validate(&self) -> Result<()> {
        if !self.min_cm.is_finite() || self.min_cm < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_cm must be a non-negative number, got {}",
                self.min_cm
            )));
        }
        if self.threads == 0 {
            return Err(Error::InvalidConfig("threads must be at least 1".to_owned()));
        }
        if self.programs.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one IBD program is required".to_owned(),
            ));
        }
        if !self.pop_codes.is_empty() && self.pop_info.is_none() {
            return Err(Error::InvalidConfig(
                "pop_codes given without a pop_info table".to_owned(),
            ));
        }
        Ok(())
    }
    /// true if segments of `program` are used in this run
    pub fn uses_program(&self, program: IbdProgram) -> bool {
        self.programs.contains(&program)
    }
    ///
    /// Add the `program` files of `dir` whose name contains the variant id to
    /// the sources of each variant. Already listed files are not added twice.
    /// Returns the number of sources added.
    ///
    pub fn discover_sources<P: AsRef<Path>>(
        &mut self,
        program: IbdProgram,
        dir: P,
    ) -> Result<usize> {
        let files =
            find_segment_files(dir.as_ref(), program).map_err(|e| e.in_file(dir.as_ref()))?;
        let mut n_added = 0;
        for input in self.variants.iter_mut() {
            let matching = files.iter().filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map_or(false, |name| name.contains(input.variant.as_str()))
            });
            for path in matching {
                if input.segments.iter().any(|s| &s.path == path) {
                    continue;
                }
                input.segments.push(SegmentSource {
                    program,
                    path: path.clone(),
                });
                n_added += 1;
            }
            if input.segments.iter().all(|s| s.program != program) {
                warn!(
                    "{}: no {} file in {}",
                    input.variant,
                    program,
                    dir.as_ref().display()
                );
            }
        }
        info!(
            "found {} {} files in {}",
            n_added,
            program,
            dir.as_ref().display()
        );
        Ok(n_added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let c = Config::default();
        assert_eq!(c.min_cm, 3.0);
        assert_eq!(c.threads, 3);
        assert!(c.uses_program(IbdProgram::Ilash));
        assert!(c.uses_program(IbdProgram::HapIbd));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let json = r#"{
            "min_cm": 5,
            "programs": ["hapibd"],
            "variants": [
                {
                    "variant": "rs1",
                    "carriers": "c.txt",
                    "segments": [{"program": "hapibd", "path": "rs1.ibd.gz"}]
                }
            ]
        }"#;
        let c: Config = serde_json::from_str(json).unwrap();
        assert_eq!(c.min_cm, 5.0);
        assert_eq!(c.threads, 3);
        assert!(!c.uses_program(IbdProgram::Ilash));
        assert_eq!(c.variants.len(), 1);
        assert_eq!(c.variants[0].segments[0].program, IbdProgram::HapIbd);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn invalid_values() {
        let mut c = Config::default();
        c.threads = 0;
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));

        let mut c = Config::default();
        c.min_cm = -1.0;
        assert!(c.validate().is_err());

        let mut c = Config::default();
        c.pop_codes = vec!["EUR".to_owned()];
        assert!(c.validate().is_err());
    }

    #[test]
    fn discover_sources_by_variant_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["rs1_chr1.match.gz", "rs2_chr2.match.gz", "rs1.ibd.gz", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let mut c = Config::default();
        for variant in ["rs1", "rs2", "rs3"] {
            c.variants.push(VariantInput {
                variant: variant.to_owned(),
                carriers: None,
                segments: vec![],
            });
        }
        assert_eq!(c.discover_sources(IbdProgram::Ilash, dir.path()).unwrap(), 2);
        assert_eq!(c.variants[0].segments.len(), 1);
        assert_eq!(
            c.variants[0].segments[0].path,
            dir.path().join("rs1_chr1.match.gz")
        );
        assert!(c.variants[2].segments.is_empty());
        // rerun adds nothing
        assert_eq!(c.discover_sources(IbdProgram::Ilash, dir.path()).unwrap(), 0);
        assert_eq!(c.discover_sources(IbdProgram::HapIbd, dir.path()).unwrap(), 1);
        assert_eq!(c.variants[0].segments[1].program, IbdProgram::HapIbd);
    }

    #[test]
    fn json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut c = Config::default();
        c.min_cm = 7.5;
        c.variants.push(VariantInput {
            variant: "rs9".to_owned(),
            carriers: Some(PathBuf::from("rs9.txt")),
            segments: vec![],
        });
        c.to_json_file(&path).unwrap();
        let d = Config::from_json_file(&path).unwrap();
        assert_eq!(c, d);
    }
}
