//!
//! Carrier sets and population table
//!
//! ## Carrier file
//!
//! One individual per line. A line with a single token is an IID; a line with
//! two or more tokens is read as `FID IID ...` (PLINK keep-file convention).
//! A header line whose IID token is `IID` is skipped.
//!
//! ## Population table
//!
//! Whitespace separated table with a header containing `Pop` (1000 Genomes
//! population code) and `grid` (IID) columns.
//!
use crate::common::{Iid, Individual, VariantId};
use crate::error::{Error, Result};
use crate::segment::reader::open_text_file;
use fnv::FnvHashMap as HashMap;
use log::{info, warn};
use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;

///
/// Individuals confirmed to carry `variant`.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierSet {
    variant: VariantId,
    iids: BTreeSet<Iid>,
}

impl CarrierSet {
    pub fn new<I, S>(variant: &str, iids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Iid>,
    {
        CarrierSet {
            variant: variant.to_owned(),
            iids: iids.into_iter().map(|s| s.into()).collect(),
        }
    }
    pub fn variant(&self) -> &str {
        &self.variant
    }
    pub fn contains(&self, iid: &str) -> bool {
        self.iids.contains(iid)
    }
    pub fn len(&self) -> usize {
        self.iids.len()
    }
    pub fn is_empty(&self) -> bool {
        self.iids.is_empty()
    }
    /// carriers in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &Iid> + '_ {
        self.iids.iter()
    }
    ///
    /// parse carrier list
    ///
    pub fn from_reader<R: BufRead>(variant: &str, reader: R) -> Result<Self> {
        let mut iids = BTreeSet::new();
        for line in reader.lines() {
            let text = line?;
            let tokens: Vec<&str> = text.split_whitespace().collect();
            let iid = match tokens.len() {
                0 => continue,
                1 => tokens[0],
                _ => tokens[1],
            };
            if iid == "IID" {
                continue;
            }
            iids.insert(iid.to_owned());
        }
        Ok(CarrierSet {
            variant: variant.to_owned(),
            iids,
        })
    }
    pub fn from_file<P: AsRef<Path>>(variant: &str, path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_text_file(path).map_err(|e| e.in_file(path))?;
        Self::from_reader(variant, reader).map_err(|e| e.in_file(path))
    }
    ///
    /// Load the carrier set of a variant, failing with `MissingCarrierSet`
    /// when no file was given or the file lists nobody.
    ///
    pub fn load_required<P: AsRef<Path>>(variant: &str, path: Option<P>) -> Result<Self> {
        let missing = || Error::MissingCarrierSet {
            variant: variant.to_owned(),
        };
        let path = path.ok_or_else(missing)?;
        let carriers = Self::from_file(variant, path)?;
        if carriers.is_empty() {
            return Err(missing());
        }
        Ok(carriers)
    }
    ///
    /// keep only the carriers whose population is one of `pop_codes`
    ///
    pub fn restrict_to_populations(self, table: &PopulationTable, pop_codes: &[String]) -> Self {
        if pop_codes.is_empty() {
            return self;
        }
        let n_before = self.len();
        let iids: BTreeSet<Iid> = self
            .iids
            .into_iter()
            .filter(|iid| table.is_in_populations(iid, pop_codes))
            .collect();
        if iids.len() < n_before {
            info!(
                "{}: {} of {} carriers are outside populations {:?}",
                self.variant,
                n_before - iids.len(),
                n_before,
                pop_codes
            );
        }
        CarrierSet {
            variant: self.variant,
            iids,
        }
    }
}

///
/// IID -> Individual mapping read from the population table.
///
#[derive(Debug, Clone, Default)]
pub struct PopulationTable {
    individuals: HashMap<Iid, Individual>,
}

impl PopulationTable {
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Ok(PopulationTable::default()),
        };
        let columns: Vec<&str> = header.split_whitespace().collect();
        let position = |name: &str| {
            columns.iter().position(|&c| c == name).ok_or_else(|| {
                Error::InvalidConfig(format!("population table has no `{}` column", name))
            })
        };
        let pop_col = position("Pop")?;
        let grid_col = position("grid")?;
        let fid_col = columns.iter().position(|&c| c == "FID");

        let mut individuals = HashMap::default();
        for (i, line) in lines.enumerate() {
            let text = line?;
            let fields: Vec<&str> = text.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            match (fields.get(grid_col), fields.get(pop_col)) {
                (Some(&iid), Some(&pop)) => {
                    let fid = fid_col.and_then(|c| fields.get(c).copied());
                    individuals.insert(iid.to_owned(), Individual::new(iid, fid, pop));
                }
                _ => warn!("population table line {}: too few columns, skipped", i + 2),
            }
        }
        Ok(PopulationTable { individuals })
    }
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_text_file(path).map_err(|e| e.in_file(path))?;
        Self::from_reader(reader).map_err(|e| e.in_file(path))
    }
    pub fn get(&self, iid: &str) -> Option<&Individual> {
        self.individuals.get(iid)
    }
    pub fn len(&self) -> usize {
        self.individuals.len()
    }
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
    pub fn is_in_populations(&self, iid: &str, pop_codes: &[String]) -> bool {
        self.get(iid)
            .map_or(false, |individual| pop_codes.iter().any(|p| *p == individual.pop))
    }
}
