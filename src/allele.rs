//!
//! Allele counts per network
//!
//! For a network and a genotype column, the allele count is
//! `#(genotype == 1) + 2 * #(genotype == 2)` over the network members.
//! A network with neither 1 nor 2 in the column gives no record.
//!
use crate::common::{AlleleCount, NetworkId, VariantId};
use crate::genotype::GenotypeMatrix;
use crate::hist::Hist;
use crate::pedigree::PedigreeRow;
use fnv::FnvHashSet as HashSet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlleleCountRecord {
    #[serde(rename = "Network")]
    pub network: NetworkId,
    #[serde(rename = "Variant ID")]
    pub variant: VariantId,
    #[serde(rename = "Allele Count")]
    pub allele_count: AlleleCount,
}

///
/// number of heterozygous (1) and homozygous (2) genotypes among `rows` in
/// `column`; missing genotypes are ignored
///
pub fn count_genotypes(matrix: &GenotypeMatrix, rows: &[usize], column: usize) -> (u32, u32) {
    let mut n_het = 0;
    let mut n_hom = 0;
    for &row in rows {
        match matrix.genotype(row, column) {
            Some(1) => n_het += 1,
            Some(2) => n_hom += 1,
            _ => {}
        }
    }
    (n_het, n_hom)
}

///
/// Accumulates allele count records over pedigree rows.
///
/// Pass it along the rows (possibly of several membership files) and call
/// `finish` once to apply the last-wins deduplication.
///
#[derive(Debug, Clone, Default)]
pub struct AlleleCounter {
    records: Vec<AlleleCountRecord>,
    /// pedigree rows seen
    pub n_rows: usize,
    /// members listed in a network but absent from the genotype matrix
    pub n_missing_members: usize,
    /// rows whose variant has no dedicated column (all columns were scanned)
    pub n_unmatched_variants: usize,
}

impl AlleleCounter {
    pub fn new() -> Self {
        AlleleCounter::default()
    }
    ///
    /// count the alleles of one network
    ///
    pub fn add_row(&mut self, row: &PedigreeRow, matrix: &GenotypeMatrix) {
        self.n_rows += 1;
        let mut member_rows = Vec::with_capacity(row.members.len());
        for iid in row.members.iter() {
            let rows = matrix.rows(iid);
            if rows.is_empty() {
                debug!("{} {}: {} is not in the genotype matrix", row.variant, row.network, iid);
                self.n_missing_members += 1;
            }
            // an IID listed under several FIDs counts once per row
            member_rows.extend_from_slice(rows);
        }

        let mut columns = matrix.columns_of_variant(&row.variant);
        if columns.is_empty() {
            warn!(
                "{}: no genotype column for the variant, scanning all {} columns",
                row.variant,
                matrix.n_columns()
            );
            self.n_unmatched_variants += 1;
            columns = (0..matrix.n_columns()).collect();
        }

        for column in columns {
            let (n_het, n_hom) = count_genotypes(matrix, &member_rows, column);
            if n_het + n_hom == 0 {
                continue;
            }
            self.records.push(AlleleCountRecord {
                network: row.network.clone(),
                variant: row.variant.clone(),
                allele_count: n_het + 2 * n_hom,
            });
        }
    }
    pub fn add_rows(&mut self, rows: &[PedigreeRow], matrix: &GenotypeMatrix) {
        for row in rows {
            self.add_row(row, matrix);
        }
    }
    /// records so far, before deduplication
    pub fn records(&self) -> &[AlleleCountRecord] {
        &self.records
    }
    ///
    /// deduplicated records
    ///
    pub fn finish(self) -> Vec<AlleleCountRecord> {
        if self.n_missing_members > 0 {
            warn!(
                "{} network members have no genotypes and were not counted",
                self.n_missing_members
            );
        }
        dedup_last_wins(self.records)
    }
}

///
/// Count alleles of every pedigree row and deduplicate.
///
pub fn aggregate(rows: &[PedigreeRow], matrix: &GenotypeMatrix) -> Vec<AlleleCountRecord> {
    let mut counter = AlleleCounter::new();
    counter.add_rows(rows, matrix);
    counter.finish()
}

///
/// Keep only the last record of each (network, variant) key, at the position
/// of that last record.
///
pub fn dedup_last_wins(records: Vec<AlleleCountRecord>) -> Vec<AlleleCountRecord> {
    let mut seen: HashSet<(NetworkId, VariantId)> = HashSet::default();
    let mut kept: Vec<AlleleCountRecord> = records
        .into_iter()
        .rev()
        .filter(|r| seen.insert((r.network.clone(), r.variant.clone())))
        .collect();
    kept.reverse();
    kept
}

///
/// number of networks for each distinct allele count, sorted by allele count
///
pub fn group_by_allele_count(records: &[AlleleCountRecord]) -> Vec<(AlleleCount, usize)> {
    Hist::from_values(records.iter().map(|r| r.allele_count as usize))
        .iter()
        .map(|(count, n_networks)| (count as AlleleCount, n_networks))
        .collect()
}
