//!
//! Whole run: segment sources -> carrier graphs -> networks -> allele counts
//!
//! Segment sources and variants are processed on a bounded rayon pool of
//! `Config::threads` workers. Every source and every variant is independent:
//! a failed source is reported as `SourceFailure` and the variant goes on with
//! the other sources, a failed variant is reported as `VariantFailure` next to
//! the variants that succeeded. A variant with no readable source at all fails
//! with `MissingSegments`.
//!
use crate::allele::{group_by_allele_count, AlleleCounter};
use crate::carrier::{CarrierSet, PopulationTable};
use crate::common::VariantId;
use crate::config::{Config, SegmentSource, VariantInput};
use crate::error::{Error, Result, SourceFailure, VariantFailure};
use crate::genotype::GenotypeMatrix;
use crate::graph::{BuildStats, CarrierGraph};
use crate::network::{partition, CarrierTally, Network};
use crate::output::{
    create_output, write_allele_counts, write_carrier_tally, write_grouped_allele_counts,
    write_network_edges, ALLELE_COUNT_FILE, CARRIER_TALLY_FILE, GROUPED_ALLELE_COUNT_FILE,
    NETWORKS_FILE, NETWORK_EDGES_FILE,
};
use crate::pedigree::{
    check_unique_membership, read_membership_file, rows_from_networks, write_membership,
    PedigreeRow,
};
use crate::segment::filter::{filter_by_length, merge};
use crate::segment::reader::{read_segment_file, SegmentBatch};
use crate::segment::SegmentRecord;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::Path;

///
/// worker pool with `n_threads` named threads
///
pub fn build_thread_pool(n_threads: usize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("ibdnet-{}", i))
        .build()?;
    Ok(pool)
}

///
/// Segment batches of the sources that could be read, and the failures of the
/// others.
///
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub batches: Vec<SegmentBatch>,
    pub failures: Vec<SourceFailure>,
}

impl LoadedSources {
    pub fn n_records(&self) -> usize {
        self.batches.iter().map(|b| b.records.len()).sum()
    }
    pub fn n_skipped(&self) -> usize {
        self.batches.iter().map(|b| b.n_skipped).sum()
    }
}

///
/// Read the sources of the programs used by `config`, one task per source.
///
/// Returns after every task has finished. Batches keep the order of `sources`.
///
pub fn load_sources(sources: &[SegmentSource], config: &Config) -> LoadedSources {
    let results: Vec<std::result::Result<SegmentBatch, SourceFailure>> = sources
        .par_iter()
        .filter(|source| {
            let used = config.uses_program(source.program);
            if !used {
                debug!("ignoring {} ({})", source.path.display(), source.program);
            }
            used
        })
        .map(|source| {
            read_segment_file(&source.path, source.program).map_err(|e| SourceFailure {
                program: source.program,
                path: source.path.clone(),
                source: e,
            })
        })
        .collect();

    let mut loaded = LoadedSources::default();
    for result in results {
        match result {
            Ok(batch) => loaded.batches.push(batch),
            Err(failure) => {
                warn!("{}", failure);
                loaded.failures.push(failure);
            }
        }
    }
    loaded
}

///
/// Segments of all batches at least `min_cm` long, merged across programs.
///
pub fn qualifying_segments(batches: Vec<SegmentBatch>, min_cm: f64) -> Vec<SegmentRecord> {
    merge(
        batches
            .into_iter()
            .map(|batch| filter_by_length(batch.records, min_cm)),
    )
}

///
/// Networks of one variant with what was dropped on the way.
///
#[derive(Debug)]
pub struct VariantNetworks {
    pub variant: VariantId,
    pub graph: CarrierGraph,
    pub networks: Vec<Network>,
    pub build_stats: BuildStats,
    /// segments passing the length threshold after merging
    pub n_segments: usize,
    /// malformed segment rows skipped while reading
    pub n_skipped_rows: usize,
    pub source_failures: Vec<SourceFailure>,
}

///
/// Carrier set of a variant, restricted to the configured populations.
///
pub fn load_carriers(
    input: &VariantInput,
    config: &Config,
    populations: Option<&PopulationTable>,
) -> Result<CarrierSet> {
    let mut carriers = CarrierSet::load_required(&input.variant, input.carriers.as_ref())?;
    if let Some(table) = populations {
        carriers = carriers.restrict_to_populations(table, &config.pop_codes);
        if carriers.is_empty() {
            return Err(Error::MissingCarrierSet {
                variant: input.variant.clone(),
            });
        }
    }
    Ok(carriers)
}

///
/// Build the carrier graph and the networks of one variant.
///
pub fn run_variant(
    input: &VariantInput,
    config: &Config,
    populations: Option<&PopulationTable>,
) -> Result<VariantNetworks> {
    let carriers = load_carriers(input, config, populations)?;
    let loaded = load_sources(&input.segments, config);
    let n_skipped_rows = loaded.n_skipped();
    info!(
        "{}: {} carriers, {} segments from {} sources ({} failed)",
        input.variant,
        carriers.len(),
        loaded.n_records(),
        loaded.batches.len(),
        loaded.failures.len()
    );

    if loaded.batches.is_empty() {
        return Err(Error::MissingSegments {
            variant: input.variant.clone(),
            failures: loaded.failures,
        });
    }

    let segments = qualifying_segments(loaded.batches, config.min_cm);
    let (graph, build_stats) = CarrierGraph::build(&carriers, &segments);
    let networks = partition(&graph);
    Ok(VariantNetworks {
        variant: input.variant.clone(),
        graph,
        networks,
        build_stats,
        n_segments: segments.len(),
        n_skipped_rows,
        source_failures: loaded.failures,
    })
}

///
/// Networks of every variant of a run.
///
#[derive(Debug, Default)]
pub struct NetworkRun {
    /// successful variants, in config order
    pub variants: Vec<VariantNetworks>,
    pub failures: Vec<VariantFailure>,
    pub tally: CarrierTally,
}

impl NetworkRun {
    /// membership rows of all networks of all successful variants
    pub fn pedigree_rows(&self) -> Vec<PedigreeRow> {
        self.variants
            .iter()
            .flat_map(|v| rows_from_networks(&v.networks))
            .collect()
    }
}

///
/// Run every variant of `config` on a pool of `config.threads` workers.
///
/// Only configuration errors (invalid values, unreadable population table,
/// pool creation) fail the whole run.
///
pub fn build_networks(config: &Config) -> Result<NetworkRun> {
    config.validate()?;
    let populations = match &config.pop_info {
        Some(path) if !config.pop_codes.is_empty() => Some(PopulationTable::from_file(path)?),
        _ => None,
    };
    let pool = build_thread_pool(config.threads)?;

    let results: Vec<std::result::Result<VariantNetworks, VariantFailure>> = pool.install(|| {
        config
            .variants
            .par_iter()
            .map(|input| {
                run_variant(input, config, populations.as_ref()).map_err(|source| {
                    VariantFailure {
                        variant: input.variant.clone(),
                        source,
                    }
                })
            })
            .collect()
    });

    let mut run = NetworkRun::default();
    for result in results {
        match result {
            Ok(v) => {
                run.tally.record(&v.variant, &v.networks);
                run.variants.push(v);
            }
            Err(failure) => {
                error!("{}", failure);
                run.failures.push(failure);
            }
        }
    }
    info!(
        "{} variants done, {} failed",
        run.variants.len(),
        run.failures.len()
    );
    Ok(run)
}

///
/// Write `networks.csv`, `network_edges.csv` and `carriers_in_networks.csv`.
///
pub fn write_network_outputs<P: AsRef<Path>>(
    run: &NetworkRun,
    out_dir: P,
) -> Result<Vec<PedigreeRow>> {
    let out_dir = out_dir.as_ref();
    let rows = run.pedigree_rows();
    check_unique_membership(&rows)?;
    write_membership(&rows, create_output(out_dir, NETWORKS_FILE)?)?;

    let mut edges = create_output(out_dir, NETWORK_EDGES_FILE)?;
    for (i, v) in run.variants.iter().enumerate() {
        write_network_edges(&v.graph, &mut edges, i == 0)?;
    }

    write_carrier_tally(&run.tally, create_output(out_dir, CARRIER_TALLY_FILE)?)?;
    Ok(rows)
}

///
/// Report of the allele count step.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlleleSummary {
    /// pedigree rows counted
    pub n_rows: usize,
    /// pedigree rows that could not be parsed
    pub n_malformed_rows: usize,
    /// network members absent from the genotype matrix
    pub n_missing_members: usize,
    /// rows whose variant had no genotype column
    pub n_unmatched_variants: usize,
    /// allele count records after deduplication
    pub n_records: usize,
    /// distinct allele counts
    pub n_groups: usize,
}

///
/// Count alleles of `rows` and write `allele_count.csv` and
/// `grouped_allele_counts.csv`.
///
pub fn count_alleles<P: AsRef<Path>>(
    rows: &[PedigreeRow],
    matrix: &GenotypeMatrix,
    out_dir: P,
) -> Result<AlleleSummary> {
    let out_dir = out_dir.as_ref();
    let mut counter = AlleleCounter::new();
    counter.add_rows(rows, matrix);
    let mut summary = AlleleSummary {
        n_rows: counter.n_rows,
        n_missing_members: counter.n_missing_members,
        n_unmatched_variants: counter.n_unmatched_variants,
        ..AlleleSummary::default()
    };
    let records = counter.finish();
    let groups = group_by_allele_count(&records);
    summary.n_records = records.len();
    summary.n_groups = groups.len();

    write_allele_counts(&records, create_output(out_dir, ALLELE_COUNT_FILE)?)?;
    write_grouped_allele_counts(&groups, create_output(out_dir, GROUPED_ALLELE_COUNT_FILE)?)?;
    info!(
        "{} allele count records from {} networks ({} distinct counts)",
        summary.n_records, summary.n_rows, summary.n_groups
    );
    Ok(summary)
}

///
/// Allele counts from a membership file (either format) and a `.raw` matrix.
///
pub fn count_alleles_from_files<P, Q, R>(
    membership: P,
    genotypes: Q,
    out_dir: R,
) -> Result<AlleleSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let membership = read_membership_file(membership)?;
    let matrix = GenotypeMatrix::from_file(genotypes)?;
    let mut summary = count_alleles(&membership.rows, &matrix, out_dir)?;
    summary.n_malformed_rows = membership.n_malformed;
    Ok(summary)
}

///
/// Result of `run`.
///
#[derive(Debug)]
pub struct RunReport {
    pub networks: NetworkRun,
    /// `None` when no genotype matrix was given
    pub alleles: Option<AlleleSummary>,
}

///
/// Build networks of every variant, write them, and count alleles if a
/// genotype matrix is given.
///
pub fn run<P: AsRef<Path>>(
    config: &Config,
    genotypes: Option<&Path>,
    out_dir: P,
) -> Result<RunReport> {
    let out_dir = out_dir.as_ref();
    let networks = build_networks(config)?;
    let rows = write_network_outputs(&networks, out_dir)?;
    let alleles = match genotypes {
        Some(path) => {
            let matrix = GenotypeMatrix::from_file(path)?;
            Some(count_alleles(&rows, &matrix, out_dir)?)
        }
        None => None,
    };
    Ok(RunReport { networks, alleles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::schema::IbdProgram;
    use std::path::PathBuf;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn failed_source_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(
            dir.path(),
            "rs1.ibd",
            "A\t1\tB\t2\t1\t1000\t5000\t4.0\nB\t1\tC\t2\t1\t1000\t5000\t1.0\n",
        );
        let sources = vec![
            SegmentSource {
                program: IbdProgram::Ilash,
                path: dir.path().join("missing.match.gz"),
            },
            SegmentSource {
                program: IbdProgram::HapIbd,
                path: good,
            },
        ];
        let pool = build_thread_pool(2).unwrap();
        let loaded = pool.install(|| load_sources(&sources, &Config::default()));
        assert_eq!(loaded.batches.len(), 1);
        assert_eq!(loaded.failures.len(), 1);
        assert_eq!(loaded.failures[0].program, IbdProgram::Ilash);
        assert_eq!(loaded.n_records(), 2);

        let segments = qualifying_segments(loaded.batches, 3.0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].unordered_pair(), ("A", "B"));
    }

    #[test]
    fn unused_program_is_not_read() {
        let sources = vec![SegmentSource {
            program: IbdProgram::Ilash,
            path: PathBuf::from("does/not/exist.match.gz"),
        }];
        let mut config = Config::default();
        config.programs = vec![IbdProgram::HapIbd];
        let loaded = load_sources(&sources, &config);
        assert!(loaded.batches.is_empty());
        assert!(loaded.failures.is_empty());
    }

    #[test]
    fn missing_carriers_fail_only_that_variant() {
        let dir = tempfile::tempdir().unwrap();
        let carriers = write(dir.path(), "rs1.txt", "A\nB\nC\n");
        let segments = write(dir.path(), "rs1.ibd", "A\t1\tB\t2\t1\t1000\t5000\t4.0\n");
        let mut config = Config::default();
        config.threads = 2;
        config.variants = vec![
            VariantInput {
                variant: "rs1".to_owned(),
                carriers: Some(carriers),
                segments: vec![SegmentSource {
                    program: IbdProgram::HapIbd,
                    path: segments,
                }],
            },
            VariantInput {
                variant: "rs2".to_owned(),
                carriers: None,
                segments: vec![],
            },
        ];
        let run = build_networks(&config).unwrap();
        assert_eq!(run.variants.len(), 1);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].variant, "rs2");
        assert!(matches!(
            run.failures[0].source,
            Error::MissingCarrierSet { .. }
        ));

        let v = &run.variants[0];
        assert_eq!(v.networks.len(), 2);
        assert_eq!(v.networks[0].members(), &["A".to_owned(), "B".to_owned()]);
        let row = run.tally.get("rs1").unwrap();
        assert_eq!(row.n_carriers, 3);
        assert_eq!(row.n_in_networks, 2);
        assert!(run.tally.get("rs2").is_none());
    }

    #[test]
    fn variant_without_readable_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let carriers = write(dir.path(), "rs1.txt", "A\nB\n");
        let no_sources = VariantInput {
            variant: "rs1".to_owned(),
            carriers: Some(carriers.clone()),
            segments: vec![],
        };
        let all_broken = VariantInput {
            variant: "rs2".to_owned(),
            carriers: Some(carriers),
            segments: vec![
                SegmentSource {
                    program: IbdProgram::Ilash,
                    path: dir.path().join("rs2.match.gz"),
                },
                SegmentSource {
                    program: IbdProgram::HapIbd,
                    path: dir.path().join("rs2.ibd.gz"),
                },
            ],
        };
        let mut config = Config::default();
        config.threads = 2;
        config.variants = vec![no_sources, all_broken];

        let run = build_networks(&config).unwrap();
        assert!(run.variants.is_empty());
        assert!(run.tally.get("rs1").is_none());
        assert!(run.tally.get("rs2").is_none());
        assert_eq!(run.failures.len(), 2);
        assert_eq!(run.failures[0].variant, "rs1");
        assert!(matches!(
            &run.failures[0].source,
            Error::MissingSegments { failures, .. } if failures.is_empty()
        ));
        assert_eq!(run.failures[1].variant, "rs2");
        match &run.failures[1].source {
            Error::MissingSegments { variant, failures } => {
                assert_eq!(variant, "rs2");
                assert_eq!(failures.len(), 2);
            }
            other => panic!("expected MissingSegments, got {:?}", other),
        }
    }

    #[test]
    fn population_restriction() {
        let dir = tempfile::tempdir().unwrap();
        let pop_info = write(dir.path(), "pop.txt", "grid Pop\nA EUR\nB EUR\nC AFR\n");
        let carriers = write(dir.path(), "rs1.txt", "A\nB\nC\n");
        let mut config = Config::default();
        config.pop_codes = vec!["EUR".to_owned()];
        config.pop_info = Some(pop_info);
        let table = PopulationTable::from_file(config.pop_info.as_ref().unwrap()).unwrap();
        let input = VariantInput {
            variant: "rs1".to_owned(),
            carriers: Some(carriers),
            segments: vec![],
        };
        let set = load_carriers(&input, &config, Some(&table)).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.contains("C"));

        config.pop_codes = vec!["EAS".to_owned()];
        assert!(matches!(
            load_carriers(&input, &config, Some(&table)),
            Err(Error::MissingCarrierSet { .. })
        ));
    }
}
