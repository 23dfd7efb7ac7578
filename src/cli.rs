//!
//! Command line interface of the `ibdnet` binary
//!
//! ```text
//! ibdnet run config.json -o out/ --genotypes merged.raw
//! ibdnet networks config.json -o out/ --min-cm 5 --program hapibd
//! ibdnet allele-count out/networks.csv merged.raw -o out/
//! ```
//!
use crate::config::Config;
use crate::error::Result;
use crate::graph::utils::to_node_list;
use crate::pipeline::{self, AlleleSummary, NetworkRun};
use crate::segment::schema::IbdProgram;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, about, version)]
pub struct Opts {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build carrier networks of every variant and count alleles per network
    Run {
        /// Run configuration JSON
        config: PathBuf,
        #[clap(flatten)]
        overrides: ConfigOverrides,
        /// PLINK `--recode A` genotype matrix (.raw). Allele counting is
        /// skipped if not given.
        #[clap(short, long)]
        genotypes: Option<PathBuf>,
        /// Output directory
        #[clap(short, long)]
        output_dir: PathBuf,
    },
    /// Build carrier networks of every variant only
    Networks {
        /// Run configuration JSON
        config: PathBuf,
        #[clap(flatten)]
        overrides: ConfigOverrides,
        /// Output directory
        #[clap(short, long)]
        output_dir: PathBuf,
    },
    /// Count alleles per network from a membership CSV
    AlleleCount {
        /// Network membership CSV (`Variant,Network,IID` or the tuple/list format)
        membership: PathBuf,
        /// PLINK `--recode A` genotype matrix (.raw)
        genotypes: PathBuf,
        /// Output directory
        #[clap(short, long)]
        output_dir: PathBuf,
    },
}

///
/// Command line values replacing those of the config file.
///
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Minimum shared segment length in cM
    #[clap(long)]
    pub min_cm: Option<f64>,
    /// Number of worker threads
    #[clap(short = 't', long)]
    pub threads: Option<usize>,
    /// IBD program to use (`ilash` or `hapibd`). Can be repeated.
    #[clap(long = "program")]
    pub programs: Vec<IbdProgram>,
    /// Population code to keep. Can be repeated.
    #[clap(long = "pop-code")]
    pub pop_codes: Vec<String>,
    /// Population table with `Pop` and `grid` columns
    #[clap(long)]
    pub pop_info: Option<PathBuf>,
    /// Directory of iLASH `.match.gz` files, matched to variants by file name
    #[clap(long)]
    pub ilash_dir: Option<PathBuf>,
    /// Directory of hap-IBD `.ibd.gz` files, matched to variants by file name
    #[clap(long)]
    pub hapibd_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(min_cm) = self.min_cm {
            config.min_cm = min_cm;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if !self.programs.is_empty() {
            config.programs = self.programs.clone();
        }
        if !self.pop_codes.is_empty() {
            config.pop_codes = self.pop_codes.clone();
        }
        if let Some(pop_info) = &self.pop_info {
            config.pop_info = Some(pop_info.clone());
        }
        if let Some(dir) = &self.ilash_dir {
            config.discover_sources(IbdProgram::Ilash, dir)?;
        }
        if let Some(dir) = &self.hapibd_dir {
            config.discover_sources(IbdProgram::HapIbd, dir)?;
        }
        config.validate()
    }
}

///
/// config file with the command line overrides applied
///
pub fn load_config<P: AsRef<Path>>(path: P, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = Config::from_json_file(path)?;
    overrides.apply(&mut config)?;
    Ok(config)
}

fn print_network_run(run: &NetworkRun) {
    for v in run.variants.iter() {
        let n_multi = v.networks.iter().filter(|n| !n.is_singleton()).count();
        let max_degree = to_node_list(&v.graph)
            .into_iter()
            .map(|(_, degree)| degree)
            .max()
            .unwrap_or(0);
        println!(
            "# variant={} networks={} multi_member_networks={} edges={} max_degree={} dropped_non_carrier={} dropped_invalid={} skipped_rows={} failed_sources={}",
            v.variant,
            v.networks.len(),
            n_multi,
            v.graph.n_edges(),
            max_degree,
            v.build_stats.n_non_carrier,
            v.build_stats.n_invalid,
            v.n_skipped_rows,
            v.source_failures.len(),
        );
    }
    for failure in run.failures.iter() {
        println!("# failed {}", failure);
    }
}

fn print_allele_summary(summary: &AlleleSummary) {
    println!(
        "# allele_count records={} groups={} rows={} malformed_rows={} missing_members={} unmatched_variants={}",
        summary.n_records,
        summary.n_groups,
        summary.n_rows,
        summary.n_malformed_rows,
        summary.n_missing_members,
        summary.n_unmatched_variants,
    );
}

///
/// Execute a parsed command line.
///
pub fn run_command(opts: &Opts) -> Result<()> {
    match &opts.command {
        Commands::Run {
            config,
            overrides,
            genotypes,
            output_dir,
        } => {
            let config = load_config(config, overrides)?;
            println!("# n_threads={}", config.threads);
            let report = pipeline::run(&config, genotypes.as_deref(), output_dir)?;
            print_network_run(&report.networks);
            if let Some(summary) = &report.alleles {
                print_allele_summary(summary);
            }
        }
        Commands::Networks {
            config,
            overrides,
            output_dir,
        } => {
            let config = load_config(config, overrides)?;
            println!("# n_threads={}", config.threads);
            let run = pipeline::build_networks(&config)?;
            pipeline::write_network_outputs(&run, output_dir)?;
            print_network_run(&run);
        }
        Commands::AlleleCount {
            membership,
            genotypes,
            output_dir,
        } => {
            let summary = pipeline::count_alleles_from_files(membership, genotypes, output_dir)?;
            print_allele_summary(&summary);
        }
    }
    info!("done");
    Ok(())
}
