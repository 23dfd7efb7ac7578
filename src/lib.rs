//!
//! ibdnet
//!
//! Carrier relatedness networks from pairwise IBD segments, and allele counts
//! per network.
//!
//! * `segment`: IBD segment tables of iLASH and hap-IBD
//! * `carrier`: carrier sets and population table
//! * `graph`: carrier graph
//! * `network`: connected components as networks
//! * `pedigree`: network membership tables
//! * `genotype` / `allele`: genotype matrix and allele counts
//! * `pipeline`: parallel run over variants
//!
pub mod allele;
pub mod carrier;
pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod genotype;
pub mod graph;
pub mod hist;
pub mod network;
pub mod output;
pub mod pedigree;
pub mod pipeline;
pub mod prelude;
pub mod segment;
