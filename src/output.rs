//!
//! CSV outputs
//!
//! | file                        | columns                                                       |
//! |-----------------------------|---------------------------------------------------------------|
//! | `allele_count.csv`          | `Network,Variant ID,Allele Count`                             |
//! | `grouped_allele_counts.csv` | `Allele Count,Networks`                                       |
//! | `networks.csv`              | `Variant,Network,IID`                                         |
//! | `network_edges.csv`         | `Variant,IID1,IID2,Program,Length cM`                         |
//! | `carriers_in_networks.csv`  | `Variant,Carriers,Carriers In Networks,Percent In Networks`   |
//!
use crate::allele::AlleleCountRecord;
use crate::common::AlleleCount;
use crate::error::Result;
use crate::graph::utils::to_edge_list;
use crate::graph::CarrierGraph;
use crate::network::CarrierTally;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const ALLELE_COUNT_FILE: &str = "allele_count.csv";
pub const GROUPED_ALLELE_COUNT_FILE: &str = "grouped_allele_counts.csv";
pub const NETWORKS_FILE: &str = "networks.csv";
pub const NETWORK_EDGES_FILE: &str = "network_edges.csv";
pub const CARRIER_TALLY_FILE: &str = "carriers_in_networks.csv";

///
/// create `dir/name` (and `dir` if needed) for buffered writing
///
pub fn create_output<P: AsRef<Path>>(dir: P, name: &str) -> Result<BufWriter<File>> {
    std::fs::create_dir_all(dir.as_ref())?;
    let path = dir.as_ref().join(name);
    let file = File::create(&path).map_err(|e| crate::error::Error::from(e).in_file(&path))?;
    Ok(BufWriter::new(file))
}

pub fn write_allele_counts<W: Write>(records: &[AlleleCountRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(&["Network", "Variant ID", "Allele Count"])?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_grouped_allele_counts<W: Write>(
    groups: &[(AlleleCount, usize)],
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&["Allele Count", "Networks"])?;
    for (allele_count, n_networks) in groups {
        wtr.write_record(&[allele_count.to_string(), n_networks.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_carrier_tally<W: Write>(tally: &CarrierTally, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&[
        "Variant",
        "Carriers",
        "Carriers In Networks",
        "Percent In Networks",
    ])?;
    for (variant, row) in tally.iter() {
        wtr.write_record(&[
            variant.to_owned(),
            row.n_carriers.to_string(),
            row.n_in_networks.to_string(),
            format!("{:.2}", row.percent_in_networks()),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

///
/// Append the edges of a carrier graph. The header is written only when
/// `with_header` is set, so graphs of several variants can share a file.
///
pub fn write_network_edges<W: Write>(
    graph: &CarrierGraph,
    writer: W,
    with_header: bool,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if with_header {
        wtr.write_record(&["Variant", "IID1", "IID2", "Program", "Length cM"])?;
    }
    for (id_a, id_b, segment) in to_edge_list(graph) {
        let length = segment.length_cm.to_string();
        wtr.write_record(&[
            graph.variant(),
            id_a,
            id_b,
            segment.program.name(),
            length.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
