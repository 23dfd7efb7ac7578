//!
//! globally-available parts
//!
pub use crate::allele::AlleleCountRecord;
pub use crate::carrier::{CarrierSet, PopulationTable};
pub use crate::common::{AlleleCount, Iid, NetworkId, VariantId};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::genotype::GenotypeMatrix;
pub use crate::graph::CarrierGraph;
pub use crate::network::{CarrierTally, Network};
pub use crate::pedigree::PedigreeRow;
pub use crate::segment::schema::IbdProgram;
pub use crate::segment::SegmentRecord;
pub use petgraph::graph::NodeIndex;
