//!
//! Identifiers and small shared types
//!
pub use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Individual identifier (IID column of PLINK files)
pub type Iid = String;

/// Family identifier (FID column of PLINK files)
pub type Fid = String;

/// Identifier of a variant of interest (e.g. `rs12345` or `exm-rs12345`)
pub type VariantId = String;

/// Number of alleles (0/1/2 per individual, summed over a network)
pub type AlleleCount = u32;

///
/// An individual in the cohort.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Individual {
    pub iid: Iid,
    pub fid: Option<Fid>,
    pub pop: String,
}

impl Individual {
    pub fn new(iid: &str, fid: Option<&str>, pop: &str) -> Self {
        Individual {
            iid: iid.to_owned(),
            fid: fid.map(|s| s.to_owned()),
            pop: pop.to_owned(),
        }
    }
}

///
/// Generated identifier of a network (a connected component of carriers).
///
/// Ids created by the partitioner are `network_<n>` with `n` starting from 1.
/// Ids read from membership files are kept verbatim.
///
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub String);

impl NetworkId {
    /// id for the `index`-th (0-origin) component
    pub fn from_index(index: usize) -> Self {
        NetworkId(format!("network_{}", index + 1))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(s: &str) -> Self {
        NetworkId(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_id_from_index() {
        assert_eq!(NetworkId::from_index(0).to_string(), "network_1");
        assert_eq!(NetworkId::from_index(9).as_str(), "network_10");
        assert_eq!(NetworkId::from("fam7"), NetworkId("fam7".to_owned()));
    }
}
