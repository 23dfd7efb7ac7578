//!
//! Carrier relatedness graph
//!
//! Undirected multigraph whose nodes are the carriers of a variant and whose
//! edges are the qualifying IBD segments shared between two carriers.
//!
pub mod utils;

use crate::carrier::CarrierSet;
use crate::common::{Iid, NodeIndex, VariantId};
use crate::error::{Error, Result};
use crate::segment::schema::IbdProgram;
use crate::segment::SegmentRecord;
use derive_new::new;
use fnv::FnvHashMap as HashMap;
use log::{debug, info};
use petgraph::graph::UnGraph;

/// edge weight: which program reported the segment and how long it is
#[derive(Debug, Clone, PartialEq, new)]
pub struct SharedSegment {
    pub program: IbdProgram,
    pub length_cm: f64,
}

///
/// Counts of segments that did not become edges.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// segments with at least one endpoint outside the carrier set
    pub n_non_carrier: usize,
    /// self pairs rejected as invalid edges
    pub n_invalid: usize,
}

#[derive(Debug, Clone)]
pub struct CarrierGraph {
    variant: VariantId,
    graph: UnGraph<Iid, SharedSegment>,
    nodes: HashMap<Iid, NodeIndex>,
}

impl CarrierGraph {
    ///
    /// Graph with every carrier as an isolated node.
    ///
    pub fn from_carriers(carriers: &CarrierSet) -> Self {
        let mut graph = UnGraph::with_capacity(carriers.len(), 0);
        let mut nodes = HashMap::default();
        for iid in carriers.iter() {
            let node = graph.add_node(iid.clone());
            nodes.insert(iid.clone(), node);
        }
        CarrierGraph {
            variant: carriers.variant().to_owned(),
            graph,
            nodes,
        }
    }
    ///
    /// Build the graph of `carriers` from (already filtered and merged) segments.
    ///
    /// Segments touching a non-carrier are dropped. Self pairs are rejected.
    ///
    pub fn build<'a, I>(carriers: &CarrierSet, segments: I) -> (Self, BuildStats)
    where
        I: IntoIterator<Item = &'a SegmentRecord>,
    {
        let mut g = Self::from_carriers(carriers);
        let mut stats = BuildStats::default();
        for segment in segments {
            match g.add_segment(segment) {
                Ok(true) => {}
                Ok(false) => stats.n_non_carrier += 1,
                Err(e) => {
                    debug!("{}: {}", g.variant, e);
                    stats.n_invalid += 1;
                }
            }
        }
        info!(
            "{}: carrier graph |V|={} |E|={} (dropped {} non-carrier segments, {} invalid)",
            g.variant,
            g.n_nodes(),
            g.n_edges(),
            stats.n_non_carrier,
            stats.n_invalid
        );
        (g, stats)
    }
    ///
    /// Add a segment as an edge.
    ///
    /// Returns `Ok(false)` if either endpoint is not a carrier, and
    /// `Err(InvalidEdge)` for a self pair.
    ///
    pub fn add_segment(&mut self, segment: &SegmentRecord) -> Result<bool> {
        if segment.is_self_pair() {
            return Err(Error::InvalidEdge {
                id_a: segment.id_a().to_owned(),
                id_b: segment.id_b().to_owned(),
                reason: "self pair".to_owned(),
            });
        }
        match (self.node(segment.id_a()), self.node(segment.id_b())) {
            (Some(a), Some(b)) => {
                self.graph.add_edge(
                    a,
                    b,
                    SharedSegment::new(segment.program(), segment.length_cm()),
                );
                Ok(true)
            }
            _ => Ok(false),
        }
    }
    pub fn variant(&self) -> &str {
        &self.variant
    }
    pub fn n_nodes(&self) -> usize {
        self.graph.node_count()
    }
    pub fn n_edges(&self) -> usize {
        self.graph.edge_count()
    }
    /// node of the carrier `iid`
    pub fn node(&self, iid: &str) -> Option<NodeIndex> {
        self.nodes.get(iid).copied()
    }
    /// IID of the node
    pub fn iid(&self, node: NodeIndex) -> &str {
        &self.graph[node]
    }
    pub fn contains(&self, iid: &str) -> bool {
        self.nodes.contains_key(iid)
    }
    ///
    /// carriers sharing at least one qualifying segment with `iid`, sorted and
    /// without repetition
    ///
    pub fn neighbors(&self, iid: &str) -> Vec<&str> {
        let mut neighbors: Vec<&str> = match self.node(iid) {
            Some(node) => self
                .graph
                .neighbors(node)
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => Vec::new(),
        };
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }
    pub fn degree(&self, iid: &str) -> usize {
        self.node(iid)
            .map_or(0, |node| self.graph.neighbors(node).count())
    }
    /// underlying petgraph graph
    pub fn graph(&self) -> &UnGraph<Iid, SharedSegment> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: &str, b: &str, program: IbdProgram, cm: f64) -> SegmentRecord {
        SegmentRecord::new(a, b, program, cm, "1", 0, 1000).unwrap()
    }

    #[test]
    fn build_restricts_to_carriers() {
        let carriers = CarrierSet::new("rs1", vec!["A", "B", "C"]);
        let segments = vec![
            seg("A", "B", IbdProgram::Ilash, 5.0),
            seg("A", "B", IbdProgram::HapIbd, 6.0),
            seg("B", "X", IbdProgram::Ilash, 10.0),
            seg("Y", "Z", IbdProgram::Ilash, 10.0),
        ];
        let (g, stats) = CarrierGraph::build(&carriers, &segments);
        assert_eq!(g.variant(), "rs1");
        assert_eq!(g.n_nodes(), 3);
        assert_eq!(g.n_edges(), 2);
        assert_eq!(stats.n_non_carrier, 2);
        assert_eq!(stats.n_invalid, 0);
        assert!(!g.contains("X"));
        assert_eq!(g.neighbors("A"), vec!["B"]);
        assert_eq!(g.degree("A"), 2);
        // isolated carrier is still a node
        assert!(g.contains("C"));
        assert_eq!(g.neighbors("C"), Vec::<&str>::new());
        assert_eq!(g.neighbors("X"), Vec::<&str>::new());
    }

    #[test]
    fn self_pair_is_invalid_edge() {
        let carriers = CarrierSet::new("rs1", vec!["A", "B"]);
        let mut g = CarrierGraph::from_carriers(&carriers);
        let e = g
            .add_segment(&seg("A", "A", IbdProgram::Ilash, 5.0))
            .unwrap_err();
        assert!(matches!(e, Error::InvalidEdge { .. }));
        assert_eq!(g.n_edges(), 0);

        let (g, stats) = CarrierGraph::build(
            &carriers,
            &[
                seg("A", "A", IbdProgram::Ilash, 5.0),
                seg("A", "B", IbdProgram::Ilash, 5.0),
            ],
        );
        assert_eq!(stats.n_invalid, 1);
        assert_eq!(g.n_edges(), 1);
    }
}
