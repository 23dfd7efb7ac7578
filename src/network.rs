//!
//! Networks: connected components of the carrier graph
//!
//! ## Network ids
//!
//! Components are ordered by their lexicographically smallest member IID and
//! numbered `network_1`, `network_2`, ... in that order, so the same graph
//! always yields the same ids.
//!
use crate::common::{Iid, NetworkId, VariantId};
use crate::graph::CarrierGraph;
use crate::hist::Hist;
use fnv::FnvHashMap as HashMap;
use log::info;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;

///
/// A group of carriers connected through qualifying IBD segments.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    id: NetworkId,
    variant: VariantId,
    /// sorted member IIDs
    members: Vec<Iid>,
}

impl Network {
    pub fn new(id: NetworkId, variant: &str, mut members: Vec<Iid>) -> Self {
        members.sort();
        members.dedup();
        Network {
            id,
            variant: variant.to_owned(),
            members,
        }
    }
    pub fn id(&self) -> &NetworkId {
        &self.id
    }
    pub fn variant(&self) -> &str {
        &self.variant
    }
    pub fn members(&self) -> &[Iid] {
        &self.members
    }
    pub fn len(&self) -> usize {
        self.members.len()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
    /// a carrier sharing no qualifying segment with another carrier
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
    pub fn contains(&self, iid: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(iid)).is_ok()
    }
}

///
/// Split the carrier graph into connected components.
///
/// Every node of the graph ends up in exactly one network; isolated carriers
/// become one-member networks.
///
pub fn partition(graph: &CarrierGraph) -> Vec<Network> {
    let g = graph.graph();
    let mut uf: UnionFind<usize> = UnionFind::new(g.node_count());
    for edge in g.edge_references() {
        uf.union(edge.source().index(), edge.target().index());
    }

    let mut groups: HashMap<usize, Vec<Iid>> = HashMap::default();
    for node in g.node_indices() {
        groups
            .entry(uf.find(node.index()))
            .or_insert_with(Vec::new)
            .push(g[node].clone());
    }

    let mut components: Vec<Vec<Iid>> = groups
        .into_iter()
        .map(|(_, mut members)| {
            members.sort();
            members
        })
        .collect();
    // members are unique across components, so the first member is a total order
    components.sort_by(|a, b| a[0].cmp(&b[0]));

    let networks: Vec<Network> = components
        .into_iter()
        .enumerate()
        .map(|(i, members)| Network::new(NetworkId::from_index(i), graph.variant(), members))
        .collect();

    info!(
        "{}: {} networks, sizes {}",
        graph.variant(),
        networks.len(),
        Hist::from_values(networks.iter().map(|n| n.len()))
    );
    networks
}

///
/// Per-variant count of carriers and of carriers placed in a network with at
/// least one other carrier.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyRow {
    pub n_carriers: usize,
    pub n_in_networks: usize,
}

impl TallyRow {
    /// percentage of carriers that share a segment with another carrier
    pub fn percent_in_networks(&self) -> f64 {
        if self.n_carriers == 0 {
            0.0
        } else {
            100.0 * self.n_in_networks as f64 / self.n_carriers as f64
        }
    }
}

///
/// Accumulator of `TallyRow`s over the variants of a run.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarrierTally {
    rows: BTreeMap<VariantId, TallyRow>,
}

impl CarrierTally {
    pub fn new() -> Self {
        CarrierTally::default()
    }
    ///
    /// record the networks of one variant. Recording the same variant again
    /// replaces its row.
    ///
    pub fn record(&mut self, variant: &str, networks: &[Network]) {
        let row = TallyRow {
            n_carriers: networks.iter().map(|n| n.len()).sum(),
            n_in_networks: networks
                .iter()
                .filter(|n| !n.is_singleton())
                .map(|n| n.len())
                .sum(),
        };
        self.rows.insert(variant.to_owned(), row);
    }
    pub fn get(&self, variant: &str) -> Option<TallyRow> {
        self.rows.get(variant).copied()
    }
    /// rows sorted by variant
    pub fn iter(&self) -> impl Iterator<Item = (&str, TallyRow)> + '_ {
        self.rows.iter().map(|(v, row)| (v.as_str(), *row))
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::CarrierSet;
    use crate::segment::filter::filter_by_length;
    use crate::segment::schema::IbdProgram;
    use crate::segment::SegmentRecord;
    use std::collections::BTreeSet;

    fn seg(a: &str, b: &str, cm: f64) -> SegmentRecord {
        SegmentRecord::new(a, b, IbdProgram::Ilash, cm, "1", 0, 1000).unwrap()
    }

    fn member_sets(networks: &[Network]) -> Vec<(String, Vec<String>)> {
        networks
            .iter()
            .map(|n| (n.id().to_string(), n.members().to_vec()))
            .collect()
    }

    #[test]
    fn sub_threshold_segment_leaves_singleton() {
        let carriers = CarrierSet::new("rs1", vec!["A", "B", "C"]);
        let segments = filter_by_length(vec![seg("A", "B", 5.0), seg("C", "A", 2.0)], 3.0);
        let (g, _) = CarrierGraph::build(&carriers, &segments);
        let networks = partition(&g);
        assert_eq!(
            member_sets(&networks),
            vec![
                ("network_1".to_owned(), vec!["A".to_owned(), "B".to_owned()]),
                ("network_2".to_owned(), vec!["C".to_owned()]),
            ]
        );
        assert!(networks[1].is_singleton());
        assert_eq!(networks[0].variant(), "rs1");
    }

    #[test]
    fn partition_covers_every_carrier_once() {
        let iids: Vec<String> = (0..30).map(|i| format!("I{:02}", i)).collect();
        let carriers = CarrierSet::new("rs1", iids.clone());
        // chain of every third individual plus a few extra links
        let mut segments = Vec::new();
        for i in 0..27 {
            segments.push(seg(&iids[i], &iids[i + 3], 4.0));
        }
        segments.push(seg("I04", "I29", 8.0));
        let (g, _) = CarrierGraph::build(&carriers, &segments);
        let networks = partition(&g);

        let mut seen = BTreeSet::new();
        let mut total = 0;
        for n in networks.iter() {
            for m in n.members() {
                assert!(seen.insert(m.clone()), "{} is in two networks", m);
                total += 1;
            }
        }
        assert_eq!(total, carriers.len());
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), iids);
        assert_eq!(networks.len(), 2);
    }

    #[test]
    fn network_ids_are_deterministic() {
        let carriers = CarrierSet::new("rs1", vec!["D", "C", "B", "A", "E"]);
        let forward = vec![seg("E", "B", 4.0), seg("C", "D", 4.0)];
        let mut backward = forward.clone();
        backward.reverse();

        let (g1, _) = CarrierGraph::build(&carriers, &forward);
        let (g2, _) = CarrierGraph::build(&carriers, &backward);
        let n1 = partition(&g1);
        let n2 = partition(&g2);
        assert_eq!(n1, n2);
        assert_eq!(n1, partition(&g1));
        assert_eq!(
            member_sets(&n1),
            vec![
                ("network_1".to_owned(), vec!["A".to_owned()]),
                ("network_2".to_owned(), vec!["B".to_owned(), "E".to_owned()]),
                ("network_3".to_owned(), vec!["C".to_owned(), "D".to_owned()]),
            ]
        );
    }

    #[test]
    fn tally_accumulates_variants() {
        let mut tally = CarrierTally::new();
        let networks = vec![
            Network::new(NetworkId::from_index(0), "rs1", vec!["A".into(), "B".into()]),
            Network::new(NetworkId::from_index(1), "rs1", vec!["C".into()]),
        ];
        tally.record("rs1", &networks);
        tally.record("rs2", &networks[1..]);
        assert_eq!(tally.len(), 2);
        let row = tally.get("rs1").unwrap();
        assert_eq!(row.n_carriers, 3);
        assert_eq!(row.n_in_networks, 2);
        assert!((row.percent_in_networks() - 66.666).abs() < 0.01);
        assert_eq!(tally.get("rs2").unwrap().percent_in_networks(), 0.0);
        assert_eq!(
            tally.iter().map(|(v, _)| v).collect::<Vec<_>>(),
            vec!["rs1", "rs2"]
        );
    }

    #[test]
    fn network_contains() {
        let n = Network::new(NetworkId::from("f1"), "rs1", vec!["B".into(), "A".into(), "B".into()]);
        assert_eq!(n.members(), &["A".to_owned(), "B".to_owned()]);
        assert!(n.contains("A"));
        assert!(!n.contains("C"));
    }
}
