use super::{CarrierGraph, SharedSegment};

///
/// list of (iid_a, iid_b, segment) for every edge, in edge-index order
///
pub fn to_edge_list(graph: &CarrierGraph) -> Vec<(&str, &str, &SharedSegment)> {
    let g = graph.graph();
    g.edge_indices()
        .filter_map(|edge| {
            let (source, target) = g.edge_endpoints(edge)?;
            let weight = g.edge_weight(edge)?;
            Some((g[source].as_str(), g[target].as_str(), weight))
        })
        .collect()
}

///
/// list of (iid, degree) for every node, in node-index order
///
pub fn to_node_list(graph: &CarrierGraph) -> Vec<(&str, usize)> {
    let g = graph.graph();
    g.node_indices()
        .map(|node| (g[node].as_str(), g.neighbors(node).count()))
        .collect()
}
