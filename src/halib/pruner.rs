use crate::halib::DeBruijnGraph;
use petgraph::stable_graph::{EdgeIndex, NodeIndex};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneStats {
    pub edges_removed: usize,
    pub vertices_removed: usize,
    pub rounds: usize,
}

/// Remove low-support branches, then iteratively remove the weak roots
/// left behind. Never fails; an emptied graph is still a valid graph.
pub fn prune_graph(graph: &mut DeBruijnGraph, prune_factor: u64) -> PruneStats {
    let mut stats = PruneStats {
        edges_removed: prune_low_weight_branches(graph, prune_factor),
        ..Default::default()
    };
    let (edges, vertices, rounds) = prune_weak_roots(graph, prune_factor);
    stats.edges_removed += edges;
    stats.vertices_removed = vertices;
    stats.rounds = rounds;
    debug!("k={} pruned {:?}", graph.kmer_size(), stats);
    stats
}

/// At every vertex with more than one way out, drop the outgoing edges with
/// multiplicity under prune_factor. If every edge is weak, the lowest edge
/// index (first observed adjacency) is spared so the vertex keeps an exit.
/// Returns the number of edges removed
pub fn prune_low_weight_branches(graph: &mut DeBruijnGraph, prune_factor: u64) -> usize {
    let mut to_remove = Vec::<EdgeIndex>::new();
    for vertex in graph.vertices() {
        let out_edges = graph.out_edges(vertex);
        if out_edges.len() <= 1 {
            continue;
        }
        let weak: Vec<EdgeIndex> = out_edges
            .iter()
            .filter(|(_, _, mult)| *mult < prune_factor)
            .map(|(e, _, _)| *e)
            .collect();
        if weak.len() == out_edges.len() {
            to_remove.extend(weak.into_iter().skip(1));
        } else {
            to_remove.extend(weak);
        }
    }

    to_remove
        .into_iter()
        .filter(|&edge| graph.remove_edge(edge))
        .count()
}

/// Vertices whose only exit is a weak edge are removed along with that edge.
/// Repeats until a scan removes nothing.
/// Returns (edges removed, vertices removed, rounds)
pub fn prune_weak_roots(graph: &mut DeBruijnGraph, prune_factor: u64) -> (usize, usize, usize) {
    let mut edges_removed = 0;
    let mut vertices_removed = 0;
    let mut rounds = 0;

    loop {
        let weak_roots: Vec<(NodeIndex, EdgeIndex)> = graph
            .vertices()
            .into_iter()
            .filter_map(|vertex| match graph.out_edges(vertex).as_slice() {
                [(edge, _, mult)] if *mult < prune_factor => Some((vertex, *edge)),
                _ => None,
            })
            .collect();
        if weak_roots.is_empty() {
            break;
        }
        rounds += 1;
        for (vertex, edge) in weak_roots {
            // may already be gone if its target was an earlier weak root
            if graph.remove_edge(edge) {
                edges_removed += 1;
            }
            // incoming edges go with the vertex
            edges_removed += graph.in_degree(vertex);
            graph.remove_vertex(vertex);
            vertices_removed += 1;
        }
    }

    (edges_removed, vertices_removed, rounds)
}
