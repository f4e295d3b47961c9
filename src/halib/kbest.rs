/// Top-K heaviest source-to-sink paths of a pruned DeBruijnGraph
use crate::halib::{DeBruijnGraph, GraphPath};
use petgraph::stable_graph::NodeIndex;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Bounds that keep the search finite on graphs with repeats
#[derive(Clone, Debug)]
pub struct SearchLimits {
    /// Longest path (in vertices) that will be extended
    pub max_depth: usize,
    /// Stop after this many paths have stopped growing, whether they reached
    /// a sink, hit `max_depth`, or ran into vertices already on the path
    pub max_paths: u64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_depth: 10_000,
            max_paths: 5_000,
        }
    }
}

struct PathNodeState {
    node: NodeIndex,
    score: u64,
    path: Vec<NodeIndex>,
}

/// Depth-first search from every source, best edges first. A path never
/// revisits a vertex, so cycles cannot trap the search.
/// Returns at most `k` paths, best score first
pub fn k_best_paths(graph: &DeBruijnGraph, k: usize, limits: &SearchLimits) -> Vec<GraphPath> {
    if k == 0 {
        return vec![];
    }

    // min-heap of the current k best
    let mut best: BinaryHeap<Reverse<GraphPath>> = BinaryHeap::with_capacity(k + 1);
    let mut npaths: u64 = 0;
    // completed or not, every path that stops growing spends the budget
    let mut nended: u64 = 0;

    'sources: for source in graph.sources() {
        let mut stack = vec![PathNodeState {
            node: source,
            score: 0,
            path: vec![source],
        }];

        while let Some(cur) = stack.pop() {
            let out_edges = graph.out_edges(cur.node);
            if out_edges.is_empty() {
                let candidate = GraphPath::new(cur.path, cur.score, npaths);
                npaths += 1;
                if best.len() < k {
                    best.push(Reverse(candidate));
                } else if best.peek().is_some_and(|Reverse(worst)| candidate > *worst) {
                    best.pop();
                    best.push(Reverse(candidate));
                }
            } else if cur.path.len() >= limits.max_depth {
                trace!("abandoning path at depth {}", cur.path.len());
            } else {
                let mut next_edges: Vec<_> = out_edges
                    .into_iter()
                    .filter(|(_, target, _)| !cur.path.contains(target))
                    .collect();
                if !next_edges.is_empty() {
                    // heaviest edge popped first
                    next_edges.sort_by(|a, b| a.2.cmp(&b.2).then(b.0.cmp(&a.0)));
                    for (_, target, mult) in next_edges {
                        let mut npath = cur.path.clone();
                        npath.push(target);
                        stack.push(PathNodeState {
                            node: target,
                            score: cur.score + mult,
                            path: npath,
                        });
                    }
                    continue;
                }
                trace!("dead end at depth {}", cur.path.len());
            }

            nended += 1;
            if nended >= limits.max_paths {
                debug!(
                    "stopping path search after {} paths ({} complete)",
                    nended, npaths
                );
                break 'sources;
            }
        }
    }

    let mut ret: Vec<GraphPath> = best.into_iter().map(|Reverse(p)| p).collect();
    ret.sort_by(|a, b| b.cmp(a));
    ret
}
