use crate::halib::DeBruijnGraph;
use petgraph::stable_graph::NodeIndex;
use std::cmp::Ordering;

/// A source-to-sink walk through a DeBruijnGraph
#[derive(Clone, Debug)]
pub struct GraphPath {
    pub vertices: Vec<NodeIndex>,
    pub score: u64, // sum of edge multiplicities
    order: u64,     // discovery order, earlier paths win ties
}

impl GraphPath {
    pub fn new(vertices: Vec<NodeIndex>, score: u64, order: u64) -> Self {
        Self {
            vertices,
            score,
            order,
        }
    }

    pub fn bases(&self, graph: &DeBruijnGraph) -> Vec<u8> {
        graph.path_bases(&self.vertices)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Ord for GraphPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| self.order.cmp(&other.order).reverse())
    }
}

impl PartialOrd for GraphPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GraphPath {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.order == other.order
    }
}

impl Eq for GraphPath {}
