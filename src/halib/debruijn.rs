use crate::halib::{kmer_pairs, DeBruijnEdge, DeBruijnVertex};
use indexmap::IndexMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// De Bruijn graph over a single kmer size.
/// Vertices are looked up by their bases so that identical kmers observed
/// in different reads collapse onto one vertex. The stable graph keeps
/// indices valid while the pruner removes edges and vertices.
#[derive(Debug)]
pub struct DeBruijnGraph {
    pub kmer: usize,
    pub graph: StableDiGraph<DeBruijnVertex, DeBruijnEdge>,
    lookup: IndexMap<Vec<u8>, NodeIndex>,
}

impl DeBruijnGraph {
    pub fn new(kmer: usize) -> Self {
        if kmer == 0 {
            panic!("Cannot create a graph with a kmer size of 0");
        }
        Self {
            kmer,
            graph: StableDiGraph::new(),
            lookup: IndexMap::new(),
        }
    }

    /// Build a graph from every read long enough to chain kmers together.
    /// Reads of length <= kmer + overlap are skipped.
    pub fn from_reads<R: AsRef<[u8]>>(reads: &[R], kmer: usize, overlap: usize) -> Self {
        let mut ret = DeBruijnGraph::new(kmer);
        let mut used: usize = 0;
        for read in reads {
            let sequence = read.as_ref();
            if sequence.len() <= kmer + overlap {
                continue;
            }
            used += 1;
            for (kmer1, kmer2) in kmer_pairs(sequence, kmer) {
                ret.add_kmer_pair(kmer1, kmer2);
            }
        }
        debug!(
            "k={} built from {}/{} reads: {} vertices {} edges",
            kmer,
            used,
            reads.len(),
            ret.vertex_count(),
            ret.edge_count()
        );
        ret
    }

    /// Returns the vertex holding these bases, creating it when new
    pub fn add_vertex_if_new(&mut self, kmer: &[u8]) -> NodeIndex {
        if kmer.len() != self.kmer {
            panic!(
                "kmer of length {} added to a k={} graph",
                kmer.len(),
                self.kmer
            );
        }
        if let Some(idx) = self.lookup.get(kmer) {
            return *idx;
        }
        let idx = self.graph.add_node(DeBruijnVertex::new(kmer));
        self.lookup.insert(kmer.to_vec(), idx);
        idx
    }

    /// Record one observation of kmer1 followed by kmer2
    pub fn add_kmer_pair(&mut self, kmer1: &[u8], kmer2: &[u8]) -> EdgeIndex {
        let v1 = self.add_vertex_if_new(kmer1);
        let v2 = self.add_vertex_if_new(kmer2);
        match self.graph.find_edge(v1, v2) {
            Some(e_idx) => {
                if let Some(edge) = self.graph.edge_weight_mut(e_idx) {
                    edge.observe();
                }
                e_idx
            }
            None => self.graph.add_edge(v1, v2, DeBruijnEdge::default()),
        }
    }

    pub fn vertex(&self, kmer: &[u8]) -> Option<NodeIndex> {
        self.lookup.get(kmer).copied()
    }

    pub fn find_edge(&self, kmer1: &[u8], kmer2: &[u8]) -> Option<EdgeIndex> {
        match (self.vertex(kmer1), self.vertex(kmer2)) {
            (Some(v1), Some(v2)) => self.graph.find_edge(v1, v2),
            _ => None,
        }
    }

    pub fn multiplicity(&self, edge: EdgeIndex) -> u64 {
        self.graph.edge_weight(edge).map_or(0, |e| e.multiplicity)
    }

    /// Outgoing edges as (edge, target, multiplicity), in ascending edge index
    pub fn out_edges(&self, node: NodeIndex) -> Vec<(EdgeIndex, NodeIndex, u64)> {
        let mut ret: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.id(), e.target(), e.weight().multiplicity))
            .collect();
        ret.sort_by_key(|(e, _, _)| *e);
        ret
    }

    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.graph.edges_directed(node, Direction::Outgoing).count()
    }

    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.graph.edges_directed(node, Direction::Incoming).count()
    }

    /// Vertices in insertion order
    pub fn vertices(&self) -> Vec<NodeIndex> {
        self.lookup.values().copied().collect()
    }

    /// Vertices without incoming edges
    pub fn sources(&self) -> Vec<NodeIndex> {
        self.lookup
            .values()
            .copied()
            .filter(|&v| self.in_degree(v) == 0)
            .collect()
    }

    /// Vertices without outgoing edges
    pub fn sinks(&self) -> Vec<NodeIndex> {
        self.lookup
            .values()
            .copied()
            .filter(|&v| self.out_degree(v) == 0)
            .collect()
    }

    /// Returns false when the edge was already gone
    pub fn remove_edge(&mut self, edge: EdgeIndex) -> bool {
        self.graph.remove_edge(edge).is_some()
    }

    /// Removes the vertex, its edges, and its lookup entry
    pub fn remove_vertex(&mut self, node: NodeIndex) {
        if let Some(vertex) = self.graph.remove_node(node) {
            // shift_remove keeps the remaining insertion order intact
            self.lookup.shift_remove(&vertex.sequence);
        }
    }

    pub fn kmer_size(&self) -> usize {
        self.kmer
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Spell out the bases of a walk: the first kmer in full, then the
    /// final base of every following kmer
    pub fn path_bases(&self, path: &[NodeIndex]) -> Vec<u8> {
        let mut iter = path.iter().filter_map(|&v| self.graph.node_weight(v));
        let mut ret = match iter.next() {
            Some(first) => first.sequence.clone(),
            None => return vec![],
        };
        ret.extend(iter.map(|v| v.suffix()));
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_pairs_increase_multiplicity() {
        let mut graph = DeBruijnGraph::new(3);
        for _ in 0..5 {
            graph.add_kmer_pair(b"ACG", b"CGT");
        }
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.find_edge(b"ACG", b"CGT").unwrap();
        assert_eq!(graph.multiplicity(edge), 5);
    }

    #[test]
    fn vertices_collapse_by_value() {
        let mut graph = DeBruijnGraph::new(3);
        let a = graph.add_vertex_if_new(b"ACG");
        let b = graph.add_vertex_if_new(&b"TACG"[1..]);
        assert_eq!(a, b);
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn short_reads_are_skipped() {
        let reads = vec![b"ACGTACGTAC".to_vec()];
        // 10 bases is not more than 7 + 6
        let graph = DeBruijnGraph::from_reads(&reads, 7, 6);
        assert!(graph.is_empty());

        let graph = DeBruijnGraph::from_reads(&reads, 3, 6);
        assert!(!graph.is_empty());
    }

    #[test]
    fn read_order_does_not_matter() {
        let reads = vec![
            b"ACGTTGCATGCAAT".to_vec(),
            b"GTTGCATGCAATCC".to_vec(),
            b"ACGTTGAATGCAAT".to_vec(),
        ];
        let mut reversed = reads.clone();
        reversed.reverse();

        let g1 = DeBruijnGraph::from_reads(&reads, 5, 0);
        let g2 = DeBruijnGraph::from_reads(&reversed, 5, 0);
        assert_eq!(g1.vertex_count(), g2.vertex_count());
        assert_eq!(g1.edge_count(), g2.edge_count());
        for e in g1.graph.edge_indices() {
            let (s, t) = g1.graph.edge_endpoints(e).unwrap();
            let s = &g1.graph[s].sequence;
            let t = &g1.graph[t].sequence;
            let other = g2.find_edge(s, t).unwrap();
            assert_eq!(g1.multiplicity(e), g2.multiplicity(other));
        }
    }

    #[test]
    fn spells_path_bases() {
        let read = b"ACGTACGTAA".to_vec();
        let graph = DeBruijnGraph::from_reads(&[read.clone()], 7, 0);
        let path: Vec<NodeIndex> = read
            .windows(7)
            .map(|k| graph.vertex(k).unwrap())
            .collect();
        assert_eq!(graph.path_bases(&path), read);
    }

    #[test]
    fn removing_a_vertex_frees_its_kmer() {
        let mut graph = DeBruijnGraph::new(3);
        graph.add_kmer_pair(b"ACG", b"CGT");
        let v = graph.vertex(b"CGT").unwrap();
        graph.remove_vertex(v);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.vertex(b"CGT").is_none());
        // re-adding creates a fresh vertex instead of a dangling index
        let fresh = graph.add_vertex_if_new(b"CGT");
        assert!(graph.graph.node_weight(fresh).is_some());
    }
}
