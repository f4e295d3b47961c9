use itertools::Itertools;
use std::fmt::{Debug, Formatter, Result};

/// A k-mer vertex. Vertices are identified by their bases alone.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DeBruijnVertex {
    pub sequence: Vec<u8>,
}

impl DeBruijnVertex {
    pub fn new(sequence: &[u8]) -> Self {
        if sequence.is_empty() {
            panic!("Cannot create a vertex from an empty kmer");
        }
        Self {
            sequence: sequence.to_vec(),
        }
    }

    /// The base this vertex contributes when it extends a path
    pub fn suffix(&self) -> u8 {
        self.sequence[self.sequence.len() - 1]
    }
}

impl Debug for DeBruijnVertex {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", String::from_utf8_lossy(&self.sequence))
    }
}

/// Observed adjacency between two k-mers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeBruijnEdge {
    pub multiplicity: u64,
}

impl Default for DeBruijnEdge {
    fn default() -> Self {
        Self { multiplicity: 1 }
    }
}

impl DeBruijnEdge {
    pub fn observe(&mut self) {
        self.multiplicity += 1;
    }
}

/// Every pair of consecutive k-mers in a sequence
pub fn kmer_pairs(sequence: &[u8], kmer: usize) -> impl Iterator<Item = (&[u8], &[u8])> {
    if kmer == 0 {
        panic!("kmer size must be at least 1");
    }
    sequence.windows(kmer).tuple_windows()
}
