use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based, inclusive genomic interval
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomeLoc {
    pub contig: String,
    pub start: u64,
    pub stop: u64,
}

impl GenomeLoc {
    pub fn new(contig: &str, start: u64, stop: u64) -> Self {
        if stop < start {
            panic!("GenomeLoc {}:{}-{} has stop before start", contig, start, stop);
        }
        Self {
            contig: contig.to_string(),
            start,
            stop,
        }
    }

    pub fn size(&self) -> u64 {
        self.stop - self.start + 1
    }

    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos <= self.stop
    }
}

impl fmt::Display for GenomeLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.stop)
    }
}
