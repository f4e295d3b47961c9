use crate::halib::{k_best_paths, prune_graph, AssemblyParams, DeBruijnGraph, Haplotype, SearchLimits};
use indexmap::IndexSet;

/// Multi-k de Bruijn assembly of the reads in one active region.
/// Holds no state between regions, so one assembler per worker is enough.
#[derive(Clone, Debug)]
pub struct LocalAssembler {
    params: AssemblyParams,
}

impl LocalAssembler {
    pub fn new(params: AssemblyParams) -> Self {
        if params.kmer_start == 0 || params.kmer_step == 0 {
            panic!("kmer start and step must be at least 1");
        }
        Self { params }
    }

    /// The ascending ensemble of kmer sizes
    pub fn kmer_sizes(&self) -> Vec<usize> {
        (self.params.kmer_start..=self.params.kmer_max)
            .step_by(self.params.kmer_step)
            .collect()
    }

    /// One pruned graph per kmer size
    pub fn build_graphs<R: AsRef<[u8]>>(&self, reads: &[R]) -> Vec<DeBruijnGraph> {
        self.kmer_sizes()
            .into_iter()
            .map(|kmer| {
                let mut graph = DeBruijnGraph::from_reads(reads, kmer, self.params.kmer_overlap);
                prune_graph(&mut graph, self.params.prune_factor);
                graph
            })
            .collect()
    }

    /// Returns the reference haplotype followed by every distinct candidate
    /// at least as long as the reference
    pub fn run_local_assembly<R: AsRef<[u8]>>(
        &self,
        reads: &[R],
        ref_haplotype: Haplotype,
    ) -> Vec<Haplotype> {
        let limits = SearchLimits {
            max_depth: self.params.max_depth,
            max_paths: self.params.max_paths,
        };
        let min_len = ref_haplotype.len();

        let mut haplotypes = IndexSet::<Haplotype>::new();
        haplotypes.insert(ref_haplotype);

        for graph in self.build_graphs(reads) {
            if graph.is_empty() {
                continue;
            }
            for path in k_best_paths(&graph, self.params.best_paths, &limits) {
                let bases = path.bases(&graph);
                // the haplotype needs to span the active region
                if bases.is_empty() || bases.len() < min_len {
                    continue;
                }
                haplotypes.insert(Haplotype::new(bases, path.score as f64));
            }
        }

        debug!(
            "found {} candidate haplotypes from {} reads",
            haplotypes.len(),
            reads.len()
        );
        for hap in &haplotypes {
            trace!("{}", String::from_utf8_lossy(&hap.bases));
        }
        haplotypes.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &[u8] = b"TTGACCGTAGCATGCAAGTC";
    const ALT: &[u8] = b"TTGACCGTAGGATGCAAGTC";

    fn params() -> AssemblyParams {
        AssemblyParams {
            kmer_start: 7,
            kmer_step: 4,
            kmer_max: 11,
            kmer_overlap: 0,
            prune_factor: 2,
            ..Default::default()
        }
    }

    #[test]
    fn default_ensemble() {
        let asm = LocalAssembler::new(AssemblyParams::default());
        assert_eq!(
            asm.kmer_sizes(),
            vec![7, 15, 23, 31, 39, 47, 55, 63, 71, 79, 87, 95]
        );
    }

    #[test]
    fn no_reads_returns_reference_only() {
        let asm = LocalAssembler::new(AssemblyParams::default());
        let reads: Vec<Vec<u8>> = vec![];
        let haps = asm.run_local_assembly(&reads, Haplotype::reference(REFERENCE.to_vec()));
        assert_eq!(haps.len(), 1);
        assert!(haps[0].is_reference);
    }

    #[test]
    fn recovers_supported_alt() {
        let asm = LocalAssembler::new(params());
        let mut reads = vec![];
        for _ in 0..4 {
            reads.push(REFERENCE.to_vec());
            reads.push(ALT.to_vec());
        }
        let haps = asm.run_local_assembly(&reads, Haplotype::reference(REFERENCE.to_vec()));
        assert!(haps[0].is_reference);
        assert!(haps.iter().any(|h| h.bases == ALT && !h.is_reference));
        // reference itself was re-assembled, but appears only once
        assert_eq!(haps.iter().filter(|h| h.bases == REFERENCE).count(), 1);
    }

    #[test]
    fn candidates_are_unique_and_long_enough() {
        let asm = LocalAssembler::new(params());
        let mut reads = vec![];
        for _ in 0..3 {
            reads.push(REFERENCE.to_vec());
            reads.push(ALT.to_vec());
            reads.push(REFERENCE[..15].to_vec());
        }
        let haps = asm.run_local_assembly(&reads, Haplotype::reference(REFERENCE.to_vec()));
        let unique: IndexSet<&Vec<u8>> = haps.iter().map(|h| &h.bases).collect();
        assert_eq!(unique.len(), haps.len());
        assert!(haps.iter().all(|h| h.len() >= REFERENCE.len()));
    }
}
