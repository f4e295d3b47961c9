use crate::halib::{
    extract_events, metrics, Allele, CollaboratorError, EventMap, GenomeLoc, Genotype,
    GenotypeLikelihoods, GenotypingParams, Haplotype, HapasmError, PairwiseAligner, Result,
    SwScores, VariantContext,
};
use ndarray::Array2;

const SOURCE: &str = "hapasm";

/// External evaluator of diploid haplotype-pair likelihoods for one sample.
/// Entry (i, j) is the log10 likelihood of the sample carrying haplotypes i and j.
pub trait DiploidLikelihoods {
    fn diploid_likelihoods(
        &self,
        haplotypes: &[Haplotype],
        sample: &str,
    ) -> std::result::Result<Array2<f64>, CollaboratorError>;
}

/// External genotype caller. Returns None when the locus is not called
pub trait GenotypeCaller {
    fn calculate_genotypes(
        &self,
        vc: &VariantContext,
    ) -> std::result::Result<Option<VariantContext>, CollaboratorError>;
}

#[derive(Clone, Debug)]
pub struct GenotypingEngine {
    scores: SwScores,
}

impl GenotypingEngine {
    pub fn new(params: &GenotypingParams) -> Self {
        Self {
            scores: SwScores::from(params),
        }
    }

    /// Lower triangle of the matrix, row by row: AA, AB, BB, AC, BC, CC, ...
    pub fn linearize_likelihoods(matrix: &Array2<f64>) -> Vec<f64> {
        let n = matrix.nrows().min(matrix.ncols());
        let mut ret = Vec::with_capacity(metrics::genotype_count(n));
        for i in 0..n {
            for j in 0..=i {
                ret.push(matrix[[i, j]]);
            }
        }
        ret
    }

    /// Build a no-call genotype per sample carrying its haplotype-pair
    /// likelihoods and hand the whole locus to the caller.
    /// Every haplotype is expected to have been scored for the same samples
    /// as the first one.
    pub fn assign_genotype_likelihoods_and_call_events<C, L>(
        &self,
        caller: &C,
        evaluator: &L,
        haplotypes: &[Haplotype],
        ref_bases: &[u8],
        ref_loc: &GenomeLoc,
        active_window: &GenomeLoc,
    ) -> Result<Vec<VariantContext>>
    where
        C: GenotypeCaller + ?Sized,
        L: DiploidLikelihoods + ?Sized,
    {
        let first = match haplotypes.first() {
            Some(h) => h,
            None => return Ok(vec![]),
        };
        debug!(
            "genotyping {} haplotypes in {} against {}bp of {}",
            haplotypes.len(),
            active_window,
            ref_bases.len(),
            ref_loc
        );

        let alleles: Vec<Allele> = haplotypes
            .iter()
            .map(|h| Allele::new(&h.bases, h.is_reference))
            .collect();

        let n = haplotypes.len();
        let mut genotypes = Vec::<Genotype>::new();
        for sample in first.sample_keys() {
            let matrix = evaluator.diploid_likelihoods(haplotypes, sample)?;
            if matrix.nrows() != n || matrix.ncols() != n {
                return Err(HapasmError::LikelihoodShape {
                    sample: sample.clone(),
                    rows: matrix.nrows(),
                    cols: matrix.ncols(),
                    expected: n,
                });
            }
            let gl = GenotypeLikelihoods::from_log10(Self::linearize_likelihoods(&matrix));
            genotypes.push(Genotype::no_call(sample, gl));
        }

        let vc = VariantContext::new(SOURCE, active_window.clone(), alleles).with_genotypes(genotypes);
        match caller.calculate_genotypes(&vc)? {
            Some(call) => Ok(vec![call]),
            None => {
                debug!("no call at {}", active_window);
                Ok(vec![])
            }
        }
    }

    /// Align each haplotype to the reference and decompose it into events.
    /// One map per haplotype, in input order; nothing is merged across haplotypes.
    pub fn decompose_haplotypes<A>(
        &self,
        aligner: &A,
        haplotypes: &[Haplotype],
        ref_bases: &[u8],
        ref_loc: &GenomeLoc,
    ) -> Result<Vec<EventMap>>
    where
        A: PairwiseAligner + ?Sized,
    {
        haplotypes
            .iter()
            .map(|h| {
                let alignment = aligner.align(ref_bases, &h.bases, &self.scores)?;
                trace!(
                    "{} cigar={} start={}",
                    String::from_utf8_lossy(&h.bases),
                    alignment.cigar,
                    alignment.alignment_start
                );
                extract_events(&alignment, ref_bases, &h.bases, ref_loc)
            })
            .collect()
    }
}
