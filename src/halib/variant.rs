use crate::halib::{metrics, GenomeLoc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Bases of one allele. An empty sequence is the null side of an indel
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Allele {
    pub bases: Vec<u8>,
    pub is_reference: bool,
}

const NO_CALL: &[u8] = b".";

impl Allele {
    pub fn new(bases: &[u8], is_reference: bool) -> Self {
        Self {
            bases: bases.to_vec(),
            is_reference,
        }
    }

    /// The empty allele on the missing side of an insertion or deletion
    pub fn null(is_reference: bool) -> Self {
        Self {
            bases: vec![],
            is_reference,
        }
    }

    pub fn no_call() -> Self {
        Self {
            bases: NO_CALL.to_vec(),
            is_reference: false,
        }
    }

    pub fn is_no_call(&self) -> bool {
        !self.is_reference && self.bases == NO_CALL
    }

    pub fn is_null(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

impl fmt::Debug for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seq = if self.bases.is_empty() {
            "-".into()
        } else {
            String::from_utf8_lossy(&self.bases)
        };
        if self.is_reference {
            write!(f, "{}*", seq)
        } else {
            write!(f, "{}", seq)
        }
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum EventKind {
    Snp,
    Mnp,
    Insertion,
    Deletion,
}

/// One difference between a haplotype and the reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantEvent {
    pub loc: GenomeLoc,
    pub ref_allele: Allele,
    pub alt_allele: Allele,
    pub kind: EventKind,
    /// Reference base preceding an indel, when there is one
    pub ref_base_for_indel: Option<u8>,
}

impl VariantEvent {
    pub fn start(&self) -> u64 {
        self.loc.start
    }
}

/// Events of one haplotype keyed by genomic start
pub type EventMap = BTreeMap<u64, VariantEvent>;

/// log10 likelihoods of every diploid genotype in canonical order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenotypeLikelihoods {
    pub log10: Vec<f64>,
}

impl GenotypeLikelihoods {
    pub fn from_log10(log10: Vec<f64>) -> Self {
        Self { log10 }
    }

    /// Phred-scaled, normalized to the best genotype
    pub fn as_pls(&self) -> Vec<i32> {
        metrics::log10_to_pls(&self.log10)
    }

    /// Index of the most likely genotype
    pub fn best_index(&self) -> Option<usize> {
        self.as_pls().iter().position(|&pl| pl == 0)
    }

    pub fn len(&self) -> usize {
        self.log10.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log10.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genotype {
    pub sample: String,
    pub alleles: Vec<Allele>,
    pub likelihoods: Option<GenotypeLikelihoods>,
    pub log10_p_error: Option<f64>,
}

impl Genotype {
    /// Placeholder carrying only likelihoods, awaiting a genotype caller
    pub fn no_call(sample: &str, likelihoods: GenotypeLikelihoods) -> Self {
        Self {
            sample: sample.to_string(),
            alleles: vec![Allele::no_call(), Allele::no_call()],
            likelihoods: Some(likelihoods),
            log10_p_error: None,
        }
    }

    pub fn is_no_call(&self) -> bool {
        self.alleles.iter().all(Allele::is_no_call)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantContext {
    pub source: String,
    pub loc: GenomeLoc,
    pub alleles: Vec<Allele>,
    pub genotypes: Vec<Genotype>,
    pub log10_p_error: Option<f64>,
}

impl VariantContext {
    pub fn new(source: &str, loc: GenomeLoc, alleles: Vec<Allele>) -> Self {
        Self {
            source: source.to_string(),
            loc,
            alleles,
            genotypes: vec![],
            log10_p_error: None,
        }
    }

    pub fn with_genotypes(mut self, genotypes: Vec<Genotype>) -> Self {
        self.genotypes = genotypes;
        self
    }

    pub fn genotype(&self, sample: &str) -> Option<&Genotype> {
        self.genotypes.iter().find(|g| g.sample == sample)
    }

    pub fn reference_allele(&self) -> Option<&Allele> {
        self.alleles.iter().find(|a| a.is_reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_call_placeholder() {
        let gt = Genotype::no_call("NA12878", GenotypeLikelihoods::from_log10(vec![-0.1, -2.0, -5.0]));
        assert!(gt.is_no_call());
        assert_eq!(gt.alleles.len(), 2);
        let gl = gt.likelihoods.unwrap();
        assert_eq!(gl.as_pls(), vec![0, 19, 49]);
        assert_eq!(gl.best_index(), Some(0));
    }

    #[test]
    fn null_alleles_print_as_dash() {
        assert_eq!(format!("{:?}", Allele::null(true)), "-*");
        assert_eq!(format!("{:?}", Allele::new(b"AC", false)), "AC");
        assert!(!Allele::new(b".", true).is_no_call());
    }
}
