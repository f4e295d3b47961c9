use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Debug, Formatter, Result},
    hash::{Hash, Hasher},
};

/// A candidate sequence for an active region.
/// Two haplotypes are the same haplotype when their bases are the same,
/// regardless of which graph produced them.
#[derive(Clone, Serialize, Deserialize)]
pub struct Haplotype {
    #[serde(with = "bases_as_str")]
    pub bases: Vec<u8>,
    pub score: f64,
    pub is_reference: bool,
    /// Per-sample read log10 likelihoods, filled in by whoever scores reads against haplotypes
    #[serde(skip)]
    pub sample_likelihoods: IndexMap<String, Vec<f64>>,
}

impl Haplotype {
    pub fn new(bases: Vec<u8>, score: f64) -> Self {
        if bases.is_empty() {
            panic!("Cannot create a haplotype with no bases");
        }
        Self {
            bases,
            score,
            is_reference: false,
            sample_likelihoods: IndexMap::new(),
        }
    }

    pub fn reference(bases: Vec<u8>) -> Self {
        let mut ret = Haplotype::new(bases, 0.0);
        ret.is_reference = true;
        ret
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn add_read_likelihoods(&mut self, sample: &str, likelihoods: Vec<f64>) {
        self.sample_likelihoods
            .insert(sample.to_string(), likelihoods);
    }

    pub fn sample_keys(&self) -> impl Iterator<Item = &String> {
        self.sample_likelihoods.keys()
    }
}

impl PartialEq for Haplotype {
    fn eq(&self, other: &Self) -> bool {
        self.bases == other.bases
    }
}

impl Eq for Haplotype {}

impl Hash for Haplotype {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bases.hash(state);
    }
}

impl Debug for Haplotype {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Haplotype")
            .field("bases", &String::from_utf8_lossy(&self.bases))
            .field("score", &self.score)
            .field("is_reference", &self.is_reference)
            // Exclude likelihoods from the debug output
            .finish()
    }
}

mod bases_as_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bases: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&String::from_utf8_lossy(bases))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        Ok(String::deserialize(d)?.into_bytes())
    }
}
