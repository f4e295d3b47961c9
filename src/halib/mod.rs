mod assembler;
pub use crate::halib::assembler::LocalAssembler;

mod bedparser;
pub use crate::halib::bedparser::{BedEntry, BedParser};

mod cli;
pub use crate::halib::cli::{ArgParser, AssemblyParams, GenotypingParams, IOParams};

mod debruijn;
pub use crate::halib::debruijn::DeBruijnGraph;

mod errors;
pub use crate::halib::errors::{CollaboratorError, HapasmError, Result};

mod events;
pub use crate::halib::events::{extract_events, Alignment, PairwiseAligner, SwScores};

mod genotyper;
pub use crate::halib::genotyper::{DiploidLikelihoods, GenotypeCaller, GenotypingEngine};

mod haplotype;
pub use crate::halib::haplotype::Haplotype;

mod kbest;
pub use crate::halib::kbest::{k_best_paths, SearchLimits};

mod kmer;
pub use crate::halib::kmer::{kmer_pairs, DeBruijnEdge, DeBruijnVertex};

mod locus;
pub use crate::halib::locus::GenomeLoc;

pub mod metrics;

mod path;
pub use crate::halib::path::GraphPath;

mod pruner;
pub use crate::halib::pruner::{prune_graph, prune_low_weight_branches, prune_weak_roots, PruneStats};

mod readparser;
pub use crate::halib::readparser::{BamParser, RegionReads};

mod variant;
pub use crate::halib::variant::{
    Allele, EventKind, EventMap, Genotype, GenotypeLikelihoods, VariantContext, VariantEvent,
};
