#[macro_use]
extern crate log;

mod halib;
pub use self::{
    halib::extract_events, halib::k_best_paths, halib::kmer_pairs, halib::metrics,
    halib::prune_graph, halib::prune_low_weight_branches, halib::prune_weak_roots, halib::Allele,
    halib::Alignment, halib::ArgParser, halib::AssemblyParams, halib::BamParser, halib::BedEntry,
    halib::BedParser, halib::CollaboratorError, halib::DeBruijnEdge, halib::DeBruijnGraph,
    halib::DeBruijnVertex, halib::DiploidLikelihoods, halib::EventKind, halib::EventMap,
    halib::GenomeLoc, halib::GenotypeCaller, halib::Genotype, halib::GenotypeLikelihoods,
    halib::GenotypingEngine, halib::GenotypingParams, halib::GraphPath, halib::HapasmError,
    halib::Haplotype, halib::IOParams, halib::LocalAssembler, halib::PairwiseAligner,
    halib::PruneStats, halib::RegionReads, halib::Result, halib::SearchLimits, halib::SwScores,
    halib::VariantContext, halib::VariantEvent,
};
