use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser, Clone, Debug)]
#[command(name = "hapasm")]
#[command(about = "Local de Bruijn assembly of haplotypes over active regions")]
#[command(version)]
pub struct ArgParser {
    #[command(flatten)]
    pub io: IOParams,

    #[command(flatten)]
    pub asm: AssemblyParams,

    #[command(flatten)]
    pub gt: GenotypingParams,
}

#[derive(clap::Args, Clone, Debug)]
pub struct IOParams {
    /// Reads to assemble (indexed .bam or .cram)
    #[arg(short, long, help_heading = "I/O")]
    pub bam: PathBuf,

    /// Reference reads are aligned to
    #[arg(short = 'f', long, help_heading = "I/O")]
    pub reference: PathBuf,

    /// Active regions to assemble
    #[arg(long, help_heading = "I/O")]
    pub bed: PathBuf,

    /// Output haplotypes as json lines (default stdout)
    #[arg(short, long, help_heading = "I/O")]
    pub out: Option<PathBuf>,

    /// Number of threads
    #[arg(short, long, default_value_t = 1, help_heading = "I/O")]
    pub threads: usize,

    /// Minimum mapq of reads to consider
    #[arg(long, default_value_t = 5, help_heading = "I/O")]
    pub mapq: u8,

    /// Alignments with flag matching this value are ignored
    #[arg(long, default_value_t = 3840, help_heading = "I/O")]
    pub mapflag: u16,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[derive(clap::Args, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AssemblyParams {
    /// Smallest kmer size of the ensemble
    #[arg(long, default_value_t = 7, help_heading = "Assembly")]
    pub kmer_start: usize,

    /// Step between kmer sizes
    #[arg(long, default_value_t = 8, help_heading = "Assembly")]
    pub kmer_step: usize,

    /// Largest kmer size of the ensemble
    #[arg(long, default_value_t = 101, help_heading = "Assembly")]
    pub kmer_max: usize,

    /// Reads must be longer than kmer + overlap to be used
    #[arg(long, default_value_t = 6, help_heading = "Assembly")]
    pub kmer_overlap: usize,

    /// Edges with multiplicity below this are pruned
    #[arg(long, default_value_t = 3, help_heading = "Assembly")]
    pub prune_factor: u64,

    /// Number of best paths taken from each graph
    #[arg(long, default_value_t = 12, help_heading = "Assembly")]
    pub best_paths: usize,

    /// Longest path (in kmers) searched before giving up on it
    #[arg(long, default_value_t = 10000, help_heading = "Assembly")]
    pub max_depth: usize,

    /// Maximum number of paths in a graph to traverse, finished or abandoned
    #[arg(long, default_value_t = 5000, help_heading = "Assembly")]
    pub max_paths: u64,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        Self {
            kmer_start: 7,
            kmer_step: 8,
            kmer_max: 101,
            kmer_overlap: 6,
            prune_factor: 3,
            best_paths: 12,
            max_depth: 10000,
            max_paths: 5000,
        }
    }
}

#[derive(clap::Args, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GenotypingParams {
    /// Smith-Waterman gap open penalty
    #[arg(long, default_value_t = 30.0, help_heading = "Genotyping")]
    pub gop: f64,

    /// Smith-Waterman gap extension penalty
    #[arg(long, default_value_t = 0.8, help_heading = "Genotyping")]
    pub gcp: f64,
}

impl Default for GenotypingParams {
    fn default() -> Self {
        Self { gop: 30.0, gcp: 0.8 }
    }
}

impl AssemblyParams {
    pub fn validate(&self) -> bool {
        let mut is_ok = true;

        if self.kmer_start < 1 {
            error!("--kmer-start must be at least 1");
            is_ok = false;
        }

        if self.kmer_step < 1 {
            error!("--kmer-step must be at least 1");
            is_ok = false;
        }

        if self.kmer_max < self.kmer_start {
            error!("--kmer-max must be at least --kmer-start");
            is_ok = false;
        }

        if self.best_paths < 1 {
            error!("--best-paths must be at least 1");
            is_ok = false;
        }

        if self.max_paths < 1 {
            error!("--max-paths must be at least 1");
            is_ok = false;
        }

        if self.prune_factor == 0 {
            warn!("--prune-factor 0 disables pruning");
        }

        is_ok
    }
}

impl ArgParser {
    /// Validate command line arguments
    pub fn validate(&self) -> bool {
        let mut is_ok = self.asm.validate();

        is_ok &= validate_bam(&self.io.bam);
        is_ok &= validate_reference(&self.io.reference);
        is_ok &= validate_file(&self.io.bed, "--bed");

        if self.gt.gop < 0.0 || self.gt.gcp < 0.0 {
            error!("--gop and --gcp are penalties and must not be negative");
            is_ok = false;
        }

        if self.io.threads < 1 {
            error!("--threads must be at least 1");
            is_ok = false;
        }

        is_ok
    }
}

/// Helper function to validate a file's existence and type
fn validate_file(path: &Path, label: &str) -> bool {
    if !path.exists() {
        error!("{} does not exist", label);
        return false;
    }
    if !path.is_file() {
        error!("{} is not a file", label);
        return false;
    }
    true
}

/// Alignments need an index for region fetching
fn validate_bam(bam: &Path) -> bool {
    let mut is_ok = validate_file(bam, "--bam");

    let file_path = bam.to_str().unwrap_or_default();
    if file_path.ends_with(".bam") || file_path.ends_with(".cram") {
        let index_extensions = [".bai", ".crai", ".csi"];
        let index_exists = index_extensions.iter().any(|ext| {
            let index_path = format!("{}{}", file_path, ext);
            let p = Path::new(&index_path);
            p.exists() & p.is_file()
        });

        if !index_exists {
            error!(
                "--bam index ({}) does not exist",
                index_extensions.join(", ")
            );
            is_ok = false;
        }
    } else {
        error!("Unsupported file type: {}", file_path);
        is_ok = false;
    }

    is_ok
}

/// Checks reference and its .fai index
fn validate_reference(reference: &Path) -> bool {
    let mut is_ok = validate_file(reference, "--reference");

    let mut fai_path = reference.to_path_buf();
    match fai_path.file_name() {
        Some(name) => {
            let name = format!("{}.fai", name.to_string_lossy());
            fai_path.set_file_name(name);
            is_ok &= validate_file(&fai_path, "--reference index (.fai)");
        }
        None => is_ok = false,
    }

    is_ok
}
