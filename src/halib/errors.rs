use thiserror::Error;

/// Boxed failure raised by an external collaborator (aligner, likelihood
/// evaluator, genotype caller). Passed back to the caller untouched.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum HapasmError {
    #[error("unsupported cigar operator created during alignment: {0}")]
    UnsupportedCigar(char),
    #[error("alignment walks past the {sequence} sequence ({position} >= {length})")]
    AlignmentOverrun {
        sequence: &'static str,
        position: usize,
        length: usize,
    },
    #[error("likelihood matrix for sample {sample} is {rows}x{cols}, expected {expected}x{expected}")]
    LikelihoodShape {
        sample: String,
        rows: usize,
        cols: usize,
        expected: usize,
    },
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

pub type Result<T> = std::result::Result<T, HapasmError>;
