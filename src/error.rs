//! Errors raised by an alignment run.

use crate::config::ConfigError;
use crate::model::SampleId;

/// Errors that can abort an alignment run.
#[derive(Debug, thiserror::Error)]
pub enum AlignmentError {
    /// The run was configured with invalid parameters.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A consensus row ended up holding two features from the same sample.
    #[error("Consensus row {row} holds more than one feature from sample {sample}")]
    InvariantViolation {
        /// Position of the offending row in its list.
        row: usize,
        /// Sample that contributed twice.
        sample: SampleId,
    },

    /// Sample ids must match their position in the input.
    #[error("Sample at position {position} carries id {id}")]
    SampleIdMismatch {
        /// Position in the input slice.
        position: usize,
        /// Id found on the sample.
        id: SampleId,
    },

    /// The similarity library does not cover the input samples.
    #[error("Similarity library covers {found} samples, expected {expected}")]
    LibraryMismatch {
        /// Number of input samples.
        expected: usize,
        /// Dimension of the library.
        found: usize,
    },

    /// A merge-tree leaf names a sample that is not part of the input.
    #[error("Merge tree leaf '{0}' does not name an input sample")]
    UnknownLeaf(String),

    /// The merge tree is not a single tree over its nodes.
    #[error("Malformed merge tree: {0}")]
    MalformedTree(String),

    /// A filter's accepted and rejected rows are not exactly its input rows.
    #[error("Filter '{filter}' did not split its input into accepted and rejected rows")]
    FilterContract {
        /// Label of the offending filter.
        filter: String,
    },
}

/// Convenience result alias for alignment operations.
pub type Result<T> = std::result::Result<T, AlignmentError>;
