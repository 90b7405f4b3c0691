//! Error types raised by the persona engine

use thiserror::Error;

/// Smallest cluster count the engine accepts
pub const MIN_CLUSTERS: usize = 2;
/// Largest cluster count the engine accepts
pub const MAX_CLUSTERS: usize = 10;

/// Errors produced by a pipeline run
///
/// Configuration errors are reported before any computation starts, so a
/// failed run never leaves partial output behind.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "invalid cluster count {requested}: must be between {MIN_CLUSTERS} and {MAX_CLUSTERS} \
         and at most the number of records ({records})"
    )]
    InvalidClusterCount { requested: usize, records: usize },

    #[error("no usable features: select at least one numeric column with finite, non-missing values")]
    NoUsableFeatures,

    #[error("k-means fit failed: {0}")]
    Clustering(#[from] linfa_clustering::KMeansError),

    #[error("feature scaling failed: {0}")]
    Scaling(#[from] linfa_preprocessing::error::PreprocessingError),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

/// Result type used by the engine stages
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
