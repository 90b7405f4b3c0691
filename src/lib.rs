//! Persona Architect: customer persona generation using K-Means clustering
//!
//! This library selects numeric features from a customer dataset, standardizes
//! them, segments the records with seeded K-Means, profiles each segment on the
//! original values and suggests a marketing strategy per segment.

pub mod cli;
pub mod data;
pub mod error;
pub mod export;
pub mod features;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod strategy;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{default_features, describe, load_dataset, numeric_columns, parse_dataset};
pub use error::EngineError;
pub use export::{export_key, to_csv_bytes, ExportCache};
pub use features::{select_features, FeatureSet};
pub use model::{fit_kmeans, KMeansModel, KMeansParams};
pub use normalize::normalize;
pub use pipeline::{run, PersonaConfig, PersonaRun, SEGMENT_COLUMN};
pub use profile::{profile_segments, SegmentProfile};
pub use report::{DisplayNames, PersonaReport};
pub use strategy::{assign_strategies, classify, MetricColumns, Recommendation, Strategy, Thresholds};

/// Result type used by the host-facing helpers (loading, export, reporting)
pub type Result<T> = anyhow::Result<T>;
