//! End-to-end persona generation: select, normalize, segment, profile, classify

use ndarray::Array1;
use polars::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::features::{select_features, FeatureSet};
use crate::model::{fit_kmeans, validate_cluster_count, KMeansParams};
use crate::normalize::normalize;
use crate::profile::{profile_segments, SegmentProfile};
use crate::strategy::{assign_strategies, MetricColumns, StrategyAssignment, Thresholds};

/// Name of the segment id column added to the dataset
pub const SEGMENT_COLUMN: &str = "Persona";

/// Everything a run needs besides the dataset
#[derive(Debug, Clone)]
pub struct PersonaConfig {
    /// Requested feature columns
    pub features: Vec<String>,
    pub kmeans: KMeansParams,
    pub metrics: MetricColumns,
    pub thresholds: Thresholds,
}

impl PersonaConfig {
    pub fn new(features: Vec<String>, n_clusters: usize) -> Self {
        Self {
            features,
            kmeans: KMeansParams::new(n_clusters),
            metrics: MetricColumns::default(),
            thresholds: Thresholds::default(),
        }
    }
}

/// Results of one pipeline run; owns all of its data
#[derive(Debug, Clone)]
pub struct PersonaRun {
    /// Input dataset plus the segment id column
    pub dataset: DataFrame,
    pub features: FeatureSet,
    /// Segment id per record
    pub labels: Array1<usize>,
    pub profile: SegmentProfile,
    pub strategies: StrategyAssignment,
    /// Within-cluster sum of squares of the kept initialization
    pub inertia: f64,
}

impl PersonaRun {
    pub fn n_segments(&self) -> usize {
        self.profile.len()
    }
}

/// Run the full persona pipeline on `dataset`
///
/// The input frame is left untouched; configuration errors are returned
/// before any clustering work starts.
pub fn run(dataset: &DataFrame, config: &PersonaConfig) -> Result<PersonaRun> {
    let n_records = dataset.height();
    let k = config.kmeans.n_clusters;
    validate_cluster_count(k, n_records)?;

    let features = select_features(dataset, &config.features)?;
    let raw = features.project(dataset)?;
    let normalized = normalize(&raw)?;

    let model = fit_kmeans(&normalized, &config.kmeans)?;
    let profile = profile_segments(&raw, &features, &model.labels)?;
    let strategies = assign_strategies(&profile, &config.metrics, &config.thresholds);

    let ids: Vec<u32> = model.labels.iter().map(|&l| l as u32).collect();
    let mut augmented = dataset.clone();
    augmented.with_column(Column::new(SEGMENT_COLUMN.into(), ids))?;

    info!(
        records = n_records,
        features = features.len(),
        segments = profile.len(),
        inertia = model.inertia,
        "persona pipeline finished"
    );

    Ok(PersonaRun {
        dataset: augmented,
        features,
        labels: model.labels,
        profile,
        strategies,
        inertia: model.inertia,
    })
}
