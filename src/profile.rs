//! Per-segment summaries computed on the original feature values

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::features::FeatureSet;

/// Decimal places kept in profile means
pub const PROFILE_DECIMALS: u32 = 2;

const SEGMENT_KEY: &str = "segment";
const SIZE_KEY: &str = "size";

/// Mean feature values of one segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRow {
    /// Number of records in the segment
    pub size: usize,
    /// Feature name to rounded mean, in feature order
    pub means: Vec<(String, f64)>,
}

impl ProfileRow {
    /// Mean of `feature`, if it was part of the segmentation
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.means
            .iter()
            .find(|(name, _)| name == feature)
            .map(|&(_, mean)| mean)
    }
}

/// Segment id to profile row, for every segment that has members
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentProfile {
    features: Vec<String>,
    rows: BTreeMap<usize, ProfileRow>,
}

impl SegmentProfile {
    /// Feature names, in the order used by every row
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Segment ids in ascending order
    pub fn segments(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    pub fn row(&self, segment: usize) -> Option<&ProfileRow> {
        self.rows.get(&segment)
    }

    pub fn rows(&self) -> impl Iterator<Item = (usize, &ProfileRow)> {
        self.rows.iter().map(|(&segment, row)| (segment, row))
    }

    pub fn mean(&self, segment: usize, feature: &str) -> Option<f64> {
        self.row(segment)?.get(feature)
    }

    pub fn size(&self, segment: usize) -> Option<usize> {
        self.row(segment).map(|row| row.size)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Average the raw feature values of each segment
///
/// `raw` holds the unnormalized values in `features` order, one row per
/// record, aligned with `labels`. The frame handed to polars uses
/// positional column names, so feature names never clash with the key.
pub fn profile_segments(
    raw: &Array2<f64>,
    features: &FeatureSet,
    labels: &Array1<usize>,
) -> Result<SegmentProfile> {
    let mut columns: Vec<Column> = raw
        .axis_iter(Axis(1))
        .enumerate()
        .map(|(j, values)| Column::new(feature_key(j).into(), values.to_vec()))
        .collect();
    let segments: Vec<u32> = labels.iter().map(|&l| l as u32).collect();
    columns.push(Column::new(SEGMENT_KEY.into(), segments));

    let mut aggregations: Vec<Expr> = (0..features.len())
        .map(|j| col(feature_key(j)).mean().round(PROFILE_DECIMALS))
        .collect();
    aggregations.push(len().alias(SIZE_KEY));

    let grouped = DataFrame::new(columns)?
        .lazy()
        .group_by([col(SEGMENT_KEY)])
        .agg(aggregations)
        .collect()?;

    let keys = grouped.column(SEGMENT_KEY)?.as_materialized_series().cast(&DataType::UInt64)?;
    let sizes = grouped.column(SIZE_KEY)?.as_materialized_series().cast(&DataType::UInt64)?;
    let mut means = Vec::with_capacity(features.len());
    for j in 0..features.len() {
        means.push(grouped.column(&feature_key(j))?.as_materialized_series().cast(&DataType::Float64)?);
    }

    let mut rows = BTreeMap::new();
    for (i, (segment, size)) in keys.u64()?.into_iter().zip(sizes.u64()?.into_iter()).enumerate() {
        let (Some(segment), Some(size)) = (segment, size) else {
            continue;
        };
        let mut row_means = Vec::with_capacity(features.len());
        for (name, mean) in features.names().iter().zip(&means) {
            row_means.push((name.clone(), mean.f64()?.get(i).unwrap_or(f64::NAN)));
        }
        rows.insert(
            segment as usize,
            ProfileRow {
                size: size as usize,
                means: row_means,
            },
        );
    }

    Ok(SegmentProfile {
        features: features.names().to_vec(),
        rows,
    })
}

fn feature_key(index: usize) -> String {
    format!("f{index}")
}
