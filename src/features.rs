//! Feature selection: narrows a dataset to the numeric columns used for segmentation

use ndarray::Array2;
use polars::prelude::*;
use tracing::warn;

use crate::error::{EngineError, Result};

/// Ordered, non-empty list of distinct numeric column names with finite values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    names: Vec<String>,
}

impl FeatureSet {
    /// Column names in selection order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Extract the raw feature values as a (records, features) matrix
    pub fn project(&self, dataset: &DataFrame) -> Result<Array2<f64>> {
        let n_records = dataset.height();
        let mut columns = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let series = dataset
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let values: Vec<f64> = series.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            columns.push(values);
        }

        let mut data = Vec::with_capacity(n_records * columns.len());
        for row in 0..n_records {
            data.extend(columns.iter().map(|column| column[row]));
        }

        Ok(Array2::from_shape_vec((n_records, self.names.len()), data)?)
    }
}

/// Whether a column type counts as a numeric feature
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Restrict the requested columns to those that exist, are numeric and complete
///
/// A complete column has no nulls and no NaN or infinite values.
/// Duplicates keep their first position. Fails with
/// [`EngineError::NoUsableFeatures`] when nothing usable remains.
pub fn select_features<S: AsRef<str>>(dataset: &DataFrame, requested: &[S]) -> Result<FeatureSet> {
    let mut names: Vec<String> = Vec::with_capacity(requested.len());

    for name in requested.iter().map(AsRef::as_ref) {
        if names.iter().any(|n| n == name) {
            continue;
        }
        let Ok(column) = dataset.column(name) else {
            warn!(feature = name, "skipping feature: column not found");
            continue;
        };
        if !is_numeric_dtype(column.dtype()) {
            warn!(feature = name, dtype = %column.dtype(), "skipping feature: column is not numeric");
            continue;
        }
        if column.null_count() > 0 {
            warn!(feature = name, nulls = column.null_count(), "skipping feature: column has missing values");
            continue;
        }
        let values = column.as_materialized_series().cast(&DataType::Float64)?;
        let non_finite = values.f64()?.into_no_null_iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            warn!(feature = name, non_finite, "skipping feature: column has NaN or infinite values");
            continue;
        }
        names.push(name.to_string());
    }

    if names.is_empty() {
        return Err(EngineError::NoUsableFeatures);
    }

    Ok(FeatureSet { names })
}
