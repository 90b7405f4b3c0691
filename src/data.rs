//! Dataset loading and exploratory overview using Polars

use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use polars::prelude::*;
use serde::Serialize;

use crate::features::is_numeric_dtype;

/// Features preselected when the dataset has them (the mall customers layout)
pub const DEFAULT_FEATURES: [&str; 3] = ["Age", "Annual Income (k$)", "Spending Score (1-100)"];

/// Load a CSV file with a header row into a DataFrame
pub fn load_dataset(path: impl AsRef<Path>) -> crate::Result<DataFrame> {
    let path = path.as_ref();
    let source = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_dataset(&source).with_context(|| format!("failed to load {}", path.display()))
}

/// Parse CSV bytes with a header row into a DataFrame
pub fn parse_dataset(source: &[u8]) -> crate::Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(source))
        .finish()
        .context("failed to parse CSV")?;

    if df.height() == 0 {
        anyhow::bail!("No records found");
    }

    Ok(df)
}

/// Names of all integer and floating-point columns, in dataset order
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| is_numeric_dtype(column.dtype()))
        .map(|column| column.name().to_string())
        .collect()
}

/// The default features that exist as numeric columns in `df`
pub fn default_features(df: &DataFrame) -> Vec<String> {
    let numeric = numeric_columns(df);
    DEFAULT_FEATURES
        .iter()
        .filter(|name| numeric.iter().any(|n| n == *name))
        .map(|name| name.to_string())
        .collect()
}

/// Descriptive statistics of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Dataset shape plus a summary of every numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub records: usize,
    pub attributes: usize,
    pub columns: Vec<ColumnSummary>,
}

/// Summarize the numeric columns of `df`; missing values are ignored
///
/// Quantiles are linearly interpolated and `std` uses the n - 1 denominator.
pub fn describe(df: &DataFrame) -> crate::Result<Overview> {
    let mut columns = Vec::new();
    for name in numeric_columns(df) {
        let series = df
            .column(&name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let count = series.len() - series.null_count();
        if count == 0 {
            continue;
        }
        let values = series.f64()?;
        let quantile = |q: f64| -> PolarsResult<f64> {
            Ok(values.quantile(q, QuantileMethod::Linear)?.unwrap_or(f64::NAN))
        };

        columns.push(ColumnSummary {
            count,
            mean: series.mean().unwrap_or(f64::NAN),
            std: series.std(1).unwrap_or(f64::NAN),
            min: series.min::<f64>()?.unwrap_or(f64::NAN),
            q25: quantile(0.25)?,
            median: quantile(0.5)?,
            q75: quantile(0.75)?,
            max: series.max::<f64>()?.unwrap_or(f64::NAN),
            name,
        });
    }

    Ok(Overview {
        records: df.height(),
        attributes: df.width(),
        columns,
    })
}
