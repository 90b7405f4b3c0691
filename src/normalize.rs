//! Per-feature standardization to zero mean and unit variance

use linfa::prelude::*;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2, Axis};

use crate::error::Result;

/// Spread of a magnitude-scaled column at or below which it counts as constant
const CONSTANT_SPREAD: f64 = 1e-12;

/// Standardize every column of `raw` with linfa's standard scaler
///
/// Each column is first divided by its largest magnitude, which leaves the
/// standardized values unchanged and keeps the variance finite for huge
/// inputs. The output columns have sample mean 0 and sample standard
/// deviation 1. Constant columns, including every column of a single record,
/// become all zero.
pub fn normalize(raw: &Array2<f64>) -> Result<Array2<f64>> {
    let n_records = raw.nrows();
    if n_records == 0 {
        return Ok(raw.clone());
    }

    let mut bounded = raw.clone();
    let mut constant = Vec::with_capacity(raw.ncols());
    for mut column in bounded.axis_iter_mut(Axis(1)) {
        let magnitude = column.fold(0.0_f64, |m, v| m.max(v.abs()));
        if magnitude > 0.0 {
            column.mapv_inplace(|v| v / magnitude);
        }
        let (lo, hi) = column.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
        constant.push(hi - lo <= CONSTANT_SPREAD);
    }

    let dataset = Dataset::new(bounded, Array1::<usize>::zeros(n_records));
    let scaler = LinearScaler::standard().fit(&dataset)?;
    let mut scaled = scaler.transform(dataset.records.clone());

    for (mut column, is_constant) in scaled.axis_iter_mut(Axis(1)).zip(constant) {
        if is_constant {
            column.fill(0.0);
            continue;
        }
        // Rescale to unit sample (n - 1) standard deviation
        let std = column.std(1.0);
        if std > 0.0 && std.is_finite() {
            column.mapv_inplace(|v| v / std);
        }
    }

    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_standardized_columns_have_zero_mean_unit_std() {
        let raw = array![
            [19.0, 15.0, 39.0],
            [21.0, 15.0, 81.0],
            [20.0, 16.0, 6.0],
            [23.0, 16.0, 77.0],
            [31.0, 17.0, 40.0],
            [67.0, 19.0, 14.0],
        ];
        let scaled = normalize(&raw).unwrap();

        for column in scaled.axis_iter(Axis(1)) {
            assert_close(column.mean().unwrap(), 0.0);
            assert_close(column.std(1.0), 1.0);
        }
    }

    #[test]
    fn test_constant_feature_becomes_zero() {
        let raw = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let scaled = normalize(&raw).unwrap();

        assert!(scaled.column(0).iter().all(|&v| v == 0.0));
        assert_close(scaled[[0, 1]], -1.0);
        assert_close(scaled[[2, 1]], 1.0);
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_huge_values_keep_their_variance() {
        let raw = array![[1e155, 1.0], [-1e155, 2.0], [0.0, 3.0]];
        let scaled = normalize(&raw).unwrap();

        assert_close(scaled[[0, 0]], 1.0);
        assert_close(scaled[[1, 0]], -1.0);
        assert_close(scaled[[2, 0]], 0.0);
    }

    #[test]
    fn test_tiny_spread_is_not_treated_as_constant() {
        let raw = array![[1e-20], [2e-20], [3e-20]];
        let scaled = normalize(&raw).unwrap();

        assert_close(scaled[[0, 0]], -1.0);
        assert_close(scaled[[1, 0]], 0.0);
        assert_close(scaled[[2, 0]], 1.0);
    }

    #[test]
    fn test_single_record_is_all_zero() {
        let raw = array![[3.0, 4.0]];
        let scaled = normalize(&raw).unwrap();
        assert_eq!(scaled, array![[0.0, 0.0]]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = array![[1.0, 10.0], [2.0, 30.0], [4.0, 20.0]];
        assert_eq!(normalize(&raw).unwrap(), normalize(&raw).unwrap());
    }
}
