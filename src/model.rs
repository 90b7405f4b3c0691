//! K-Means segmentation using linfa with a seeded RNG

use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::{Distance, L2Dist};
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::error::{EngineError, Result, MAX_CLUSTERS, MIN_CLUSTERS};

/// Parameters of a segmentation run
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansParams {
    /// Number of segments to produce
    pub n_clusters: usize,
    /// Independent runs; the lowest-inertia run is kept
    pub n_init: usize,
    /// Iteration cap per initialization
    pub max_iters: usize,
    /// Inertia change below which a run counts as converged
    pub tolerance: f64,
    /// Seed for centroid initialization
    pub seed: u64,
}

impl KMeansParams {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            n_init: 10,
            max_iters: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Fitted segmentation
#[derive(Debug, Clone)]
pub struct KMeansModel {
    /// Number of clusters
    pub n_clusters: usize,
    /// Segment id for each input row
    pub labels: Array1<usize>,
    /// Cluster centroids in normalized space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares (inertia)
    pub inertia: f64,
}

/// Validate a requested cluster count against the allowed range and record count
pub fn validate_cluster_count(n_clusters: usize, n_records: usize) -> Result<()> {
    if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&n_clusters) || n_clusters > n_records {
        return Err(EngineError::InvalidClusterCount {
            requested: n_clusters,
            records: n_records,
        });
    }
    Ok(())
}

/// Partition the rows of `data` into `params.n_clusters` non-empty segments
///
/// All `n_init` runs draw from one `StdRng` seeded with `params.seed`, so
/// identical inputs always yield the identical labeling.
pub fn fit_kmeans(data: &Array2<f64>, params: &KMeansParams) -> Result<KMeansModel> {
    let k = params.n_clusters;
    validate_cluster_count(k, data.nrows())?;

    // Create dataset for linfa; targets are unused
    let targets: Array1<usize> = Array1::zeros(data.nrows());
    let dataset = Dataset::new(data.clone(), targets);

    let model = KMeans::params_with(k, StdRng::seed_from_u64(params.seed), L2Dist)
        .n_runs(params.n_init)
        .max_n_iterations(params.max_iters as u64)
        .tolerance(params.tolerance)
        .fit(&dataset)?;

    let mut labels = model.predict(data);
    let moved = fill_empty_clusters(data, &mut labels, model.centroids());
    if moved > 0 {
        debug!(moved, "refilled empty k-means clusters");
    }

    // Centroids are reported as the means of the final partition
    let centroids = cluster_means(data, &labels, k);
    let inertia = compute_inertia(data, &labels, &centroids);

    Ok(KMeansModel {
        n_clusters: k,
        labels,
        centroids,
        inertia,
    })
}

/// Give each empty cluster the worst-fitting row of a cluster that can spare one
///
/// Returns the number of rows moved.
fn fill_empty_clusters(data: &Array2<f64>, labels: &mut Array1<usize>, centroids: &Array2<f64>) -> usize {
    let k = centroids.nrows();
    let mut sizes = vec![0usize; k];
    for &label in labels.iter() {
        sizes[label] += 1;
    }

    let mut distances: Vec<f64> = data
        .outer_iter()
        .zip(labels.iter())
        .map(|(row, &label)| squared_distance(row, centroids.row(label)))
        .collect();

    let mut moved = 0;
    for empty in 0..k {
        if sizes[empty] > 0 {
            continue;
        }
        let donor = (0..labels.len())
            .filter(|&i| sizes[labels[i]] > 1)
            .fold(None, |best: Option<usize>, i| match best {
                Some(b) if distances[b] >= distances[i] => Some(b),
                _ => Some(i),
            });
        if let Some(i) = donor {
            sizes[labels[i]] -= 1;
            sizes[empty] += 1;
            labels[i] = empty;
            distances[i] = 0.0;
            moved += 1;
        }
    }
    moved
}

/// Mean of the rows assigned to each cluster
fn cluster_means(data: &Array2<f64>, labels: &Array1<usize>, k: usize) -> Array2<f64> {
    let mut sums = Array2::<f64>::zeros((k, data.ncols()));
    let mut counts = vec![0usize; k];
    for (row, &label) in data.outer_iter().zip(labels.iter()) {
        let mut sum = sums.row_mut(label);
        sum += &row;
        counts[label] += 1;
    }
    for (mut sum, &count) in sums.outer_iter_mut().zip(counts.iter()) {
        if count > 0 {
            sum /= count as f64;
        }
    }
    sums
}

/// Compute within-cluster sum of squares (inertia)
fn compute_inertia(data: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    data.outer_iter()
        .zip(labels.iter())
        .map(|(row, &label)| squared_distance(row, centroids.row(label)))
        .sum()
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    L2Dist.rdistance(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::collections::{BTreeSet, HashMap};

    fn three_blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.1, -0.1],
            [-0.1, 0.1],
            [5.0, 5.0],
            [5.1, 4.9],
            [4.9, 5.1],
            [-5.0, 5.0],
            [-5.1, 5.1],
            [-4.9, 4.9],
        ]
    }

    /// Canonical form of a labeling that ignores id permutation
    fn partition(labels: &Array1<usize>) -> Vec<usize> {
        let mut remap = HashMap::new();
        labels
            .iter()
            .map(|l| {
                let next = remap.len();
                *remap.entry(*l).or_insert(next)
            })
            .collect()
    }

    fn sizes(labels: &Array1<usize>, k: usize) -> Vec<usize> {
        let mut sizes = vec![0; k];
        for &label in labels {
            sizes[label] += 1;
        }
        sizes
    }

    #[test]
    fn test_recovers_separated_blobs() {
        let data = three_blobs();
        let model = fit_kmeans(&data, &KMeansParams::new(3)).unwrap();

        assert_eq!(partition(&model.labels), vec![0, 0, 0, 1, 1, 1, 2, 2, 2]);
        assert_eq!(sizes(&model.labels, 3), vec![3, 3, 3]);
        assert_eq!(model.centroids.shape(), &[3, 2]);
        assert!(model.inertia < 0.2);
    }

    #[test]
    fn test_emits_exactly_k_segments() {
        let data = three_blobs();
        for k in 2..=9 {
            let model = fit_kmeans(&data, &KMeansParams::new(k)).unwrap();
            let distinct: BTreeSet<usize> = model.labels.iter().copied().collect();
            assert_eq!(distinct, (0..k).collect(), "k = {k}");
        }
    }

    #[test]
    fn test_duplicate_rows_still_fill_every_segment() {
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [2.0, 2.0]];
        let model = fit_kmeans(&data, &KMeansParams::new(4)).unwrap();
        assert_eq!(sizes(&model.labels, 4), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_same_seed_reproduces_labels() {
        let data = three_blobs();
        let params = KMeansParams::new(4).with_seed(7);
        let a = fit_kmeans(&data, &params).unwrap();
        let b = fit_kmeans(&data, &params).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_invalid_cluster_count() {
        let data = three_blobs();
        assert!(matches!(
            fit_kmeans(&data, &KMeansParams::new(1)),
            Err(EngineError::InvalidClusterCount { requested: 1, .. })
        ));
        assert!(matches!(
            fit_kmeans(&data, &KMeansParams::new(11)),
            Err(EngineError::InvalidClusterCount { requested: 11, .. })
        ));

        let small = array![[0.0], [1.0]];
        assert!(matches!(
            fit_kmeans(&small, &KMeansParams::new(3)),
            Err(EngineError::InvalidClusterCount { requested: 3, records: 2 })
        ));
    }

    #[test]
    fn test_invalid_fit_parameters_are_reported() {
        let data = three_blobs();
        let params = KMeansParams::new(3).with_tolerance(-1.0);
        assert!(matches!(fit_kmeans(&data, &params), Err(EngineError::Clustering(_))));
    }

    #[test]
    fn test_empty_clusters_take_worst_fitting_rows() {
        let data = array![[0.0], [0.1], [10.0]];
        let centroids = array![[0.0], [50.0], [60.0]];
        let mut labels = array![0, 0, 0];

        let moved = fill_empty_clusters(&data, &mut labels, &centroids);
        assert_eq!(moved, 2);
        assert_eq!(labels, array![0, 2, 1]);
    }

    #[test]
    fn test_inertia_matches_partition() {
        let data = array![[0.0], [2.0], [10.0], [12.0]];
        let model = fit_kmeans(&data, &KMeansParams::new(2)).unwrap();
        assert_eq!(partition(&model.labels), vec![0, 0, 1, 1]);
        assert!((model.inertia - 4.0).abs() < 1e-12);

        let mut centers: Vec<f64> = model.centroids.column(0).to_vec();
        centers.sort_by(f64::total_cmp);
        assert_eq!(centers, vec![1.0, 11.0]);
    }
}
