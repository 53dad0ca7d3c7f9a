//! Partitioning of selected bins into one group per vehicle.

use std::collections::HashSet;

use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_clustering::{KMeans, KMeansError};
use ndarray::{Array1, Array2, ShapeError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::config::ClusteringConfig;
use crate::model::GeoPoint;

#[derive(thiserror::Error, Debug)]
/// Errors raised while partitioning bins.
pub enum ClusterError {
    /// The coordinate matrix could not be built.
    #[error("Invalid observation matrix: {0}")]
    Shape(#[from] ShapeError),
    /// K-means failed to converge on a model.
    #[error("K-means failed: {0}")]
    KMeans(#[from] KMeansError),
    /// The model labelled a point outside the requested cluster range.
    #[error("Cluster label {label} out of range for {clusters} clusters")]
    LabelOutOfRange {
        /// Offending label.
        label: usize,
        /// Number of clusters requested.
        clusters: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Vehicle index for every selected bin, in input order.
pub struct ClusterAssignment {
    labels: Vec<usize>,
    clusters: usize,
}

impl ClusterAssignment {
    fn single(points: usize) -> Self {
        Self {
            labels: vec![0; points],
            clusters: usize::from(points > 0),
        }
    }

    /// Number of groups, after reduction to the selected bin count.
    #[must_use]
    pub const fn cluster_count(&self) -> usize {
        self.clusters
    }

    /// Label of each input point.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Split `items` (aligned with the clustered points) into one group per label.
    ///
    /// Group `k` holds the items labelled `k` in input order. A group may be empty
    /// when k-means leaves a centroid without members.
    #[must_use]
    pub fn groups<T: Clone>(&self, items: &[T]) -> Vec<Vec<T>> {
        let mut groups = vec![Vec::new(); self.clusters];
        for (item, &label) in items.iter().zip(&self.labels) {
            if let Some(group) = groups.get_mut(label) {
                group.push(item.clone());
            }
        }
        groups
    }
}

/// Seeded k-means over raw latitude/longitude.
#[derive(Debug, Clone, Copy)]
pub struct Clusterer<'cfg> {
    config: &'cfg ClusteringConfig,
}

impl<'cfg> Clusterer<'cfg> {
    /// Create a clusterer with the given parameters.
    #[must_use]
    pub const fn new(config: &'cfg ClusteringConfig) -> Self {
        Self { config }
    }

    /// Partition `points` into at most `vehicles` groups.
    ///
    /// The vehicle count is reduced to the number of distinct coordinates. Identical
    /// input always yields an identical assignment.
    ///
    /// # Errors
    ///
    /// Returns a [`ClusterError`] when the k-means model cannot be fitted.
    pub fn assign(
        &self,
        points: &[GeoPoint],
        vehicles: usize,
    ) -> Result<ClusterAssignment, ClusterError> {
        let clusters = vehicles.min(distinct_count(points));
        debug!(
            points = points.len(),
            requested = vehicles,
            clusters,
            "partitioning bins"
        );

        if clusters <= 1 {
            return Ok(ClusterAssignment::single(points.len()));
        }

        let flat: Vec<f64> = points.iter().flat_map(|point| [point.lat, point.lon]).collect();
        let observations = Array2::from_shape_vec((points.len(), 2), flat)?;
        let dataset = DatasetBase::from(observations.clone());

        let model = KMeans::params_with_rng(clusters, StdRng::seed_from_u64(self.config.seed))
            .n_runs(self.config.restarts.max(1))
            .max_n_iterations(self.config.max_iterations)
            .tolerance(self.config.tolerance)
            .fit(&dataset)?;
        let predicted: Array1<usize> = model.predict(&observations);

        if let Some(&label) = predicted.iter().find(|&&label| label >= clusters) {
            return Err(ClusterError::LabelOutOfRange { label, clusters });
        }

        Ok(ClusterAssignment {
            labels: predicted.to_vec(),
            clusters,
        })
    }
}

fn distinct_count(points: &[GeoPoint]) -> usize {
    points
        .iter()
        .map(|point| (point.lat.to_bits(), point.lon.to_bits()))
        .collect::<HashSet<_>>()
        .len()
}
