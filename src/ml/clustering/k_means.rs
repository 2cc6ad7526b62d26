use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::cluster::Cluster;
use super::partition::Partition;
use super::point::{spans, Point};
use crate::error::{Error, Result};

/// What to do with a cluster that ends an assignment pass with no members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Keep the centroid where it was. The cluster may stay empty for the rest
    /// of the run.
    #[default]
    Freeze,
    /// Move the centroid to a new random location inside the dataset bounds.
    /// Only done in iterations that still changed some membership, so a
    /// converged partition is never disturbed.
    Reseed,
}

/// Configuration options for k-means clustering.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Maximum number of assign/recompute iterations. At least one is always run.
    pub max_iterations: usize,
    /// Wall-clock budget for a run, checked after every iteration.
    pub deadline: Option<Duration>,
    /// Handling of clusters left without members.
    pub empty_clusters: EmptyClusterPolicy,
    /// Seed for random centroids. Seeded from OS entropy when unset.
    pub seed: Option<u64>,
}

impl KMeansConfig {
    /// Create a new config with default values: 300 iterations, no deadline,
    /// frozen empty clusters, and an unseeded generator.
    pub fn new() -> Self {
        Self {
            max_iterations: 300,
            deadline: None,
            empty_clusters: EmptyClusterPolicy::Freeze,
            seed: None,
        }
    }

    /// Customize the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Stop a run once it has taken longer than `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_empty_clusters(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_clusters = policy;
        self
    }

    /// Use a fixed seed so random centroids are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An iteration produced no membership changes.
    Converged,
    /// `max_iterations` was reached first.
    IterationLimit,
    /// The configured deadline passed first.
    DeadlineExceeded,
}

/// Statistics of the last successful run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub iterations: usize,
    pub termination: Termination,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Lloyd's k-means over a fixed dataset.
///
/// The engine owns the dataset as a [`Partition`]. Clusters are unset until
/// [`KMeans::identify_clusters`] succeeds, and every call rebuilds them from
/// scratch.
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    partition: Partition,
    config: KMeansConfig,
    summary: Option<RunSummary>,
}

impl KMeans {
    /// Number of clusters to look for when the caller has no preference.
    pub const DEFAULT_CLUSTER_COUNT: usize = 2;

    /// Creates an engine over `points` with the default configuration.
    pub fn new(points: Vec<Vec<f64>>) -> Self {
        Self::with_config(points, KMeansConfig::default())
    }

    pub fn with_config(points: Vec<Vec<f64>>, config: KMeansConfig) -> Self {
        Self {
            partition: Partition::new(points.into_iter().map(Point::new).collect()),
            config,
            summary: None,
        }
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    pub fn points(&self) -> &[Point] {
        self.partition.points()
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The clusters found by the last successful run, or `None` if there was none.
    pub fn clusters(&self) -> Option<&[Cluster]> {
        self.summary.map(|_| self.partition.clusters())
    }

    /// Member points of the cluster at `cluster`.
    ///
    /// # Panics
    ///
    /// If there is no such cluster.
    pub fn cluster_points(&self, cluster: usize) -> impl Iterator<Item = &Point> + '_ {
        self.partition.cluster_points(cluster)
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Partitions the dataset into clusters and returns them.
    ///
    /// With `initial_centroids`, one cluster is created per given vector and
    /// `k` is ignored. Otherwise `k` clusters are seeded with random centroids
    /// inside the per-dimension bounds of the whole dataset.
    ///
    /// Points are then repeatedly moved to the cluster with the nearest
    /// centroid (ties go to the earliest cluster) and centroids recomputed,
    /// until an iteration moves nothing or a configured limit is hit.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidClusterCount`] if no clusters would be created.
    /// - [`Error::EmptyDataset`] if random centroids are needed but there are no points.
    /// - [`Error::DimensionMismatch`] if the points and centroids do not all
    ///   share one dimensionality.
    ///
    /// A failed run leaves the engine without clusters.
    ///
    /// # Example
    ///
    /// ```
    /// use honorroll::ml::clustering::KMeans;
    ///
    /// let mut kmeans = KMeans::new(vec![
    ///     vec![1.0, 2.0],
    ///     vec![1.5, 1.8],
    ///     vec![5.0, 8.0],
    ///     vec![8.0, 8.0],
    /// ]);
    ///
    /// let seeds = vec![vec![0.0, 0.0], vec![10.0, 10.0]];
    /// let clusters = kmeans.identify_clusters(2, Some(&seeds)).unwrap();
    /// assert_eq!(clusters.len(), 2);
    /// assert_eq!(clusters[0].members(), &[0, 1]);
    /// assert_eq!(clusters[1].members(), &[2, 3]);
    /// ```
    pub fn identify_clusters(
        &mut self,
        k: usize,
        initial_centroids: Option<&[Vec<f64>]>,
    ) -> Result<&[Cluster]> {
        self.summary = None;
        let mut rng = self.config.rng();
        match self.run(k, initial_centroids, &mut rng) {
            Ok(summary) => {
                self.summary = Some(summary);
                Ok(self.partition.clusters())
            }
            Err(err) => {
                self.partition.reset_clusters(Vec::new());
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        k: usize,
        initial_centroids: Option<&[Vec<f64>]>,
        rng: &mut ChaCha20Rng,
    ) -> Result<RunSummary> {
        let started = Instant::now();

        let needs_bounds = initial_centroids.is_none()
            || self.config.empty_clusters == EmptyClusterPolicy::Reseed;
        let bounds = if needs_bounds {
            self.dataset_bounds()?
        } else {
            None
        };

        let centroids = match initial_centroids {
            Some(seeds) => seeds
                .iter()
                .map(|coords| Point::new(coords.clone()))
                .collect::<Vec<_>>(),
            None => {
                if k == 0 {
                    return Err(Error::InvalidClusterCount(k));
                }
                let ranges = bounds.as_deref().ok_or(Error::EmptyDataset)?;
                (0..k)
                    .map(|_| Point::random(ranges, rng))
                    .collect::<Result<Vec<_>>>()?
            }
        };
        if centroids.is_empty() {
            return Err(Error::InvalidClusterCount(0));
        }

        debug!(
            "seeded {} clusters over {} points",
            centroids.len(),
            self.partition.points().len()
        );
        self.partition.reset_clusters(centroids);

        let mut iterations = 0;
        let termination = loop {
            iterations += 1;
            let changes = self.assign_points()?;
            debug!("iteration {}: {} membership changes", iterations, changes);
            self.recompute_centroids(changes > 0, bounds.as_deref(), rng)?;

            if changes == 0 {
                debug!("converged after {} iterations", iterations);
                break Termination::Converged;
            }
            if iterations >= self.config.max_iterations {
                warn!(
                    "stopping after {} iterations without converging ({} changes in the last one)",
                    iterations, changes
                );
                break Termination::IterationLimit;
            }
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    warn!(
                        "stopping after {} iterations, deadline of {:?} exceeded",
                        iterations, deadline
                    );
                    break Termination::DeadlineExceeded;
                }
            }
        };

        Ok(RunSummary {
            iterations,
            termination,
            elapsed: started.elapsed(),
        })
    }

    /// Per-dimension bounds of the whole dataset, `None` if it is empty.
    fn dataset_bounds(&self) -> Result<Option<Vec<RangeInclusive<f64>>>> {
        let points = self.partition.points();
        if let Some(first) = points.first() {
            if let Some(odd) = points.iter().find(|p| p.dimensions() != first.dimensions()) {
                return Err(Error::DimensionMismatch {
                    left: first.dimensions(),
                    right: odd.dimensions(),
                });
            }
        }
        Ok(spans(points))
    }

    /// Moves every point, in dataset order, to its nearest cluster. Returns how
    /// many points ended up in a different cluster than before.
    fn assign_points(&mut self) -> Result<usize> {
        let mut changes = 0;
        for index in 0..self.partition.points().len() {
            let point = &self.partition.points()[index];
            let nearest = match nearest_cluster(self.partition.clusters(), point)? {
                Some(nearest) => nearest,
                None => continue,
            };
            if point.cluster() != Some(nearest) {
                changes += 1;
            }
            self.partition.add_point(nearest, index);
        }
        Ok(changes)
    }

    fn recompute_centroids(
        &mut self,
        changed: bool,
        bounds: Option<&[RangeInclusive<f64>]>,
        rng: &mut ChaCha20Rng,
    ) -> Result<()> {
        let reseed = changed && self.config.empty_clusters == EmptyClusterPolicy::Reseed;
        for index in 0..self.partition.clusters().len() {
            if reseed && self.partition.clusters()[index].is_empty() {
                if let Some(ranges) = bounds {
                    let centroid = Point::random(ranges, rng)?;
                    trace!("re-seeding empty cluster {} at {:?}", index, centroid.coords());
                    self.partition.set_centroid(index, centroid);
                }
            } else {
                self.partition.recompute_centroid(index);
            }
        }
        Ok(())
    }
}

/// Index of the cluster whose centroid is closest to `point`. On ties the
/// first such cluster wins. Clusters without a centroid are skipped.
fn nearest_cluster(clusters: &[Cluster], point: &Point) -> Result<Option<usize>> {
    let mut best: Option<(usize, f64)> = None;
    for (index, cluster) in clusters.iter().enumerate() {
        let centroid = match cluster.centroid() {
            Some(centroid) => centroid,
            None => continue,
        };
        let distance = point.euclidean_distance_to(centroid)?;
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    Ok(best.map(|(index, _)| index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Vec<Vec<f64>> {
        vec![vec![0.0], vec![1.0], vec![9.0], vec![10.0]]
    }

    #[test]
    fn test_config_defaults() {
        let config = KMeansConfig::default();
        assert_eq!(config.max_iterations, 300);
        assert_eq!(config.deadline, None);
        assert_eq!(config.empty_clusters, EmptyClusterPolicy::Freeze);
        assert_eq!(config.seed, None);

        let config = KMeansConfig::new()
            .with_max_iterations(5)
            .with_deadline(Duration::from_millis(10))
            .with_empty_clusters(EmptyClusterPolicy::Reseed)
            .with_seed(42);
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.deadline, Some(Duration::from_millis(10)));
        assert_eq!(config.empty_clusters, EmptyClusterPolicy::Reseed);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_new_engine_has_no_clusters() {
        let kmeans = KMeans::default();
        assert!(kmeans.points().is_empty());
        assert!(kmeans.clusters().is_none());
        assert!(kmeans.summary().is_none());

        let kmeans = KMeans::new(line());
        assert_eq!(kmeans.points().len(), 4);
        assert_eq!(kmeans.points()[2].coords(), &[9.0]);
        assert!(kmeans.clusters().is_none());
    }

    #[test]
    fn test_nearest_cluster_first_minimum_wins() {
        let clusters = vec![
            Cluster::new(),
            Cluster::with_centroid(Point::new(vec![0.0])),
            Cluster::with_centroid(Point::new(vec![2.0])),
            Cluster::with_centroid(Point::new(vec![0.0])),
        ];
        let point = Point::new(vec![1.0]);
        assert_eq!(nearest_cluster(&clusters, &point), Ok(Some(1)));
        assert_eq!(nearest_cluster(&[], &point), Ok(None));
    }

    #[test]
    fn test_identical_seeds_send_everything_to_first() {
        let mut kmeans = KMeans::new(line());
        let seeds = vec![vec![5.0], vec![5.0]];
        let clusters = kmeans.identify_clusters(2, Some(&seeds)).unwrap();
        assert_eq!(clusters[0].members(), &[0, 1, 2, 3]);
        assert!(clusters[1].is_empty());
        assert_eq!(clusters[1].centroid().unwrap().coords(), &[5.0]);
        assert!(kmeans.summary().unwrap().converged());
    }

    #[test]
    fn test_seeds_override_k() {
        let mut kmeans = KMeans::new(line());
        let seeds = vec![vec![0.0], vec![10.0]];
        let clusters = kmeans.identify_clusters(7, Some(&seeds)).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].centroid().unwrap().coords(), &[0.5]);
        assert_eq!(clusters[1].centroid().unwrap().coords(), &[9.5]);
        assert_eq!(kmeans.summary().unwrap().iterations, 2);
    }

    #[test]
    fn test_zero_clusters_rejected() {
        let mut kmeans = KMeans::new(line());
        assert_eq!(
            kmeans.identify_clusters(0, None),
            Err(Error::InvalidClusterCount(0))
        );
        assert_eq!(
            kmeans.identify_clusters(3, Some(&[])),
            Err(Error::InvalidClusterCount(0))
        );
        assert!(kmeans.clusters().is_none());
    }

    #[test]
    fn test_random_seeding_needs_points() {
        let mut kmeans = KMeans::default();
        assert_eq!(
            kmeans.identify_clusters(KMeans::DEFAULT_CLUSTER_COUNT, None),
            Err(Error::EmptyDataset)
        );
    }

    #[test]
    fn test_empty_dataset_with_seeds() {
        let mut kmeans = KMeans::default();
        let seeds = vec![vec![1.0, 1.0], vec![2.0, 2.0]];
        let clusters = kmeans.identify_clusters(2, Some(&seeds)).unwrap();
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(Cluster::is_empty));
        assert_eq!(clusters[1].centroid().unwrap().coords(), &[2.0, 2.0]);
        let summary = kmeans.summary().unwrap();
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.termination, Termination::Converged);
    }

    #[test]
    fn test_seed_dimension_mismatch_aborts_run() {
        let mut kmeans = KMeans::new(line());
        kmeans.identify_clusters(2, Some(&[vec![0.0], vec![10.0]])).unwrap();
        assert!(kmeans.clusters().is_some());

        let result = kmeans.identify_clusters(2, Some(&[vec![0.0, 0.0], vec![1.0, 1.0]]));
        assert_eq!(result, Err(Error::DimensionMismatch { left: 1, right: 2 }));
        assert!(kmeans.clusters().is_none());
        assert!(kmeans.summary().is_none());
        assert!(kmeans.points().iter().all(|p| p.cluster().is_none()));
    }

    #[test]
    fn test_ragged_dataset_rejected_for_random_seeding() {
        let mut kmeans = KMeans::new(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0]]);
        assert_eq!(
            kmeans.identify_clusters(2, None),
            Err(Error::DimensionMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn test_iteration_limit() {
        let config = KMeansConfig::new().with_max_iterations(1);
        let mut kmeans = KMeans::with_config(line(), config);
        let clusters = kmeans.identify_clusters(2, Some(&[vec![0.0], vec![10.0]])).unwrap();
        // The single pass still assigns every point.
        assert_eq!(clusters.iter().map(Cluster::size).sum::<usize>(), 4);
        let summary = kmeans.summary().unwrap();
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.termination, Termination::IterationLimit);
        assert!(!summary.converged());
    }

    #[test]
    fn test_zero_iteration_cap_still_runs_one_pass() {
        let config = KMeansConfig::new().with_max_iterations(0);
        let mut kmeans = KMeans::with_config(line(), config);
        kmeans.identify_clusters(2, Some(&[vec![0.0], vec![10.0]])).unwrap();
        assert_eq!(kmeans.summary().unwrap().iterations, 1);
        assert!(kmeans.points().iter().all(|p| p.cluster().is_some()));
    }

    #[test]
    fn test_deadline() {
        let config = KMeansConfig::new().with_deadline(Duration::ZERO);
        let mut kmeans = KMeans::with_config(line(), config);
        kmeans.identify_clusters(2, Some(&[vec![0.0], vec![10.0]])).unwrap();
        let summary = kmeans.summary().unwrap();
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.termination, Termination::DeadlineExceeded);
    }

    #[test]
    fn test_frozen_empty_cluster_keeps_centroid() {
        let mut kmeans = KMeans::new(line());
        let seeds = vec![vec![0.0], vec![10.0], vec![100.0]];
        let clusters = kmeans.identify_clusters(3, Some(&seeds)).unwrap();
        assert!(clusters[2].is_empty());
        assert_eq!(clusters[2].centroid().unwrap().coords(), &[100.0]);
    }

    #[test]
    fn test_reseeded_empty_cluster_moves_inside_bounds() {
        let config = KMeansConfig::new()
            .with_empty_clusters(EmptyClusterPolicy::Reseed)
            .with_seed(3);
        let mut kmeans = KMeans::with_config(line(), config);
        let seeds = vec![vec![0.0], vec![10.0], vec![100.0]];
        let clusters = kmeans.identify_clusters(3, Some(&seeds)).unwrap();
        let c = clusters[2].centroid().unwrap().coords()[0];
        assert!((0.0..=10.0).contains(&c));
        assert_eq!(clusters.iter().map(Cluster::size).sum::<usize>(), 4);
    }

    #[test]
    fn test_seeded_random_runs_repeat() {
        let config = KMeansConfig::new().with_seed(1234);
        let mut first = KMeans::with_config(line(), config.clone());
        let mut second = KMeans::with_config(line(), config);
        let a = first.identify_clusters(2, None).unwrap().to_vec();
        let b = second.identify_clusters(2, None).unwrap().to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rerun_discards_previous_clusters() {
        let mut kmeans = KMeans::new(line());
        kmeans.identify_clusters(2, Some(&[vec![0.0], vec![10.0]])).unwrap();
        let clusters = kmeans
            .identify_clusters(3, Some(&[vec![0.0], vec![5.0], vec![10.0]]))
            .unwrap();
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters.iter().map(Cluster::size).sum::<usize>(), 4);
        let members: Vec<Vec<f64>> = kmeans
            .cluster_points(2)
            .map(|p| p.coords().to_vec())
            .collect();
        assert_eq!(members, vec![vec![9.0], vec![10.0]]);
    }
}
