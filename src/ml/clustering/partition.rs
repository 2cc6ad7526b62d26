use super::cluster::Cluster;
use super::point::Point;

/// Flat tables of points and clusters.
///
/// Clusters refer to their members by index into `points`, and each point
/// stores the index of the cluster holding it. All membership changes go
/// through this type so both sides always agree: a point listed by a cluster
/// points back at that cluster, and belongs to no other.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    points: Vec<Point>,
    clusters: Vec<Cluster>,
}

impl Partition {
    /// A partition over `points` with no clusters yet. Any back-references the
    /// points carry are cleared.
    pub fn new(points: Vec<Point>) -> Self {
        let mut partition = Self {
            points,
            clusters: Vec::new(),
        };
        partition.reset_clusters(Vec::new());
        partition
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn point(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    pub fn cluster(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    /// Appends an empty cluster with an optional centroid and returns its index.
    pub fn push_cluster(&mut self, centroid: Option<Point>) -> usize {
        self.clusters
            .push(centroid.map(Cluster::with_centroid).unwrap_or_default());
        self.clusters.len() - 1
    }

    /// Creates a cluster holding `members` (moving them out of any cluster
    /// they were in) with an optional centroid, and returns its index.
    ///
    /// # Panics
    ///
    /// If a member index is out of bounds.
    pub fn insert_cluster(&mut self, members: &[usize], centroid: Option<Point>) -> usize {
        let index = self.push_cluster(centroid);
        for &point in members {
            self.add_point(index, point);
        }
        index
    }

    /// Replaces every cluster with one empty cluster per centroid, in order.
    /// Every point becomes unassigned.
    pub fn reset_clusters(&mut self, centroids: Vec<Point>) {
        self.clusters.clear();
        for point in &mut self.points {
            point.set_cluster(None);
        }
        for centroid in centroids {
            self.push_cluster(Some(centroid));
        }
    }

    /// Moves `point` into `cluster`, first removing it from the cluster it was
    /// in. Re-adding a point to its own cluster moves it to the end of the
    /// member list.
    ///
    /// # Panics
    ///
    /// If either index is out of bounds.
    pub fn add_point(&mut self, cluster: usize, point: usize) {
        assert!(cluster < self.clusters.len(), "cluster index out of bounds");
        if let Some(previous) = self.points[point].cluster() {
            self.clusters[previous].remove_member(point);
        }
        self.clusters[cluster].push_member(point);
        self.points[point].set_cluster(Some(cluster));
    }

    /// Removes `point` from `cluster` and clears its back-reference. Returns
    /// `false`, changing nothing, if the point was not a member.
    pub fn remove_point(&mut self, cluster: usize, point: usize) -> bool {
        let removed = self
            .clusters
            .get_mut(cluster)
            .map_or(false, |c| c.remove_member(point));
        if removed {
            self.points[point].set_cluster(None);
        }
        removed
    }

    pub fn contains(&self, cluster: usize, point: usize) -> bool {
        self.clusters.get(cluster).map_or(false, |c| c.contains(point))
    }

    /// Members of `cluster` as points.
    ///
    /// # Panics
    ///
    /// If `cluster` is out of bounds.
    pub fn cluster_points(&self, cluster: usize) -> impl Iterator<Item = &Point> + '_ {
        self.clusters[cluster].member_points(&self.points)
    }

    /// Recomputes the centroid of `cluster` from its members; see
    /// [`Cluster::recompute_centroid`].
    pub fn recompute_centroid(&mut self, cluster: usize) -> Option<&Point> {
        self.clusters[cluster].recompute_centroid(&self.points)
    }

    pub(crate) fn set_centroid(&mut self, cluster: usize, centroid: Point) {
        self.clusters[cluster].set_centroid(centroid);
    }
}
