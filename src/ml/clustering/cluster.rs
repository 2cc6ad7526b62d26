use std::ops::RangeInclusive;

use super::point::{spans, Point};

/// A group of points plus the centroid representing them.
///
/// Members are stored as indices into the point table of the owning
/// [`Partition`](super::Partition); adding and removing members goes through
/// the partition so that every point's back-reference stays in sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    members: Vec<usize>,
    centroid: Option<Point>,
}

impl Cluster {
    /// An empty cluster without a centroid.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty cluster seeded with `centroid`.
    pub fn with_centroid(centroid: Point) -> Self {
        Self {
            members: Vec::new(),
            centroid: Some(centroid),
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Indices of the member points, in the order they were added.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn centroid(&self) -> Option<&Point> {
        self.centroid.as_ref()
    }

    pub(crate) fn set_centroid(&mut self, centroid: Point) {
        self.centroid = Some(centroid);
    }

    /// Whether the point at index `point` is a member. Matching is by index,
    /// so two points with equal coordinates are still told apart.
    pub fn contains(&self, point: usize) -> bool {
        self.members.contains(&point)
    }

    /// Iterates over the member points, resolved against the point table.
    pub fn member_points<'a>(&'a self, points: &'a [Point]) -> impl Iterator<Item = &'a Point> + 'a {
        self.members.iter().map(move |&i| &points[i])
    }

    /// Dimensionality of the first member, or `None` for an empty cluster.
    /// Members are assumed to share it.
    pub fn dimensionality(&self, points: &[Point]) -> Option<usize> {
        self.member_points(points).next().map(Point::dimensions)
    }

    /// For each dimension, the span covering every member's coordinate in
    /// that dimension. `None` for an empty cluster.
    pub fn dimensional_ranges(&self, points: &[Point]) -> Option<Vec<RangeInclusive<f64>>> {
        spans(self.member_points(points))
    }

    /// Replaces the centroid with the coordinate-wise mean of the members and
    /// returns it. An empty cluster keeps its current centroid.
    pub fn recompute_centroid(&mut self, points: &[Point]) -> Option<&Point> {
        let dims = match self.dimensionality(points) {
            Some(dims) => dims,
            None => return self.centroid.as_ref(),
        };

        let mut sums = vec![0.0; dims];
        for point in self.member_points(points) {
            for (sum, &c) in sums.iter_mut().zip(point.coords()) {
                *sum += c;
            }
        }
        let count = self.members.len() as f64;
        let mean = sums.into_iter().map(|s| s / count).collect();

        self.centroid = Some(Point::new(mean));
        self.centroid.as_ref()
    }

    pub(crate) fn push_member(&mut self, point: usize) {
        self.members.push(point);
    }

    /// Removes `point` from the member list, keeping the order of the rest.
    pub(crate) fn remove_member(&mut self, point: usize) -> bool {
        match self.members.iter().position(|&m| m == point) {
            Some(pos) => {
                self.members.remove(pos);
                true
            }
            None => false,
        }
    }
}
