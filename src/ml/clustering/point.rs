use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::{Error, Result};

/// A point (vector) in n-dimensional space.
///
/// The coordinates are fixed once the point is built. The only mutable part is
/// the index of the cluster currently holding the point, which is maintained by
/// [`Partition`](super::Partition) and never owns anything.
///
/// Equality compares coordinates only. Identity inside a partition is the
/// point's index.
#[derive(Debug, Clone)]
pub struct Point {
    coords: Vec<f64>,
    cluster: Option<usize>,
}

impl Point {
    /// Creates a point from the given coordinates. No range checks are made.
    pub fn new(coords: Vec<f64>) -> Self {
        Self {
            coords,
            cluster: None,
        }
    }

    /// Generates a point whose `i`-th coordinate is drawn uniformly from
    /// `ranges[i]`. The number of ranges determines the dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if a range has `min > max` or a bound
    /// that is not finite.
    ///
    /// # Example
    ///
    /// ```
    /// use honorroll::ml::clustering::Point;
    ///
    /// let mut rng = rand::thread_rng();
    /// let point = Point::random(&[0.0..=1.0, 2.0..=20.0, -5.0..=0.0], &mut rng).unwrap();
    /// assert_eq!(point.dimensions(), 3);
    /// ```
    pub fn random<R: Rng + ?Sized>(ranges: &[RangeInclusive<f64>], rng: &mut R) -> Result<Self> {
        let coords = ranges
            .iter()
            .enumerate()
            .map(|(dimension, range)| {
                let (min, max) = (*range.start(), *range.end());
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(Error::InvalidRange {
                        dimension,
                        min,
                        max,
                    });
                }
                // Interpolate instead of using `max - min`, which overflows
                // for spans wider than f64::MAX.
                let t: f64 = rng.gen();
                Ok((min * (1.0 - t) + max * t).clamp(min, max))
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Self::new(coords))
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Number of coordinates.
    pub fn dimensions(&self) -> usize {
        self.coords.len()
    }

    /// Index of the cluster holding this point, if any.
    pub fn cluster(&self) -> Option<usize> {
        self.cluster
    }

    pub(crate) fn set_cluster(&mut self, cluster: Option<usize>) {
        self.cluster = cluster;
    }

    /// Straight-line distance to `other`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the two points differ in dimensionality.
    pub fn euclidean_distance_to(&self, other: &Point) -> Result<f64> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                left: self.dimensions(),
                right: other.dimensions(),
            });
        }
        Ok(self
            .coords
            .iter()
            .zip(other.coords.iter())
            .fold(0.0, |acc, (&a, &b)| acc + (a - b).powi(2))
            .sqrt())
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.coords == other.coords
    }
}

/// The origin of 2-dimensional space.
impl Default for Point {
    fn default() -> Self {
        Self::new(vec![0.0, 0.0])
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

/// Per-dimension `[min, max]` spans over `points`, using the first point's
/// dimensionality. Shorter points only contribute to the dimensions they have.
///
/// Returns `None` when there are no points.
pub(crate) fn spans<'a, I>(points: I) -> Option<Vec<RangeInclusive<f64>>>
where
    I: IntoIterator<Item = &'a Point>,
{
    let mut points = points.into_iter();
    let first = points.next()?;
    let mut bounds: Vec<(f64, f64)> = first.coords.iter().map(|&c| (c, c)).collect();
    for point in points {
        for ((min, max), &c) in bounds.iter_mut().zip(point.coords.iter()) {
            *min = min.min(c);
            *max = max.max(c);
        }
    }
    Some(bounds.into_iter().map(|(min, max)| min..=max).collect())
}
