//! Lloyd's k-means clustering of points in n-dimensional space.
//!
//! The entry point is [`ml::clustering::KMeans`]:
//!
//! ```
//! use honorroll::ml::clustering::{KMeans, KMeansConfig};
//!
//! let points = vec![
//!     vec![0.1, 0.1], vec![0.15, 0.15],
//!     vec![0.9, 0.9], vec![0.95, 0.95],
//! ];
//! let mut kmeans = KMeans::with_config(points, KMeansConfig::new().with_seed(7));
//! let clusters = kmeans.identify_clusters(KMeans::DEFAULT_CLUSTER_COUNT, None)?;
//! assert_eq!(clusters.len(), 2);
//! # Ok::<(), honorroll::Error>(())
//! ```

pub mod error;
pub mod ml;

pub use error::{Error, Result};
