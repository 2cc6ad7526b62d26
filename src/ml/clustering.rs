pub mod cluster;
pub mod k_means;
pub mod partition;
pub mod point;


// Re-export public types
pub use cluster::Cluster;
pub use k_means::{EmptyClusterPolicy, KMeans, KMeansConfig, RunSummary, Termination};
pub use partition::Partition;
pub use point::Point;
