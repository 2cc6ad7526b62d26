use thiserror::Error;

/// Errors raised while building points or running a clustering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Two vectors that must share a dimensionality did not.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch { left: usize, right: usize },

    /// A clustering run was asked for zero clusters.
    #[error("cannot identify {0} clusters, at least one is required")]
    InvalidClusterCount(usize),

    /// Random centroids need dataset bounds, and an empty dataset has none.
    #[error("cannot sample random centroids from an empty dataset")]
    EmptyDataset,

    /// A sampling range for a random point was empty or not a number.
    #[error("invalid range for dimension {dimension}: {min}..={max}")]
    InvalidRange { dimension: usize, min: f64, max: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::DimensionMismatch { left: 4, right: 3 };
        assert_eq!(err.to_string(), "dimension mismatch: left=4, right=3");

        let err = Error::InvalidClusterCount(0);
        assert_eq!(
            err.to_string(),
            "cannot identify 0 clusters, at least one is required"
        );

        let err = Error::InvalidRange {
            dimension: 1,
            min: 2.0,
            max: 1.0,
        };
        assert_eq!(err.to_string(), "invalid range for dimension 1: 2..=1");
    }
}
