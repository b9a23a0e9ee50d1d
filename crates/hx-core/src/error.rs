//! Error types for the hx workspace.

use thiserror::Error;

/// hx error type.
///
/// Every failure in the binning core is raised synchronously through one of
/// these variants; the core performs no internal catching or retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Out-of-bounds index or coordinate, overlapping or non-increasing
    /// edges, or a gap inside a merge range.
    #[error("range error: {0}")]
    Range(String),

    /// Incompatible binning in a combination operator.
    #[error("logic error: {0}")]
    Logic(String),

    /// Structural mutation attempted on a locked axis.
    #[error("lock error: {0}")]
    Locked(String),

    /// Statistically undefined operation, e.g. a numerically unstable
    /// variance denominator or a null-area normalization.
    #[error("weight error: {0}")]
    Weight(String),

    /// Statistic requested with zero or marginal effective sample size.
    #[error("low stats error: {0}")]
    LowStats(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
