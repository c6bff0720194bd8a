//! Error type shared by every fallible operation of the crate.
//!
//! Failures are scoped to the graph or region being processed; callers that
//! work through many problems report the error and move on to the next one.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FacetError {
    /// Malformed input graph: dangling reference, inconsistent annotation,
    /// or a traced walk that never closes.
    #[error("structural graph error: {0}")]
    StructuralGraph(String),
    /// A curve was evaluated outside its declared domain.
    #[error("{curve}: {value} lies outside domain {domain}")]
    Domain {
        curve: String,
        value: f64,
        domain: String,
    },
    /// Inverse requested for a function that is not monotone on its domain.
    #[error("{0}: inverse undefined on a non-monotone domain")]
    InverseUndefined(String),
    /// A candidate region failed the `upper(x) >= lower(x)` check.
    #[error("region {cycle}: upper chain below lower chain at x = {x} ({upper} < {lower})")]
    Classification {
        cycle: usize,
        x: f64,
        upper: f64,
        lower: f64,
    },
    #[error("unsupported topology: {0}")]
    UnsupportedTopology(String),
    #[error("axis {0} passes through the region")]
    AxisThroughRegion(String),
}

impl FacetError {
    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        FacetError::StructuralGraph(msg.into())
    }

    /// True for errors that a caller may recover from by narrowing the
    /// evaluation domain and retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FacetError::Domain { .. })
    }
}

pub type Result<T> = std::result::Result<T, FacetError>;
