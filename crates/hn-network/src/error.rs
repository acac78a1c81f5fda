//! Network-specific error types.

use hn_core::{HnError, NodeId, PipeId};

/// Network construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// A pipe endpoint refers to a node that doesn't exist.
    InvalidEndpoint { pipe: PipeId, node: NodeId },

    /// A pipe connects a node to itself.
    SelfLoop { pipe: PipeId, node: NodeId },

    /// A pipe diameter is outside the editor-enforced (0.1, 5.0] m range
    /// or non-finite.
    DiameterOutOfRange { pipe: PipeId, meters: f64 },

    /// A reservoir pressure is outside [0, 200] bar or non-finite.
    ReservoirPressureOutOfRange { node: NodeId, bars: f64 },

    /// Stored IDs don't match arena positions.
    NonContiguousIds { what: &'static str },

    /// Adjacency list is inconsistent (pipe listed for a node it doesn't touch).
    InconsistentAdjacency { pipe: PipeId, node: NodeId },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::InvalidEndpoint { pipe, node } => {
                write!(f, "Pipe {} refers to non-existent node {}", pipe, node)
            }
            NetworkError::SelfLoop { pipe, node } => {
                write!(f, "Pipe {} connects node {} to itself", pipe, node)
            }
            NetworkError::DiameterOutOfRange { pipe, meters } => {
                write!(f, "Pipe {} diameter {} m is out of range", pipe, meters)
            }
            NetworkError::ReservoirPressureOutOfRange { node, bars } => {
                write!(
                    f,
                    "Reservoir {} pressure {} bar is outside [0, 200]",
                    node, bars
                )
            }
            NetworkError::NonContiguousIds { what } => {
                write!(f, "{} IDs do not match their arena positions", what)
            }
            NetworkError::InconsistentAdjacency { pipe, node } => {
                write!(
                    f,
                    "Pipe {} in node {}'s adjacency list but doesn't touch that node",
                    pipe, node
                )
            }
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<NetworkError> for HnError {
    fn from(err: NetworkError) -> Self {
        HnError::Invariant {
            what: Box::leak(err.to_string().into_boxed_str()),
        }
    }
}
