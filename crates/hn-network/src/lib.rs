//! hn-network: topology layer for hydronet.
//!
//! Provides:
//! - Core network data structures (Node, NodeRole, Pipe, Network)
//! - Incremental network builder with validation
//! - The one runtime mutation the solving loop permits: valve toggling
//!
//! # Example
//!
//! ```
//! use hn_core::units::{bar, m};
//! use hn_network::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::new();
//! let source = builder.add_reservoir("Tower", bar(100.0));
//! let tap = builder.add_junction("Tap");
//! builder.add_pipe("Main", source, tap, m(1.0));
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.nodes().len(), 2);
//! assert_eq!(network.pipes().len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod network;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::NetworkBuilder;
pub use error::NetworkError;
pub use network::{MAX_DIAMETER_M, MIN_DIAMETER_M, Network, Node, NodeRole, Pipe};
