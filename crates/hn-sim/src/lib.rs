//! Tick scheduling for live hydronet simulation.
//!
//! The solver itself owns no timer and no mutable global state; this crate
//! is the host-side scheduler that drives one solve per tick while the
//! simulation is marked running, serializes ticks, and gates which edits
//! are legal in which state:
//! - valve toggles: anytime (each tick re-reads valve state fresh)
//! - structural edits (nodes, pipes, diameters): only while stopped

pub mod error;
pub mod runner;

pub use error::{SimError, SimResult};
pub use runner::{TickOptions, TickRecord, TickRunner};
