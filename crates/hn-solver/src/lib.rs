//! Steady-state pressure/flow solver for water-distribution networks.
//!
//! This crate provides a relaxation solver over a [`hn_network::Network`]
//! snapshot. Each invocation ("tick") resolves which pipes are active given
//! current valve positions, runs bounded Jacobi-style pressure passes, and
//! derives per-pipe flow rates from a diameter-driven resistance model.
//!
//! The solver is a pure function of its input snapshot: it re-seeds from
//! reservoir values every call and keeps no state between ticks, so valve
//! toggles between ticks take effect with no residual bias.

pub mod connectivity;
pub mod flow;
pub mod propagate;
pub mod solve;

pub use connectivity::Connectivity;
pub use flow::{DIAMETER_EPS_M, compute_flows, resistance};
pub use propagate::{DROP_JUNCTION, DROP_VALVE, propagate};
pub use solve::{MAX_ITERATIONS, Solution, TOLERANCE_BAR, solve};
