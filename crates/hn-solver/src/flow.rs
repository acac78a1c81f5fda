//! Flow rates from endpoint pressures and pipe resistance.

use std::f64::consts::PI;

use hn_core::units::in_m;
use hn_core::{Real, finite_or_zero};
use hn_network::Network;

use crate::connectivity::Connectivity;

/// Diameters at or below this (meters) count as blocked. The editor enforces
/// a 0.1 m minimum upstream; this guard is the solver's own backstop.
pub const DIAMETER_EPS_M: Real = 1e-6;

/// Hydraulic resistance of a pipe: `8 / (pi * d^4)`.
///
/// Degenerate diameters yield an infinite resistance, which downstream
/// turns into zero flow rather than a NaN.
pub fn resistance(diameter_m: Real) -> Real {
    if !diameter_m.is_finite() || diameter_m <= DIAMETER_EPS_M {
        return Real::INFINITY;
    }
    8.0 / (PI * diameter_m.powi(4))
}

/// Signed flow rate (m^3/s) per pipe, index-aligned with `network.pipes()`.
///
/// Active pipes carry `(p[source] - p[target]) / resistance` using the
/// pressures just produced for this iteration; positive means
/// source -> target. Inactive pipes (closed valve at either end, or a
/// dangling endpoint) carry exactly 0. Any non-finite intermediate also
/// resolves to 0: the calculator fails closed.
pub fn compute_flows(network: &Network, conn: &Connectivity, pressures: &[Real]) -> Vec<Real> {
    network
        .pipes()
        .iter()
        .map(|pipe| {
            if !conn.is_active(pipe.id) {
                return 0.0;
            }
            let r = resistance(in_m(pipe.diameter));
            if !r.is_finite() {
                return 0.0;
            }
            let (Some(&ps), Some(&pt)) = (
                pressures.get(pipe.source.idx()),
                pressures.get(pipe.target.idx()),
            ) else {
                return 0.0;
            };
            finite_or_zero((ps - pt) / r)
        })
        .collect()
}
