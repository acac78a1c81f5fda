//! Jacobi-style pressure relaxation pass.

use hn_core::Real;
use hn_network::{Network, NodeRole};

use crate::connectivity::Connectivity;

/// Fractional pressure drop across an open valve.
pub const DROP_VALVE: Real = 0.05;

/// Fractional pressure drop at a junction (half of it is applied).
pub const DROP_JUNCTION: Real = 0.05;

/// Run one relaxation pass, producing the next pressure snapshot (bar).
///
/// Jacobi-style: every neighbor read comes from `prev`, the snapshot taken
/// at the start of the iteration, never from values already updated in the
/// same pass.
///
/// Update rules per role:
/// - Reservoir: never recomputed; its pressure is an external constant.
/// - Closed valve: frozen, excluded from recomputation entirely.
/// - Open valve with at least one active neighbor at positive pressure:
///   `max(positive neighbors) * (1 - DROP_VALVE)`.
/// - Junction with at least one such neighbor:
///   `avg(positive neighbors) * (1 - DROP_JUNCTION / 2)`.
/// - Anything without a qualifying neighbor keeps its previous pressure.
pub fn propagate(network: &Network, conn: &Connectivity, prev: &[Real]) -> Vec<Real> {
    let mut next = prev.to_vec();

    for (i, node) in network.nodes().iter().enumerate() {
        match node.role {
            NodeRole::Reservoir { .. } => {}
            NodeRole::Valve { open: false } => {}
            NodeRole::Valve { open: true } => {
                if let Some((_avg, max)) = positive_neighbor_stats(conn.neighbors(i), prev) {
                    next[i] = max * (1.0 - DROP_VALVE);
                }
            }
            NodeRole::Junction => {
                if let Some((avg, _max)) = positive_neighbor_stats(conn.neighbors(i), prev) {
                    next[i] = avg * (1.0 - DROP_JUNCTION / 2.0);
                }
            }
        }
    }

    next
}

/// Mean and maximum over neighbors whose snapshot pressure is > 0.
/// None when no neighbor qualifies.
fn positive_neighbor_stats(neighbors: &[usize], prev: &[Real]) -> Option<(Real, Real)> {
    let mut sum = 0.0;
    let mut max = 0.0;
    let mut count = 0_usize;

    for &n in neighbors {
        let Some(&p) = prev.get(n) else { continue };
        if p > 0.0 {
            sum += p;
            if p > max {
                max = p;
            }
            count += 1;
        }
    }

    if count == 0 {
        None
    } else {
        Some((sum / count as Real, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{bar, m};
    use hn_network::NetworkBuilder;

    #[test]
    fn junction_takes_damped_average() {
        // Two reservoirs feed one junction: avg(100, 50) * 0.975
        let mut builder = NetworkBuilder::new();
        let r1 = builder.add_reservoir("R1", bar(100.0));
        let r2 = builder.add_reservoir("R2", bar(50.0));
        let j = builder.add_junction("J");
        builder.add_pipe("P1", r1, j, m(1.0));
        builder.add_pipe("P2", r2, j, m(1.0));
        let network = builder.build().unwrap();
        let conn = Connectivity::resolve(&network);

        let prev = vec![100.0, 50.0, 0.0];
        let next = propagate(&network, &conn, &prev);
        assert!((next[j.idx()] - 75.0 * 0.975).abs() < 1e-12);
        // Reservoirs untouched
        assert_eq!(next[r1.idx()], 100.0);
        assert_eq!(next[r2.idx()], 50.0);
    }

    #[test]
    fn open_valve_takes_damped_max() {
        let mut builder = NetworkBuilder::new();
        let r1 = builder.add_reservoir("R1", bar(100.0));
        let r2 = builder.add_reservoir("R2", bar(50.0));
        let v = builder.add_valve("V", true);
        builder.add_pipe("P1", r1, v, m(1.0));
        builder.add_pipe("P2", r2, v, m(1.0));
        let network = builder.build().unwrap();
        let conn = Connectivity::resolve(&network);

        let prev = vec![100.0, 50.0, 0.0];
        let next = propagate(&network, &conn, &prev);
        assert!((next[v.idx()] - 100.0 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn zero_pressure_neighbors_do_not_qualify() {
        // Junction whose only neighbor sits at 0 keeps its previous value.
        let mut builder = NetworkBuilder::new();
        let a = builder.add_junction("A");
        let b = builder.add_junction("B");
        builder.add_pipe("P", a, b, m(1.0));
        let network = builder.build().unwrap();
        let conn = Connectivity::resolve(&network);

        let prev = vec![0.0, 0.0];
        let next = propagate(&network, &conn, &prev);
        assert_eq!(next, prev);
    }

    #[test]
    fn closed_valve_is_frozen_at_current_value() {
        let mut builder = NetworkBuilder::new();
        let r = builder.add_reservoir("R", bar(100.0));
        let v = builder.add_valve("V", false);
        builder.add_pipe("P", r, v, m(1.0));
        let network = builder.build().unwrap();
        let conn = Connectivity::resolve(&network);

        // Valve had pressure from before it was closed; it must hold it.
        let prev = vec![100.0, 42.0];
        let next = propagate(&network, &conn, &prev);
        assert_eq!(next[v.idx()], 42.0);
    }

    #[test]
    fn stats_ignore_out_of_range_neighbors() {
        assert_eq!(positive_neighbor_stats(&[5, 6], &[1.0, 2.0]), None);
        let stats = positive_neighbor_stats(&[0, 1, 9], &[4.0, 8.0]).unwrap();
        assert_eq!(stats, (6.0, 8.0));
    }
}
