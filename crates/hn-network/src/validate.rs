//! Network validation logic.

use hn_core::units::{in_bar, in_m};
use hn_core::{HnResult, PipeId};

use crate::error::NetworkError;
use crate::network::{MAX_DIAMETER_M, MIN_DIAMETER_M, Node, NodeRole, Pipe};

/// Validate the network structure: endpoints exist, parameters are in the
/// editor-enforced domains, IDs are contiguous.
pub(crate) fn validate_structure(nodes: &[Node], pipes: &[Pipe]) -> HnResult<()> {
    // IDs must match their arena positions
    for (i, node) in nodes.iter().enumerate() {
        if node.id.idx() != i {
            return Err(NetworkError::NonContiguousIds { what: "node" }.into());
        }
    }
    for (i, pipe) in pipes.iter().enumerate() {
        if pipe.id.idx() != i {
            return Err(NetworkError::NonContiguousIds { what: "pipe" }.into());
        }
    }

    for pipe in pipes {
        for endpoint in [pipe.source, pipe.target] {
            if endpoint.idx() >= nodes.len() {
                return Err(NetworkError::InvalidEndpoint {
                    pipe: pipe.id,
                    node: endpoint,
                }
                .into());
            }
        }
        if pipe.source == pipe.target {
            return Err(NetworkError::SelfLoop {
                pipe: pipe.id,
                node: pipe.source,
            }
            .into());
        }

        let d = in_m(pipe.diameter);
        if !d.is_finite() || d < MIN_DIAMETER_M || d > MAX_DIAMETER_M {
            return Err(NetworkError::DiameterOutOfRange {
                pipe: pipe.id,
                meters: d,
            }
            .into());
        }
    }

    for node in nodes {
        if let NodeRole::Reservoir { pressure } = node.role {
            let p = in_bar(pressure);
            if !p.is_finite() || !(0.0..=200.0).contains(&p) {
                return Err(NetworkError::ReservoirPressureOutOfRange {
                    node: node.id,
                    bars: p,
                }
                .into());
            }
        }
    }

    Ok(())
}

/// Validate adjacency lists for consistency: every pipe appears in exactly
/// its two endpoints' lists and nowhere else.
pub(crate) fn validate_adjacency(
    nodes: &[Node],
    pipes: &[Pipe],
    node_pipe_offsets: &[usize],
    node_pipes: &[PipeId],
) -> HnResult<()> {
    if node_pipe_offsets.len() != nodes.len() + 1 {
        return Err(NetworkError::NonContiguousIds { what: "adjacency" }.into());
    }

    let mut seen = vec![0_u8; pipes.len()];

    for node in nodes {
        let idx = node.id.idx();
        let start = node_pipe_offsets[idx];
        let end = node_pipe_offsets[idx + 1];

        for &pipe_id in &node_pipes[start..end] {
            let Some(pipe) = pipes.get(pipe_id.idx()) else {
                return Err(NetworkError::InconsistentAdjacency {
                    pipe: pipe_id,
                    node: node.id,
                }
                .into());
            };
            if pipe.source != node.id && pipe.target != node.id {
                return Err(NetworkError::InconsistentAdjacency {
                    pipe: pipe_id,
                    node: node.id,
                }
                .into());
            }
            seen[pipe_id.idx()] += 1;
        }
    }

    for (i, &count) in seen.iter().enumerate() {
        if count != 2 {
            return Err(NetworkError::InconsistentAdjacency {
                pipe: PipeId::from_index(i as u32),
                node: pipes[i].source,
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::Id;
    use hn_core::units::{bar, m};

    fn junction(index: u32) -> Node {
        Node {
            id: Id::from_index(index),
            name: format!("J{index}"),
            role: NodeRole::Junction,
        }
    }

    #[test]
    fn validate_empty_network() {
        assert!(validate_structure(&[], &[]).is_ok());
    }

    #[test]
    fn validate_invalid_endpoint() {
        let nodes = vec![junction(0)];
        let pipes = vec![Pipe {
            id: Id::from_index(0),
            name: "P".into(),
            source: Id::from_index(0),
            target: Id::from_index(99), // Invalid!
            diameter: m(1.0),
        }];

        let result = validate_structure(&nodes, &pipes);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            hn_core::HnError::Invariant { .. }
        ));
    }

    #[test]
    fn validate_diameter_bounds() {
        let nodes = vec![junction(0), junction(1)];
        for bad in [0.0, 0.05, 5.5, f64::NAN] {
            let pipes = vec![Pipe {
                id: Id::from_index(0),
                name: "P".into(),
                source: Id::from_index(0),
                target: Id::from_index(1),
                diameter: m(bad),
            }];
            assert!(validate_structure(&nodes, &pipes).is_err(), "d = {bad}");
        }
    }

    #[test]
    fn validate_reservoir_pressure_bounds() {
        for bad in [-1.0, 200.5, f64::INFINITY] {
            let nodes = vec![Node {
                id: Id::from_index(0),
                name: "R".into(),
                role: NodeRole::Reservoir { pressure: bar(bad) },
            }];
            assert!(validate_structure(&nodes, &[]).is_err(), "p = {bad}");
        }
    }
}
