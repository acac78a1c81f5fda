//! Core network data structures.

use hn_core::units::{Length, Pressure};
use hn_core::{HnError, HnResult, NodeId, PipeId};

/// Editor-enforced diameter bounds, meters.
pub const MIN_DIAMETER_M: f64 = 0.1;
pub const MAX_DIAMETER_M: f64 = 5.0;

/// What a node does in the network.
///
/// A closed tagged variant: the connectivity resolver and the pressure
/// propagator both match on it exhaustively, so adding a role is a
/// compile-visible change everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeRole {
    /// Externally fixed pressure; the solver never overwrites it.
    Reservoir { pressure: Pressure },
    /// Disconnects its incident pipes when closed; open, it passes
    /// pressure on with a fixed fractional drop.
    Valve { open: bool },
    /// Passive node; its pressure is a damped average of its neighbors.
    Junction,
}

/// A node in the distribution network.
///
/// Position and visual attributes live with the host editor; the solver
/// only consumes id, name, and role.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub role: NodeRole,
}

/// A pipe connecting two nodes.
///
/// Sign convention for the derived flow rate: positive means
/// source -> target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pipe {
    pub id: PipeId,
    pub name: String,
    pub source: NodeId,
    pub target: NodeId,
    pub diameter: Length,
}

impl Pipe {
    /// The endpoint opposite `node`, if `node` is an endpoint at all.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if node == self.source {
            Some(self.target)
        } else if node == self.target {
            Some(self.source)
        } else {
            None
        }
    }
}

/// The network: a validated collection of nodes and pipes.
///
/// Nodes and pipes live in id-indexed arenas, so propagation is pure
/// lookup-by-handle with no ownership cycles even when the topology has
/// loops. Compact adjacency (offsets + flat list) records which pipes are
/// incident to each node.
///
/// The solver treats a `Network` as an immutable snapshot for the duration
/// of one tick. The only mutation exposed here is [`Network::set_valve_open`],
/// which the host may apply between ticks while the simulation runs;
/// structural edits go through a fresh [`crate::NetworkBuilder`].
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) pipes: Vec<Pipe>,

    /// Offsets for node->pipe adjacency: node i's incident pipes are in
    /// node_pipes[node_pipe_offsets[i]..node_pipe_offsets[i+1]].
    pub(crate) node_pipe_offsets: Vec<usize>,

    /// Flat list of pipe IDs incident to nodes (sorted for determinism).
    pub(crate) node_pipes: Vec<PipeId>,
}

impl Network {
    /// Return all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all pipes.
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.idx())
    }

    /// Get a pipe by ID (returns None if ID out of bounds).
    pub fn pipe(&self, id: PipeId) -> Option<&Pipe> {
        self.pipes.get(id.idx())
    }

    /// Iterate over all pipe IDs incident to a given node.
    pub fn node_pipes(&self, node_id: NodeId) -> &[PipeId] {
        let idx = node_id.idx();
        if idx >= self.nodes.len() {
            return &[];
        }
        let start = self.node_pipe_offsets[idx];
        let end = self.node_pipe_offsets[idx + 1];
        &self.node_pipes[start..end]
    }

    /// True if the node is a valve currently closed.
    pub fn is_closed_valve(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).map(|n| &n.role),
            Some(NodeRole::Valve { open: false })
        )
    }

    /// Toggle a valve.
    ///
    /// This is the one mutation permitted while the simulation is running:
    /// each tick re-reads valve state fresh and the solver carries no
    /// cross-tick state, so a toggle between ticks takes effect cleanly.
    pub fn set_valve_open(&mut self, id: NodeId, open: bool) -> HnResult<()> {
        let len = self.nodes.len();
        let node = self.nodes.get_mut(id.idx()).ok_or(HnError::IndexOob {
            what: "valve node id",
            index: id.idx(),
            len,
        })?;
        match &mut node.role {
            NodeRole::Valve { open: state } => {
                *state = open;
                Ok(())
            }
            NodeRole::Reservoir { .. } | NodeRole::Junction => Err(HnError::InvalidArg {
                what: "set_valve_open on a non-valve node",
            }),
        }
    }
}
