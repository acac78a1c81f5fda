//! Incremental network builder.

use std::collections::HashMap;

use hn_core::units::{Length, Pressure};
use hn_core::{HnResult, NodeId, PipeId};

use crate::network::{Network, Node, NodeRole, Pipe};
use crate::validate;

/// Builder for constructing a network incrementally.
///
/// This is the editor boundary: malformed topology (dangling endpoints,
/// out-of-range diameters or reservoir pressures) is rejected here, so the
/// solver can assume a validated snapshot and fail closed on anything it
/// still finds suspicious.
///
/// Use the `add_*` methods to build up the topology, then call `build()`
/// to validate and freeze it into a `Network`.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    pipes: Vec<Pipe>,
    next_node_id: u32,
    next_pipe_id: u32,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn add_node(&mut self, name: impl Into<String>, role: NodeRole) -> NodeId {
        let id = NodeId::from_index(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.push(Node {
            id,
            name: name.into(),
            role,
        });
        id
    }

    /// Add a reservoir with an externally fixed pressure.
    pub fn add_reservoir(&mut self, name: impl Into<String>, pressure: Pressure) -> NodeId {
        self.add_node(name, NodeRole::Reservoir { pressure })
    }

    /// Add a valve in the given initial position.
    pub fn add_valve(&mut self, name: impl Into<String>, open: bool) -> NodeId {
        self.add_node(name, NodeRole::Valve { open })
    }

    /// Add a passive junction.
    pub fn add_junction(&mut self, name: impl Into<String>) -> NodeId {
        self.add_node(name, NodeRole::Junction)
    }

    /// Add a pipe between two nodes. Flow sign convention: positive is
    /// source -> target.
    pub fn add_pipe(
        &mut self,
        name: impl Into<String>,
        source: NodeId,
        target: NodeId,
        diameter: Length,
    ) -> PipeId {
        let id = PipeId::from_index(self.next_pipe_id);
        self.next_pipe_id += 1;
        self.pipes.push(Pipe {
            id,
            name: name.into(),
            source,
            target,
            diameter,
        });
        id
    }

    /// Rename a node (useful for post-construction adjustments).
    pub fn rename_node(&mut self, node_id: NodeId, new_name: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(node_id.idx()) {
            node.name = new_name.into();
        }
    }

    /// Build and validate the network, returning an immutable `Network`.
    pub fn build(self) -> HnResult<Network> {
        validate::validate_structure(&self.nodes, &self.pipes)?;

        let (node_pipe_offsets, node_pipes) = Self::build_adjacency(&self.nodes, &self.pipes);

        validate::validate_adjacency(&self.nodes, &self.pipes, &node_pipe_offsets, &node_pipes)?;

        Ok(Network {
            nodes: self.nodes,
            pipes: self.pipes,
            node_pipe_offsets,
            node_pipes,
        })
    }

    /// Build compact adjacency lists: for each node, its incident pipes.
    /// A pipe appears in both endpoints' lists.
    fn build_adjacency(nodes: &[Node], pipes: &[Pipe]) -> (Vec<usize>, Vec<PipeId>) {
        let mut node_to_pipes: HashMap<NodeId, Vec<PipeId>> = HashMap::new();
        for pipe in pipes {
            node_to_pipes.entry(pipe.source).or_default().push(pipe.id);
            node_to_pipes.entry(pipe.target).or_default().push(pipe.id);
        }

        // Sort each node's pipe list for determinism
        for pipe_list in node_to_pipes.values_mut() {
            pipe_list.sort_by_key(|p| p.index());
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat_pipes = Vec::new();
        offsets.push(0);

        for node in nodes {
            if let Some(pipe_list) = node_to_pipes.get(&node.id) {
                flat_pipes.extend_from_slice(pipe_list);
            }
            offsets.push(flat_pipes.len());
        }

        (offsets, flat_pipes)
    }
}
