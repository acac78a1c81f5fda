//! Per-tick active-pipe resolution and adjacency.

use hn_core::PipeId;
use hn_network::{Network, NodeRole};

/// Which pipes currently carry water, and who can see whom through them.
///
/// A pipe is **active** iff both endpoints resolve to existing nodes and
/// neither endpoint is a closed valve. Adjacency is undirected and covers
/// active pipes only: if A-B is active, A lists B as a neighbor and vice
/// versa. Valve positions cannot change mid-tick (a tick is atomic), so
/// this is resolved once per solve.
#[derive(Debug, Clone)]
pub struct Connectivity {
    /// By pipe index: does the pipe currently carry water?
    pipe_active: Vec<bool>,

    /// Offsets into `neighbors`: node i's active neighbors are in
    /// neighbors[neighbor_offsets[i]..neighbor_offsets[i+1]].
    neighbor_offsets: Vec<usize>,

    /// Flat list of neighbor node indices over active pipes.
    neighbors: Vec<usize>,
}

impl Connectivity {
    /// Resolve connectivity for one tick of the given snapshot.
    pub fn resolve(network: &Network) -> Self {
        let pipe_active: Vec<bool> = network
            .pipes()
            .iter()
            .map(|pipe| {
                let endpoints_ok =
                    network.node(pipe.source).is_some() && network.node(pipe.target).is_some();
                // build() validates endpoints; a dangling pipe still fails
                // closed here rather than panicking.
                endpoints_ok
                    && !network.is_closed_valve(pipe.source)
                    && !network.is_closed_valve(pipe.target)
            })
            .collect();

        let mut neighbor_offsets = Vec::with_capacity(network.nodes().len() + 1);
        let mut neighbors = Vec::new();
        neighbor_offsets.push(0);

        for node in network.nodes() {
            // A closed valve is excluded from propagation entirely; all of
            // its pipes are inactive anyway, but skipping keeps it frozen
            // even against future role additions.
            if !matches!(node.role, NodeRole::Valve { open: false }) {
                for &pipe_id in network.node_pipes(node.id) {
                    if !pipe_active[pipe_id.idx()] {
                        continue;
                    }
                    if let Some(other) = network
                        .pipe(pipe_id)
                        .and_then(|pipe| pipe.other_end(node.id))
                    {
                        neighbors.push(other.idx());
                    }
                }
            }
            neighbor_offsets.push(neighbors.len());
        }

        Self {
            pipe_active,
            neighbor_offsets,
            neighbors,
        }
    }

    /// Does the pipe currently carry water?
    pub fn is_active(&self, pipe_id: PipeId) -> bool {
        self.pipe_active.get(pipe_id.idx()).copied().unwrap_or(false)
    }

    /// Active neighbor node indices of the node at `node_idx`.
    ///
    /// Empty for isolated nodes (no active pipe) — expected, not an error.
    pub fn neighbors(&self, node_idx: usize) -> &[usize] {
        if node_idx + 1 >= self.neighbor_offsets.len() {
            return &[];
        }
        let start = self.neighbor_offsets[node_idx];
        let end = self.neighbor_offsets[node_idx + 1];
        &self.neighbors[start..end]
    }
}
