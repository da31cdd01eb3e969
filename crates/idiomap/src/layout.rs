//! Layered breadth-first layout.
//!
//! Nodes are assigned to layers by a multi-source BFS from the root set
//! (nodes with no incoming edge), then centered horizontally within each
//! layer. Layer membership and ordering derive only from input order and
//! edge order, never from hash-map iteration order, so identical input
//! always produces identical positions.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::visual::{VisualEdge, VisualNode};

pub struct LayoutEngine {
    node_spacing: f64,
    level_spacing: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        LayoutEngine::new(150.0, 200.0)
    }
}

impl LayoutEngine {
    pub fn new(node_spacing: f64, level_spacing: f64) -> Self {
        LayoutEngine {
            node_spacing,
            level_spacing,
        }
    }

    /// Assign a position to every node.
    ///
    /// Zero nodes pass through unchanged; a single node lands at the origin.
    pub fn position(&self, mut nodes: Vec<VisualNode>, edges: &[VisualEdge]) -> Vec<VisualNode> {
        if nodes.is_empty() {
            return nodes;
        }
        if nodes.len() == 1 {
            nodes[0].position.x = 0.0;
            nodes[0].position.y = 0.0;
            return nodes;
        }

        let layers = self.assign_layers(&nodes, edges);

        // Group node indices by layer, preserving input order within each.
        let max_layer = layers.iter().copied().max().unwrap_or(0);
        let mut by_layer: Vec<Vec<usize>> = vec![Vec::new(); max_layer + 1];
        for (index, layer) in layers.iter().enumerate() {
            by_layer[*layer].push(index);
        }

        for (layer, members) in by_layer.iter().enumerate() {
            let k = members.len() as f64;
            let left = -(k - 1.0) * self.node_spacing / 2.0;
            for (i, &index) in members.iter().enumerate() {
                nodes[index].position.x = left + i as f64 * self.node_spacing;
                nodes[index].position.y = layer as f64 * self.level_spacing;
            }
        }
        nodes
    }

    /// BFS layer per node index. Unreached nodes stay at layer 0.
    fn assign_layers(&self, nodes: &[VisualNode], edges: &[VisualEdge]) -> Vec<usize> {
        let index_of: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        // Adjacency and incoming counts over node indices, in edge order.
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut has_incoming = vec![false; nodes.len()];
        for edge in edges {
            let (Some(&source), Some(&target)) = (
                index_of.get(edge.source_id.as_str()),
                index_of.get(edge.target_id.as_str()),
            ) else {
                continue;
            };
            adjacency[source].push(target);
            has_incoming[target] = true;
        }

        let mut roots: Vec<usize> = (0..nodes.len()).filter(|&i| !has_incoming[i]).collect();
        if roots.is_empty() {
            // Cyclic or fully connected: fall back to the first node.
            debug!("no root nodes found; using the first node as the sole root");
            roots.push(0);
        }

        let mut layers = vec![0usize; nodes.len()];
        let mut visited: HashSet<usize> = roots.iter().copied().collect();
        let mut queue: VecDeque<usize> = roots.into_iter().collect();
        while let Some(current) = queue.pop_front() {
            for &next in &adjacency[current] {
                if visited.insert(next) {
                    layers[next] = layers[current] + 1;
                    queue.push_back(next);
                }
            }
        }
        layers
    }
}
