//! Random graph prototypes for benchmarking.
//!
//! Links only run from lower to higher node indices, so generated graphs
//! are acyclic, like the data-flow graphs the layouts are meant for.

use super::prototype::{GraphError, GraphPrototype, Link, NodePrototype};
use crate::geometry::Vec2;
use rand::Rng;

/// Shape of a random graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomGraphConfig {
    pub node_count: usize,

    /// Inputs and outputs of every node.
    pub ports_per_node: usize,

    /// Probability of linking a given output port to a given input port of
    /// a later node.
    pub connection_rate: f64,

    pub node_size: Vec2,

    /// Canvas side length contributed by each node.
    pub canvas_per_node: f64,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        Self {
            node_count: 10,
            ports_per_node: 2,
            connection_rate: 0.1,
            node_size: Vec2::new(100.0, 60.0),
            canvas_per_node: 120.0,
        }
    }
}

impl RandomGraphConfig {
    pub fn with_node_count(mut self, n: usize) -> Self {
        self.node_count = n;
        self
    }

    pub fn with_ports_per_node(mut self, n: usize) -> Self {
        self.ports_per_node = n;
        self
    }

    pub fn with_connection_rate(mut self, rate: f64) -> Self {
        self.connection_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_canvas_per_node(mut self, size: f64) -> Self {
        self.canvas_per_node = size;
        self
    }

    /// Side length of the square canvas.
    pub fn canvas_side(&self) -> f64 {
        self.canvas_per_node * self.node_count.max(1) as f64
    }

    /// Draws a random prototype.
    ///
    /// Fails only if the configured sizes are not positive.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<GraphPrototype, GraphError> {
        let side = self.canvas_side();
        let mut graph = GraphPrototype::new(Vec2::new(side, side))?;

        for i in 0..self.node_count {
            let proto = graph.add_prototype(NodePrototype::new(
                format!("N{i}"),
                self.node_size,
                self.ports_per_node,
                self.ports_per_node,
            ))?;
            graph.add_node(proto, "")?;
        }

        let rate = self.connection_rate.clamp(0.0, 1.0);
        for source in 0..self.node_count {
            for target in (source + 1)..self.node_count {
                for out_port in 0..self.ports_per_node {
                    for in_port in 0..self.ports_per_node {
                        if rng.random_bool(rate) {
                            graph.add_link(Link::new(source, out_port, target, in_port))?;
                        }
                    }
                }
            }
        }

        Ok(graph)
    }
}
