//! Force-directed relaxation.
//!
//! Eades' spring embedder over node centers: linked nodes pull each other
//! with logarithmic springs, unlinked nodes push each other apart with an
//! inverse-square force, and every node moves by `step` times the net
//! force on it. Coincident nodes exert no force on each other.
//!
//! Distances are measured in canvas units; the defaults correspond to
//! Eades' constants with one unit of his drawing space scaled to
//! [`SpringLayout::spring_length`] canvas units.
//!
//! # References
//!
//! - Eades (1984), "A heuristic for graph drawing", Congressus Numerantium 42

use super::individual::LayoutView;
use super::prototype::GraphPrototype;
use crate::geometry::Vec2;

/// Pairs closer than this exert no force.
const MIN_DISTANCE: f64 = 1e-9;

/// Spring embedder parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringLayout {
    /// Spring stiffness between linked nodes.
    pub attraction: f64,

    /// Distance at which a spring exerts no force.
    pub spring_length: f64,

    /// Repulsion strength between unlinked nodes.
    pub repulsion: f64,

    /// Displacement per unit of force and iteration.
    pub step: f64,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            attraction: 2.0,
            spring_length: 150.0,
            repulsion: 150.0 * 150.0,
            step: 15.0,
        }
    }
}

impl SpringLayout {
    pub fn with_spring_length(mut self, length: f64) -> Self {
        self.spring_length = length;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.spring_length.is_finite() || self.spring_length <= 0.0 {
            return Err("spring_length must be positive".into());
        }
        if !self.attraction.is_finite() || !self.repulsion.is_finite() || !self.step.is_finite() {
            return Err("spring constants must be finite".into());
        }
        Ok(())
    }

    /// Net force on every node center.
    pub fn forces(&self, graph: &GraphPrototype, genotype: &[f64]) -> Vec<Vec2> {
        let view = LayoutView::new(graph, genotype);
        let n = view.node_count();
        let centers: Vec<Vec2> = (0..n).map(|i| view.node_box(i).center()).collect();

        let mut adjacent = vec![false; n * n];
        for link in graph.links() {
            adjacent[link.source_node * n + link.target_node] = true;
            adjacent[link.target_node * n + link.source_node] = true;
        }

        let mut forces = vec![Vec2::ZERO; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let delta = centers[j] - centers[i];
                let d = delta.norm();
                if d < MIN_DISTANCE {
                    continue;
                }
                let toward = delta * (1.0 / d);
                if adjacent[i * n + j] {
                    forces[i] = forces[i] + toward * (self.attraction * (d / self.spring_length).ln());
                } else {
                    forces[i] = forces[i] - toward * (self.repulsion / (d * d));
                }
            }
        }
        forces
    }

    /// Moves every node once along its net force.
    pub fn update(&self, graph: &GraphPrototype, genotype: &mut [f64]) {
        let forces = self.forces(graph, genotype);
        for (position, force) in genotype.chunks_exact_mut(2).zip(forces) {
            position[0] += self.step * force.x;
            position[1] += self.step * force.y;
        }
    }

    /// Runs `iterations` updates.
    pub fn relax(&self, graph: &GraphPrototype, genotype: &mut [f64], iterations: usize) {
        for _ in 0..iterations {
            self.update(graph, genotype);
        }
    }
}
