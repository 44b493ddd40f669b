//! Node-graph layout as a GA problem.

use super::fitness::LayoutFitness;
use super::individual::LayoutIndividual;
use super::prototype::GraphPrototype;
use super::spring::SpringLayout;
use crate::ga::{
    GaProblem, OptimizerConfig, RoundRobinTournament, SteadyStateOptimizer, TournamentSelection,
    UniformReal, WholeArithmetic,
};
use rand::Rng;
use std::sync::Arc;

/// Mutation rate of [`LayoutProblem::mutation`].
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;

/// Searches node positions for one graph prototype.
///
/// Individuals start with every node placed uniformly on the canvas,
/// optionally relaxed by a few spring-embedder iterations. The prototype is
/// shared, so cloning the problem for another optimizer does not copy the
/// graph.
#[derive(Debug, Clone)]
pub struct LayoutProblem {
    graph: Arc<GraphPrototype>,
    fitness: LayoutFitness,
    spring: SpringLayout,
    spring_iterations: usize,
}

impl LayoutProblem {
    pub fn new(graph: impl Into<Arc<GraphPrototype>>, fitness: LayoutFitness) -> Self {
        Self {
            graph: graph.into(),
            fitness,
            spring: SpringLayout::default(),
            spring_iterations: 0,
        }
    }

    /// Relaxes every new individual with `iterations` spring updates before
    /// its first evaluation. Positions are clamped back onto the canvas.
    pub fn with_spring_seeding(mut self, spring: SpringLayout, iterations: usize) -> Self {
        self.spring = spring;
        self.spring_iterations = iterations;
        self
    }

    pub fn graph(&self) -> &GraphPrototype {
        &self.graph
    }

    pub fn shared_graph(&self) -> Arc<GraphPrototype> {
        Arc::clone(&self.graph)
    }

    pub fn fitness(&self) -> &LayoutFitness {
        &self.fitness
    }

    /// Mutable evaluator parameters. Re-evaluate the population after
    /// changing them.
    pub fn fitness_mut(&mut self) -> &mut LayoutFitness {
        &mut self.fitness
    }

    /// Uniform-real mutation over the canvas: x genes draw from its width,
    /// y genes from its height.
    pub fn mutation(&self, rate: f64) -> UniformReal {
        let canvas = self.graph.canvas();
        UniformReal::interleaved(rate, vec![(0.0, canvas.x), (0.0, canvas.y)])
    }
}

impl GaProblem for LayoutProblem {
    type Individual = LayoutIndividual;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> LayoutIndividual {
        let canvas = self.graph.canvas();
        let mut genotype = Vec::with_capacity(self.graph.genotype_len());
        for _ in 0..self.graph.node_count() {
            genotype.push(rng.random_range(0.0..canvas.x));
            genotype.push(rng.random_range(0.0..canvas.y));
        }
        if self.spring_iterations > 0 {
            self.spring
                .relax(&self.graph, &mut genotype, self.spring_iterations);
            for position in genotype.chunks_exact_mut(2) {
                position[0] = position[0].clamp(0.0, canvas.x);
                position[1] = position[1].clamp(0.0, canvas.y);
            }
        }
        LayoutIndividual::new(genotype)
    }

    fn evaluate(&self, individual: &mut LayoutIndividual) -> f64 {
        self.fitness.evaluate(&self.graph, individual)
    }
}

/// Optimizer with the standard layout operators.
pub type LayoutOptimizer = SteadyStateOptimizer<
    LayoutProblem,
    TournamentSelection,
    WholeArithmetic,
    UniformReal,
    RoundRobinTournament,
>;

/// Builds a [`LayoutOptimizer`]: 5-tournament parent selection, whole
/// arithmetic recombination, uniform-real mutation over the canvas and
/// round-robin replacement with 10 opponents.
///
/// # Panics
/// Panics if `config` is invalid.
pub fn layout_optimizer(problem: LayoutProblem, config: OptimizerConfig) -> LayoutOptimizer {
    let mutation = problem.mutation(DEFAULT_MUTATION_RATE);
    SteadyStateOptimizer::new(
        problem,
        TournamentSelection::new(5, 2),
        WholeArithmetic,
        mutation,
        RoundRobinTournament::new(10, 2),
        config,
    )
}
