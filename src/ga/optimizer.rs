//! Steady-state evolutionary loop.
//!
//! [`SteadyStateOptimizer`] owns a fixed-size population and, on every
//! [`step`](SteadyStateOptimizer::step), overwrites two individuals with
//! offspring of two selected parents:
//!
//! replacement targets → parents → copy genes → crossover → mutation →
//! evaluation → elite-heap update.
//!
//! No individual is allocated or dropped between initializations; offspring
//! reuse the storage of the individuals they replace.
//!
//! # Parent/target disjointness
//!
//! Targets are chosen first. A parent pick that lands on a target is
//! redrawn from the selection strategy up to [`MAX_PARENT_RESAMPLES`]
//! times, then replaced by a uniformly random survivor. Parents are copied
//! into scratch buffers before any target is written, so a step never reads
//! genes it has already overwritten. The two parents may be the same
//! individual.

use super::config::OptimizerConfig;
use super::crossover::Crossover;
use super::mutation::Mutation;
use super::replacement::Replacement;
use super::selection::ParentSelection;
use super::stop::FitnessHistory;
use super::types::{GaProblem, Individual, Lineage};
use crate::heap::{HeapSlot, IndexedHeap};
use crate::random::{create_rng, LayoutRng};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Number of offspring produced per step.
pub const OFFSPRING_PER_STEP: usize = 2;

/// How often a parent pick colliding with a target is redrawn.
pub const MAX_PARENT_RESAMPLES: usize = 16;

/// Lifecycle of an optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptimizerState {
    /// No population yet.
    Uninitialized,
    /// Population created and evaluated, no step taken.
    Initialized,
    /// At least one step taken.
    Stepping,
    /// A run ended because the convergence criterion was met.
    Stopped,
}

/// Outcome of [`SteadyStateOptimizer::run`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunResult {
    /// Population index of the best individual.
    pub best_index: usize,

    /// Fitness of the best individual.
    pub best_fitness: f64,

    /// Iteration counter at the end of the run.
    pub iterations: u32,

    /// Steps performed by this run.
    pub steps: u32,

    /// Whether the convergence criterion ended the run.
    pub converged: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Steady-state genetic optimizer.
///
/// Generic over the problem and the four operator strategies, so every
/// operator call is statically dispatched.
///
/// # Usage
///
/// ```ignore
/// let mut optimizer = SteadyStateOptimizer::new(
///     problem,
///     TournamentSelection::new(5, 2),
///     WholeArithmetic,
///     UniformReal::new(0.1, 0.0, 1200.0),
///     RoundRobinTournament::new(10, 2),
///     OptimizerConfig::default().with_seed(42),
/// );
/// optimizer.initialize_population(200);
/// let result = optimizer.run();
/// println!("best fitness: {}", result.best_fitness);
/// ```
pub struct SteadyStateOptimizer<P, S, X, M, R>
where
    P: GaProblem,
{
    problem: P,
    selection: S,
    crossover: X,
    mutation: M,
    replacement: R,
    config: OptimizerConfig,
    rng: LayoutRng,
    population: Vec<P::Individual>,
    elite: IndexedHeap<P::Individual>,
    history: FitnessHistory,
    iteration: u32,
    state: OptimizerState,
    scratch: [Vec<f64>; OFFSPRING_PER_STEP],
}

fn fitter<I: Individual>(a: &I, b: &I) -> bool {
    a.fitness() > b.fitness()
}

impl<P, S, X, M, R> SteadyStateOptimizer<P, S, X, M, R>
where
    P: GaProblem,
    S: ParentSelection,
    X: Crossover,
    M: Mutation,
    R: Replacement,
{
    /// Creates an optimizer without a population.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`OptimizerConfig::validate`]
    /// first to get a descriptive error), or if the selection or
    /// replacement strategy does not produce two indices per call.
    pub fn new(
        problem: P,
        selection: S,
        crossover: X,
        mutation: M,
        replacement: R,
        config: OptimizerConfig,
    ) -> Self {
        config.validate().expect("invalid OptimizerConfig");
        assert_eq!(
            selection.count(),
            OFFSPRING_PER_STEP,
            "selection must pick {OFFSPRING_PER_STEP} parents"
        );
        assert_eq!(
            replacement.count(),
            OFFSPRING_PER_STEP,
            "replacement must nominate {OFFSPRING_PER_STEP} targets"
        );

        let rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        let history = FitnessHistory::new(config.history_capacity);

        Self {
            problem,
            selection,
            crossover,
            mutation,
            replacement,
            config,
            rng,
            population: Vec::new(),
            elite: IndexedHeap::new(fitter::<P::Individual>),
            history,
            iteration: 0,
            state: OptimizerState::Uninitialized,
            scratch: Default::default(),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Mutable access to the problem, e.g. to retune fitness weights.
    ///
    /// Call [`reevaluate_all`](Self::reevaluate_all) afterwards to keep
    /// fitness values and the elite heap consistent.
    pub fn problem_mut(&mut self) -> &mut P {
        &mut self.problem
    }

    pub fn mutation_mut(&mut self) -> &mut M {
        &mut self.mutation
    }

    pub fn population(&self) -> &[P::Individual] {
        &self.population
    }

    pub fn history(&self) -> &FitnessHistory {
        &self.history
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Population indices in elite-heap storage order.
    pub fn elite_handles(&self) -> &[usize] {
        self.elite.handles()
    }

    /// Initializes a population of the configured size.
    pub fn initialize(&mut self) {
        self.initialize_population(self.config.population_size);
    }

    /// Creates, evaluates and tracks `size` fresh individuals.
    ///
    /// Resets the iteration counter, elite heap and fitness history.
    ///
    /// # Panics
    /// Panics if `size` is too small for the selection or replacement
    /// strategy.
    pub fn initialize_population(&mut self, size: usize) {
        let min = self
            .selection
            .min_population()
            .max(self.replacement.min_population());
        assert!(
            size >= min,
            "population size {size} below the operator minimum {min}"
        );
        assert!(size < u32::MAX as usize, "population size must fit in u32");

        self.iteration = 0;
        self.elite.clear();
        self.elite.reserve(size);
        self.history.clear();
        self.population.clear();
        self.population.reserve_exact(size);

        for i in 0..size {
            let mut individual = self.problem.create_individual(&mut self.rng);
            *individual.lineage_mut() = Lineage {
                birthday: 0,
                generation: 0,
                family: i as u32,
                index: i as u32,
            };
            individual.set_heap_slot(None);
            self.population.push(individual);
            self.evaluate_and_track(i);
        }

        self.state = OptimizerState::Initialized;
        info!(
            population = size,
            best_fitness = self.best_fitness(),
            "population initialized"
        );
    }

    /// Index of the best individual.
    ///
    /// # Panics
    /// Panics if the population has not been initialized.
    pub fn best_index(&self) -> usize {
        self.elite.top()
    }

    pub fn best(&self) -> &P::Individual {
        &self.population[self.best_index()]
    }

    pub fn best_fitness(&self) -> f64 {
        self.best().fitness()
    }

    /// Mutable genes of individual `index`, e.g. for interactive dragging.
    ///
    /// Call [`reevaluate`](Self::reevaluate) afterwards.
    pub fn genotype_mut(&mut self, index: usize) -> &mut [f64] {
        self.population[index].genotype_mut()
    }

    /// Re-scores individual `index` and restores elite-heap order.
    pub fn reevaluate(&mut self, index: usize) {
        self.evaluate_and_track(index);
    }

    /// Re-scores the whole population.
    pub fn reevaluate_all(&mut self) {
        for i in 0..self.population.len() {
            self.evaluate_and_track(i);
        }
    }

    /// Whether the convergence criterion is met.
    pub fn stop_condition(&self) -> bool {
        if self.state == OptimizerState::Uninitialized {
            return false;
        }
        self.config
            .convergence
            .should_stop(&self.history, self.iteration, self.best_fitness())
    }

    /// Performs one steady-state iteration.
    ///
    /// # Panics
    /// Panics if the population has not been initialized.
    pub fn step(&mut self) {
        assert!(
            self.state != OptimizerState::Uninitialized,
            "step() called before initialize_population()"
        );

        let best = self.best_fitness();
        if self.history.record(best, self.iteration) {
            debug!(iteration = self.iteration, fitness = best, "new best");
        }

        self.iteration += 1;

        let targets = self.replacement.select_targets(&self.population, &mut self.rng);
        let parents = self.choose_parents(&targets);

        let mut lineages = [Lineage::default(); OFFSPRING_PER_STEP];
        for (k, &p) in parents.iter().enumerate() {
            let parent = &self.population[p];
            self.scratch[k].clear();
            self.scratch[k].extend_from_slice(parent.genotype());
            let lineage = parent.lineage();
            lineages[k] = Lineage {
                birthday: self.iteration,
                generation: lineage.generation + 1,
                family: lineage.family,
                index: 0,
            };
        }

        let [a, b] = &mut self.scratch;
        if self.rng.random_range(0.0..1.0) < self.config.crossover_rate {
            self.crossover.crossover(a, b, &mut self.rng);
        }
        self.mutation.mutate(a, &mut self.rng);
        self.mutation.mutate(b, &mut self.rng);

        for (k, &t) in targets.iter().enumerate() {
            let target = &mut self.population[t];
            target.genotype_mut().copy_from_slice(&self.scratch[k]);
            let index = target.lineage().index;
            *target.lineage_mut() = Lineage {
                index,
                ..lineages[k]
            };
            self.evaluate_and_track(t);
        }

        self.state = OptimizerState::Stepping;
        trace!(
            iteration = self.iteration,
            ?parents,
            ?targets,
            "step"
        );
    }

    /// Steps until convergence, the iteration limit or the time limit is
    /// reached.
    pub fn run(&mut self) -> RunResult {
        self.run_with_cancel(None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag is polled before every step; once set, the run returns the
    /// best individual found so far with `cancelled: true`.
    pub fn run_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> RunResult {
        assert!(
            self.state != OptimizerState::Uninitialized,
            "run() called before initialize_population()"
        );

        let start = Instant::now();
        let start_iteration = self.iteration;
        let time_limit = self.config.time_limit_ms.map(Duration::from_millis);
        let mut cancelled = false;
        let mut converged = false;

        loop {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if self.config.stop_on_convergence && self.stop_condition() {
                converged = true;
                self.state = OptimizerState::Stopped;
                break;
            }
            if self.iteration - start_iteration >= self.config.max_iterations {
                break;
            }
            if let Some(limit) = time_limit {
                if start.elapsed() >= limit {
                    break;
                }
            }
            self.step();
        }

        let result = RunResult {
            best_index: self.best_index(),
            best_fitness: self.best_fitness(),
            iterations: self.iteration,
            steps: self.iteration - start_iteration,
            converged,
            cancelled,
            elapsed: start.elapsed(),
        };
        info!(
            iterations = result.iterations,
            best_fitness = result.best_fitness,
            converged,
            cancelled,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "run finished"
        );
        result
    }

    fn evaluate_and_track(&mut self, index: usize) {
        let fitness = self.problem.evaluate(&mut self.population[index]);
        self.population[index].set_fitness(fitness);
        match self.population[index].heap_slot() {
            None => self.elite.insert(&mut self.population, index),
            Some(slot) => self.elite.modify_key(&mut self.population, slot),
        }
    }

    fn choose_parents(&mut self, targets: &[usize]) -> Vec<usize> {
        let mut parents = self.selection.select(&self.population, &mut self.rng);
        for parent in parents.iter_mut() {
            let mut attempts = 0;
            while targets.contains(parent) {
                if attempts == MAX_PARENT_RESAMPLES {
                    *parent = self.random_survivor(targets);
                    break;
                }
                *parent = self.selection.select_one(&self.population, &mut self.rng);
                attempts += 1;
            }
        }
        parents
    }

    fn random_survivor(&mut self, targets: &[usize]) -> usize {
        let survivors = self.population.len() - targets.len();
        let mut k = self.rng.random_range(0..survivors);
        for i in 0..self.population.len() {
            if targets.contains(&i) {
                continue;
            }
            if k == 0 {
                return i;
            }
            k -= 1;
        }
        unreachable!("population larger than target count")
    }
}
