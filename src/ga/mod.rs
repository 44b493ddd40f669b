//! Steady-state genetic algorithm.
//!
//! A generic, domain-agnostic engine built on trait-based abstractions.
//! Users define their problem by implementing [`GaProblem`], which
//! specifies how to create and evaluate individuals. The genetic operators
//! are separate strategy types plugged into [`SteadyStateOptimizer`].
//!
//! # Core Traits
//!
//! - [`Individual`]: A flat real-valued genotype with fitness and lineage
//! - [`GaProblem`]: Problem definition (initialization, evaluation)
//! - [`ParentSelection`], [`Crossover`], [`Mutation`], [`Replacement`]:
//!   operator strategies
//!
//! # Key Types
//!
//! - [`OptimizerConfig`]: Loop parameters and presets
//! - [`SteadyStateOptimizer`]: Executes the steady-state loop
//! - [`RunResult`]: Outcome of a run
//!
//! # References
//!
//! - Syswerda (1991), "A Study of Reproduction in Generational and
//!   Steady-State Genetic Algorithms"
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Michalewicz (1996), *Genetic Algorithms + Data Structures = Evolution Programs*

mod config;
pub mod crossover;
pub mod mutation;
mod optimizer;
pub mod replacement;
mod selection;
pub mod stop;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::OptimizerConfig;
pub use crossover::{Crossover, OnePoint, WholeArithmetic};
pub use mutation::{GaussianMutation, Mutation, UniformPerturbation, UniformReal};
pub use optimizer::{
    OptimizerState, RunResult, SteadyStateOptimizer, MAX_PARENT_RESAMPLES, OFFSPRING_PER_STEP,
};
pub use replacement::{ReplaceOldest, ReplaceWorst, Replacement, RoundRobinTournament};
pub use selection::{ParentSelection, TournamentSelection};
pub use stop::{ConvergenceStop, FitnessHistory, FitnessSample};
pub use types::{GaProblem, Individual, Lineage};
