//! Node-graph layout by steady-state genetic search.
//!
//! Places the nodes of a port-based graph on a 2D canvas so that boxes do
//! not overlap, links flow left to right, and the bezier-routed links cross
//! each other and the node boxes as little as possible.
//!
//! - **GA engine** ([`ga`]): a generic steady-state genetic algorithm with
//!   pluggable selection, crossover, mutation and replacement strategies,
//!   an indexed elite heap and a convergence stop condition.
//! - **Layout** ([`layout`]): graph prototypes, the text loader, the
//!   fitness evaluator with edge routing, and the GA problem binding.
//! - **Batch** ([`batch`]): multi-threaded benchmarking on random graphs.
//!
//! # Architecture
//!
//! [`geometry`], [`heap`] and [`random`] are leaf modules. [`ga`] knows
//! nothing about layouts; [`layout`] implements its traits; [`batch`]
//! drives many layout optimizers at once.
//!
//! # Example
//!
//! ```
//! use u_nodelayout::ga::OptimizerConfig;
//! use u_nodelayout::layout::{layout_optimizer, parse_prototype, LayoutFitness, LayoutProblem};
//!
//! let graph = parse_prototype(
//!     "canvas 600 600\n\
//!      proto 0 \"op\" 100 60 1 1\n\
//!      node 0 0 \"a\"\n\
//!      node 1 0 \"b\"\n\
//!      link 0 0 1 0\n",
//! )
//! .unwrap();
//!
//! let problem = LayoutProblem::new(graph, LayoutFitness::default());
//! let mut optimizer = layout_optimizer(
//!     problem,
//!     OptimizerConfig::fast().with_seed(42).with_max_iterations(2_000),
//! );
//! optimizer.initialize_population(30);
//! let result = optimizer.run();
//! assert!(result.best_fitness <= 0.0);
//! ```

pub mod batch;
pub mod ga;
pub mod geometry;
pub mod heap;
pub mod layout;
pub mod random;
