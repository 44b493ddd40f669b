//! Node-graph layout on top of the steady-state GA.
//!
//! A layout assigns a top-left position to every node of an immutable
//! [`GraphPrototype`]. [`LayoutFitness`] scores a layout by node overlap,
//! link direction and angle, and crossings between routed edges and nodes;
//! [`LayoutProblem`] plugs it into [`SteadyStateOptimizer`](crate::ga::SteadyStateOptimizer).
//!
//! # Submodules
//!
//! - [`loader`]: text format for prototypes
//! - [`generate`]: random prototypes for benchmarking
//! - [`spring`]: force-directed relaxation for seeding layouts

mod fitness;
pub mod generate;
mod individual;
pub mod loader;
mod problem;
mod prototype;
pub mod spring;

pub use fitness::{edge_crossings, edge_node_crossings, LayoutFitness, ROUTING_CANDIDATES};
pub use generate::RandomGraphConfig;
pub use individual::{
    BezierCurve, FitnessComponents, LayoutIndividual, LayoutView, BEZIER_POINT_COUNT,
    BEZIER_SEGMENT_COUNT,
};
pub use loader::{load_prototype, parse_prototype, LoadError};
pub use problem::{layout_optimizer, LayoutOptimizer, LayoutProblem, DEFAULT_MUTATION_RATE};
pub use prototype::{GraphError, GraphPrototype, Link, Node, NodePrototype, Port, Side};
pub use spring::SpringLayout;
