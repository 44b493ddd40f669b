//! Core trait definitions for the steady-state GA.
//!
//! [`Individual`] and [`GaProblem`] define the contract between the generic
//! optimizer and a domain-specific problem. Genotypes are flat `f64`
//! vectors whose length is fixed for the lifetime of a run; everything else
//! an individual carries (fitness components, cached geometry) belongs to
//! the problem.

use crate::heap::HeapSlot;
use rand::Rng;

/// Bookkeeping the optimizer maintains on every individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lineage {
    /// Iteration at which the current genotype was created.
    pub birthday: u32,
    /// Number of ancestors along the parent chain.
    pub generation: u32,
    /// Index of the founding individual of this lineage.
    pub family: u32,
    /// Position in the population.
    pub index: u32,
}

/// A candidate solution in the population.
///
/// Higher fitness is better (maximization). The optimizer writes the value
/// returned by [`GaProblem::evaluate`] through
/// [`set_fitness`](Individual::set_fitness), and tracks the individual in
/// its elite heap through the [`HeapSlot`] supertrait.
///
/// # Implementing
///
/// ```ignore
/// struct Point {
///     genes: Vec<f64>,
///     fitness: f64,
///     lineage: Lineage,
///     slot: Option<usize>,
/// }
///
/// impl HeapSlot for Point {
///     fn heap_slot(&self) -> Option<usize> { self.slot }
///     fn set_heap_slot(&mut self, slot: Option<usize>) { self.slot = slot; }
/// }
///
/// impl Individual for Point {
///     fn genotype(&self) -> &[f64] { &self.genes }
///     fn genotype_mut(&mut self) -> &mut [f64] { &mut self.genes }
///     fn fitness(&self) -> f64 { self.fitness }
///     fn set_fitness(&mut self, f: f64) { self.fitness = f; }
///     fn lineage(&self) -> &Lineage { &self.lineage }
///     fn lineage_mut(&mut self) -> &mut Lineage { &mut self.lineage }
/// }
/// ```
pub trait Individual: HeapSlot + Send + Sync {
    /// The genes, in a fixed order and of fixed length.
    fn genotype(&self) -> &[f64];

    /// Mutable access to the genes. Length must not change.
    fn genotype_mut(&mut self) -> &mut [f64];

    /// The fitness assigned by the last evaluation.
    fn fitness(&self) -> f64;

    /// Sets the fitness. Called by the optimizer after evaluation.
    fn set_fitness(&mut self, fitness: f64);

    fn lineage(&self) -> &Lineage;

    fn lineage_mut(&mut self) -> &mut Lineage;
}

/// Defines a steady-state GA problem: how to create individuals and how to
/// score them.
///
/// Genetic operators are not part of the problem; they are supplied to the
/// optimizer as separate strategy types so they can be mixed freely.
pub trait GaProblem: Send + Sync {
    /// The individual (solution) type for this problem.
    type Individual: Individual;

    /// Creates a random individual.
    ///
    /// Called once per population slot during initialization.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Evaluates an individual and returns its fitness.
    ///
    /// The evaluator may normalize the genotype in place and refresh any
    /// derived state the individual caches. Higher is better.
    fn evaluate(&self, individual: &mut Self::Individual) -> f64;
}
