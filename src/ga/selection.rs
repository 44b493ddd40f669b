//! Parent selection.
//!
//! Selection determines which individuals donate their genes to the
//! offspring of a step. Selection only reads fitness values.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::Individual;
use rand::Rng;

/// Chooses parent indices from the population.
pub trait ParentSelection: Send + Sync {
    /// A single pick.
    fn select_one<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> usize;

    /// Returns exactly [`count`](ParentSelection::count) population indices.
    ///
    /// Picks are independent: the same index may appear more than once.
    fn select<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> Vec<usize> {
        (0..self.count())
            .map(|_| self.select_one(population, rng))
            .collect()
    }

    /// Number of indices returned by each call.
    fn count(&self) -> usize;

    /// Smallest population this strategy can operate on.
    fn min_population(&self) -> usize {
        1
    }
}

/// K-tournament selection: sample `size` individuals uniformly with
/// replacement and keep the fittest; repeat for each of `candidates` picks.
///
/// With `size == 1` this degenerates to uniform random selection.
/// Higher `size` = stronger selection pressure.
///
/// # Complexity
/// O(size) per pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TournamentSelection {
    pub size: usize,
    pub candidates: usize,
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self {
            size: 5,
            candidates: 2,
        }
    }
}

impl TournamentSelection {
    pub fn new(size: usize, candidates: usize) -> Self {
        assert!(size > 0, "tournament size must be positive");
        Self { size, candidates }
    }

    /// A single tournament: index of the best of `size` uniform draws.
    pub fn pick<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> usize {
        let n = population.len();
        let mut best = rng.random_range(0..n);
        for _ in 1..self.size {
            let idx = rng.random_range(0..n);
            if population[idx].fitness() > population[best].fitness() {
                best = idx;
            }
        }
        best
    }
}

impl ParentSelection for TournamentSelection {
    fn select_one<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> usize {
        assert!(
            population.len() >= self.size,
            "population ({}) smaller than tournament size ({})",
            population.len(),
            self.size
        );
        self.pick(population, rng)
    }

    fn count(&self) -> usize {
        self.candidates
    }

    fn min_population(&self) -> usize {
        self.size
    }
}
