//! Replacement strategies for the steady-state GA.
//!
//! Each step, a replacement strategy nominates the individuals whose slots
//! are overwritten by offspring. Strategies only read fitness values.
//!
//! # Parallelism
//!
//! [`RoundRobinTournament`] computes one win count per individual. The
//! counts are independent, so they are computed with rayon: task `i` reads
//! the shared fitness values, writes only slot `i` of the result, and draws
//! its opponents from its own RNG stream ([`stream_rng`]`(base, i)`). The
//! shared RNG is touched only on the calling thread, once to draw `base`
//! and once for the tie-breaking shuffle. Sequential and parallel modes
//! therefore produce identical results.

use super::types::Individual;
use crate::random::stream_rng;
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

/// Nominates individuals to be replaced by offspring.
pub trait Replacement: Send + Sync {
    /// Returns exactly [`count`](Replacement::count) distinct indices.
    fn select_targets<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> Vec<usize>;

    /// Number of indices returned by each call.
    fn count(&self) -> usize;

    /// Smallest population this strategy can operate on.
    ///
    /// One individual more than the replacement count, so at least one
    /// survivor is always left to act as a parent.
    fn min_population(&self) -> usize {
        self.count() + 1
    }
}

fn fitness_values<I: Individual>(population: &[I]) -> Vec<f64> {
    population.iter().map(Individual::fitness).collect()
}

/// Round-robin tournament replacement.
///
/// Every individual meets `tournament_size` random opponents and scores a
/// win for each opponent with strictly lower fitness. The
/// `replacement_size` individuals with the fewest wins are replaced;
/// individuals with equal win counts are ordered randomly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundRobinTournament {
    pub tournament_size: usize,
    pub replacement_size: usize,
    /// Whether to compute win counts with rayon.
    pub parallel: bool,
}

impl Default for RoundRobinTournament {
    fn default() -> Self {
        Self {
            tournament_size: 10,
            replacement_size: 2,
            parallel: true,
        }
    }
}

impl RoundRobinTournament {
    pub fn new(tournament_size: usize, replacement_size: usize) -> Self {
        Self {
            tournament_size,
            replacement_size,
            ..Self::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Win count of every individual, with opponents drawn from stream `i`
    /// of `base_seed` for individual `i`.
    pub fn win_counts(&self, fitness: &[f64], base_seed: u64) -> Vec<u32> {
        let n = fitness.len();
        let wins = |i: usize| -> u32 {
            let mut rng = stream_rng(base_seed, i as u64);
            let own = fitness[i];
            let mut count = 0;
            for _ in 0..self.tournament_size {
                if fitness[rng.random_range(0..n)] < own {
                    count += 1;
                }
            }
            count
        };
        if self.parallel {
            (0..n).into_par_iter().map(wins).collect()
        } else {
            (0..n).map(wins).collect()
        }
    }

    /// The `replacement_size` indices with the fewest wins, ties shuffled.
    pub fn fewest_wins<R: Rng>(&self, wins: &[u32], rng: &mut R) -> Vec<usize> {
        let mut order: Vec<usize> = (0..wins.len()).collect();
        order.shuffle(rng);
        // stable: the shuffle decides among equal win counts
        order.sort_by_key(|&i| wins[i]);
        order.truncate(self.replacement_size);
        order
    }
}

impl Replacement for RoundRobinTournament {
    fn select_targets<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> Vec<usize> {
        assert!(
            population.len() > self.replacement_size,
            "population ({}) must exceed replacement size ({})",
            population.len(),
            self.replacement_size
        );
        let fitness = fitness_values(population);
        let base_seed: u64 = rng.random();
        let wins = self.win_counts(&fitness, base_seed);
        self.fewest_wins(&wins, rng)
    }

    fn count(&self) -> usize {
        self.replacement_size
    }
}

/// Replace the `count` individuals with the lowest fitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplaceWorst {
    pub count: usize,
}

impl Default for ReplaceWorst {
    fn default() -> Self {
        Self { count: 2 }
    }
}

impl Replacement for ReplaceWorst {
    fn select_targets<I: Individual, R: Rng>(&self, population: &[I], _rng: &mut R) -> Vec<usize> {
        assert!(
            population.len() > self.count,
            "population ({}) must exceed replacement size ({})",
            population.len(),
            self.count
        );
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| population[a].fitness().total_cmp(&population[b].fitness()));
        order.truncate(self.count);
        order
    }

    fn count(&self) -> usize {
        self.count
    }
}

/// Replace the `count` individuals with the oldest genotypes, by
/// [`Lineage::birthday`](super::types::Lineage). Individuals of equal age
/// are ordered randomly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplaceOldest {
    pub count: usize,
}

impl Default for ReplaceOldest {
    fn default() -> Self {
        Self { count: 2 }
    }
}

impl Replacement for ReplaceOldest {
    fn select_targets<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> Vec<usize> {
        assert!(
            population.len() > self.count,
            "population ({}) must exceed replacement size ({})",
            population.len(),
            self.count
        );
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.shuffle(rng);
        order.sort_by_key(|&i| population[i].lineage().birthday);
        order.truncate(self.count);
        order
    }

    fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::testing::Scored;
    use crate::random::create_rng;
    use std::collections::HashSet;

    fn linear_population(n: usize) -> Vec<Scored> {
        let fitness: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Scored::population(&fitness)
    }

    #[test]
    fn test_round_robin_returns_distinct_fewest_wins() {
        let pop = linear_population(100);
        let strategy = RoundRobinTournament::new(10, 2);

        for seed in 0..20 {
            let mut rng = create_rng(seed);
            let base: u64 = rng.random();
            let wins = strategy.win_counts(&fitness_values(&pop), base);

            let mut rng = create_rng(seed);
            let targets = strategy.select_targets(&pop, &mut rng);

            assert_eq!(targets.len(), 2);
            let distinct: HashSet<usize> = targets.iter().copied().collect();
            assert_eq!(distinct.len(), 2);

            let max_selected = targets.iter().map(|&t| wins[t]).max().expect("non-empty");
            for (i, &w) in wins.iter().enumerate() {
                if !distinct.contains(&i) {
                    assert!(max_selected <= w, "seed {seed}: {i} has {w} < {max_selected}");
                }
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pop = linear_population(257);
        let fitness = fitness_values(&pop);
        let par = RoundRobinTournament::new(10, 4);
        let seq = par.with_parallel(false);
        assert_eq!(par.win_counts(&fitness, 99), seq.win_counts(&fitness, 99));

        let mut a = create_rng(5);
        let mut b = create_rng(5);
        assert_eq!(par.select_targets(&pop, &mut a), seq.select_targets(&pop, &mut b));
    }

    #[test]
    fn test_wins_bounded_by_tournament_size() {
        let pop = linear_population(50);
        let wins = RoundRobinTournament::new(7, 2).win_counts(&fitness_values(&pop), 3);
        assert!(wins.iter().all(|&w| w <= 7));
        // the worst individual can never beat anyone
        assert_eq!(wins[0], 0);
    }

    #[test]
    fn test_round_robin_prefers_weak_individuals() {
        let pop = linear_population(100);
        let strategy = RoundRobinTournament::new(10, 2);
        let mut rng = create_rng(11);
        let mut total = 0usize;
        let trials = 200;
        for _ in 0..trials {
            total += strategy.select_targets(&pop, &mut rng).iter().sum::<usize>();
        }
        let mean = total as f64 / (2 * trials) as f64;
        assert!(mean < 15.0, "targets should be weak, mean index {mean}");
    }

    #[test]
    fn test_ties_are_shuffled() {
        let pop = Scored::population(&[1.0; 20]);
        let strategy = RoundRobinTournament::new(5, 1);
        let mut rng = create_rng(1);
        let seen: HashSet<usize> = (0..200)
            .map(|_| strategy.select_targets(&pop, &mut rng)[0])
            .collect();
        assert!(seen.len() > 10, "equal individuals should be picked fairly: {seen:?}");
    }

    #[test]
    fn test_fewest_wins_all_tied_is_distinct() {
        let strategy = RoundRobinTournament::new(10, 3);
        let mut rng = create_rng(2);
        let picks = strategy.fewest_wins(&[4; 30], &mut rng);
        let distinct: HashSet<usize> = picks.iter().copied().collect();
        assert_eq!(distinct.len(), 3);
        assert!(picks.iter().all(|&i| i < 30));
    }

    #[test]
    fn test_replace_oldest() {
        let mut pop = linear_population(5);
        for (ind, birthday) in pop.iter_mut().zip([5, 1, 9, 2, 3]) {
            ind.lineage.birthday = birthday;
        }
        let mut rng = create_rng(0);
        let mut targets = ReplaceOldest { count: 2 }.select_targets(&pop, &mut rng);
        targets.sort_unstable();
        assert_eq!(targets, vec![1, 3]);
    }

    #[test]
    fn test_replace_oldest_breaks_ties_randomly() {
        let pop = linear_population(20);
        let strategy = ReplaceOldest { count: 1 };
        let mut rng = create_rng(4);
        let seen: HashSet<usize> = (0..200)
            .map(|_| strategy.select_targets(&pop, &mut rng)[0])
            .collect();
        assert!(seen.len() > 10, "equal ages should be picked fairly: {seen:?}");
    }

    #[test]
    fn test_replace_worst() {
        let pop = Scored::population(&[5.0, -1.0, 3.0, -7.0, 0.0]);
        let mut rng = create_rng(0);
        let targets = ReplaceWorst { count: 2 }.select_targets(&pop, &mut rng);
        assert_eq!(targets, vec![3, 1]);
    }

    #[test]
    #[should_panic(expected = "must exceed replacement size")]
    fn test_population_too_small_panics() {
        let pop = linear_population(2);
        let mut rng = create_rng(0);
        RoundRobinTournament::new(3, 2).select_targets(&pop, &mut rng);
    }
}
