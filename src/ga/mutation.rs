//! Mutation operators for real-valued genotypes.
//!
//! Mutation probability should be kept low; with a high rate the search
//! degrades into a primitive random search.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Perturbs a genotype in place.
pub trait Mutation: Send + Sync {
    fn mutate<R: Rng>(&self, genotype: &mut [f64], rng: &mut R);
}

/// Uniform real mutation: each gene is independently, with probability
/// `rate`, replaced by a fresh uniform draw from its domain.
///
/// Domains repeat along the genotype: gene `i` draws from
/// `domains[i % domains.len()]`. A single domain applies to every gene; two
/// domains fit genotypes of interleaved `(x, y)` pairs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformReal {
    pub rate: f64,
    /// Half-open `[min, max)` ranges.
    pub domains: Vec<(f64, f64)>,
}

impl Default for UniformReal {
    fn default() -> Self {
        Self {
            rate: 0.1,
            domains: vec![(0.0, 1.0)],
        }
    }
}

impl UniformReal {
    /// Every gene draws from `[min, max)`.
    pub fn new(rate: f64, min: f64, max: f64) -> Self {
        Self::interleaved(rate, vec![(min, max)])
    }

    /// Gene `i` draws from `domains[i % domains.len()]`.
    pub fn interleaved(rate: f64, domains: Vec<(f64, f64)>) -> Self {
        assert!(!domains.is_empty(), "mutation needs at least one domain");
        for &(min, max) in &domains {
            assert!(min < max, "empty mutation domain [{min}, {max})");
        }
        Self {
            rate: rate.clamp(0.0, 1.0),
            domains,
        }
    }

    /// Same rate, single new domain.
    pub fn with_domain(self, min: f64, max: f64) -> Self {
        Self::new(self.rate, min, max)
    }
}

impl Mutation for UniformReal {
    fn mutate<R: Rng>(&self, genotype: &mut [f64], rng: &mut R) {
        for (gene, &(min, max)) in genotype.iter_mut().zip(self.domains.iter().cycle()) {
            if rng.random_range(0.0..1.0) < self.rate {
                *gene = rng.random_range(min..max);
            }
        }
    }
}

/// Gaussian mutation: add a normally distributed draw to one randomly
/// chosen gene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianMutation {
    normal: Normal<f64>,
}

impl Default for GaussianMutation {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl GaussianMutation {
    /// # Panics
    /// Panics if `std_dev` is negative or not finite.
    pub fn new(mean: f64, std_dev: f64) -> Self {
        match Normal::new(mean, std_dev) {
            Ok(normal) => Self { normal },
            Err(e) => panic!("invalid gaussian mutation N({mean}, {std_dev}): {e}"),
        }
    }

    pub fn mean(&self) -> f64 {
        self.normal.mean()
    }

    pub fn std_dev(&self) -> f64 {
        self.normal.std_dev()
    }
}

impl Mutation for GaussianMutation {
    fn mutate<R: Rng>(&self, genotype: &mut [f64], rng: &mut R) {
        assert!(!genotype.is_empty(), "cannot mutate an empty genotype");
        let pos = rng.random_range(0..genotype.len());
        genotype[pos] += self.normal.sample(rng);
    }
}

/// Uniform perturbation: add a uniform draw from `[min, max)` to one
/// randomly chosen gene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformPerturbation {
    pub min: f64,
    pub max: f64,
}

impl Default for UniformPerturbation {
    fn default() -> Self {
        Self {
            min: -1.0,
            max: 1.0,
        }
    }
}

impl Mutation for UniformPerturbation {
    fn mutate<R: Rng>(&self, genotype: &mut [f64], rng: &mut R) {
        assert!(!genotype.is_empty(), "cannot mutate an empty genotype");
        let pos = rng.random_range(0..genotype.len());
        genotype[pos] += rng.random_range(self.min..self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_rate_zero_is_identity() {
        let mut rng = create_rng(42);
        let original: Vec<f64> = (0..100).map(f64::from).collect();
        let mut g = original.clone();
        UniformReal::new(0.0, 0.0, 1.0).mutate(&mut g, &mut rng);
        assert_eq!(g, original);
    }

    #[test]
    fn test_rate_one_replaces_all_within_domain() {
        let mut rng = create_rng(42);
        let mut g = vec![-5.0; 100];
        UniformReal::new(1.0, 10.0, 20.0).mutate(&mut g, &mut rng);
        assert!(g.iter().all(|&x| (10.0..20.0).contains(&x)));
    }

    #[test]
    fn test_rate_is_respected_on_average() {
        let mut rng = create_rng(7);
        let mut g = vec![-1.0; 10_000];
        UniformReal::new(0.1, 0.0, 1.0).mutate(&mut g, &mut rng);
        let changed = g.iter().filter(|&&x| x >= 0.0).count();
        assert!(
            (800..1200).contains(&changed),
            "expected ~1000 mutated genes, got {changed}"
        );
    }

    #[test]
    fn test_perturbation_changes_one_gene() {
        let mut rng = create_rng(3);
        let mut g = vec![0.0; 10];
        UniformPerturbation { min: 1.0, max: 2.0 }.mutate(&mut g, &mut rng);
        let changed: Vec<f64> = g.iter().copied().filter(|&x| x != 0.0).collect();
        assert_eq!(changed.len(), 1);
        assert!((1.0..2.0).contains(&changed[0]));
    }

    #[test]
    fn test_interleaved_domains() {
        let mut rng = create_rng(8);
        let m = UniformReal::interleaved(1.0, vec![(0.0, 900.0), (0.0, 600.0)]);
        let mut g = vec![-1.0; 20];
        let mut max_x: f64 = 0.0;
        for _ in 0..200 {
            m.mutate(&mut g, &mut rng);
            for pair in g.chunks(2) {
                assert!((0.0..900.0).contains(&pair[0]));
                assert!((0.0..600.0).contains(&pair[1]));
                max_x = max_x.max(pair[0]);
            }
        }
        assert!(max_x > 600.0);
    }

    #[test]
    fn test_gaussian_changes_one_gene() {
        let mut rng = create_rng(5);
        let m = GaussianMutation::new(10.0, 0.5);
        assert_eq!((m.mean(), m.std_dev()), (10.0, 0.5));
        let mut g = vec![0.0; 8];
        m.mutate(&mut g, &mut rng);
        let changed: Vec<f64> = g.iter().copied().filter(|&x| x != 0.0).collect();
        assert_eq!(changed.len(), 1);
        assert!((7.0..13.0).contains(&changed[0]));
    }

    #[test]
    fn test_gaussian_mean_on_average() {
        let mut rng = create_rng(6);
        let m = GaussianMutation::new(2.0, 1.0);
        let mut g = vec![0.0];
        for _ in 0..10_000 {
            m.mutate(&mut g, &mut rng);
        }
        let mean = g[0] / 10_000.0;
        assert!((mean - 2.0).abs() < 0.05, "mean step {mean}");
    }

    #[test]
    #[should_panic(expected = "invalid gaussian mutation")]
    fn test_gaussian_negative_std_dev_panics() {
        GaussianMutation::new(0.0, -1.0);
    }

    #[test]
    #[should_panic(expected = "empty mutation domain")]
    fn test_empty_domain_panics() {
        UniformReal::new(0.1, 1.0, 1.0);
    }
}
