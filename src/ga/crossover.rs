//! Crossover operators for real-valued genotypes.
//!
//! Operators recombine two offspring genotypes in place. Both genotypes
//! must have the same length; a mismatch is a programming error and
//! panics.

use rand::Rng;

/// Recombines two genotypes in place.
pub trait Crossover: Send + Sync {
    fn crossover<R: Rng>(&self, a: &mut [f64], b: &mut [f64], rng: &mut R);
}

/// Whole arithmetic recombination: both genotypes become the elementwise
/// mean of the pair.
///
/// Deterministic; consumes no randomness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WholeArithmetic;

impl Crossover for WholeArithmetic {
    fn crossover<R: Rng>(&self, a: &mut [f64], b: &mut [f64], _rng: &mut R) {
        assert_eq!(a.len(), b.len(), "genotypes must have equal length");
        for (x, y) in a.iter_mut().zip(b.iter_mut()) {
            let mean = 0.5 * (*x + *y);
            *x = mean;
            *y = mean;
        }
    }
}

/// One-point crossover: swap the prefixes of both genotypes up to a split
/// index drawn uniformly from `[0, len]`.
///
/// A split of `0` leaves both untouched and a split of `len` swaps them
/// entirely.
///
/// ```text
/// aaaaaaaaaaaa --> bbbbbaaaaaaa
/// bbbbbbbbbbbb --> aaaaabbbbbbb
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OnePoint;

impl OnePoint {
    /// Swaps `a[..split]` with `b[..split]`.
    ///
    /// Applying the same split twice restores the original pair.
    pub fn swap_prefix(a: &mut [f64], b: &mut [f64], split: usize) {
        assert_eq!(a.len(), b.len(), "genotypes must have equal length");
        assert!(split <= a.len(), "split {split} beyond genotype length");
        a[..split].swap_with_slice(&mut b[..split]);
    }
}

impl Crossover for OnePoint {
    fn crossover<R: Rng>(&self, a: &mut [f64], b: &mut [f64], rng: &mut R) {
        assert_eq!(a.len(), b.len(), "genotypes must have equal length");
        let split = rng.random_range(0..=a.len());
        Self::swap_prefix(a, b, split);
    }
}
