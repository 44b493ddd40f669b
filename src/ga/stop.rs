//! Best-fitness history and the convergence stop condition.

use std::collections::VecDeque;

/// One entry of the best-fitness history.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessSample {
    pub fitness: f64,
    pub iteration: u32,
}

/// Bounded record of best-fitness improvements, oldest first.
///
/// Samples are appended only when a new best appears. Once `capacity` is
/// reached the oldest sample is discarded.
#[derive(Debug, Clone)]
pub struct FitnessHistory {
    samples: VecDeque<FitnessSample>,
    capacity: usize,
}

impl FitnessHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");
        Self {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn last(&self) -> Option<&FitnessSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &FitnessSample> + '_ {
        self.samples.iter()
    }

    /// Records `fitness` at `iteration` if it beats the last recorded best.
    ///
    /// Returns whether a sample was appended.
    pub fn record(&mut self, fitness: f64, iteration: u32) -> bool {
        if let Some(last) = self.samples.back() {
            if fitness <= last.fitness {
                return false;
            }
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(FitnessSample { fitness, iteration });
        true
    }
}

/// Stops when the best fitness has not improved by at least `threshold`
/// over the last `period` iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceStop {
    pub threshold: f64,
    pub period: u32,
}

impl Default for ConvergenceStop {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            period: 20_000,
        }
    }
}

impl ConvergenceStop {
    pub fn new(threshold: f64, period: u32) -> Self {
        Self { threshold, period }
    }

    /// Whether the run has converged at `iteration` with `current_best`.
    ///
    /// The reference sample is the newest one at least `period` iterations
    /// old, or the oldest sample if none is. While even that one is younger
    /// than `period` the run is too short to judge.
    pub fn should_stop(&self, history: &FitnessHistory, iteration: u32, current_best: f64) -> bool {
        let Some(oldest) = history.samples.front() else {
            return false;
        };
        let reference = history
            .iter()
            .rev()
            .find(|s| iteration.saturating_sub(s.iteration) >= self.period)
            .unwrap_or(oldest);
        if iteration.saturating_sub(reference.iteration) < self.period {
            return false;
        }
        let improvement = current_best - reference.fitness;
        improvement < self.threshold
    }
}
