//! Minimal individuals and problems for unit tests.

use super::types::{GaProblem, Individual, Lineage};
use crate::heap::HeapSlot;
use rand::Rng;

/// An individual with a preset fitness and no genes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scored {
    pub genes: Vec<f64>,
    pub fitness: f64,
    pub lineage: Lineage,
    pub slot: Option<usize>,
}

impl Scored {
    pub fn population(fitness: &[f64]) -> Vec<Scored> {
        fitness
            .iter()
            .map(|&f| Scored {
                fitness: f,
                ..Scored::default()
            })
            .collect()
    }
}

impl HeapSlot for Scored {
    fn heap_slot(&self) -> Option<usize> {
        self.slot
    }
    fn set_heap_slot(&mut self, slot: Option<usize>) {
        self.slot = slot;
    }
}

impl Individual for Scored {
    fn genotype(&self) -> &[f64] {
        &self.genes
    }
    fn genotype_mut(&mut self) -> &mut [f64] {
        &mut self.genes
    }
    fn fitness(&self) -> f64 {
        self.fitness
    }
    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
    fn lineage_mut(&mut self) -> &mut Lineage {
        &mut self.lineage
    }
}

pub(crate) type PeakPoint = Scored;

/// Maximize `-Σ (g - 0.5)²` over the unit cube.
pub(crate) struct Peak {
    pub dim: usize,
}

impl GaProblem for Peak {
    type Individual = PeakPoint;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> PeakPoint {
        PeakPoint {
            genes: (0..self.dim).map(|_| rng.random_range(0.0..1.0)).collect(),
            ..PeakPoint::default()
        }
    }

    fn evaluate(&self, individual: &mut PeakPoint) -> f64 {
        -individual
            .genes
            .iter()
            .map(|g| (g - 0.5) * (g - 0.5))
            .sum::<f64>()
    }
}
