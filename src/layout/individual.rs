//! Layout individuals and their cached geometry.

use super::prototype::GraphPrototype;
use crate::ga::{Individual, Lineage};
use crate::geometry::{bezier_control_points, sample_cubic_bezier, Aabb, ReachFactors, Vec2};
use crate::heap::HeapSlot;

/// Segments per routed edge.
pub const BEZIER_SEGMENT_COUNT: usize = 6;

/// Sample points per routed edge.
pub const BEZIER_POINT_COUNT: usize = BEZIER_SEGMENT_COUNT + 1;

/// A routed edge: sampled curve points, their bounding box and the reach
/// factors that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezierCurve {
    pub points: [Vec2; BEZIER_POINT_COUNT],
    pub bbox: Aabb,
    pub reach: ReachFactors,
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self {
            points: [Vec2::ZERO; BEZIER_POINT_COUNT],
            bbox: Aabb::empty(),
            reach: ReachFactors::default(),
        }
    }
}

impl BezierCurve {
    /// Routes an S-curve from output port `from` to input port `to`.
    pub fn route(from: Vec2, to: Vec2, reach: ReachFactors, control_cap: f64) -> Self {
        let control = bezier_control_points(from, to, reach, control_cap);
        let points = sample_cubic_bezier::<BEZIER_POINT_COUNT>(&control);
        Self {
            points,
            bbox: Aabb::from_points(&points),
            reach,
        }
    }

    /// The polyline segments approximating the curve.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn start(&self) -> Vec2 {
        self.points[0]
    }

    pub fn end(&self) -> Vec2 {
        self.points[BEZIER_POINT_COUNT - 1]
    }
}

/// Named parts of a layout's fitness. Every part is ≤ 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessComponents {
    /// Penalty for overlapping node boxes.
    pub overlap: f64,
    /// Penalty for links whose target is not far enough right of the source.
    pub position: f64,
    /// Penalty for links steeper than the angle limit.
    pub angle: f64,
    /// Penalty for crossing links.
    pub edge_crossing: f64,
    /// Penalty for links passing through node boxes.
    pub edge_node_crossing: f64,
}

impl FitnessComponents {
    pub fn total(&self) -> f64 {
        self.overlap + self.position + self.angle + self.edge_crossing + self.edge_node_crossing
    }
}

/// One candidate layout.
///
/// The genotype stores the top-left corner of every node as interleaved
/// `x, y` pairs. Routed edges and crossing points are rebuilt by every
/// evaluation and are meant for display.
#[derive(Debug, Clone, Default)]
pub struct LayoutIndividual {
    pub(crate) genotype: Vec<f64>,
    pub(crate) fitness: f64,
    pub(crate) components: FitnessComponents,
    pub(crate) lineage: Lineage,
    pub(crate) slot: Option<usize>,
    pub(crate) curves: Vec<BezierCurve>,
    pub(crate) crossings: Vec<Vec2>,
}

impl LayoutIndividual {
    /// An unevaluated individual with the given node positions.
    pub fn new(genotype: Vec<f64>) -> Self {
        Self {
            genotype,
            ..Self::default()
        }
    }

    pub fn components(&self) -> &FitnessComponents {
        &self.components
    }

    /// Routed edges, one per link, from the last evaluation.
    pub fn curves(&self) -> &[BezierCurve] {
        &self.curves
    }

    /// Every crossing found by the last evaluation.
    pub fn crossings(&self) -> &[Vec2] {
        &self.crossings
    }

    /// Node positions of this individual interpreted against `graph`.
    pub fn view<'a>(&'a self, graph: &'a GraphPrototype) -> LayoutView<'a> {
        LayoutView::new(graph, &self.genotype)
    }
}

impl HeapSlot for LayoutIndividual {
    fn heap_slot(&self) -> Option<usize> {
        self.slot
    }

    fn set_heap_slot(&mut self, slot: Option<usize>) {
        self.slot = slot;
    }
}

impl Individual for LayoutIndividual {
    fn genotype(&self) -> &[f64] {
        &self.genotype
    }

    fn genotype_mut(&mut self) -> &mut [f64] {
        &mut self.genotype
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

/// A genotype read as node positions of a graph.
#[derive(Debug, Clone, Copy)]
pub struct LayoutView<'a> {
    graph: &'a GraphPrototype,
    genotype: &'a [f64],
}

impl<'a> LayoutView<'a> {
    /// # Panics
    /// Panics if `genotype` does not hold one position per node.
    pub fn new(graph: &'a GraphPrototype, genotype: &'a [f64]) -> Self {
        assert_eq!(
            genotype.len(),
            graph.genotype_len(),
            "genotype length does not match the graph"
        );
        Self { graph, genotype }
    }

    pub fn graph(&self) -> &'a GraphPrototype {
        self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Top-left corner of node `i`.
    pub fn node_position(&self, i: usize) -> Vec2 {
        Vec2::new(self.genotype[2 * i], self.genotype[2 * i + 1])
    }

    pub fn node_box(&self, i: usize) -> Aabb {
        self.graph.node_box(i, self.node_position(i))
    }

    /// Output and input port positions of link `l`.
    pub fn link_endpoints(&self, l: usize) -> (Vec2, Vec2) {
        let link = &self.graph.links()[l];
        self.graph.link_endpoints(
            link,
            self.node_position(link.source_node),
            self.node_position(link.target_node),
        )
    }

    /// Bounding box of all node boxes.
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for i in 0..self.node_count() {
            let b = self.node_box(i);
            bounds.extend(b.min);
            bounds.extend(b.max);
        }
        bounds
    }
}
