//! Layout fitness.
//!
//! A layout is scored by penalties, so every component is ≤ 0 and a
//! perfect layout scores 0:
//!
//! | Component | Penalty |
//! |---|---|
//! | overlap | `overlap_penalty` per pair of node boxes sharing positive area |
//! | position | `min(Δx − min_span_x, 0)` per link |
//! | angle | `−max(angle° − max_angle, 0)` per link, angle measured from +x |
//! | edge-node crossing | `crossing_penalty` per routed edge / node border crossing |
//! | edge crossing | `crossing_penalty` per crossing of two routed edges |
//!
//! Edges are routed as cubic S-curves sampled into
//! [`BEZIER_POINT_COUNT`](super::BEZIER_POINT_COUNT) points. With heuristic routing enabled, every
//! link independently tries a fixed list of reach-factor pairs and keeps
//! the first one with the fewest edge-node crossings. The search is greedy
//! per link; it does not look at the other links' routes.

use super::individual::{BezierCurve, FitnessComponents, LayoutIndividual, LayoutView};
use super::prototype::GraphPrototype;
use crate::geometry::{
    segment_intersection_ignoring, Aabb, ReachFactors, Vec2, DEFAULT_CONTROL_CAP, IGNORE_EPSILON,
};

/// Reach-factor pairs tried by heuristic routing, symmetric pairs first.
pub const ROUTING_CANDIDATES: [ReachFactors; 8] = [
    ReachFactors::new(0.8, 0.8),
    ReachFactors::new(0.5, 0.5),
    ReachFactors::new(0.25, 0.25),
    ReachFactors::new(1.0, 1.0),
    ReachFactors::new(0.8, 0.25),
    ReachFactors::new(0.25, 0.8),
    ReachFactors::new(0.5, 1.0),
    ReachFactors::new(1.0, 0.5),
];

/// Fitness evaluator parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutFitness {
    /// Snap positions to multiples of this value. `1.0` or less disables
    /// snapping.
    pub grid: f64,

    /// Shift all nodes horizontally so their mean x is the canvas midpoint.
    pub center_graph: bool,

    /// Link angle (degrees from +x) tolerated without penalty.
    pub max_angle: f64,

    /// Horizontal distance a link target should keep from its source.
    pub min_span_x: f64,

    /// Search reach factors per link instead of using the default pair.
    pub heuristic_routing: bool,

    /// Cap on the horizontal control-point offset of a routed edge.
    pub control_cap: f64,

    /// Penalty per overlapping node pair.
    pub overlap_penalty: f64,

    /// Penalty per crossing.
    pub crossing_penalty: f64,
}

impl Default for LayoutFitness {
    fn default() -> Self {
        Self {
            grid: 1.0,
            center_graph: false,
            max_angle: 60.0,
            min_span_x: 50.0,
            heuristic_routing: true,
            control_cap: DEFAULT_CONTROL_CAP,
            overlap_penalty: -1000.0,
            crossing_penalty: -100.0,
        }
    }
}

impl LayoutFitness {
    pub fn with_grid(mut self, grid: f64) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_center_graph(mut self, center: bool) -> Self {
        self.center_graph = center;
        self
    }

    pub fn with_heuristic_routing(mut self, enabled: bool) -> Self {
        self.heuristic_routing = enabled;
        self
    }

    pub fn with_max_angle(mut self, degrees: f64) -> Self {
        self.max_angle = degrees;
        self
    }

    pub fn with_min_span_x(mut self, span: f64) -> Self {
        self.min_span_x = span;
        self
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !self.grid.is_finite() || self.grid <= 0.0 {
            return Err("grid must be positive".into());
        }
        if !(0.0..=180.0).contains(&self.max_angle) {
            return Err("max_angle must be within [0, 180] degrees".into());
        }
        if !self.min_span_x.is_finite() {
            return Err("min_span_x must be finite".into());
        }
        if !self.control_cap.is_finite() || self.control_cap < 0.0 {
            return Err("control_cap must be non-negative".into());
        }
        if self.overlap_penalty > 0.0 || self.crossing_penalty > 0.0 {
            return Err("penalties must not be positive".into());
        }
        Ok(())
    }

    /// Scores `individual` against `graph`.
    ///
    /// Normalizes the genotype in place (centering, grid), then rebuilds the
    /// routed edges, crossing points and fitness components of the
    /// individual. Returns the total fitness.
    pub fn evaluate(&self, graph: &GraphPrototype, individual: &mut LayoutIndividual) -> f64 {
        let LayoutIndividual {
            genotype,
            components,
            curves,
            crossings,
            ..
        } = individual;

        self.normalize(graph, genotype);

        let view = LayoutView::new(graph, genotype.as_slice());
        crossings.clear();

        let node_boxes: Vec<Aabb> = (0..view.node_count()).map(|i| view.node_box(i)).collect();
        let mut c = FitnessComponents {
            overlap: self.overlap(&node_boxes),
            ..FitnessComponents::default()
        };

        for l in 0..graph.link_count() {
            let (from, to) = view.link_endpoints(l);
            c.position += self.position_penalty(from, to);
            c.angle += self.angle_penalty(from, to);
        }

        self.route(&view, &node_boxes, curves);

        for curve in curves.iter() {
            let hits = edge_node_crossings(curve, &node_boxes, Some(&mut *crossings));
            c.edge_node_crossing += self.crossing_penalty * hits as f64;
        }

        let hits = edge_crossings(curves, crossings);
        c.edge_crossing = self.crossing_penalty * hits as f64;

        *components = c;
        c.total()
    }

    /// Centers and snaps the genotype.
    fn normalize(&self, graph: &GraphPrototype, genotype: &mut [f64]) {
        if self.center_graph && !genotype.is_empty() {
            let nodes = genotype.len() / 2;
            let mean = genotype.iter().step_by(2).sum::<f64>() / nodes as f64;
            let shift = graph.canvas().x * 0.5 - mean;
            for x in genotype.iter_mut().step_by(2) {
                *x += shift;
            }
        }
        if self.grid > 1.0 {
            for v in genotype.iter_mut() {
                *v = (*v / self.grid).floor() * self.grid;
            }
        }
    }

    fn overlap(&self, boxes: &[Aabb]) -> f64 {
        let n = boxes.len();
        let mut pairs = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                if boxes[i].overlaps(&boxes[j]) {
                    pairs += 1;
                }
            }
        }
        self.overlap_penalty * pairs as f64
    }

    fn position_penalty(&self, from: Vec2, to: Vec2) -> f64 {
        ((to.x - from.x) - self.min_span_x).min(0.0)
    }

    fn angle_penalty(&self, from: Vec2, to: Vec2) -> f64 {
        let direction = (to - from).normalized();
        let cos = direction.dot(Vec2::UNIT_X).clamp(-1.0, 1.0);
        let degrees = cos.acos().to_degrees();
        -(degrees - self.max_angle).max(0.0)
    }

    /// Rebuilds `curves` with one routed edge per link.
    fn route(&self, view: &LayoutView<'_>, node_boxes: &[Aabb], curves: &mut Vec<BezierCurve>) {
        let graph = view.graph();
        curves.clear();
        curves.reserve(graph.link_count());

        for l in 0..graph.link_count() {
            let (from, to) = view.link_endpoints(l);
            let curve = if self.heuristic_routing {
                self.best_route(from, to, node_boxes)
            } else {
                BezierCurve::route(from, to, ReachFactors::default(), self.control_cap)
            };
            curves.push(curve);
        }
    }

    /// The first candidate route with the fewest edge-node crossings.
    fn best_route(&self, from: Vec2, to: Vec2, node_boxes: &[Aabb]) -> BezierCurve {
        let mut best = BezierCurve::route(from, to, ROUTING_CANDIDATES[0], self.control_cap);
        let mut best_hits = edge_node_crossings(&best, node_boxes, None);
        for &reach in &ROUTING_CANDIDATES[1..] {
            if best_hits == 0 {
                break;
            }
            let curve = BezierCurve::route(from, to, reach, self.control_cap);
            let hits = edge_node_crossings(&curve, node_boxes, None);
            if hits < best_hits {
                best = curve;
                best_hits = hits;
            }
        }
        best
    }
}

/// Crossings of `curve` with the borders of `node_boxes`, ignoring contacts
/// at the curve's own endpoints. Crossing points are appended to `record`.
///
/// A crossing through a polyline vertex or a box corner is found on two
/// adjacent segments; it counts once per box.
pub fn edge_node_crossings(curve: &BezierCurve, node_boxes: &[Aabb], mut record: Option<&mut Vec<Vec2>>) -> usize {
    let ignore = [curve.start(), curve.end()];
    let mut found = Vec::new();
    let mut hits = 0;
    for node in node_boxes {
        if !curve.bbox.intersects(node) {
            continue;
        }
        found.clear();
        for (a, b) in curve.segments() {
            for (c, d) in node.edges() {
                if let Some(x) = segment_intersection_ignoring(a, b, c, d, &ignore) {
                    if insert_distinct(&mut found, x) {
                        hits += 1;
                        if let Some(points) = record.as_mut() {
                            points.push(x);
                        }
                    }
                }
            }
        }
    }
    hits
}

/// Crossings between every pair of routed edges. Contacts at an endpoint
/// the two edges share, such as a common output port, are ignored, and a
/// crossing through a polyline vertex counts once. Crossing points are
/// appended to `record`.
pub fn edge_crossings(curves: &[BezierCurve], record: &mut Vec<Vec2>) -> usize {
    let mut found = Vec::new();
    let mut hits = 0;
    for (i, ci) in curves.iter().enumerate() {
        for cj in &curves[i + 1..] {
            if !ci.bbox.intersects(&cj.bbox) {
                continue;
            }
            let ignore = shared_endpoints(ci, cj);
            found.clear();
            for (a, b) in ci.segments() {
                for (c, d) in cj.segments() {
                    if let Some(x) = segment_intersection_ignoring(a, b, c, d, &ignore) {
                        if insert_distinct(&mut found, x) {
                            hits += 1;
                            record.push(x);
                        }
                    }
                }
            }
        }
    }
    hits
}

/// Endpoints of `a` that coincide with an endpoint of `b`.
fn shared_endpoints(a: &BezierCurve, b: &BezierCurve) -> Vec<Vec2> {
    [a.start(), a.end()]
        .into_iter()
        .filter(|p| {
            [b.start(), b.end()]
                .iter()
                .any(|q| p.distance(*q) <= IGNORE_EPSILON)
        })
        .collect()
}

/// Adds `x` unless an equal point is already present.
fn insert_distinct(found: &mut Vec<Vec2>, x: Vec2) -> bool {
    if found.iter().any(|p| p.distance(x) <= IGNORE_EPSILON) {
        return false;
    }
    found.push(x);
    true
}
