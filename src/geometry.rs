//! 2D geometry kernel.
//!
//! Everything the fitness evaluator needs to reason about node boxes and
//! routed edges: a small vector type, axis-aligned boxes, parametric
//! segment intersection, and cubic bezier sampling.
//!
//! # Degeneracy
//!
//! Numeric corner cases are guarded rather than propagated:
//!
//! - normalizing a zero-length vector yields the zero vector
//! - parallel (or collinear, or zero-length) segments never intersect
//!
//! so no NaN or infinity can leak into a fitness value.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Intersections closer than this to an ignored point are discarded.
pub const IGNORE_EPSILON: f64 = 1e-4;

/// Default cap on the horizontal control-point offset of a routed edge.
pub const DEFAULT_CONTROL_CAP: f64 = 250.0;

/// A 2D vector / point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const UNIT_X: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Vec2 {
        let n = self.norm();
        if n > 0.0 && n.is_finite() {
            Vec2::new(self.x / n, self.y / n)
        } else {
            Vec2::ZERO
        }
    }

    pub fn abs(self) -> Vec2 {
        Vec2::new(self.x.abs(), self.y.abs())
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).norm()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned bounding box.
///
/// `y` grows downward (screen coordinates), so `min` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box at `origin` (top-left) with the given size.
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin, origin + size)
    }

    /// An inverted box that contains nothing; extending it by a point
    /// yields the degenerate box at that point.
    pub fn empty() -> Self {
        Self {
            min: Vec2::new(f64::INFINITY, f64::INFINITY),
            max: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Vec2]) -> Self {
        let mut b = Self::empty();
        for &p in points {
            b.extend(p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn extend(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Closed intersection test: touching boxes intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Open intersection test: the boxes share a region of positive area.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.intersection_area(other) > 0.0
    }

    /// The common region, which may be empty.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Vec2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Vec2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        }
    }

    pub fn intersection_area(&self, other: &Aabb) -> f64 {
        let i = self.intersection(other);
        if i.is_empty() {
            0.0
        } else {
            let s = i.size();
            s.x * s.y
        }
    }

    pub fn top_left(&self) -> Vec2 {
        self.min
    }

    pub fn top_right(&self) -> Vec2 {
        Vec2::new(self.max.x, self.min.y)
    }

    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.min.x, self.max.y)
    }

    pub fn bottom_right(&self) -> Vec2 {
        self.max
    }

    /// The four boundary edges: top, bottom, left, right.
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        [
            (self.top_left(), self.top_right()),
            (self.bottom_left(), self.bottom_right()),
            (self.top_left(), self.bottom_left()),
            (self.top_right(), self.bottom_right()),
        ]
    }
}

/// Intersection point of segments `p0-p1` and `p2-p3`, if any.
///
/// Solves `p0 + t·(p1 - p0) = p2 + s·(p3 - p2)` for `s, t ∈ [0, 1]`.
/// Parallel, collinear and zero-length segments report no intersection.
pub fn segment_intersection(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Option<Vec2> {
    let s1 = p1 - p0;
    let s2 = p3 - p2;

    let denom = -s2.x * s1.y + s1.x * s2.y;
    let scale = s1.norm() * s2.norm();
    if scale == 0.0 || denom.abs() <= f64::EPSILON * scale {
        return None;
    }

    let s = (-s1.y * (p0.x - p2.x) + s1.x * (p0.y - p2.y)) / denom;
    let t = (s2.x * (p0.y - p2.y) - s2.y * (p0.x - p2.x)) / denom;

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(p0 + s1 * t)
    } else {
        None
    }
}

/// Like [`segment_intersection`], but discards a crossing lying on any of
/// the `ignore` points.
///
/// Edges attached to the same port meet exactly at that port; those
/// contacts are not crossings.
pub fn segment_intersection_ignoring(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    ignore: &[Vec2],
) -> Option<Vec2> {
    segment_intersection(p0, p1, p2, p3)
        .filter(|x| ignore.iter().all(|q| x.distance(*q) > IGNORE_EPSILON))
}

/// Samples a cubic bezier at `N` evenly spaced parameters `t = i / (N - 1)`.
///
/// The first and last samples are exactly the curve endpoints.
pub fn sample_cubic_bezier<const N: usize>(control: &[Vec2; 4]) -> [Vec2; N] {
    assert!(N >= 2, "bezier sampling needs at least two points");
    let [p1, p2, p3, p4] = *control;
    let mut points = [Vec2::ZERO; N];
    points[0] = p1;
    let step = 1.0 / (N - 1) as f64;
    for (i, point) in points.iter_mut().enumerate().skip(1) {
        let t = step * i as f64;
        let u = 1.0 - t;
        let w1 = u * u * u;
        let w2 = 3.0 * u * u * t;
        let w3 = 3.0 * u * t * t;
        let w4 = t * t * t;
        *point = p1 * w1 + p2 * w2 + p3 * w3 + p4 * w4;
    }
    points[N - 1] = p4;
    points
}

/// Horizontal reach of the two interior control points of a routed edge,
/// as fractions of the capped horizontal distance between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReachFactors {
    /// Reach out of the source (output) port.
    pub a: f64,
    /// Reach into the target (input) port.
    pub b: f64,
}

impl ReachFactors {
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn is_symmetric(&self) -> bool {
        self.a == self.b
    }
}

impl Default for ReachFactors {
    fn default() -> Self {
        Self::new(0.8, 0.8)
    }
}

/// Control polygon of the S-curve from output port `p0` to input port `p1`.
///
/// The curve leaves `p0` heading right and arrives at `p1` from its left,
/// with interior points offset by `reach × min(|Δx|, cap)`.
pub fn bezier_control_points(p0: Vec2, p1: Vec2, reach: ReachFactors, cap: f64) -> [Vec2; 4] {
    let control_x = (p1 - p0).abs().x.min(cap);
    [
        p0,
        Vec2::new(p0.x + control_x * reach.a, p0.y),
        Vec2::new(p1.x - control_x * reach.b, p1.y),
        p1,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalized();
        assert!((n.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_box_intersection_area() {
        let a = Aabb::from_origin_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::from_origin_size(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        assert!(a.intersects(&b));
        assert!((a.intersection_area(&b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_touching_boxes_intersect_but_do_not_overlap() {
        let a = Aabb::from_origin_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::from_origin_size(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(a.intersects(&b));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_disjoint_boxes() {
        let a = Aabb::from_origin_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::from_origin_size(Vec2::new(20.0, 20.0), Vec2::new(1.0, 1.0));
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection_area(&b), 0.0);
    }

    #[test]
    fn test_segments_cross_at_known_point() {
        let x = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(4.0, 0.0),
        );
        assert!(close(x.expect("segments cross"), Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        let x = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(4.0, 1.0),
        );
        assert!(x.is_none());
    }

    #[test]
    fn test_collinear_and_degenerate_segments() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(4.0, 0.0);
        assert!(segment_intersection(a, b, Vec2::new(1.0, 0.0), Vec2::new(6.0, 0.0)).is_none());
        assert!(segment_intersection(a, b, Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0)).is_none());
    }

    #[test]
    fn test_non_overlapping_parameter_range() {
        let x = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(4.0, 0.0),
        );
        assert!(x.is_none());
    }

    #[test]
    fn test_ignore_shared_endpoint() {
        let port = Vec2::new(1.0, 1.0);
        let hit = segment_intersection(port, Vec2::new(5.0, 1.0), port, Vec2::new(1.0, 5.0));
        assert!(hit.is_some());
        let ignored = segment_intersection_ignoring(
            port,
            Vec2::new(5.0, 1.0),
            port,
            Vec2::new(1.0, 5.0),
            &[port],
        );
        assert!(ignored.is_none());
    }

    #[test]
    fn test_bezier_endpoints_exact() {
        let control = bezier_control_points(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 50.0),
            ReachFactors::default(),
            DEFAULT_CONTROL_CAP,
        );
        let pts: [Vec2; 7] = sample_cubic_bezier(&control);
        assert_eq!(pts[0], Vec2::new(0.0, 0.0));
        assert_eq!(pts[6], Vec2::new(100.0, 50.0));
        // symmetric S-curve passes through the midpoint
        assert!(close(pts[3], Vec2::new(50.0, 25.0)));
    }

    #[test]
    fn test_control_points_capped() {
        let c = bezier_control_points(
            Vec2::ZERO,
            Vec2::new(1000.0, 0.0),
            ReachFactors::new(1.0, 0.5),
            DEFAULT_CONTROL_CAP,
        );
        assert_eq!(c[1], Vec2::new(250.0, 0.0));
        assert_eq!(c[2], Vec2::new(875.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_intersection_is_finite_and_symmetric(
            ax in -100.0f64..100.0, ay in -100.0f64..100.0,
            bx in -100.0f64..100.0, by in -100.0f64..100.0,
            cx in -100.0f64..100.0, cy in -100.0f64..100.0,
            dx in -100.0f64..100.0, dy in -100.0f64..100.0,
        ) {
            let (a, b, c, d) = (Vec2::new(ax, ay), Vec2::new(bx, by), Vec2::new(cx, cy), Vec2::new(dx, dy));
            let forward = segment_intersection(a, b, c, d);
            if let Some(x) = forward {
                prop_assert!(x.x.is_finite() && x.y.is_finite());
                let seg = Aabb::from_points(&[a, b]);
                prop_assert!(x.x >= seg.min.x - 1e-6 && x.x <= seg.max.x + 1e-6);
                prop_assert!(x.y >= seg.min.y - 1e-6 && x.y <= seg.max.y + 1e-6);
            }

            // swapping the segments finds the same point, unless the two
            // segments are close to parallel or meet at an endpoint
            let (u, v) = ((b - a).normalized(), (d - c).normalized());
            let sine = (u.x * v.y - u.y * v.x).abs();
            let near_end = |x: Vec2| [a, b, c, d].iter().any(|p| p.distance(x) < 1e-6);
            if sine > 1e-3 {
                match (forward, segment_intersection(c, d, a, b)) {
                    (Some(x), Some(y)) => prop_assert!(x.distance(y) < 1e-6, "{x:?} != {y:?}"),
                    (Some(x), None) | (None, Some(x)) => prop_assert!(near_end(x)),
                    (None, None) => {}
                }
            }
        }

        #[test]
        fn prop_bezier_stays_in_control_hull_box(
            x0 in -500.0f64..500.0, y0 in -500.0f64..500.0,
            x1 in -500.0f64..500.0, y1 in -500.0f64..500.0,
            a in 0.01f64..1.0, b in 0.01f64..1.0,
        ) {
            let control = bezier_control_points(
                Vec2::new(x0, y0), Vec2::new(x1, y1), ReachFactors::new(a, b), DEFAULT_CONTROL_CAP,
            );
            let hull = Aabb::from_points(&control);
            let pts: [Vec2; 7] = sample_cubic_bezier(&control);
            for p in pts {
                prop_assert!(p.x >= hull.min.x - 1e-6 && p.x <= hull.max.x + 1e-6);
                prop_assert!(p.y >= hull.min.y - 1e-6 && p.y <= hull.max.y + 1e-6);
            }
        }
    }
}
