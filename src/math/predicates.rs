use std::cmp::Ordering;

use num_traits::Zero;

use super::number::{sign, Ft};
use super::point::{Point2, Point3};
use super::primitives::{Segment2, Segment3, Triangle2, Triangle3};

/// Orientation of an ordered triple of 2D points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    Collinear,
    CounterClockwise,
}

/// Classification of a point relative to a bounded region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

/// Exact orientation of `c` relative to the directed line `a → b`.
#[must_use]
pub fn orient2d(a: &Point2, b: &Point2, c: &Point2) -> Orientation {
    let det = (&b.x - &a.x) * (&c.y - &a.y) - (&b.y - &a.y) * (&c.x - &a.x);
    match sign(&det) {
        Ordering::Greater => Orientation::CounterClockwise,
        Ordering::Less => Orientation::Clockwise,
        Ordering::Equal => Orientation::Collinear,
    }
}

/// Signed volume determinant `((b - a) × (c - a)) · (d - a)`.
#[must_use]
pub fn orient3d_det(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> Ft {
    let n = (b - a).cross(&(c - a));
    n.dot(&(d - a))
}

/// Side of `d` relative to the plane through `a`, `b`, `c`: `Greater` when
/// `d` lies on the side the normal `(b - a) × (c - a)` points to.
#[must_use]
pub fn orient3d(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> Ordering {
    sign(&orient3d_det(a, b, c, d))
}

#[must_use]
pub fn collinear_3d(a: &Point3, b: &Point3, c: &Point3) -> bool {
    (b - a).cross(&(c - a)).is_zero()
}

#[must_use]
pub fn coplanar(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> bool {
    orient3d_det(a, b, c, d).is_zero()
}

/// `true` when `p` lies between `a` and `b`, all three being collinear.
fn between<P: Ord>(a: &P, b: &P, p: &P) -> bool {
    (a <= p && p <= b) || (b <= p && p <= a)
}

#[must_use]
pub fn point_on_segment_2d(p: &Point2, s: &Segment2) -> bool {
    orient2d(&s.source, &s.target, p) == Orientation::Collinear && between(&s.source, &s.target, p)
}

#[must_use]
pub fn point_on_segment_3d(p: &Point3, s: &Segment3) -> bool {
    collinear_3d(&s.source, &s.target, p) && between(&s.source, &s.target, p)
}

/// Locates a point against a closed ring given without its closing vertex.
#[must_use]
pub fn classify_point_in_ring(p: &Point2, ring: &[Point2]) -> PointClassification {
    let n = ring.len();
    if n == 0 {
        return PointClassification::Outside;
    }
    let mut inside = false;
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        if point_on_segment_2d(p, &Segment2::new(a.clone(), b.clone())) {
            return PointClassification::OnBoundary;
        }
        let upward = a.y <= p.y && b.y > p.y;
        let downward = a.y > p.y && b.y <= p.y;
        if upward && orient2d(a, b, p) == Orientation::CounterClockwise {
            inside = !inside;
        } else if downward && orient2d(a, b, p) == Orientation::Clockwise {
            inside = !inside;
        }
    }
    if inside {
        PointClassification::Inside
    } else {
        PointClassification::Outside
    }
}

#[must_use]
pub fn classify_point_in_triangle_2d(p: &Point2, t: &Triangle2) -> PointClassification {
    classify_point_in_ring(p, &t.vertices)
}

/// Locates `p` against a 3D triangle; points off the supporting plane are outside.
#[must_use]
pub fn classify_point_in_triangle_3d(p: &Point3, t: &Triangle3) -> PointClassification {
    let [a, b, c] = &t.vertices;
    if !coplanar(a, b, c, p) {
        return PointClassification::Outside;
    }
    if t.is_degenerate() {
        let hull = t.degenerate_hull();
        return if point_on_segment_3d(p, &hull) {
            PointClassification::OnBoundary
        } else {
            PointClassification::Outside
        };
    }
    let Some(plane) = t.supporting_plane() else {
        return PointClassification::Outside;
    };
    let projection = super::projection::ProjectionPlane::new(plane);
    let projected = Triangle2::new(
        projection.project(a),
        projection.project(b),
        projection.project(c),
    );
    classify_point_in_triangle_2d(&projection.project(p), &projected)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i64, y: i64) -> Point2 {
        Point2::from_i64(x, y)
    }

    fn square() -> Vec<Point2> {
        vec![p(0, 0), p(2, 0), p(2, 2), p(0, 2)]
    }

    #[test]
    fn orientation_signs() {
        assert_eq!(orient2d(&p(0, 0), &p(1, 0), &p(1, 1)), Orientation::CounterClockwise);
        assert_eq!(orient2d(&p(0, 0), &p(1, 1), &p(1, 0)), Orientation::Clockwise);
        assert_eq!(orient2d(&p(0, 0), &p(1, 1), &p(3, 3)), Orientation::Collinear);
    }

    #[test]
    fn ring_classification() {
        let ring = square();
        assert_eq!(classify_point_in_ring(&p(1, 1), &ring), PointClassification::Inside);
        assert_eq!(classify_point_in_ring(&p(3, 1), &ring), PointClassification::Outside);
        assert_eq!(classify_point_in_ring(&p(2, 1), &ring), PointClassification::OnBoundary);
        assert_eq!(classify_point_in_ring(&p(0, 0), &ring), PointClassification::OnBoundary);
        // ray through a vertex
        assert_eq!(classify_point_in_ring(&p(-1, 2), &ring), PointClassification::Outside);
    }

    #[test]
    fn orient3d_sides() {
        let a = Point3::from_i64(0, 0, 0);
        let b = Point3::from_i64(1, 0, 0);
        let c = Point3::from_i64(0, 1, 0);
        assert_eq!(orient3d(&a, &b, &c, &Point3::from_i64(0, 0, 1)), Ordering::Greater);
        assert_eq!(orient3d(&a, &b, &c, &Point3::from_i64(0, 0, -1)), Ordering::Less);
        assert_eq!(orient3d(&a, &b, &c, &Point3::from_i64(5, 5, 0)), Ordering::Equal);
    }

    #[test]
    fn triangle_3d_classification() {
        let t = Triangle3::new(
            Point3::from_i64(0, 0, 1),
            Point3::from_i64(4, 0, 1),
            Point3::from_i64(0, 4, 1),
        );
        assert_eq!(
            classify_point_in_triangle_3d(&Point3::from_i64(1, 1, 1), &t),
            PointClassification::Inside
        );
        assert_eq!(
            classify_point_in_triangle_3d(&Point3::from_i64(1, 1, 0), &t),
            PointClassification::Outside
        );
        assert_eq!(
            classify_point_in_triangle_3d(&Point3::from_i64(2, 2, 1), &t),
            PointClassification::OnBoundary
        );
    }
}
