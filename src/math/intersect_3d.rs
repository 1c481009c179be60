use std::cmp::Ordering;

use num_traits::Zero;

use super::intersect_2d::{
    clip_segment_by_triangle_2d, intersect_segments_2d, intersect_triangles_2d,
    SegmentIntersection2,
};
use super::point::Point3;
use super::predicates::{
    classify_point_in_triangle_3d, collinear_3d, orient3d_det, point_on_segment_3d,
    PointClassification,
};
use super::primitives::{Plane3, Segment2, Segment3, Triangle2, Triangle3};
use super::projection::ProjectionPlane;

/// Result of an exact 3D intersection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intersection3 {
    None,
    Point(Point3),
    Segment(Segment3),
    /// Convex planar polygon, coplanar triangle overlap only.
    Polygon(Vec<Point3>),
}

impl Intersection3 {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    fn from_points(mut points: Vec<Point3>) -> Self {
        points.dedup();
        match points.len() {
            0 => Self::None,
            1 => Self::Point(points.swap_remove(0)),
            2 => {
                let b = points.swap_remove(1);
                let a = points.swap_remove(0);
                Self::Segment(Segment3::new(a, b))
            }
            _ => Self::Polygon(points),
        }
    }

    /// Lexicographic extent of a set of collinear points.
    fn span(points: &[Point3]) -> Self {
        match (points.iter().min(), points.iter().max()) {
            (Some(lo), Some(hi)) if lo == hi => Self::Point(lo.clone()),
            (Some(lo), Some(hi)) => Self::Segment(Segment3::new(lo.clone(), hi.clone())),
            _ => Self::None,
        }
    }

    fn push_points(&self, out: &mut Vec<Point3>) {
        match self {
            Self::None => {}
            Self::Point(p) => out.push(p.clone()),
            Self::Segment(s) => {
                out.push(s.source.clone());
                out.push(s.target.clone());
            }
            Self::Polygon(ring) => out.extend(ring.iter().cloned()),
        }
    }
}

fn lift_2d(projection: &ProjectionPlane, r: SegmentIntersection2) -> Intersection3 {
    match r {
        SegmentIntersection2::None => Intersection3::None,
        SegmentIntersection2::Point(p) => Intersection3::Point(projection.lift(&p)),
        SegmentIntersection2::Segment(s) => Intersection3::Segment(Segment3::new(
            projection.lift(&s.source),
            projection.lift(&s.target),
        )),
    }
}

/// Exact 3D segment-segment intersection, including collinear overlap.
#[must_use]
pub fn intersect_segments_3d(s: &Segment3, t: &Segment3) -> Intersection3 {
    if s.is_degenerate() {
        return if point_on_segment_3d(&s.source, t) {
            Intersection3::Point(s.source.clone())
        } else {
            Intersection3::None
        };
    }
    if t.is_degenerate() {
        return if point_on_segment_3d(&t.source, s) {
            Intersection3::Point(t.source.clone())
        } else {
            Intersection3::None
        };
    }
    let src_on_line = collinear_3d(&s.source, &s.target, &t.source);
    let tgt_on_line = collinear_3d(&s.source, &s.target, &t.target);
    if src_on_line && tgt_on_line {
        let a = s.canonical();
        let b = t.canonical();
        let lo = a.source.max(b.source);
        let hi = a.target.min(b.target);
        return match lo.cmp(&hi) {
            Ordering::Greater => Intersection3::None,
            Ordering::Equal => Intersection3::Point(lo),
            Ordering::Less => Intersection3::Segment(Segment3::new(lo, hi)),
        };
    }
    if !orient3d_det(&s.source, &s.target, &t.source, &t.target).is_zero() {
        return Intersection3::None;
    }
    let off_line = if src_on_line { &t.target } else { &t.source };
    let Some(plane) = Plane3::from_points(&s.source, &s.target, off_line) else {
        return Intersection3::None;
    };
    let projection = ProjectionPlane::new(plane);
    let s2 = Segment2::new(projection.project(&s.source), projection.project(&s.target));
    let t2 = Segment2::new(projection.project(&t.source), projection.project(&t.target));
    lift_2d(&projection, intersect_segments_2d(&s2, &t2))
}

/// Exact intersection of a segment with an oriented plane.
#[must_use]
pub fn intersect_segment_plane(seg: &Segment3, plane: &Plane3) -> Intersection3 {
    let s0 = plane.side(&seg.source);
    let s1 = plane.side(&seg.target);
    match (s0, s1) {
        (Ordering::Equal, Ordering::Equal) => Intersection3::Segment(seg.clone()),
        (Ordering::Equal, _) => Intersection3::Point(seg.source.clone()),
        (_, Ordering::Equal) => Intersection3::Point(seg.target.clone()),
        _ if s0 == s1 => Intersection3::None,
        _ => {
            let d = &seg.target - &seg.source;
            let t = (&plane.d - plane.normal.dot(&seg.source.to_vector())) / plane.normal.dot(&d);
            Intersection3::Point(seg.point_at(&t))
        }
    }
}

/// Exact segment-triangle intersection.
#[must_use]
pub fn intersect_segment_triangle_3d(seg: &Segment3, tri: &Triangle3) -> Intersection3 {
    let Some(plane) = tri.supporting_plane() else {
        return intersect_segments_3d(seg, &tri.degenerate_hull());
    };
    if seg.is_degenerate() {
        return match classify_point_in_triangle_3d(&seg.source, tri) {
            PointClassification::Outside => Intersection3::None,
            _ => Intersection3::Point(seg.source.clone()),
        };
    }
    match intersect_segment_plane(seg, &plane) {
        Intersection3::None | Intersection3::Polygon(_) => Intersection3::None,
        Intersection3::Point(p) => match classify_point_in_triangle_3d(&p, tri) {
            PointClassification::Outside => Intersection3::None,
            _ => Intersection3::Point(p),
        },
        Intersection3::Segment(_) => {
            let projection = ProjectionPlane::new(plane);
            let [a, b, c] = &tri.vertices;
            let t2 = Triangle2::new(
                projection.project(a),
                projection.project(b),
                projection.project(c),
            );
            let s2 =
                Segment2::new(projection.project(&seg.source), projection.project(&seg.target));
            lift_2d(&projection, clip_segment_by_triangle_2d(&s2, &t2))
        }
    }
}

/// All three vertices strictly on the same side of a plane.
fn one_side(sides: &[Ordering; 3]) -> bool {
    sides.iter().all(|s| *s == Ordering::Greater) || sides.iter().all(|s| *s == Ordering::Less)
}

/// Exact triangle-triangle intersection.
///
/// Coplanar overlaps yield a convex [`Intersection3::Polygon`] (or a point or
/// segment when the overlap is degenerate). Transversal intersections lie on
/// the line shared by both supporting planes and are bounded by the extreme
/// edge/triangle intersection points.
#[must_use]
pub fn intersect_triangles_3d(a: &Triangle3, b: &Triangle3) -> Intersection3 {
    let (Some(plane_a), Some(plane_b)) = (a.supporting_plane(), b.supporting_plane()) else {
        return match (a.is_degenerate(), b.is_degenerate()) {
            (true, true) => intersect_segments_3d(&a.degenerate_hull(), &b.degenerate_hull()),
            (true, false) => intersect_segment_triangle_3d(&a.degenerate_hull(), b),
            _ => intersect_segment_triangle_3d(&b.degenerate_hull(), a),
        };
    };

    let sides_b = b.vertices.each_ref().map(|p| plane_a.side(p));
    if sides_b.iter().all(|s| *s == Ordering::Equal) {
        let projection = ProjectionPlane::new(plane_a);
        let project = |t: &Triangle3| {
            let [p, q, r] = &t.vertices;
            Triangle2::new(projection.project(p), projection.project(q), projection.project(r))
        };
        let ring = intersect_triangles_2d(&project(a), &project(b));
        return Intersection3::from_points(ring.iter().map(|p| projection.lift(p)).collect());
    }
    if one_side(&sides_b) {
        return Intersection3::None;
    }
    let sides_a = a.vertices.each_ref().map(|p| plane_b.side(p));
    if one_side(&sides_a) {
        return Intersection3::None;
    }

    let mut points = Vec::new();
    for edge in a.edges() {
        intersect_segment_triangle_3d(&edge, b).push_points(&mut points);
    }
    for edge in b.edges() {
        intersect_segment_triangle_3d(&edge, a).push_points(&mut points);
    }
    Intersection3::span(&points)
}

/// `true` when the triangles share at least one point.
#[must_use]
pub fn triangles_intersect_3d(a: &Triangle3, b: &Triangle3) -> bool {
    !intersect_triangles_3d(a, b).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::number::ft;

    fn p(x: i64, y: i64, z: i64) -> Point3 {
        Point3::from_i64(x, y, z)
    }

    fn tri(a: (i64, i64, i64), b: (i64, i64, i64), c: (i64, i64, i64)) -> Triangle3 {
        Triangle3::new(p(a.0, a.1, a.2), p(b.0, b.1, b.2), p(c.0, c.1, c.2))
    }

    #[test]
    fn skew_and_crossing_segments() {
        let s = Segment3::new(p(0, 0, 0), p(2, 2, 0));
        let t = Segment3::new(p(0, 2, 0), p(2, 0, 0));
        assert_eq!(intersect_segments_3d(&s, &t), Intersection3::Point(p(1, 1, 0)));
        let u = Segment3::new(p(0, 2, 1), p(2, 0, 1));
        assert!(intersect_segments_3d(&s, &u).is_none());
    }

    #[test]
    fn collinear_segments_overlap() {
        let s = Segment3::new(p(0, 0, 0), p(4, 4, 4));
        let t = Segment3::new(p(2, 2, 2), p(6, 6, 6));
        assert_eq!(
            intersect_segments_3d(&s, &t),
            Intersection3::Segment(Segment3::new(p(2, 2, 2), p(4, 4, 4)))
        );
    }

    #[test]
    fn segment_pierces_triangle() {
        let t = tri((0, 0, 0), (4, 0, 0), (0, 4, 0));
        let s = Segment3::new(p(1, 1, -1), p(1, 1, 1));
        assert_eq!(intersect_segment_triangle_3d(&s, &t), Intersection3::Point(p(1, 1, 0)));
        let miss = Segment3::new(p(5, 5, -1), p(5, 5, 1));
        assert!(intersect_segment_triangle_3d(&miss, &t).is_none());
    }

    #[test]
    fn coplanar_segment_clipped() {
        let t = tri((0, 0, 0), (4, 0, 0), (0, 4, 0));
        let s = Segment3::new(p(-1, 1, 0), p(5, 1, 0));
        let r = intersect_segment_triangle_3d(&s, &t);
        assert_eq!(r, Intersection3::Segment(Segment3::new(p(0, 1, 0), p(3, 1, 0))));
    }

    #[test]
    fn transversal_triangles() {
        let a = tri((0, 0, 0), (4, 0, 0), (0, 4, 0));
        let b = tri((1, 1, -1), (1, 1, 1), (1, -3, 0));
        let r = intersect_triangles_3d(&a, &b);
        match r {
            Intersection3::Segment(s) => {
                assert_eq!(s.target, p(1, 1, 0));
                assert_eq!(s.source.x, ft(1));
                assert_eq!(s.source.z, ft(0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn coplanar_triangles_overlap() {
        let a = tri((0, 0, 1), (4, 0, 1), (0, 4, 1));
        let b = tri((0, 0, 1), (4, 4, 1), (0, 4, 1));
        match intersect_triangles_3d(&a, &b) {
            Intersection3::Polygon(ring) => assert_eq!(ring.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
        let far = tri((0, 0, 5), (4, 0, 5), (0, 4, 5));
        assert!(!triangles_intersect_3d(&a, &far));
    }
}
