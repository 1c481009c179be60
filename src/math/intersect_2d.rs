use std::cmp::Ordering;

use num_traits::{One, Zero};

use super::number::{sign, Ft};
use super::point::Point2;
use super::predicates::{
    classify_point_in_triangle_2d, orient2d, point_on_segment_2d, Orientation,
    PointClassification,
};
use super::primitives::{Segment2, Triangle2};

/// Result of an exact 2D intersection with a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentIntersection2 {
    None,
    Point(Point2),
    Segment(Segment2),
}

impl SegmentIntersection2 {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

fn from_range(lo: Point2, hi: Point2) -> SegmentIntersection2 {
    match lo.cmp(&hi) {
        Ordering::Greater => SegmentIntersection2::None,
        Ordering::Equal => SegmentIntersection2::Point(lo),
        Ordering::Less => SegmentIntersection2::Segment(Segment2::new(lo, hi)),
    }
}

/// Exact segment-segment intersection, including collinear overlap.
#[must_use]
pub fn intersect_segments_2d(s: &Segment2, t: &Segment2) -> SegmentIntersection2 {
    if s.is_degenerate() {
        return if point_on_segment_2d(&s.source, t) {
            SegmentIntersection2::Point(s.source.clone())
        } else {
            SegmentIntersection2::None
        };
    }
    if t.is_degenerate() {
        return if point_on_segment_2d(&t.source, s) {
            SegmentIntersection2::Point(t.source.clone())
        } else {
            SegmentIntersection2::None
        };
    }

    let o1 = orient2d(&s.source, &s.target, &t.source);
    let o2 = orient2d(&s.source, &s.target, &t.target);
    if o1 == Orientation::Collinear && o2 == Orientation::Collinear {
        let a = s.canonical();
        let b = t.canonical();
        let lo = a.source.max(b.source);
        let hi = a.target.min(b.target);
        return from_range(lo, hi);
    }
    let o3 = orient2d(&t.source, &t.target, &s.source);
    let o4 = orient2d(&t.source, &t.target, &s.target);
    if o1 == o2 || o3 == o4 {
        return SegmentIntersection2::None;
    }

    let point = if o1 == Orientation::Collinear {
        t.source.clone()
    } else if o2 == Orientation::Collinear {
        t.target.clone()
    } else if o3 == Orientation::Collinear {
        s.source.clone()
    } else if o4 == Orientation::Collinear {
        s.target.clone()
    } else {
        let ds = &s.target - &s.source;
        let dt = &t.target - &t.source;
        let param = (&t.source - &s.source).cross(&dt) / ds.cross(&dt);
        s.point_at(&param)
    };
    SegmentIntersection2::Point(point)
}

/// `true` when the two segments share at least one point.
#[must_use]
pub fn segments_intersect_2d(s: &Segment2, t: &Segment2) -> bool {
    !intersect_segments_2d(s, t).is_none()
}

/// Clips a segment against a convex counter-clockwise ring (Cyrus-Beck with
/// exact parameters).
#[must_use]
pub fn clip_segment_by_convex_ring(seg: &Segment2, ring: &[Point2]) -> SegmentIntersection2 {
    let d = &seg.target - &seg.source;
    let mut t0 = Ft::zero();
    let mut t1 = Ft::one();
    let n = ring.len();
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        let edge = b - a;
        let num = edge.cross(&(&seg.source - a));
        let den = edge.cross(&d);
        match sign(&den) {
            Ordering::Equal => {
                if sign(&num) == Ordering::Less {
                    return SegmentIntersection2::None;
                }
            }
            Ordering::Greater => {
                let t = -num / den;
                if t > t0 {
                    t0 = t;
                }
            }
            Ordering::Less => {
                let t = -num / den;
                if t < t1 {
                    t1 = t;
                }
            }
        }
        if t0 > t1 {
            return SegmentIntersection2::None;
        }
    }
    if t0 == t1 {
        SegmentIntersection2::Point(seg.point_at(&t0))
    } else {
        SegmentIntersection2::Segment(Segment2::new(seg.point_at(&t0), seg.point_at(&t1)))
    }
}

/// Exact intersection of a segment with a closed triangle.
#[must_use]
pub fn clip_segment_by_triangle_2d(seg: &Segment2, tri: &Triangle2) -> SegmentIntersection2 {
    if seg.is_degenerate() {
        return match classify_point_in_triangle_2d(&seg.source, tri) {
            PointClassification::Outside => SegmentIntersection2::None,
            _ => SegmentIntersection2::Point(seg.source.clone()),
        };
    }
    match sign(&tri.signed_area()) {
        Ordering::Greater => clip_segment_by_convex_ring(seg, &tri.vertices),
        Ordering::Less => clip_segment_by_convex_ring(seg, &tri.reversed().vertices),
        Ordering::Equal => {
            let lo = tri.vertices.iter().min().cloned();
            let hi = tri.vertices.iter().max().cloned();
            match (lo, hi) {
                (Some(lo), Some(hi)) => intersect_segments_2d(seg, &Segment2::new(lo, hi)),
                _ => SegmentIntersection2::None,
            }
        }
    }
}

/// Sutherland-Hodgman clipping of `subject` by the convex counter-clockwise
/// ring `clip`. Boundary points are kept.
#[must_use]
pub fn clip_convex_polygon_2d(subject: &[Point2], clip: &[Point2]) -> Vec<Point2> {
    let mut output = subject.to_vec();
    let n = clip.len();
    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let a = &clip[i];
        let b = &clip[(i + 1) % n];
        let edge = b - a;
        let side = |p: &Point2| edge.cross(&(p - a));
        let input = std::mem::take(&mut output);
        let m = input.len();
        for j in 0..m {
            let cur = &input[j];
            let prev = &input[(j + m - 1) % m];
            let f_cur = side(cur);
            let f_prev = side(prev);
            let cur_in = sign(&f_cur) != Ordering::Less;
            let prev_in = sign(&f_prev) != Ordering::Less;
            if cur_in != prev_in {
                let t = &f_prev / (&f_prev - &f_cur);
                output.push(&*prev + &(cur - prev).scale(&t));
            }
            if cur_in {
                output.push(cur.clone());
            }
        }
    }
    simplify_ring(output)
}

/// Removes repeated and collinear vertices from a closed ring.
#[must_use]
pub fn simplify_ring(mut ring: Vec<Point2>) -> Vec<Point2> {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() > 2
        && ring
            .iter()
            .skip(2)
            .all(|q| orient2d(&ring[0], &ring[1], q) == Orientation::Collinear)
    {
        let lo = ring.iter().min().cloned();
        let hi = ring.iter().max().cloned();
        return lo.into_iter().chain(hi).collect();
    }
    let mut changed = true;
    while changed && ring.len() > 2 {
        changed = false;
        let n = ring.len();
        for i in 0..n {
            let prev = &ring[(i + n - 1) % n];
            let next = &ring[(i + 1) % n];
            if orient2d(prev, &ring[i], next) == Orientation::Collinear {
                ring.remove(i);
                changed = true;
                break;
            }
        }
    }
    ring
}

/// Intersection of two closed triangles as a convex ring (possibly a single
/// point or two points for a segment).
#[must_use]
pub fn intersect_triangles_2d(a: &Triangle2, b: &Triangle2) -> Vec<Point2> {
    let ccw = |t: &Triangle2| {
        if sign(&t.signed_area()) == Ordering::Less {
            t.reversed()
        } else {
            t.clone()
        }
    };
    let a = ccw(a);
    let b = ccw(b);
    if b.is_degenerate() || a.is_degenerate() {
        return degenerate_triangle_intersection(&a, &b);
    }
    clip_convex_polygon_2d(&a.vertices, &b.vertices)
}

fn degenerate_triangle_intersection(a: &Triangle2, b: &Triangle2) -> Vec<Point2> {
    let hull = |t: &Triangle2| -> Option<Segment2> {
        let lo = t.vertices.iter().min()?.clone();
        let hi = t.vertices.iter().max()?.clone();
        Some(Segment2::new(lo, hi))
    };
    let result = match (a.is_degenerate(), b.is_degenerate()) {
        (true, true) => match (hull(a), hull(b)) {
            (Some(s), Some(t)) => intersect_segments_2d(&s, &t),
            _ => SegmentIntersection2::None,
        },
        (true, false) => hull(a).map_or(SegmentIntersection2::None, |s| {
            clip_segment_by_triangle_2d(&s, b)
        }),
        _ => hull(b).map_or(SegmentIntersection2::None, |s| {
            clip_segment_by_triangle_2d(&s, a)
        }),
    };
    match result {
        SegmentIntersection2::None => Vec::new(),
        SegmentIntersection2::Point(p) => vec![p],
        SegmentIntersection2::Segment(s) => vec![s.source, s.target],
    }
}
