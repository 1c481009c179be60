use std::slice;

use tracing::trace;

use crate::error::Result;
use crate::math::intersect_2d::{
    clip_segment_by_triangle_2d, intersect_segments_2d, segments_intersect_2d, SegmentIntersection2,
};
use crate::math::polygon_set_2d::{merge_disjoint, overlay, split_segment, SetOperation};
use crate::math::predicates::{point_on_segment_2d, PointClassification};
use crate::math::{Ft, Point2, PolygonWithHoles2, Segment2};
use crate::set::{Dim2, GeometrySet, PrimitiveRef, PrimitiveValue};

use super::pairwise::{join_intervals, subtract_intervals, PairwiseOps};

type Ref<'a> = PrimitiveRef<'a, Dim2>;

fn add_intersection(out: &mut GeometrySet<Dim2>, r: SegmentIntersection2) {
    match r {
        SegmentIntersection2::None => {}
        SegmentIntersection2::Point(p) => {
            out.add_point(p, 0);
        }
        SegmentIntersection2::Segment(s) => {
            out.add_segment(s, 0);
        }
    }
}

fn covers_point(poly: &PolygonWithHoles2, p: &Point2) -> bool {
    poly.bounded_side(p) != PointClassification::Outside
}

/// Parts of a segment on a closed polygon: maximal sub-segments and the
/// points where the segment only touches the boundary.
fn clip_segment_by_polygon(seg: &Segment2, poly: &PolygonWithHoles2) -> Vec<SegmentIntersection2> {
    if let Some(t) = poly.as_triangle() {
        return match clip_segment_by_triangle_2d(seg, &t) {
            SegmentIntersection2::None => Vec::new(),
            r => vec![r],
        };
    }
    let mut cuts = Vec::new();
    for edge in poly.edges() {
        match intersect_segments_2d(seg, &edge) {
            SegmentIntersection2::None => {}
            SegmentIntersection2::Point(p) => cuts.push(p),
            SegmentIntersection2::Segment(s) => {
                cuts.push(s.source);
                cuts.push(s.target);
            }
        }
    }
    let pieces: Vec<(Segment2, bool)> = split_segment(seg, cuts)
        .into_iter()
        .map(|piece| {
            let inside = covers_point(poly, &piece.source.midpoint(&piece.target));
            (piece, inside)
        })
        .collect();

    let mut out: Vec<SegmentIntersection2> = Vec::new();
    let mut run: Option<Segment2> = None;
    for (k, (piece, inside)) in pieces.iter().enumerate() {
        if *inside {
            run = Some(match run.take() {
                Some(s) => Segment2::new(s.source, piece.target.clone()),
                None => piece.clone(),
            });
            continue;
        }
        if let Some(s) = run.take() {
            out.push(SegmentIntersection2::Segment(s));
        }
        // An outside piece touches the polygon at its start unless the
        // previous piece was kept.
        let previous_kept = k > 0 && pieces[k - 1].1;
        if !previous_kept && covers_point(poly, &piece.source) {
            out.push(SegmentIntersection2::Point(piece.source.clone()));
        }
    }
    match run {
        Some(s) => out.push(SegmentIntersection2::Segment(s)),
        None => {
            if covers_point(poly, &seg.target) {
                out.push(SegmentIntersection2::Point(seg.target.clone()));
            }
        }
    }
    out
}

fn segment_intersects_polygon(seg: &Segment2, poly: &PolygonWithHoles2) -> bool {
    poly.edges().any(|e| segments_intersect_2d(seg, &e)) || covers_point(poly, &seg.source)
}

fn polygons_intersect(a: &PolygonWithHoles2, b: &PolygonWithHoles2) -> bool {
    let boundaries_meet = a
        .edges()
        .any(|ea| b.edges().any(|eb| segments_intersect_2d(&ea, &eb)));
    if boundaries_meet {
        return true;
    }
    // Disjoint boundaries: one polygon lies in the other, or in a hole of it.
    let contains_vertex = |outer: &PolygonWithHoles2, inner: &PolygonWithHoles2| {
        inner.outer.first().is_some_and(|p| covers_point(outer, p))
    };
    contains_vertex(a, b) || contains_vertex(b, a)
}

/// Boundary contacts first, so touching polygons yield points or segments,
/// then the common interior.
fn intersect_polygons(a: &PolygonWithHoles2, b: &PolygonWithHoles2, out: &mut GeometrySet<Dim2>) {
    let areas = overlay(slice::from_ref(a), slice::from_ref(b), SetOperation::Intersection);
    let outside_areas = |p: &Point2| areas.iter().all(|area| !covers_point(area, p));
    for ea in a.edges() {
        for eb in b.edges() {
            match intersect_segments_2d(&ea, &eb) {
                SegmentIntersection2::Point(p) if outside_areas(&p) => {
                    out.add_point(p, 0);
                }
                SegmentIntersection2::Segment(s)
                    if outside_areas(&s.source.midpoint(&s.target)) =>
                {
                    out.add_segment(s, 0);
                }
                _ => {}
            }
        }
    }
    trace!(pieces = areas.len(), "polygon overlap");
    for area in areas {
        out.add_surface(area, 0);
    }
}

fn removed_interval(seg: &Segment2, overlap: &Segment2) -> (Ft, Ft) {
    (seg.param_of(&overlap.source), seg.param_of(&overlap.target))
}

fn difference_segment(seg: &Segment2, subtrahends: &[Ref<'_>]) -> Vec<Segment2> {
    let mut removed = Vec::new();
    for b in subtrahends {
        match b {
            PrimitiveRef::Segment(t) => {
                if let SegmentIntersection2::Segment(s) = intersect_segments_2d(seg, t) {
                    removed.push(removed_interval(seg, &s));
                }
            }
            PrimitiveRef::Surface(poly) => {
                for r in clip_segment_by_polygon(seg, poly) {
                    if let SegmentIntersection2::Segment(s) = r {
                        removed.push(removed_interval(seg, &s));
                    }
                }
            }
            PrimitiveRef::Point(_) | PrimitiveRef::Volume(_) => {}
        }
    }
    if removed.is_empty() {
        return vec![seg.clone()];
    }
    join_intervals(subtract_intervals(removed))
        .iter()
        .map(|(lo, hi)| Segment2::new(seg.point_at(lo), seg.point_at(hi)))
        .collect()
}

fn difference_polygon(
    poly: &PolygonWithHoles2,
    subtrahends: &[Ref<'_>],
) -> Option<Vec<PolygonWithHoles2>> {
    let mut pieces: Option<Vec<PolygonWithHoles2>> = None;
    for b in subtrahends {
        if let PrimitiveRef::Surface(other) = b {
            let current = pieces.take().unwrap_or_else(|| vec![poly.clone()]);
            let next = overlay(&current, slice::from_ref(*other), SetOperation::Difference);
            let done = next.is_empty();
            pieces = Some(next);
            if done {
                break;
            }
        }
    }
    pieces
}

impl PairwiseOps for Dim2 {
    fn intersects_ordered(a: Ref<'_>, b: Ref<'_>) -> bool {
        match (a, b) {
            (PrimitiveRef::Point(p), PrimitiveRef::Point(q)) => p == q,
            (PrimitiveRef::Segment(s), PrimitiveRef::Point(p)) => point_on_segment_2d(p, s),
            (PrimitiveRef::Segment(s), PrimitiveRef::Segment(t)) => segments_intersect_2d(s, t),
            (PrimitiveRef::Surface(poly), PrimitiveRef::Point(p)) => covers_point(poly, p),
            (PrimitiveRef::Surface(poly), PrimitiveRef::Segment(s)) => {
                segment_intersects_polygon(s, poly)
            }
            (PrimitiveRef::Surface(p), PrimitiveRef::Surface(q)) => polygons_intersect(p, q),
            (PrimitiveRef::Volume(v), _) | (_, PrimitiveRef::Volume(v)) => match *v {},
            _ => Self::intersects_ordered(b, a),
        }
    }

    fn intersection_ordered(a: Ref<'_>, b: Ref<'_>, out: &mut GeometrySet<Self>) -> Result<()> {
        match (a, b) {
            (PrimitiveRef::Point(p), PrimitiveRef::Point(q)) => {
                if p == q {
                    out.add_point(p.clone(), 0);
                }
            }
            (PrimitiveRef::Segment(s), PrimitiveRef::Point(p)) => {
                if point_on_segment_2d(p, s) {
                    out.add_point(p.clone(), 0);
                }
            }
            (PrimitiveRef::Segment(s), PrimitiveRef::Segment(t)) => {
                add_intersection(out, intersect_segments_2d(s, t));
            }
            (PrimitiveRef::Surface(poly), PrimitiveRef::Point(p)) => {
                if covers_point(poly, p) {
                    out.add_point(p.clone(), 0);
                }
            }
            (PrimitiveRef::Surface(poly), PrimitiveRef::Segment(s)) => {
                for r in clip_segment_by_polygon(s, poly) {
                    add_intersection(out, r);
                }
            }
            (PrimitiveRef::Surface(p), PrimitiveRef::Surface(q)) => intersect_polygons(p, q, out),
            (PrimitiveRef::Volume(v), _) | (_, PrimitiveRef::Volume(v)) => match *v {},
            _ => return Self::intersection_ordered(b, a, out),
        }
        Ok(())
    }

    fn difference_primitive(
        a: Ref<'_>,
        flags: u32,
        subtrahends: &[Ref<'_>],
    ) -> Result<Vec<(PrimitiveValue<Self>, u32)>> {
        let pieces = match a {
            PrimitiveRef::Point(p) => {
                if subtrahends.iter().any(|b| Self::intersects_ordered(*b, a)) {
                    Vec::new()
                } else {
                    vec![PrimitiveValue::Point(p.clone())]
                }
            }
            PrimitiveRef::Segment(s) => difference_segment(s, subtrahends)
                .into_iter()
                .map(PrimitiveValue::Segment)
                .collect(),
            PrimitiveRef::Surface(poly) => match difference_polygon(poly, subtrahends) {
                Some(pieces) => pieces.into_iter().map(PrimitiveValue::Surface).collect(),
                None => vec![PrimitiveValue::Surface(poly.clone())],
            },
            PrimitiveRef::Volume(v) => match *v {},
        };
        Ok(pieces.into_iter().map(|p| (p, flags)).collect())
    }

    fn union_volumes(_: Vec<Self::Volume>, v: Self::Volume) -> Result<Vec<Self::Volume>> {
        match v {}
    }

    /// Dissolves edges shared by the surface pieces; exteriors come out
    /// counter-clockwise and holes clockwise.
    fn post_union(set: GeometrySet<Self>) -> GeometrySet<Self> {
        let surfaces: Vec<PolygonWithHoles2> =
            set.surfaces().map(|e| e.primitive().clone()).collect();
        let mut out = GeometrySet::new();
        for (_, primitive, flags) in set.elements() {
            if !matches!(primitive, PrimitiveRef::Surface(_)) {
                out.add_primitive(primitive.to_value(), flags);
            }
        }
        for polygon in merge_disjoint(&surfaces) {
            out.add_surface(polygon, 0);
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::ring_signed_area;
    use crate::math::ft;
    use num_traits::Signed;

    fn p(x: i64, y: i64) -> Point2 {
        Point2::from_i64(x, y)
    }

    fn seg(a: (i64, i64), b: (i64, i64)) -> Segment2 {
        Segment2::new(p(a.0, a.1), p(b.0, b.1))
    }

    fn square(x: i64, y: i64, size: i64) -> PolygonWithHoles2 {
        PolygonWithHoles2::from_outer(vec![
            p(x, y),
            p(x + size, y),
            p(x + size, y + size),
            p(x, y + size),
        ])
    }

    fn surface_area(set: &GeometrySet<Dim2>) -> Ft {
        set.surfaces().map(|e| e.primitive().area()).fold(ft(0), |acc, a| acc + a)
    }

    #[test]
    fn polygon_in_a_hole_does_not_intersect() {
        let holed = PolygonWithHoles2::new(square(0, 0, 10).outer, vec![square(2, 2, 6).outer]);
        let inner = square(4, 4, 2);
        let meets = |a: &PolygonWithHoles2, b: &PolygonWithHoles2| {
            Dim2::intersects_ordered(PrimitiveRef::Surface(a), PrimitiveRef::Surface(b))
        };
        assert!(!meets(&holed, &inner));
        assert!(meets(&holed, &square(1, 1, 2)));
        assert!(meets(&square(-5, -5, 30), &inner));
    }

    #[test]
    fn segment_through_a_holed_polygon() {
        let holed = PolygonWithHoles2::new(square(0, 0, 10).outer, vec![square(2, 2, 6).outer]);
        let r = clip_segment_by_polygon(&seg((-1, 5), (11, 5)), &holed);
        assert_eq!(
            r,
            vec![
                SegmentIntersection2::Segment(seg((0, 5), (2, 5))),
                SegmentIntersection2::Segment(seg((8, 5), (10, 5))),
            ]
        );
    }

    #[test]
    fn segment_touching_a_corner() {
        let poly = PolygonWithHoles2::from_outer(vec![p(0, 0), p(4, 0), p(4, 4), p(2, 6), p(0, 4)]);
        let r = clip_segment_by_polygon(&seg((0, 6), (4, 6)), &poly);
        assert_eq!(r, vec![SegmentIntersection2::Point(p(2, 6))]);
        let r = clip_segment_by_polygon(&seg((4, 4), (6, 2)), &poly);
        assert_eq!(r, vec![SegmentIntersection2::Point(p(4, 4))]);
    }

    #[test]
    fn squares_sharing_an_edge_meet_in_a_segment() {
        let mut out = GeometrySet::new();
        Dim2::intersection_ordered(
            PrimitiveRef::Surface(&square(0, 0, 1)),
            PrimitiveRef::Surface(&square(1, 0, 1)),
            &mut out,
        )
        .unwrap();
        assert_eq!(out.num_surfaces(), 0);
        assert!(out.segments().any(|e| e.primitive().canonical() == seg((1, 0), (1, 1))));
    }

    #[test]
    fn overlapping_squares_meet_in_a_square() {
        let mut out = GeometrySet::new();
        Dim2::intersection_ordered(
            PrimitiveRef::Surface(&square(0, 0, 2)),
            PrimitiveRef::Surface(&square(1, 1, 2)),
            &mut out,
        )
        .unwrap();
        assert_eq!(surface_area(&out), ft(1));
        assert_eq!(out.num_segments(), 0);
    }

    #[test]
    fn segment_minus_segment() {
        let a = seg((0, 0), (4, 0));
        let b = seg((-1, 0), (1, 0));
        let c = seg((2, 0), (3, 0));
        let left = difference_segment(&a, &[PrimitiveRef::Segment(&b), PrimitiveRef::Segment(&c)]);
        assert_eq!(left, vec![seg((1, 0), (2, 0)), seg((3, 0), (4, 0))]);
    }

    #[test]
    fn polygon_minus_polygons() {
        let a = square(0, 0, 6);
        let holes = [square(1, 1, 1), square(3, 3, 1), square(5, -1, 2)];
        let refs: Vec<Ref<'_>> = holes.iter().map(PrimitiveRef::Surface).collect();
        let pieces = Dim2::difference_primitive(PrimitiveRef::Surface(&a), 0, &refs).unwrap();
        let area = pieces
            .iter()
            .filter_map(|(v, _)| match v {
                PrimitiveValue::Surface(s) => Some(s.area()),
                _ => None,
            })
            .fold(ft(0), |acc, a| acc + a);
        assert_eq!(area, ft(33));
    }

    #[test]
    fn post_union_orients_rings() {
        let mut set = GeometrySet::<Dim2>::new();
        let mut cw = square(0, 0, 2);
        cw.outer.reverse();
        set.add_surface(cw, 0);
        set.add_surface(square(2, 0, 2), 0);
        let merged = Dim2::post_union(set);
        assert_eq!(merged.num_surfaces(), 1);
        let outer = &merged.surfaces().next().unwrap().primitive().outer;
        assert!(ring_signed_area(outer).is_positive());
    }
}
