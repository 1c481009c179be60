use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::slice;

use num_traits::{One, Zero};
use tracing::trace;

use crate::error::Result;
use crate::math::intersect_3d::{
    intersect_segment_triangle_3d, intersect_segments_3d, intersect_triangles_3d,
    triangles_intersect_3d, Intersection3,
};
use crate::math::number::sign;
use crate::math::polygon_set_2d::{overlay, SetOperation};
use crate::math::predicates::{
    classify_point_in_triangle_3d, point_on_segment_3d, PointClassification,
};
use crate::math::projection::ProjectionPlane;
use crate::math::{ft, Ft, Point3, PolygonWithHoles2, Segment3, Triangle3};
use crate::polyhedron::{corefine, split_triangle, CorefineOp, Polyhedron};
use crate::set::{Dim3, GeometrySet, PrimitiveRef, PrimitiveValue, FLAG_IS_PLANAR};
use crate::spatial::{box_intersection, Bbox};
use crate::tessellation::triangulate_polygon_2d;

use super::pairwise::{join_intervals, subtract_intervals, PairwiseOps};

type Ref<'a> = PrimitiveRef<'a, Dim3>;

fn add_intersection(out: &mut GeometrySet<Dim3>, r: Intersection3) {
    match r {
        Intersection3::None => {}
        Intersection3::Point(p) => {
            out.add_point(p, 0);
        }
        Intersection3::Segment(s) => {
            out.add_segment(s, 0);
        }
        Intersection3::Polygon(ring) => out.add_points_as_ring(ring, 0),
    }
}

fn inside_or_on(v: &Polyhedron, p: &Point3) -> bool {
    v.classify_point(p) != PointClassification::Outside
}

fn triangle_boxes(triangles: &[Triangle3]) -> Vec<(Bbox, usize)> {
    triangles
        .iter()
        .enumerate()
        .map(|(i, t)| (Bbox::from_points_3d(&t.vertices), i))
        .collect()
}

fn surfaces_meet(a: &[Triangle3], b: &[Triangle3]) -> bool {
    box_intersection(&triangle_boxes(a), &triangle_boxes(b), |&i, &j| {
        if triangles_intersect_3d(&a[i], &b[j]) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .is_break()
}

/// Parameter intervals of `seg` inside or on the closed volume, and the
/// isolated points where it only touches the boundary.
fn clip_segment_by_volume(seg: &Segment3, v: &Polyhedron) -> (Vec<(Ft, Ft)>, Vec<Point3>) {
    let mut params = vec![Ft::zero(), Ft::one()];
    for t in v.triangles() {
        match intersect_segment_triangle_3d(seg, &t) {
            Intersection3::Point(p) => params.push(seg.param_of(&p)),
            Intersection3::Segment(s) => {
                params.push(seg.param_of(&s.source));
                params.push(seg.param_of(&s.target));
            }
            Intersection3::None | Intersection3::Polygon(_) => {}
        }
    }
    params.sort();
    params.dedup();

    let two = ft(2);
    let kept: Vec<(Ft, Ft)> = params
        .windows(2)
        .filter(|w| inside_or_on(v, &seg.point_at(&((&w[0] + &w[1]) / &two))))
        .map(|w| (w[0].clone(), w[1].clone()))
        .collect();
    let kept = join_intervals(kept);
    let touching = params
        .iter()
        .filter(|t| !kept.iter().any(|(lo, hi)| lo <= *t && *t <= hi))
        .map(|t| seg.point_at(t))
        .filter(|p| inside_or_on(v, p))
        .collect();
    (kept, touching)
}

fn add_segment_pieces(out: &mut GeometrySet<Dim3>, seg: &Segment3, v: &Polyhedron) {
    let (kept, touching) = clip_segment_by_volume(seg, v);
    for (lo, hi) in &kept {
        out.add_segment(Segment3::new(seg.point_at(lo), seg.point_at(hi)), 0);
    }
    for p in touching {
        out.add_point(p, 0);
    }
}

/// Cut segments traced on `t` by the triangles of `cutter`.
fn cuts_on(t: &Triangle3, cutter: &[Triangle3]) -> Vec<Segment3> {
    let mut cuts = Vec::new();
    let own = Bbox::from_points_3d(&t.vertices);
    for other in cutter {
        if !own.intersects(&Bbox::from_points_3d(&other.vertices)) {
            continue;
        }
        match intersect_triangles_3d(t, other) {
            Intersection3::Segment(s) => cuts.push(s),
            Intersection3::Polygon(ring) => {
                let n = ring.len();
                cuts.extend(
                    (0..n).map(|k| Segment3::new(ring[k].clone(), ring[(k + 1) % n].clone())),
                );
            }
            Intersection3::None | Intersection3::Point(_) => {}
        }
    }
    cuts
}

/// Triangle pieces inside or on the volume, each located from its centroid.
/// A triangle only touching the volume yields its contacts instead.
fn intersect_triangle_volume(t: &Triangle3, v: &Polyhedron, out: &mut GeometrySet<Dim3>) {
    let surface: Vec<Triangle3> = v.triangles().collect();
    let pieces = split_triangle(t, &cuts_on(t, &surface));
    let mut kept = 0usize;
    for piece in pieces {
        if inside_or_on(v, &piece.centroid()) {
            out.add_surface(piece, FLAG_IS_PLANAR);
            kept += 1;
        }
    }
    trace!(kept, "triangle against volume");
    if kept == 0 {
        for other in &surface {
            add_intersection(out, intersect_triangles_3d(t, other));
        }
    }
}

fn intersect_volumes(a: &Polyhedron, b: &Polyhedron, out: &mut GeometrySet<Dim3>) -> Result<()> {
    let common = corefine(a, b, CorefineOp::Intersection)?;
    if !common.is_empty() {
        for solid in common.solids() {
            out.add_volume(solid, 0);
        }
        return Ok(());
    }
    let ta: Vec<Triangle3> = a.triangles().collect();
    let tb: Vec<Triangle3> = b.triangles().collect();
    let _ = box_intersection(&triangle_boxes(&ta), &triangle_boxes(&tb), |&i, &j| {
        add_intersection(out, intersect_triangles_3d(&ta[i], &tb[j]));
        ControlFlow::Continue(())
    });
    Ok(())
}

fn removed_interval(seg: &Segment3, overlap: &Segment3) -> (Ft, Ft) {
    (seg.param_of(&overlap.source), seg.param_of(&overlap.target))
}

fn difference_segment(seg: &Segment3, subtrahends: &[Ref<'_>]) -> Vec<Segment3> {
    let mut removed = Vec::new();
    for b in subtrahends {
        let overlap = match b {
            PrimitiveRef::Segment(t) => intersect_segments_3d(seg, t),
            PrimitiveRef::Surface(t) => intersect_segment_triangle_3d(seg, t),
            PrimitiveRef::Volume(v) => {
                removed.extend(clip_segment_by_volume(seg, v).0);
                continue;
            }
            PrimitiveRef::Point(_) => continue,
        };
        if let Intersection3::Segment(s) = overlap {
            removed.push(removed_interval(seg, &s));
        }
    }
    if removed.is_empty() {
        return vec![seg.clone()];
    }
    join_intervals(subtract_intervals(removed))
        .iter()
        .map(|(lo, hi)| Segment3::new(seg.point_at(lo), seg.point_at(hi)))
        .collect()
}

/// Pieces of `t` outside the subtracted volumes and coplanar triangles, or
/// `None` when nothing is removed.
///
/// # Errors
///
/// Fails when a leftover region of a coplanar difference cannot be
/// triangulated exactly.
fn difference_triangle(t: &Triangle3, subtrahends: &[Ref<'_>]) -> Result<Option<Vec<Triangle3>>> {
    let Some(plane) = t.supporting_plane() else {
        return Ok(None);
    };
    let volumes: Vec<&Polyhedron> = subtrahends
        .iter()
        .filter_map(|b| match b {
            PrimitiveRef::Volume(v) => Some(*v),
            _ => None,
        })
        .collect();
    let coplanar: Vec<&Triangle3> = subtrahends
        .iter()
        .filter_map(|b| match b {
            PrimitiveRef::Surface(u) if u.vertices.iter().all(|p| plane.has_on(p)) => Some(*u),
            _ => None,
        })
        .filter(|u| !u.is_degenerate())
        .collect();
    if volumes.is_empty() && coplanar.is_empty() {
        return Ok(None);
    }

    let mut pieces = vec![t.clone()];
    for v in &volumes {
        let surface: Vec<Triangle3> = v.triangles().collect();
        pieces = pieces
            .iter()
            .flat_map(|piece| split_triangle(piece, &cuts_on(piece, &surface)))
            .filter(|piece| v.classify_point(&piece.centroid()) == PointClassification::Outside)
            .collect();
    }
    if coplanar.is_empty() || pieces.is_empty() {
        return Ok(Some(pieces));
    }

    let projection = ProjectionPlane::new(plane);
    let project = |u: &Triangle3| {
        PolygonWithHoles2::from_outer(u.vertices.iter().map(|p| projection.project(p)).collect())
    };
    let mut regions: Vec<PolygonWithHoles2> = pieces.iter().map(project).collect();
    for u in coplanar {
        regions = overlay(&regions, slice::from_ref(&project(u)), SetOperation::Difference);
        if regions.is_empty() {
            return Ok(Some(Vec::new()));
        }
    }
    let reference = t.normal();
    let mut out = Vec::new();
    for region in &regions {
        for tri in triangulate_polygon_2d(region)? {
            let [a, b, c] = &tri.vertices;
            let lifted = Triangle3::new(projection.lift(a), projection.lift(b), projection.lift(c));
            match sign(&lifted.normal().dot(&reference)) {
                Ordering::Greater => out.push(lifted),
                Ordering::Less => out.push(lifted.reversed()),
                Ordering::Equal => {}
            }
        }
    }
    Ok(Some(out))
}

fn difference_volume(v: &Polyhedron, subtrahends: &[Ref<'_>]) -> Result<Option<Vec<Polyhedron>>> {
    let mut current: Option<Polyhedron> = None;
    for b in subtrahends {
        if let PrimitiveRef::Volume(w) = b {
            let left = corefine(current.as_ref().unwrap_or(v), w, CorefineOp::Difference)?;
            let done = left.is_empty();
            current = Some(left);
            if done {
                break;
            }
        }
    }
    Ok(current.map(|c| if c.is_empty() { Vec::new() } else { c.solids() }))
}

impl PairwiseOps for Dim3 {
    fn intersects_ordered(a: Ref<'_>, b: Ref<'_>) -> bool {
        match (a, b) {
            (PrimitiveRef::Point(p), PrimitiveRef::Point(q)) => p == q,
            (PrimitiveRef::Segment(s), PrimitiveRef::Point(p)) => point_on_segment_3d(p, s),
            (PrimitiveRef::Segment(s), PrimitiveRef::Segment(t)) => {
                !intersect_segments_3d(s, t).is_none()
            }
            (PrimitiveRef::Surface(t), PrimitiveRef::Point(p)) => {
                classify_point_in_triangle_3d(p, t) != PointClassification::Outside
            }
            (PrimitiveRef::Surface(t), PrimitiveRef::Segment(s)) => {
                !intersect_segment_triangle_3d(s, t).is_none()
            }
            (PrimitiveRef::Surface(t), PrimitiveRef::Surface(u)) => triangles_intersect_3d(t, u),
            (PrimitiveRef::Volume(v), PrimitiveRef::Point(p)) => inside_or_on(v, p),
            (PrimitiveRef::Volume(v), PrimitiveRef::Segment(s)) => {
                v.triangles().any(|t| !intersect_segment_triangle_3d(s, &t).is_none())
                    || inside_or_on(v, &s.source)
            }
            (PrimitiveRef::Volume(v), PrimitiveRef::Surface(t)) => {
                v.triangles().any(|u| triangles_intersect_3d(t, &u))
                    || inside_or_on(v, &t.vertices[0])
            }
            (PrimitiveRef::Volume(v), PrimitiveRef::Volume(w)) => {
                let tv: Vec<Triangle3> = v.triangles().collect();
                let tw: Vec<Triangle3> = w.triangles().collect();
                surfaces_meet(&tv, &tw)
                    || w.vertices().first().is_some_and(|p| inside_or_on(v, p))
                    || v.vertices().first().is_some_and(|p| inside_or_on(w, p))
            }
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
                if point_on_segment_3d(p, s) {
                    out.add_point(p.clone(), 0);
                }
            }
            (PrimitiveRef::Segment(s), PrimitiveRef::Segment(t)) => {
                add_intersection(out, intersect_segments_3d(s, t));
            }
            (PrimitiveRef::Surface(t), PrimitiveRef::Point(p)) => {
                if classify_point_in_triangle_3d(p, t) != PointClassification::Outside {
                    out.add_point(p.clone(), 0);
                }
            }
            (PrimitiveRef::Surface(t), PrimitiveRef::Segment(s)) => {
                add_intersection(out, intersect_segment_triangle_3d(s, t));
            }
            (PrimitiveRef::Surface(t), PrimitiveRef::Surface(u)) => {
                add_intersection(out, intersect_triangles_3d(t, u));
            }
            (PrimitiveRef::Volume(v), PrimitiveRef::Point(p)) => {
                if inside_or_on(v, p) {
                    out.add_point(p.clone(), 0);
                }
            }
            (PrimitiveRef::Volume(v), PrimitiveRef::Segment(s)) => add_segment_pieces(out, s, v),
            (PrimitiveRef::Volume(v), PrimitiveRef::Surface(t)) => {
                intersect_triangle_volume(t, v, out);
            }
            (PrimitiveRef::Volume(v), PrimitiveRef::Volume(w)) => intersect_volumes(v, w, out)?,
            _ => return Self::intersection_ordered(b, a, out),
        }
        Ok(())
    }

    fn difference_primitive(
        a: Ref<'_>,
        flags: u32,
        subtrahends: &[Ref<'_>],
    ) -> Result<Vec<(PrimitiveValue<Self>, u32)>> {
        Ok(match a {
            PrimitiveRef::Point(p) => {
                if subtrahends.iter().any(|b| Self::intersects_ordered(*b, a)) {
                    Vec::new()
                } else {
                    vec![(PrimitiveValue::Point(p.clone()), flags)]
                }
            }
            PrimitiveRef::Segment(s) => difference_segment(s, subtrahends)
                .into_iter()
                .map(|piece| (PrimitiveValue::Segment(piece), flags))
                .collect(),
            PrimitiveRef::Surface(t) => match difference_triangle(t, subtrahends)? {
                Some(pieces) => pieces
                    .into_iter()
                    .map(|piece| (PrimitiveValue::Surface(piece), flags | FLAG_IS_PLANAR))
                    .collect(),
                None => vec![(PrimitiveValue::Surface(t.clone()), flags)],
            },
            PrimitiveRef::Volume(v) => match difference_volume(v, subtrahends)? {
                Some(parts) => parts
                    .into_iter()
                    .map(|part| (PrimitiveValue::Volume(part), flags))
                    .collect(),
                None => vec![(PrimitiveValue::Volume(v.clone()), flags)],
            },
        })
    }

    fn union_volumes(volumes: Vec<Polyhedron>, v: Polyhedron) -> Result<Vec<Polyhedron>> {
        let mut merged = v;
        let mut pending = volumes;
        loop {
            let before = pending.len();
            let mut apart = Vec::with_capacity(before);
            for w in pending {
                if merged.bbox().intersects(&w.bbox()) {
                    merged = corefine(&merged, &w, CorefineOp::Union)?;
                } else {
                    apart.push(w);
                }
            }
            pending = apart;
            if pending.len() == before || pending.is_empty() {
                break;
            }
        }
        pending.extend(merged.solids());
        Ok(pending)
    }

    fn post_union(set: GeometrySet<Self>) -> GeometrySet<Self> {
        set
    }
}
