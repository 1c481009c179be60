use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::ControlFlow;

use num_traits::Zero;
use tracing::trace;

use crate::error::Result;
use crate::math::number::sign;
use crate::math::polygon_2d::ring_signed_area;
use crate::math::predicates::point_on_segment_3d;
use crate::math::projection::ProjectionPlane;
use crate::math::{Point2, Point3, Segment3, Triangle3};
use crate::spatial::{box_intersection, Bbox};
use crate::tessellation::triangulate_rings_3d;

fn side(a: &Point2, b: &Point2, p: &Point2) -> crate::math::Ft {
    (b - a).cross(&(p - a))
}

/// Halves of a convex ring on either side of the line through `a` and `b`.
fn split_convex(ring: &[Point2], a: &Point2, b: &Point2) -> (Vec<Point2>, Vec<Point2>) {
    let n = ring.len();
    let sides: Vec<_> = ring.iter().map(|p| side(a, b, p)).collect();
    let (mut left, mut right) = (Vec::new(), Vec::new());
    for i in 0..n {
        let j = (i + 1) % n;
        let (p, q) = (&ring[i], &ring[j]);
        let (sp, sq) = (sign(&sides[i]), sign(&sides[j]));
        if sp != Ordering::Less {
            left.push(p.clone());
        }
        if sp != Ordering::Greater {
            right.push(p.clone());
        }
        let crosses = matches!(
            (sp, sq),
            (Ordering::Greater, Ordering::Less) | (Ordering::Less, Ordering::Greater)
        );
        if crosses {
            let t = &sides[i] / (&sides[i] - &sides[j]);
            let x = p + &(q - p).scale(&t);
            left.push(x.clone());
            right.push(x);
        }
    }
    (left, right)
}

fn is_proper(ring: &[Point2]) -> bool {
    ring.len() >= 3 && !ring_signed_area(ring).is_zero()
}

/// Splits a triangle by the full lines through the cut segments, which
/// must lie in the triangle plane. Pieces are convex, fanned into
/// triangles and oriented like `t`.
#[must_use]
pub fn split_triangle(t: &Triangle3, cuts: &[Segment3]) -> Vec<Triangle3> {
    let Some(plane) = t.supporting_plane() else {
        return vec![t.clone()];
    };
    if cuts.is_empty() {
        return vec![t.clone()];
    }
    let projection = ProjectionPlane::new(plane);
    let mut pieces: Vec<Vec<Point2>> =
        vec![t.vertices.iter().map(|p| projection.project(p)).collect()];
    for cut in cuts {
        let a = projection.project(&cut.source);
        let b = projection.project(&cut.target);
        if a == b {
            continue;
        }
        let mut next = Vec::with_capacity(pieces.len() + 1);
        for piece in pieces {
            let (left, right) = split_convex(&piece, &a, &b);
            if is_proper(&left) && is_proper(&right) {
                next.push(left);
                next.push(right);
            } else {
                next.push(piece);
            }
        }
        pieces = next;
    }

    let reference = t.normal();
    let mut out = Vec::new();
    for piece in &pieces {
        let lifted: Vec<Point3> = piece.iter().map(|p| projection.lift(p)).collect();
        for k in 1..lifted.len().saturating_sub(1) {
            let tri = Triangle3::new(lifted[0].clone(), lifted[k].clone(), lifted[k + 1].clone());
            match sign(&tri.normal().dot(&reference)) {
                Ordering::Greater => out.push(tri),
                Ordering::Less => out.push(tri.reversed()),
                Ordering::Equal => {}
            }
        }
    }
    trace!(cuts = cuts.len(), pieces = out.len(), "split triangle");
    out
}

/// Re-triangulates triangles having other mesh vertices inside their edges,
/// so that neighbouring faces share full edges.
///
/// # Errors
///
/// Propagates triangulation failures.
pub fn conform_t_junctions(triangles: Vec<Triangle3>) -> Result<Vec<Triangle3>> {
    let vertices: BTreeSet<&Point3> = triangles.iter().flat_map(|t| t.vertices.iter()).collect();
    let vertices: Vec<&Point3> = vertices.into_iter().collect();
    let triangle_boxes: Vec<(Bbox, usize)> = triangles
        .iter()
        .enumerate()
        .map(|(i, t)| (Bbox::from_points_3d(&t.vertices), i))
        .collect();
    let point_boxes: Vec<(Bbox, usize)> = vertices
        .iter()
        .enumerate()
        .map(|(i, p)| (Bbox::from_points_3d([*p]), i))
        .collect();

    let mut on_edges: Vec<Vec<usize>> = vec![Vec::new(); triangles.len()];
    let _ = box_intersection(&triangle_boxes, &point_boxes, |&t, &v| {
        let p = vertices[v];
        let tri = &triangles[t];
        if !tri.vertices.contains(p) && tri.edges().iter().any(|e| point_on_segment_3d(p, e)) {
            on_edges[t].push(v);
        }
        ControlFlow::Continue(())
    });

    let mut out = Vec::with_capacity(triangles.len());
    let mut conformed = 0usize;
    for (t, extra) in triangles.iter().zip(&on_edges) {
        if extra.is_empty() {
            out.push(t.clone());
            continue;
        }
        conformed += 1;
        let mut ring = Vec::with_capacity(3 + extra.len());
        for edge in t.edges() {
            ring.push(edge.source.clone());
            let mut inner: Vec<&Point3> = extra
                .iter()
                .map(|&v| vertices[v])
                .filter(|p| point_on_segment_3d(p, &edge))
                .collect();
            inner.sort_by(|p, q| edge.param_of(p).cmp(&edge.param_of(q)));
            ring.extend(inner.into_iter().cloned());
        }
        out.extend(triangulate_rings_3d(&[ring])?);
    }
    trace!(conformed, "conformed t-junctions");
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::polyhedron::tests::p;

    fn area(triangles: &[Triangle3]) -> f64 {
        triangles.iter().map(Triangle3::area).sum()
    }

    #[test]
    fn splitting_preserves_area_and_orientation() {
        let t = Triangle3::new(p(0, 0, 0), p(4, 0, 0), p(0, 4, 0));
        let cuts = [
            Segment3::new(p(1, -1, 0), p(1, 5, 0)),
            Segment3::new(p(-1, 1, 0), p(5, 1, 0)),
        ];
        let pieces = split_triangle(&t, &cuts);
        assert!(pieces.len() >= 4);
        assert!((area(&pieces) - 8.0).abs() < 1e-9);
        assert!(pieces.iter().all(|q| q.normal().dot(&t.normal()) > crate::math::ft(0)));
    }

    #[test]
    fn cuts_missing_the_triangle_are_ignored() {
        let t = Triangle3::new(p(0, 0, 0), p(4, 0, 0), p(0, 4, 0));
        let pieces = split_triangle(&t, &[Segment3::new(p(-1, 0, 0), p(-1, 4, 0))]);
        assert_eq!(pieces, vec![t]);
    }

    #[test]
    fn t_junctions_are_removed() {
        // A large triangle whose edge carries the corner of two small ones.
        let big = Triangle3::new(p(0, 0, 0), p(4, 0, 0), p(0, 4, 0));
        let left = Triangle3::new(p(0, 0, 0), p(2, -2, 0), p(2, 0, 0));
        let right = Triangle3::new(p(2, 0, 0), p(2, -2, 0), p(4, 0, 0));
        let out = conform_t_junctions(vec![big, left, right]).unwrap();
        assert_eq!(out.len(), 4);
        assert!((area(&out) - 12.0).abs() < 1e-9);
        let with_midpoint = out
            .iter()
            .filter(|t| t.vertices.contains(&p(2, 0, 0)))
            .count();
        assert_eq!(with_midpoint, 4);
    }
}
