use std::cmp::Ordering;
use std::ops::ControlFlow;

use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::math::intersect_3d::{intersect_triangles_3d, Intersection3};
use crate::math::number::sign;
use crate::math::predicates::{classify_point_in_triangle_3d, PointClassification};
use crate::math::{Segment3, Triangle3};
use crate::spatial::{box_intersection, Bbox};

use super::classify::classify_point_in_triangles;
use super::split::{conform_t_junctions, split_triangle};
use super::Polyhedron;

/// Boolean operation evaluated by [`corefine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorefineOp {
    Union,
    Intersection,
    /// First operand minus the second.
    Difference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    A,
    B,
}

/// Location of a face piece against the other operand. Pieces on the other
/// surface are split by whether their normal agrees with the face they lie on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Inside,
    Outside,
    OnSame,
    OnOpposite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeepDecision {
    Keep,
    KeepFlipped,
    Discard,
}

/// | piece  | location    | union   | intersection | difference |
/// |--------|-------------|---------|--------------|------------|
/// | from A | outside B   | keep    | discard      | keep       |
/// | from A | inside B    | discard | keep         | discard    |
/// | from A | on, same    | keep    | keep         | discard    |
/// | from A | on, opposite| discard | discard      | keep       |
/// | from B | outside A   | keep    | discard      | discard    |
/// | from B | inside A    | discard | keep         | keep (flip)|
/// | from B | on A        | discard | discard      | discard    |
#[allow(clippy::match_same_arms)]
fn should_keep(source: Source, location: Location, op: CorefineOp) -> KeepDecision {
    match (source, location, op) {
        (Source::A, Location::Outside, CorefineOp::Union | CorefineOp::Difference) => {
            KeepDecision::Keep
        }
        (Source::A, Location::Outside, CorefineOp::Intersection) => KeepDecision::Discard,

        (Source::A, Location::Inside, CorefineOp::Intersection) => KeepDecision::Keep,
        (Source::A, Location::Inside, _) => KeepDecision::Discard,

        (Source::A, Location::OnSame, CorefineOp::Union | CorefineOp::Intersection) => {
            KeepDecision::Keep
        }
        (Source::A, Location::OnSame, CorefineOp::Difference) => KeepDecision::Discard,

        (Source::A, Location::OnOpposite, CorefineOp::Difference) => KeepDecision::Keep,
        (Source::A, Location::OnOpposite, _) => KeepDecision::Discard,

        (Source::B, Location::Outside, CorefineOp::Union) => KeepDecision::Keep,
        (Source::B, Location::Outside, _) => KeepDecision::Discard,

        (Source::B, Location::Inside, CorefineOp::Intersection) => KeepDecision::Keep,
        (Source::B, Location::Inside, CorefineOp::Difference) => KeepDecision::KeepFlipped,
        (Source::B, Location::Inside, CorefineOp::Union) => KeepDecision::Discard,

        (Source::B, Location::OnSame | Location::OnOpposite, _) => KeepDecision::Discard,
    }
}

fn triangle_boxes(triangles: &[Triangle3]) -> Vec<(Bbox, usize)> {
    triangles
        .iter()
        .enumerate()
        .map(|(i, t)| (Bbox::from_points_3d(&t.vertices), i))
        .collect()
}

/// Splits every triangle of `target` along its intersection with `cutter`.
fn split_by(target: &[Triangle3], cutter: &[Triangle3]) -> Vec<Triangle3> {
    let mut cuts: Vec<Vec<Segment3>> = vec![Vec::new(); target.len()];
    let _ = box_intersection(&triangle_boxes(target), &triangle_boxes(cutter), |&i, &j| {
        match intersect_triangles_3d(&target[i], &cutter[j]) {
            Intersection3::Segment(s) => cuts[i].push(s),
            Intersection3::Polygon(ring) => {
                let n = ring.len();
                for k in 0..n {
                    cuts[i].push(Segment3::new(ring[k].clone(), ring[(k + 1) % n].clone()));
                }
            }
            Intersection3::None | Intersection3::Point(_) => {}
        }
        ControlFlow::Continue(())
    });
    target
        .iter()
        .zip(&cuts)
        .flat_map(|(t, c)| split_triangle(t, c))
        .collect()
}

fn locate(piece: &Triangle3, other: &[Triangle3]) -> Location {
    let c = piece.centroid();
    match classify_point_in_triangles(other, &c) {
        PointClassification::Inside => Location::Inside,
        PointClassification::Outside => Location::Outside,
        PointClassification::OnBoundary => {
            let normal = piece.normal();
            let agrees = other
                .iter()
                .filter(|t| !t.is_degenerate())
                .find(|t| classify_point_in_triangle_3d(&c, t) != PointClassification::Outside)
                .is_some_and(|t| sign(&t.normal().dot(&normal)) == Ordering::Greater);
            if agrees {
                Location::OnSame
            } else {
                Location::OnOpposite
            }
        }
    }
}

fn on_surface(triangles: &[Triangle3], p: &crate::math::Point3) -> bool {
    triangles
        .iter()
        .any(|t| classify_point_in_triangle_3d(p, t) != PointClassification::Outside)
}

/// Boolean operation on two closed triangle meshes by corefinement.
///
/// Faces of each operand are split along the surface of the other, each
/// piece is located against the other operand from its centroid, and the
/// pieces selected by the operation are stitched into the result. Edges of
/// the result lying on both input surfaces are marked.
///
/// # Errors
///
/// Returns [`GeometryError::Invalid`] when an operand is not closed, and
/// [`GeometryError::OrientationConflict`] if the selected pieces cannot be
/// oriented consistently.
pub fn corefine(a: &Polyhedron, b: &Polyhedron, op: CorefineOp) -> Result<Polyhedron> {
    for (name, operand) in [("first", a), ("second", b)] {
        if !operand.is_closed() {
            return Err(GeometryError::Invalid(format!(
                "corefinement needs closed polyhedra, the {name} operand is open"
            ))
            .into());
        }
    }
    let triangles_a: Vec<Triangle3> = a.triangles().collect();
    let triangles_b: Vec<Triangle3> = b.triangles().collect();

    let pieces_a = split_by(&triangles_a, &triangles_b);
    let pieces_b = split_by(&triangles_b, &triangles_a);
    debug!(
        ?op,
        pieces_a = pieces_a.len(),
        pieces_b = pieces_b.len(),
        "corefined polyhedra"
    );

    let mut kept = Vec::new();
    for (source, pieces, other) in [
        (Source::A, &pieces_a, &triangles_b),
        (Source::B, &pieces_b, &triangles_a),
    ] {
        for piece in pieces {
            match should_keep(source, locate(piece, other), op) {
                KeepDecision::Keep => kept.push(piece.clone()),
                KeepDecision::KeepFlipped => kept.push(piece.reversed()),
                KeepDecision::Discard => {}
            }
        }
    }
    if kept.is_empty() {
        return Ok(Polyhedron::new());
    }

    let kept = conform_t_junctions(kept)?;
    let mut result = Polyhedron::from_triangle_soup(&kept)?;
    let curve_edges: Vec<_> = result
        .faces()
        .iter()
        .flat_map(|f| (0..3).map(move |k| (f[k], f[(k + 1) % 3])))
        .filter(|(i, j)| i < j)
        .map(|(i, j)| (result.vertices()[i].clone(), result.vertices()[j].clone()))
        .filter(|(p, q)| {
            let mid = p.midpoint(q);
            on_surface(&triangles_a, &mid) && on_surface(&triangles_b, &mid)
        })
        .collect();
    for (p, q) in &curve_edges {
        result.mark_edge(p, q);
    }
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SfgeomError;
    use crate::math::ft;
    use crate::polyhedron::tests::{cube, p};

    #[test]
    fn overlapping_cubes() {
        let a = cube((0, 0, 0), 2);
        let b = cube((1, 1, 1), 2);

        let inter = corefine(&a, &b, CorefineOp::Intersection).unwrap();
        assert!(inter.is_closed());
        assert_eq!(inter.volume(), ft(1));

        let union = corefine(&a, &b, CorefineOp::Union).unwrap();
        assert!(union.is_closed());
        assert_eq!(union.volume(), ft(15));

        let diff = corefine(&a, &b, CorefineOp::Difference).unwrap();
        assert!(diff.is_closed());
        assert_eq!(diff.volume(), ft(7));
        assert!(diff.marked_edges().count() > 0);
    }

    #[test]
    fn disjoint_cubes() {
        let a = cube((0, 0, 0), 1);
        let b = cube((5, 0, 0), 1);
        assert!(corefine(&a, &b, CorefineOp::Intersection).unwrap().is_empty());
        assert_eq!(corefine(&a, &b, CorefineOp::Difference).unwrap().volume(), ft(1));
        let union = corefine(&a, &b, CorefineOp::Union).unwrap();
        assert_eq!(union.components().len(), 2);
    }

    #[test]
    fn nested_cube_leaves_a_cavity() {
        let outer = cube((0, 0, 0), 4);
        let inner = cube((1, 1, 1), 2);
        let diff = corefine(&outer, &inner, CorefineOp::Difference).unwrap();
        assert_eq!(diff.volume(), ft(56));
        assert_eq!(diff.components().len(), 2);
        assert_eq!(diff.classify_point(&p(2, 2, 2)), PointClassification::Outside);
    }

    #[test]
    fn open_operands_are_rejected() {
        let open =
            Polyhedron::from_triangles(&[Triangle3::new(p(0, 0, 0), p(1, 0, 0), p(0, 1, 0))])
                .unwrap();
        assert!(matches!(
            corefine(&open, &cube((0, 0, 0), 1), CorefineOp::Union),
            Err(SfgeomError::Geometry(GeometryError::Invalid(_)))
        ));
    }
}
