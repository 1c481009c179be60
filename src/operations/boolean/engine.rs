use std::ops::ControlFlow;

use tracing::{debug, trace};

use crate::error::Result;
use crate::set::{GeometrySet, PrimitiveKind, PrimitiveRef, PrimitiveValue};
use crate::spatial::{box_intersection, cluster_boxes, Bbox};

use super::filter::{filter_covered, filter_self_intersection};
use super::pairwise::{intersection_primitives, intersects_primitives, PairwiseOps};

/// Pairs of primitives, one from each set, whose boxes overlap.
fn candidate_pairs<'a, D: PairwiseOps>(
    a: &'a GeometrySet<D>,
    b: &'a GeometrySet<D>,
) -> Vec<(PrimitiveRef<'a, D>, PrimitiveRef<'a, D>)> {
    let boxes_a = a.compute_bounding_boxes();
    let boxes_b = b.compute_bounding_boxes();
    let mut pairs = Vec::new();
    let _ = box_intersection(&boxes_a, &boxes_b, |pa, pb| {
        pairs.push((*pa, *pb));
        ControlFlow::Continue(())
    });
    debug!(
        first = boxes_a.len(),
        second = boxes_b.len(),
        candidates = pairs.len(),
        "box intersection"
    );
    pairs
}

/// Whether any primitive of `a` meets a primitive of `b`. Stops at the
/// first intersecting pair.
#[must_use]
pub fn intersects_sets<D: PairwiseOps>(a: &GeometrySet<D>, b: &GeometrySet<D>) -> bool {
    let boxes_a = a.compute_bounding_boxes();
    let boxes_b = b.compute_bounding_boxes();
    box_intersection(&boxes_a, &boxes_b, |pa, pb| {
        trace!(first = ?pa.kind(), second = ?pb.kind(), "intersects candidate");
        if intersects_primitives(*pa, *pb) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .is_break()
}

/// # Errors
///
/// Fails when two volumes cannot be corefined.
pub fn intersection_sets<D: PairwiseOps>(
    a: &GeometrySet<D>,
    b: &GeometrySet<D>,
) -> Result<GeometrySet<D>> {
    let mut out = GeometrySet::new();
    for (pa, pb) in candidate_pairs(a, b) {
        trace!(first = ?pa.kind(), second = ?pb.kind(), "intersection candidate");
        intersection_primitives(pa, pb, &mut out)?;
    }
    filter_self_intersection(&out)
}

/// Every primitive of `a` minus the primitives of `b` whose boxes overlap
/// it.
///
/// # Errors
///
/// Fails when two volumes cannot be corefined.
pub fn difference_sets<D: PairwiseOps>(
    a: &GeometrySet<D>,
    b: &GeometrySet<D>,
) -> Result<GeometrySet<D>> {
    let elements: Vec<(PrimitiveRef<'_, D>, u32)> = a.elements().map(|(_, p, f)| (p, f)).collect();
    let boxes_a: Vec<(Bbox, usize)> = elements.iter().map(|(p, _)| p.bbox()).zip(0..).collect();
    let boxes_b = b.compute_bounding_boxes();

    let mut subtrahends: Vec<Vec<PrimitiveRef<'_, D>>> = vec![Vec::new(); elements.len()];
    let _ = box_intersection(&boxes_a, &boxes_b, |&i, pb| {
        subtrahends[i].push(*pb);
        ControlFlow::Continue(())
    });
    debug!(primitives = elements.len(), subtrahends = boxes_b.len(), "difference");

    let mut out = GeometrySet::new();
    for ((p, flags), removed) in elements.into_iter().zip(&subtrahends) {
        if removed.is_empty() {
            out.add_primitive(p.to_value(), flags);
            continue;
        }
        for (piece, piece_flags) in D::difference_primitive(p, flags, removed)? {
            out.add_primitive(piece, piece_flags);
        }
    }
    filter_self_intersection(&out)
}

/// Union of both sets, cluster by cluster.
///
/// Primitives are grouped into clusters of transitively overlapping boxes.
/// Inside a cluster the seed is the primitive of highest kind (first one on
/// ties); the others follow by decreasing kind, then by distance from their
/// box centre to the seed's. Volumes are merged with
/// [`PairwiseOps::union_volumes`]; any other primitive only contributes
/// what the primitives already added do not cover.
///
/// # Errors
///
/// Fails when two volumes cannot be corefined.
pub fn union_sets<D: PairwiseOps>(
    a: &GeometrySet<D>,
    b: &GeometrySet<D>,
) -> Result<GeometrySet<D>> {
    let primitives: Vec<(PrimitiveRef<'_, D>, u32)> = a
        .elements()
        .chain(b.elements())
        .map(|(_, p, f)| (p, f))
        .collect();
    let boxes: Vec<Bbox> = primitives.iter().map(|(p, _)| p.bbox()).collect();
    let clusters = cluster_boxes(&boxes);
    debug!(primitives = primitives.len(), clusters = clusters.len(), "union");

    let mut out = GeometrySet::new();
    for cluster in &clusters {
        union_cluster(&primitives, &boxes, cluster, &mut out)?;
    }
    Ok(D::post_union(out))
}

fn squared_distance(a: &nalgebra::Point3<f64>, b: &nalgebra::Point3<f64>) -> f64 {
    (a - b).norm_squared()
}

fn union_cluster<D: PairwiseOps>(
    primitives: &[(PrimitiveRef<'_, D>, u32)],
    boxes: &[Bbox],
    cluster: &[usize],
    out: &mut GeometrySet<D>,
) -> Result<()> {
    let kind = |i: usize| primitives[i].0.kind();
    let Some(&seed) = cluster
        .iter()
        .max_by(|&&i, &&j| kind(i).cmp(&kind(j)).then(j.cmp(&i)))
    else {
        return Ok(());
    };
    let centre = boxes[seed].center();
    let distance = |i: usize| squared_distance(&boxes[i].center(), &centre);
    let mut order: Vec<usize> = cluster.iter().copied().filter(|&i| i != seed).collect();
    order.sort_by(|&i, &j| {
        kind(j)
            .cmp(&kind(i))
            .then(distance(i).total_cmp(&distance(j)))
            .then(i.cmp(&j))
    });
    trace!(seed, size = cluster.len(), "union cluster");

    let mut volumes: Vec<D::Volume> = Vec::new();
    let mut kept: Vec<(PrimitiveValue<D>, u32, Bbox)> = Vec::new();
    for i in std::iter::once(seed).chain(order) {
        let (p, flags) = primitives[i];
        if let PrimitiveRef::Volume(v) = p {
            volumes = D::union_volumes(volumes, v.clone())?;
            continue;
        }
        let own = boxes[i];
        let covering: Vec<PrimitiveRef<'_, D>> = volumes
            .iter()
            .map(PrimitiveRef::Volume)
            .chain(
                kept.iter()
                    .filter(|(_, _, bbox)| bbox.intersects(&own))
                    .filter_map(|(value, _, _)| value.as_ref()),
            )
            .filter(|r| r.kind() >= p.kind())
            .collect();
        let pieces = if covering.is_empty() {
            vec![(p.to_value(), flags)]
        } else {
            D::difference_primitive(p, flags, &covering)?
        };
        for (piece, piece_flags) in pieces {
            let bbox = piece.as_ref().map_or(own, |r| r.bbox());
            kept.push((piece, piece_flags, bbox));
        }
    }

    for v in volumes {
        out.add_volume(v, 0);
    }
    for (piece, flags, _) in kept {
        out.add_primitive(piece, flags);
    }
    Ok(())
}

/// Total measure of the primitives of `kind`.
#[must_use]
pub fn measure_of_kind<D: PairwiseOps>(set: &GeometrySet<D>, kind: PrimitiveKind) -> f64 {
    set.elements()
        .filter(|(_, p, _)| p.kind() == kind)
        .map(|(_, p, _)| p.measure())
        .sum()
}

/// Whether `a` covers `b`: the part of `b` inside `a` measures as much as
/// `b`, within `tolerance`.
///
/// # Errors
///
/// Fails when two volumes cannot be corefined.
pub fn covers_sets<D: PairwiseOps>(
    a: &GeometrySet<D>,
    b: &GeometrySet<D>,
    tolerance: f64,
) -> Result<bool> {
    let Some(kind) = b.dimension() else {
        return Ok(false);
    };
    if a.dimension().map_or(true, |k| k < kind) {
        return Ok(false);
    }
    let common = filter_covered(&intersection_sets(a, b)?, tolerance)?;
    let covered = measure_of_kind(&common, kind);
    let total = measure_of_kind(&filter_covered(b, tolerance)?, kind);
    debug!(?kind, covered, total, "covers");
    Ok((covered - total).abs() <= tolerance)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::{Point2, PolygonWithHoles2, Segment2, COVERS_TOLERANCE};
    use crate::polyhedron::tests::cube;
    use crate::set::{Dim2, Dim3};

    fn square(x: i64, y: i64, size: i64) -> PolygonWithHoles2 {
        PolygonWithHoles2::from_outer(vec![
            Point2::from_i64(x, y),
            Point2::from_i64(x + size, y),
            Point2::from_i64(x + size, y + size),
            Point2::from_i64(x, y + size),
        ])
    }

    fn seg(a: (i64, i64), b: (i64, i64)) -> Segment2 {
        Segment2::new(Point2::from_i64(a.0, a.1), Point2::from_i64(b.0, b.1))
    }

    fn set_of(surfaces: &[PolygonWithHoles2]) -> GeometrySet<Dim2> {
        let mut set = GeometrySet::new();
        for s in surfaces {
            set.add_surface(s.clone(), 0);
        }
        set
    }

    #[test]
    fn disjoint_sets_do_not_intersect() {
        let a = set_of(&[square(0, 0, 1)]);
        let b = set_of(&[square(3, 0, 1)]);
        assert!(!intersects_sets(&a, &b));
        assert!(intersection_sets(&a, &b).unwrap().is_empty());
        let union = union_sets(&a, &b).unwrap();
        assert_eq!(union.num_surfaces(), 2);
    }

    #[test]
    fn overlapping_squares_union() {
        let a = set_of(&[square(0, 0, 2)]);
        let b = set_of(&[square(1, 1, 2)]);
        assert!(intersects_sets(&a, &b));
        assert_relative_eq!(intersection_sets(&a, &b).unwrap().measure(), 1.0);
        assert_relative_eq!(difference_sets(&a, &b).unwrap().measure(), 3.0);

        let union = union_sets(&a, &b).unwrap();
        assert_eq!(union.num_surfaces(), 1);
        assert_relative_eq!(union.measure(), 7.0);
    }

    #[test]
    fn union_drops_what_higher_kinds_cover() {
        let mut a = set_of(&[square(0, 0, 4)]);
        a.add_segment(seg((1, 1), (6, 1)), 0);
        a.add_point(Point2::from_i64(2, 2), 0);
        let b = set_of(&[square(2, 0, 4)]);
        let union = union_sets(&a, &b).unwrap();
        assert_eq!(union.num_points(), 0);
        assert_eq!(union.num_segments(), 0);
        assert_relative_eq!(union.measure(), 24.0);
    }

    #[test]
    fn covers_needs_the_whole_measure() {
        let big = set_of(&[square(0, 0, 4)]);
        let small = set_of(&[square(1, 1, 2)]);
        let shifted = set_of(&[square(3, 3, 2)]);
        assert!(covers_sets(&big, &small, COVERS_TOLERANCE).unwrap());
        assert!(!covers_sets(&small, &big, COVERS_TOLERANCE).unwrap());
        assert!(!covers_sets(&big, &shifted, COVERS_TOLERANCE).unwrap());
        assert!(covers_sets(&big, &big, COVERS_TOLERANCE).unwrap());
        assert!(!covers_sets(&big, &GeometrySet::new(), COVERS_TOLERANCE).unwrap());
    }

    #[test]
    fn lower_kind_does_not_cover_higher_kind() {
        let mut line = GeometrySet::<Dim2>::new();
        line.add_segment(seg((0, 0), (4, 0)), 0);
        let surface = set_of(&[square(0, 0, 4)]);
        assert!(!covers_sets(&line, &surface, COVERS_TOLERANCE).unwrap());
        assert!(covers_sets(&surface, &line, COVERS_TOLERANCE).unwrap());
    }

    #[test]
    fn volumes_in_one_cluster_are_merged() {
        let mut a = GeometrySet::<Dim3>::new();
        a.add_volume(cube((0, 0, 0), 2), 0);
        let mut b = GeometrySet::<Dim3>::new();
        b.add_volume(cube((1, 1, 1), 2), 0);
        b.add_volume(cube((10, 0, 0), 1), 0);

        let union = union_sets(&a, &b).unwrap();
        assert_eq!(union.num_volumes(), 2);
        assert_relative_eq!(union.measure(), 16.0, epsilon = 1e-9);
        assert_relative_eq!(intersection_sets(&a, &b).unwrap().measure(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(difference_sets(&a, &b).unwrap().measure(), 7.0, epsilon = 1e-9);
    }
}
