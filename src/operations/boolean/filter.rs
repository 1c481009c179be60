use tracing::trace;

use crate::error::Result;
use crate::set::{GeometrySet, PrimitiveKind, PrimitiveRef, PrimitiveValue};
use crate::spatial::Bbox;

use super::pairwise::PairwiseOps;

/// Drops the primitives whose measure is covered, within `tolerance`, by
/// primitives of higher or equal kind kept before them. Primitives are
/// visited by decreasing kind, in set order otherwise; kept primitives are
/// never trimmed.
///
/// # Errors
///
/// Fails when two volumes cannot be corefined.
pub fn filter_covered<D: PairwiseOps>(
    set: &GeometrySet<D>,
    tolerance: f64,
) -> Result<GeometrySet<D>> {
    let mut elements: Vec<(PrimitiveRef<'_, D>, u32)> =
        set.elements().map(|(_, p, f)| (p, f)).collect();
    elements.sort_by(|(a, _), (b, _)| b.kind().cmp(&a.kind()));

    let mut kept: Vec<(PrimitiveRef<'_, D>, u32, Bbox)> = Vec::with_capacity(elements.len());
    for (p, flags) in elements {
        let own = p.bbox();
        let covering: Vec<PrimitiveRef<'_, D>> = kept
            .iter()
            .filter(|(k, _, bbox)| k.kind() >= p.kind() && bbox.intersects(&own))
            .map(|(k, _, _)| *k)
            .collect();
        if !covering.is_empty() {
            let left: f64 = D::difference_primitive(p, flags, &covering)?
                .iter()
                .filter_map(|(piece, _)| piece.as_ref())
                .filter(|r| r.kind() == p.kind())
                .map(|r| r.measure())
                .sum();
            if left <= tolerance {
                trace!(kind = ?p.kind(), "covered primitive dropped");
                continue;
            }
        }
        kept.push((p, flags, own));
    }

    let mut out = GeometrySet::new();
    for (p, flags, _) in kept {
        out.add_primitive(p.to_value(), flags);
    }
    Ok(out)
}

/// Removes the overlaps between the primitives of one result. Surfaces and
/// volumes are kept as they are; segments, then points, only keep what the
/// primitives kept so far leave uncovered.
///
/// # Errors
///
/// Fails when two volumes cannot be corefined.
pub fn filter_self_intersection<D: PairwiseOps>(set: &GeometrySet<D>) -> Result<GeometrySet<D>> {
    let mut kept: Vec<(PrimitiveValue<D>, u32, Bbox)> = set
        .elements()
        .filter(|(_, p, _)| p.kind() >= PrimitiveKind::Surface)
        .map(|(_, p, f)| (p.to_value(), f, p.bbox()))
        .collect();

    for kind in [PrimitiveKind::Segment, PrimitiveKind::Point] {
        for (_, p, flags) in set.elements().filter(|(_, p, _)| p.kind() == kind) {
            let own = p.bbox();
            let pieces = {
                let others: Vec<PrimitiveRef<'_, D>> = kept
                    .iter()
                    .filter(|(_, _, bbox)| bbox.intersects(&own))
                    .filter_map(|(value, _, _)| value.as_ref())
                    .collect();
                if others.is_empty() {
                    vec![(p.to_value(), flags)]
                } else {
                    D::difference_primitive(p, flags, &others)?
                }
            };
            for (piece, piece_flags) in pieces {
                let bbox = piece.as_ref().map_or(own, |r| r.bbox());
                kept.push((piece, piece_flags, bbox));
            }
        }
    }

    let mut out = GeometrySet::new();
    for (value, flags, _) in kept {
        out.add_primitive(value, flags);
    }
    Ok(out)
}

impl<D: PairwiseOps> GeometrySet<D> {
    /// See [`filter_covered`].
    ///
    /// # Errors
    ///
    /// Fails when two volumes cannot be corefined.
    pub fn filter_covered(&self, tolerance: f64) -> Result<Self> {
        filter_covered(self, tolerance)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::{Point2, PolygonWithHoles2, Segment2, COVERS_TOLERANCE};
    use crate::set::Dim2;

    fn p(x: i64, y: i64) -> Point2 {
        Point2::from_i64(x, y)
    }

    fn square(x: i64, y: i64, size: i64) -> PolygonWithHoles2 {
        PolygonWithHoles2::from_outer(vec![
            p(x, y),
            p(x + size, y),
            p(x + size, y + size),
            p(x, y + size),
        ])
    }

    #[test]
    fn covered_primitives_are_dropped() {
        let mut set = GeometrySet::<Dim2>::new();
        set.add_point(p(1, 1), 0);
        set.add_point(p(9, 9), 0);
        set.add_segment(Segment2::new(p(0, 0), p(2, 0)), 0);
        set.add_segment(Segment2::new(p(1, 1), p(6, 1)), 0);
        set.add_surface(square(0, 0, 4), 0);
        set.add_surface(square(1, 1, 2), 0);

        let filtered = set.filter_covered(COVERS_TOLERANCE).unwrap();
        assert_eq!(filtered.num_surfaces(), 1);
        assert_eq!(filtered.num_segments(), 1);
        assert_eq!(filtered.num_points(), 1);
        assert_relative_eq!(filtered.measure(), 16.0);
        let kept = filtered.segments().next().unwrap().primitive().clone();
        assert_eq!(kept, Segment2::new(p(1, 1), p(6, 1)));
    }

    #[test]
    fn partially_covered_surfaces_stay_whole() {
        let mut set = GeometrySet::<Dim2>::new();
        set.add_surface(square(0, 0, 2), 0);
        set.add_surface(square(1, 0, 2), 0);
        let filtered = filter_covered(&set, COVERS_TOLERANCE).unwrap();
        assert_eq!(filtered.num_surfaces(), 2);
    }

    #[test]
    fn self_intersection_trims_lower_kinds() {
        let mut set = GeometrySet::<Dim2>::new();
        set.add_surface(square(0, 0, 2), 0);
        set.add_segment(Segment2::new(p(1, 1), p(4, 1)), 0);
        set.add_segment(Segment2::new(p(3, 1), p(5, 1)), 0);
        set.add_point(p(5, 1), 0);
        set.add_point(p(7, 7), 0);

        let filtered = filter_self_intersection(&set).unwrap();
        assert_eq!(filtered.num_surfaces(), 1);
        assert_eq!(filtered.num_points(), 1);
        let total: f64 = filtered.segments().map(|e| e.primitive().length()).sum();
        assert_relative_eq!(total, 3.0);
    }
}
