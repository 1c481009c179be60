use std::cmp::Ordering;

use num_traits::{One, Zero};

use crate::error::Result;
use crate::math::number::sign;
use crate::math::Ft;
use crate::set::{Dimension, GeometrySet, PrimitiveRef, PrimitiveValue};

/// Primitive algorithms of one dimension.
///
/// The `*_ordered` methods receive the primitive of higher or equal kind
/// first; [`intersects_primitives`] and [`intersection_primitives`] restore
/// that order for arbitrary pairs.
pub trait PairwiseOps: Dimension {
    fn intersects_ordered(a: PrimitiveRef<'_, Self>, b: PrimitiveRef<'_, Self>) -> bool;

    /// Adds `a ∩ b` to `out`.
    ///
    /// # Errors
    ///
    /// Fails when a volume operand cannot be corefined.
    fn intersection_ordered(
        a: PrimitiveRef<'_, Self>,
        b: PrimitiveRef<'_, Self>,
        out: &mut GeometrySet<Self>,
    ) -> Result<()>;

    /// Parts of `a` outside every subtrahend, with their flags. Subtrahends
    /// of lower kind than `a` do not remove anything.
    ///
    /// # Errors
    ///
    /// Fails when a volume operand cannot be corefined.
    fn difference_primitive(
        a: PrimitiveRef<'_, Self>,
        flags: u32,
        subtrahends: &[PrimitiveRef<'_, Self>],
    ) -> Result<Vec<(PrimitiveValue<Self>, u32)>>;

    /// Adds `v` to pairwise disjoint volumes, merging every volume it meets.
    ///
    /// # Errors
    ///
    /// Fails when volumes cannot be corefined.
    fn union_volumes(volumes: Vec<Self::Volume>, v: Self::Volume) -> Result<Vec<Self::Volume>>;

    /// Normalises a union result.
    fn post_union(set: GeometrySet<Self>) -> GeometrySet<Self>;
}

#[must_use]
pub fn intersects_primitives<D: PairwiseOps>(
    a: PrimitiveRef<'_, D>,
    b: PrimitiveRef<'_, D>,
) -> bool {
    if a.kind() < b.kind() {
        D::intersects_ordered(b, a)
    } else {
        D::intersects_ordered(a, b)
    }
}

/// # Errors
///
/// See [`PairwiseOps::intersection_ordered`].
pub fn intersection_primitives<D: PairwiseOps>(
    a: PrimitiveRef<'_, D>,
    b: PrimitiveRef<'_, D>,
    out: &mut GeometrySet<D>,
) -> Result<()> {
    if a.kind() < b.kind() {
        D::intersection_ordered(b, a, out)
    } else {
        D::intersection_ordered(a, b, out)
    }
}

/// Sub-intervals of `[0, 1]` left after removing the closed `removed`
/// intervals. Empty and single-point leftovers are dropped.
pub(crate) fn subtract_intervals(mut removed: Vec<(Ft, Ft)>) -> Vec<(Ft, Ft)> {
    for (lo, hi) in &mut removed {
        if lo > hi {
            std::mem::swap(lo, hi);
        }
    }
    removed.sort();
    let mut kept = Vec::new();
    let mut cursor = Ft::zero();
    let one = Ft::one();
    for (lo, hi) in removed {
        if lo > cursor {
            kept.push((cursor.clone(), lo.min(one.clone())));
        }
        if hi > cursor {
            cursor = hi;
        }
        if cursor >= one {
            break;
        }
    }
    if cursor < one {
        kept.push((cursor, one));
    }
    kept.retain(|(lo, hi)| sign(&(hi - lo)) == Ordering::Greater);
    kept
}

/// Joins consecutive parameter intervals sharing an end.
pub(crate) fn join_intervals(intervals: Vec<(Ft, Ft)>) -> Vec<(Ft, Ft)> {
    let mut joined: Vec<(Ft, Ft)> = Vec::with_capacity(intervals.len());
    for (lo, hi) in intervals {
        match joined.last_mut() {
            Some(last) if last.1 == lo => last.1 = hi,
            _ => joined.push((lo, hi)),
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ft;
    use num_rational::BigRational;

    fn q(n: i64, d: i64) -> Ft {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn removing_nothing_keeps_everything() {
        assert_eq!(subtract_intervals(vec![]), vec![(ft(0), ft(1))]);
    }

    #[test]
    fn overlapping_removals_merge() {
        let kept =
            subtract_intervals(vec![(q(1, 2), q(3, 4)), (q(-1, 1), q(1, 4)), (q(5, 8), q(7, 10))]);
        assert_eq!(kept, vec![(q(1, 4), q(1, 2)), (q(3, 4), ft(1))]);
    }

    #[test]
    fn reversed_and_covering_removals() {
        assert_eq!(subtract_intervals(vec![(q(1, 1), q(-1, 1))]), vec![]);
        assert_eq!(
            subtract_intervals(vec![(q(1, 2), q(1, 2))]),
            vec![(ft(0), q(1, 2)), (q(1, 2), ft(1))]
        );
    }

    #[test]
    fn adjacent_intervals_are_joined() {
        let joined = join_intervals(vec![(ft(0), q(1, 3)), (q(1, 3), q(1, 2)), (q(3, 4), ft(1))]);
        assert_eq!(joined, vec![(ft(0), q(1, 2)), (q(3, 4), ft(1))]);
    }
}
