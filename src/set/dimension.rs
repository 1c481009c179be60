use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::spatial::Bbox;

use super::GeometrySet;

/// Primitive type table of a dimension.
///
/// [`super::dim2`] and [`super::dim3`] implement it; the boolean engine is
/// generic over it.
pub trait Dimension: Copy + Debug + Default + 'static {
    type Point: Clone + Debug + PartialEq + Eq + Hash + Ord;
    type Segment: Clone + Debug + PartialEq;
    type Surface: Clone + Debug + PartialEq;
    type Volume: Clone + Debug;

    /// 2 or 3.
    const DIMENSION: u8;

    fn point_bbox(p: &Self::Point) -> Bbox;
    fn segment_bbox(s: &Self::Segment) -> Bbox;
    fn surface_bbox(s: &Self::Surface) -> Bbox;
    fn volume_bbox(v: &Self::Volume) -> Bbox;

    fn segment_length(s: &Self::Segment) -> f64;
    fn surface_area(s: &Self::Surface) -> f64;
    fn volume_measure(v: &Self::Volume) -> f64;

    fn segment(source: Self::Point, target: Self::Point) -> Self::Segment;

    /// Inserts the convex region bounded by `ring` (three points or more).
    fn insert_ring(set: &mut GeometrySet<Self>, ring: Vec<Self::Point>, flags: u32);

    /// Decomposes `g` into `set`; only boundaries when `boundary_only`.
    ///
    /// # Errors
    ///
    /// Fails on geometries that have no primitive form in this dimension.
    fn decompose(set: &mut GeometrySet<Self>, g: &Geometry, boundary_only: bool) -> Result<()>;

    /// Simplest geometry covering the primitives of `set`.
    fn recompose(set: &GeometrySet<Self>) -> Geometry;
}
