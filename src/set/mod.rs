//! Primitive decomposition of geometries.
//!
//! A [`GeometrySet`] holds four disjoint arenas (points, segments, surfaces
//! and volumes) of the primitive types of a [`Dimension`]. Any geometry can
//! be decomposed into a set and a set can be recomposed into the simplest
//! geometry covering it. The boolean engine works on sets only.

pub mod dim2;
pub mod dim3;
pub mod dimension;
pub mod element;

use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::trace;

pub use dim2::{Dim2, NoVolume};
pub use dim3::Dim3;
pub use dimension::Dimension;
pub use element::{
    CollectionElement, PointKey, PrimitiveHandle, PrimitiveKind, PrimitiveRef, PrimitiveValue,
    SegmentKey, SurfaceKey, VolumeKey, FLAG_IS_PLANAR,
};

use crate::error::Result;
use crate::geometry::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, MultiSolid,
    Point, Polygon, PolyhedralSurface, Solid, TriangulatedSurface,
};
use crate::spatial::Bbox;

/// Bounding box of a primitive, borrowing the set it comes from.
pub type BoxRecord<'a, D> = (Bbox, PrimitiveRef<'a, D>);

/// Decomposed primitives of one or more geometries.
#[derive(Debug, Clone)]
pub struct GeometrySet<D: Dimension> {
    points: SlotMap<PointKey, CollectionElement<D::Point>>,
    segments: SlotMap<SegmentKey, CollectionElement<D::Segment>>,
    surfaces: SlotMap<SurfaceKey, CollectionElement<D::Surface>>,
    volumes: SlotMap<VolumeKey, CollectionElement<D::Volume>>,
    point_index: HashMap<D::Point, PointKey>,
}

impl<D: Dimension> Default for GeometrySet<D> {
    fn default() -> Self {
        Self {
            points: SlotMap::with_key(),
            segments: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            volumes: SlotMap::with_key(),
            point_index: HashMap::new(),
        }
    }
}

impl<D: Dimension> GeometrySet<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decomposes a geometry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::Invalid`] when `g` has no
    /// primitive form in `D` (solids in 2D) or when a polygon cannot be
    /// triangulated.
    pub fn from_geometry(g: &Geometry) -> Result<Self> {
        let mut set = Self::new();
        set.add_geometry(g)?;
        Ok(set)
    }

    /// Decomposes the boundary of a geometry: rings become segments.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_geometry`].
    pub fn from_boundary(g: &Geometry) -> Result<Self> {
        let mut set = Self::new();
        set.add_boundary(g)?;
        Ok(set)
    }

    /// # Errors
    ///
    /// Same as [`Self::from_geometry`].
    pub fn add_geometry(&mut self, g: &Geometry) -> Result<()> {
        D::decompose(self, g, false)
    }

    /// # Errors
    ///
    /// Same as [`Self::from_geometry`].
    pub fn add_boundary(&mut self, g: &Geometry) -> Result<()> {
        D::decompose(self, g, true)
    }

    /// Inserts a point; an equal point already present is reused.
    pub fn add_point(&mut self, p: D::Point, flags: u32) -> PointKey {
        if let Some(&key) = self.point_index.get(&p) {
            if let Some(element) = self.points.get_mut(key) {
                element.set_flags(flags);
            }
            return key;
        }
        let key = self.points.insert(CollectionElement::new(p.clone(), flags));
        self.point_index.insert(p, key);
        key
    }

    pub fn add_segment(&mut self, s: D::Segment, flags: u32) -> SegmentKey {
        self.segments.insert(CollectionElement::new(s, flags))
    }

    pub fn add_surface(&mut self, s: D::Surface, flags: u32) -> SurfaceKey {
        self.surfaces.insert(CollectionElement::new(s, flags))
    }

    pub fn add_volume(&mut self, v: D::Volume, flags: u32) -> VolumeKey {
        self.volumes.insert(CollectionElement::new(v, flags))
    }

    /// Inserts a primitive by its runtime kind, unpacking collections.
    pub fn add_primitive(&mut self, value: PrimitiveValue<D>, flags: u32) {
        match value {
            PrimitiveValue::Point(p) => {
                self.add_point(p, flags);
            }
            PrimitiveValue::Segment(s) => {
                self.add_segment(s, flags);
            }
            PrimitiveValue::Surface(s) => {
                self.add_surface(s, flags);
            }
            PrimitiveValue::Volume(v) => {
                self.add_volume(v, flags);
            }
            PrimitiveValue::Collection(items) => {
                for item in items {
                    self.add_primitive(item, flags);
                }
            }
        }
    }

    /// Inserts the region bounded by `points`: a point, a segment, or the
    /// surface of the closed ring through them.
    pub fn add_points_as_ring(&mut self, mut points: Vec<D::Point>, flags: u32) {
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        match points.len() {
            0 => {}
            1 => {
                if let Some(p) = points.pop() {
                    self.add_point(p, flags);
                }
            }
            2 => {
                let b = points.swap_remove(1);
                let a = points.swap_remove(0);
                self.add_segment(D::segment(a, b), flags);
            }
            _ => D::insert_ring(self, points, flags),
        }
    }

    /// Moves every primitive of `other` into this set.
    pub fn merge(&mut self, other: Self) {
        for (_, e) in other.points {
            let flags = e.flags();
            self.add_point(e.into_primitive(), flags);
        }
        for (_, e) in other.segments {
            self.segments.insert(e);
        }
        for (_, e) in other.surfaces {
            self.surfaces.insert(e);
        }
        for (_, e) in other.volumes {
            self.volumes.insert(e);
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &CollectionElement<D::Point>> {
        self.points.values()
    }

    pub fn segments(&self) -> impl Iterator<Item = &CollectionElement<D::Segment>> {
        self.segments.values()
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &CollectionElement<D::Surface>> {
        self.surfaces.values()
    }

    pub fn volumes(&self) -> impl Iterator<Item = &CollectionElement<D::Volume>> {
        self.volumes.values()
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn num_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    #[must_use]
    pub fn num_volumes(&self) -> usize {
        self.volumes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.segments.is_empty()
            && self.surfaces.is_empty()
            && self.volumes.is_empty()
    }

    /// Highest primitive kind present.
    #[must_use]
    pub fn dimension(&self) -> Option<PrimitiveKind> {
        if !self.volumes.is_empty() {
            Some(PrimitiveKind::Volume)
        } else if !self.surfaces.is_empty() {
            Some(PrimitiveKind::Surface)
        } else if !self.segments.is_empty() {
            Some(PrimitiveKind::Segment)
        } else if !self.points.is_empty() {
            Some(PrimitiveKind::Point)
        } else {
            None
        }
    }

    /// Handles of every primitive, lower kinds first.
    #[must_use]
    pub fn handles(&self) -> Vec<PrimitiveHandle> {
        self.points
            .keys()
            .map(PrimitiveHandle::Point)
            .chain(self.segments.keys().map(PrimitiveHandle::Segment))
            .chain(self.surfaces.keys().map(PrimitiveHandle::Surface))
            .chain(self.volumes.keys().map(PrimitiveHandle::Volume))
            .collect()
    }

    /// The primitive behind `handle`, `None` once it has been removed.
    #[must_use]
    pub fn get(&self, handle: PrimitiveHandle) -> Option<PrimitiveRef<'_, D>> {
        match handle {
            PrimitiveHandle::Point(k) => {
                self.points.get(k).map(|e| PrimitiveRef::Point(e.primitive()))
            }
            PrimitiveHandle::Segment(k) => {
                self.segments.get(k).map(|e| PrimitiveRef::Segment(e.primitive()))
            }
            PrimitiveHandle::Surface(k) => {
                self.surfaces.get(k).map(|e| PrimitiveRef::Surface(e.primitive()))
            }
            PrimitiveHandle::Volume(k) => {
                self.volumes.get(k).map(|e| PrimitiveRef::Volume(e.primitive()))
            }
        }
    }

    /// Flags of the primitive behind `handle`.
    #[must_use]
    pub fn flags(&self, handle: PrimitiveHandle) -> Option<u32> {
        match handle {
            PrimitiveHandle::Point(k) => self.points.get(k).map(CollectionElement::flags),
            PrimitiveHandle::Segment(k) => self.segments.get(k).map(CollectionElement::flags),
            PrimitiveHandle::Surface(k) => self.surfaces.get(k).map(CollectionElement::flags),
            PrimitiveHandle::Volume(k) => self.volumes.get(k).map(CollectionElement::flags),
        }
    }

    /// Removes a primitive, returning it with its flags.
    pub fn remove(&mut self, handle: PrimitiveHandle) -> Option<(PrimitiveValue<D>, u32)> {
        match handle {
            PrimitiveHandle::Point(k) => self.points.remove(k).map(|e| {
                self.point_index.remove(e.primitive());
                let flags = e.flags();
                (PrimitiveValue::Point(e.into_primitive()), flags)
            }),
            PrimitiveHandle::Segment(k) => self.segments.remove(k).map(|e| {
                let flags = e.flags();
                (PrimitiveValue::Segment(e.into_primitive()), flags)
            }),
            PrimitiveHandle::Surface(k) => self.surfaces.remove(k).map(|e| {
                let flags = e.flags();
                (PrimitiveValue::Surface(e.into_primitive()), flags)
            }),
            PrimitiveHandle::Volume(k) => self.volumes.remove(k).map(|e| {
                let flags = e.flags();
                (PrimitiveValue::Volume(e.into_primitive()), flags)
            }),
        }
    }

    /// Every primitive with its handle and flags, lower kinds first.
    pub fn elements(&self) -> impl Iterator<Item = (PrimitiveHandle, PrimitiveRef<'_, D>, u32)> {
        let points = self.points.iter().map(|(k, e)| {
            (PrimitiveHandle::Point(k), PrimitiveRef::Point(e.primitive()), e.flags())
        });
        let segments = self.segments.iter().map(|(k, e)| {
            (PrimitiveHandle::Segment(k), PrimitiveRef::Segment(e.primitive()), e.flags())
        });
        let surfaces = self.surfaces.iter().map(|(k, e)| {
            (PrimitiveHandle::Surface(k), PrimitiveRef::Surface(e.primitive()), e.flags())
        });
        let volumes = self.volumes.iter().map(|(k, e)| {
            (PrimitiveHandle::Volume(k), PrimitiveRef::Volume(e.primitive()), e.flags())
        });
        points.chain(segments).chain(surfaces).chain(volumes)
    }

    /// One box per primitive. The records borrow the set, so it cannot be
    /// mutated while they are alive.
    #[must_use]
    pub fn compute_bounding_boxes(&self) -> Vec<BoxRecord<'_, D>> {
        let boxes: Vec<BoxRecord<'_, D>> = self
            .elements()
            .map(|(_, primitive, _)| (primitive.bbox(), primitive))
            .collect();
        trace!(count = boxes.len(), "computed primitive boxes");
        boxes
    }

    /// Aggregate measure of the highest kind present: point count, total
    /// length, total area or total volume.
    #[must_use]
    pub fn measure(&self) -> f64 {
        let Some(kind) = self.dimension() else {
            return 0.0;
        };
        self.elements()
            .filter(|(_, p, _)| p.kind() == kind)
            .map(|(_, p, _)| p.measure())
            .sum()
    }

    /// Simplest geometry covering the primitives of the set.
    #[must_use]
    pub fn recompose(&self) -> Geometry {
        D::recompose(self)
    }
}

/// Joins segments into chains, extending the last chain while segments
/// continue where it ends.
pub(crate) fn chain_segments<P: Clone + PartialEq>(
    segments: impl IntoIterator<Item = (P, P)>,
) -> Vec<Vec<P>> {
    let mut chains: Vec<Vec<P>> = Vec::new();
    for (a, b) in segments {
        match chains.last_mut() {
            Some(chain) if chain.last() == Some(&a) => chain.push(b),
            _ => chains.push(vec![a, b]),
        }
    }
    chains
}

/// Wraps recomposed parts into the simplest geometry: a single kind keeps
/// its own type, mixed kinds become a flat geometry collection.
pub(crate) fn assemble_parts(
    points: Vec<Point>,
    lines: Vec<LineString>,
    surfaces: Vec<Geometry>,
    solids: Vec<Solid>,
) -> Geometry {
    let kinds = [
        !points.is_empty(),
        !lines.is_empty(),
        !surfaces.is_empty(),
        !solids.is_empty(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();
    if kinds > 1 {
        let parts: Vec<Geometry> = points
            .into_iter()
            .map(Geometry::Point)
            .chain(lines.into_iter().map(Geometry::LineString))
            .chain(surfaces)
            .chain(solids.into_iter().map(Geometry::Solid))
            .collect();
        return Geometry::GeometryCollection(GeometryCollection::new(parts));
    }
    if !points.is_empty() {
        return single_or(points, Geometry::Point, |v| Geometry::MultiPoint(MultiPoint::new(v)));
    }
    if !lines.is_empty() {
        return single_or(lines, Geometry::LineString, |v| {
            Geometry::MultiLineString(MultiLineString::new(v))
        });
    }
    if !surfaces.is_empty() {
        return assemble_surfaces(surfaces);
    }
    if !solids.is_empty() {
        return single_or(solids, Geometry::Solid, |v| Geometry::MultiSolid(MultiSolid::new(v)));
    }
    Geometry::empty_collection()
}

fn single_or<T>(
    mut items: Vec<T>,
    single: impl FnOnce(T) -> Geometry,
    many: impl FnOnce(Vec<T>) -> Geometry,
) -> Geometry {
    if items.len() == 1 {
        if let Some(item) = items.pop() {
            return single(item);
        }
    }
    many(items)
}

fn assemble_surfaces(mut surfaces: Vec<Geometry>) -> Geometry {
    if surfaces.len() == 1 {
        if let Some(s) = surfaces.pop() {
            return s;
        }
    }
    if surfaces.iter().all(|g| matches!(g, Geometry::Triangle(_))) {
        let triangles = surfaces
            .into_iter()
            .filter_map(|g| match g {
                Geometry::Triangle(t) => Some(t),
                _ => None,
            })
            .collect();
        return Geometry::TriangulatedSurface(TriangulatedSurface::new(triangles));
    }
    if surfaces.iter().all(|g| matches!(g, Geometry::Polygon(_))) {
        let polygons = surfaces
            .into_iter()
            .filter_map(|g| match g {
                Geometry::Polygon(p) => Some(p),
                _ => None,
            })
            .collect();
        return Geometry::MultiPolygon(MultiPolygon::new(polygons));
    }
    let faces = surfaces
        .into_iter()
        .filter_map(|g| match g {
            Geometry::Polygon(p) => Some(p),
            Geometry::Triangle(t) => Some(Polygon::from_triangle(&t)),
            _ => None,
        })
        .collect();
    Geometry::PolyhedralSurface(PolyhedralSurface::new(faces))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Segment2};

    fn p(x: i64, y: i64) -> Point2 {
        Point2::from_i64(x, y)
    }

    #[test]
    fn points_are_deduplicated() {
        let mut set = GeometrySet::<Dim2>::new();
        let a = set.add_point(p(0, 0), 0);
        let b = set.add_point(p(0, 0), FLAG_IS_PLANAR);
        assert_eq!(a, b);
        assert_eq!(set.num_points(), 1);
        assert_eq!(set.flags(PrimitiveHandle::Point(a)), Some(FLAG_IS_PLANAR));
    }

    #[test]
    fn collections_are_unpacked() {
        let mut set = GeometrySet::<Dim2>::new();
        set.add_primitive(
            PrimitiveValue::Collection(vec![
                PrimitiveValue::Point(p(0, 0)),
                PrimitiveValue::Segment(Segment2::new(p(0, 0), p(1, 0))),
            ]),
            0,
        );
        assert_eq!(set.num_points(), 1);
        assert_eq!(set.num_segments(), 1);
        assert_eq!(set.dimension(), Some(PrimitiveKind::Segment));
    }

    #[test]
    fn handles_are_invalidated_by_removal() {
        let mut set = GeometrySet::<Dim2>::new();
        let key = set.add_segment(Segment2::new(p(0, 0), p(1, 0)), 0);
        let handle = PrimitiveHandle::Segment(key);
        assert!(set.get(handle).is_some());
        assert!(set.remove(handle).is_some());
        assert!(set.get(handle).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn ring_of_points_becomes_the_lowest_fitting_primitive() {
        let mut set = GeometrySet::<Dim2>::new();
        set.add_points_as_ring(vec![p(0, 0), p(0, 0)], 0);
        assert_eq!(set.num_points(), 1);
        set.add_points_as_ring(vec![p(0, 0), p(2, 0)], 0);
        assert_eq!(set.num_segments(), 1);
        set.add_points_as_ring(vec![p(0, 0), p(2, 0), p(0, 2), p(0, 0)], 0);
        assert_eq!(set.num_surfaces(), 1);
        assert!((set.measure() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn chains_follow_consecutive_segments() {
        let chains = chain_segments([(1, 2), (2, 3), (5, 6), (6, 7), (7, 1)]);
        assert_eq!(chains, vec![vec![1, 2, 3], vec![5, 6, 7, 1]]);
    }

    #[test]
    fn mixed_kinds_become_a_collection() {
        let pt = Point::from_point2(p(0, 0));
        let line = LineString::from_points2([p(1, 1), p(2, 2)]);
        match assemble_parts(vec![pt.clone()], vec![line], Vec::new(), Vec::new()) {
            Geometry::GeometryCollection(gc) => assert_eq!(gc.num_geometries(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            assemble_parts(vec![pt.clone()], Vec::new(), Vec::new(), Vec::new()),
            Geometry::Point(pt)
        );
        assert!(assemble_parts(Vec::new(), Vec::new(), Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn boxes_cover_every_primitive() {
        let g = Geometry::from(MultiPoint::new(vec![
            Point::from_point2(p(0, 0)),
            Point::from_point2(p(3, 4)),
        ]));
        let mut set = GeometrySet::<Dim2>::from_geometry(&g).unwrap();
        set.add_geometry(&Geometry::from(LineString::from_points2([p(0, 0), p(1, 1)])))
            .unwrap();
        let boxes = set.compute_bounding_boxes();
        assert_eq!(boxes.len(), 3);
        assert!(boxes.iter().any(|(b, r)| r.kind() == PrimitiveKind::Point && b.mins.x == 3.0));
    }
}
