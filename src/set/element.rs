use crate::spatial::Bbox;

use super::dimension::Dimension;

slotmap::new_key_type! {
    /// Key of a point primitive in a [`super::GeometrySet`].
    pub struct PointKey;
}

slotmap::new_key_type! {
    /// Key of a segment primitive in a [`super::GeometrySet`].
    pub struct SegmentKey;
}

slotmap::new_key_type! {
    /// Key of a surface primitive in a [`super::GeometrySet`].
    pub struct SurfaceKey;
}

slotmap::new_key_type! {
    /// Key of a volume primitive in a [`super::GeometrySet`].
    pub struct VolumeKey;
}

/// Set on surfaces cut out of a planar polygon, so recomposition merges
/// them back instead of reporting loose triangles.
pub const FLAG_IS_PLANAR: u32 = 1;

/// A primitive together with its flags.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionElement<P> {
    primitive: P,
    flags: u32,
}

impl<P> CollectionElement<P> {
    #[must_use]
    pub fn new(primitive: P, flags: u32) -> Self {
        Self { primitive, flags }
    }

    #[must_use]
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    #[must_use]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.flags |= flags;
    }

    #[must_use]
    pub fn into_primitive(self) -> P {
        self.primitive
    }
}

/// Kind of a primitive, ordered by topological dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveKind {
    Point,
    Segment,
    Surface,
    Volume,
}

impl PrimitiveKind {
    #[must_use]
    pub fn dimension(self) -> u8 {
        match self {
            Self::Point => 0,
            Self::Segment => 1,
            Self::Surface => 2,
            Self::Volume => 3,
        }
    }
}

/// Generational handle to a primitive of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveHandle {
    Point(PointKey),
    Segment(SegmentKey),
    Surface(SurfaceKey),
    Volume(VolumeKey),
}

impl PrimitiveHandle {
    #[must_use]
    pub fn kind(self) -> PrimitiveKind {
        match self {
            Self::Point(_) => PrimitiveKind::Point,
            Self::Segment(_) => PrimitiveKind::Segment,
            Self::Surface(_) => PrimitiveKind::Surface,
            Self::Volume(_) => PrimitiveKind::Volume,
        }
    }
}

/// Borrowed view of one primitive. It cannot outlive its set.
#[derive(Debug)]
pub enum PrimitiveRef<'a, D: Dimension> {
    Point(&'a D::Point),
    Segment(&'a D::Segment),
    Surface(&'a D::Surface),
    Volume(&'a D::Volume),
}

impl<D: Dimension> Clone for PrimitiveRef<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Dimension> Copy for PrimitiveRef<'_, D> {}

impl<D: Dimension> PrimitiveRef<'_, D> {
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Point(_) => PrimitiveKind::Point,
            Self::Segment(_) => PrimitiveKind::Segment,
            Self::Surface(_) => PrimitiveKind::Surface,
            Self::Volume(_) => PrimitiveKind::Volume,
        }
    }

    #[must_use]
    pub fn bbox(&self) -> Bbox {
        match self {
            Self::Point(p) => D::point_bbox(p),
            Self::Segment(s) => D::segment_bbox(s),
            Self::Surface(s) => D::surface_bbox(s),
            Self::Volume(v) => D::volume_bbox(v),
        }
    }

    /// Count for points, length, area or volume.
    #[must_use]
    pub fn measure(&self) -> f64 {
        match self {
            Self::Point(_) => 1.0,
            Self::Segment(s) => D::segment_length(s),
            Self::Surface(s) => D::surface_area(s),
            Self::Volume(v) => D::volume_measure(v),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> PrimitiveValue<D> {
        match self {
            Self::Point(p) => PrimitiveValue::Point((*p).clone()),
            Self::Segment(s) => PrimitiveValue::Segment((*s).clone()),
            Self::Surface(s) => PrimitiveValue::Surface((*s).clone()),
            Self::Volume(v) => PrimitiveValue::Volume((*v).clone()),
        }
    }
}

/// Owned primitive of unknown runtime kind. Collections are unpacked on
/// insertion.
#[derive(Debug, Clone)]
pub enum PrimitiveValue<D: Dimension> {
    Point(D::Point),
    Segment(D::Segment),
    Surface(D::Surface),
    Volume(D::Volume),
    Collection(Vec<PrimitiveValue<D>>),
}

impl<D: Dimension> PrimitiveValue<D> {
    /// Borrowed view, `None` for collections.
    #[must_use]
    pub fn as_ref(&self) -> Option<PrimitiveRef<'_, D>> {
        match self {
            Self::Point(p) => Some(PrimitiveRef::Point(p)),
            Self::Segment(s) => Some(PrimitiveRef::Segment(s)),
            Self::Surface(s) => Some(PrimitiveRef::Surface(s)),
            Self::Volume(v) => Some(PrimitiveRef::Volume(v)),
            Self::Collection(_) => None,
        }
    }
}
