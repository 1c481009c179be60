//! Simple Features geometry model.

pub mod boundary;
pub mod collection;
pub mod coordinate;
pub mod envelope;
pub mod line_string;
pub mod point;
pub mod polygon;
pub mod polyhedral_surface;
pub mod solid;
pub mod triangle;
pub mod visitor;

pub use collection::{GeometryCollection, MultiLineString, MultiPoint, MultiPolygon, MultiSolid};
pub use coordinate::{Coordinate, Position};
pub use envelope::Envelope;
pub use line_string::LineString;
pub use point::Point;
pub use polygon::Polygon;
pub use polyhedral_surface::{PolyhedralSurface, TriangulatedSurface};
pub use solid::Solid;
pub use triangle::Triangle;
pub use visitor::GeometryVisitor;

use crate::error::Result;

/// Kind of a geometry, with its SFA type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    PolyhedralSurface,
    TriangulatedSurface,
    Triangle,
    Solid,
    MultiSolid,
}

impl GeometryType {
    /// Every geometry type, in SFA id order.
    pub const ALL: [GeometryType; 12] = [
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiPolygon,
        GeometryType::GeometryCollection,
        GeometryType::PolyhedralSurface,
        GeometryType::TriangulatedSurface,
        GeometryType::Triangle,
        GeometryType::Solid,
        GeometryType::MultiSolid,
    ];

    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            Self::Point => 1,
            Self::LineString => 2,
            Self::Polygon => 3,
            Self::MultiPoint => 4,
            Self::MultiLineString => 5,
            Self::MultiPolygon => 6,
            Self::GeometryCollection => 7,
            Self::PolyhedralSurface => 15,
            Self::TriangulatedSurface => 16,
            Self::Triangle => 17,
            Self::Solid => 101,
            Self::MultiSolid => 102,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Polygon => "Polygon",
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
            Self::PolyhedralSurface => "PolyhedralSurface",
            Self::TriangulatedSurface => "TIN",
            Self::Triangle => "Triangle",
            Self::Solid => "Solid",
            Self::MultiSolid => "MultiSolid",
        }
    }

    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// Any SFA geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    Triangle(Triangle),
    PolyhedralSurface(PolyhedralSurface),
    TriangulatedSurface(TriangulatedSurface),
    Solid(Solid),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    MultiSolid(MultiSolid),
    GeometryCollection(GeometryCollection),
}

impl Geometry {
    #[must_use]
    pub fn empty_collection() -> Self {
        Self::GeometryCollection(GeometryCollection::empty())
    }

    #[must_use]
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Self::Point(_) => GeometryType::Point,
            Self::LineString(_) => GeometryType::LineString,
            Self::Polygon(_) => GeometryType::Polygon,
            Self::Triangle(_) => GeometryType::Triangle,
            Self::PolyhedralSurface(_) => GeometryType::PolyhedralSurface,
            Self::TriangulatedSurface(_) => GeometryType::TriangulatedSurface,
            Self::Solid(_) => GeometryType::Solid,
            Self::MultiPoint(_) => GeometryType::MultiPoint,
            Self::MultiLineString(_) => GeometryType::MultiLineString,
            Self::MultiPolygon(_) => GeometryType::MultiPolygon,
            Self::MultiSolid(_) => GeometryType::MultiSolid,
            Self::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    #[must_use]
    pub fn geometry_type_id(&self) -> u32 {
        self.geometry_type().id()
    }

    /// Topological dimension: 0 for points, 1 for curves, 2 for surfaces,
    /// 3 for solids. Heterogeneous collections take the maximum.
    #[must_use]
    pub fn dimension(&self) -> u8 {
        match self {
            Self::Point(_) | Self::MultiPoint(_) => 0,
            Self::LineString(_) | Self::MultiLineString(_) => 1,
            Self::Polygon(_)
            | Self::Triangle(_)
            | Self::PolyhedralSurface(_)
            | Self::TriangulatedSurface(_)
            | Self::MultiPolygon(_) => 2,
            Self::Solid(_) | Self::MultiSolid(_) => 3,
            Self::GeometryCollection(c) => c
                .geometries()
                .iter()
                .map(Geometry::dimension)
                .max()
                .unwrap_or(0),
        }
    }

    /// Number of stored ordinates per coordinate: 2, 3 or 4.
    #[must_use]
    pub fn coordinate_dimension(&self) -> u8 {
        2 + u8::from(self.is_3d()) + u8::from(self.is_measured())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Point(g) => g.is_empty(),
            Self::LineString(g) => g.is_empty(),
            Self::Polygon(g) => g.is_empty(),
            Self::Triangle(g) => g.is_empty(),
            Self::PolyhedralSurface(g) => g.is_empty(),
            Self::TriangulatedSurface(g) => g.is_empty(),
            Self::Solid(g) => g.is_empty(),
            Self::MultiPoint(g) => g.is_empty(),
            Self::MultiLineString(g) => g.is_empty(),
            Self::MultiPolygon(g) => g.is_empty(),
            Self::MultiSolid(g) => g.is_empty(),
            Self::GeometryCollection(g) => g.is_empty(),
        }
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        match self {
            Self::Point(g) => g.is_3d(),
            Self::LineString(g) => g.is_3d(),
            Self::Polygon(g) => g.is_3d(),
            Self::Triangle(g) => g.is_3d(),
            Self::PolyhedralSurface(g) => g.is_3d(),
            Self::TriangulatedSurface(g) => g.is_3d(),
            Self::Solid(g) => g.is_3d(),
            Self::MultiPoint(g) => g.is_3d(),
            Self::MultiLineString(g) => g.is_3d(),
            Self::MultiPolygon(g) => g.is_3d(),
            Self::MultiSolid(g) => g.is_3d(),
            Self::GeometryCollection(g) => g.is_3d(),
        }
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        match self {
            Self::Point(g) => g.is_measured(),
            Self::LineString(g) => g.is_measured(),
            Self::Polygon(g) => g.is_measured(),
            Self::Triangle(g) => g.is_measured(),
            Self::PolyhedralSurface(g) => g.is_measured(),
            Self::TriangulatedSurface(g) => g.is_measured(),
            Self::Solid(g) => g.is_measured(),
            Self::MultiPoint(g) => g.is_measured(),
            Self::MultiLineString(g) => g.is_measured(),
            Self::MultiPolygon(g) => g.is_measured(),
            Self::MultiSolid(g) => g.is_measured(),
            Self::GeometryCollection(g) => g.is_measured(),
        }
    }

    /// Number of parts: 1 for atomic geometries.
    #[must_use]
    pub fn num_geometries(&self) -> usize {
        match self {
            Self::MultiPoint(g) => g.num_geometries(),
            Self::MultiLineString(g) => g.num_geometries(),
            Self::MultiPolygon(g) => g.num_geometries(),
            Self::MultiSolid(g) => g.num_geometries(),
            Self::GeometryCollection(g) => g.num_geometries(),
            _ => 1,
        }
    }

    /// Part `n` as an owned geometry; atomic geometries return themselves
    /// for `n == 0`.
    #[must_use]
    pub fn geometry_n(&self, n: usize) -> Option<Geometry> {
        match self {
            Self::MultiPoint(g) => g.geometries().get(n).cloned().map(Self::Point),
            Self::MultiLineString(g) => g.geometries().get(n).cloned().map(Self::LineString),
            Self::MultiPolygon(g) => g.geometries().get(n).cloned().map(Self::Polygon),
            Self::MultiSolid(g) => g.geometries().get(n).cloned().map(Self::Solid),
            Self::GeometryCollection(g) => g.geometries().get(n).cloned(),
            _ if n == 0 => Some(self.clone()),
            _ => None,
        }
    }

    /// Dispatches to the visitor method of this variant.
    pub fn accept<V: GeometryVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Self::Point(g) => visitor.visit_point(g),
            Self::LineString(g) => visitor.visit_line_string(g),
            Self::Polygon(g) => visitor.visit_polygon(g),
            Self::Triangle(g) => visitor.visit_triangle(g),
            Self::PolyhedralSurface(g) => visitor.visit_polyhedral_surface(g),
            Self::TriangulatedSurface(g) => visitor.visit_triangulated_surface(g),
            Self::Solid(g) => visitor.visit_solid(g),
            Self::MultiPoint(g) => visitor.visit_multi_point(g),
            Self::MultiLineString(g) => visitor.visit_multi_line_string(g),
            Self::MultiPolygon(g) => visitor.visit_multi_polygon(g),
            Self::MultiSolid(g) => visitor.visit_multi_solid(g),
            Self::GeometryCollection(g) => visitor.visit_geometry_collection(g),
        }
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut builder = envelope::EnvelopeBuilder::default();
        self.accept(&mut builder);
        builder.envelope
    }

    /// Topological boundary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::OperationError::Unsupported`] for solids and
    /// heterogeneous collections.
    pub fn boundary(&self) -> Result<Geometry> {
        boundary::boundary(self)
    }

    /// Applies `f` to every point, keeping the structure.
    #[must_use]
    pub fn map_points(&self, f: &dyn Fn(&Point) -> Point) -> Geometry {
        let line = |l: &LineString| l.map_points(f);
        let polygon = |p: &Polygon| p.map_rings(line);
        let triangle = |t: &Triangle| t.map_vertices(f);
        let surface = |s: &PolyhedralSurface| {
            PolyhedralSurface::new(s.polygons().iter().map(polygon).collect())
        };
        let solid = |s: &Solid| {
            let mut shells = s.shells().iter().map(surface);
            let exterior = shells.next().unwrap_or_default();
            Solid::with_interior_shells(exterior, shells.collect())
        };
        match self {
            Self::Point(g) => Self::Point(f(g)),
            Self::LineString(g) => Self::LineString(line(g)),
            Self::Polygon(g) => Self::Polygon(polygon(g)),
            Self::Triangle(g) => Self::Triangle(triangle(g)),
            Self::PolyhedralSurface(g) => Self::PolyhedralSurface(surface(g)),
            Self::TriangulatedSurface(g) => Self::TriangulatedSurface(TriangulatedSurface::new(
                g.triangles().iter().map(triangle).collect(),
            )),
            Self::Solid(g) => Self::Solid(solid(g)),
            Self::MultiPoint(g) => Self::MultiPoint(g.geometries().iter().map(f).collect()),
            Self::MultiLineString(g) => {
                Self::MultiLineString(g.geometries().iter().map(line).collect())
            }
            Self::MultiPolygon(g) => {
                Self::MultiPolygon(g.geometries().iter().map(polygon).collect())
            }
            Self::MultiSolid(g) => Self::MultiSolid(g.geometries().iter().map(solid).collect()),
            Self::GeometryCollection(g) => Self::GeometryCollection(
                g.geometries().iter().map(|c| c.map_points(f)).collect(),
            ),
        }
    }

    /// Rounds every coordinate to the grid `1 / scale`.
    #[must_use]
    pub fn round(&self, scale: i64) -> Geometry {
        self.map_points(&|p| p.round(scale))
    }

    #[must_use]
    pub fn force_2d(&self) -> Geometry {
        self.map_points(&Point::force_2d)
    }

    #[must_use]
    pub fn force_3d(&self) -> Geometry {
        self.map_points(&Point::force_3d)
    }

    /// Exact structural equality, only for valid geometries.
    #[must_use]
    pub fn eq_exact(&self, other: &Geometry) -> bool {
        self == other
            && crate::operations::query::is_valid(self).is_valid()
            && crate::operations::query::is_valid(other).is_valid()
    }
}

macro_rules! geometry_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Geometry {
                fn from(g: $variant) -> Self {
                    Self::$variant(g)
                }
            }
        )*
    };
}

geometry_from!(
    Point,
    LineString,
    Polygon,
    Triangle,
    PolyhedralSurface,
    TriangulatedSurface,
    Solid,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    MultiSolid,
    GeometryCollection
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Point3};

    fn square() -> Polygon {
        Polygon::new(LineString::from_points2([
            Point2::from_i64(0, 0),
            Point2::from_i64(1, 0),
            Point2::from_i64(1, 1),
            Point2::from_i64(0, 1),
            Point2::from_i64(0, 0),
        ]))
    }

    #[test]
    fn type_table_is_consistent() {
        for t in GeometryType::ALL {
            assert_eq!(GeometryType::from_id(t.id()), Some(t));
            assert_eq!(GeometryType::from_name(t.name()), Some(t));
        }
        assert_eq!(Geometry::from(square()).geometry_type_id(), 3);
        assert_eq!(Geometry::Solid(Solid::empty()).geometry_type_id(), 101);
    }

    #[test]
    fn dimensions() {
        let p = Geometry::from(Point::xy(1.0, 2.0).unwrap());
        assert_eq!(p.dimension(), 0);
        assert_eq!(p.coordinate_dimension(), 2);
        let q = Geometry::from(Point::xyz(1.0, 2.0, 3.0).unwrap().with_m(4.0));
        assert_eq!(q.coordinate_dimension(), 4);
        let gc = Geometry::from(GeometryCollection::new(vec![p, Geometry::from(square())]));
        assert_eq!(gc.dimension(), 2);
        assert_eq!(Geometry::empty_collection().dimension(), 0);
    }

    #[test]
    fn atomic_geometry_n_is_self() {
        let g = Geometry::from(square());
        assert_eq!(g.num_geometries(), 1);
        assert_eq!(g.geometry_n(0), Some(g.clone()));
        assert_eq!(g.geometry_n(1), None);
        let mp =
            Geometry::from(MultiPoint::new(vec![Point::xy(0.0, 0.0).unwrap(), Point::empty()]));
        assert_eq!(mp.num_geometries(), 2);
        assert_eq!(mp.geometry_n(1), Some(Geometry::Point(Point::empty())));
    }

    #[test]
    fn emptiness() {
        assert!(Geometry::from(Polygon::empty()).is_empty());
        assert!(Geometry::from(Solid::empty()).is_empty());
        assert!(Geometry::from(MultiPoint::new(vec![Point::empty()])).is_empty());
        assert!(!Geometry::from(square()).is_empty());
    }

    #[test]
    fn force_dimension_and_round() {
        let g = Geometry::from(square()).force_3d();
        assert!(g.is_3d());
        assert!(!g.force_2d().is_3d());
        let p = Geometry::from(Point::xyz(0.123_456, 1.0, 2.0).unwrap()).round(100);
        let Geometry::Point(p) = p else { panic!("point expected") };
        assert_eq!(
            p.to_point3().unwrap(),
            Point3::new(
                crate::math::ft(12) / crate::math::ft(100),
                crate::math::ft(1),
                crate::math::ft(2)
            )
        );
    }

    #[test]
    fn exact_equality_requires_validity() {
        let a = Geometry::from(square());
        assert!(a.eq_exact(&a.clone()));
        let bow_tie = Geometry::from(Polygon::new(LineString::from_points2([
            Point2::from_i64(0, 0),
            Point2::from_i64(1, 1),
            Point2::from_i64(1, 0),
            Point2::from_i64(0, 1),
            Point2::from_i64(0, 0),
        ])));
        assert!(!bow_tie.eq_exact(&bow_tie.clone()));
    }
}
