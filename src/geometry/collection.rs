use super::line_string::LineString;
use super::point::Point;
use super::polygon::Polygon;
use super::solid::Solid;
use super::Geometry;

macro_rules! typed_collection {
    ($(#[$doc:meta])* $name:ident, $item:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            geometries: Vec<$item>,
        }

        impl $name {
            #[must_use]
            pub fn new(geometries: Vec<$item>) -> Self {
                Self { geometries }
            }

            #[must_use]
            pub fn empty() -> Self {
                Self::default()
            }

            #[must_use]
            pub fn geometries(&self) -> &[$item] {
                &self.geometries
            }

            #[must_use]
            pub fn num_geometries(&self) -> usize {
                self.geometries.len()
            }

            pub fn push(&mut self, g: $item) {
                self.geometries.push(g);
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.geometries.iter().all(|g| g.is_empty())
            }

            #[must_use]
            pub fn is_3d(&self) -> bool {
                self.geometries.iter().any(|g| g.is_3d())
            }

            #[must_use]
            pub fn is_measured(&self) -> bool {
                self.geometries.iter().any(|g| g.is_measured())
            }
        }

        impl FromIterator<$item> for $name {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                Self::new(iter.into_iter().collect())
            }
        }
    };
}

typed_collection!(
    /// Collection of points.
    MultiPoint,
    Point
);
typed_collection!(
    /// Collection of line strings.
    MultiLineString,
    LineString
);
typed_collection!(
    /// Collection of polygons.
    MultiPolygon,
    Polygon
);
typed_collection!(
    /// Collection of solids.
    MultiSolid,
    Solid
);
typed_collection!(
    /// Heterogeneous collection of geometries.
    GeometryCollection,
    Geometry
);
