use super::collection::{GeometryCollection, MultiLineString, MultiPoint, MultiPolygon, MultiSolid};
use super::line_string::LineString;
use super::point::Point;
use super::polygon::Polygon;
use super::polyhedral_surface::{PolyhedralSurface, TriangulatedSurface};
use super::solid::Solid;
use super::triangle::Triangle;

/// Visitor over every geometry variant.
///
/// Atomic variants default to no-ops; composite variants default to
/// visiting their parts, so a visitor that only handles points sees every
/// point of any geometry.
pub trait GeometryVisitor {
    fn visit_point(&mut self, _g: &Point) {}

    fn visit_line_string(&mut self, g: &LineString) {
        for p in g.points() {
            self.visit_point(p);
        }
    }

    fn visit_polygon(&mut self, g: &Polygon) {
        for ring in g.rings() {
            self.visit_line_string(ring);
        }
    }

    fn visit_triangle(&mut self, g: &Triangle) {
        for p in g.vertices() {
            self.visit_point(p);
        }
    }

    fn visit_polyhedral_surface(&mut self, g: &PolyhedralSurface) {
        for p in g.polygons() {
            self.visit_polygon(p);
        }
    }

    fn visit_triangulated_surface(&mut self, g: &TriangulatedSurface) {
        for t in g.triangles() {
            self.visit_triangle(t);
        }
    }

    fn visit_solid(&mut self, g: &Solid) {
        for shell in g.shells() {
            self.visit_polyhedral_surface(shell);
        }
    }

    fn visit_multi_point(&mut self, g: &MultiPoint) {
        for p in g.geometries() {
            self.visit_point(p);
        }
    }

    fn visit_multi_line_string(&mut self, g: &MultiLineString) {
        for l in g.geometries() {
            self.visit_line_string(l);
        }
    }

    fn visit_multi_polygon(&mut self, g: &MultiPolygon) {
        for p in g.geometries() {
            self.visit_polygon(p);
        }
    }

    fn visit_multi_solid(&mut self, g: &MultiSolid) {
        for s in g.geometries() {
            self.visit_solid(s);
        }
    }

    fn visit_geometry_collection(&mut self, g: &GeometryCollection) {
        for child in g.geometries() {
            child.accept(self);
        }
    }
}
