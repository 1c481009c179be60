use crate::error::{GeometryError, Result};
use crate::geometry::{Geometry, LineString, Point, Polygon, Triangle};
use crate::math::polygon_2d::open_ring;
use crate::math::{ft_to_f64, Point2, PolygonWithHoles2, Segment2};
use crate::spatial::Bbox;

use super::dimension::Dimension;
use super::{assemble_parts, chain_segments, GeometrySet};

/// Planar primitives: points, segments and polygons with holes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dim2;

/// There are no volumes in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoVolume {}

impl Dimension for Dim2 {
    type Point = Point2;
    type Segment = Segment2;
    type Surface = PolygonWithHoles2;
    type Volume = NoVolume;

    const DIMENSION: u8 = 2;

    fn point_bbox(p: &Point2) -> Bbox {
        Bbox::from_points_2d([p])
    }

    fn segment_bbox(s: &Segment2) -> Bbox {
        Bbox::from_points_2d([&s.source, &s.target])
    }

    fn surface_bbox(s: &PolygonWithHoles2) -> Bbox {
        Bbox::from_points_2d(&s.outer)
    }

    fn volume_bbox(v: &NoVolume) -> Bbox {
        match *v {}
    }

    fn segment_length(s: &Segment2) -> f64 {
        s.length()
    }

    fn surface_area(s: &PolygonWithHoles2) -> f64 {
        ft_to_f64(&s.area())
    }

    fn volume_measure(v: &NoVolume) -> f64 {
        match *v {}
    }

    fn segment(source: Point2, target: Point2) -> Segment2 {
        Segment2::new(source, target)
    }

    fn insert_ring(set: &mut GeometrySet<Self>, ring: Vec<Point2>, flags: u32) {
        set.add_surface(PolygonWithHoles2::from_outer(ring), flags);
    }

    fn decompose(set: &mut GeometrySet<Self>, g: &Geometry, boundary_only: bool) -> Result<()> {
        match g {
            Geometry::Point(p) => {
                if let Some(q) = p.to_point2() {
                    set.add_point(q, 0);
                }
            }
            Geometry::LineString(l) => add_line(set, &l.exact_points2()),
            Geometry::Triangle(t) => add_triangle(set, t, boundary_only),
            Geometry::Polygon(p) => add_polygon(set, p, boundary_only),
            Geometry::PolyhedralSurface(s) => {
                for p in s.polygons() {
                    add_polygon(set, p, boundary_only);
                }
            }
            Geometry::TriangulatedSurface(s) => {
                for t in s.triangles() {
                    add_triangle(set, t, boundary_only);
                }
            }
            Geometry::Solid(_) | Geometry::MultiSolid(_) => {
                return Err(GeometryError::Invalid(
                    "a solid cannot be decomposed into planar primitives".into(),
                )
                .into());
            }
            Geometry::MultiPoint(_)
            | Geometry::MultiLineString(_)
            | Geometry::MultiPolygon(_)
            | Geometry::GeometryCollection(_) => {
                for i in 0..g.num_geometries() {
                    if let Some(child) = g.geometry_n(i) {
                        Self::decompose(set, &child, boundary_only)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn recompose(set: &GeometrySet<Self>) -> Geometry {
        let points = set
            .points()
            .map(|e| Point::from_point2(e.primitive().clone()))
            .collect();
        let lines = chain_segments(
            set.segments()
                .map(|e| (e.primitive().source.clone(), e.primitive().target.clone())),
        )
        .into_iter()
        .map(LineString::from_points2)
        .collect();
        let surfaces = set
            .surfaces()
            .map(|e| Geometry::Polygon(polygon_from_exact(e.primitive())))
            .collect();
        assemble_parts(points, lines, surfaces, Vec::new())
    }
}

fn add_line(set: &mut GeometrySet<Dim2>, points: &[Point2]) {
    let mut added = false;
    for pair in points.windows(2) {
        if pair[0] != pair[1] {
            set.add_segment(Segment2::new(pair[0].clone(), pair[1].clone()), 0);
            added = true;
        }
    }
    if !added {
        if let Some(p) = points.first() {
            set.add_point(p.clone(), 0);
        }
    }
}

fn add_triangle(set: &mut GeometrySet<Dim2>, t: &Triangle, boundary_only: bool) {
    let Some(tri) = t.to_triangle2() else {
        return;
    };
    if boundary_only {
        let [a, b, c] = tri.vertices;
        add_line(set, &[a.clone(), b, c, a]);
    } else {
        set.add_surface(PolygonWithHoles2::from_triangle(&tri), 0);
    }
}

fn add_polygon(set: &mut GeometrySet<Dim2>, p: &Polygon, boundary_only: bool) {
    if p.is_empty() {
        return;
    }
    if boundary_only {
        for ring in p.rings() {
            add_line(set, &ring.exact_points2());
        }
        return;
    }
    set.add_surface(polygon_to_exact(p), 0);
}

/// Exact planar polygon with open rings.
#[must_use]
pub fn polygon_to_exact(p: &Polygon) -> PolygonWithHoles2 {
    let outer = open_ring(&p.exterior_ring().exact_points2());
    let holes = p
        .interior_rings()
        .iter()
        .map(|r| open_ring(&r.exact_points2()))
        .filter(|r| r.len() >= 3)
        .collect();
    PolygonWithHoles2::new(outer, holes)
}

/// Closes the rings of an exact polygon.
#[must_use]
pub fn polygon_from_exact(p: &PolygonWithHoles2) -> Polygon {
    let closed = |ring: &[Point2]| {
        LineString::from_points2(ring.iter().chain(ring.first()).cloned())
    };
    Polygon::with_holes(closed(&p.outer), p.holes.iter().map(|h| closed(h.as_slice())).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SfgeomError;
    use crate::geometry::{MultiPoint, PolyhedralSurface, Solid};
    use crate::set::PrimitiveKind;

    fn p(x: i64, y: i64) -> Point2 {
        Point2::from_i64(x, y)
    }

    fn square(x: i64, y: i64, size: i64) -> LineString {
        LineString::from_points2([
            p(x, y),
            p(x + size, y),
            p(x + size, y + size),
            p(x, y + size),
            p(x, y),
        ])
    }

    #[test]
    fn polygon_round_trip() {
        let poly = Polygon::with_holes(square(0, 0, 5), vec![square(1, 1, 1)]);
        let g = Geometry::from(poly.clone());
        let set = GeometrySet::<Dim2>::from_geometry(&g).unwrap();
        assert_eq!(set.num_surfaces(), 1);
        assert!((set.measure() - 24.0).abs() < 1e-12);
        assert_eq!(set.recompose(), Geometry::Polygon(poly));
    }

    #[test]
    fn line_string_round_trip() {
        let line = LineString::from_points2([p(0, 0), p(1, 0), p(1, 1)]);
        let g = Geometry::from(line);
        let set = GeometrySet::<Dim2>::from_geometry(&g).unwrap();
        assert_eq!(set.num_segments(), 2);
        assert_eq!(set.recompose(), g);
    }

    #[test]
    fn multi_point_round_trip() {
        let g = Geometry::from(MultiPoint::new(vec![
            Point::from_point2(p(0, 0)),
            Point::from_point2(p(1, 2)),
        ]));
        let set = GeometrySet::<Dim2>::from_geometry(&g).unwrap();
        assert_eq!(set.recompose(), g);
    }

    #[test]
    fn boundary_decomposition_yields_segments() {
        let g = Geometry::from(PolyhedralSurface::new(vec![Polygon::new(square(0, 0, 1))]));
        let set = GeometrySet::<Dim2>::from_boundary(&g).unwrap();
        assert_eq!(set.dimension(), Some(PrimitiveKind::Segment));
        assert_eq!(set.num_segments(), 4);
    }

    #[test]
    fn solids_are_rejected() {
        let g = Geometry::from(Solid::empty());
        assert!(matches!(
            GeometrySet::<Dim2>::from_geometry(&g),
            Err(SfgeomError::Geometry(GeometryError::Invalid(_)))
        ));
    }
}
