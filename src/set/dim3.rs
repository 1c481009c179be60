use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::{Geometry, LineString, Point, Polygon, Solid, Triangle};
use crate::math::polygon_set_2d::merge_disjoint;
use crate::math::projection::ProjectionPlane;
use crate::math::{ft_to_f64, Plane3, Point2, Point3, PolygonWithHoles2, Segment3, Triangle3};
use crate::polyhedron::Polyhedron;
use crate::spatial::Bbox;
use crate::tessellation::{open_ring_3d, triangulate_polygon_3d, triangulate_polyhedral_surface};

use super::dimension::Dimension;
use super::element::FLAG_IS_PLANAR;
use super::{assemble_parts, chain_segments, GeometrySet};

/// Spatial primitives: points, segments, triangles and polyhedra.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dim3;

impl Dimension for Dim3 {
    type Point = Point3;
    type Segment = Segment3;
    type Surface = Triangle3;
    type Volume = Polyhedron;

    const DIMENSION: u8 = 3;

    fn point_bbox(p: &Point3) -> Bbox {
        Bbox::from_points_3d([p])
    }

    fn segment_bbox(s: &Segment3) -> Bbox {
        Bbox::from_points_3d([&s.source, &s.target])
    }

    fn surface_bbox(t: &Triangle3) -> Bbox {
        Bbox::from_points_3d(&t.vertices)
    }

    fn volume_bbox(v: &Polyhedron) -> Bbox {
        v.bbox()
    }

    fn segment_length(s: &Segment3) -> f64 {
        s.length()
    }

    fn surface_area(t: &Triangle3) -> f64 {
        t.area()
    }

    fn volume_measure(v: &Polyhedron) -> f64 {
        ft_to_f64(&v.volume()).abs()
    }

    fn segment(source: Point3, target: Point3) -> Segment3 {
        Segment3::new(source, target)
    }

    /// Fans the convex ring into triangles flagged planar, so they merge back
    /// into one polygon on recomposition.
    fn insert_ring(set: &mut GeometrySet<Self>, ring: Vec<Point3>, flags: u32) {
        let mut added = false;
        for k in 1..ring.len() - 1 {
            let t = Triangle3::new(ring[0].clone(), ring[k].clone(), ring[k + 1].clone());
            if !t.is_degenerate() {
                set.add_surface(t, flags | FLAG_IS_PLANAR);
                added = true;
            }
        }
        if !added {
            if let (Some(lo), Some(hi)) = (ring.iter().min(), ring.iter().max()) {
                set.add_segment(Segment3::new(lo.clone(), hi.clone()), flags);
            }
        }
    }

    fn decompose(set: &mut GeometrySet<Self>, g: &Geometry, boundary_only: bool) -> Result<()> {
        match g {
            Geometry::Point(p) => {
                if let Some(q) = p.to_point3() {
                    set.add_point(q, 0);
                }
            }
            Geometry::LineString(l) => add_line(set, &l.exact_points3()),
            Geometry::Triangle(t) => add_triangle(set, t, boundary_only),
            Geometry::Polygon(p) => add_polygon(set, p, boundary_only)?,
            Geometry::PolyhedralSurface(s) => {
                for p in s.polygons() {
                    add_polygon(set, p, boundary_only)?;
                }
            }
            Geometry::TriangulatedSurface(s) => {
                for t in s.triangles() {
                    add_triangle(set, t, boundary_only);
                }
            }
            Geometry::Solid(s) => add_solid(set, s, boundary_only)?,
            Geometry::MultiPoint(_)
            | Geometry::MultiLineString(_)
            | Geometry::MultiPolygon(_)
            | Geometry::MultiSolid(_)
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
            .map(|e| Point::from_point3(e.primitive().clone()))
            .collect();
        let lines = chain_segments(
            set.segments()
                .map(|e| (e.primitive().source.clone(), e.primitive().target.clone())),
        )
        .into_iter()
        .map(LineString::from_points3)
        .collect();

        let mut surfaces = Vec::new();
        let mut planes: Vec<(Plane3, Vec<&Triangle3>)> = Vec::new();
        let mut plane_slot: HashMap<Plane3, usize> = HashMap::new();
        for e in set.surfaces() {
            let t = e.primitive();
            match t.supporting_plane() {
                Some(plane) if e.has_flag(FLAG_IS_PLANAR) => {
                    let key = plane.oriented_key();
                    let slot = *plane_slot.entry(key.clone()).or_insert_with(|| {
                        planes.push((key, Vec::new()));
                        planes.len() - 1
                    });
                    planes[slot].1.push(t);
                }
                _ => surfaces.push(Geometry::Triangle(Triangle::from_triangle3(t))),
            }
        }
        for (plane, triangles) in planes {
            surfaces.extend(merge_coplanar(plane, &triangles).into_iter().map(Geometry::Polygon));
        }

        let solids = set.volumes().map(|e| e.primitive().to_solid()).collect();
        assemble_parts(points, lines, surfaces, solids)
    }
}

/// Merges coplanar triangles sharing one orientation into polygons whose
/// exterior turns counter-clockwise around the plane normal.
fn merge_coplanar(plane: Plane3, triangles: &[&Triangle3]) -> Vec<Polygon> {
    let projection = ProjectionPlane::new(plane);
    let projected: Vec<PolygonWithHoles2> = triangles
        .iter()
        .map(|t| {
            let ring = t.vertices.iter().map(|p| projection.project(p)).collect();
            PolygonWithHoles2::from_outer(ring)
        })
        .collect();
    let lift = |ring: &[Point2]| {
        let mut lifted: Vec<Point3> = ring.iter().map(|p| projection.lift(p)).collect();
        if !projection.preserves_orientation() {
            lifted.reverse();
        }
        if let Some(first) = lifted.first().cloned() {
            lifted.push(first);
        }
        LineString::from_points3(lifted)
    };
    merge_disjoint(&projected)
        .iter()
        .map(|p| Polygon::with_holes(lift(&p.outer), p.holes.iter().map(|h| lift(h)).collect()))
        .collect()
}

fn add_line(set: &mut GeometrySet<Dim3>, points: &[Point3]) {
    let mut added = false;
    for pair in points.windows(2) {
        if pair[0] != pair[1] {
            set.add_segment(Segment3::new(pair[0].clone(), pair[1].clone()), 0);
            added = true;
        }
    }
    if !added {
        if let Some(p) = points.first() {
            set.add_point(p.clone(), 0);
        }
    }
}

fn add_triangle(set: &mut GeometrySet<Dim3>, t: &Triangle, boundary_only: bool) {
    let Some(tri) = t.to_triangle3() else {
        return;
    };
    if boundary_only {
        let [a, b, c] = tri.vertices;
        add_line(set, &[a.clone(), b, c, a]);
    } else {
        set.add_surface(tri, 0);
    }
}

fn add_polygon(set: &mut GeometrySet<Dim3>, p: &Polygon, boundary_only: bool) -> Result<()> {
    if p.is_empty() {
        return Ok(());
    }
    if boundary_only {
        for ring in p.rings() {
            add_line(set, &ring.exact_points3());
        }
        return Ok(());
    }
    for t in triangulate_polygon_3d(p)? {
        set.add_surface(t, FLAG_IS_PLANAR);
    }
    Ok(())
}

/// A solid is one volume: its exterior shell turned outward and its interior
/// shells turned inward.
fn add_solid(set: &mut GeometrySet<Dim3>, s: &Solid, boundary_only: bool) -> Result<()> {
    if boundary_only {
        for shell in s.shells() {
            for t in triangulate_polyhedral_surface(shell)? {
                set.add_surface(t, 0);
            }
        }
        return Ok(());
    }
    let mut parts = Vec::with_capacity(s.num_shells());
    for (i, shell) in s.shells().iter().enumerate().filter(|(_, shell)| !shell.is_empty()) {
        let part = Polyhedron::from_polyhedral_surface(shell)?;
        parts.push(if i == 0 { part } else { part.reversed() });
    }
    if !parts.is_empty() {
        set.add_volume(Polyhedron::merged(&parts), 0);
    }
    Ok(())
}

/// Exact open exterior ring of a polygon, for callers that need the planar
/// ring of a 3D polygon.
#[must_use]
pub fn exterior_ring_3d(p: &Polygon) -> Vec<Point3> {
    open_ring_3d(&p.exterior_ring().exact_points3())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::PolyhedralSurface;
    use crate::set::PrimitiveKind;

    fn p(x: i64, y: i64, z: i64) -> Point3 {
        Point3::from_i64(x, y, z)
    }

    fn ring(points: &[(i64, i64, i64)]) -> LineString {
        LineString::from_points3(
            points
                .iter()
                .chain(points.first())
                .map(|&(x, y, z)| p(x, y, z)),
        )
    }

    #[test]
    fn planar_polygon_round_trips() {
        let poly = Polygon::with_holes(
            ring(&[(0, 0, 1), (4, 0, 1), (4, 4, 1), (0, 4, 1)]),
            vec![ring(&[(1, 1, 1), (1, 2, 1), (2, 2, 1), (2, 1, 1)])],
        );
        let set = GeometrySet::<Dim3>::from_geometry(&Geometry::from(poly)).unwrap();
        assert!(set.surfaces().all(|e| e.has_flag(FLAG_IS_PLANAR)));
        assert!((set.measure() - 15.0).abs() < 1e-9);

        let Geometry::Polygon(back) = set.recompose() else {
            panic!("expected a polygon");
        };
        assert_eq!(back.num_interior_rings(), 1);
        assert_eq!(back.exterior_ring().num_points(), 5);
        let outer = exterior_ring_3d(&back);
        assert!(outer.contains(&p(4, 4, 1)));
    }

    #[test]
    fn vertical_polygon_keeps_its_orientation() {
        let poly = Polygon::new(ring(&[(0, 0, 0), (0, 0, 2), (0, 2, 2), (0, 2, 0)]));
        let set = GeometrySet::<Dim3>::from_geometry(&Geometry::from(poly)).unwrap();
        let Geometry::Polygon(back) = set.recompose() else {
            panic!("expected a polygon");
        };
        let outer = exterior_ring_3d(&back);
        let t = Triangle3::new(outer[0].clone(), outer[1].clone(), outer[2].clone());
        assert!(t.normal().x < crate::math::ft(0));
    }

    #[test]
    fn loose_triangles_stay_triangles() {
        let t = Triangle::from_triangle3(&Triangle3::new(p(0, 0, 0), p(1, 0, 0), p(0, 1, 1)));
        let g = Geometry::from(t);
        let set = GeometrySet::<Dim3>::from_geometry(&g).unwrap();
        assert_eq!(set.recompose(), g);
    }

    #[test]
    fn solid_shell_becomes_a_volume() {
        let shell = PolyhedralSurface::new(vec![
            Polygon::new(ring(&[(0, 0, 0), (0, 1, 0), (1, 0, 0)])),
            Polygon::new(ring(&[(0, 0, 0), (1, 0, 0), (0, 0, 1)])),
            Polygon::new(ring(&[(0, 0, 0), (0, 0, 1), (0, 1, 0)])),
            Polygon::new(ring(&[(1, 0, 0), (0, 1, 0), (0, 0, 1)])),
        ]);
        let g = Geometry::from(Solid::new(shell));
        let set = GeometrySet::<Dim3>::from_geometry(&g).unwrap();
        assert_eq!(set.dimension(), Some(PrimitiveKind::Volume));
        assert!((set.measure() - 1.0 / 6.0).abs() < 1e-12);
        assert!(matches!(set.recompose(), Geometry::Solid(_)));

        let boundary = GeometrySet::<Dim3>::from_boundary(&g).unwrap();
        assert_eq!(boundary.num_surfaces(), 4);
    }

    #[test]
    fn every_kind_survives_decomposition() {
        use crate::geometry::{
            GeometryCollection, GeometryType, MultiLineString, MultiPoint, MultiPolygon,
            MultiSolid, TriangulatedSurface,
        };
        use crate::polyhedron::tests::cube;

        let point = |x, y, z| Point::from_point3(p(x, y, z));
        let line = |points: &[(i64, i64, i64)]| {
            LineString::from_points3(points.iter().map(|&(x, y, z)| p(x, y, z)))
        };
        let tri = |a, b, c| Triangle::from_triangle3(&Triangle3::new(a, b, c));
        let floor = Polygon::new(ring(&[(0, 0, 0), (2, 0, 0), (2, 2, 0), (0, 2, 0)]));
        let wall = Polygon::new(ring(&[(0, 0, 0), (0, 0, 2), (2, 0, 2), (2, 0, 0)]));
        let raised = Polygon::new(ring(&[(5, 5, 3), (6, 5, 3), (6, 6, 3), (5, 6, 3)]));
        let solid = |x| cube((x, 0, 0), 1).to_solid();

        let cases: Vec<(Geometry, GeometryType)> = vec![
            (point(1, 2, 3).into(), GeometryType::Point),
            (line(&[(0, 0, 0), (1, 0, 0), (1, 1, 1)]).into(), GeometryType::LineString),
            (tri(p(0, 0, 0), p(1, 0, 0), p(0, 1, 1)).into(), GeometryType::Triangle),
            (floor.clone().into(), GeometryType::Polygon),
            (
                PolyhedralSurface::new(vec![floor.clone(), wall]).into(),
                GeometryType::MultiPolygon,
            ),
            (
                TriangulatedSurface::new(vec![
                    tri(p(0, 0, 0), p(1, 0, 0), p(0, 1, 1)),
                    tri(p(1, 0, 0), p(1, 1, 0), p(0, 1, 1)),
                ])
                .into(),
                GeometryType::TriangulatedSurface,
            ),
            (solid(0).into(), GeometryType::Solid),
            (
                MultiPoint::new(vec![point(0, 0, 0), point(3, 3, 3)]).into(),
                GeometryType::MultiPoint,
            ),
            (
                MultiLineString::new(vec![
                    line(&[(0, 0, 0), (1, 0, 0)]),
                    line(&[(5, 5, 5), (6, 5, 5)]),
                ])
                .into(),
                GeometryType::MultiLineString,
            ),
            (
                MultiPolygon::new(vec![floor.clone(), raised]).into(),
                GeometryType::MultiPolygon,
            ),
            (MultiSolid::new(vec![solid(0), solid(3)]).into(), GeometryType::MultiSolid),
            (
                GeometryCollection::new(vec![
                    point(9, 9, 9).into(),
                    line(&[(7, 0, 0), (8, 0, 0)]).into(),
                    solid(3).into(),
                ])
                .into(),
                GeometryType::GeometryCollection,
            ),
        ];

        for (g, expected) in cases {
            let set = GeometrySet::<Dim3>::from_geometry(&g).unwrap();
            let back = set.recompose();
            assert_eq!(back.geometry_type(), expected, "{:?}", g.geometry_type());
            let again = GeometrySet::<Dim3>::from_geometry(&back).unwrap();
            assert_eq!(again.num_points(), set.num_points());
            assert_eq!(again.num_segments(), set.num_segments());
            assert_eq!(again.num_volumes(), set.num_volumes());
            assert!((again.measure() - set.measure()).abs() < 1e-9, "{expected:?}");
        }
    }

    #[test]
    fn ring_of_points_is_fanned() {
        let mut set = GeometrySet::<Dim3>::new();
        set.add_points_as_ring(vec![p(0, 0, 0), p(2, 0, 0), p(2, 2, 0), p(0, 2, 0)], 0);
        assert_eq!(set.num_surfaces(), 2);
        assert!(matches!(set.recompose(), Geometry::Polygon(_)));
    }
}
