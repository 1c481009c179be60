use tracing::debug;

use crate::error::Result;
use crate::geometry::{
    Geometry, GeometryCollection, MultiSolid, Polygon, PolyhedralSurface, Solid, Triangle,
    TriangulatedSurface,
};
use crate::set::dim2::polygon_to_exact;

use super::triangulate_polygon::{triangulate_polygon_2d, triangulate_polygon_3d};

fn polygon_triangles(p: &Polygon) -> Result<Vec<Triangle>> {
    if p.is_3d() {
        Ok(triangulate_polygon_3d(p)?
            .iter()
            .map(Triangle::from_triangle3)
            .collect())
    } else {
        Ok(triangulate_polygon_2d(&polygon_to_exact(p))?
            .iter()
            .map(Triangle::from_triangle2)
            .collect())
    }
}

fn surface_triangles<'a>(polygons: impl IntoIterator<Item = &'a Polygon>) -> Result<Vec<Triangle>> {
    let mut out = Vec::new();
    for p in polygons {
        out.extend(polygon_triangles(p)?);
    }
    Ok(out)
}

fn tesselate_shell(shell: &PolyhedralSurface) -> Result<PolyhedralSurface> {
    Ok(PolyhedralSurface::new(
        surface_triangles(shell.polygons())?
            .iter()
            .map(Polygon::from_triangle)
            .collect(),
    ))
}

fn tesselate_solid(s: &Solid) -> Result<Solid> {
    let mut shells = s.shells().iter();
    let Some(exterior) = shells.next() else {
        return Ok(Solid::empty());
    };
    let interior = shells.map(tesselate_shell).collect::<Result<Vec<_>>>()?;
    Ok(Solid::with_interior_shells(tesselate_shell(exterior)?, interior))
}

/// Replaces polygons by triangles.
///
/// Polygons, multi-polygons and polyhedral surfaces become triangulated
/// surfaces; solids keep their shells with triangular faces. Other
/// geometries are returned unchanged and collections are processed per
/// member.
///
/// # Errors
///
/// Returns [`crate::error::GeometryError::Invalid`] for 3D polygons without a
/// supporting plane.
pub fn tesselate(g: &Geometry) -> Result<Geometry> {
    debug!(geometry = g.geometry_type().name(), "tesselating");
    Ok(match g {
        Geometry::Point(_)
        | Geometry::LineString(_)
        | Geometry::Triangle(_)
        | Geometry::TriangulatedSurface(_)
        | Geometry::MultiPoint(_)
        | Geometry::MultiLineString(_) => g.clone(),
        Geometry::Polygon(p) => {
            Geometry::TriangulatedSurface(TriangulatedSurface::new(polygon_triangles(p)?))
        }
        Geometry::MultiPolygon(m) => {
            let triangles = surface_triangles(m.geometries())?;
            Geometry::TriangulatedSurface(TriangulatedSurface::new(triangles))
        }
        Geometry::PolyhedralSurface(s) => {
            let triangles = surface_triangles(s.polygons())?;
            Geometry::TriangulatedSurface(TriangulatedSurface::new(triangles))
        }
        Geometry::Solid(s) => Geometry::Solid(tesselate_solid(s)?),
        Geometry::MultiSolid(m) => Geometry::MultiSolid(MultiSolid::new(
            m.geometries()
                .iter()
                .map(tesselate_solid)
                .collect::<Result<Vec<_>>>()?,
        )),
        Geometry::GeometryCollection(c) => Geometry::GeometryCollection(GeometryCollection::new(
            c.geometries().iter().map(tesselate).collect::<Result<Vec<_>>>()?,
        )),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::LineString;
    use crate::math::{Point2, Point3};

    fn square2(size: i64) -> LineString {
        LineString::from_points2(
            [(0, 0), (size, 0), (size, size), (0, size), (0, 0)]
                .map(|(x, y)| Point2::from_i64(x, y)),
        )
    }

    #[test]
    fn polygon_becomes_tin() {
        let poly = Polygon::with_holes(square2(4), vec![]);
        let Geometry::TriangulatedSurface(tin) = tesselate(&Geometry::from(poly)).unwrap() else {
            panic!("expected a TIN");
        };
        assert_eq!(tin.num_triangles(), 2);
        assert!(!tin.is_3d());
    }

    #[test]
    fn solid_faces_become_triangles() {
        let face = |pts: [(i64, i64, i64); 3]| {
            let ring: Vec<Point3> = pts
                .iter()
                .chain(pts.first())
                .map(|&(x, y, z)| Point3::from_i64(x, y, z))
                .collect();
            Polygon::new(LineString::from_points3(ring))
        };
        let shell = PolyhedralSurface::new(vec![
            face([(0, 0, 0), (0, 1, 0), (1, 0, 0)]),
            face([(0, 0, 0), (1, 0, 0), (0, 0, 1)]),
            face([(0, 0, 0), (0, 0, 1), (0, 1, 0)]),
            face([(1, 0, 0), (0, 1, 0), (0, 0, 1)]),
        ]);
        let g = tesselate(&Geometry::from(Solid::new(shell))).unwrap();
        let Geometry::Solid(s) = g else {
            panic!("expected a solid");
        };
        assert_eq!(s.exterior_shell().num_polygons(), 4);
    }

    #[test]
    fn lines_are_unchanged() {
        let g = Geometry::from(square2(1));
        assert_eq!(tesselate(&g).unwrap(), g);
    }
}
