use num_traits::Signed;

use crate::error::{OperationError, Result};
use crate::geometry::{Geometry, Polygon, PolyhedralSurface, Triangle};
use crate::math::number::{ft_sqrt, ft_to_f64};
use crate::math::polygon_2d::{open_ring, ring_signed_area};
use crate::set::dim2::polygon_to_exact;
use crate::tessellation::{newell_normal, polygon_rings_3d};

fn unsupported(g: &Geometry, what: &str) -> OperationError {
    OperationError::Unsupported(format!("{what} of {}", g.geometry_type().name()))
}

fn triangle_area_2d(t: &Triangle) -> f64 {
    t.to_triangle2()
        .map_or(0.0, |t| ft_to_f64(&t.signed_area().abs()))
}

fn polygon_area_2d(p: &Polygon) -> f64 {
    if p.is_empty() {
        return 0.0;
    }
    ft_to_f64(&polygon_to_exact(p).area())
}

/// Area of a planar ring embedded in 3D, from the length of its Newell
/// normal.
fn ring_area_3d(ring: &[crate::math::Point3]) -> f64 {
    ft_sqrt(&newell_normal(ring).squared_length()) / 2.0
}

fn polygon_area_3d(p: &Polygon) -> f64 {
    let rings = polygon_rings_3d(p);
    let Some((exterior, holes)) = rings.split_first() else {
        return 0.0;
    };
    ring_area_3d(exterior) - holes.iter().map(|h| ring_area_3d(h)).sum::<f64>()
}

fn surface_area_3d(s: &PolyhedralSurface) -> f64 {
    s.polygons().iter().map(polygon_area_3d).sum()
}

/// Area in the xy plane. Points and curves have no area.
///
/// # Errors
///
/// Returns [`OperationError::Unsupported`] for solids.
pub fn area(g: &Geometry) -> Result<f64> {
    Ok(match g {
        Geometry::Point(_)
        | Geometry::LineString(_)
        | Geometry::MultiPoint(_)
        | Geometry::MultiLineString(_) => 0.0,
        Geometry::Triangle(t) => triangle_area_2d(t),
        Geometry::Polygon(p) => polygon_area_2d(p),
        Geometry::PolyhedralSurface(s) => s.polygons().iter().map(polygon_area_2d).sum(),
        Geometry::TriangulatedSurface(s) => s.triangles().iter().map(triangle_area_2d).sum(),
        Geometry::MultiPolygon(m) => m.geometries().iter().map(polygon_area_2d).sum(),
        Geometry::Solid(_) | Geometry::MultiSolid(_) => {
            return Err(unsupported(g, "planar area").into());
        }
        Geometry::GeometryCollection(c) => {
            let mut total = 0.0;
            for part in c.geometries() {
                total += area(part)?;
            }
            total
        }
    })
}

/// Area in space. The area of a solid is the area of its shells.
#[must_use]
pub fn area_3d(g: &Geometry) -> f64 {
    match g {
        Geometry::Point(_)
        | Geometry::LineString(_)
        | Geometry::MultiPoint(_)
        | Geometry::MultiLineString(_) => 0.0,
        Geometry::Triangle(t) => t.to_triangle3().map_or(0.0, |t| t.area()),
        Geometry::Polygon(p) => polygon_area_3d(p),
        Geometry::PolyhedralSurface(s) => surface_area_3d(s),
        Geometry::TriangulatedSurface(s) => s
            .triangles()
            .iter()
            .filter_map(Triangle::to_triangle3)
            .map(|t| t.area())
            .sum(),
        Geometry::Solid(s) => s.shells().iter().map(surface_area_3d).sum(),
        Geometry::MultiPolygon(m) => m.geometries().iter().map(polygon_area_3d).sum(),
        Geometry::MultiSolid(m) => m
            .geometries()
            .iter()
            .flat_map(|s| s.shells())
            .map(surface_area_3d)
            .sum(),
        Geometry::GeometryCollection(c) => c.geometries().iter().map(area_3d).sum(),
    }
}

/// Signed xy area of a triangle or of a polygon exterior ring: positive
/// when counter-clockwise.
///
/// # Errors
///
/// Returns [`OperationError::Unsupported`] for any other geometry.
pub fn signed_area(g: &Geometry) -> Result<f64> {
    match g {
        Geometry::Triangle(t) => Ok(t.to_triangle2().map_or(0.0, |t| ft_to_f64(&t.signed_area()))),
        Geometry::Polygon(p) => Ok(ft_to_f64(&ring_signed_area(&open_ring(
            &p.exterior_ring().exact_points2(),
        )))),
        _ => Err(unsupported(g, "signed area").into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{LineString, Point, Solid};
    use crate::math::{Point2, Point3};

    fn ring2(points: &[(i64, i64)]) -> LineString {
        LineString::from_points2(points.iter().map(|&(x, y)| Point2::from_i64(x, y)))
    }

    fn holed_square() -> Polygon {
        Polygon::with_holes(
            ring2(&[(0, 0), (5, 0), (5, 5), (0, 5), (0, 0)]),
            vec![
                ring2(&[(1, 1), (2, 1), (2, 2), (1, 2), (1, 1)]),
                ring2(&[(3, 3), (4, 3), (4, 4), (3, 4), (3, 3)]),
            ],
        )
    }

    #[test]
    fn triangle_signed_area() {
        let t = Triangle::new(
            Point::xy(0.0, 0.0).unwrap(),
            Point::xy(1.0, 0.0).unwrap(),
            Point::xy(1.0, 1.0).unwrap(),
        );
        assert_relative_eq!(area(&Geometry::from(t.clone())).unwrap(), 0.5);
        assert_relative_eq!(signed_area(&Geometry::from(t.clone())).unwrap(), 0.5);
        assert_relative_eq!(signed_area(&Geometry::from(t.reversed())).unwrap(), -0.5);
    }

    #[test]
    fn holes_are_subtracted() {
        let g = Geometry::from(holed_square());
        assert_relative_eq!(area(&g).unwrap(), 23.0);
        assert_relative_eq!(area_3d(&g), 23.0);
        assert_relative_eq!(area_3d(&g.force_3d()), 23.0);
    }

    #[test]
    fn vertical_polygon_has_no_planar_area() {
        let wall = Polygon::new(LineString::from_points3(
            [(0, 0, 0), (2, 0, 0), (2, 0, 3), (0, 0, 3), (0, 0, 0)]
                .iter()
                .map(|&(x, y, z)| Point3::from_i64(x, y, z)),
        ));
        let g = Geometry::from(wall);
        assert_relative_eq!(area(&g).unwrap(), 0.0);
        assert_relative_eq!(area_3d(&g), 6.0);
    }

    #[test]
    fn solids_have_no_planar_area() {
        let g = Geometry::from(Solid::empty());
        assert!(area(&g).is_err());
        assert_relative_eq!(area_3d(&g), 0.0);
        assert!(signed_area(&g).is_err());
    }
}
