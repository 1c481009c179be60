#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use sfgeom::geometry::{Geometry, GeometryType, LineString, MultiPoint, Point, Polygon};
use sfgeom::math::Point3;
use sfgeom::operations::boolean::{covers_3d, difference_3d, intersection_3d, intersects, union_3d};
use sfgeom::operations::hull::convex_hull;
use sfgeom::operations::query::{area, area_3d, is_valid};
use sfgeom::operations::shaping::extrude;
use sfgeom::set::{Dim3, GeometrySet};
use sfgeom::tessellation::tesselate;

fn square_at(x: i64, y: i64, z: i64, size: i64) -> Polygon {
    Polygon::new(LineString::from_points3(
        [(0, 0), (size, 0), (size, size), (0, size), (0, 0)]
            .iter()
            .map(|&(dx, dy)| Point3::from_i64(x + dx, y + dy, z)),
    ))
}

fn cube_at(x: i64, y: i64, z: i64, size: i32) -> Geometry {
    let base = Geometry::from(square_at(x, y, z, i64::from(size)));
    extrude(&base, 0.0, 0.0, f64::from(size)).unwrap()
}

fn volume(g: &Geometry) -> f64 {
    GeometrySet::<Dim3>::from_geometry(g).unwrap().measure()
}

#[test]
fn extruded_cubes_combine() {
    let a = cube_at(0, 0, 0, 2);
    let b = cube_at(1, 1, 1, 2);
    assert!(is_valid(&a).is_valid());
    assert_relative_eq!(area_3d(&a), 24.0, epsilon = 1e-9);

    assert_relative_eq!(volume(&intersection_3d(&a, &b).unwrap()), 1.0, epsilon = 1e-9);
    assert_relative_eq!(volume(&difference_3d(&a, &b).unwrap()), 7.0, epsilon = 1e-9);
    let union = union_3d(&a, &b).unwrap();
    assert_relative_eq!(volume(&union), 15.0, epsilon = 1e-9);
    assert!(covers_3d(&union, &a).unwrap());
    assert!(!covers_3d(&a, &b).unwrap());
}

#[test]
fn hull_of_points_around_a_square() {
    let points = Geometry::from(MultiPoint::new(vec![
        Point::xy(0.0, 0.0).unwrap(),
        Point::xy(0.5, 0.5).unwrap(),
        Point::xy(1.0, 0.0).unwrap(),
        Point::xy(0.0, 1.0).unwrap(),
    ]));
    let hull = convex_hull(&points);
    assert_eq!(hull.geometry_type(), GeometryType::Triangle);
    assert_relative_eq!(area(&hull).unwrap(), 0.5);
    assert!(intersects(&hull, &points).unwrap());
}

#[test]
fn tesselated_solid_keeps_its_area() {
    let cube = cube_at(0, 0, 0, 1);
    let tin = tesselate(&cube).unwrap();
    assert_relative_eq!(area_3d(&tin), area_3d(&cube), epsilon = 1e-9);
}
