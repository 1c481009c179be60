use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::hull_2d::monotone_chain;
use crate::geometry::{
    Geometry, GeometryVisitor, LineString, Point, Polygon, PolyhedralSurface, Triangle,
};
use crate::math::predicates::{
    classify_point_in_triangle_3d, collinear_3d, coplanar, orient3d, PointClassification,
};
use crate::math::projection::ProjectionPlane;
use crate::math::{Plane3, Point3, Triangle3};

#[derive(Debug, Default)]
struct SpatialPoints(Vec<Point3>);

impl GeometryVisitor for SpatialPoints {
    fn visit_point(&mut self, g: &Point) {
        self.0.extend(g.to_point3());
    }
}

fn triangle(points: &[Point3], face: [usize; 3]) -> Triangle3 {
    Triangle3::new(points[face[0]].clone(), points[face[1]].clone(), points[face[2]].clone())
}

/// Outward faces of the tetrahedron `a b c d`.
fn tetrahedron(points: &[Point3], [a, b, c, d]: [usize; 4]) -> Vec<[usize; 3]> {
    let (b, c) = if orient3d(&points[a], &points[b], &points[c], &points[d]) == Ordering::Greater {
        (c, b)
    } else {
        (b, c)
    };
    vec![[a, b, c], [a, d, b], [b, d, c], [c, d, a]]
}

/// Adds `points[i]` to a closed outward hull.
///
/// A face is visible when the point lies strictly above it, or lies in its
/// plane outside of it. Nothing changes for points already in the hull.
fn add_point(points: &[Point3], faces: &mut Vec<[usize; 3]>, i: usize) {
    let p = &points[i];
    let sides: Vec<Ordering> = faces
        .iter()
        .map(|f| orient3d(&points[f[0]], &points[f[1]], &points[f[2]], p))
        .collect();
    if !sides.contains(&Ordering::Greater) {
        return;
    }
    let visible: Vec<bool> = faces
        .iter()
        .zip(&sides)
        .map(|(f, side)| match side {
            Ordering::Greater => true,
            Ordering::Equal => {
                classify_point_in_triangle_3d(p, &triangle(points, *f))
                    == PointClassification::Outside
            }
            Ordering::Less => false,
        })
        .collect();

    let removed: BTreeSet<(usize, usize)> = faces
        .iter()
        .zip(&visible)
        .filter(|(_, v)| **v)
        .flat_map(|(f, _)| [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])])
        .collect();
    let horizon: Vec<(usize, usize)> = faces
        .iter()
        .zip(&visible)
        .filter(|(_, v)| **v)
        .flat_map(|(f, _)| [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])])
        .filter(|(a, b)| !removed.contains(&(*b, *a)))
        .collect();
    trace!(point = i, horizon = horizon.len(), "hull grows");

    let mut kept: Vec<[usize; 3]> = faces
        .iter()
        .zip(&visible)
        .filter(|(_, v)| !**v)
        .map(|(f, _)| *f)
        .collect();
    kept.extend(horizon.into_iter().map(|(a, b)| [a, b, i]));
    *faces = kept;
}

fn planar_hull(points: &[Point3], plane: Plane3) -> Geometry {
    let projection = ProjectionPlane::new(plane);
    let hull: Vec<Point3> = monotone_chain(points.iter().map(|p| projection.project(p)).collect())
        .iter()
        .map(|q| projection.lift(q))
        .collect();
    match hull.as_slice() {
        [a, b, c] => Geometry::from(Triangle::new(
            Point::from_point3(a.clone()),
            Point::from_point3(b.clone()),
            Point::from_point3(c.clone()),
        )),
        _ => Geometry::from(Polygon::new(LineString::from_points3(
            hull.iter().chain(hull.first()).cloned(),
        ))),
    }
}

/// Convex hull in space, as a closed PolyhedralSurface of outward triangles.
///
/// Inputs without volume give lower-dimensional hulls: a Point, a
/// LineString between the extreme points, or a planar Triangle or Polygon.
#[must_use]
pub fn convex_hull_3d(g: &Geometry) -> Geometry {
    let mut collected = SpatialPoints::default();
    g.accept(&mut collected);
    let mut points = collected.0;
    points.sort();
    points.dedup();

    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Geometry::empty_collection(),
    };
    if points.len() == 1 {
        return Geometry::from(Point::from_point3(first.clone()));
    }
    let i2 = (2..points.len()).find(|&k| !collinear_3d(&points[0], &points[1], &points[k]));
    let Some(i2) = i2 else {
        return Geometry::from(LineString::from_points3([first.clone(), last.clone()]));
    };
    let i3 =
        (2..points.len()).find(|&k| !coplanar(&points[0], &points[1], &points[i2], &points[k]));
    let Some(i3) = i3 else {
        return match Plane3::from_points(&points[0], &points[1], &points[i2]) {
            Some(plane) => planar_hull(&points, plane),
            None => Geometry::empty_collection(),
        };
    };

    let simplex = [0, 1, i2, i3];
    let mut faces = tetrahedron(&points, simplex);
    for i in (0..points.len()).filter(|i| !simplex.contains(i)) {
        add_point(&points, &mut faces, i);
    }
    debug!(points = points.len(), faces = faces.len(), "convex hull 3d");

    Geometry::from(PolyhedralSurface::new(
        faces
            .iter()
            .map(|&f| {
                let t = triangle(&points, f);
                let closed = t.vertices.iter().chain(t.vertices.first()).cloned();
                Polygon::new(LineString::from_points3(closed))
            })
            .collect(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{GeometryType, MultiPoint, Solid};
    use crate::operations::query::{area_3d, is_valid};

    fn multi_point(points: &[(i64, i64, i64)]) -> Geometry {
        Geometry::from(MultiPoint::new(
            points
                .iter()
                .map(|&(x, y, z)| Point::from_point3(Point3::from_i64(x, y, z)))
                .collect(),
        ))
    }

    fn closed_hull(g: &Geometry) -> PolyhedralSurface {
        match convex_hull_3d(g) {
            Geometry::PolyhedralSurface(s) => s,
            other => panic!("surface expected, got {other:?}"),
        }
    }

    #[test]
    fn cube_corners_with_an_inner_point() {
        let mut points: Vec<Point> = (0..8)
            .map(|k| Point::from_point3(Point3::from_i64(k & 1, (k >> 1) & 1, (k >> 2) & 1)))
            .collect();
        points.push(Point::xyz(0.5, 0.5, 0.5).unwrap());
        points.push(Point::xyz(0.0, 0.0, 0.0).unwrap());
        let g = Geometry::from(MultiPoint::new(points));

        let hull = closed_hull(&g);
        assert_eq!(hull.num_polygons(), 12);
        assert_relative_eq!(area_3d(&Geometry::from(hull.clone())), 6.0, epsilon = 1e-9);
        assert!(is_valid(&Geometry::from(Solid::new(hull))).is_valid());
    }

    #[test]
    fn tetrahedron_faces_point_outward() {
        let hull = closed_hull(&multi_point(&[(0, 0, 0), (0, 1, 0), (1, 0, 0), (0, 0, 1)]));
        assert_eq!(hull.num_polygons(), 4);
        assert!(is_valid(&Geometry::from(Solid::new(hull))).is_valid());
    }

    #[test]
    fn flat_inputs() {
        assert_eq!(
            convex_hull_3d(&multi_point(&[(0, 0, 0), (1, 1, 1), (3, 3, 3)])).geometry_type(),
            GeometryType::LineString
        );
        let square =
            convex_hull_3d(&multi_point(&[(0, 0, 1), (2, 0, 1), (2, 2, 1), (0, 2, 1), (1, 1, 1)]));
        let Geometry::Polygon(p) = square else { panic!("polygon expected") };
        assert!(p.is_3d());
        assert_eq!(p.exterior_ring().num_points(), 5);
        assert_relative_eq!(area_3d(&Geometry::from(p)), 4.0);
    }
}
