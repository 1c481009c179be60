use std::cmp::Ordering;


use crate::error::{GeometryError, Result};
use crate::geometry::{Polygon, PolyhedralSurface};
use crate::math::number::sign;
use crate::math::polygon_2d::ring_signed_area;
use crate::math::predicates::collinear_3d;
use crate::math::projection::ProjectionPlane;
use crate::math::{Plane3, Point3, PolygonWithHoles2, Triangle2, Triangle3, Vector3};

use super::cdt::ConstraintDelaunayTriangulation;

/// Drops the closing vertex and consecutive duplicates of a 3D ring.
#[must_use]
pub fn open_ring_3d(points: &[Point3]) -> Vec<Point3> {
    let mut ring = points.to_vec();
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Plane through the first three non-collinear points of `points`.
///
/// # Errors
///
/// Returns [`GeometryError::Invalid`] when all points are collinear.
pub fn supporting_plane(points: &[Point3]) -> Result<Plane3> {
    let Some(a) = points.first() else {
        return Err(GeometryError::Invalid("no point to build a plane from".into()).into());
    };
    let Some(b) = points.iter().find(|p| *p != a) else {
        let reason = "all points coincide, no supporting plane".into();
        return Err(GeometryError::Invalid(reason).into());
    };
    points
        .iter()
        .find(|c| !collinear_3d(a, b, c))
        .and_then(|c| Plane3::from_points(a, b, c))
        .ok_or_else(|| {
            GeometryError::Invalid("collinear polygon has no supporting plane".into()).into()
        })
}

/// Newell normal of a ring: its direction gives the ring orientation.
pub(crate) fn newell_normal(ring: &[Point3]) -> Vector3 {
    let n = ring.len();
    let mut normal = Vector3::zero();
    for i in 0..n {
        normal = &normal + &ring[i].to_vector().cross(&ring[(i + 1) % n].to_vector());
    }
    normal
}

/// Triangulates planar rings (exterior first, holes after) with the
/// mark-domains rule. Triangles keep the orientation of the exterior ring.
///
/// # Errors
///
/// Returns [`GeometryError::Invalid`] when the exterior has no supporting
/// plane and propagates triangulation failures.
pub fn triangulate_rings_3d(rings: &[Vec<Point3>]) -> Result<Vec<Triangle3>> {
    let Some(outer) = rings.first() else {
        return Ok(Vec::new());
    };
    let plane = supporting_plane(outer)?;
    if outer.len() == 3 && rings.len() == 1 {
        return Ok(vec![Triangle3::new(outer[0].clone(), outer[1].clone(), outer[2].clone())]);
    }

    let mut reference = newell_normal(outer);
    if reference.is_zero() {
        reference = plane.normal.clone();
    }
    let mut cdt = ConstraintDelaunayTriangulation::with_projection(ProjectionPlane::new(plane));
    for ring in rings.iter().filter(|r| r.len() >= 3) {
        cdt.add_ring(ring)?;
    }
    cdt.mark_domains();

    let mut out = Vec::new();
    for t in cdt.domain_triangles()? {
        match sign(&t.normal().dot(&reference)) {
            Ordering::Greater => out.push(t),
            Ordering::Less => out.push(t.reversed()),
            Ordering::Equal => {}
        }
    }
    Ok(out)
}

/// Triangulates a planar polygon. Triangles keep the exterior orientation.
///
/// # Errors
///
/// Propagates triangulation failures.
pub fn triangulate_polygon_2d(p: &PolygonWithHoles2) -> Result<Vec<Triangle2>> {
    if p.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(t) = p.as_triangle() {
        return Ok(if t.is_degenerate() { Vec::new() } else { vec![t] });
    }
    let outer_sign = sign(&ring_signed_area(&p.outer));
    let mut cdt = ConstraintDelaunayTriangulation::new();
    for ring in p.rings().filter(|r| r.len() >= 3) {
        cdt.add_ring_2d(ring)?;
    }
    cdt.mark_domains();

    let mut out = Vec::new();
    for t in cdt.domain_triangles()? {
        let [a, b, c] = &t.vertices;
        let t2 = Triangle2::new(a.to_2d(), b.to_2d(), c.to_2d());
        match (sign(&t2.signed_area()), outer_sign) {
            (Ordering::Equal, _) => {}
            (s, o) if o == Ordering::Equal || s == o => out.push(t2),
            _ => out.push(t2.reversed()),
        }
    }
    Ok(out)
}

/// Exact open rings of a polygon, exterior first.
#[must_use]
pub fn polygon_rings_3d(p: &Polygon) -> Vec<Vec<Point3>> {
    p.rings()
        .iter()
        .map(|r| open_ring_3d(&r.exact_points3()))
        .filter(|r| !r.is_empty())
        .collect()
}

/// Triangulates a polygon embedded in 3D.
///
/// # Errors
///
/// Returns [`GeometryError::Invalid`] for degenerate polygons with no three
/// non-collinear points.
pub fn triangulate_polygon_3d(p: &Polygon) -> Result<Vec<Triangle3>> {
    if p.is_empty() {
        return Ok(Vec::new());
    }
    triangulate_rings_3d(&polygon_rings_3d(p))
}

/// Per-face triangulation, concatenated. Face orientations are kept as
/// given.
///
/// # Errors
///
/// Same as [`triangulate_polygon_3d`].
pub fn triangulate_polyhedral_surface(s: &PolyhedralSurface) -> Result<Vec<Triangle3>> {
    let mut out = Vec::new();
    for p in s.polygons() {
        out.extend(triangulate_polygon_3d(p)?);
    }
    Ok(out)
}
