use std::cmp::Ordering;

use num_traits::Zero;
use tracing::{debug, trace};

use crate::math::predicates::{classify_point_in_triangle_3d, orient3d, PointClassification};
use crate::math::number::sign;
use crate::math::{ft, Point3, Triangle3, Vector3};

use super::Polyhedron;

/// Ray directions tried first, in turn, until one misses every edge and
/// vertex.
const RAY_DIRECTIONS: [(i64, i64, i64); 7] = [
    (1, 0, 0),
    (0, 1, 0),
    (0, 0, 1),
    (1, 2, 3),
    (3, -1, 2),
    (-2, 3, 1),
    (5, 7, -3),
];

enum RayHit {
    Miss,
    Hit,
    Degenerate,
}

/// Exact ray/triangle test for the ray `origin + t * direction`, `t > 0`.
/// Grazing an edge, a vertex or the triangle plane is degenerate.
fn cast(origin: &Point3, target: &Point3, direction: &Vector3, t: &Triangle3) -> RayHit {
    let [a, b, c] = &t.vertices;
    let normal = t.normal();
    if normal.is_zero() {
        return RayHit::Miss;
    }
    let along = normal.dot(direction);
    if along.is_zero() {
        let in_plane = normal.dot(&(origin - a)).is_zero();
        return if in_plane { RayHit::Degenerate } else { RayHit::Miss };
    }
    // Ray parameter of the plane crossing has the sign of `(a - origin)·n / (d·n)`.
    let towards = sign(&normal.dot(&(a - origin)));
    if towards == Ordering::Equal || towards != sign(&along) {
        return RayHit::Miss;
    }
    let sides = [
        orient3d(origin, target, a, b),
        orient3d(origin, target, b, c),
        orient3d(origin, target, c, a),
    ];
    let has_less = sides.contains(&Ordering::Less);
    let has_greater = sides.contains(&Ordering::Greater);
    if has_less && has_greater {
        RayHit::Miss
    } else if sides.contains(&Ordering::Equal) {
        RayHit::Degenerate
    } else {
        RayHit::Hit
    }
}

/// Crossing parity of the ray from `p` along `direction`, `None` when the
/// ray grazes an edge, a vertex or a face plane.
fn cast_all(
    p: &Point3,
    direction: &Vector3,
    triangles: &[Triangle3],
) -> Option<PointClassification> {
    let target = p + direction;
    let mut crossings = 0usize;
    for t in triangles {
        match cast(p, &target, direction, t) {
            RayHit::Miss => {}
            RayHit::Hit => crossings += 1,
            RayHit::Degenerate => return None,
        }
    }
    Some(if crossings % 2 == 1 {
        PointClassification::Inside
    } else {
        PointClassification::Outside
    })
}

/// Locates `p` against the volume enclosed by a closed polyhedron.
///
/// Points on a face are on the boundary. Otherwise rays are cast in fixed
/// integer directions and crossings are counted with exact predicates; a
/// ray grazing an edge or a vertex is retried in the next direction.
#[must_use]
pub fn classify_point(polyhedron: &Polyhedron, p: &Point3) -> PointClassification {
    let triangles: Vec<Triangle3> = polyhedron.triangles().collect();
    classify_point_in_triangles(&triangles, p)
}

/// [`classify_point`] against the faces of a closed mesh given as triangles.
///
/// When every fixed direction is degenerate the search moves on to the
/// directions `(1, k, k²)`, `k = 1, 2, ...`. Each degeneracy against one
/// non-degenerate triangle is a nonzero quadratic in `k`, so a triangle
/// spoils at most eight of them and the search ends within `8n + 1` steps.
#[must_use]
pub(crate) fn classify_point_in_triangles(
    triangles: &[Triangle3],
    p: &Point3,
) -> PointClassification {
    if triangles
        .iter()
        .any(|t| classify_point_in_triangle_3d(p, t) != PointClassification::Outside)
    {
        return PointClassification::OnBoundary;
    }
    for (dx, dy, dz) in RAY_DIRECTIONS {
        let direction = Vector3::new(ft(dx), ft(dy), ft(dz));
        if let Some(c) = cast_all(p, &direction, triangles) {
            return c;
        }
        trace!(?direction, "degenerate ray, retrying");
    }
    debug!("every fixed ray direction is degenerate, walking the moment curve");
    let mut k = 0i64;
    loop {
        k += 1;
        let direction = Vector3::new(ft(1), ft(k), ft(k) * ft(k));
        if let Some(c) = cast_all(p, &direction, triangles) {
            return c;
        }
    }
}
