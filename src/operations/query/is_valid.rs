use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::geometry::{
    Geometry, LineString, MultiPolygon, Polygon, PolyhedralSurface, Solid, Triangle,
    TriangulatedSurface,
};
use crate::math::intersect_2d::{intersect_segments_2d, SegmentIntersection2};
use crate::math::number::sign;
use crate::math::polygon_2d::{open_ring, ring_edges, ring_signed_area};
use crate::math::polygon_set_2d::{overlay, SetOperation};
use crate::math::predicates::{classify_point_in_ring, PointClassification};
use crate::math::projection::ProjectionPlane;
use crate::math::{Point2, Point3, Segment2};
use crate::polyhedron::Polyhedron;
use crate::set::dim2::polygon_to_exact;
use crate::spatial::{equivalence_classes, Bbox};
use crate::tessellation::{
    open_ring_3d, polygon_rings_3d, supporting_plane, triangulate_polyhedral_surface,
};

/// Outcome of [`is_valid`], with the first violation found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validity {
    reason: Option<String>,
}

impl Validity {
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.reason.is_none()
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

type Check = std::result::Result<(), String>;

/// Checks the validity rules of the simple feature model.
///
/// - line strings have two distinct points at least;
/// - rings have four points at least, are closed, simple and not flat;
/// - holes lie inside the exterior and outside each other, two rings touch
///   at one point at most, polygons in space are planar;
/// - polygons of a multipolygon do not overlap;
/// - polyhedral and triangulated surfaces are connected, edge-manifold and
///   consistently oriented;
/// - solid shells are closed, oriented outward, interior shells inside the
///   exterior one.
///
/// Empty geometries are valid.
#[must_use]
pub fn is_valid(g: &Geometry) -> Validity {
    match check_geometry(g) {
        Ok(()) => Validity::valid(),
        Err(reason) => {
            debug!(kind = g.geometry_type().name(), %reason, "invalid geometry");
            Validity::invalid(reason)
        }
    }
}

fn check_geometry(g: &Geometry) -> Check {
    match g {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Ok(()),
        Geometry::LineString(l) => check_line_string(l),
        Geometry::Polygon(p) => check_polygon(p),
        Geometry::Triangle(t) => check_triangle(t),
        Geometry::PolyhedralSurface(s) => check_polyhedral_surface(s).map(|_| ()),
        Geometry::TriangulatedSurface(s) => check_triangulated_surface(s),
        Geometry::Solid(s) => check_solid(s),
        Geometry::MultiLineString(m) => each(m.geometries(), "line string", check_line_string),
        Geometry::MultiPolygon(m) => check_multi_polygon(m),
        Geometry::MultiSolid(m) => each(m.geometries(), "solid", check_solid),
        Geometry::GeometryCollection(c) => each(c.geometries(), "geometry", check_geometry),
    }
}

fn each<T>(parts: &[T], what: &str, check: impl Fn(&T) -> Check) -> Check {
    for (i, part) in parts.iter().enumerate() {
        check(part).map_err(|reason| format!("{what} {i}: {reason}"))?;
    }
    Ok(())
}

fn check_line_string(l: &LineString) -> Check {
    if l.is_empty() {
        return Ok(());
    }
    if l.num_points() < 2 {
        return Err("line string with less than 2 points".into());
    }
    let mut points = l.exact_points3();
    points.dedup();
    if points.len() < 2 {
        return Err("line string of coincident points".into());
    }
    Ok(())
}

fn check_triangle(t: &Triangle) -> Check {
    match t.to_triangle3() {
        Some(t) if t.is_degenerate() => Err("degenerate triangle".into()),
        _ => Ok(()),
    }
}

/// Open rings of a polygon in its own plane.
fn planar_rings(p: &Polygon) -> std::result::Result<Vec<Vec<Point2>>, String> {
    if !p.is_3d() {
        return Ok(p.rings().iter().map(|r| open_ring(&r.exact_points2())).collect());
    }
    let rings = polygon_rings_3d(p);
    let exterior = rings.first().map(Vec::as_slice).unwrap_or_default();
    let plane = supporting_plane(exterior).map_err(|_| "degenerate exterior ring".to_string())?;
    if !rings.iter().flatten().all(|q| plane.has_on(q)) {
        return Err("polygon is not planar".into());
    }
    let projection = ProjectionPlane::new(plane);
    Ok(rings
        .iter()
        .map(|r| r.iter().map(|q| projection.project(q)).collect())
        .collect())
}

fn check_ring_simple(ring: &[Point2]) -> Check {
    let edges: Vec<Segment2> = ring_edges(ring).collect();
    let n = edges.len();
    for i in 0..n {
        for j in i + 1..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match intersect_segments_2d(&edges[i], &edges[j]) {
                SegmentIntersection2::None => {}
                SegmentIntersection2::Point(_) if adjacent => {}
                SegmentIntersection2::Point(_) | SegmentIntersection2::Segment(_) => {
                    return Err("self-intersects".into());
                }
            }
        }
    }
    Ok(())
}

fn check_ring_contacts(a: &[Point2], b: &[Point2]) -> Check {
    let mut contacts = Vec::new();
    for ea in ring_edges(a) {
        for eb in ring_edges(b) {
            match intersect_segments_2d(&ea, &eb) {
                SegmentIntersection2::None => {}
                SegmentIntersection2::Point(p) => contacts.push(p),
                SegmentIntersection2::Segment(_) => return Err("overlap".into()),
            }
        }
    }
    contacts.sort();
    contacts.dedup();
    if contacts.len() > 1 {
        return Err("touch at more than one point".into());
    }
    Ok(())
}

fn check_rings(rings: &[Vec<Point2>]) -> Check {
    for (i, ring) in rings.iter().enumerate() {
        if ring.len() < 3 || sign(&ring_signed_area(ring)) == Ordering::Equal {
            return Err(format!("ring {i} is degenerate"));
        }
        check_ring_simple(ring).map_err(|e| format!("ring {i} {e}"))?;
    }
    let Some((exterior, holes)) = rings.split_first() else {
        return Ok(());
    };
    for (i, hole) in holes.iter().enumerate() {
        if hole
            .iter()
            .any(|q| classify_point_in_ring(q, exterior) == PointClassification::Outside)
        {
            return Err(format!("hole {i} is outside the exterior ring"));
        }
    }
    for i in 0..rings.len() {
        for j in i + 1..rings.len() {
            check_ring_contacts(&rings[i], &rings[j])
                .map_err(|e| format!("rings {i} and {j} {e}"))?;
        }
    }
    for (i, hole) in holes.iter().enumerate() {
        for (j, other) in holes.iter().enumerate() {
            if i != j
                && hole
                    .iter()
                    .any(|q| classify_point_in_ring(q, other) == PointClassification::Inside)
            {
                return Err(format!("hole {i} is nested in hole {j}"));
            }
        }
    }
    Ok(())
}

fn check_polygon(p: &Polygon) -> Check {
    if p.is_empty() {
        return Ok(());
    }
    for (i, ring) in p.rings().iter().enumerate() {
        if ring.num_points() < 4 {
            return Err(format!("ring {i} has less than 4 points"));
        }
        if !ring.is_closed() {
            return Err(format!("ring {i} is not closed"));
        }
    }
    check_rings(&planar_rings(p)?)
}

fn check_multi_polygon(m: &MultiPolygon) -> Check {
    each(m.geometries(), "polygon", check_polygon)?;
    if m.is_3d() {
        return Ok(());
    }
    let exact: Vec<_> = m
        .geometries()
        .iter()
        .filter(|p| !p.is_empty())
        .map(polygon_to_exact)
        .collect();
    let boxes: Vec<Bbox> = exact.iter().map(|p| Bbox::from_points_2d(p.vertices())).collect();
    for i in 0..exact.len() {
        for j in i + 1..exact.len() {
            if !boxes[i].intersects(&boxes[j]) {
                continue;
            }
            let common = overlay(&exact[i..=i], &exact[j..=j], SetOperation::Intersection);
            if common.iter().any(|c| sign(&c.area()) == Ordering::Greater) {
                return Err(format!("polygons {i} and {j} overlap"));
            }
        }
    }
    Ok(())
}

/// Edge topology of faces given as open rings: every directed edge is used
/// once, an edge bounds two faces at most, and the faces are connected.
/// Returns whether every edge bounds exactly two faces.
fn check_surface_topology(faces: &[Vec<Vec<Point3>>]) -> std::result::Result<bool, String> {
    let mut directed: HashSet<(&Point3, &Point3)> = HashSet::new();
    let mut faces_of_edge: HashMap<(&Point3, &Point3), Vec<usize>> = HashMap::new();
    for (f, rings) in faces.iter().enumerate() {
        for ring in rings {
            let n = ring.len();
            for k in 0..n {
                let (a, b) = (&ring[k], &ring[(k + 1) % n]);
                if !directed.insert((a, b)) {
                    return Err(format!("face {f} repeats an oriented edge"));
                }
                let key = if a < b { (a, b) } else { (b, a) };
                faces_of_edge.entry(key).or_default().push(f);
            }
        }
    }

    let mut closed = true;
    let mut shared = Vec::new();
    for adjacent in faces_of_edge.values() {
        if adjacent.len() > 2 {
            return Err("edge shared by more than two faces".into());
        }
        closed &= adjacent.len() == 2;
        shared.extend(adjacent.windows(2).map(|pair| (pair[0], pair[1])));
    }
    let parts = equivalence_classes(faces.len(), shared).len();
    if parts > 1 {
        return Err(format!("surface has {parts} disconnected parts"));
    }
    Ok(closed)
}

fn check_polyhedral_surface(s: &PolyhedralSurface) -> std::result::Result<bool, String> {
    each(s.polygons(), "polygon", check_polygon)?;
    let faces: Vec<Vec<Vec<Point3>>> = s
        .polygons()
        .iter()
        .filter(|p| !p.is_empty())
        .map(polygon_rings_3d)
        .collect();
    check_surface_topology(&faces)
}

fn check_triangulated_surface(s: &TriangulatedSurface) -> Check {
    each(s.triangles(), "triangle", check_triangle)?;
    let faces: Vec<Vec<Vec<Point3>>> = s
        .triangles()
        .iter()
        .filter_map(Triangle::to_triangle3)
        .map(|t| vec![open_ring_3d(&t.vertices)])
        .collect();
    check_surface_topology(&faces).map(|_| ())
}

fn check_solid(s: &Solid) -> Check {
    if s.is_empty() {
        return Ok(());
    }
    let mut exterior: Option<Polyhedron> = None;
    for (i, shell) in s.shells().iter().enumerate() {
        let closed = check_polyhedral_surface(shell).map_err(|e| format!("shell {i}: {e}"))?;
        if !closed {
            return Err(format!("shell {i} is not closed"));
        }
        let polyhedron = triangulate_polyhedral_surface(shell)
            .and_then(|triangles| Polyhedron::from_triangles(&triangles))
            .map_err(|e| format!("shell {i}: {e}"))?;
        if sign(&polyhedron.volume()) != Ordering::Greater {
            return Err(format!("shell {i} is not oriented outward"));
        }
        match &exterior {
            None => exterior = Some(polyhedron),
            Some(outer) => {
                let inside = polyhedron
                    .vertices()
                    .first()
                    .is_some_and(|q| outer.classify_point(q) == PointClassification::Inside);
                if !inside {
                    return Err(format!("shell {i} is outside the exterior shell"));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn ring2(points: &[(i64, i64)]) -> LineString {
        LineString::from_points2(points.iter().map(|&(x, y)| Point2::from_i64(x, y)))
    }

    fn square(x: i64, y: i64, size: i64) -> LineString {
        ring2(&[(x, y), (x + size, y), (x + size, y + size), (x, y + size), (x, y)])
    }

    fn reason(g: impl Into<Geometry>) -> Option<String> {
        is_valid(&g.into()).reason().map(str::to_string)
    }

    fn unit_cube_faces(flip: bool) -> PolyhedralSurface {
        let v = |x: i64, y: i64, z: i64| Point3::from_i64(x, y, z);
        let quads = [
            [v(0, 0, 0), v(0, 1, 0), v(1, 1, 0), v(1, 0, 0)],
            [v(0, 0, 1), v(1, 0, 1), v(1, 1, 1), v(0, 1, 1)],
            [v(0, 0, 0), v(1, 0, 0), v(1, 0, 1), v(0, 0, 1)],
            [v(0, 1, 0), v(0, 1, 1), v(1, 1, 1), v(1, 1, 0)],
            [v(0, 0, 0), v(0, 0, 1), v(0, 1, 1), v(0, 1, 0)],
            [v(1, 0, 0), v(1, 1, 0), v(1, 1, 1), v(1, 0, 1)],
        ];
        PolyhedralSurface::new(
            quads
                .iter()
                .map(|q| {
                    let mut ring: Vec<Point3> = q.to_vec();
                    if flip {
                        ring.reverse();
                    }
                    ring.push(ring[0].clone());
                    Polygon::new(LineString::from_points3(ring))
                })
                .collect(),
        )
    }

    #[test]
    fn simple_polygons_are_valid() {
        assert_eq!(reason(Polygon::new(square(0, 0, 4))), None);
        let holed = Polygon::with_holes(square(0, 0, 5), vec![square(1, 1, 1), square(3, 3, 1)]);
        assert_eq!(reason(holed), None);
        assert_eq!(reason(Polygon::empty()), None);
    }

    #[test]
    fn ring_rules() {
        let short = Polygon::new(ring2(&[(0, 0), (1, 0), (0, 0)]));
        assert!(reason(short).unwrap().contains("less than 4"));
        let open = Polygon::new(ring2(&[(0, 0), (1, 0), (1, 1), (0, 1)]));
        assert!(reason(open).unwrap().contains("not closed"));
        let bow_tie = Polygon::new(ring2(&[(0, 0), (2, 2), (2, 0), (0, 2), (0, 0)]));
        assert!(reason(bow_tie).is_some());
        let figure_eight = Polygon::new(ring2(&[
            (0, 0),
            (2, 0),
            (2, 2),
            (4, 2),
            (4, 4),
            (2, 4),
            (2, 2),
            (0, 2),
            (0, 0),
        ]));
        assert!(reason(figure_eight).unwrap().contains("self-intersects"));
    }

    #[test]
    fn hole_rules() {
        let outside = Polygon::with_holes(square(0, 0, 2), vec![square(5, 5, 1)]);
        assert!(reason(outside).unwrap().contains("outside"));
        let crossing = Polygon::with_holes(square(0, 0, 4), vec![square(3, 1, 2)]);
        assert!(reason(crossing).is_some());
        let nested = Polygon::with_holes(square(0, 0, 10), vec![square(1, 1, 6), square(2, 2, 1)]);
        assert!(reason(nested).unwrap().contains("nested"));
        let touching =
            Polygon::with_holes(square(0, 0, 4), vec![ring2(&[(0, 0), (2, 1), (1, 2), (0, 0)])]);
        assert_eq!(reason(touching), None);
    }

    #[test]
    fn polygons_in_space_must_be_planar() {
        let skew = Polygon::new(LineString::from_points3(
            [(0, 0, 0), (1, 0, 0), (1, 1, 1), (0, 1, 0), (0, 0, 0)]
                .iter()
                .map(|&(x, y, z)| Point3::from_i64(x, y, z)),
        ));
        assert!(reason(skew).unwrap().contains("planar"));
    }

    #[test]
    fn multipolygon_parts_must_not_overlap() {
        let apart =
            MultiPolygon::new(vec![Polygon::new(square(0, 0, 1)), Polygon::new(square(1, 0, 1))]);
        assert_eq!(reason(apart), None);
        let overlapping =
            MultiPolygon::new(vec![Polygon::new(square(0, 0, 2)), Polygon::new(square(1, 1, 2))]);
        assert!(reason(overlapping).unwrap().contains("overlap"));
    }

    #[test]
    fn surface_and_solid_rules() {
        assert_eq!(reason(unit_cube_faces(false)), None);
        assert_eq!(reason(Solid::new(unit_cube_faces(false))), None);
        assert!(reason(Solid::new(unit_cube_faces(true))).unwrap().contains("outward"));

        let mut open = unit_cube_faces(false);
        let mut faces = open.polygons().to_vec();
        faces.pop();
        open = PolyhedralSurface::new(faces);
        assert_eq!(reason(open.clone()), None);
        assert!(reason(Solid::new(open)).unwrap().contains("not closed"));

        let mut mixed = unit_cube_faces(false).polygons().to_vec();
        mixed[0] = Polygon::new(mixed[0].exterior_ring().reversed());
        assert!(reason(PolyhedralSurface::new(mixed)).unwrap().contains("oriented edge"));
    }

    #[test]
    fn line_strings_and_collections() {
        let dot = LineString::new(vec![Point::xy(1.0, 1.0).unwrap(), Point::xy(1.0, 1.0).unwrap()]);
        assert!(reason(dot.clone()).is_some());
        let gc = crate::geometry::GeometryCollection::new(vec![
            Geometry::from(Point::empty()),
            Geometry::from(dot),
        ]);
        assert!(reason(gc).unwrap().starts_with("geometry 1"));
    }
}
