//! Topological boundary of a geometry.

use std::collections::HashMap;

use super::coordinate::Position;
use super::{
    Geometry, LineString, MultiLineString, MultiPoint, Point, Polygon, Triangle,
};
use crate::error::{OperationError, Result};

/// Computes the boundary of `g`.
///
/// # Errors
///
/// Returns [`OperationError::Unsupported`] for solids and geometry
/// collections.
pub fn boundary(g: &Geometry) -> Result<Geometry> {
    let result = match g {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Geometry::empty_collection(),
        Geometry::LineString(l) => line_string_boundary(l),
        Geometry::Polygon(p) => polygon_boundary(p),
        Geometry::Triangle(t) => triangle_boundary(t),
        Geometry::MultiLineString(m) => lines_boundary(m.geometries()),
        Geometry::MultiPolygon(m) => faces_boundary(m.geometries().iter().flat_map(face_rings)),
        Geometry::PolyhedralSurface(s) => {
            faces_boundary(s.polygons().iter().flat_map(face_rings))
        }
        Geometry::TriangulatedSurface(s) => faces_boundary(
            s.triangles()
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| t.vertices().to_vec()),
        ),
        Geometry::Solid(_) | Geometry::MultiSolid(_) | Geometry::GeometryCollection(_) => {
            return Err(OperationError::Unsupported(format!(
                "boundary of {}",
                g.geometry_type().name()
            ))
            .into());
        }
    };
    Ok(result)
}

fn line_string_boundary(l: &LineString) -> Geometry {
    if l.is_empty() || l.is_closed() {
        return Geometry::empty_collection();
    }
    match (l.start_point(), l.end_point()) {
        (Some(a), Some(b)) => Geometry::MultiPoint(MultiPoint::new(vec![a.clone(), b.clone()])),
        _ => Geometry::empty_collection(),
    }
}

fn polygon_boundary(p: &Polygon) -> Geometry {
    if p.is_empty() {
        Geometry::empty_collection()
    } else if p.num_interior_rings() == 0 {
        Geometry::LineString(p.exterior_ring().clone())
    } else {
        Geometry::MultiLineString(MultiLineString::new(p.rings().to_vec()))
    }
}

fn triangle_boundary(t: &Triangle) -> Geometry {
    if t.is_empty() {
        return Geometry::empty_collection();
    }
    let [a, b, c] = t.vertices();
    Geometry::LineString(LineString::new(vec![a.clone(), b.clone(), c.clone(), a.clone()]))
}

/// Endpoints of odd degree, in first-seen order (mod-2 rule).
fn lines_boundary(lines: &[LineString]) -> Geometry {
    let mut degree: HashMap<&Position, usize> = HashMap::new();
    let mut order: Vec<&Point> = Vec::new();
    for line in lines.iter().filter(|l| !l.is_empty()) {
        for end in [line.start_point(), line.end_point()].into_iter().flatten() {
            let count = degree.entry(end.coordinate().position()).or_insert(0);
            if *count == 0 {
                order.push(end);
            }
            *count += 1;
        }
    }
    let points: Vec<Point> = order
        .into_iter()
        .filter(|p| degree.get(p.coordinate().position()).is_some_and(|d| d % 2 == 1))
        .cloned()
        .collect();
    if points.is_empty() {
        Geometry::empty_collection()
    } else {
        Geometry::MultiPoint(MultiPoint::new(points))
    }
}

fn face_rings(p: &Polygon) -> Vec<Vec<Point>> {
    p.rings()
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| {
            let mut pts = r.points().to_vec();
            if r.is_closed() {
                pts.pop();
            }
            pts
        })
        .collect()
}

/// Edges used by exactly one face ring.
fn faces_boundary(rings: impl Iterator<Item = Vec<Point>>) -> Geometry {
    let mut uses: HashMap<(Position, Position), usize> = HashMap::new();
    let mut order: Vec<(Point, Point)> = Vec::new();
    for ring in rings {
        let n = ring.len();
        for i in 0..n {
            let a = &ring[i];
            let b = &ring[(i + 1) % n];
            if a.same_position(b) {
                continue;
            }
            let (pa, pb) = (a.coordinate().position().clone(), b.coordinate().position().clone());
            let key = if pa <= pb { (pa, pb) } else { (pb, pa) };
            let count = uses.entry(key).or_insert(0);
            if *count == 0 {
                order.push((a.clone(), b.clone()));
            }
            *count += 1;
        }
    }
    let edges: Vec<LineString> = order
        .into_iter()
        .filter(|(a, b)| {
            let (pa, pb) = (a.coordinate().position().clone(), b.coordinate().position().clone());
            let key = if pa <= pb { (pa, pb) } else { (pb, pa) };
            uses.get(&key) == Some(&1)
        })
        .map(|(a, b)| LineString::new(vec![a, b]))
        .collect();
    if edges.is_empty() {
        Geometry::empty_collection()
    } else {
        Geometry::MultiLineString(MultiLineString::new(edges))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SfgeomError;
    use crate::geometry::{GeometryCollection, PolyhedralSurface, Solid};
    use crate::math::Point2;

    fn ls(points: &[(i64, i64)]) -> LineString {
        LineString::from_points2(points.iter().map(|&(x, y)| Point2::from_i64(x, y)))
    }

    fn square(x: i64, y: i64) -> Polygon {
        Polygon::new(ls(&[(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1), (x, y)]))
    }

    #[test]
    fn open_and_closed_line_strings() {
        let open = Geometry::from(ls(&[(0, 0), (1, 0), (1, 1)]));
        match boundary(&open).unwrap() {
            Geometry::MultiPoint(m) => assert_eq!(m.num_geometries(), 2),
            other => panic!("unexpected {other:?}"),
        }
        let closed = Geometry::from(ls(&[(0, 0), (1, 0), (1, 1), (0, 0)]));
        assert!(boundary(&closed).unwrap().is_empty());
    }

    #[test]
    fn polygon_rings() {
        let p = Geometry::from(square(0, 0));
        assert_eq!(boundary(&p).unwrap().geometry_type_id(), 2);
        let mut holed = Polygon::new(ls(&[(0, 0), (5, 0), (5, 5), (0, 5), (0, 0)]));
        holed.add_interior_ring(ls(&[(1, 1), (2, 1), (2, 2), (1, 2), (1, 1)]));
        match boundary(&Geometry::from(holed)).unwrap() {
            Geometry::MultiLineString(m) => assert_eq!(m.num_geometries(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn triangle_ring_has_four_points() {
        let t = Triangle::from_triangle2(&crate::math::Triangle2::new(
            Point2::from_i64(0, 0),
            Point2::from_i64(1, 0),
            Point2::from_i64(0, 1),
        ));
        match boundary(&Geometry::from(t)).unwrap() {
            Geometry::LineString(l) => {
                assert_eq!(l.num_points(), 4);
                assert!(l.is_closed());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn multi_line_string_uses_mod_two_rule() {
        let m = MultiLineString::new(vec![ls(&[(0, 0), (1, 0)]), ls(&[(1, 0), (2, 0)])]);
        match boundary(&Geometry::from(m)).unwrap() {
            Geometry::MultiPoint(m) => {
                assert_eq!(m.num_geometries(), 2);
                assert_eq!(m.geometries()[0].to_point2(), Some(Point2::from_i64(0, 0)));
                assert_eq!(m.geometries()[1].to_point2(), Some(Point2::from_i64(2, 0)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn shared_edges_are_interior() {
        let s = PolyhedralSurface::new(vec![square(0, 0), square(1, 0)]);
        match boundary(&Geometry::from(s)).unwrap() {
            Geometry::MultiLineString(m) => assert_eq!(m.num_geometries(), 6),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn solids_and_collections_are_unsupported() {
        for g in [
            Geometry::from(Solid::empty()),
            Geometry::from(GeometryCollection::empty()),
        ] {
            assert!(matches!(
                boundary(&g),
                Err(SfgeomError::Operation(OperationError::Unsupported(_)))
            ));
        }
    }
}
