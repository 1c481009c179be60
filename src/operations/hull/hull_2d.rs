use tracing::debug;

use crate::geometry::{Geometry, GeometryVisitor, LineString, Point, Polygon, Triangle};
use crate::math::predicates::{orient2d, Orientation};
use crate::math::Point2;

/// Collects the xy positions of every non-empty point.
#[derive(Debug, Default)]
struct PlanarPoints(Vec<Point2>);

impl GeometryVisitor for PlanarPoints {
    fn visit_point(&mut self, g: &Point) {
        self.0.extend(g.to_point2());
    }
}

/// Andrew's monotone chain over exact points.
///
/// Returns the hull vertices counter-clockwise without collinear points.
/// Collinear input yields its two extreme points, a single distinct point
/// yields itself.
pub(crate) fn monotone_chain(mut points: Vec<Point2>) -> Vec<Point2> {
    points.sort();
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut hull: Vec<Point2> = Vec::with_capacity(points.len() + 1);
    let half = |hull: &mut Vec<Point2>, p: &Point2, floor: usize| {
        while hull.len() >= floor + 2
            && orient2d(&hull[hull.len() - 2], &hull[hull.len() - 1], p)
                != Orientation::CounterClockwise
        {
            hull.pop();
        }
        hull.push(p.clone());
    };
    for p in &points {
        half(&mut hull, p, 0);
    }
    let lower = hull.len() - 1;
    for p in points.iter().rev().skip(1) {
        half(&mut hull, p, lower);
    }
    hull.pop();
    hull
}

/// Simplest geometry spanning a counter-clockwise hull.
pub(crate) fn hull_geometry(hull: &[Point2]) -> Geometry {
    match hull {
        [] => Geometry::empty_collection(),
        [p] => Geometry::from(Point::from_point2(p.clone())),
        [a, b] => Geometry::from(LineString::from_points2([a.clone(), b.clone()])),
        [a, b, c] => Geometry::from(Triangle::new(
            Point::from_point2(a.clone()),
            Point::from_point2(b.clone()),
            Point::from_point2(c.clone()),
        )),
        _ => Geometry::from(Polygon::new(LineString::from_points2(
            hull.iter().chain(hull.first()).cloned(),
        ))),
    }
}

/// Convex hull of the xy positions of `g`: a Point, LineString, Triangle or
/// Polygon depending on how many hull vertices remain. An empty input
/// gives an empty collection.
#[must_use]
pub fn convex_hull(g: &Geometry) -> Geometry {
    let mut points = PlanarPoints::default();
    g.accept(&mut points);
    let hull = monotone_chain(points.0);
    debug!(vertices = hull.len(), "convex hull");
    hull_geometry(&hull)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryType, MultiPoint};

    fn multi_point(points: &[(f64, f64)]) -> Geometry {
        Geometry::from(MultiPoint::new(
            points.iter().map(|&(x, y)| Point::xy(x, y).unwrap()).collect(),
        ))
    }

    #[test]
    fn point_on_an_edge_is_dropped() {
        let hull = convex_hull(&multi_point(&[(0.0, 0.0), (0.5, 0.5), (1.0, 0.0), (0.0, 1.0)]));
        let Geometry::Triangle(t) = hull else { panic!("triangle expected") };
        let t = t.to_triangle2().unwrap();
        assert!(t.signed_area() > crate::math::ft(0));
        assert!(t.vertices.contains(&Point2::from_i64(0, 1)));
    }

    #[test]
    fn result_types_follow_the_vertex_count() {
        assert!(convex_hull(&Geometry::empty_collection()).is_empty());
        assert_eq!(
            convex_hull(&multi_point(&[(1.0, 1.0), (1.0, 1.0)])).geometry_type(),
            GeometryType::Point
        );
        assert_eq!(
            convex_hull(&multi_point(&[(0.0, 0.0), (1.0, 1.0), (3.0, 3.0)])).geometry_type(),
            GeometryType::LineString
        );
        let square = convex_hull(&multi_point(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (1.0, 1.0),
            (2.0, 2.0),
            (0.0, 2.0),
        ]));
        let Geometry::Polygon(p) = square else { panic!("polygon expected") };
        assert_eq!(p.exterior_ring().num_points(), 5);
        assert!(p.exterior_ring().is_closed());
    }

    #[test]
    fn chain_is_counter_clockwise() {
        let p = Point2::from_i64;
        let hull = monotone_chain(vec![p(2, 2), p(0, 0), p(2, 0), p(0, 2), p(1, 0)]);
        assert_eq!(hull, vec![p(0, 0), p(2, 0), p(2, 2), p(0, 2)]);
    }
}
