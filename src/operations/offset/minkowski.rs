use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::{Geometry, GeometryVisitor, MultiPolygon, Polygon, Solid};
use crate::math::polygon_2d::oriented_ring;
use crate::math::polygon_set_2d::union_all;
use crate::math::{Point2, PolygonWithHoles2, Triangle2};
use crate::operations::hull::monotone_chain;
use crate::set::dim2::{polygon_from_exact, polygon_to_exact};
use crate::set::{Dim2, GeometrySet};
use crate::tessellation::triangulate_polygon_2d;

#[derive(Debug, Default)]
struct HasSolid(bool);

impl GeometryVisitor for HasSolid {
    fn visit_solid(&mut self, _g: &Solid) {
        self.0 = true;
    }
}

fn sum(a: &Point2, b: &Point2) -> Point2 {
    Point2::new(&a.x + &b.x, &a.y + &b.y)
}

/// Convex hull of every pairwise sum, as a surface. `None` when the sums
/// are collinear.
fn hull_of_sums(a: &[Point2], b: &[Point2]) -> Option<PolygonWithHoles2> {
    let sums = a.iter().flat_map(|p| b.iter().map(move |q| sum(p, q))).collect();
    let hull = monotone_chain(sums);
    (hull.len() >= 3).then(|| PolygonWithHoles2::from_outer(hull))
}

/// Planar Minkowski sum `a ⊕ b`.
///
/// `b` contributes its exterior ring only. `a` is decomposed into points,
/// segments and surfaces; each part is summed with the triangles of `b`
/// and the convex pieces are merged. Z coordinates are dropped.
///
/// # Errors
///
/// Returns [`OperationError::Unsupported`] when `a` holds a solid, and
/// propagates triangulation failures.
pub fn minkowski_sum(a: &Geometry, b: &Polygon) -> Result<MultiPolygon> {
    let mut solids = HasSolid::default();
    a.accept(&mut solids);
    if solids.0 {
        return Err(OperationError::Unsupported("minkowski sum of a solid".into()).into());
    }
    let outer = polygon_to_exact(b).outer;
    if a.is_empty() || outer.len() < 3 {
        return Ok(MultiPolygon::empty());
    }
    let outer = oriented_ring(outer, true);
    let brush: Vec<Triangle2> =
        triangulate_polygon_2d(&PolygonWithHoles2::from_outer(outer.clone()))?;

    let set = GeometrySet::<Dim2>::from_geometry(a)?;
    let mut pieces: Vec<PolygonWithHoles2> = Vec::new();
    for e in set.points() {
        let p = e.primitive();
        pieces.push(PolygonWithHoles2::from_outer(outer.iter().map(|q| sum(p, q)).collect()));
    }
    for e in set.segments() {
        let s = e.primitive();
        let ends = [s.source.clone(), s.target.clone()];
        pieces.extend(brush.iter().filter_map(|t| hull_of_sums(&ends, &t.vertices)));
    }
    for e in set.surfaces() {
        for t in triangulate_polygon_2d(e.primitive())? {
            pieces.extend(brush.iter().filter_map(|u| hull_of_sums(&t.vertices, &u.vertices)));
        }
    }
    debug!(pieces = pieces.len(), brush = brush.len(), "minkowski sum");

    let merged = union_all(&pieces);
    Ok(MultiPolygon::new(merged.iter().map(polygon_from_exact).collect()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::SfgeomError;
    use crate::geometry::{LineString, MultiPoint, Point};
    use crate::operations::query::area;

    fn p(x: i64, y: i64) -> Point2 {
        Point2::from_i64(x, y)
    }

    fn ring(points: &[(i64, i64)]) -> LineString {
        let mut points: Vec<Point2> = points.iter().map(|&(x, y)| p(x, y)).collect();
        points.push(points[0].clone());
        LineString::from_points2(points)
    }

    fn unit_square() -> Polygon {
        Polygon::new(ring(&[(0, 0), (1, 0), (1, 1), (0, 1)]))
    }

    #[test]
    fn point_translates_the_brush() {
        let g = Geometry::Point(Point::from_point2(p(3, 4)));
        let result = minkowski_sum(&g, &unit_square()).unwrap();
        assert_eq!(result.geometries().len(), 1);
        let exact = polygon_to_exact(&result.geometries()[0]);
        assert!(exact.outer.contains(&p(3, 4)));
        assert!(exact.outer.contains(&p(4, 5)));
        assert_eq!(exact.area(), crate::math::ft(1));
    }

    #[test]
    fn square_with_hole_keeps_a_smaller_hole() {
        let g = Geometry::Polygon(Polygon::with_holes(
            ring(&[(0, 0), (10, 0), (10, 10), (0, 10)]),
            vec![ring(&[(4, 4), (4, 6), (6, 6), (6, 4)])],
        ));
        let result = minkowski_sum(&g, &unit_square()).unwrap();
        assert_eq!(result.geometries().len(), 1);
        assert_eq!(result.geometries()[0].num_interior_rings(), 1);
        assert_relative_eq!(area(&Geometry::MultiPolygon(result)).unwrap(), 120.0);
    }

    #[test]
    fn distant_points_stay_apart() {
        let g = Geometry::MultiPoint(MultiPoint::new(vec![
            Point::from_point2(p(0, 0)),
            Point::from_point2(p(5, 0)),
        ]));
        let result = minkowski_sum(&g, &unit_square()).unwrap();
        assert_eq!(result.geometries().len(), 2);
    }

    #[test]
    fn solids_are_unsupported() {
        let cube = crate::operations::shaping::extrude(
            &Geometry::Polygon(unit_square()),
            0.0,
            0.0,
            1.0,
        )
        .unwrap();
        let err = minkowski_sum(&cube, &unit_square()).unwrap_err();
        assert!(matches!(err, SfgeomError::Operation(OperationError::Unsupported(_))));
    }

    #[test]
    fn empty_brush_gives_empty_result() {
        let g = Geometry::Point(Point::from_point2(p(0, 0)));
        assert!(minkowski_sum(&g, &Polygon::empty()).unwrap().is_empty());
    }
}
