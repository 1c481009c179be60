use std::cmp::Ordering;

use num_traits::{Signed, Zero};

use super::number::{ft, sign, Ft};
use super::point::Point2;
use super::predicates::{classify_point_in_ring, PointClassification};
use super::primitives::{Segment2, Triangle2};

/// Polygon with holes, rings stored open (no repeated closing vertex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PolygonWithHoles2 {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

/// Shoelace signed area of an open ring, positive when counter-clockwise.
#[must_use]
pub fn ring_signed_area(ring: &[Point2]) -> Ft {
    let n = ring.len();
    if n < 3 {
        return Ft::zero();
    }
    let mut sum = Ft::zero();
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        sum += &a.x * &b.y - &b.x * &a.y;
    }
    sum / ft(2)
}

/// Edges of an open ring, closing edge included.
pub fn ring_edges(ring: &[Point2]) -> impl Iterator<Item = Segment2> + '_ {
    let n = ring.len();
    (0..n).map(move |i| Segment2::new(ring[i].clone(), ring[(i + 1) % n].clone()))
}

/// Drops the closing vertex and consecutive duplicates of a ring.
#[must_use]
pub fn open_ring(points: &[Point2]) -> Vec<Point2> {
    let mut ring = points.to_vec();
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Reverses the ring when its orientation differs from the requested one.
#[must_use]
pub fn oriented_ring(mut ring: Vec<Point2>, counter_clockwise: bool) -> Vec<Point2> {
    let s = sign(&ring_signed_area(&ring));
    let wrong = if counter_clockwise { Ordering::Less } else { Ordering::Greater };
    if s == wrong {
        ring.reverse();
    }
    ring
}

/// Even-odd classification of `p` against a set of rings.
#[must_use]
pub fn classify_point_in_rings(p: &Point2, rings: &[&[Point2]]) -> PointClassification {
    let mut inside = false;
    for ring in rings {
        match classify_point_in_ring(p, ring) {
            PointClassification::OnBoundary => return PointClassification::OnBoundary,
            PointClassification::Inside => inside = !inside,
            PointClassification::Outside => {}
        }
    }
    if inside {
        PointClassification::Inside
    } else {
        PointClassification::Outside
    }
}

/// A point strictly inside the even-odd region bounded by `rings`.
///
/// Scans a horizontal line halfway between two consecutive vertex ordinates;
/// the first pair of sorted crossings bounds an interior interval.
#[must_use]
pub fn interior_point(rings: &[&[Point2]]) -> Option<Point2> {
    let mut ys: Vec<&Ft> = rings.iter().flat_map(|r| r.iter().map(|p| &p.y)).collect();
    ys.sort();
    ys.dedup();
    let two = ft(2);
    for pair in ys.windows(2) {
        let y0 = (pair[0] + pair[1]) / &two;
        let mut xs: Vec<Ft> = Vec::new();
        for ring in rings {
            for edge in ring_edges(ring) {
                let (a, b) = (&edge.source, &edge.target);
                let crosses = (a.y < y0 && b.y > y0) || (a.y > y0 && b.y < y0);
                if crosses {
                    let x = &a.x + (&y0 - &a.y) * (&b.x - &a.x) / (&b.y - &a.y);
                    xs.push(x);
                }
            }
        }
        xs.sort();
        for chunk in xs.chunks_exact(2) {
            if chunk[0] < chunk[1] {
                let x = (&chunk[0] + &chunk[1]) / &two;
                return Some(Point2::new(x, y0));
            }
        }
    }
    None
}

impl PolygonWithHoles2 {
    #[must_use]
    pub fn new(outer: Vec<Point2>, holes: Vec<Vec<Point2>>) -> Self {
        Self { outer, holes }
    }

    #[must_use]
    pub fn from_outer(outer: Vec<Point2>) -> Self {
        Self::new(outer, Vec::new())
    }

    #[must_use]
    pub fn from_triangle(t: &Triangle2) -> Self {
        Self::from_outer(t.vertices.to_vec())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outer.len() < 3
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &[Point2]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment2> + '_ {
        self.rings().flat_map(ring_edges)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Point2> {
        self.rings().flatten()
    }

    /// Bounded side of a point: holes are excluded, hole boundaries belong
    /// to the polygon boundary.
    #[must_use]
    pub fn bounded_side(&self, p: &Point2) -> PointClassification {
        match classify_point_in_ring(p, &self.outer) {
            PointClassification::Outside => return PointClassification::Outside,
            PointClassification::OnBoundary => return PointClassification::OnBoundary,
            PointClassification::Inside => {}
        }
        for hole in &self.holes {
            match classify_point_in_ring(p, hole) {
                PointClassification::Inside => return PointClassification::Outside,
                PointClassification::OnBoundary => return PointClassification::OnBoundary,
                PointClassification::Outside => {}
            }
        }
        PointClassification::Inside
    }

    /// Exterior counter-clockwise, holes clockwise.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(
            oriented_ring(self.outer.clone(), true),
            self.holes
                .iter()
                .map(|h| oriented_ring(h.clone(), false))
                .collect(),
        )
    }

    /// Exact unsigned area.
    #[must_use]
    pub fn area(&self) -> Ft {
        let holes: Ft = self
            .holes
            .iter()
            .map(|h| ring_signed_area(h).abs())
            .fold(Ft::zero(), |acc, a| acc + a);
        ring_signed_area(&self.outer).abs() - holes
    }

    /// The triangle this polygon is, if it has three vertices and no hole.
    #[must_use]
    pub fn as_triangle(&self) -> Option<Triangle2> {
        match (self.outer.as_slice(), self.holes.is_empty()) {
            ([a, b, c], true) => Some(Triangle2::new(a.clone(), b.clone(), c.clone())),
            _ => None,
        }
    }

    #[must_use]
    pub fn interior_point(&self) -> Option<Point2> {
        let rings: Vec<&[Point2]> = self.rings().collect();
        interior_point(&rings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: i64, y: i64) -> Point2 {
        Point2::from_i64(x, y)
    }

    fn square(x0: i64, y0: i64, size: i64) -> Vec<Point2> {
        vec![
            p(x0, y0),
            p(x0 + size, y0),
            p(x0 + size, y0 + size),
            p(x0, y0 + size),
        ]
    }

    #[test]
    fn signed_area_of_rings() {
        assert_eq!(ring_signed_area(&square(0, 0, 2)), ft(4));
        let mut cw = square(0, 0, 2);
        cw.reverse();
        assert_eq!(ring_signed_area(&cw), ft(-4));
    }

    #[test]
    fn holes_are_outside() {
        let poly = PolygonWithHoles2::new(square(0, 0, 5), vec![square(1, 1, 1)]);
        let centre = Point2::new(ft(3) / ft(2), ft(3) / ft(2));
        assert_eq!(poly.bounded_side(&centre), PointClassification::Outside);
        assert_eq!(poly.bounded_side(&p(3, 3)), PointClassification::Inside);
        assert_eq!(poly.bounded_side(&p(2, 1)), PointClassification::OnBoundary);
        assert_eq!(poly.area(), ft(24));
    }

    #[test]
    fn normalization_orients_rings() {
        let mut outer = square(0, 0, 5);
        outer.reverse();
        let poly = PolygonWithHoles2::new(outer, vec![square(1, 1, 1)]).normalized();
        assert!(ring_signed_area(&poly.outer) > Ft::zero());
        assert!(ring_signed_area(&poly.holes[0]) < Ft::zero());
    }

    #[test]
    fn interior_point_avoids_holes() {
        let poly = PolygonWithHoles2::new(square(0, 0, 4), vec![square(1, 1, 2)]);
        let q = poly.interior_point().unwrap();
        assert_eq!(poly.bounded_side(&q), PointClassification::Inside);
    }

    #[test]
    fn closing_vertex_is_stripped() {
        let ring = open_ring(&[p(0, 0), p(1, 0), p(1, 1), p(0, 0)]);
        assert_eq!(ring.len(), 3);
    }
}
