use super::point::Point;
use crate::math::{Point2, Point3};

/// SFA line string, an ordered sequence of points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    points: Vec<Point>,
}

impl LineString {
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_points2<I: IntoIterator<Item = Point2>>(points: I) -> Self {
        Self::new(points.into_iter().map(Point::from_point2).collect())
    }

    pub fn from_points3<I: IntoIterator<Item = Point3>>(points: I) -> Self {
        Self::new(points.into_iter().map(Point::from_point3).collect())
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn point_n(&self, n: usize) -> Option<&Point> {
        self.points.get(n)
    }

    #[must_use]
    pub fn start_point(&self) -> Option<&Point> {
        self.points.first()
    }

    #[must_use]
    pub fn end_point(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.points.first().is_some_and(Point::is_3d)
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.points.first().is_some_and(Point::is_measured)
    }

    /// Closed when the first and last positions coincide.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) if self.points.len() > 1 => a.same_position(b),
            _ => false,
        }
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.points.iter().rev().cloned().collect())
    }

    /// Exact xy positions of the non-empty points.
    #[must_use]
    pub fn exact_points2(&self) -> Vec<Point2> {
        self.points.iter().filter_map(Point::to_point2).collect()
    }

    /// Exact 3D positions of the non-empty points.
    #[must_use]
    pub fn exact_points3(&self) -> Vec<Point3> {
        self.points.iter().filter_map(Point::to_point3).collect()
    }

    #[must_use]
    pub fn map_points(&self, f: impl Fn(&Point) -> Point) -> Self {
        Self::new(self.points.iter().map(f).collect())
    }
}
