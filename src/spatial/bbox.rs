//! Axis-aligned bounding boxes over exact primitives.

use nalgebra::Point3;

use crate::math::number::ft_interval;
use crate::math::{Point2, Point3 as ExactPoint3};

/// Axis-aligned bounding box with double bounds enclosing exact coordinates.
///
/// Bounds are rounded outwards so overlap tests never miss a pair whose
/// exact extents touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub mins: Point3<f64>,
    pub maxs: Point3<f64>,
}

impl Bbox {
    #[must_use]
    pub fn new(mins: Point3<f64>, maxs: Point3<f64>) -> Self {
        Self { mins, maxs }
    }

    /// An inverted box that every merge overrides.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(
            Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mins.x > self.maxs.x || self.mins.y > self.maxs.y || self.mins.z > self.maxs.z
    }

    fn take_interval(&mut self, axis: usize, (lo, hi): (f64, f64)) {
        self.mins[axis] = self.mins[axis].min(lo);
        self.maxs[axis] = self.maxs[axis].max(hi);
    }

    pub fn include_point_2d(&mut self, p: &Point2) {
        self.take_interval(0, ft_interval(&p.x));
        self.take_interval(1, ft_interval(&p.y));
        self.take_interval(2, (0.0, 0.0));
    }

    pub fn include_point_3d(&mut self, p: &ExactPoint3) {
        self.take_interval(0, ft_interval(&p.x));
        self.take_interval(1, ft_interval(&p.y));
        self.take_interval(2, ft_interval(&p.z));
    }

    #[must_use]
    pub fn from_points_2d<'a, I>(pts: I) -> Self
    where
        I: IntoIterator<Item = &'a Point2>,
    {
        let mut bbox = Self::empty();
        for p in pts {
            bbox.include_point_2d(p);
        }
        bbox
    }

    #[must_use]
    pub fn from_points_3d<'a, I>(pts: I) -> Self
    where
        I: IntoIterator<Item = &'a ExactPoint3>,
    {
        let mut bbox = Self::empty();
        for p in pts {
            bbox.include_point_3d(p);
        }
        bbox
    }

    /// Closed-interval overlap: boxes that only touch intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| self.mins[i] <= other.maxs[i] && other.mins[i] <= self.maxs[i])
    }

    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self::new(
            self.mins.inf(&other.mins),
            self.maxs.sup(&other.maxs),
        )
    }

    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.mins, &self.maxs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect() {
        let a = Bbox::from_points_2d([&Point2::from_i64(0, 0), &Point2::from_i64(1, 1)]);
        let b = Bbox::from_points_2d([&Point2::from_i64(1, 1), &Point2::from_i64(2, 2)]);
        let c = Bbox::from_points_2d([&Point2::from_i64(3, 3), &Point2::from_i64(4, 4)]);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.merged(&c).intersects(&b));
    }

    #[test]
    fn empty_box_merges_away() {
        let a = Bbox::from_points_3d([&ExactPoint3::from_i64(1, 2, 3)]);
        let merged = Bbox::empty().merged(&a);
        assert_eq!(merged, a);
        assert!(Bbox::empty().is_empty());
    }
}
