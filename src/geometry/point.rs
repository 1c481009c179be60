use super::coordinate::Coordinate;
use crate::error::KernelError;
use crate::math::{Point2, Point3};

/// SFA point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    coordinate: Coordinate,
}

impl Point {
    #[must_use]
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`KernelError::NonFiniteValue`] for NaN or infinite input.
    pub fn xy(x: f64, y: f64) -> Result<Self, KernelError> {
        Ok(Self::new(Coordinate::xy(x, y)?))
    }

    /// # Errors
    ///
    /// Returns [`KernelError::NonFiniteValue`] for NaN or infinite input.
    pub fn xyz(x: f64, y: f64, z: f64) -> Result<Self, KernelError> {
        Ok(Self::new(Coordinate::xyz(x, y, z)?))
    }

    #[must_use]
    pub fn from_point2(p: Point2) -> Self {
        Self::new(Coordinate::from_point2(p))
    }

    #[must_use]
    pub fn from_point3(p: Point3) -> Self {
        Self::new(Coordinate::from_point3(p))
    }

    #[must_use]
    pub fn with_m(self, m: f64) -> Self {
        Self::new(self.coordinate.with_m(m))
    }

    #[must_use]
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinate.is_empty()
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.coordinate.is_3d()
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.coordinate.is_measured()
    }

    #[must_use]
    pub fn to_point2(&self) -> Option<Point2> {
        self.coordinate.to_point2()
    }

    #[must_use]
    pub fn to_point3(&self) -> Option<Point3> {
        self.coordinate.to_point3()
    }

    /// Same position, measure ignored.
    #[must_use]
    pub fn same_position(&self, other: &Self) -> bool {
        self.coordinate.same_position(&other.coordinate)
    }

    #[must_use]
    pub fn round(&self, scale: i64) -> Self {
        Self::new(self.coordinate.round(scale))
    }

    #[must_use]
    pub fn force_2d(&self) -> Self {
        Self::new(self.coordinate.force_2d())
    }

    #[must_use]
    pub fn force_3d(&self) -> Self {
        Self::new(self.coordinate.force_3d())
    }
}

impl From<Point2> for Point {
    fn from(p: Point2) -> Self {
        Self::from_point2(p)
    }
}

impl From<Point3> for Point {
    fn from(p: Point3) -> Self {
        Self::from_point3(p)
    }
}
