use std::cmp::Ordering;

use num_traits::Zero;

use crate::error::KernelError;
use crate::math::{Ft, Point2, Point3};

/// Position of a coordinate: nothing, a 2D point or a 3D point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Position {
    #[default]
    Empty,
    Xy(Point2),
    Xyz(Point3),
}

/// Coordinate of a point with an optional measure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Coordinate {
    position: Position,
    m: Option<f64>,
}

impl Coordinate {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_point2(p: Point2) -> Self {
        Self {
            position: Position::Xy(p),
            m: None,
        }
    }

    #[must_use]
    pub fn from_point3(p: Point3) -> Self {
        Self {
            position: Position::Xyz(p),
            m: None,
        }
    }

    /// # Errors
    ///
    /// Returns [`KernelError::NonFiniteValue`] for NaN or infinite input.
    pub fn xy(x: f64, y: f64) -> Result<Self, KernelError> {
        Ok(Self::from_point2(Point2::from_f64(x, y)?))
    }

    /// # Errors
    ///
    /// Returns [`KernelError::NonFiniteValue`] for NaN or infinite input.
    pub fn xyz(x: f64, y: f64, z: f64) -> Result<Self, KernelError> {
        Ok(Self::from_point3(Point3::from_f64(x, y, z)?))
    }

    /// Attaches a measure; NaN clears it.
    #[must_use]
    pub fn with_m(mut self, m: f64) -> Self {
        self.m = if m.is_nan() { None } else { Some(m) };
        self
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn m(&self) -> Option<f64> {
        self.m
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.position, Position::Empty)
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        matches!(self.position, Position::Xyz(_))
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.m.is_some()
    }

    fn empty_access(axis: &str) -> KernelError {
        KernelError::InvalidComparison(format!("cannot read {axis} of an empty coordinate"))
    }

    /// # Errors
    ///
    /// Returns [`KernelError::InvalidComparison`] on an empty coordinate.
    pub fn x(&self) -> Result<&Ft, KernelError> {
        match &self.position {
            Position::Empty => Err(Self::empty_access("x")),
            Position::Xy(p) => Ok(&p.x),
            Position::Xyz(p) => Ok(&p.x),
        }
    }

    /// # Errors
    ///
    /// Returns [`KernelError::InvalidComparison`] on an empty coordinate.
    pub fn y(&self) -> Result<&Ft, KernelError> {
        match &self.position {
            Position::Empty => Err(Self::empty_access("y")),
            Position::Xy(p) => Ok(&p.y),
            Position::Xyz(p) => Ok(&p.y),
        }
    }

    /// The z value, zero for 2D coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidComparison`] on an empty coordinate.
    pub fn z(&self) -> Result<Ft, KernelError> {
        match &self.position {
            Position::Empty => Err(Self::empty_access("z")),
            Position::Xy(_) => Ok(Ft::zero()),
            Position::Xyz(p) => Ok(p.z.clone()),
        }
    }

    /// The xy projection, `None` when empty.
    #[must_use]
    pub fn to_point2(&self) -> Option<Point2> {
        match &self.position {
            Position::Empty => None,
            Position::Xy(p) => Some(p.clone()),
            Position::Xyz(p) => Some(p.to_2d()),
        }
    }

    /// The 3D position, 2D positions embedded at z = 0.
    #[must_use]
    pub fn to_point3(&self) -> Option<Point3> {
        match &self.position {
            Position::Empty => None,
            Position::Xy(p) => Some(p.to_3d()),
            Position::Xyz(p) => Some(p.clone()),
        }
    }

    #[must_use]
    pub fn force_2d(&self) -> Self {
        let position = match &self.position {
            Position::Xyz(p) => Position::Xy(p.to_2d()),
            other => other.clone(),
        };
        Self { position, m: self.m }
    }

    #[must_use]
    pub fn force_3d(&self) -> Self {
        let position = match &self.position {
            Position::Xy(p) => Position::Xyz(p.to_3d()),
            other => other.clone(),
        };
        Self { position, m: self.m }
    }

    #[must_use]
    pub fn round(&self, scale: i64) -> Self {
        let position = match &self.position {
            Position::Empty => Position::Empty,
            Position::Xy(p) => Position::Xy(p.round(scale)),
            Position::Xyz(p) => Position::Xyz(p.round(scale)),
        };
        Self { position, m: self.m }
    }

    /// Lexicographic comparison of two coordinates of the same kind.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidComparison`] when emptiness or
    /// dimensionality differ.
    pub fn compare(&self, other: &Self) -> Result<Ordering, KernelError> {
        match (&self.position, &other.position) {
            (Position::Empty, Position::Empty) => Ok(Ordering::Equal),
            (Position::Xy(a), Position::Xy(b)) => Ok(a.cmp(b)),
            (Position::Xyz(a), Position::Xyz(b)) => Ok(a.cmp(b)),
            _ => Err(KernelError::InvalidComparison(
                "coordinates differ in emptiness or dimension".to_string(),
            )),
        }
    }

    /// Same position, measure ignored.
    #[must_use]
    pub fn same_position(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl From<Point2> for Coordinate {
    fn from(p: Point2) -> Self {
        Self::from_point2(p)
    }
}

impl From<Point3> for Coordinate {
    fn from(p: Point3) -> Self {
        Self::from_point3(p)
    }
}
