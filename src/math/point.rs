use std::ops::{Add, Neg, Sub};

use num_traits::Zero;

use super::number::{ft, ft_from_f64, ft_to_f64, round_ft, Ft};
use crate::error::KernelError;

/// Exact 2D point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point2 {
    pub x: Ft,
    pub y: Ft,
}

/// Exact 3D point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point3 {
    pub x: Ft,
    pub y: Ft,
    pub z: Ft,
}

/// Exact 2D vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vector2 {
    pub x: Ft,
    pub y: Ft,
}

/// Exact 3D vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vector3 {
    pub x: Ft,
    pub y: Ft,
    pub z: Ft,
}

impl Point2 {
    #[must_use]
    pub fn new(x: Ft, y: Ft) -> Self {
        Self { x, y }
    }

    /// Builds a point from doubles.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::NonFiniteValue`] if a coordinate is NaN or infinite.
    pub fn from_f64(x: f64, y: f64) -> Result<Self, KernelError> {
        Ok(Self::new(ft_from_f64(x)?, ft_from_f64(y)?))
    }

    #[must_use]
    pub fn from_i64(x: i64, y: i64) -> Self {
        Self::new(ft(x), ft(y))
    }

    /// Embeds the point in 3D at z = 0.
    #[must_use]
    pub fn to_3d(&self) -> Point3 {
        Point3::new(self.x.clone(), self.y.clone(), Ft::zero())
    }

    #[must_use]
    pub fn round(&self, scale: i64) -> Self {
        Self::new(round_ft(&self.x, scale), round_ft(&self.y, scale))
    }

    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        let two = ft(2);
        Self::new(
            (&self.x + &other.x) / &two,
            (&self.y + &other.y) / &two,
        )
    }

    /// Double approximation.
    #[must_use]
    pub fn to_na(&self) -> nalgebra::Point2<f64> {
        nalgebra::Point2::new(ft_to_f64(&self.x), ft_to_f64(&self.y))
    }
}

impl Point3 {
    #[must_use]
    pub fn new(x: Ft, y: Ft, z: Ft) -> Self {
        Self { x, y, z }
    }

    /// Builds a point from doubles.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::NonFiniteValue`] if a coordinate is NaN or infinite.
    pub fn from_f64(x: f64, y: f64, z: f64) -> Result<Self, KernelError> {
        Ok(Self::new(ft_from_f64(x)?, ft_from_f64(y)?, ft_from_f64(z)?))
    }

    #[must_use]
    pub fn from_i64(x: i64, y: i64, z: i64) -> Self {
        Self::new(ft(x), ft(y), ft(z))
    }

    /// Projects onto the XY plane by dropping z.
    #[must_use]
    pub fn to_2d(&self) -> Point2 {
        Point2::new(self.x.clone(), self.y.clone())
    }

    #[must_use]
    pub fn round(&self, scale: i64) -> Self {
        Self::new(
            round_ft(&self.x, scale),
            round_ft(&self.y, scale),
            round_ft(&self.z, scale),
        )
    }

    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        let two = ft(2);
        Self::new(
            (&self.x + &other.x) / &two,
            (&self.y + &other.y) / &two,
            (&self.z + &other.z) / &two,
        )
    }

    /// Returns the vector from the origin to this point.
    #[must_use]
    pub fn to_vector(&self) -> Vector3 {
        Vector3::new(self.x.clone(), self.y.clone(), self.z.clone())
    }

    /// Double approximation.
    #[must_use]
    pub fn to_na(&self) -> nalgebra::Point3<f64> {
        nalgebra::Point3::new(ft_to_f64(&self.x), ft_to_f64(&self.y), ft_to_f64(&self.z))
    }
}

impl Vector2 {
    #[must_use]
    pub fn new(x: Ft, y: Ft) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> Ft {
        &self.x * &other.x + &self.y * &other.y
    }

    /// Z component of the 3D cross product.
    #[must_use]
    pub fn cross(&self, other: &Self) -> Ft {
        &self.x * &other.y - &self.y * &other.x
    }

    #[must_use]
    pub fn squared_length(&self) -> Ft {
        self.dot(self)
    }

    #[must_use]
    pub fn scale(&self, factor: &Ft) -> Self {
        Self::new(&self.x * factor, &self.y * factor)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }
}

impl Vector3 {
    #[must_use]
    pub fn new(x: Ft, y: Ft, z: Ft) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::new(Ft::zero(), Ft::zero(), Ft::zero())
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> Ft {
        &self.x * &other.x + &self.y * &other.y + &self.z * &other.z
    }

    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            &self.y * &other.z - &self.z * &other.y,
            &self.z * &other.x - &self.x * &other.z,
            &self.x * &other.y - &self.y * &other.x,
        )
    }

    #[must_use]
    pub fn squared_length(&self) -> Ft {
        self.dot(self)
    }

    #[must_use]
    pub fn scale(&self, factor: &Ft) -> Self {
        Self::new(&self.x * factor, &self.y * factor, &self.z * factor)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }

    #[must_use]
    pub fn to_na(&self) -> nalgebra::Vector3<f64> {
        nalgebra::Vector3::new(ft_to_f64(&self.x), ft_to_f64(&self.y), ft_to_f64(&self.z))
    }
}

impl<'a> Sub<&'a Point2> for &'a Point2 {
    type Output = Vector2;

    fn sub(self, rhs: &'a Point2) -> Vector2 {
        Vector2::new(&self.x - &rhs.x, &self.y - &rhs.y)
    }
}

impl<'a> Add<&'a Vector2> for &'a Point2 {
    type Output = Point2;

    fn add(self, rhs: &'a Vector2) -> Point2 {
        Point2::new(&self.x + &rhs.x, &self.y + &rhs.y)
    }
}

impl<'a> Sub<&'a Point3> for &'a Point3 {
    type Output = Vector3;

    fn sub(self, rhs: &'a Point3) -> Vector3 {
        Vector3::new(&self.x - &rhs.x, &self.y - &rhs.y, &self.z - &rhs.z)
    }
}

impl<'a> Add<&'a Vector3> for &'a Point3 {
    type Output = Point3;

    fn add(self, rhs: &'a Vector3) -> Point3 {
        Point3::new(&self.x + &rhs.x, &self.y + &rhs.y, &self.z + &rhs.z)
    }
}

impl<'a> Add<&'a Vector3> for &'a Vector3 {
    type Output = Vector3;

    fn add(self, rhs: &'a Vector3) -> Vector3 {
        Vector3::new(&self.x + &rhs.x, &self.y + &rhs.y, &self.z + &rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cross_product_of_axes() {
        let x = Vector3::new(ft(1), ft(0), ft(0));
        let y = Vector3::new(ft(0), ft(1), ft(0));
        assert_eq!(x.cross(&y), Vector3::new(ft(0), ft(0), ft(1)));
    }

    #[test]
    fn point_arithmetic() {
        let a = Point3::from_i64(1, 2, 3);
        let b = Point3::from_i64(4, 6, 8);
        let v = &b - &a;
        assert_eq!(v, Vector3::new(ft(3), ft(4), ft(5)));
        assert_eq!(&a + &v, b);
    }

    #[test]
    fn dimension_conversion() {
        let p = Point2::from_f64(1.5, -2.0).unwrap();
        let p3 = p.to_3d();
        assert!(p3.z.is_zero());
        assert_eq!(p3.to_2d(), p);
    }

    #[test]
    fn rounding_points() {
        let p = Point2::from_f64(0.123_456, 9.87).unwrap().round(100);
        assert_eq!(p, Point2::new(ft(12) / ft(100), ft(987) / ft(100)));
    }
}
