use std::cmp::Ordering;

use num_traits::{Signed, Zero};

use super::number::{ft, ft_sqrt, ft_to_f64, sign, Ft};
use super::point::{Point2, Point3, Vector3};

/// Exact 2D segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment2 {
    pub source: Point2,
    pub target: Point2,
}

/// Exact 3D segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment3 {
    pub source: Point3,
    pub target: Point3,
}

/// Exact 2D triangle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triangle2 {
    pub vertices: [Point2; 3],
}

/// Exact 3D triangle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triangle3 {
    pub vertices: [Point3; 3],
}

/// Oriented plane `normal · x = d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plane3 {
    pub normal: Vector3,
    pub d: Ft,
}

impl Segment2 {
    #[must_use]
    pub fn new(source: Point2, target: Point2) -> Self {
        Self { source, target }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.source == self.target
    }

    #[must_use]
    pub fn squared_length(&self) -> Ft {
        (&self.target - &self.source).squared_length()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        ft_sqrt(&self.squared_length())
    }

    /// Point at parameter `t`, `source` at 0 and `target` at 1.
    #[must_use]
    pub fn point_at(&self, t: &Ft) -> Point2 {
        &self.source + &(&self.target - &self.source).scale(t)
    }

    /// Parameter of the orthogonal projection of `p` on the supporting line.
    #[must_use]
    pub fn param_of(&self, p: &Point2) -> Ft {
        let d = &self.target - &self.source;
        let len = d.squared_length();
        if len.is_zero() {
            return Ft::zero();
        }
        d.dot(&(p - &self.source)) / len
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.target.clone(), self.source.clone())
    }

    /// Same segment with endpoints in lexicographic order.
    #[must_use]
    pub fn canonical(&self) -> Self {
        if self.source <= self.target {
            self.clone()
        } else {
            self.reversed()
        }
    }

    #[must_use]
    pub fn to_3d(&self) -> Segment3 {
        Segment3::new(self.source.to_3d(), self.target.to_3d())
    }
}

impl Segment3 {
    #[must_use]
    pub fn new(source: Point3, target: Point3) -> Self {
        Self { source, target }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.source == self.target
    }

    #[must_use]
    pub fn squared_length(&self) -> Ft {
        (&self.target - &self.source).squared_length()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        ft_sqrt(&self.squared_length())
    }

    #[must_use]
    pub fn point_at(&self, t: &Ft) -> Point3 {
        &self.source + &(&self.target - &self.source).scale(t)
    }

    #[must_use]
    pub fn param_of(&self, p: &Point3) -> Ft {
        let d = &self.target - &self.source;
        let len = d.squared_length();
        if len.is_zero() {
            return Ft::zero();
        }
        d.dot(&(p - &self.source)) / len
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.target.clone(), self.source.clone())
    }

    #[must_use]
    pub fn canonical(&self) -> Self {
        if self.source <= self.target {
            self.clone()
        } else {
            self.reversed()
        }
    }

    #[must_use]
    pub fn to_2d(&self) -> Segment2 {
        Segment2::new(self.source.to_2d(), self.target.to_2d())
    }
}

impl Triangle2 {
    #[must_use]
    pub fn new(a: Point2, b: Point2, c: Point2) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Signed area, positive for counter-clockwise vertex order.
    #[must_use]
    pub fn signed_area(&self) -> Ft {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a)) / ft(2)
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.signed_area().is_zero()
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let [a, b, c] = &self.vertices;
        Self::new(a.clone(), c.clone(), b.clone())
    }

    #[must_use]
    pub fn to_3d(&self) -> Triangle3 {
        let [a, b, c] = &self.vertices;
        Triangle3::new(a.to_3d(), b.to_3d(), c.to_3d())
    }
}

impl Triangle3 {
    #[must_use]
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Unnormalised normal `(b - a) × (c - a)`.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.normal().is_zero()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        ft_sqrt(&self.normal().squared_length()) / 2.0
    }

    #[must_use]
    pub fn supporting_plane(&self) -> Option<Plane3> {
        let [a, b, c] = &self.vertices;
        Plane3::from_points(a, b, c)
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let [a, b, c] = &self.vertices;
        Self::new(a.clone(), c.clone(), b.clone())
    }

    #[must_use]
    pub fn centroid(&self) -> Point3 {
        let [a, b, c] = &self.vertices;
        let three = ft(3);
        Point3::new(
            (&a.x + &b.x + &c.x) / &three,
            (&a.y + &b.y + &c.y) / &three,
            (&a.z + &b.z + &c.z) / &three,
        )
    }

    #[must_use]
    pub fn edges(&self) -> [Segment3; 3] {
        let [a, b, c] = &self.vertices;
        [
            Segment3::new(a.clone(), b.clone()),
            Segment3::new(b.clone(), c.clone()),
            Segment3::new(c.clone(), a.clone()),
        ]
    }

    /// Segment spanning a collinear (degenerate) triangle.
    #[must_use]
    pub fn degenerate_hull(&self) -> Segment3 {
        let min = self.vertices.iter().min().cloned().unwrap_or_else(|| self.vertices[0].clone());
        let max = self.vertices.iter().max().cloned().unwrap_or_else(|| self.vertices[0].clone());
        Segment3::new(min, max)
    }

    /// Double approximation of the unit normal, zero for degenerate triangles.
    #[must_use]
    pub fn unit_normal_f64(&self) -> nalgebra::Vector3<f64> {
        let n = self.normal().to_na();
        let len = n.norm();
        if len > 0.0 {
            n / len
        } else {
            n
        }
    }
}

impl Plane3 {
    #[must_use]
    pub fn new(normal: Vector3, d: Ft) -> Self {
        Self { normal, d }
    }

    /// Plane through three points, oriented by the right-hand rule.
    #[must_use]
    pub fn from_points(a: &Point3, b: &Point3, c: &Point3) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        if normal.is_zero() {
            return None;
        }
        let d = normal.dot(&a.to_vector());
        Some(Self::new(normal, d))
    }

    /// Side of `p`: `Greater` on the side the normal points to.
    #[must_use]
    pub fn side(&self, p: &Point3) -> Ordering {
        sign(&(self.normal.dot(&p.to_vector()) - &self.d))
    }

    #[must_use]
    pub fn has_on(&self, p: &Point3) -> bool {
        self.side(p) == Ordering::Equal
    }

    #[must_use]
    pub fn opposite(&self) -> Self {
        Self::new(-self.normal.clone(), -self.d.clone())
    }

    /// Scale-free representative keeping orientation: the first non-zero
    /// normal component is rescaled to ±1.
    #[must_use]
    pub fn oriented_key(&self) -> Self {
        let pivot = [&self.normal.x, &self.normal.y, &self.normal.z]
            .into_iter()
            .find(|c| !c.is_zero())
            .map(Signed::abs);
        match pivot {
            Some(p) => Self::new(
                Vector3::new(
                    &self.normal.x / &p,
                    &self.normal.y / &p,
                    &self.normal.z / &p,
                ),
                &self.d / &p,
            ),
            None => self.clone(),
        }
    }

    /// Signed distance approximation, used for diagnostics only.
    #[must_use]
    pub fn distance_f64(&self, p: &Point3) -> f64 {
        let num = ft_to_f64(&(self.normal.dot(&p.to_vector()) - &self.d));
        num / ft_sqrt(&self.normal.squared_length()).max(f64::MIN_POSITIVE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn triangle_signed_area() {
        let t = Triangle2::new(
            Point2::from_i64(0, 0),
            Point2::from_i64(1, 0),
            Point2::from_i64(1, 1),
        );
        assert_eq!(t.signed_area(), ft(1) / ft(2));
        assert_eq!(t.reversed().signed_area(), -(ft(1) / ft(2)));
    }

    #[test]
    fn segment_parameters() {
        let s = Segment3::new(Point3::from_i64(0, 0, 0), Point3::from_i64(4, 0, 0));
        let p = s.point_at(&(ft(1) / ft(4)));
        assert_eq!(p, Point3::from_i64(1, 0, 0));
        assert_eq!(s.param_of(&Point3::from_i64(3, 5, 0)), ft(3) / ft(4));
        assert_relative_eq!(s.length(), 4.0);
    }

    #[test]
    fn plane_sides_and_keys() {
        let plane = Plane3::from_points(
            &Point3::from_i64(0, 0, 2),
            &Point3::from_i64(1, 0, 2),
            &Point3::from_i64(0, 1, 2),
        )
        .unwrap();
        assert_eq!(plane.side(&Point3::from_i64(0, 0, 3)), Ordering::Greater);
        assert!(plane.has_on(&Point3::from_i64(7, -3, 2)));

        let scaled = Plane3::new(plane.normal.scale(&ft(5)), &plane.d * ft(5));
        assert_eq!(scaled.oriented_key(), plane.oriented_key());
        assert_ne!(plane.opposite().oriented_key(), plane.oriented_key());
    }

    #[test]
    fn triangle_area_3d() {
        let t = Triangle3::new(
            Point3::from_i64(0, 0, 0),
            Point3::from_i64(2, 0, 0),
            Point3::from_i64(0, 2, 5),
        );
        assert_relative_eq!(t.area(), 29.0_f64.sqrt(), epsilon = 1e-12);
        assert!(!t.is_degenerate());
    }
}
