use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_2;

use num_traits::One;
use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::{Geometry, MultiPolygon, Polygon};
use crate::math::number::{ft_from_f64, sign};
use crate::math::{ft, Ft, Point2, PolygonWithHoles2};
use crate::set::dim2::polygon_from_exact;

use super::minkowski::minkowski_sum;

/// Segments per quarter circle used by [`offset`].
pub const DEFAULT_QUARTER_SEGMENTS: u32 = 8;

/// Grows a planar geometry by a radius.
///
/// The disk is replaced by a polygon inscribed in the circle; its vertices
/// lie exactly on the circle, so the result never reaches further than the
/// radius.
pub struct Offset2D {
    radius: Ft,
    quarter_segments: u32,
}

impl Offset2D {
    /// # Errors
    ///
    /// Returns [`crate::error::KernelError::NonFiniteValue`] for a
    /// non-finite radius and [`GeometryError::Invalid`] for a radius that is
    /// not positive or a zero segment count.
    pub fn new(radius: f64, quarter_segments: u32) -> Result<Self> {
        let radius = ft_from_f64(radius)?;
        if sign(&radius) != Ordering::Greater {
            return Err(GeometryError::Invalid("offset radius must be positive".into()).into());
        }
        if quarter_segments == 0 {
            return Err(GeometryError::Invalid("a quarter circle needs a segment".into()).into());
        }
        Ok(Self { radius, quarter_segments })
    }

    /// Counter-clockwise polygon approximating the disk, with
    /// `4 * quarter_segments` vertices on the circle.
    ///
    /// # Errors
    ///
    /// Fails only when a half-angle tangent is not finite.
    pub fn disk(&self) -> Result<Polygon> {
        let step = FRAC_PI_2 / f64::from(self.quarter_segments);
        let mut quarter = Vec::with_capacity(self.quarter_segments as usize);
        for k in 0..self.quarter_segments {
            // rational parametrisation of the unit circle by tan(θ/2)
            let t = ft_from_f64((step * f64::from(k) / 2.0).tan())?;
            let t2 = &t * &t;
            let denominator = Ft::one() + &t2;
            let x = (Ft::one() - &t2) / &denominator * &self.radius;
            let y = ft(2) * &t / &denominator * &self.radius;
            quarter.push(Point2::new(x, y));
        }
        let mut ring = quarter.clone();
        let mut current = quarter;
        for _ in 1..4 {
            current = current.iter().map(|p| Point2::new(-p.y.clone(), p.x.clone())).collect();
            ring.extend(current.iter().cloned());
        }
        Ok(polygon_from_exact(&PolygonWithHoles2::from_outer(ring)))
    }

    /// # Errors
    ///
    /// See [`minkowski_sum`].
    pub fn execute(&self, g: &Geometry) -> Result<MultiPolygon> {
        debug!(
            kind = g.geometry_type().name(),
            segments = self.quarter_segments,
            "offset"
        );
        minkowski_sum(g, &self.disk()?)
    }
}

/// Offset by `radius` with [`DEFAULT_QUARTER_SEGMENTS`].
///
/// # Errors
///
/// See [`Offset2D::new`] and [`minkowski_sum`].
pub fn offset(g: &Geometry, radius: f64) -> Result<MultiPolygon> {
    Offset2D::new(radius, DEFAULT_QUARTER_SEGMENTS)?.execute(g)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{KernelError, SfgeomError};
    use crate::geometry::{LineString, Point};
    use crate::operations::query::area;
    use crate::set::dim2::polygon_to_exact;

    fn p(x: i64, y: i64) -> Point2 {
        Point2::from_i64(x, y)
    }

    fn area_of(m: MultiPolygon) -> f64 {
        area(&Geometry::MultiPolygon(m)).unwrap()
    }

    #[test]
    fn disk_vertices_lie_on_the_circle() {
        let disk = polygon_to_exact(&Offset2D::new(2.5, 5).unwrap().disk().unwrap());
        assert_eq!(disk.outer.len(), 20);
        let r2 = ft_from_f64(6.25).unwrap();
        for v in &disk.outer {
            assert_eq!(&v.x * &v.x + &v.y * &v.y, r2);
        }
        assert_eq!(sign(&disk.area()), Ordering::Greater);
    }

    #[test]
    fn point_with_one_segment_is_a_diamond() {
        let g = Geometry::Point(Point::from_point2(p(1, 1)));
        let grown = Offset2D::new(3.0, 1).unwrap().execute(&g).unwrap();
        assert_relative_eq!(area_of(grown), 18.0);
    }

    #[test]
    fn square_and_segment_grow_by_the_diamond() {
        let square = Geometry::Polygon(Polygon::new(LineString::from_points2([
            p(0, 0),
            p(2, 0),
            p(2, 2),
            p(0, 2),
            p(0, 0),
        ])));
        let diamond = Offset2D::new(1.0, 1).unwrap();
        assert_relative_eq!(area_of(diamond.execute(&square).unwrap()), 14.0);

        let segment = Geometry::LineString(LineString::from_points2([p(0, 0), p(4, 0)]));
        assert_relative_eq!(area_of(diamond.execute(&segment).unwrap()), 10.0);
    }

    #[test]
    fn finer_disks_approach_the_round_offset() {
        let g = Geometry::Point(Point::from_point2(p(0, 0)));
        let grown = area_of(offset(&g, 1.0).unwrap());
        assert!(grown < std::f64::consts::PI);
        assert!(grown > 3.1);
    }

    #[test]
    fn invalid_radius_is_refused() {
        assert!(matches!(
            Offset2D::new(0.0, 8),
            Err(SfgeomError::Geometry(GeometryError::Invalid(_)))
        ));
        assert!(matches!(
            Offset2D::new(f64::NAN, 8),
            Err(SfgeomError::Kernel(KernelError::NonFiniteValue(_)))
        ));
        assert!(Offset2D::new(1.0, 0).is_err());
    }
}
