use num_traits::{Signed, Zero};

use super::number::Ft;
use super::point::{Point2, Point3};
use super::primitives::Plane3;

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Projection of a plane onto the coordinate plane orthogonal to its
/// dominant normal axis.
///
/// The kept axes follow the cyclic order (drop X: `(y, z)`, drop Y:
/// `(z, x)`, drop Z: `(x, y)`), so the projection keeps orientation when
/// the dropped normal component is positive and mirrors it otherwise.
/// Lifting back uses the plane equation and is exact.
#[derive(Debug, Clone)]
pub struct ProjectionPlane {
    plane: Plane3,
    drop: Axis,
}

impl ProjectionPlane {
    #[must_use]
    pub fn new(plane: Plane3) -> Self {
        let ax = plane.normal.x.abs();
        let ay = plane.normal.y.abs();
        let az = plane.normal.z.abs();
        let drop = if az >= ax && az >= ay {
            Axis::Z
        } else if ay >= ax {
            Axis::Y
        } else {
            Axis::X
        };
        Self { plane, drop }
    }

    #[must_use]
    pub fn plane(&self) -> &Plane3 {
        &self.plane
    }

    #[must_use]
    pub fn dropped_axis(&self) -> Axis {
        self.drop
    }

    /// `true` when counter-clockwise projected rings are counter-clockwise
    /// around the plane normal.
    #[must_use]
    pub fn preserves_orientation(&self) -> bool {
        self.dropped_component().is_positive()
    }

    fn dropped_component(&self) -> &Ft {
        match self.drop {
            Axis::X => &self.plane.normal.x,
            Axis::Y => &self.plane.normal.y,
            Axis::Z => &self.plane.normal.z,
        }
    }

    #[must_use]
    pub fn project(&self, p: &Point3) -> Point2 {
        match self.drop {
            Axis::X => Point2::new(p.y.clone(), p.z.clone()),
            Axis::Y => Point2::new(p.z.clone(), p.x.clone()),
            Axis::Z => Point2::new(p.x.clone(), p.y.clone()),
        }
    }

    /// Lifts a projected point back onto the plane.
    #[must_use]
    pub fn lift(&self, p: &Point2) -> Point3 {
        let n = &self.plane.normal;
        let k = self.dropped_component();
        if k.is_zero() {
            return Point3::new(p.x.clone(), p.y.clone(), Ft::zero());
        }
        match self.drop {
            Axis::X => {
                let x = (&self.plane.d - &n.y * &p.x - &n.z * &p.y) / k;
                Point3::new(x, p.x.clone(), p.y.clone())
            }
            Axis::Y => {
                let y = (&self.plane.d - &n.z * &p.x - &n.x * &p.y) / k;
                Point3::new(p.y.clone(), y, p.x.clone())
            }
            Axis::Z => {
                let z = (&self.plane.d - &n.x * &p.x - &n.y * &p.y) / k;
                Point3::new(p.x.clone(), p.y.clone(), z)
            }
        }
    }
}
