//! Boolean predicates and constructions on geometries.
//!
//! Both operands are decomposed into [`GeometrySet`]s of the requested
//! dimension, the set-level algorithms of [`engine`] run on the primitives,
//! and the result is recomposed into the simplest geometry.

pub mod engine;
pub mod filter;
pub mod pairwise;
mod pairwise_2d;
mod pairwise_3d;

use tracing::debug;

pub use engine::{covers_sets, difference_sets, intersection_sets, intersects_sets, union_sets};
pub use filter::{filter_covered, filter_self_intersection};
pub use pairwise::{intersection_primitives, intersects_primitives, PairwiseOps};

use crate::error::{GeometryError, Result};
use crate::geometry::Geometry;
use crate::math::COVERS_TOLERANCE;
use crate::operations::query::is_valid;
use crate::set::{Dim2, Dim3, GeometrySet};

/// Marker selecting the entry points that skip the validity check of their
/// operands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoValidityCheck;

/// Parameters of the boolean operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BooleanParams {
    /// Reject invalid operands with [`GeometryError::Invalid`].
    pub check_validity: bool,
    /// Drop covered primitives from union results.
    pub filter_covered: bool,
    /// Absolute tolerance of measure comparisons.
    pub covers_tolerance: f64,
}

impl Default for BooleanParams {
    fn default() -> Self {
        Self {
            check_validity: true,
            filter_covered: true,
            covers_tolerance: COVERS_TOLERANCE,
        }
    }
}

impl BooleanParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_check_validity(mut self, check: bool) -> Self {
        self.check_validity = check;
        self
    }

    #[must_use]
    pub fn with_filter_covered(mut self, filter: bool) -> Self {
        self.filter_covered = filter;
        self
    }

    #[must_use]
    pub fn with_covers_tolerance(mut self, tolerance: f64) -> Self {
        self.covers_tolerance = tolerance;
        self
    }

    fn check(&self, g: &Geometry) -> Result<()> {
        if !self.check_validity {
            return Ok(());
        }
        let validity = is_valid(g);
        if validity.is_valid() {
            Ok(())
        } else {
            Err(GeometryError::Invalid(format!(
                "{}: {}",
                g.geometry_type().name(),
                validity.reason().unwrap_or("invalid")
            ))
            .into())
        }
    }

    fn decompose<D: PairwiseOps>(
        &self,
        a: &Geometry,
        b: &Geometry,
    ) -> Result<(GeometrySet<D>, GeometrySet<D>)> {
        self.check(a)?;
        self.check(b)?;
        debug!(
            first = a.geometry_type().name(),
            second = b.geometry_type().name(),
            dimension = D::DIMENSION,
            "boolean operands"
        );
        Ok((GeometrySet::from_geometry(a)?, GeometrySet::from_geometry(b)?))
    }

    fn intersects_in<D: PairwiseOps>(&self, a: &Geometry, b: &Geometry) -> Result<bool> {
        let (a, b) = self.decompose::<D>(a, b)?;
        Ok(intersects_sets(&a, &b))
    }

    fn intersection_in<D: PairwiseOps>(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        let (a, b) = self.decompose::<D>(a, b)?;
        Ok(intersection_sets(&a, &b)?.recompose())
    }

    fn difference_in<D: PairwiseOps>(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        let (a, b) = self.decompose::<D>(a, b)?;
        Ok(difference_sets(&a, &b)?.recompose())
    }

    fn union_in<D: PairwiseOps>(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        let (a, b) = self.decompose::<D>(a, b)?;
        let mut out = union_sets(&a, &b)?;
        if self.filter_covered {
            out = filter_covered(&out, self.covers_tolerance)?;
        }
        Ok(out.recompose())
    }

    fn covers_in<D: PairwiseOps>(&self, a: &Geometry, b: &Geometry) -> Result<bool> {
        let (a, b) = self.decompose::<D>(a, b)?;
        covers_sets(&a, &b, self.covers_tolerance)
    }

    /// Whether `a` and `b` share a point in the plane.
    ///
    /// # Errors
    ///
    /// Fails on invalid operands and on solids.
    pub fn intersects(&self, a: &Geometry, b: &Geometry) -> Result<bool> {
        self.intersects_in::<Dim2>(a, b)
    }

    /// # Errors
    ///
    /// Fails on invalid operands.
    pub fn intersects_3d(&self, a: &Geometry, b: &Geometry) -> Result<bool> {
        self.intersects_in::<Dim3>(a, b)
    }

    /// # Errors
    ///
    /// Fails on invalid operands and on solids.
    pub fn intersection(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        self.intersection_in::<Dim2>(a, b)
    }

    /// # Errors
    ///
    /// Fails on invalid operands, or when solids cannot be corefined.
    pub fn intersection_3d(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        self.intersection_in::<Dim3>(a, b)
    }

    /// `a` minus `b` in the plane.
    ///
    /// # Errors
    ///
    /// Fails on invalid operands and on solids.
    pub fn difference(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        self.difference_in::<Dim2>(a, b)
    }

    /// # Errors
    ///
    /// Fails on invalid operands, or when solids cannot be corefined.
    pub fn difference_3d(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        self.difference_in::<Dim3>(a, b)
    }

    /// # Errors
    ///
    /// Fails on invalid operands and on solids.
    pub fn union(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        self.union_in::<Dim2>(a, b)
    }

    /// # Errors
    ///
    /// Fails on invalid operands, or when solids cannot be corefined.
    pub fn union_3d(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        self.union_in::<Dim3>(a, b)
    }

    /// Whether every point of `b` is a point of `a`, in the plane.
    ///
    /// # Errors
    ///
    /// Fails on invalid operands and on solids.
    pub fn covers(&self, a: &Geometry, b: &Geometry) -> Result<bool> {
        self.covers_in::<Dim2>(a, b)
    }

    /// # Errors
    ///
    /// Fails on invalid operands, or when solids cannot be corefined.
    pub fn covers_3d(&self, a: &Geometry, b: &Geometry) -> Result<bool> {
        self.covers_in::<Dim3>(a, b)
    }
}

fn unchecked() -> BooleanParams {
    BooleanParams::default().with_check_validity(false)
}

/// # Errors
///
/// See [`BooleanParams::intersects`].
pub fn intersects(a: &Geometry, b: &Geometry) -> Result<bool> {
    BooleanParams::default().intersects(a, b)
}

/// # Errors
///
/// See [`BooleanParams::intersects_3d`].
pub fn intersects_3d(a: &Geometry, b: &Geometry) -> Result<bool> {
    BooleanParams::default().intersects_3d(a, b)
}

/// # Errors
///
/// See [`BooleanParams::intersection`].
pub fn intersection(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    BooleanParams::default().intersection(a, b)
}

/// # Errors
///
/// See [`BooleanParams::intersection_3d`].
pub fn intersection_3d(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    BooleanParams::default().intersection_3d(a, b)
}

/// # Errors
///
/// See [`BooleanParams::difference`].
pub fn difference(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    BooleanParams::default().difference(a, b)
}

/// # Errors
///
/// See [`BooleanParams::difference_3d`].
pub fn difference_3d(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    BooleanParams::default().difference_3d(a, b)
}

/// # Errors
///
/// See [`BooleanParams::union`].
pub fn union(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    BooleanParams::default().union(a, b)
}

/// # Errors
///
/// See [`BooleanParams::union_3d`].
pub fn union_3d(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    BooleanParams::default().union_3d(a, b)
}

/// # Errors
///
/// See [`BooleanParams::covers`].
pub fn covers(a: &Geometry, b: &Geometry) -> Result<bool> {
    BooleanParams::default().covers(a, b)
}

/// # Errors
///
/// See [`BooleanParams::covers_3d`].
pub fn covers_3d(a: &Geometry, b: &Geometry) -> Result<bool> {
    BooleanParams::default().covers_3d(a, b)
}

/// # Errors
///
/// Fails on solids.
pub fn intersects_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<bool> {
    unchecked().intersects(a, b)
}

/// # Errors
///
/// Fails only when the operands cannot be decomposed.
pub fn intersects_3d_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<bool> {
    unchecked().intersects_3d(a, b)
}

/// # Errors
///
/// Fails on solids.
pub fn intersection_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<Geometry> {
    unchecked().intersection(a, b)
}

/// # Errors
///
/// Fails when solids cannot be corefined.
pub fn intersection_3d_unchecked(
    a: &Geometry,
    b: &Geometry,
    _: NoValidityCheck,
) -> Result<Geometry> {
    unchecked().intersection_3d(a, b)
}

/// # Errors
///
/// Fails on solids.
pub fn difference_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<Geometry> {
    unchecked().difference(a, b)
}

/// # Errors
///
/// Fails when solids cannot be corefined.
pub fn difference_3d_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<Geometry> {
    unchecked().difference_3d(a, b)
}

/// # Errors
///
/// Fails on solids.
pub fn union_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<Geometry> {
    unchecked().union(a, b)
}

/// # Errors
///
/// Fails when solids cannot be corefined.
pub fn union_3d_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<Geometry> {
    unchecked().union_3d(a, b)
}

/// # Errors
///
/// Fails on solids.
pub fn covers_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<bool> {
    unchecked().covers(a, b)
}

/// # Errors
///
/// Fails when solids cannot be corefined.
pub fn covers_3d_unchecked(a: &Geometry, b: &Geometry, _: NoValidityCheck) -> Result<bool> {
    unchecked().covers_3d(a, b)
}
