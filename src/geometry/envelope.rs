use std::cmp::Ordering;

use super::coordinate::Coordinate;
use super::point::Point;
use super::visitor::GeometryVisitor;
use crate::math::Point3;
use crate::spatial::Bbox;

/// Exact axis-aligned extent of a geometry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    bounds: Option<(Point3, Point3)>,
    is_3d: bool,
}

impl Envelope {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn expand_to_include(&mut self, c: &Coordinate) {
        let Some(p) = c.to_point3() else {
            return;
        };
        self.is_3d |= c.is_3d();
        self.bounds = Some(match self.bounds.take() {
            None => (p.clone(), p),
            Some((lo, hi)) => (
                Point3::new(
                    lo.x.min(p.x.clone()),
                    lo.y.min(p.y.clone()),
                    lo.z.min(p.z.clone()),
                ),
                Point3::new(hi.x.max(p.x.clone()), hi.y.max(p.y.clone()), hi.z.max(p.z)),
            ),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    #[must_use]
    pub fn min(&self) -> Option<&Point3> {
        self.bounds.as_ref().map(|(lo, _)| lo)
    }

    #[must_use]
    pub fn max(&self) -> Option<&Point3> {
        self.bounds.as_ref().map(|(_, hi)| hi)
    }

    /// Closed overlap test; empty envelopes overlap nothing.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        match (&self.bounds, &other.bounds) {
            (Some((alo, ahi)), Some((blo, bhi))) => {
                alo.x <= bhi.x
                    && blo.x <= ahi.x
                    && alo.y <= bhi.y
                    && blo.y <= ahi.y
                    && alo.z <= bhi.z
                    && blo.z <= ahi.z
            }
            _ => false,
        }
    }

    /// `true` when `other` lies within this envelope.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        match (&self.bounds, &other.bounds) {
            (Some((alo, ahi)), Some((blo, bhi))) => {
                let le = |a: &Point3, b: &Point3| {
                    [a.x.cmp(&b.x), a.y.cmp(&b.y), a.z.cmp(&b.z)]
                        .iter()
                        .all(|o| *o != Ordering::Greater)
                };
                le(alo, blo) && le(bhi, ahi)
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn to_bbox(&self) -> Bbox {
        match &self.bounds {
            Some((lo, hi)) => Bbox::from_points_3d([lo, hi]),
            None => Bbox::empty(),
        }
    }
}

/// Collects the envelope of every visited point.
#[derive(Debug, Default)]
pub struct EnvelopeBuilder {
    pub envelope: Envelope,
}

impl GeometryVisitor for EnvelopeBuilder {
    fn visit_point(&mut self, g: &Point) {
        self.envelope.expand_to_include(g.coordinate());
    }
}
