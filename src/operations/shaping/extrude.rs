use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{GeometryError, OperationError, Result};
use crate::geometry::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiSolid, Point, Polygon,
    PolyhedralSurface, Solid, TriangulatedSurface,
};
use crate::math::number::{ft_from_f64, sign};
use crate::math::{Point3, Vector3};
use crate::tessellation::{newell_normal, polygon_rings_3d};

/// Sweeps a geometry along a direction vector.
///
/// | input                       | result            |
/// |-----------------------------|-------------------|
/// | Point                       | LineString        |
/// | LineString                  | PolyhedralSurface |
/// | Triangle, Polygon           | Solid             |
/// | PolyhedralSurface, TIN      | Solid             |
/// | MultiPoint, MultiLineString | MultiLineString, PolyhedralSurface |
/// | MultiPolygon, MultiSolid    | MultiSolid        |
///
/// Collections are extruded part by part. Results are 3D; solid shells are
/// oriented outward.
pub struct Extrude {
    direction: Vector3,
}

impl Extrude {
    /// # Errors
    ///
    /// Returns [`crate::error::KernelError::NonFiniteValue`] for a non-finite
    /// component and [`GeometryError::Invalid`] for the zero vector.
    pub fn new(dx: f64, dy: f64, dz: f64) -> Result<Self> {
        let direction = Vector3::new(ft_from_f64(dx)?, ft_from_f64(dy)?, ft_from_f64(dz)?);
        if direction.is_zero() {
            let reason = "extrusion direction must be non-zero".into();
            return Err(GeometryError::Invalid(reason).into());
        }
        Ok(Self { direction })
    }

    /// # Errors
    ///
    /// Returns [`GeometryError::Invalid`] when a surface is degenerate or
    /// parallel to the direction, and [`OperationError::Unsupported`] for
    /// solids.
    pub fn execute(&self, g: &Geometry) -> Result<Geometry> {
        debug!(kind = g.geometry_type().name(), "extrude");
        Ok(match g {
            Geometry::Point(p) => Geometry::LineString(self.point(p)),
            Geometry::LineString(l) => {
                Geometry::PolyhedralSurface(PolyhedralSurface::new(self.line(l)))
            }
            Geometry::Triangle(t) => Geometry::Solid(self.polygon(&Polygon::from_triangle(t))?),
            Geometry::Polygon(p) => Geometry::Solid(self.polygon(p)?),
            Geometry::PolyhedralSurface(s) => Geometry::Solid(self.surface(s)?),
            Geometry::TriangulatedSurface(s) => Geometry::Solid(self.tin(s)?),
            Geometry::Solid(_) => {
                return Err(OperationError::Unsupported("extrusion of a solid".into()).into());
            }
            Geometry::MultiPoint(m) => {
                let lines = m.geometries().iter().map(|p| self.point(p)).collect();
                Geometry::MultiLineString(MultiLineString::new(lines))
            }
            Geometry::MultiLineString(m) => Geometry::PolyhedralSurface(PolyhedralSurface::new(
                m.geometries().iter().flat_map(|l| self.line(l)).collect(),
            )),
            Geometry::MultiPolygon(m) => Geometry::MultiSolid(MultiSolid::new(
                m.geometries().iter().map(|p| self.polygon(p)).collect::<Result<_>>()?,
            )),
            Geometry::MultiSolid(_) => {
                return Err(OperationError::Unsupported("extrusion of a solid".into()).into());
            }
            Geometry::GeometryCollection(c) => Geometry::GeometryCollection(GeometryCollection::new(
                c.geometries().iter().map(|part| self.execute(part)).collect::<Result<_>>()?,
            )),
        })
    }

    fn moved(&self, p: &Point3) -> Point3 {
        p + &self.direction
    }

    fn point(&self, p: &Point) -> LineString {
        match p.to_point3() {
            Some(q) => LineString::from_points3([q.clone(), self.moved(&q)]),
            None => LineString::empty(),
        }
    }

    /// Outward wall swept by the edge `a -> b`.
    fn wall(&self, a: &Point3, b: &Point3) -> Polygon {
        closed_polygon(vec![a.clone(), b.clone(), self.moved(b), self.moved(a)])
    }

    fn line(&self, l: &LineString) -> Vec<Polygon> {
        l.exact_points3()
            .windows(2)
            .filter(|w| w[0] != w[1])
            .map(|w| self.wall(&w[0], &w[1]))
            .collect()
    }

    /// Side of the direction the ring normal points to.
    fn facing(&self, ring: &[Point3]) -> Ordering {
        sign(&newell_normal(ring).dot(&self.direction))
    }

    fn polygon(&self, p: &Polygon) -> Result<Solid> {
        let mut rings = polygon_rings_3d(p);
        if rings.is_empty() {
            return Ok(Solid::empty());
        }
        match self.facing(&rings[0]) {
            Ordering::Equal => {
                return Err(GeometryError::Invalid(
                    "polygon is degenerate or parallel to the extrusion direction".into(),
                )
                .into());
            }
            Ordering::Less => rings[0].reverse(),
            Ordering::Greater => {}
        }
        for hole in rings.iter_mut().skip(1) {
            if self.facing(hole) == Ordering::Greater {
                hole.reverse();
            }
        }

        let mut faces = Vec::with_capacity(2 + rings.iter().map(Vec::len).sum::<usize>());
        faces.push(ring_polygon(rings.iter().map(|r| r.iter().rev().cloned().collect())));
        faces.push(ring_polygon(
            rings.iter().map(|r| r.iter().map(|q| self.moved(q)).collect()),
        ));
        for ring in &rings {
            let n = ring.len();
            faces.extend((0..n).map(|k| self.wall(&ring[k], &ring[(k + 1) % n])));
        }
        Ok(Solid::new(PolyhedralSurface::new(faces)))
    }

    /// Bottom and top copies of a consistently oriented surface, closed by
    /// walls along its boundary edges.
    fn surface(&self, s: &PolyhedralSurface) -> Result<Solid> {
        let mut faces: Vec<Vec<Vec<Point3>>> = s
            .polygons()
            .iter()
            .map(polygon_rings_3d)
            .filter(|rings| !rings.is_empty())
            .collect();
        if faces.is_empty() {
            return Ok(Solid::empty());
        }
        let total = faces
            .iter()
            .map(|rings| newell_normal(&rings[0]))
            .fold(Vector3::zero(), |acc, n| &acc + &n);
        match sign(&total.dot(&self.direction)) {
            Ordering::Equal => {
                return Err(GeometryError::Invalid(
                    "surface is degenerate or parallel to the extrusion direction".into(),
                )
                .into());
            }
            Ordering::Less => {
                for ring in faces.iter_mut().flatten() {
                    ring.reverse();
                }
            }
            Ordering::Greater => {}
        }

        let directed: BTreeSet<(&Point3, &Point3)> = faces
            .iter()
            .flatten()
            .flat_map(|ring| {
                let n = ring.len();
                (0..n).map(move |k| (&ring[k], &ring[(k + 1) % n]))
            })
            .collect();
        let walls: Vec<Polygon> = directed
            .iter()
            .filter(|(a, b)| !directed.contains(&(*b, *a)))
            .map(|(a, b)| self.wall(a, b))
            .collect();

        let mut shell = Vec::with_capacity(2 * faces.len() + walls.len());
        for rings in &faces {
            shell.push(ring_polygon(rings.iter().map(|r| r.iter().rev().cloned().collect())));
        }
        for rings in &faces {
            shell.push(ring_polygon(
                rings.iter().map(|r| r.iter().map(|q| self.moved(q)).collect()),
            ));
        }
        shell.extend(walls);
        Ok(Solid::new(PolyhedralSurface::new(shell)))
    }

    fn tin(&self, s: &TriangulatedSurface) -> Result<Solid> {
        self.surface(&s.to_polyhedral_surface())
    }
}

fn closed_ring(mut ring: Vec<Point3>) -> LineString {
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    LineString::from_points3(ring)
}

fn closed_polygon(ring: Vec<Point3>) -> Polygon {
    Polygon::new(closed_ring(ring))
}

fn ring_polygon(rings: impl Iterator<Item = Vec<Point3>>) -> Polygon {
    let mut rings = rings.map(closed_ring);
    let exterior = rings.next().unwrap_or_default();
    Polygon::with_holes(exterior, rings.collect())
}

/// Extrudes `g` by `(dx, dy, dz)`. See [`Extrude`].
///
/// # Errors
///
/// See [`Extrude::new`] and [`Extrude::execute`].
pub fn extrude(g: &Geometry, dx: f64, dy: f64, dz: f64) -> Result<Geometry> {
    Extrude::new(dx, dy, dz)?.execute(g)
}
