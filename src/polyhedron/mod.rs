//! Triangle-mesh polyhedra: the volume primitive of 3D geometry sets.

mod classify;
mod corefine;
mod orientation;
mod split;

use std::collections::{HashMap, HashSet};

use num_traits::{Signed, Zero};

pub use classify::classify_point;
pub use corefine::{corefine, CorefineOp};
pub use orientation::{orient_triangles, repeated_half_edge};
pub use split::{conform_t_junctions, split_triangle};

use crate::error::{GeometryError, Result};
use crate::geometry::{Polygon, PolyhedralSurface, Solid, Triangle, TriangulatedSurface};
use crate::math::predicates::{orient3d_det, PointClassification};
use crate::math::{ft, Ft, Point3, Triangle3};
use crate::spatial::{equivalence_classes, Bbox};
use crate::tessellation::triangulate_polyhedral_surface;

/// Indexed triangle mesh with exact vertices.
///
/// Vertices are shared between faces; faces are vertex index triples. Edges
/// can carry a mark, set on edges created by corefinement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyhedron {
    vertices: Vec<Point3>,
    faces: Vec<[usize; 3]>,
    marked: HashSet<(usize, usize)>,
}

fn undirected(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Shared vertices and index faces of a triangle list; faces collapsed to a
/// segment or a point are dropped.
fn index_triangles(triangles: &[Triangle3]) -> (Vec<Point3>, Vec<[usize; 3]>) {
    let mut vertices = Vec::new();
    let mut index: HashMap<Point3, usize> = HashMap::new();
    let mut faces = Vec::with_capacity(triangles.len());
    for t in triangles {
        let mut face = [0usize; 3];
        for (slot, p) in face.iter_mut().zip(&t.vertices) {
            *slot = *index.entry(p.clone()).or_insert_with(|| {
                vertices.push(p.clone());
                vertices.len() - 1
            });
        }
        if face[0] != face[1] && face[1] != face[2] && face[2] != face[0] {
            faces.push(face);
        }
    }
    (vertices, faces)
}

impl Polyhedron {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh of consistently oriented triangles.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OrientationConflict`] when two triangles walk
    /// a shared edge in the same direction.
    pub fn from_triangles(triangles: &[Triangle3]) -> Result<Self> {
        let (vertices, faces) = index_triangles(triangles);
        if let Some((a, b)) = repeated_half_edge(&faces) {
            return Err(GeometryError::OrientationConflict(format!(
                "half-edge {a}->{b} is used twice, orient the triangles first"
            ))
            .into());
        }
        Ok(Self {
            vertices,
            faces,
            marked: HashSet::new(),
        })
    }

    /// Mesh of triangles in any orientation. Triangles are oriented
    /// consistently and closed meshes are turned outward.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OrientationConflict`] for non-orientable
    /// input.
    pub fn from_triangle_soup(triangles: &[Triangle3]) -> Result<Self> {
        let (vertices, mut faces) = index_triangles(triangles);
        orient_triangles(&mut faces)?;
        let mut polyhedron = Self {
            vertices,
            faces,
            marked: HashSet::new(),
        };
        if polyhedron.is_closed() && polyhedron.volume().is_negative() {
            polyhedron = polyhedron.reversed();
        }
        Ok(polyhedron)
    }

    /// # Errors
    ///
    /// Same as [`Self::from_triangles`].
    pub fn from_triangulated_surface(s: &TriangulatedSurface) -> Result<Self> {
        let triangles: Vec<Triangle3> =
            s.triangles().iter().filter_map(Triangle::to_triangle3).collect();
        Self::from_triangles(&triangles)
    }

    /// Triangulates every face and orients the resulting soup.
    ///
    /// # Errors
    ///
    /// Fails on degenerate faces and on non-orientable surfaces.
    pub fn from_polyhedral_surface(s: &PolyhedralSurface) -> Result<Self> {
        Self::from_triangle_soup(&triangulate_polyhedral_surface(s)?)
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn num_facets(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    #[must_use]
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    fn triangle(&self, face: &[usize; 3]) -> Triangle3 {
        let [a, b, c] = face;
        Triangle3::new(
            self.vertices[*a].clone(),
            self.vertices[*b].clone(),
            self.vertices[*c].clone(),
        )
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle3> + '_ {
        self.faces.iter().map(|f| self.triangle(f))
    }

    /// Every edge is shared by exactly two faces walking it in opposite
    /// directions.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }
        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        for f in &self.faces {
            for i in 0..3 {
                *directed.entry((f[i], f[(i + 1) % 3])).or_default() += 1;
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }

    /// Signed enclosed volume, positive for outward-oriented closed meshes.
    #[must_use]
    pub fn volume(&self) -> Ft {
        let origin = Point3::from_i64(0, 0, 0);
        let sum = self
            .triangles()
            .map(|t| {
                let [a, b, c] = &t.vertices;
                orient3d_det(a, b, c, &origin)
            })
            .fold(Ft::zero(), |acc, v| acc + v);
        -sum / ft(6)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    #[must_use]
    pub fn bbox(&self) -> Bbox {
        Bbox::from_points_3d(&self.vertices)
    }

    /// Same mesh with every face reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            faces: self.faces.iter().map(|[a, b, c]| [*a, *c, *b]).collect(),
            marked: self.marked.clone(),
        }
    }

    /// Edge-connected components.
    #[must_use]
    pub fn components(&self) -> Vec<Self> {
        let mut first_user: HashMap<(usize, usize), usize> = HashMap::new();
        let mut shared = Vec::new();
        for (i, f) in self.faces.iter().enumerate() {
            for k in 0..3 {
                let key = undirected(f[k], f[(k + 1) % 3]);
                match first_user.get(&key) {
                    Some(&j) => shared.push((i, j)),
                    None => {
                        first_user.insert(key, i);
                    }
                }
            }
        }
        let groups = equivalence_classes(self.faces.len(), shared);
        groups
            .into_iter()
            .map(|faces| {
                let triangles: Vec<Triangle3> =
                    faces.iter().map(|&i| self.triangle(&self.faces[i])).collect();
                let (vertices, faces) = index_triangles(&triangles);
                let mut part = Self {
                    vertices,
                    faces,
                    marked: HashSet::new(),
                };
                for (a, b) in self.marked_edges() {
                    part.mark_edge(&a, &b);
                }
                part
            })
            .collect()
    }

    /// Concatenates meshes, sharing equal vertices. Face orientations and
    /// edge marks are kept.
    #[must_use]
    pub fn merged(parts: &[Self]) -> Self {
        let triangles: Vec<Triangle3> = parts.iter().flat_map(Self::triangles).collect();
        let (vertices, faces) = index_triangles(&triangles);
        let mut merged = Self {
            vertices,
            faces,
            marked: HashSet::new(),
        };
        for (a, b) in parts.iter().flat_map(Self::marked_edges) {
            merged.mark_edge(&a, &b);
        }
        merged
    }

    /// Splits the mesh into solids: every outward component together with
    /// the inward components (cavities) it immediately encloses.
    #[must_use]
    pub fn solids(&self) -> Vec<Self> {
        let (shells, cavities): (Vec<Self>, Vec<Self>) = self
            .components()
            .into_iter()
            .partition(|c| !c.is_closed() || !c.volume().is_negative());
        let mut groups: Vec<Vec<Self>> = shells.into_iter().map(|s| vec![s]).collect();
        for cavity in cavities {
            let Some(sample) = cavity.vertices.first() else {
                continue;
            };
            let owner = groups
                .iter()
                .enumerate()
                .filter(|(_, g)| g[0].classify_point(sample) == PointClassification::Inside)
                .min_by(|(_, x), (_, y)| x[0].volume().cmp(&y[0].volume()))
                .map(|(i, _)| i);
            match owner {
                Some(i) => groups[i].push(cavity),
                None => groups.push(vec![cavity]),
            }
        }
        groups.iter().map(|g| Self::merged(g)).collect()
    }

    fn vertex_index(&self, p: &Point3) -> Option<usize> {
        self.vertices.iter().position(|v| v == p)
    }

    /// Marks the edge between two vertices. Returns `false` when the mesh
    /// has no such edge.
    pub fn mark_edge(&mut self, a: &Point3, b: &Point3) -> bool {
        let (Some(i), Some(j)) = (self.vertex_index(a), self.vertex_index(b)) else {
            return false;
        };
        let key = undirected(i, j);
        let exists = self
            .faces
            .iter()
            .any(|f| (0..3).any(|k| undirected(f[k], f[(k + 1) % 3]) == key));
        if exists {
            self.marked.insert(key);
        }
        exists
    }

    #[must_use]
    pub fn is_marked(&self, a: &Point3, b: &Point3) -> bool {
        match (self.vertex_index(a), self.vertex_index(b)) {
            (Some(i), Some(j)) => self.marked.contains(&undirected(i, j)),
            _ => false,
        }
    }

    pub fn marked_edges(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        self.marked
            .iter()
            .map(|(a, b)| (self.vertices[*a].clone(), self.vertices[*b].clone()))
    }

    /// Locates a point against the enclosed volume.
    #[must_use]
    pub fn classify_point(&self, p: &Point3) -> PointClassification {
        classify_point(self, p)
    }

    #[must_use]
    pub fn to_polyhedral_surface(&self) -> PolyhedralSurface {
        PolyhedralSurface::new(
            self.triangles()
                .map(|t| Polygon::from_triangle(&Triangle::from_triangle3(&t)))
                .collect(),
        )
    }

    #[must_use]
    pub fn to_triangulated_surface(&self) -> TriangulatedSurface {
        TriangulatedSurface::new(self.triangles().map(|t| Triangle::from_triangle3(&t)).collect())
    }

    /// Solid whose exterior shell is the outward component of largest
    /// volume; the other components become interior shells.
    #[must_use]
    pub fn to_solid(&self) -> Solid {
        let mut parts = self.components();
        let largest = (0..parts.len()).max_by(|&i, &j| parts[i].volume().cmp(&parts[j].volume()));
        let Some(exterior) = largest else {
            return Solid::empty();
        };
        let exterior = parts.swap_remove(exterior);
        Solid::with_interior_shells(
            exterior.to_polyhedral_surface(),
            parts.iter().map(Self::to_polyhedral_surface).collect(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SfgeomError;
    use crate::geometry::LineString;

    pub(crate) fn p(x: i64, y: i64, z: i64) -> Point3 {
        Point3::from_i64(x, y, z)
    }

    /// Outward-oriented axis-aligned box.
    pub(crate) fn cube(min: (i64, i64, i64), size: i64) -> Polyhedron {
        let (x, y, z) = min;
        let v = |i: i64, j: i64, k: i64| p(x + i * size, y + j * size, z + k * size);
        let quads = [
            [v(0, 0, 0), v(0, 1, 0), v(1, 1, 0), v(1, 0, 0)],
            [v(0, 0, 1), v(1, 0, 1), v(1, 1, 1), v(0, 1, 1)],
            [v(0, 0, 0), v(1, 0, 0), v(1, 0, 1), v(0, 0, 1)],
            [v(0, 1, 0), v(0, 1, 1), v(1, 1, 1), v(1, 1, 0)],
            [v(0, 0, 0), v(0, 0, 1), v(0, 1, 1), v(0, 1, 0)],
            [v(1, 0, 0), v(1, 1, 0), v(1, 1, 1), v(1, 0, 1)],
        ];
        let triangles: Vec<Triangle3> = quads
            .iter()
            .flat_map(|[a, b, c, d]| {
                [
                    Triangle3::new(a.clone(), b.clone(), c.clone()),
                    Triangle3::new(a.clone(), c.clone(), d.clone()),
                ]
            })
            .collect();
        Polyhedron::from_triangles(&triangles).unwrap()
    }

    #[test]
    fn cube_is_closed_with_positive_volume() {
        let c = cube((0, 0, 0), 2);
        assert!(c.is_closed());
        assert_eq!(c.num_vertices(), 8);
        assert_eq!(c.num_facets(), 12);
        assert_eq!(c.volume(), ft(8));
        assert_eq!(c.reversed().volume(), ft(-8));
        assert!((c.area() - 24.0).abs() < 1e-12);
    }

    #[test]
    fn soup_is_turned_outward() {
        let c = cube((0, 0, 0), 1).reversed();
        let triangles: Vec<Triangle3> = c.triangles().collect();
        let soup = Polyhedron::from_triangle_soup(&triangles).unwrap();
        assert_eq!(soup.volume(), ft(1));
    }

    #[test]
    fn repeated_half_edges_are_rejected() {
        let t = Triangle3::new(p(0, 0, 0), p(1, 0, 0), p(0, 1, 0));
        let u = Triangle3::new(p(0, 0, 0), p(1, 0, 0), p(0, -1, 0));
        assert!(matches!(
            Polyhedron::from_triangles(&[t.clone(), u.clone()]),
            Err(SfgeomError::Geometry(GeometryError::OrientationConflict(_)))
        ));
        assert_eq!(Polyhedron::from_triangle_soup(&[t, u]).unwrap().num_facets(), 2);
    }

    #[test]
    fn adjoining_squares_share_their_edge() {
        let square = |pts: [Point3; 4]| {
            let mut ring: Vec<Point3> = pts.to_vec();
            ring.push(pts[0].clone());
            Polygon::new(LineString::from_points3(ring))
        };
        let surface = PolyhedralSurface::new(vec![
            square([p(0, 0, 0), p(0, 1, 0), p(1, 1, 0), p(1, 0, 0)]),
            square([p(1, 0, 0), p(1, 1, 0), p(2, 1, 0), p(2, 0, 0)]),
        ]);
        let poly = Polyhedron::from_polyhedral_surface(&surface).unwrap();
        assert_eq!(poly.num_facets(), 4);
        assert_eq!(poly.num_vertices(), 6);
        assert!(!poly.is_closed());
    }

    #[test]
    fn components_split_disjoint_shells() {
        let mut triangles: Vec<Triangle3> = cube((0, 0, 0), 1).triangles().collect();
        triangles.extend(cube((5, 5, 5), 1).triangles());
        let both = Polyhedron::from_triangles(&triangles).unwrap();
        let parts = both.components();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(Polyhedron::is_closed));
    }

    #[test]
    fn cavities_stay_with_their_shell() {
        let mut parts = vec![cube((0, 0, 0), 4), cube((1, 1, 1), 2).reversed()];
        parts.push(cube((10, 0, 0), 1));
        let all = Polyhedron::merged(&parts);
        assert_eq!(all.volume(), ft(64 - 8 + 1));

        let solids = all.solids();
        assert_eq!(solids.len(), 2);
        assert_eq!(solids[0].volume(), ft(56));
        assert_eq!(solids[1].volume(), ft(1));

        let solid = solids[0].to_solid();
        assert_eq!(solid.num_shells(), 2);
        assert_eq!(solid.exterior_shell().num_polygons(), 12);
    }

    #[test]
    fn edge_marks_follow_vertices() {
        let mut c = cube((0, 0, 0), 1);
        assert!(c.mark_edge(&p(0, 0, 0), &p(1, 0, 0)));
        assert!(!c.mark_edge(&p(0, 0, 0), &p(1, 1, 1)));
        assert!(c.is_marked(&p(1, 0, 0), &p(0, 0, 0)));
        assert_eq!(c.marked_edges().count(), 1);
    }
}
