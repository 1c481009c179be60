use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedDirectedEdgeHandle, FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation as SpadeCdt, HasPosition, InsertionError,
    PositionInTriangulation, Triangulation,
};
use tracing::{debug, trace};

use crate::error::{Result, TessellationError};
use crate::math::predicates::point_on_segment_3d;
use crate::math::projection::ProjectionPlane;
use crate::math::{Point2, Point3, Segment3, Triangle3};

/// Triangulation vertex: the `f64` position spade works with and the exact
/// point it was made from.
#[derive(Debug, Clone)]
pub struct CdtVertex {
    pub position: spade::Point2<f64>,
    pub original: Point3,
}

impl HasPosition for CdtVertex {
    type Scalar = f64;

    fn position(&self) -> spade::Point2<f64> {
        self.position
    }
}

/// Level of a face not reached by [`ConstraintDelaunayTriangulation::mark_domains`].
pub const UNVISITED: i32 = -1;

/// Constrained Delaunay triangulation of exact points.
///
/// Points are triangulated in the plane, or in a [`ProjectionPlane`] for
/// planar 3D input. After [`Self::mark_domains`] every finite face carries
/// a nesting level; odd levels lie inside the constrained rings.
///
/// spade sees `f64` positions only. Whenever rounding changes the
/// combinatorics of the input (distinct points sharing a position, crossing
/// constraints, a vertex landing on a constraint it is not exactly on) the
/// triangulation fails instead of returning approximated triangles.
pub struct ConstraintDelaunayTriangulation {
    cdt: SpadeCdt<CdtVertex>,
    projection: Option<ProjectionPlane>,
    levels: HashMap<usize, i32>,
    constraints: HashSet<(FixedVertexHandle, FixedVertexHandle)>,
}

impl Default for ConstraintDelaunayTriangulation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintDelaunayTriangulation {
    /// Triangulation of points in the xy plane.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cdt: SpadeCdt::new(),
            projection: None,
            levels: HashMap::new(),
            constraints: HashSet::new(),
        }
    }

    /// Triangulation of points lying on the plane of `projection`.
    #[must_use]
    pub fn with_projection(projection: ProjectionPlane) -> Self {
        Self {
            projection: Some(projection),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn projection(&self) -> Option<&ProjectionPlane> {
        self.projection.as_ref()
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.cdt.num_vertices()
    }

    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.cdt.num_inner_faces()
    }

    fn planar(&self, p: &Point3) -> Point2 {
        match &self.projection {
            Some(projection) => projection.project(p),
            None => p.to_2d(),
        }
    }

    /// Inserts a vertex; an existing vertex at the same exact point is
    /// reused.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::Failed`] when spade rejects the position
    /// or when a different exact point already rounds to it.
    pub fn add_vertex(&mut self, p: &Point3) -> Result<FixedVertexHandle> {
        let q = self.planar(p).to_na();
        let position = spade::Point2::new(q.x, q.y);
        if let PositionInTriangulation::OnVertex(existing) = self.cdt.locate(position) {
            if self.cdt.vertex(existing).data().original == *p {
                return Ok(existing);
            }
            debug!(x = q.x, y = q.y, "distinct exact points round to one position");
            return Err(TessellationError::Failed(format!(
                "distinct points round to the same position ({}, {})",
                q.x, q.y
            ))
            .into());
        }
        self.levels.clear();
        self.cdt
            .insert(CdtVertex {
                position,
                original: p.clone(),
            })
            .map_err(|e: InsertionError| {
                TessellationError::Failed(format!("CDT insert: {e}")).into()
            })
    }

    /// Constrains the edge between two inserted vertices.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::Failed`] when the edge crosses an
    /// earlier constraint.
    pub fn add_constraint(&mut self, from: FixedVertexHandle, to: FixedVertexHandle) -> Result<()> {
        if from == to {
            return Ok(());
        }
        if !self.cdt.can_add_constraint(from, to) {
            return Err(TessellationError::Failed(
                "constraint crosses an earlier constraint".into(),
            )
            .into());
        }
        self.levels.clear();
        self.cdt.add_constraint(from, to);
        self.constraints.insert(ordered(from, to));
        Ok(())
    }

    /// Inserts a closed ring of constraints, the closing edge included.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_vertex`] and [`Self::add_constraint`].
    pub fn add_ring(&mut self, ring: &[Point3]) -> Result<()> {
        let mut handles = Vec::with_capacity(ring.len());
        for p in ring {
            handles.push(self.add_vertex(p)?);
        }
        for i in 0..handles.len() {
            self.add_constraint(handles[i], handles[(i + 1) % handles.len()])?;
        }
        Ok(())
    }

    /// Inserts a 2D ring.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_ring`].
    pub fn add_ring_2d(&mut self, ring: &[Point2]) -> Result<()> {
        let lifted: Vec<Point3> = ring.iter().map(Point2::to_3d).collect();
        self.add_ring(&lifted)
    }

    fn is_constrained(&self, edge: FixedDirectedEdgeHandle) -> bool {
        let edge = self.cdt.directed_edge(edge);
        self.cdt.is_constraint_edge(edge.as_undirected().fix())
    }

    /// Assigns a nesting level to every finite face.
    ///
    /// The flood starts from the outer face at level 0 and stops at
    /// constrained edges, which are queued as border edges. Each border
    /// edge then starts a new flood one level deeper on its unvisited side.
    pub fn mark_domains(&mut self) {
        self.levels.clear();
        let mut border: VecDeque<(i32, FixedDirectedEdgeHandle)> = VecDeque::new();

        let outer = self.cdt.outer_face().fix();
        let mut seeds = Vec::new();
        for edge in self.cdt.directed_edges() {
            if edge.face().fix() == outer {
                seeds.push(edge.fix());
            }
        }
        for edge in seeds {
            if self.is_constrained(edge) {
                border.push_back((0, edge));
                continue;
            }
            let inner = self.cdt.directed_edge(edge).rev().face().as_inner().map(|f| f.fix());
            if let Some(start) = inner {
                self.flood(start, 0, &mut border);
            }
        }

        while let Some((level, edge)) = border.pop_front() {
            let neighbor = self.cdt.directed_edge(edge).rev().face().as_inner().map(|f| f.fix());
            let Some(neighbor) = neighbor else {
                continue;
            };
            if self.level(neighbor) == UNVISITED {
                self.flood(neighbor, level + 1, &mut border);
            }
        }
        trace!(faces = self.levels.len(), "marked triangulation domains");
    }

    fn flood(
        &mut self,
        start: FixedFaceHandle<InnerTag>,
        level: i32,
        border: &mut VecDeque<(i32, FixedDirectedEdgeHandle)>,
    ) {
        if self.level(start) != UNVISITED {
            return;
        }
        let mut queue = VecDeque::from([start]);
        self.levels.insert(start.index(), level);
        while let Some(face) = queue.pop_front() {
            let edges: Vec<FixedDirectedEdgeHandle> = self
                .cdt
                .face(face)
                .adjacent_edges()
                .iter()
                .map(|e| e.fix())
                .collect();
            for edge in edges {
                let neighbor =
                    self.cdt.directed_edge(edge).rev().face().as_inner().map(|f| f.fix());
                let Some(neighbor) = neighbor else {
                    continue;
                };
                if self.level(neighbor) != UNVISITED {
                    continue;
                }
                if self.is_constrained(edge) {
                    border.push_back((level, edge));
                } else {
                    self.levels.insert(neighbor.index(), level);
                    queue.push_back(neighbor);
                }
            }
        }
    }

    /// Nesting level of a face, [`UNVISITED`] before marking.
    #[must_use]
    pub fn level(&self, face: FixedFaceHandle<InnerTag>) -> i32 {
        self.levels.get(&face.index()).copied().unwrap_or(UNVISITED)
    }

    /// Levels of every finite face.
    #[must_use]
    pub fn levels(&self) -> Vec<i32> {
        self.cdt.inner_faces().map(|f| self.level(f.fix())).collect()
    }

    /// Level pairs of adjacent finite faces with whether their shared edge
    /// is constrained, one entry per interior edge.
    #[must_use]
    pub fn constrained_adjacencies(&self) -> Vec<(i32, i32, bool)> {
        let mut out = Vec::new();
        for edge in self.cdt.directed_edges() {
            let (Some(left), Some(right)) = (edge.face().as_inner(), edge.rev().face().as_inner())
            else {
                continue;
            };
            if left.fix().index() < right.fix().index() {
                out.push((
                    self.level(left.fix()),
                    self.level(right.fix()),
                    self.cdt.is_constraint_edge(edge.as_undirected().fix()),
                ));
            }
        }
        out
    }

    /// Checks that every constrained edge spade holds lies exactly on one of
    /// the inserted constraints. spade splits a constraint at any vertex its
    /// `f64` position touches, so a split edge is only faithful when the
    /// splitting vertex is on the exact segment too.
    fn check_constraints(&self) -> Result<()> {
        for edge in self.cdt.directed_edges() {
            let (from, to) = (edge.from().fix(), edge.to().fix());
            if from.index() > to.index()
                || !self.cdt.is_constraint_edge(edge.as_undirected().fix())
                || self.constraints.contains(&(from, to))
            {
                continue;
            }
            let (from_vertex, to_vertex) = (edge.from(), edge.to());
            let a = &from_vertex.data().original;
            let b = &to_vertex.data().original;
            let on_inserted = self.constraints.iter().any(|(s, t)| {
                let segment = Segment3::new(
                    self.cdt.vertex(*s).data().original.clone(),
                    self.cdt.vertex(*t).data().original.clone(),
                );
                point_on_segment_3d(a, &segment) && point_on_segment_3d(b, &segment)
            });
            if !on_inserted {
                return Err(TessellationError::Failed(
                    "a vertex rounds onto a constraint it does not lie on".into(),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Exact triangles of the faces with an odd nesting level, in the
    /// counter-clockwise order of the triangulation plane.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::Failed`] when a constrained edge was
    /// split at a vertex that is not exactly on it.
    pub fn domain_triangles(&self) -> Result<Vec<Triangle3>> {
        self.check_constraints()?;
        let mut out = Vec::new();
        for face in self.cdt.inner_faces() {
            if self.level(face.fix()) % 2 != 1 {
                continue;
            }
            let [a, b, c] = face.vertices();
            out.push(Triangle3::new(
                a.data().original.clone(),
                b.data().original.clone(),
                c.data().original.clone(),
            ));
        }
        Ok(out)
    }
}

fn ordered(a: FixedVertexHandle, b: FixedVertexHandle) -> (FixedVertexHandle, FixedVertexHandle) {
    if a.index() <= b.index() {
        (a, b)
    } else {
        (b, a)
    }
}
