use super::polygon::Polygon;
use super::triangle::Triangle;

/// Surface made of polygonal faces sharing edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyhedralSurface {
    polygons: Vec<Polygon>,
}

impl PolyhedralSurface {
    #[must_use]
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[must_use]
    pub fn num_polygons(&self) -> usize {
        self.polygons.len()
    }

    #[must_use]
    pub fn polygon_n(&self, n: usize) -> Option<&Polygon> {
        self.polygons.get(n)
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.polygons.first().is_some_and(Polygon::is_3d)
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.polygons.first().is_some_and(Polygon::is_measured)
    }
}

/// Triangulated irregular network.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangulatedSurface {
    triangles: Vec<Triangle>,
}

impl TriangulatedSurface {
    #[must_use]
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn triangle_n(&self, n: usize) -> Option<&Triangle> {
        self.triangles.get(n)
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.triangles.first().is_some_and(Triangle::is_3d)
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.triangles.first().is_some_and(Triangle::is_measured)
    }

    /// The same faces as a polyhedral surface.
    #[must_use]
    pub fn to_polyhedral_surface(&self) -> PolyhedralSurface {
        PolyhedralSurface::new(self.triangles.iter().map(Polygon::from_triangle).collect())
    }
}
