use super::point::Point;
use crate::math::{Triangle2, Triangle3};

/// SFA triangle. Either all three vertices are empty or none is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Triangle {
    vertices: [Point; 3],
}

impl Triangle {
    #[must_use]
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_triangle2(t: &Triangle2) -> Self {
        let [a, b, c] = t.vertices.clone();
        Self::new(a.into(), b.into(), c.into())
    }

    #[must_use]
    pub fn from_triangle3(t: &Triangle3) -> Self {
        let [a, b, c] = t.vertices.clone();
        Self::new(a.into(), b.into(), c.into())
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point; 3] {
        &self.vertices
    }

    /// Vertex `i` modulo 3.
    #[must_use]
    pub fn vertex(&self, i: usize) -> &Point {
        &self.vertices[i % 3]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.iter().any(Point::is_empty)
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.vertices[0].is_3d()
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.vertices[0].is_measured()
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let [a, b, c] = self.vertices.clone();
        Self::new(a, c, b)
    }

    #[must_use]
    pub fn to_triangle2(&self) -> Option<Triangle2> {
        let [a, b, c] = &self.vertices;
        Some(Triangle2::new(a.to_point2()?, b.to_point2()?, c.to_point2()?))
    }

    #[must_use]
    pub fn to_triangle3(&self) -> Option<Triangle3> {
        let [a, b, c] = &self.vertices;
        Some(Triangle3::new(a.to_point3()?, b.to_point3()?, c.to_point3()?))
    }

    #[must_use]
    pub fn map_vertices(&self, f: impl Fn(&Point) -> Point) -> Self {
        Self {
            vertices: self.vertices.each_ref().map(f),
        }
    }
}
