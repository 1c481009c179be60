use super::line_string::LineString;
use super::triangle::Triangle;

/// SFA polygon: an exterior ring followed by interior rings.
///
/// The exterior ring is always present; an empty exterior ring is an empty
/// polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<LineString>,
}

impl Default for Polygon {
    fn default() -> Self {
        Self::empty()
    }
}

impl Polygon {
    #[must_use]
    pub fn new(exterior: LineString) -> Self {
        Self {
            rings: vec![exterior],
        }
    }

    #[must_use]
    pub fn with_holes(exterior: LineString, holes: Vec<LineString>) -> Self {
        let mut rings = Vec::with_capacity(holes.len() + 1);
        rings.push(exterior);
        rings.extend(holes);
        Self { rings }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(LineString::empty())
    }

    #[must_use]
    pub fn from_triangle(t: &Triangle) -> Self {
        if t.is_empty() {
            return Self::empty();
        }
        let mut ring: Vec<_> = t.vertices().to_vec();
        ring.push(t.vertices()[0].clone());
        Self::new(LineString::new(ring))
    }

    #[must_use]
    pub fn exterior_ring(&self) -> &LineString {
        &self.rings[0]
    }

    #[must_use]
    pub fn interior_rings(&self) -> &[LineString] {
        &self.rings[1..]
    }

    #[must_use]
    pub fn num_interior_rings(&self) -> usize {
        self.rings.len() - 1
    }

    #[must_use]
    pub fn interior_ring_n(&self, n: usize) -> Option<&LineString> {
        self.rings.get(n + 1)
    }

    pub fn add_interior_ring(&mut self, ring: LineString) {
        self.rings.push(ring);
    }

    /// All rings, exterior first.
    #[must_use]
    pub fn rings(&self) -> &[LineString] {
        &self.rings
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exterior_ring().is_empty()
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.exterior_ring().is_3d()
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.exterior_ring().is_measured()
    }

    #[must_use]
    pub fn map_rings(&self, f: impl Fn(&LineString) -> LineString) -> Self {
        Self {
            rings: self.rings.iter().map(f).collect(),
        }
    }
}
