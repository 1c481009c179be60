use super::polyhedral_surface::PolyhedralSurface;

/// Solid bounded by an exterior shell and optional interior shells (cavities).
///
/// A solid always holds at least one shell; an empty exterior shell is an
/// empty solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    shells: Vec<PolyhedralSurface>,
}

impl Default for Solid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Solid {
    #[must_use]
    pub fn new(exterior: PolyhedralSurface) -> Self {
        Self {
            shells: vec![exterior],
        }
    }

    #[must_use]
    pub fn with_interior_shells(
        exterior: PolyhedralSurface,
        interiors: Vec<PolyhedralSurface>,
    ) -> Self {
        let mut shells = vec![exterior];
        shells.extend(interiors);
        Self { shells }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(PolyhedralSurface::empty())
    }

    #[must_use]
    pub fn exterior_shell(&self) -> &PolyhedralSurface {
        &self.shells[0]
    }

    #[must_use]
    pub fn interior_shells(&self) -> &[PolyhedralSurface] {
        &self.shells[1..]
    }

    #[must_use]
    pub fn shells(&self) -> &[PolyhedralSurface] {
        &self.shells
    }

    #[must_use]
    pub fn num_shells(&self) -> usize {
        self.shells.len()
    }

    #[must_use]
    pub fn shell_n(&self, n: usize) -> Option<&PolyhedralSurface> {
        self.shells.get(n)
    }

    pub fn add_interior_shell(&mut self, shell: PolyhedralSurface) {
        self.shells.push(shell);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exterior_shell().is_empty()
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.exterior_shell().is_3d()
    }

    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.exterior_shell().is_measured()
    }
}
