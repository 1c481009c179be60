//! Exact-arithmetic Simple Features geometry kernel.
//!
//! Geometries are decomposed into [`set::GeometrySet`]s of primitives
//! (points, segments, surfaces, volumes), combined pairwise under exact
//! rational arithmetic, and recomposed into [`geometry::Geometry`] values.

pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod polyhedron;
pub mod set;
pub mod spatial;
pub mod tessellation;

pub use error::{Result, SfgeomError};
