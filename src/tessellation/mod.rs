//! Constrained Delaunay triangulation of polygons and surfaces.

mod cdt;
mod tessellate_geometry;
mod triangulate_polygon;

pub use cdt::{CdtVertex, ConstraintDelaunayTriangulation, UNVISITED};
pub use tessellate_geometry::tesselate;
pub(crate) use triangulate_polygon::newell_normal;
pub use triangulate_polygon::{
    open_ring_3d, polygon_rings_3d, supporting_plane, triangulate_polygon_2d,
    triangulate_polygon_3d, triangulate_polyhedral_surface, triangulate_rings_3d,
};
