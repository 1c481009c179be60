//! Convex hulls in the plane and in space.

mod hull_2d;
mod hull_3d;

pub use hull_2d::convex_hull;
pub(crate) use hull_2d::monotone_chain;
pub use hull_3d::convex_hull_3d;
