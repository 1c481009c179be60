pub mod intersect_2d;
pub mod intersect_3d;
pub mod number;
pub mod point;
pub mod polygon_2d;
pub mod polygon_set_2d;
pub mod predicates;
pub mod primitives;
pub mod projection;

pub use number::{ft, ft_from_f64, ft_to_f64, round_ft, Ft};
pub use point::{Point2, Point3, Vector2, Vector3};
pub use polygon_2d::PolygonWithHoles2;
pub use primitives::{Plane3, Segment2, Segment3, Triangle2, Triangle3};

/// Absolute tolerance used when comparing aggregate measures.
pub const COVERS_TOLERANCE: f64 = 1e-9;
