//! Planar growth operations: Minkowski sums, disk offsets and straight
//! skeletons.

mod minkowski;
mod offset_2d;
mod straight_skeleton;

pub use minkowski::minkowski_sum;
pub use offset_2d::{offset, Offset2D, DEFAULT_QUARTER_SEGMENTS};
pub use straight_skeleton::{straight_skeleton, StraightSkeleton};
