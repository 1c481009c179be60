pub mod bbox;
pub mod box_intersection;
pub mod cluster;

pub use bbox::Bbox;
pub use box_intersection::{box_intersection, self_box_intersection};
pub use cluster::{cluster_boxes, equivalence_classes, ElementKey};
