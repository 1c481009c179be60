mod extrude;

pub use extrude::{extrude, Extrude};
