//! Measures and validity of geometries.

mod area;
mod is_valid;
mod length;

pub use area::{area, area_3d, signed_area};
pub use is_valid::{is_valid, Validity};
pub use length::{length, length_3d};
