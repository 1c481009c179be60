pub mod boolean;
pub mod hull;
pub mod offset;
pub mod query;
pub mod shaping;
