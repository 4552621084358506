pub mod model;
pub mod segment;
