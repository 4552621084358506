pub mod compose;
pub mod layer;
pub mod probe;
