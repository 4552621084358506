pub mod anchors;
pub mod fit;
pub mod text;
