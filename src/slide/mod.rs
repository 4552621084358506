pub mod model;
pub mod voice_over;
