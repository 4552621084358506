//! Adapters for the external generators: batch speech synthesis and code highlighting.

pub mod highlight;
pub mod speech;
