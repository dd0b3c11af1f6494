pub mod consumption;

pub use consumption::*;
