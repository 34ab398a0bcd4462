//! Request and response models

pub mod predict;
pub mod baseline;
pub mod report;

pub use predict::*;
pub use baseline::*;
pub use report::*;
