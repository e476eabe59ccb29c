// Utility functions
pub mod error;
pub mod timestamp;

pub use error::*;
pub use timestamp::*;
