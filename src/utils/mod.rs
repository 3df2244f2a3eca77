//! Utility functions and helpers.

pub mod fs;
pub mod git;

// Re-exports for convenience
pub use fs::*;
