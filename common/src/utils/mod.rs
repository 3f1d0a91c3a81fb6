//! Utility functions and helpers.

pub mod env_file;

// Re-export commonly used functions
pub use env_file::read_key;
