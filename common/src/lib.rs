//! Shared modules for the FaunaDB explorer.

pub mod config;
pub mod errors;
pub mod models;
pub mod utils;
