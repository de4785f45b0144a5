//! CLI command implementations for Sophia.

pub mod keys;
pub mod serve;
pub mod token;
