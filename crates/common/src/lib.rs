//! Common utilities shared across the brokkr codec crates.
//!
//! This crate provides the small pieces the ABI crate leans on everywhere:
//! hex string conversion and balanced-delimiter scanning for type parsing.

/// General utility functions and types for common tasks.
pub mod utils;
