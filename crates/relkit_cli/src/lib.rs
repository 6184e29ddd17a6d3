//! relkit CLI library exports for integration testing.
//!
//! This module exposes command implementations for use in tests.

pub mod commands;
pub mod errors;
