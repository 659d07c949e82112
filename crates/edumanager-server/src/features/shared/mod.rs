//! Shared utilities for feature modules
//!
//! - **validation**: input validation utilities
//! - **error_helpers**: database constraint error mapping
//! - **test_helpers**: fixtures for database tests (test-only)

pub mod error_helpers;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use validation::{validate_email, validate_name, validate_password};
