//! EduManager Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the EduManager workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`EduError`] and the [`Result`] alias
//! - **Logging**: centralized `tracing` subscriber setup ([`logging`])
//! - **Types**: workflow status labels and account roles ([`types`])
//!
//! # Example
//!
//! ```no_run
//! use edumanager_common::types::MateriaStatus;
//!
//! let status: MateriaStatus = "Em andamento".parse().unwrap();
//! assert!(!status.is_done());
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{EduError, Result};
pub use types::{MateriaStatus, UserRole};
