//! Shared test utilities for keyturn
//!
//! Helpers for the live AWS integration tests, kept in their own crate so
//! they can be shared without pulling test code into the main crates.
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection, disposable test principals and unique names

pub mod aws;

// Re-export commonly used items
pub use aws::{get_test_region, test_principal, test_run_id};
