//! keyturn-common - Shared credential types and policies
//!
//! This crate holds the provider-independent pieces of keyturn, without any
//! AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values
//! - [`model`]: Principals, credentials, inventory items and rotation results
//! - [`policy`]: Staleness classification and display time zones
//! - [`secret`]: Console password generation

pub mod defaults;
pub mod model;
pub mod policy;
pub mod secret;

// Re-export commonly used types
pub use model::{
    AccessKey, CredentialKind, InventoryItem, IssuedSecret, KeyStatus, LoginCredential, Principal,
    PrincipalKeys, RotationResult,
};
pub use policy::{DisplayZone, InvalidTimeZone, StalePolicy, is_stale};
pub use secret::{SecretError, generate_secret};
