//! Credential rotation
//!
//! - [`engine`]: deactivate, delete and re-issue per principal
//! - [`confirm`]: operator confirmation before destructive steps

pub mod confirm;
pub mod engine;

pub use confirm::{Confirm, TerminalConfirm, ask};
pub use engine::{
    NOTIFY_TARGET, PlannedAction, PrincipalOutcome, PrincipalReport, RotationEngine,
    RotationOptions, RotationReport, SkipReason,
};
