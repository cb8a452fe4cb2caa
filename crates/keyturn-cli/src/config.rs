//! Configuration types for the keyturn commands

use std::path::PathBuf;

use keyturn_common::defaults::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_FILE, DEFAULT_PASSWORD_LENGTH,
};
use keyturn_common::{DisplayZone, StalePolicy};

use crate::inventory::PrincipalSelection;

/// AWS connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Region override; IAM is global, this only steers the endpoint
    pub region: Option<String>,
    /// Named profile from the shared config files
    pub profile: Option<String>,
    /// Total attempts per request under the SDK's standard retry mode
    pub max_attempts: u32,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Which principals to inventory and how to classify their credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    pub selection: PrincipalSelection,
    pub policy: StalePolicy,
    /// Principals fetched at once
    pub concurrency: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            selection: PrincipalSelection::default(),
            policy: StalePolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Where and how results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON on stdout
    #[default]
    Json,
    /// Human-readable table on stdout
    Table,
    /// Pretty JSON written to the output file
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_file: PathBuf,
    pub zone: DisplayZone,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            zone: DisplayZone::default(),
        }
    }
}

/// Rotation behavior flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationFlags {
    /// Skip every confirmation prompt
    pub auto_confirm: bool,
    /// Plan only, mutate nothing
    pub dry_run: bool,
    /// Emit a notification event per issued credential
    pub notify: bool,
    /// Never rotate the caller's own credentials
    pub skip_current_user: bool,
    pub password_length: usize,
}

impl Default for RotationFlags {
    fn default() -> Self {
        Self {
            auto_confirm: false,
            dry_run: false,
            notify: false,
            skip_current_user: false,
            password_length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

/// Configuration for the listing commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListConfig {
    pub inventory: InventoryConfig,
    pub output: OutputConfig,
}

/// Configuration for the rotate commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotateConfig {
    pub list: ListConfig,
    pub flags: RotationFlags,
}
