//! Default configuration values shared across keyturn components
//!
//! These constants keep the CLI defaults and the engine's fallbacks in sync.

/// Default display time zone for rendered timestamps
pub const DEFAULT_TIME_ZONE: &str = "America/Santo_Domingo";

/// Default staleness threshold in days
pub const DEFAULT_STALE_DAYS: u32 = 90;

/// Days before the threshold at which a credential is highlighted as expiring soon
pub const DEFAULT_WARN_DAYS: u32 = 10;

/// Page size requested from the identity provider when listing all principals
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page IAM `ListUsers` accepts
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Maximum number of principals fetched concurrently
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Length of generated console passwords
pub const DEFAULT_PASSWORD_LENGTH: usize = 20;

/// Shortest console password keyturn will generate
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Provider limit on access keys held by a single principal
pub const MAX_ACCESS_KEYS_PER_PRINCIPAL: usize = 2;

/// Default AWS SDK attempts per request (first try plus retries)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default path for the `file` output mode
pub const DEFAULT_OUTPUT_FILE: &str = "./output.json";

/// Placeholder rendered for absent last-used data
pub const NOT_AVAILABLE: &str = "n/a";
