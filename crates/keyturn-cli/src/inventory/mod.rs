//! Credential inventory
//!
//! Lists principals, fetches their credentials concurrently and merges the
//! results into one ordered collection:
//!
//! - [`principals`]: paginated or point lookup of the working set
//! - [`fetch`]: per-principal access key and login profile classification
//! - [`aggregate`]: bounded fan-out and all-or-nothing merge

pub mod aggregate;
pub mod fetch;
pub mod principals;

pub use aggregate::aggregate;
pub use fetch::{fetch_access_keys, fetch_login};
pub use principals::{MaxItems, PrincipalSelection, list_principals};

use anyhow::Result;
use chrono::{DateTime, Utc};
use keyturn_common::InventoryItem;
use tracing::info;

use crate::aws::IamOperations;
use crate::config::InventoryConfig;

/// Access key inventory for the configured principals.
pub async fn collect_access_keys<I: IamOperations>(
    iam: &I,
    config: &InventoryConfig,
    now: DateTime<Utc>,
) -> Result<Vec<InventoryItem>> {
    let principals = list_principals(iam, &config.selection).await?;
    info!(principals = principals.len(), "Fetching access keys");
    aggregate(principals, config.concurrency, |p| {
        fetch_access_keys(iam, p, config.policy, now)
    })
    .await
}

/// Console password inventory for the configured principals.
pub async fn collect_logins<I: IamOperations>(
    iam: &I,
    config: &InventoryConfig,
    now: DateTime<Utc>,
) -> Result<Vec<InventoryItem>> {
    let principals = list_principals(iam, &config.selection).await?;
    info!(principals = principals.len(), "Fetching login profiles");
    aggregate(principals, config.concurrency, |p| {
        fetch_login(iam, p, config.policy, now)
    })
    .await
}
