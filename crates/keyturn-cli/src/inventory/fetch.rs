//! Per-principal credential fetching and classification

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyturn_common::{
    AccessKey, InventoryItem, LoginCredential, Principal, PrincipalKeys, StalePolicy,
};
use tracing::{debug, warn};

use crate::aws::IamOperations;

/// Fetch and classify every access key of `principal`.
///
/// Last-used data is looked up one key at a time; a key whose lookup fails
/// is left out and the rest of the principal still counts. Returns `None`
/// when the principal holds no keys or the expired-only filter leaves
/// nothing to report.
pub async fn fetch_access_keys<I: IamOperations>(
    iam: &I,
    principal: Principal,
    policy: StalePolicy,
    now: DateTime<Utc>,
) -> Result<Option<InventoryItem>> {
    let listed = iam
        .list_access_keys(&principal.name)
        .await
        .with_context(|| format!("Failed to list access keys of {}", principal.name))?;
    if listed.is_empty() {
        return Ok(None);
    }

    let mut keys = Vec::with_capacity(listed.len());
    for meta in listed {
        let last_used = match iam.get_access_key_last_used(&meta.key_id).await {
            Ok(last_used) => last_used,
            Err(e) => {
                warn!(
                    principal = %principal.name,
                    key_id = %meta.key_id,
                    error = %e,
                    "Skipping access key, last-used lookup failed"
                );
                continue;
            }
        };

        let is_stale = policy.is_stale(meta.created_at, now);
        keys.push(AccessKey {
            id: meta.key_id,
            created_at: meta.created_at,
            status: meta.status,
            last_used_at: last_used.last_used_at,
            last_used_service: last_used.service_name,
            is_stale,
            matches_policy: policy.matches(is_stale),
        });
    }

    let item = PrincipalKeys {
        principal: principal.name,
        keys,
    };

    if item.keys.is_empty() || (policy.expired_only && !item.has_policy_match()) {
        return Ok(None);
    }
    Ok(Some(InventoryItem::AccessKeys(item)))
}

/// Fetch and classify the console password of `principal`.
///
/// Never fails: a principal without a password contributes nothing, and any
/// other lookup error is logged at debug level and treated the same way.
pub async fn fetch_login<I: IamOperations>(
    iam: &I,
    principal: Principal,
    policy: StalePolicy,
    now: DateTime<Utc>,
) -> Result<Option<InventoryItem>> {
    let profile = match iam.get_login_profile(&principal.name).await {
        Ok(profile) => profile,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => {
            debug!(principal = %principal.name, error = %e, "Login profile lookup failed");
            return Ok(None);
        }
    };

    let is_stale = policy.is_stale(profile.created_at, now);
    if !policy.matches(is_stale) {
        return Ok(None);
    }

    Ok(Some(InventoryItem::Login(LoginCredential {
        principal: principal.name,
        created_at: profile.created_at,
        last_used_at: principal.password_last_used,
        reset_required: profile.reset_required,
        is_stale,
    })))
}
