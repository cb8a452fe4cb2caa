//! Command handlers
//!
//! Each handler is generic over the provider and the confirmation prompt so
//! the full command flow runs against the in-memory fake in tests.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyturn_common::{CredentialKind, InventoryItem};
use tracing::info;

use crate::aws::IamOperations;
use crate::config::{InventoryConfig, ListConfig, RotateConfig};
use crate::inventory::{collect_access_keys, collect_logins, list_principals};
use crate::output::{RowBuilder, emit};
use crate::rotation::{Confirm, RotationEngine, RotationOptions, RotationReport, ask};

fn rows_for(config: &ListConfig, now: DateTime<Utc>) -> RowBuilder {
    RowBuilder::new(config.output.zone, config.inventory.policy, now)
}

async fn collect<I: IamOperations>(
    iam: &I,
    kind: CredentialKind,
    config: &InventoryConfig,
    now: DateTime<Utc>,
) -> Result<Vec<InventoryItem>> {
    match kind {
        CredentialKind::AccessKeys => collect_access_keys(iam, config, now).await,
        CredentialKind::Login => collect_logins(iam, config, now).await,
    }
}

fn display(
    items: &[InventoryItem],
    kind: CredentialKind,
    config: &ListConfig,
    now: DateTime<Utc>,
) -> Result<()> {
    let rows = rows_for(config, now);
    match kind {
        CredentialKind::AccessKeys => emit(&rows.access_keys(items), &config.output),
        CredentialKind::Login => emit(&rows.logins(items), &config.output),
    }
}

/// `keyturn keys` / `keyturn logins`
pub async fn handle_list<I: IamOperations>(
    iam: &I,
    kind: CredentialKind,
    config: &ListConfig,
    now: DateTime<Utc>,
) -> Result<()> {
    let items = collect(iam, kind, &config.inventory, now).await?;
    display(&items, kind, config, now)
}

/// `keyturn users`
pub async fn handle_users<I: IamOperations>(
    iam: &I,
    config: &ListConfig,
    now: DateTime<Utc>,
) -> Result<()> {
    let principals = list_principals(iam, &config.inventory.selection).await?;
    emit(&rows_for(config, now).users(&principals), &config.output)
}

/// `keyturn rotate keys` / `keyturn rotate passwords`
///
/// Lists and displays the affected credentials, asks once for the whole
/// batch, then hands the inventory to the engine and renders its report.
pub async fn handle_rotate<I, C>(
    iam: &I,
    confirm: &C,
    kind: CredentialKind,
    config: &RotateConfig,
    now: DateTime<Utc>,
) -> Result<RotationReport>
where
    I: IamOperations,
    C: Confirm + ?Sized,
{
    let flags = &config.flags;
    let items = collect(iam, kind, &config.list.inventory, now).await?;
    if items.is_empty() {
        info!(kind = kind.as_str(), "Nothing to rotate");
        return Ok(RotationReport::default());
    }

    display(&items, kind, &config.list, now)?;

    let mut options = RotationOptions {
        auto_confirm: flags.auto_confirm,
        dry_run: flags.dry_run,
        notify: flags.notify,
        protected_principal: None,
        password_length: flags.password_length,
    };
    if flags.skip_current_user {
        let caller = iam
            .current_principal()
            .await
            .context("Failed to resolve the calling user for --skip-current-user")?;
        info!(principal = %caller.name, "Protecting current caller from rotation");
        options.protected_principal = Some(caller.name);
    }

    if !flags.auto_confirm && !flags.dry_run {
        let prompt = format!("Rotate {} for {} user(s)?", kind.as_str(), items.len());
        if !ask(confirm, &prompt) {
            info!("Rotation cancelled");
            return Ok(RotationReport::default());
        }
    }

    let report = RotationEngine::new(iam, confirm, options)
        .rotate(kind, &items)
        .await;

    emit(&rows_for(&config.list, now).outcomes(&report), &config.list.output)?;
    info!(
        principals = report.entries.len(),
        rotated = report.rotated().count(),
        failed = report.failures(),
        "Rotation finished"
    );
    Ok(report)
}
