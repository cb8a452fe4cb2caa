//! Rotation state machine
//!
//! Principals are processed one at a time. A failure on one principal is
//! recorded in the report and the batch moves on.

use keyturn_common::defaults::{DEFAULT_PASSWORD_LENGTH, MAX_ACCESS_KEYS_PER_PRINCIPAL};
use keyturn_common::{
    AccessKey, CredentialKind, InventoryItem, IssuedSecret, KeyStatus, LoginCredential,
    PrincipalKeys, RotationResult, generate_secret,
};
use tracing::{debug, info, warn};

use super::confirm::{Confirm, ask};
use crate::aws::IamOperations;

/// Target for rotation events consumed by log-based alerting.
pub const NOTIFY_TARGET: &str = "keyturn::notify";

/// Engine behavior switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOptions {
    /// Answer every prompt with yes
    pub auto_confirm: bool,
    /// Plan only: no prompts and no provider mutations
    pub dry_run: bool,
    /// Emit an event on [`NOTIFY_TARGET`] for every issued credential
    pub notify: bool,
    /// Principal never touched, normally the caller's own identity
    pub protected_principal: Option<String>,
    pub password_length: usize,
}

impl Default for RotationOptions {
    fn default() -> Self {
        Self {
            auto_confirm: false,
            dry_run: false,
            notify: false,
            protected_principal: None,
            password_length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

/// A mutation the engine would perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Deactivate { key_id: String },
    Delete { key_id: String },
    CreateAccessKey,
    ResetPassword,
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannedAction::Deactivate { key_id } => write!(f, "deactivate {key_id}"),
            PlannedAction::Delete { key_id } => write!(f, "delete {key_id}"),
            PlannedAction::CreateAccessKey => f.write_str("create access key"),
            PlannedAction::ResetPassword => f.write_str("reset password"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The operator refused to delete the oldest key
    DeletionDeclined,
    /// The principal holds no access key to rotate
    NoAccessKeys,
    /// The principal is the caller's own identity
    CurrentCaller,
    /// The item carries a different credential kind
    NotApplicable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::DeletionDeclined => "deletion declined",
            SkipReason::NoAccessKeys => "no access keys",
            SkipReason::CurrentCaller => "current caller",
            SkipReason::NotApplicable => "not applicable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalOutcome {
    Rotated(RotationResult),
    Planned(Vec<PlannedAction>),
    Skipped(SkipReason),
    Failed(String),
}

/// Outcome for one principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalReport {
    pub principal: String,
    pub outcome: PrincipalOutcome,
}

/// Result of one rotation batch, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    pub entries: Vec<PrincipalReport>,
}

impl RotationReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rotated(&self) -> impl Iterator<Item = &RotationResult> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            PrincipalOutcome::Rotated(result) => Some(result),
            _ => None,
        })
    }

    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, PrincipalOutcome::Failed(_)))
            .count()
    }
}

/// Applies the rotation state machine against a provider
pub struct RotationEngine<'a, I, C: ?Sized> {
    iam: &'a I,
    confirm: &'a C,
    options: RotationOptions,
}

impl<'a, I: IamOperations, C: Confirm + ?Sized> RotationEngine<'a, I, C> {
    pub fn new(iam: &'a I, confirm: &'a C, options: RotationOptions) -> Self {
        Self {
            iam,
            confirm,
            options,
        }
    }

    pub fn options(&self) -> &RotationOptions {
        &self.options
    }

    /// Rotate the `kind` credentials of every item, sequentially.
    pub async fn rotate(&self, kind: CredentialKind, items: &[InventoryItem]) -> RotationReport {
        let mut report = RotationReport::default();

        for item in items {
            let principal = item.principal_name().to_string();
            let outcome = if self.options.protected_principal.as_deref() == Some(&principal) {
                info!(principal = %principal, "Skipping current caller");
                PrincipalOutcome::Skipped(SkipReason::CurrentCaller)
            } else {
                match (kind, item) {
                    (CredentialKind::AccessKeys, InventoryItem::AccessKeys(keys)) => {
                        self.rotate_access_keys(keys).await
                    }
                    (CredentialKind::Login, InventoryItem::Login(login)) => {
                        self.rotate_password(login).await
                    }
                    _ => {
                        warn!(
                            principal = %principal,
                            expected = kind.as_str(),
                            found = item.kind().as_str(),
                            "Skipping item of the wrong credential kind"
                        );
                        PrincipalOutcome::Skipped(SkipReason::NotApplicable)
                    }
                }
            };

            if let PrincipalOutcome::Failed(reason) = &outcome {
                warn!(principal = %principal, reason = %reason, "Rotation failed");
            }
            report.entries.push(PrincipalReport { principal, outcome });
        }

        report
    }

    fn ask(&self, prompt: &str) -> bool {
        self.options.auto_confirm || ask(self.confirm, prompt)
    }

    /// Oldest key, when the principal is at the provider's key limit
    fn key_to_delete(keys: &PrincipalKeys) -> Option<&AccessKey> {
        if keys.keys.len() >= MAX_ACCESS_KEYS_PER_PRINCIPAL {
            keys.oldest_key()
        } else {
            None
        }
    }

    fn plan_access_keys(keys: &PrincipalKeys) -> Vec<PlannedAction> {
        let mut actions: Vec<PlannedAction> = keys
            .stale_active_keys()
            .map(|k| PlannedAction::Deactivate {
                key_id: k.id.clone(),
            })
            .collect();
        if let Some(oldest) = Self::key_to_delete(keys) {
            actions.push(PlannedAction::Delete {
                key_id: oldest.id.clone(),
            });
        }
        actions.push(PlannedAction::CreateAccessKey);
        actions
    }

    async fn rotate_access_keys(&self, keys: &PrincipalKeys) -> PrincipalOutcome {
        let principal = keys.principal.as_str();

        if keys.keys.is_empty() {
            info!(principal, "No access keys to rotate");
            return PrincipalOutcome::Skipped(SkipReason::NoAccessKeys);
        }
        if self.options.dry_run {
            return PrincipalOutcome::Planned(Self::plan_access_keys(keys));
        }

        // Every answer is collected before the first provider call
        let deactivate: Vec<&AccessKey> = keys
            .stale_active_keys()
            .filter(|key| {
                let prompt = format!("Deactivate stale access key {} of {principal}?", key.id);
                let confirmed = self.ask(&prompt);
                if !confirmed {
                    info!(principal, key_id = %key.id, "Leaving stale key active");
                }
                confirmed
            })
            .collect();

        let delete = Self::key_to_delete(keys);
        if let Some(oldest) = delete {
            let prompt = format!(
                "{principal} holds {} access keys; delete the oldest ({})?",
                keys.keys.len(),
                oldest.id
            );
            if !self.ask(&prompt) {
                info!(principal, key_id = %oldest.id, "Deletion declined, skipping principal");
                return PrincipalOutcome::Skipped(SkipReason::DeletionDeclined);
            }
        }

        // Deactivation failures do not stop the principal
        for key in deactivate {
            let result = self
                .iam
                .update_access_key_status(principal, &key.id, KeyStatus::Inactive)
                .await;
            match result {
                Ok(()) => info!(principal, key_id = %key.id, "Deactivated access key"),
                Err(e) => warn!(
                    principal,
                    key_id = %key.id,
                    error = %e,
                    "Failed to deactivate access key"
                ),
            }
        }

        if let Some(oldest) = delete {
            if let Err(e) = self.iam.delete_access_key(principal, &oldest.id).await {
                return PrincipalOutcome::Failed(format!(
                    "failed to delete access key {}: {e}",
                    oldest.id
                ));
            }
            info!(principal, key_id = %oldest.id, "Deleted access key");
        }

        match self.iam.create_access_key(principal).await {
            Ok(new_key) => {
                let result = RotationResult {
                    principal: principal.to_string(),
                    secret: IssuedSecret::AccessKey {
                        key_id: new_key.key_id,
                        secret: new_key.secret,
                    },
                };
                self.rotated(&result);
                PrincipalOutcome::Rotated(result)
            }
            Err(e) => PrincipalOutcome::Failed(format!("failed to create access key: {e}")),
        }
    }

    async fn rotate_password(&self, login: &LoginCredential) -> PrincipalOutcome {
        let principal = login.principal.as_str();

        if self.options.dry_run {
            return PrincipalOutcome::Planned(vec![PlannedAction::ResetPassword]);
        }

        let password = match generate_secret(self.options.password_length) {
            Ok(password) => password,
            Err(e) => return PrincipalOutcome::Failed(format!("failed to generate password: {e}")),
        };

        if let Err(e) = self
            .iam
            .update_login_profile(principal, &password, true)
            .await
        {
            return PrincipalOutcome::Failed(format!("failed to update login profile: {e}"));
        }

        let result = RotationResult {
            principal: principal.to_string(),
            secret: IssuedSecret::Password { password },
        };
        self.rotated(&result);
        PrincipalOutcome::Rotated(result)
    }

    fn rotated(&self, result: &RotationResult) {
        debug!(
            principal = %result.principal,
            key_id = ?result.public_id(),
            "Issued new credential"
        );
        if self.options.notify {
            info!(
                target: NOTIFY_TARGET,
                principal = %result.principal,
                key_id = result.public_id().unwrap_or(""),
                "Credential rotated"
            );
        }
    }
}
