//! Credential inventory model
//!
//! Snapshots of principals and their credentials as read from the identity
//! provider during one invocation. None of these are mutated after
//! construction; rotation issues new credentials instead.

use std::fmt;

use chrono::{DateTime, Utc};

/// An identity managed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique name within the provider
    pub name: String,
    /// When the identity was created, if the provider reported it
    pub created_at: Option<DateTime<Utc>>,
    /// Last console sign-in with a password
    pub password_last_used: Option<DateTime<Utc>>,
}

impl Principal {
    /// Principal known only by name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
            password_last_used: None,
        }
    }
}

/// Access key status as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStatus {
    Active,
    Inactive,
}

impl KeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Active => "Active",
            KeyStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One access key with its usage data and policy classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub status: KeyStatus,
    pub last_used_at: Option<DateTime<Utc>>,
    /// Service the key was last used against
    pub last_used_service: Option<String>,
    /// Older than the staleness threshold
    pub is_stale: bool,
    /// Included under the active filter
    pub matches_policy: bool,
}

impl AccessKey {
    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }
}

/// The full access key set of one principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalKeys {
    pub principal: String,
    pub keys: Vec<AccessKey>,
}

impl PrincipalKeys {
    pub fn has_policy_match(&self) -> bool {
        self.keys.iter().any(|k| k.matches_policy)
    }

    /// Keys that are stale but still usable
    pub fn stale_active_keys(&self) -> impl Iterator<Item = &AccessKey> {
        self.keys.iter().filter(|k| k.is_stale && k.is_active())
    }

    /// Oldest key by creation time; ties go to the key listed first.
    pub fn oldest_key(&self) -> Option<&AccessKey> {
        self.keys
            .iter()
            .enumerate()
            .min_by_key(|(idx, k)| (k.created_at, *idx))
            .map(|(_, k)| k)
    }
}

/// Console password of one principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredential {
    pub principal: String,
    /// When the current password was set
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    /// The password must be changed at next sign-in
    pub reset_required: bool,
    pub is_stale: bool,
}

/// Which credential family an inventory item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    AccessKeys,
    Login,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::AccessKeys => "access-keys",
            CredentialKind::Login => "login",
        }
    }
}

/// Unit of work for aggregation and rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryItem {
    AccessKeys(PrincipalKeys),
    Login(LoginCredential),
}

impl InventoryItem {
    pub fn principal_name(&self) -> &str {
        match self {
            InventoryItem::AccessKeys(keys) => &keys.principal,
            InventoryItem::Login(login) => &login.principal,
        }
    }

    pub fn kind(&self) -> CredentialKind {
        match self {
            InventoryItem::AccessKeys(_) => CredentialKind::AccessKeys,
            InventoryItem::Login(_) => CredentialKind::Login,
        }
    }
}

/// Secret material returned exactly once by the provider
#[derive(Clone, PartialEq, Eq)]
pub enum IssuedSecret {
    AccessKey { key_id: String, secret: String },
    Password { password: String },
}

impl fmt::Debug for IssuedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssuedSecret::AccessKey { key_id, .. } => f
                .debug_struct("AccessKey")
                .field("key_id", key_id)
                .field("secret", &"<redacted>")
                .finish(),
            IssuedSecret::Password { .. } => f
                .debug_struct("Password")
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// New credential issued for a principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationResult {
    pub principal: String,
    pub secret: IssuedSecret,
}

impl RotationResult {
    /// Identifier safe to log: the key id, or nothing for passwords
    pub fn public_id(&self) -> Option<&str> {
        match &self.secret {
            IssuedSecret::AccessKey { key_id, .. } => Some(key_id),
            IssuedSecret::Password { .. } => None,
        }
    }
}
