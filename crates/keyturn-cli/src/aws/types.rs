//! Provider-facing IAM records
//!
//! Plain data returned by [`IamOperations`](super::IamOperations). These
//! carry what the provider reports and nothing derived; staleness and policy
//! flags are computed by the inventory layer.

use chrono::{DateTime, Utc};
use keyturn_common::{KeyStatus, Principal};

/// One page of a principal listing
#[derive(Debug, Clone, Default)]
pub struct PrincipalPage {
    pub principals: Vec<Principal>,
    /// Continuation marker for the next page
    pub marker: Option<String>,
    /// More pages exist
    pub is_truncated: bool,
}

/// Access key metadata as listed for a principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyMetadata {
    pub key_id: String,
    pub created_at: DateTime<Utc>,
    pub status: KeyStatus,
}

/// Last-used data for an access key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyLastUsed {
    pub last_used_at: Option<DateTime<Utc>>,
    pub service_name: Option<String>,
}

/// Freshly created access key; the secret is only ever returned here
#[derive(Clone)]
pub struct NewAccessKey {
    pub key_id: String,
    pub secret: String,
}

impl std::fmt::Debug for NewAccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccessKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Console login profile of a principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginProfile {
    pub principal: String,
    /// When the current password was set
    pub created_at: DateTime<Utc>,
    pub reset_required: bool,
}
