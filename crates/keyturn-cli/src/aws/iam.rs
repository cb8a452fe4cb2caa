//! IAM user, access key and login profile operations

use super::context::{AwsContext, FromAwsContext};
use super::error::{IamError, from_sdk};
use super::types::{AccessKeyMetadata, KeyLastUsed, LoginProfile, NewAccessKey, PrincipalPage};
use aws_sdk_iam::Client;
use aws_sdk_iam::types::{StatusType, User};
use chrono::{DateTime, Utc};
use keyturn_common::defaults::NOT_AVAILABLE;
use keyturn_common::{KeyStatus, Principal};
use std::future::Future;
use tracing::{debug, warn};

/// IAM client for reading and rotating user credentials
pub struct IamClient {
    client: Client,
}

impl FromAwsContext for IamClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }
}

/// Convert an AWS timestamp into a chrono UTC instant.
fn to_utc(dt: &aws_sdk_iam::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn principal_from_user(user: &User) -> Principal {
    Principal {
        name: user.user_name().to_string(),
        created_at: to_utc(user.create_date()),
        password_last_used: user.password_last_used().and_then(to_utc),
    }
}

fn key_status(status: Option<&StatusType>) -> KeyStatus {
    match status {
        Some(StatusType::Active) => KeyStatus::Active,
        _ => KeyStatus::Inactive,
    }
}

fn to_status_type(status: KeyStatus) -> StatusType {
    match status {
        KeyStatus::Active => StatusType::Active,
        KeyStatus::Inactive => StatusType::Inactive,
    }
}

impl IamClient {
    /// Fetch one page of IAM users
    pub async fn list_users_page(
        &self,
        max_items: u32,
        marker: Option<String>,
    ) -> Result<PrincipalPage, IamError> {
        let response = self
            .client
            .list_users()
            .max_items(i32::try_from(max_items).unwrap_or(i32::MAX))
            .set_marker(marker)
            .send()
            .await
            .map_err(from_sdk)?;

        let principals: Vec<Principal> = response.users().iter().map(principal_from_user).collect();
        debug!(
            count = principals.len(),
            truncated = response.is_truncated(),
            "Listed IAM users page"
        );

        Ok(PrincipalPage {
            principals,
            marker: response.marker().map(|s| s.to_string()),
            is_truncated: response.is_truncated(),
        })
    }

    /// Look up a single user by name
    pub async fn get_user(&self, user_name: &str) -> Result<Principal, IamError> {
        let response = self
            .client
            .get_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(from_sdk)?;

        response
            .user()
            .map(principal_from_user)
            .ok_or_else(|| IamError::not_found(format!("user {user_name}")))
    }

    /// Look up the user the current credentials belong to
    pub async fn get_caller_user(&self) -> Result<Principal, IamError> {
        let response = self.client.get_user().send().await.map_err(from_sdk)?;

        response
            .user()
            .map(principal_from_user)
            .ok_or_else(|| IamError::not_found("calling user"))
    }

    /// List every access key of a user
    pub async fn list_access_keys(
        &self,
        user_name: &str,
    ) -> Result<Vec<AccessKeyMetadata>, IamError> {
        let mut keys = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .client
                .list_access_keys()
                .user_name(user_name)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(from_sdk)?;

            for meta in response.access_key_metadata() {
                let (Some(key_id), Some(created_at)) =
                    (meta.access_key_id(), meta.create_date().and_then(to_utc))
                else {
                    warn!(user = %user_name, "Skipping access key without id or creation date");
                    continue;
                };
                keys.push(AccessKeyMetadata {
                    key_id: key_id.to_string(),
                    created_at,
                    status: key_status(meta.status()),
                });
            }

            // Handle pagination
            match response.marker() {
                Some(m) if response.is_truncated() => marker = Some(m.to_string()),
                _ => break,
            }
        }

        Ok(keys)
    }

    /// Get when and where an access key was last used
    pub async fn get_access_key_last_used(&self, key_id: &str) -> Result<KeyLastUsed, IamError> {
        let response = self
            .client
            .get_access_key_last_used()
            .access_key_id(key_id)
            .send()
            .await
            .map_err(from_sdk)?;

        let Some(last_used) = response.access_key_last_used() else {
            return Ok(KeyLastUsed::default());
        };

        // IAM reports "N/A" for keys that were never used
        let service_name = Some(last_used.service_name())
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(NOT_AVAILABLE))
            .map(|s| s.to_string());

        Ok(KeyLastUsed {
            last_used_at: last_used.last_used_date().and_then(to_utc),
            service_name,
        })
    }

    /// Create a new access key for a user
    pub async fn create_access_key(&self, user_name: &str) -> Result<NewAccessKey, IamError> {
        let response = self
            .client
            .create_access_key()
            .user_name(user_name)
            .send()
            .await
            .map_err(from_sdk)?;

        let key = response.access_key().ok_or_else(|| IamError::Sdk {
            code: None,
            message: format!("CreateAccessKey for {user_name} returned no key"),
        })?;

        Ok(NewAccessKey {
            key_id: key.access_key_id().to_string(),
            secret: key.secret_access_key().to_string(),
        })
    }

    /// Set an access key's status
    pub async fn update_access_key_status(
        &self,
        user_name: &str,
        key_id: &str,
        status: KeyStatus,
    ) -> Result<(), IamError> {
        self.client
            .update_access_key()
            .user_name(user_name)
            .access_key_id(key_id)
            .status(to_status_type(status))
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    /// Delete an access key
    pub async fn delete_access_key(&self, user_name: &str, key_id: &str) -> Result<(), IamError> {
        self.client
            .delete_access_key()
            .user_name(user_name)
            .access_key_id(key_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    /// Fetch a user's console login profile
    pub async fn get_login_profile(&self, user_name: &str) -> Result<LoginProfile, IamError> {
        let response = self
            .client
            .get_login_profile()
            .user_name(user_name)
            .send()
            .await
            .map_err(from_sdk)?;

        let profile = response
            .login_profile()
            .ok_or_else(|| IamError::not_found(format!("login profile for {user_name}")))?;

        let created_at = to_utc(profile.create_date()).ok_or_else(|| IamError::Sdk {
            code: None,
            message: format!("login profile for {user_name} has an invalid creation date"),
        })?;

        Ok(LoginProfile {
            principal: user_name.to_string(),
            created_at,
            reset_required: profile.password_reset_required(),
        })
    }

    /// Replace a user's console password
    pub async fn update_login_profile(
        &self,
        user_name: &str,
        password: &str,
        reset_required: bool,
    ) -> Result<(), IamError> {
        self.client
            .update_login_profile()
            .user_name(user_name)
            .password(password)
            .password_reset_required(reset_required)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }
}

/// Trait for the identity-provider operations the inventory and rotation
/// logic consume.
///
/// Implemented by [`IamClient`] for real AWS and by an in-memory fake in tests.
pub trait IamOperations: Send + Sync {
    /// Fetch one page of principals, continuing from `marker`
    fn list_principals_page(
        &self,
        max_items: u32,
        marker: Option<String>,
    ) -> impl Future<Output = Result<PrincipalPage, IamError>> + Send;

    /// Point lookup of a principal; `NotFound` if absent
    fn get_principal(&self, name: &str) -> impl Future<Output = Result<Principal, IamError>> + Send;

    /// Principal owning the credentials in use
    fn current_principal(&self) -> impl Future<Output = Result<Principal, IamError>> + Send;

    /// Access keys held by a principal
    fn list_access_keys(
        &self,
        principal: &str,
    ) -> impl Future<Output = Result<Vec<AccessKeyMetadata>, IamError>> + Send;

    /// Last-used data of an access key
    fn get_access_key_last_used(
        &self,
        key_id: &str,
    ) -> impl Future<Output = Result<KeyLastUsed, IamError>> + Send;

    /// Issue a new access key
    fn create_access_key(
        &self,
        principal: &str,
    ) -> impl Future<Output = Result<NewAccessKey, IamError>> + Send;

    /// Change an access key's status
    fn update_access_key_status(
        &self,
        principal: &str,
        key_id: &str,
        status: KeyStatus,
    ) -> impl Future<Output = Result<(), IamError>> + Send;

    /// Delete an access key
    fn delete_access_key(
        &self,
        principal: &str,
        key_id: &str,
    ) -> impl Future<Output = Result<(), IamError>> + Send;

    /// Console login profile; `NotFound` when the principal has no password
    fn get_login_profile(
        &self,
        principal: &str,
    ) -> impl Future<Output = Result<LoginProfile, IamError>> + Send;

    /// Set a new console password
    fn update_login_profile(
        &self,
        principal: &str,
        password: &str,
        reset_required: bool,
    ) -> impl Future<Output = Result<(), IamError>> + Send;
}

impl IamOperations for IamClient {
    async fn list_principals_page(
        &self,
        max_items: u32,
        marker: Option<String>,
    ) -> Result<PrincipalPage, IamError> {
        IamClient::list_users_page(self, max_items, marker).await
    }

    async fn get_principal(&self, name: &str) -> Result<Principal, IamError> {
        IamClient::get_user(self, name).await
    }

    async fn current_principal(&self) -> Result<Principal, IamError> {
        IamClient::get_caller_user(self).await
    }

    async fn list_access_keys(&self, principal: &str) -> Result<Vec<AccessKeyMetadata>, IamError> {
        IamClient::list_access_keys(self, principal).await
    }

    async fn get_access_key_last_used(&self, key_id: &str) -> Result<KeyLastUsed, IamError> {
        IamClient::get_access_key_last_used(self, key_id).await
    }

    async fn create_access_key(&self, principal: &str) -> Result<NewAccessKey, IamError> {
        IamClient::create_access_key(self, principal).await
    }

    async fn update_access_key_status(
        &self,
        principal: &str,
        key_id: &str,
        status: KeyStatus,
    ) -> Result<(), IamError> {
        IamClient::update_access_key_status(self, principal, key_id, status).await
    }

    async fn delete_access_key(&self, principal: &str, key_id: &str) -> Result<(), IamError> {
        IamClient::delete_access_key(self, principal, key_id).await
    }

    async fn get_login_profile(&self, principal: &str) -> Result<LoginProfile, IamError> {
        IamClient::get_login_profile(self, principal).await
    }

    async fn update_login_profile(
        &self,
        principal: &str,
        password: &str,
        reset_required: bool,
    ) -> Result<(), IamError> {
        IamClient::update_login_profile(self, principal, password, reset_required).await
    }
}
