//! Test fixtures: an in-memory IAM provider.
//!
//! `FakeIam` keeps users, keys and login profiles behind a mutex, records
//! every call, and can be told to fail or stall specific operations.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use keyturn_common::{KeyStatus, Principal};

use crate::aws::{
    AccessKeyMetadata, IamError, IamOperations, KeyLastUsed, LoginProfile, NewAccessKey,
    PrincipalPage,
};

/// Fixed "now" shared by tests that build credentials by age.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Instant `days` before [`test_now`].
pub fn days_ago(days: i64) -> DateTime<Utc> {
    test_now() - chrono::Duration::days(days)
}

/// A call made against the fake, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPrincipals { max_items: u32, marker: Option<String> },
    GetPrincipal(String),
    CurrentPrincipal,
    ListAccessKeys(String),
    GetAccessKeyLastUsed(String),
    CreateAccessKey(String),
    UpdateAccessKey {
        principal: String,
        key_id: String,
        status: KeyStatus,
    },
    DeleteAccessKey {
        principal: String,
        key_id: String,
    },
    GetLoginProfile(String),
    UpdateLoginProfile {
        principal: String,
        reset_required: bool,
    },
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::CreateAccessKey(_)
                | Call::UpdateAccessKey { .. }
                | Call::DeleteAccessKey { .. }
                | Call::UpdateLoginProfile { .. }
        )
    }
}

struct FakeKey {
    meta: AccessKeyMetadata,
    last_used: KeyLastUsed,
}

struct FakeUser {
    principal: Principal,
    keys: Vec<FakeKey>,
    login: Option<LoginProfile>,
    password: Option<String>,
}

#[derive(Default)]
struct State {
    users: Vec<FakeUser>,
    calls: Vec<Call>,
    caller: Option<String>,
    next_key: u32,
    fail_pages: bool,
    fail_list_keys: HashSet<String>,
    fail_last_used: HashSet<String>,
    fail_login: HashSet<String>,
    fail_create: HashSet<String>,
    fail_delete: HashSet<String>,
    fail_update: HashSet<String>,
    /// Extra principals injected into the second page to exercise dedup
    duplicate_on_next_page: bool,
}

impl State {
    fn user(&self, name: &str) -> Result<&FakeUser, IamError> {
        self.users
            .iter()
            .find(|u| u.principal.name == name)
            .ok_or_else(|| IamError::not_found(format!("user {name}")))
    }

    fn user_mut(&mut self, name: &str) -> Result<&mut FakeUser, IamError> {
        self.users
            .iter_mut()
            .find(|u| u.principal.name == name)
            .ok_or_else(|| IamError::not_found(format!("user {name}")))
    }
}

fn injected(op: &str, target: &str) -> IamError {
    IamError::Sdk {
        code: Some("ServiceFailure".to_string()),
        message: format!("injected {op} failure for {target}"),
    }
}

/// In-memory [`IamOperations`] implementation
#[derive(Default)]
pub struct FakeIam {
    state: Mutex<State>,
    delays: HashMap<String, Duration>,
}

impl FakeIam {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&mut self) -> &mut State {
        self.state.get_mut().unwrap()
    }

    /// Add a user with no credentials
    pub fn user(mut self, name: &str) -> Self {
        self.state().users.push(FakeUser {
            principal: Principal {
                name: name.to_string(),
                created_at: Some(days_ago(400)),
                password_last_used: None,
            },
            keys: Vec::new(),
            login: None,
            password: None,
        });
        self
    }

    /// Add an access key to an existing user
    pub fn key(
        mut self,
        user: &str,
        key_id: &str,
        created_at: DateTime<Utc>,
        status: KeyStatus,
    ) -> Self {
        let fake = self.state().user_mut(user).unwrap();
        fake.keys.push(FakeKey {
            meta: AccessKeyMetadata {
                key_id: key_id.to_string(),
                created_at,
                status,
            },
            last_used: KeyLastUsed::default(),
        });
        self
    }

    /// Record last-used data for an existing key
    pub fn last_used(mut self, key_id: &str, at: DateTime<Utc>, service: &str) -> Self {
        let key = self
            .state()
            .users
            .iter_mut()
            .flat_map(|u| u.keys.iter_mut())
            .find(|k| k.meta.key_id == key_id)
            .unwrap();
        key.last_used = KeyLastUsed {
            last_used_at: Some(at),
            service_name: Some(service.to_string()),
        };
        self
    }

    /// Give an existing user a console password set at `created_at`
    pub fn login(mut self, user: &str, created_at: DateTime<Utc>) -> Self {
        let fake = self.state().user_mut(user).unwrap();
        fake.login = Some(LoginProfile {
            principal: user.to_string(),
            created_at,
            reset_required: false,
        });
        self
    }

    pub fn caller(mut self, user: &str) -> Self {
        self.state().caller = Some(user.to_string());
        self
    }

    /// Stall every fetch for `user` by `delay` before it touches state
    pub fn delay(mut self, user: &str, delay: Duration) -> Self {
        self.delays.insert(user.to_string(), delay);
        self
    }

    pub fn fail_pages(mut self) -> Self {
        self.state().fail_pages = true;
        self
    }

    /// Repeat the previous page's last user at the start of the next page
    pub fn duplicate_across_pages(mut self) -> Self {
        self.state().duplicate_on_next_page = true;
        self
    }

    pub fn fail_list_keys(mut self, user: &str) -> Self {
        self.state().fail_list_keys.insert(user.to_string());
        self
    }

    pub fn fail_last_used(mut self, key_id: &str) -> Self {
        self.state().fail_last_used.insert(key_id.to_string());
        self
    }

    /// Login profile lookups for `user` fail with a non-NotFound error
    pub fn fail_login(mut self, user: &str) -> Self {
        self.state().fail_login.insert(user.to_string());
        self
    }

    pub fn fail_create(mut self, user: &str) -> Self {
        self.state().fail_create.insert(user.to_string());
        self
    }

    pub fn fail_delete(mut self, user: &str) -> Self {
        self.state().fail_delete.insert(user.to_string());
        self
    }

    /// Status updates and password updates for `user` fail
    pub fn fail_update(mut self, user: &str) -> Self {
        self.state().fail_update.insert(user.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    /// Current key ids and statuses of a user
    pub fn keys_of(&self, user: &str) -> Vec<(String, KeyStatus)> {
        let state = self.state.lock().unwrap();
        state
            .user(user)
            .map(|u| {
                u.keys
                    .iter()
                    .map(|k| (k.meta.key_id.clone(), k.meta.status))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn password_of(&self, user: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.user(user).ok().and_then(|u| u.password.clone())
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }

    async fn stall(&self, user: &str) {
        if let Some(delay) = self.delays.get(user) {
            tokio::time::sleep(*delay).await;
        }
    }
}

impl IamOperations for FakeIam {
    async fn list_principals_page(
        &self,
        max_items: u32,
        marker: Option<String>,
    ) -> Result<PrincipalPage, IamError> {
        let state = self.record(Call::ListPrincipals {
            max_items,
            marker: marker.clone(),
        });
        if state.fail_pages {
            return Err(injected("ListUsers", "page"));
        }

        let start: usize = marker.as_deref().map_or(0, |m| m.parse().unwrap());
        let end = (start + max_items as usize).min(state.users.len());
        let mut principals: Vec<Principal> = state.users[start..end]
            .iter()
            .map(|u| u.principal.clone())
            .collect();
        if state.duplicate_on_next_page && start > 0 {
            principals.insert(0, state.users[start - 1].principal.clone());
        }
        let is_truncated = end < state.users.len();

        Ok(PrincipalPage {
            principals,
            marker: is_truncated.then(|| end.to_string()),
            is_truncated,
        })
    }

    async fn get_principal(&self, name: &str) -> Result<Principal, IamError> {
        let state = self.record(Call::GetPrincipal(name.to_string()));
        state.user(name).map(|u| u.principal.clone())
    }

    async fn current_principal(&self) -> Result<Principal, IamError> {
        let state = self.record(Call::CurrentPrincipal);
        let name = state
            .caller
            .clone()
            .ok_or_else(|| IamError::not_found("calling user"))?;
        state.user(&name).map(|u| u.principal.clone())
    }

    async fn list_access_keys(&self, principal: &str) -> Result<Vec<AccessKeyMetadata>, IamError> {
        self.stall(principal).await;
        let state = self.record(Call::ListAccessKeys(principal.to_string()));
        if state.fail_list_keys.contains(principal) {
            return Err(injected("ListAccessKeys", principal));
        }
        Ok(state
            .user(principal)?
            .keys
            .iter()
            .map(|k| k.meta.clone())
            .collect())
    }

    async fn get_access_key_last_used(&self, key_id: &str) -> Result<KeyLastUsed, IamError> {
        let state = self.record(Call::GetAccessKeyLastUsed(key_id.to_string()));
        if state.fail_last_used.contains(key_id) {
            return Err(injected("GetAccessKeyLastUsed", key_id));
        }
        state
            .users
            .iter()
            .flat_map(|u| u.keys.iter())
            .find(|k| k.meta.key_id == key_id)
            .map(|k| k.last_used.clone())
            .ok_or_else(|| IamError::not_found(format!("access key {key_id}")))
    }

    async fn create_access_key(&self, principal: &str) -> Result<NewAccessKey, IamError> {
        let mut state = self.record(Call::CreateAccessKey(principal.to_string()));
        if state.fail_create.contains(principal) {
            return Err(injected("CreateAccessKey", principal));
        }
        state.next_key += 1;
        let n = state.next_key;
        let user = state.user_mut(principal)?;
        if user.keys.len() >= keyturn_common::defaults::MAX_ACCESS_KEYS_PER_PRINCIPAL {
            return Err(IamError::LimitExceeded {
                message: format!("{principal} already holds two access keys"),
            });
        }
        let key_id = format!("AKIAFAKE{n:04}");
        user.keys.push(FakeKey {
            meta: AccessKeyMetadata {
                key_id: key_id.clone(),
                created_at: test_now(),
                status: KeyStatus::Active,
            },
            last_used: KeyLastUsed::default(),
        });
        Ok(NewAccessKey {
            key_id,
            secret: format!("fake-secret-{n}"),
        })
    }

    async fn update_access_key_status(
        &self,
        principal: &str,
        key_id: &str,
        status: KeyStatus,
    ) -> Result<(), IamError> {
        let mut state = self.record(Call::UpdateAccessKey {
            principal: principal.to_string(),
            key_id: key_id.to_string(),
            status,
        });
        if state.fail_update.contains(principal) {
            return Err(injected("UpdateAccessKey", key_id));
        }
        let key = state
            .user_mut(principal)?
            .keys
            .iter_mut()
            .find(|k| k.meta.key_id == key_id)
            .ok_or_else(|| IamError::not_found(format!("access key {key_id}")))?;
        key.meta.status = status;
        Ok(())
    }

    async fn delete_access_key(&self, principal: &str, key_id: &str) -> Result<(), IamError> {
        let mut state = self.record(Call::DeleteAccessKey {
            principal: principal.to_string(),
            key_id: key_id.to_string(),
        });
        if state.fail_delete.contains(principal) {
            return Err(injected("DeleteAccessKey", key_id));
        }
        let user = state.user_mut(principal)?;
        let before = user.keys.len();
        user.keys.retain(|k| k.meta.key_id != key_id);
        if user.keys.len() == before {
            return Err(IamError::not_found(format!("access key {key_id}")));
        }
        Ok(())
    }

    async fn get_login_profile(&self, principal: &str) -> Result<LoginProfile, IamError> {
        self.stall(principal).await;
        let state = self.record(Call::GetLoginProfile(principal.to_string()));
        if state.fail_login.contains(principal) {
            return Err(IamError::Sdk {
                code: Some("AccessDenied".to_string()),
                message: format!("not authorized to read the login profile of {principal}"),
            });
        }
        state
            .user(principal)?
            .login
            .clone()
            .ok_or_else(|| IamError::not_found(format!("login profile for {principal}")))
    }

    async fn update_login_profile(
        &self,
        principal: &str,
        password: &str,
        reset_required: bool,
    ) -> Result<(), IamError> {
        let mut state = self.record(Call::UpdateLoginProfile {
            principal: principal.to_string(),
            reset_required,
        });
        if state.fail_update.contains(principal) {
            return Err(injected("UpdateLoginProfile", principal));
        }
        let user = state.user_mut(principal)?;
        let Some(login) = user.login.as_mut() else {
            return Err(IamError::not_found(format!("login profile for {principal}")));
        };
        login.reset_required = reset_required;
        login.created_at = test_now();
        user.password = Some(password.to_string());
        Ok(())
    }
}
