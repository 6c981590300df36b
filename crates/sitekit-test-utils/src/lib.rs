//! In-memory repository double for sitekit tests.
//!
//! Implements both collaborator traits over a mutex-guarded state and
//! records every call in a journal, so tests can assert exactly which
//! repository operations an adapter operation performed, and in what
//! order.

use std::sync::{Arc, Mutex};

use sitekit_core::error::{SiteKitError, SiteKitResult};
use sitekit_core::models::claim::UserClaim;
use sitekit_core::models::login::ExternalLogin;
use sitekit_core::models::role::SiteRole;
use sitekit_core::models::user::{SiteUser, normalize};
use sitekit_core::repository::{UserCommands, UserQueries};
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    users: Vec<SiteUser>,
    roles: Vec<SiteRole>,
    memberships: Vec<(Uuid, Uuid, Uuid)>, // (site, role, user)
    claims: Vec<(Uuid, Uuid, UserClaim)>, // (site, user, claim)
    logins: Vec<(Uuid, ExternalLogin)>,   // (site, login)
    journal: Vec<String>,
}

/// In-memory `UserQueries` + `UserCommands` with a call journal.
///
/// Cloning shares the underlying state, so a test can hand clones to the
/// store under test and keep one for seeding and assertions.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, entry: String) {
        self.lock().journal.push(entry);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory repository lock poisoned")
    }

    /// Every collaborator call made so far, in order.
    pub fn journal(&self) -> Vec<String> {
        self.lock().journal.clone()
    }

    /// Journal entries starting with `prefix`, in order.
    pub fn journal_matching(&self, prefix: &str) -> Vec<String> {
        self.lock()
            .journal
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .cloned()
            .collect()
    }

    // Seeding and inspection helpers; these bypass the journal.

    pub fn insert_user(&self, user: SiteUser) {
        self.lock().users.push(user);
    }

    pub fn insert_role(&self, role: SiteRole) {
        self.lock().roles.push(role);
    }

    pub fn insert_claim(&self, site_id: Uuid, user_id: Uuid, claim: UserClaim) {
        self.lock().claims.push((site_id, user_id, claim));
    }

    pub fn insert_login(&self, site_id: Uuid, login: ExternalLogin) {
        self.lock().logins.push((site_id, login));
    }

    pub fn user(&self, site_id: Uuid, user_id: Uuid) -> Option<SiteUser> {
        self.lock()
            .users
            .iter()
            .find(|u| u.site_id == site_id && u.id == user_id)
            .cloned()
    }

    /// Names of the roles the user holds, in assignment order.
    pub fn roles_of(&self, site_id: Uuid, user_id: Uuid) -> Vec<String> {
        let state = self.lock();
        state
            .memberships
            .iter()
            .filter(|(site, _, user)| *site == site_id && *user == user_id)
            .filter_map(|(_, role_id, _)| {
                state.roles.iter().find(|r| r.id == *role_id).map(|r| r.name.clone())
            })
            .collect()
    }
}

impl UserQueries for MemoryRepository {
    async fn fetch_user(&self, site_id: Uuid, user_id: Uuid) -> SiteKitResult<Option<SiteUser>> {
        self.record(format!("fetch_user {user_id}"));
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.site_id == site_id && u.id == user_id)
            .cloned())
    }

    async fn fetch_user_by_login_name(
        &self,
        site_id: Uuid,
        login_name: &str,
    ) -> SiteKitResult<Option<SiteUser>> {
        self.record(format!("fetch_user_by_login_name {login_name}"));
        let key = normalize(login_name);
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.site_id == site_id && normalize(&u.login_name) == key)
            .cloned())
    }

    async fn fetch_user_by_email(
        &self,
        site_id: Uuid,
        email: &str,
    ) -> SiteKitResult<Option<SiteUser>> {
        self.record(format!("fetch_user_by_email {email}"));
        let key = normalize(email);
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.site_id == site_id && normalize(&u.email) == key)
            .cloned())
    }

    async fn login_name_exists(&self, site_id: Uuid, login_name: &str) -> SiteKitResult<bool> {
        self.record(format!("login_name_exists {login_name}"));
        let key = normalize(login_name);
        Ok(self
            .lock()
            .users
            .iter()
            .any(|u| u.site_id == site_id && normalize(&u.login_name) == key))
    }

    async fn fetch_role_by_name(
        &self,
        site_id: Uuid,
        name: &str,
    ) -> SiteKitResult<Option<SiteRole>> {
        self.record(format!("fetch_role_by_name {name}"));
        let key = normalize(name);
        Ok(self
            .lock()
            .roles
            .iter()
            .find(|r| r.site_id == site_id && r.normalized_name == key)
            .cloned())
    }

    async fn fetch_roles_for_user(
        &self,
        site_id: Uuid,
        user_id: Uuid,
    ) -> SiteKitResult<Vec<String>> {
        self.record(format!("fetch_roles_for_user {user_id}"));
        Ok(self.roles_of(site_id, user_id))
    }

    async fn user_is_in_role(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        role_name: &str,
    ) -> SiteKitResult<bool> {
        self.record(format!("user_is_in_role {role_name}"));
        let key = normalize(role_name);
        Ok(self
            .roles_of(site_id, user_id)
            .iter()
            .any(|name| normalize(name) == key))
    }

    async fn fetch_users_in_role(
        &self,
        site_id: Uuid,
        role_name: &str,
    ) -> SiteKitResult<Vec<SiteUser>> {
        self.record(format!("fetch_users_in_role {role_name}"));
        let key = normalize(role_name);
        let state = self.lock();
        let Some(role) = state
            .roles
            .iter()
            .find(|r| r.site_id == site_id && r.normalized_name == key)
        else {
            return Ok(Vec::new());
        };
        Ok(state
            .memberships
            .iter()
            .filter(|(site, rid, _)| *site == site_id && *rid == role.id)
            .filter_map(|(_, _, uid)| state.users.iter().find(|u| u.id == *uid).cloned())
            .collect())
    }

    async fn fetch_claims(&self, site_id: Uuid, user_id: Uuid) -> SiteKitResult<Vec<UserClaim>> {
        self.record(format!("fetch_claims {user_id}"));
        Ok(self
            .lock()
            .claims
            .iter()
            .filter(|(site, user, _)| *site == site_id && *user == user_id)
            .map(|(_, _, claim)| claim.clone())
            .collect())
    }

    async fn fetch_users_with_claim(
        &self,
        site_id: Uuid,
        claim: &UserClaim,
    ) -> SiteKitResult<Vec<SiteUser>> {
        self.record(format!("fetch_users_with_claim {}", claim.claim_type));
        let state = self.lock();
        Ok(state
            .claims
            .iter()
            .filter(|(site, _, c)| *site == site_id && c == claim)
            .filter_map(|(_, uid, _)| state.users.iter().find(|u| u.id == *uid).cloned())
            .collect())
    }

    async fn fetch_external_login(
        &self,
        site_id: Uuid,
        provider: &str,
        provider_key: &str,
    ) -> SiteKitResult<Option<ExternalLogin>> {
        self.record(format!("fetch_external_login {provider}"));
        Ok(self
            .lock()
            .logins
            .iter()
            .find(|(site, login)| {
                *site == site_id && login.provider == provider && login.provider_key == provider_key
            })
            .map(|(_, login)| login.clone()))
    }

    async fn fetch_logins_for_user(
        &self,
        site_id: Uuid,
        user_id: Uuid,
    ) -> SiteKitResult<Vec<ExternalLogin>> {
        self.record(format!("fetch_logins_for_user {user_id}"));
        Ok(self
            .lock()
            .logins
            .iter()
            .filter(|(site, login)| *site == site_id && login.user_id == user_id)
            .map(|(_, login)| login.clone())
            .collect())
    }
}

impl UserCommands for MemoryRepository {
    async fn create_user(&self, user: SiteUser) -> SiteKitResult<()> {
        self.record(format!("create_user {}", user.login_name));
        let mut state = self.lock();
        let duplicate = state.users.iter().any(|u| {
            u.site_id == user.site_id
                && (u.id == user.id || normalize(&u.login_name) == normalize(&user.login_name))
        });
        if duplicate {
            return Err(SiteKitError::AlreadyExists {
                entity: format!("user {}", user.login_name),
            });
        }
        state.users.push(user);
        Ok(())
    }

    async fn update_user(&self, user: SiteUser) -> SiteKitResult<()> {
        self.record(format!("update_user {}", user.id));
        let mut state = self.lock();
        let Some(stored) = state
            .users
            .iter_mut()
            .find(|u| u.site_id == user.site_id && u.id == user.id)
        else {
            return Err(SiteKitError::Storage(format!("no user {}", user.id)));
        };
        // The general update path does not project the failed-access
        // counter; that field only moves via its dedicated command.
        let failed_access_count = stored.failed_access_count;
        *stored = user;
        stored.failed_access_count = failed_access_count;
        Ok(())
    }

    async fn delete_user(&self, site_id: Uuid, user_id: Uuid) -> SiteKitResult<()> {
        self.record(format!("delete_user {user_id}"));
        self.lock()
            .users
            .retain(|u| !(u.site_id == site_id && u.id == user_id));
        Ok(())
    }

    async fn flag_user_as_deleted(&self, site_id: Uuid, user_id: Uuid) -> SiteKitResult<()> {
        self.record(format!("flag_user_as_deleted {user_id}"));
        if let Some(user) = self
            .lock()
            .users
            .iter_mut()
            .find(|u| u.site_id == site_id && u.id == user_id)
        {
            user.is_deleted = true;
        }
        Ok(())
    }

    async fn add_user_to_role(
        &self,
        site_id: Uuid,
        role_id: Uuid,
        user_id: Uuid,
    ) -> SiteKitResult<()> {
        self.record(format!("add_user_to_role {role_id}"));
        self.lock().memberships.push((site_id, role_id, user_id));
        Ok(())
    }

    async fn remove_user_from_role(
        &self,
        site_id: Uuid,
        role_id: Uuid,
        user_id: Uuid,
    ) -> SiteKitResult<()> {
        self.record(format!("remove_user_from_role {role_id}"));
        self.lock()
            .memberships
            .retain(|entry| *entry != (site_id, role_id, user_id));
        Ok(())
    }

    async fn create_claim(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        claim: UserClaim,
    ) -> SiteKitResult<()> {
        self.record(format!("create_claim {}", claim.claim_type));
        self.lock().claims.push((site_id, user_id, claim));
        Ok(())
    }

    async fn delete_claim(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        claim: UserClaim,
    ) -> SiteKitResult<()> {
        self.record(format!("delete_claim {}", claim.claim_type));
        self.lock()
            .claims
            .retain(|(site, user, c)| !(*site == site_id && *user == user_id && *c == claim));
        Ok(())
    }

    async fn create_login(&self, site_id: Uuid, login: ExternalLogin) -> SiteKitResult<()> {
        self.record(format!("create_login {}", login.provider));
        self.lock().logins.push((site_id, login));
        Ok(())
    }

    async fn delete_login(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        provider: &str,
        provider_key: &str,
    ) -> SiteKitResult<()> {
        self.record(format!("delete_login {provider}"));
        self.lock().logins.retain(|(site, login)| {
            !(*site == site_id
                && login.user_id == user_id
                && login.provider == provider
                && login.provider_key == provider_key)
        });
        Ok(())
    }

    async fn update_failed_access_count(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        count: i32,
    ) -> SiteKitResult<()> {
        self.record(format!("update_failed_access_count {count}"));
        if let Some(user) = self
            .lock()
            .users
            .iter_mut()
            .find(|u| u.site_id == site_id && u.id == user_id)
        {
            user.failed_access_count = count;
        }
        Ok(())
    }
}
