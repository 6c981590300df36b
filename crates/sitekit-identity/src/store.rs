//! User store facade.
//!
//! One type implementing every capability trait, generic over the
//! repository pair so the adapter has no dependency on any storage crate.
//! Each operation checks cancellation up front, resolves the effective
//! site scope, and delegates to the collaborators; repository failures
//! propagate untouched — no retries, no translation.

use chrono::{DateTime, Utc};
use sitekit_core::error::{SiteKitError, SiteKitResult, ensure_not_cancelled};
use sitekit_core::models::claim::UserClaim;
use sitekit_core::models::login::ExternalLogin;
use sitekit_core::models::site::SiteSettings;
use sitekit_core::models::user::{SiteUser, normalize};
use sitekit_core::repository::{UserCommands, UserQueries};
use sitekit_core::store::{
    UserAccountStore, UserClaimStore, UserEmailStore, UserLockoutStore, UserLoginStore,
    UserPasswordStore, UserPhoneStore, UserRoleStore, UserTwoFactorStore,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::defaults::assign_default_roles;
use crate::scope::resolve_site_scope;
use crate::suggest::suggest_login_name;

/// The identity-store adapter.
///
/// Generic over repository implementations; a dropped store cannot be
/// called, so no runtime lifecycle flag exists.
pub struct UserStore<Q: UserQueries, C: UserCommands> {
    queries: Q,
    commands: C,
}

impl<Q: UserQueries, C: UserCommands> UserStore<Q, C> {
    pub fn new(queries: Q, commands: C) -> Self {
        Self { queries, commands }
    }

    /// Persist a field change through the general update path.
    async fn persist(&self, user: &SiteUser) -> SiteKitResult<()> {
        self.commands.update_user(user.clone()).await
    }
}

impl<Q: UserQueries, C: UserCommands> UserAccountStore for UserStore<Q, C> {
    async fn create(
        &self,
        settings: &SiteSettings,
        mut user: SiteUser,
        cancel: &CancellationToken,
    ) -> SiteKitResult<SiteUser> {
        ensure_not_cancelled(cancel)?;

        if user.login_name.is_empty() && user.email.is_empty() {
            return Err(SiteKitError::Validation {
                message: "a new user needs a login name or an email to derive one from".into(),
            });
        }

        let scope = resolve_site_scope(settings);
        if user.site_id.is_nil() {
            user.site_id = scope;
        }

        if user.login_name.is_empty() || user.display_name.is_empty() {
            let suggested = suggest_login_name(&self.queries, scope, &user.email, cancel).await?;
            if user.login_name.is_empty() {
                user.login_name = suggested.clone();
            }
            if user.display_name.is_empty() {
                user.display_name = suggested;
            }
        }
        if user.normalized_login_name.is_empty() {
            user.normalized_login_name = normalize(&user.login_name);
        }
        if user.normalized_email.is_empty() && !user.email.is_empty() {
            user.normalized_email = normalize(&user.email);
        }

        ensure_not_cancelled(cancel)?;
        self.commands.create_user(user.clone()).await?;

        assign_default_roles(
            &self.queries,
            &self.commands,
            scope,
            user.id,
            &settings.default_roles_for_new_users,
            cancel,
        )
        .await?;

        Ok(user)
    }

    async fn update(
        &self,
        _settings: &SiteSettings,
        user: SiteUser,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        self.commands.update_user(user).await
    }

    async fn delete(
        &self,
        settings: &SiteSettings,
        user: &SiteUser,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        if settings.really_delete_users {
            self.commands.delete_user(scope, user.id).await
        } else {
            self.commands.flag_user_as_deleted(scope, user.id).await
        }
    }

    async fn find_by_id(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Option<SiteUser>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries.fetch_user(scope, user_id).await
    }

    async fn find_by_login_name(
        &self,
        settings: &SiteSettings,
        login_name: &str,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Option<SiteUser>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries
            .fetch_user_by_login_name(scope, login_name)
            .await
    }

    async fn set_login_name(
        &self,
        _settings: &SiteSettings,
        user: &mut SiteUser,
        login_name: String,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        user.normalized_login_name = normalize(&login_name);
        user.login_name = login_name;
        self.persist(user).await
    }

    async fn set_display_name(
        &self,
        _settings: &SiteSettings,
        user: &mut SiteUser,
        display_name: String,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        user.display_name = display_name;
        self.persist(user).await
    }
}

impl<Q: UserQueries, C: UserCommands> UserEmailStore for UserStore<Q, C> {
    async fn set_email(
        &self,
        _settings: &SiteSettings,
        user: &mut SiteUser,
        email: String,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        user.normalized_email = normalize(&email);
        user.email = email;
        self.persist(user).await
    }

    async fn find_by_email(
        &self,
        settings: &SiteSettings,
        email: &str,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Option<SiteUser>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries.fetch_user_by_email(scope, email).await
    }
}

impl<Q: UserQueries, C: UserCommands> UserPasswordStore for UserStore<Q, C> {
    async fn set_password_hash(
        &self,
        _settings: &SiteSettings,
        user: &mut SiteUser,
        password_hash: String,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        user.password_hash = password_hash;
        self.persist(user).await
    }

    async fn set_security_stamp(
        &self,
        _settings: &SiteSettings,
        user: &mut SiteUser,
        security_stamp: String,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        user.security_stamp = security_stamp;
        self.persist(user).await
    }
}

impl<Q: UserQueries, C: UserCommands> UserPhoneStore for UserStore<Q, C> {
    async fn set_phone_number(
        &self,
        _settings: &SiteSettings,
        user: &mut SiteUser,
        phone_number: Option<String>,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        user.phone_number = phone_number;
        self.persist(user).await
    }
}

impl<Q: UserQueries, C: UserCommands> UserTwoFactorStore for UserStore<Q, C> {
    async fn set_two_factor_enabled(
        &self,
        _settings: &SiteSettings,
        user: &mut SiteUser,
        enabled: bool,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        user.two_factor_enabled = enabled;
        self.persist(user).await
    }
}

impl<Q: UserQueries, C: UserCommands> UserLockoutStore for UserStore<Q, C> {
    async fn set_lockout_end(
        &self,
        _settings: &SiteSettings,
        user: &mut SiteUser,
        lockout_end: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        user.lockout_end = lockout_end;
        self.persist(user).await
    }

    async fn increment_failed_access(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        cancel: &CancellationToken,
    ) -> SiteKitResult<i32> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        user.failed_access_count += 1;
        self.commands
            .update_failed_access_count(scope, user.id, user.failed_access_count)
            .await?;
        Ok(user.failed_access_count)
    }

    async fn reset_failed_access(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        user.failed_access_count = 0;
        self.commands
            .update_failed_access_count(scope, user.id, 0)
            .await
    }
}

impl<Q: UserQueries, C: UserCommands> UserClaimStore for UserStore<Q, C> {
    async fn claims_for_user(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Vec<UserClaim>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries.fetch_claims(scope, user_id).await
    }

    async fn add_claims(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        claims: Vec<UserClaim>,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        for claim in claims {
            ensure_not_cancelled(cancel)?;
            self.commands.create_claim(scope, user_id, claim).await?;
        }
        Ok(())
    }

    async fn remove_claims(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        claims: Vec<UserClaim>,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        for claim in claims {
            ensure_not_cancelled(cancel)?;
            self.commands.delete_claim(scope, user_id, claim).await?;
        }
        Ok(())
    }

    async fn replace_claim(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        old_claim: UserClaim,
        new_claim: UserClaim,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.commands.delete_claim(scope, user_id, old_claim).await?;
        ensure_not_cancelled(cancel)?;
        self.commands.create_claim(scope, user_id, new_claim).await
    }

    async fn users_with_claim(
        &self,
        settings: &SiteSettings,
        claim: &UserClaim,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Vec<SiteUser>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries.fetch_users_with_claim(scope, claim).await
    }
}

impl<Q: UserQueries, C: UserCommands> UserLoginStore for UserStore<Q, C> {
    async fn add_login(
        &self,
        settings: &SiteSettings,
        login: ExternalLogin,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.commands.create_login(scope, login).await
    }

    async fn remove_login(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.commands
            .delete_login(scope, user_id, provider, provider_key)
            .await
    }

    async fn logins_for_user(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Vec<ExternalLogin>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries.fetch_logins_for_user(scope, user_id).await
    }

    async fn find_by_external_login(
        &self,
        settings: &SiteSettings,
        provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Option<SiteUser>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);

        let Some(login) = self
            .queries
            .fetch_external_login(scope, provider, provider_key)
            .await?
        else {
            return Ok(None);
        };

        ensure_not_cancelled(cancel)?;
        match self.queries.fetch_user(scope, login.user_id).await? {
            Some(user) => Ok(Some(user)),
            None => {
                // Login record without its user is a data anomaly, not a
                // fatal error.
                tracing::warn!(
                    provider,
                    user_id = %login.user_id,
                    "external login references a missing user"
                );
                Ok(None)
            }
        }
    }
}

impl<Q: UserQueries, C: UserCommands> UserRoleStore for UserStore<Q, C> {
    async fn add_to_role(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        match self.queries.fetch_role_by_name(scope, role_name).await? {
            Some(role) if role.is_resolved() => {
                ensure_not_cancelled(cancel)?;
                self.commands.add_user_to_role(scope, role.id, user_id).await
            }
            _ => {
                tracing::debug!(role = role_name, "role not found, nothing to add");
                Ok(())
            }
        }
    }

    async fn remove_from_role(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> SiteKitResult<()> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        match self.queries.fetch_role_by_name(scope, role_name).await? {
            Some(role) if role.is_resolved() => {
                ensure_not_cancelled(cancel)?;
                self.commands
                    .remove_user_from_role(scope, role.id, user_id)
                    .await
            }
            _ => {
                tracing::debug!(role = role_name, "role not found, nothing to remove");
                Ok(())
            }
        }
    }

    async fn roles_for_user(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Vec<String>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries.fetch_roles_for_user(scope, user_id).await
    }

    async fn is_in_role(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> SiteKitResult<bool> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries
            .user_is_in_role(scope, user_id, role_name)
            .await
    }

    async fn users_in_role(
        &self,
        settings: &SiteSettings,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> SiteKitResult<Vec<SiteUser>> {
        ensure_not_cancelled(cancel)?;
        let scope = resolve_site_scope(settings);
        self.queries.fetch_users_in_role(scope, role_name).await
    }
}
