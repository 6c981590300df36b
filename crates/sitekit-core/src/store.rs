//! Identity-store capability traits.
//!
//! The identity framework expects one store type that can do everything;
//! here that surface is split into one narrow trait per capability group,
//! all implemented by a single facade. Site settings are an explicit
//! parameter on every call — the tenant scope is resolved per call, never
//! cached.
//!
//! Cancellation is cooperative: implementations check the token before
//! starting and after each I/O boundary that precedes further side
//! effects, reporting [`SiteKitError::Cancelled`].
//!
//! [`SiteKitError::Cancelled`]: crate::error::SiteKitError::Cancelled

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::SiteKitResult;
use crate::models::{
    claim::UserClaim, login::ExternalLogin, site::SiteSettings, user::SiteUser,
};

/// User lifecycle and naming.
pub trait UserAccountStore: Send + Sync {
    /// Create a user. Assigns the resolved site scope when unset; when the
    /// login name or display name is empty, both default to one value
    /// suggested from the email local part. Configured default roles are
    /// granted after the record is persisted.
    fn create(
        &self,
        settings: &SiteSettings,
        user: SiteUser,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<SiteUser>> + Send;

    fn update(
        &self,
        settings: &SiteSettings,
        user: SiteUser,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    /// Hard delete or flag-as-deleted, per the site's
    /// `really_delete_users` policy.
    fn delete(
        &self,
        settings: &SiteSettings,
        user: &SiteUser,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn find_by_id(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Option<SiteUser>>> + Send;

    fn find_by_login_name(
        &self,
        settings: &SiteSettings,
        login_name: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Option<SiteUser>>> + Send;

    fn set_login_name(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        login_name: String,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn set_display_name(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        display_name: String,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;
}

/// Email storage and lookup.
pub trait UserEmailStore: Send + Sync {
    fn set_email(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        email: String,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn find_by_email(
        &self,
        settings: &SiteSettings,
        email: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Option<SiteUser>>> + Send;
}

/// Opaque password-hash and security-stamp storage.
pub trait UserPasswordStore: Send + Sync {
    fn set_password_hash(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        password_hash: String,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn set_security_stamp(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        security_stamp: String,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn has_password(&self, user: &SiteUser) -> bool {
        !user.password_hash.is_empty()
    }
}

/// Phone number storage.
pub trait UserPhoneStore: Send + Sync {
    fn set_phone_number(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        phone_number: Option<String>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;
}

/// Two-factor enrollment flag.
pub trait UserTwoFactorStore: Send + Sync {
    fn set_two_factor_enabled(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        enabled: bool,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;
}

/// Lockout state and the failed-access counter.
pub trait UserLockoutStore: Send + Sync {
    /// Every user may be locked out; there is no per-user opt-out.
    fn lockout_enabled(&self, _user: &SiteUser) -> bool {
        true
    }

    /// Derived lockout state; absent, minimum-sentinel, or past lockout
    /// ends all mean "not locked out".
    fn is_locked_out(&self, user: &SiteUser, now: DateTime<Utc>) -> bool {
        user.is_locked_out(now)
    }

    fn set_lockout_end(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        lockout_end: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    /// Increment and persist the failed-access counter through its
    /// dedicated command path. Returns the new count.
    fn increment_failed_access(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<i32>> + Send;

    fn reset_failed_access(
        &self,
        settings: &SiteSettings,
        user: &mut SiteUser,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;
}

/// Claim attachment and reverse lookup.
pub trait UserClaimStore: Send + Sync {
    fn claims_for_user(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Vec<UserClaim>>> + Send;

    fn add_claims(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        claims: Vec<UserClaim>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn remove_claims(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        claims: Vec<UserClaim>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn replace_claim(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        old_claim: UserClaim,
        new_claim: UserClaim,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn users_with_claim(
        &self,
        settings: &SiteSettings,
        claim: &UserClaim,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Vec<SiteUser>>> + Send;
}

/// External login linking.
pub trait UserLoginStore: Send + Sync {
    fn add_login(
        &self,
        settings: &SiteSettings,
        login: ExternalLogin,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn remove_login(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn logins_for_user(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Vec<ExternalLogin>>> + Send;

    /// Find the user owning an external login. A missing login record and
    /// a login record whose user is gone both report `None`; the latter is
    /// a data anomaly worth logging, not a fatal error.
    fn find_by_external_login(
        &self,
        settings: &SiteSettings,
        provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Option<SiteUser>>> + Send;
}

/// Role membership.
pub trait UserRoleStore: Send + Sync {
    fn add_to_role(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn remove_from_role(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn roles_for_user(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Vec<String>>> + Send;

    fn is_in_role(
        &self,
        settings: &SiteSettings,
        user_id: Uuid,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<bool>> + Send;

    fn users_in_role(
        &self,
        settings: &SiteSettings,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SiteKitResult<Vec<SiteUser>>> + Send;
}
