//! Collaborator trait definitions for the external user repository.
//!
//! All operations are async and keyed by a site (tenant) scope. The
//! implementations own consistency and uniqueness enforcement; this layer
//! does not duplicate either. Lookups report "not found" as `None` or an
//! empty collection, never as an error.

use uuid::Uuid;

use crate::error::SiteKitResult;
use crate::models::{
    claim::UserClaim, login::ExternalLogin, role::SiteRole, user::SiteUser,
};

/// Read side of the user repository.
pub trait UserQueries: Send + Sync {
    fn fetch_user(
        &self,
        site_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SiteKitResult<Option<SiteUser>>> + Send;

    fn fetch_user_by_login_name(
        &self,
        site_id: Uuid,
        login_name: &str,
    ) -> impl Future<Output = SiteKitResult<Option<SiteUser>>> + Send;

    fn fetch_user_by_email(
        &self,
        site_id: Uuid,
        email: &str,
    ) -> impl Future<Output = SiteKitResult<Option<SiteUser>>> + Send;

    fn login_name_exists(
        &self,
        site_id: Uuid,
        login_name: &str,
    ) -> impl Future<Output = SiteKitResult<bool>> + Send;

    fn fetch_role_by_name(
        &self,
        site_id: Uuid,
        name: &str,
    ) -> impl Future<Output = SiteKitResult<Option<SiteRole>>> + Send;

    fn fetch_roles_for_user(
        &self,
        site_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SiteKitResult<Vec<String>>> + Send;

    fn user_is_in_role(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        role_name: &str,
    ) -> impl Future<Output = SiteKitResult<bool>> + Send;

    fn fetch_users_in_role(
        &self,
        site_id: Uuid,
        role_name: &str,
    ) -> impl Future<Output = SiteKitResult<Vec<SiteUser>>> + Send;

    fn fetch_claims(
        &self,
        site_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SiteKitResult<Vec<UserClaim>>> + Send;

    fn fetch_users_with_claim(
        &self,
        site_id: Uuid,
        claim: &UserClaim,
    ) -> impl Future<Output = SiteKitResult<Vec<SiteUser>>> + Send;

    fn fetch_external_login(
        &self,
        site_id: Uuid,
        provider: &str,
        provider_key: &str,
    ) -> impl Future<Output = SiteKitResult<Option<ExternalLogin>>> + Send;

    fn fetch_logins_for_user(
        &self,
        site_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SiteKitResult<Vec<ExternalLogin>>> + Send;
}

/// Write side of the user repository.
///
/// Constraint violations (e.g. duplicate identifiers) surface as the
/// implementation's own error kinds and propagate unchanged.
pub trait UserCommands: Send + Sync {
    fn create_user(&self, user: SiteUser) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn update_user(&self, user: SiteUser) -> impl Future<Output = SiteKitResult<()>> + Send;

    /// Hard delete.
    fn delete_user(
        &self,
        site_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    /// Soft delete: marks the record without removing it.
    fn flag_user_as_deleted(
        &self,
        site_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn add_user_to_role(
        &self,
        site_id: Uuid,
        role_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn remove_user_from_role(
        &self,
        site_id: Uuid,
        role_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn create_claim(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        claim: UserClaim,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn delete_claim(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        claim: UserClaim,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn create_login(
        &self,
        site_id: Uuid,
        login: ExternalLogin,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    fn delete_login(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        provider: &str,
        provider_key: &str,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;

    /// Dedicated path for the failed-access counter; the general
    /// `update_user` path does not project this field.
    fn update_failed_access_count(
        &self,
        site_id: Uuid,
        user_id: Uuid,
        count: i32,
    ) -> impl Future<Output = SiteKitResult<()>> + Send;
}
