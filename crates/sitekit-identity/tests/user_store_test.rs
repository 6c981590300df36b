//! Integration tests for the user store facade: creation, naming,
//! deletion policy, lockout, the failed-access counter, and cancellation.

use chrono::{DateTime, Duration, Utc};
use sitekit_core::SiteKitError;
use sitekit_core::models::site::SiteSettings;
use sitekit_core::models::user::SiteUser;
use sitekit_core::store::{
    UserAccountStore, UserEmailStore, UserLockoutStore, UserPasswordStore,
};
use sitekit_identity::{UserStore, suggest_login_name};
use sitekit_test_utils::MemoryRepository;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn setup() -> (
    MemoryRepository,
    UserStore<MemoryRepository, MemoryRepository>,
    SiteSettings,
) {
    let repo = MemoryRepository::new();
    let store = UserStore::new(repo.clone(), repo.clone());
    let settings = SiteSettings::new(Uuid::new_v4());
    (repo, store, settings)
}

/// Seed a user with a fixed login name into the given scope.
fn seeded_user(site_id: Uuid, login_name: &str, email: &str) -> SiteUser {
    let mut user = SiteUser::new(site_id, email);
    user.login_name = login_name.into();
    user.display_name = login_name.into();
    user.normalized_login_name = login_name.to_lowercase();
    user
}

#[tokio::test]
async fn create_assigns_site_and_derives_both_names() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let user = SiteUser::new(Uuid::nil(), "joe@example.com");
    let created = store.create(&settings, user, &cancel).await.unwrap();

    assert_eq!(created.site_id, settings.site_id);
    assert_eq!(created.login_name, "joe");
    assert_eq!(created.display_name, "joe");
    assert_eq!(created.normalized_login_name, "joe");
    assert!(repo.user(settings.site_id, created.id).is_some());
}

#[tokio::test]
async fn create_keeps_supplied_names() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let mut user = SiteUser::new(Uuid::nil(), "alice@example.com");
    user.login_name = "alice.w".into();
    user.display_name = "Alice Walker".into();

    let created = store.create(&settings, user, &cancel).await.unwrap();

    assert_eq!(created.login_name, "alice.w");
    assert_eq!(created.display_name, "Alice Walker");
    // No suggestion probing happened.
    assert!(repo.journal_matching("login_name_exists").is_empty());
}

#[tokio::test]
async fn create_fills_empty_display_name_from_email() {
    let (_repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let mut user = SiteUser::new(Uuid::nil(), "al@example.com");
    user.login_name = "alice".into();

    let created = store.create(&settings, user, &cancel).await.unwrap();

    assert_eq!(created.login_name, "alice");
    assert_eq!(created.display_name, "al");
}

#[tokio::test]
async fn create_with_nothing_to_derive_a_name_from_fails_before_io() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let user = SiteUser::new(Uuid::nil(), "");
    let err = store.create(&settings, user, &cancel).await.unwrap_err();

    assert!(matches!(err, SiteKitError::Validation { .. }));
    assert!(repo.journal().is_empty());
}

#[tokio::test]
async fn create_with_malformed_email_fails_before_io() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let user = SiteUser::new(Uuid::nil(), "joe.example.com");
    let err = store.create(&settings, user, &cancel).await.unwrap_err();

    assert!(matches!(err, SiteKitError::MalformedEmail { .. }));
    assert!(repo.journal().is_empty());
}

#[tokio::test]
async fn duplicate_login_name_propagates_collaborator_error() {
    let (_repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let mut first = SiteUser::new(Uuid::nil(), "joe@example.com");
    first.login_name = "joe".into();
    first.display_name = "joe".into();
    store.create(&settings, first, &cancel).await.unwrap();

    let mut second = SiteUser::new(Uuid::nil(), "joe@elsewhere.com");
    second.login_name = "joe".into();
    second.display_name = "joe".into();
    let err = store.create(&settings, second, &cancel).await.unwrap_err();

    assert!(matches!(err, SiteKitError::AlreadyExists { .. }));
}

#[tokio::test]
async fn suggest_returns_local_part_when_free() {
    let (repo, _store, settings) = setup();
    let cancel = CancellationToken::new();

    let name = suggest_login_name(&repo, settings.site_id, "joe@example.com", &cancel)
        .await
        .unwrap();
    assert_eq!(name, "joe");
}

#[tokio::test]
async fn suggest_appends_increasing_suffix_on_collision() {
    let (repo, _store, settings) = setup();
    let cancel = CancellationToken::new();

    repo.insert_user(seeded_user(settings.site_id, "joe", "joe@example.com"));
    let name = suggest_login_name(&repo, settings.site_id, "joe@example.com", &cancel)
        .await
        .unwrap();
    assert_eq!(name, "joe2");

    repo.insert_user(seeded_user(settings.site_id, "joe2", "joe2@example.com"));
    let name = suggest_login_name(&repo, settings.site_id, "joe@example.com", &cancel)
        .await
        .unwrap();
    assert_eq!(name, "joe3");
}

#[tokio::test]
async fn delete_flags_user_under_soft_policy() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let user = seeded_user(settings.site_id, "joe", "joe@example.com");
    repo.insert_user(user.clone());

    store.delete(&settings, &user, &cancel).await.unwrap();

    assert_eq!(repo.journal_matching("flag_user_as_deleted").len(), 1);
    assert!(repo.journal_matching("delete_user").is_empty());
    assert!(repo.user(settings.site_id, user.id).unwrap().is_deleted);
}

#[tokio::test]
async fn delete_removes_user_under_hard_policy() {
    let (repo, store, mut settings) = setup();
    settings.really_delete_users = true;
    let cancel = CancellationToken::new();

    let user = seeded_user(settings.site_id, "joe", "joe@example.com");
    repo.insert_user(user.clone());

    store.delete(&settings, &user, &cancel).await.unwrap();

    assert_eq!(repo.journal_matching("delete_user").len(), 1);
    assert!(repo.journal_matching("flag_user_as_deleted").is_empty());
    assert!(repo.user(settings.site_id, user.id).is_none());
}

#[tokio::test]
async fn cancellation_before_start_leaves_no_side_effects() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let user = SiteUser::new(Uuid::nil(), "joe@example.com");
    let err = store.create(&settings, user, &cancel).await.unwrap_err();

    assert!(matches!(err, SiteKitError::Cancelled));
    assert!(repo.journal().is_empty());
}

#[tokio::test]
async fn failed_access_counter_uses_dedicated_command() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let mut user = seeded_user(settings.site_id, "joe", "joe@example.com");
    repo.insert_user(user.clone());

    let count = store
        .increment_failed_access(&settings, &mut user, &cancel)
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(repo.journal_matching("update_failed_access_count").len(), 1);
    assert!(repo.journal_matching("update_user").is_empty());
    assert_eq!(
        repo.user(settings.site_id, user.id).unwrap().failed_access_count,
        1
    );

    store
        .reset_failed_access(&settings, &mut user, &cancel)
        .await
        .unwrap();
    assert_eq!(user.failed_access_count, 0);
    assert_eq!(
        repo.user(settings.site_id, user.id).unwrap().failed_access_count,
        0
    );
}

#[tokio::test]
async fn setters_persist_immediately() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let mut user = seeded_user(settings.site_id, "joe", "joe@example.com");
    repo.insert_user(user.clone());

    store
        .set_email(&settings, &mut user, "Joe@New.Example".into(), &cancel)
        .await
        .unwrap();

    let stored = repo.user(settings.site_id, user.id).unwrap();
    assert_eq!(stored.email, "Joe@New.Example");
    assert_eq!(stored.normalized_email, "joe@new.example");
    assert_eq!(repo.journal_matching("update_user").len(), 1);

    store
        .set_password_hash(&settings, &mut user, "opaque-hash".into(), &cancel)
        .await
        .unwrap();
    assert_eq!(
        repo.user(settings.site_id, user.id).unwrap().password_hash,
        "opaque-hash"
    );
    assert!(store.has_password(&user));
}

#[tokio::test]
async fn min_sentinel_lockout_end_reads_as_absent() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let mut user = seeded_user(settings.site_id, "joe", "joe@example.com");
    repo.insert_user(user.clone());

    store
        .set_lockout_end(&settings, &mut user, Some(DateTime::<Utc>::MIN_UTC), &cancel)
        .await
        .unwrap();

    let stored = repo.user(settings.site_id, user.id).unwrap();
    assert_eq!(stored.effective_lockout_end(), None);
    assert!(!store.is_locked_out(&stored, Utc::now()));
    assert!(store.lockout_enabled(&stored));
}

#[tokio::test]
async fn future_lockout_end_locks_user_out() {
    let (repo, store, settings) = setup();
    let cancel = CancellationToken::new();

    let mut user = seeded_user(settings.site_id, "joe", "joe@example.com");
    repo.insert_user(user.clone());

    let end = Utc::now() + Duration::minutes(10);
    store
        .set_lockout_end(&settings, &mut user, Some(end), &cancel)
        .await
        .unwrap();

    assert!(store.is_locked_out(&user, Utc::now()));
}

#[tokio::test]
async fn related_site_mode_targets_shared_scope() {
    let (repo, store, _settings) = setup();
    let cancel = CancellationToken::new();

    let shared = Uuid::new_v4();
    let mut settings = SiteSettings::new(Uuid::new_v4());
    settings.use_related_site_mode = true;
    settings.related_site_id = shared;

    // A user created through any related site lands in the shared pool.
    let user = SiteUser::new(Uuid::nil(), "joe@example.com");
    let created = store.create(&settings, user, &cancel).await.unwrap();
    assert_eq!(created.site_id, shared);

    // And is visible through another related site's settings.
    let mut other = SiteSettings::new(Uuid::new_v4());
    other.use_related_site_mode = true;
    other.related_site_id = shared;
    let found = store
        .find_by_login_name(&other, "joe", &cancel)
        .await
        .unwrap();
    assert_eq!(found.unwrap().id, created.id);
    assert!(repo.user(shared, created.id).is_some());
}
