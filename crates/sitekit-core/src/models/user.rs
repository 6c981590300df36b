//! Site user domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized form used for lookup keys (login names, emails, role names).
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A user account scoped to a single site.
///
/// The site id is assigned once, at creation, when not already present.
/// After creation `login_name` and `display_name` are never empty — when
/// absent both default to a name suggested from the email local part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteUser {
    pub id: Uuid,
    pub site_id: Uuid,
    pub login_name: String,
    pub display_name: String,
    pub email: String,
    pub normalized_login_name: String,
    pub normalized_email: String,
    /// Opaque; this layer never inspects or computes password hashes.
    pub password_hash: String,
    pub security_stamp: String,
    pub phone_number: Option<String>,
    pub two_factor_enabled: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub failed_access_count: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl SiteUser {
    /// A blank user for the given scope and email. `Uuid::nil()` as the
    /// site id means "not yet assigned".
    pub fn new(site_id: Uuid, email: impl Into<String>) -> Self {
        let email = email.into();
        let normalized_email = normalize(&email);
        Self {
            id: Uuid::new_v4(),
            site_id,
            login_name: String::new(),
            display_name: String::new(),
            email,
            normalized_login_name: String::new(),
            normalized_email,
            password_hash: String::new(),
            security_stamp: String::new(),
            phone_number: None,
            two_factor_enabled: false,
            lockout_end: None,
            failed_access_count: 0,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    /// Lockout end with the sentinel minimum timestamp normalized away.
    ///
    /// Some stores persist "no lockout" as the minimum representable
    /// timestamp; that reads back as absent, not as a lockout that started
    /// at the beginning of time.
    pub fn effective_lockout_end(&self) -> Option<DateTime<Utc>> {
        match self.lockout_end {
            Some(end) if end == DateTime::<Utc>::MIN_UTC => None,
            other => other,
        }
    }

    /// Whether the user is locked out at `now`. Absent or past lockout
    /// ends mean not locked out.
    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        matches!(self.effective_lockout_end(), Some(end) if end > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn min_timestamp_reads_as_no_lockout_end() {
        let mut user = SiteUser::new(Uuid::new_v4(), "joe@example.com");
        user.lockout_end = Some(DateTime::<Utc>::MIN_UTC);
        assert_eq!(user.effective_lockout_end(), None);
        assert!(!user.is_locked_out(Utc::now()));
    }

    #[test]
    fn past_lockout_end_is_not_locked_out() {
        let mut user = SiteUser::new(Uuid::new_v4(), "joe@example.com");
        let now = Utc::now();
        user.lockout_end = Some(now - Duration::minutes(5));
        assert!(!user.is_locked_out(now));
    }

    #[test]
    fn future_lockout_end_is_locked_out() {
        let mut user = SiteUser::new(Uuid::new_v4(), "joe@example.com");
        let now = Utc::now();
        user.lockout_end = Some(now + Duration::minutes(5));
        assert!(user.is_locked_out(now));
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Joe@Example.COM "), "joe@example.com");
    }
}
