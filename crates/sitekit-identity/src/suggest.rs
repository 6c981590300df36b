//! Login-name suggestion.

use sitekit_core::error::{SiteKitError, SiteKitResult, ensure_not_cancelled};
use sitekit_core::repository::UserQueries;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Derive a login name that is free within `site_id` from an email
/// address.
///
/// The base candidate is the substring before the first `@`. On collision
/// a numeric suffix starting at 2 is appended and the probe repeats
/// (`joe`, `joe2`, `joe3`, …). Probes are strictly sequential — the
/// repository is the only source of truth for uniqueness, so each check
/// depends on the previous result.
///
/// An email without an `@` (or with an empty local part) is a
/// precondition violation, reported before any repository call.
pub async fn suggest_login_name<Q: UserQueries>(
    queries: &Q,
    site_id: Uuid,
    email: &str,
    cancel: &CancellationToken,
) -> SiteKitResult<String> {
    let base = match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local,
        _ => {
            return Err(SiteKitError::MalformedEmail {
                email: email.to_string(),
            });
        }
    };

    ensure_not_cancelled(cancel)?;

    let mut candidate = base.to_string();
    let mut suffix = 2u32;
    while queries.login_name_exists(site_id, &candidate).await? {
        ensure_not_cancelled(cancel)?;
        candidate = format!("{base}{suffix}");
        suffix += 1;
    }

    Ok(candidate)
}
