//! Default-role assignment for newly created users.

use sitekit_core::error::{SiteKitResult, ensure_not_cancelled};
use sitekit_core::repository::{UserCommands, UserQueries};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Split a semicolon-delimited role list, dropping empty and
/// whitespace-only segments, preserving order. A value without a
/// separator is a single role name.
pub(crate) fn split_role_names(configured: &str) -> Vec<&str> {
    configured
        .split(';')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Grant the configured default roles to a newly created user.
///
/// Best effort: role names that do not resolve to a record with a real
/// identifier are skipped, since misconfigured defaults must not block
/// user creation. An empty configuration performs no repository calls.
pub async fn assign_default_roles<Q: UserQueries, C: UserCommands>(
    queries: &Q,
    commands: &C,
    site_id: Uuid,
    user_id: Uuid,
    configured: &str,
    cancel: &CancellationToken,
) -> SiteKitResult<()> {
    for name in split_role_names(configured) {
        ensure_not_cancelled(cancel)?;
        match queries.fetch_role_by_name(site_id, name).await? {
            Some(role) if role.is_resolved() => {
                ensure_not_cancelled(cancel)?;
                commands.add_user_to_role(site_id, role.id, user_id).await?;
            }
            _ => {
                tracing::debug!(role = name, "default role not found, skipping");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::split_role_names;

    #[test]
    fn empty_config_yields_no_names() {
        assert!(split_role_names("").is_empty());
        assert!(split_role_names("  ").is_empty());
    }

    #[test]
    fn single_name_without_separator() {
        assert_eq!(split_role_names("Admins"), vec!["Admins"]);
    }

    #[test]
    fn splits_in_order_and_drops_empty_segments() {
        assert_eq!(
            split_role_names("Admins;Editors;;"),
            vec!["Admins", "Editors"]
        );
        assert_eq!(
            split_role_names(" Admins ; ; Editors "),
            vec!["Admins", "Editors"]
        );
    }
}
