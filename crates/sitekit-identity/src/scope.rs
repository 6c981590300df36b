//! Site-scope resolution.

use sitekit_core::models::site::SiteSettings;
use uuid::Uuid;

/// Resolve the effective site scope for a user operation.
///
/// With related-site mode off, the caller's own site id is used. With it
/// on, every participating site shares one user pool under the configured
/// related site id, so that id wins regardless of the caller. Resolved
/// before every site-scoped query or command.
pub fn resolve_site_scope(settings: &SiteSettings) -> Uuid {
    if settings.use_related_site_mode {
        settings.related_site_id
    } else {
        settings.site_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_mode_keeps_caller_site() {
        let mut settings = SiteSettings::new(Uuid::new_v4());
        settings.related_site_id = Uuid::new_v4();
        assert_eq!(resolve_site_scope(&settings), settings.site_id);
    }

    #[test]
    fn enabled_mode_uses_shared_site_for_any_caller() {
        let shared = Uuid::new_v4();
        for _ in 0..3 {
            let mut settings = SiteSettings::new(Uuid::new_v4());
            settings.use_related_site_mode = true;
            settings.related_site_id = shared;
            assert_eq!(resolve_site_scope(&settings), shared);
        }
    }
}
