//! Site (tenant) configuration model.
//!
//! Settings are passed explicitly into every store operation rather than
//! captured as ambient per-request state, so all logic is visibly
//! tenant-aware.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-site configuration relevant to the identity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_id: Uuid,
    /// When set, every user-scoped operation targets `related_site_id`
    /// instead of `site_id`, so a group of sites shares one user pool.
    pub use_related_site_mode: bool,
    pub related_site_id: Uuid,
    /// `true` hard-deletes users; `false` flags them as deleted.
    /// Per-site policy, not a per-call choice.
    pub really_delete_users: bool,
    /// Semicolon-delimited role names granted to every newly created user.
    /// May name zero, one, or many roles.
    pub default_roles_for_new_users: String,
}

impl SiteSettings {
    pub fn new(site_id: Uuid) -> Self {
        Self {
            site_id,
            use_related_site_mode: false,
            related_site_id: Uuid::nil(),
            really_delete_users: false,
            default_roles_for_new_users: String::new(),
        }
    }
}
