//! Site role domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRole {
    pub id: Uuid,
    pub site_id: Uuid,
    pub name: String,
    pub normalized_name: String,
}

impl SiteRole {
    pub fn new(site_id: Uuid, name: impl Into<String>) -> Self {
        let name = name.into();
        let normalized_name = crate::models::user::normalize(&name);
        Self {
            id: Uuid::new_v4(),
            site_id,
            name,
            normalized_name,
        }
    }

    /// A role record is only usable for membership writes when it carries
    /// a real identifier.
    pub fn is_resolved(&self) -> bool {
        !self.id.is_nil()
    }
}
