//! External login domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A link between a site user and an account at an external identity
/// provider, keyed by `(provider, provider_key)` within a site scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLogin {
    pub user_id: Uuid,
    pub provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
}
