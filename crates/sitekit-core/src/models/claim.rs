//! User claim domain model.

use serde::{Deserialize, Serialize};

/// A typed key/value attribute attached to a user for authorization
/// purposes. Scope and ownership are supplied by the operation, not
/// stored on the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaim {
    pub claim_type: String,
    pub claim_value: String,
}

impl UserClaim {
    pub fn new(claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }
}
