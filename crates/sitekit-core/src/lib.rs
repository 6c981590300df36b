//! sitekit Core — domain models, error types, collaborator traits, and
//! the identity-store capability contract.

pub mod error;
pub mod models;
pub mod repository;
pub mod store;

pub use error::{SiteKitError, SiteKitResult, ensure_not_cancelled};
