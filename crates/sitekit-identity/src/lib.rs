//! sitekit Identity — the identity-store adapter for multi-tenant sites.
//!
//! Composes site-scope resolution, login-name suggestion, and default-role
//! assignment around an injected command/query repository pair.

pub mod defaults;
pub mod scope;
pub mod store;
pub mod suggest;

pub use scope::resolve_site_scope;
pub use store::UserStore;
pub use suggest::suggest_login_name;
