//! Domain models for the sitekit identity store.
//!
//! These are the core types shared across all crates. Every entity except
//! the value-only claim and login types is keyed by a site (tenant) scope.

pub mod claim;
pub mod login;
pub mod role;
pub mod site;
pub mod user;
