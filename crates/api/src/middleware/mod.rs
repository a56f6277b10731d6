//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the Bearer token to a live user row.
//! - [`rbac::RequireAdmin`] -- Requires a user administrator.
//! - [`rbac::RequireCatalogAdmin`] -- Requires a catalog administrator.

pub mod auth;
pub mod rbac;
