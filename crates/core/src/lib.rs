//! Domain building blocks for the yamdb catalog.
//!
//! Everything in this crate is free of I/O so it can be shared by the
//! repository layer, the HTTP layer, and tests alike.

pub mod confirmation;
pub mod error;
pub mod pagination;
pub mod permissions;
pub mod rating;
pub mod roles;
pub mod slug;
pub mod types;
pub mod validation;
