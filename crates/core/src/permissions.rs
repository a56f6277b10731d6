//! Role-based permission rules.
//!
//! The HTTP layer resolves the caller into an [`Actor`] and asks these
//! functions; it never compares role strings itself.

use crate::roles::Role;
use crate::types::DbId;

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
    pub is_superuser: bool,
}

impl Actor {
    /// Admin role or superuser flag.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}

/// Categories, genres and titles may only be written by admins.
pub fn can_manage_catalog(actor: &Actor) -> bool {
    actor.is_admin()
}

/// The `/users` resource is admin-only.
pub fn can_manage_users(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Reviews and comments may be edited or deleted by their author, a
/// moderator, or an admin.
pub fn can_modify_content(actor: &Actor, author_id: DbId) -> bool {
    actor.user_id == author_id || actor.is_moderator() || actor.is_admin()
}
