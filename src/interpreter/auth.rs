use std::fmt;

/// Access level of a user on one database. Ordered: a higher role implies
/// every lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    ReadOnly,
    ReadWrite,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::ReadOnly => write!(f, "read-only"),
            Role::ReadWrite => write!(f, "read-write"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Answers role questions for the session. Account storage lives outside
/// the engine; this is the only view the executor has of it.
pub trait Authorizer {
    fn role_for(&self, user: &str, database: &str) -> Role;
    fn is_global_admin(&self, user: &str) -> bool;

    fn has_role(&self, user: &str, database: &str, required: Role) -> bool {
        self.is_global_admin(user) || self.role_for(user, database) >= required
    }
}

/// Grants everything to everyone.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn role_for(&self, _user: &str, _database: &str) -> Role {
        Role::Admin
    }

    fn is_global_admin(&self, _user: &str) -> bool {
        true
    }
}
