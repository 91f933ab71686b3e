use chrono::NaiveDateTime;

use crate::error::{SaccoError, SaccoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Staff => "Staff",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
    pub date_joined: NaiveDateTime,
}

impl User {
    pub fn role(&self) -> Role {
        if self.is_staff {
            Role::Staff
        } else {
            Role::Member
        }
    }
}

/// The authenticated user on whose behalf an operation runs. Every
/// staff-only operation takes one and checks its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    pub fn require_staff(&self) -> SaccoResult<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(SaccoError::Unauthorized)
        }
    }

    pub fn require_member(&self) -> SaccoResult<()> {
        if self.is_staff() {
            Err(SaccoError::MembersOnly)
        } else {
            Ok(())
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role(),
        }
    }
}
