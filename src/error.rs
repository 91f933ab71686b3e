use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::LoanStatus;

#[derive(Error, Debug)]
pub enum SaccoError {
    #[error("{0}")]
    Validation(String),

    #[error("You have exceeded your loan limit of KES {limit:.2} (requested {requested:.2})")]
    LimitExceeded { requested: Decimal, limit: Decimal },

    #[error("Loan #{0} not found")]
    LoanNotFound(i64),

    #[error("Loan #{id} was already decided ({status})")]
    AlreadyDecided { id: i64, status: LoanStatus },

    #[error("Username '{0}' already exists")]
    DuplicateUser(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Invalid credentials")]
    Unauthenticated,

    #[error("Staff access required")]
    Unauthorized,

    #[error("Only members can apply for loans")]
    MembersOnly,

    #[error("Loan #{0} is your own application; another staff member must decide it")]
    OwnLoan(i64),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SaccoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Errors the user caused and can fix, as opposed to store faults.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Other(_) | Self::PasswordHash(_)
        )
    }
}

pub type SaccoResult<T> = Result<T, SaccoError>;
