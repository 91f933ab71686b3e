//! Identity: registration, credential checks and the staff role.
//!
//! Credentials stay inside this module. Everything else receives an
//! [`Actor`] and asks it for the capability it needs.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::NaiveDateTime;
use regex::Regex;
use rusqlite::ErrorCode;
use std::sync::LazyLock;

use crate::db::Database;
use crate::error::{SaccoError, SaccoResult};
use crate::models::{Actor, User};

#[allow(clippy::expect_used)]
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("username pattern is valid"));

pub(crate) fn validate_username(username: &str) -> SaccoResult<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(SaccoError::validation(
            "Username must be 1-150 characters: letters, digits and @ . + - _ only",
        ))
    }
}

/// Create an account. Staff accounts need a staff `creator`, except for the
/// very first one.
pub(crate) fn register(
    db: &Database,
    username: &str,
    password: &str,
    is_staff: bool,
    creator: Option<&Actor>,
    now: NaiveDateTime,
) -> SaccoResult<User> {
    validate_username(username)?;
    if password.is_empty() {
        return Err(SaccoError::validation("Password is required"));
    }
    if is_staff && db.count_staff()? > 0 {
        creator.ok_or(SaccoError::Unauthorized)?.require_staff()?;
    }
    if db.get_user_by_username(username)?.is_some() {
        return Err(SaccoError::DuplicateUser(username.to_string()));
    }

    let hash = hash_password(password)?;
    let id = db
        .insert_user(username, &hash, is_staff, now)
        .map_err(|e| classify_insert_error(e, username))?;
    let user = db
        .get_user_by_id(id)?
        .ok_or_else(|| SaccoError::UserNotFound(username.to_string()))?;

    log::info!(
        "registered {} '{}'",
        if is_staff { "staff user" } else { "member" },
        user.username
    );
    Ok(user)
}

/// Check a username/password pair and hand back the acting identity.
pub(crate) fn authenticate(db: &Database, username: &str, password: &str) -> SaccoResult<Actor> {
    let Some((user, hash)) = db.get_credentials(username)? else {
        log::warn!("login failed: unknown user '{username}'");
        return Err(SaccoError::Unauthenticated);
    };
    if !verify_password(password, &hash)? {
        log::warn!("login failed: bad password for '{username}'");
        return Err(SaccoError::Unauthenticated);
    }
    log::info!("'{}' signed in as {}", user.username, user.role());
    Ok(Actor::from(&user))
}

/// Grant the staff role to an existing user.
pub(crate) fn promote(db: &Database, actor: &Actor, username: &str) -> SaccoResult<User> {
    actor.require_staff()?;
    let user = db
        .get_user_by_username(username)?
        .ok_or_else(|| SaccoError::UserNotFound(username.to_string()))?;
    if !user.is_staff {
        db.set_staff(user.id, true)?;
        log::info!("'{}' promoted '{}' to staff", actor.username, user.username);
    }
    Ok(User {
        is_staff: true,
        ..user
    })
}

pub(crate) fn list_members(db: &Database) -> SaccoResult<Vec<User>> {
    Ok(db.get_members()?)
}

fn hash_password(password: &str) -> SaccoResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SaccoError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> SaccoResult<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| SaccoError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// A unique-constraint hit means someone registered the name first.
fn classify_insert_error(err: anyhow::Error, username: &str) -> SaccoError {
    let is_conflict = err
        .downcast_ref::<rusqlite::Error>()
        .and_then(|e| e.sqlite_error_code())
        == Some(ErrorCode::ConstraintViolation);
    if is_conflict {
        SaccoError::DuplicateUser(username.to_string())
    } else {
        SaccoError::Other(err)
    }
}
