//! Field validators shared by request DTOs.
//!
//! The `validate_*` functions have the shape `validator`'s
//! `#[validate(custom(function = ...))]` expects. The plain `check_*`
//! functions hold the actual rules so they can be tested without a clock.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use validator::ValidationError;

/// Maximum length of category / genre / title names.
pub const MAX_NAME_LENGTH: u64 = 200;

/// Maximum length of category / genre slugs.
pub const MAX_SLUG_LENGTH: u64 = 200;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: u64 = 150;

/// Maximum length of an email address.
pub const MAX_EMAIL_LENGTH: u64 = 254;

/// Maximum length of first / last names.
pub const MAX_PERSON_NAME_LENGTH: u64 = 150;

/// Maximum length of a user bio.
pub const MAX_BIO_LENGTH: u64 = 500;

/// Lowest and highest review score.
pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 10;

/// Score given to a review that does not specify one.
pub const DEFAULT_SCORE: i16 = 5;

/// How many years past the current one a title's year may be.
pub const MAX_YEARS_AHEAD: i32 = 2;

/// Username reserved for the `/users/me` endpoint.
pub const RESERVED_USERNAME: &str = "me";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));

fn error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub fn check_slug(slug: &str) -> Result<(), String> {
    if !SLUG_RE.is_match(slug) {
        return Err(format!(
            "Invalid slug '{slug}'. Use only latin letters, digits, hyphens and underscores"
        ));
    }
    Ok(())
}

pub fn check_username(username: &str) -> Result<(), String> {
    if username == RESERVED_USERNAME {
        return Err(format!("Username '{RESERVED_USERNAME}' is reserved"));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(format!(
            "Invalid username '{username}'. Use only letters, digits and @/./+/-/_"
        ));
    }
    Ok(())
}

/// A title's year may not be more than [`MAX_YEARS_AHEAD`] past `current_year`.
pub fn check_year(year: i32, current_year: i32) -> Result<(), String> {
    if year < 0 {
        return Err(format!("Year must not be negative. Your year: {year}"));
    }
    if year > current_year + MAX_YEARS_AHEAD {
        return Err(format!(
            "Year cannot be more than {MAX_YEARS_AHEAD} years ahead. Your year: {year}"
        ));
    }
    Ok(())
}

/// Review scores run from [`MIN_SCORE`] to [`MAX_SCORE`] inclusive.
pub fn check_score(score: i16) -> Result<(), String> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(format!(
            "Score must be between {MIN_SCORE} and {MAX_SCORE}. Your score: {score}"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// `validator` adapters
// ---------------------------------------------------------------------------

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    check_slug(slug).map_err(|msg| error("slug", msg))
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    check_username(username).map_err(|msg| error("username", msg))
}

pub fn validate_year(year: impl std::borrow::Borrow<i32>) -> Result<(), ValidationError> {
    check_year(*year.borrow(), chrono::Utc::now().year()).map_err(|msg| error("year", msg))
}

pub fn validate_score(score: impl std::borrow::Borrow<i16>) -> Result<(), ValidationError> {
    check_score(*score.borrow()).map_err(|msg| error("score", msg))
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "This field may not be blank".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Trim surrounding whitespace and lowercase the domain part of an address.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Escape `%`, `_` and `\` so user text can be embedded in an `ILIKE` pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build a `%...%` contains-pattern for `ILIKE`.
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}
