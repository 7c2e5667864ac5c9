// Validation utilities for user supplied strings

use lazy_static::lazy_static;
use regex::Regex;

/// Minimum username length
pub const USERNAME_MIN_LENGTH: usize = 3;
/// Maximum username length
pub const USERNAME_MAX_LENGTH: usize = 30;
/// Maximum handle length accepted for any provider
pub const HANDLE_MAX_LENGTH: usize = 255;
/// Maximum memo length on an ephemeral link
pub const MEMO_MAX_LENGTH: usize = 200;
/// Maximum stored referral code or invite link length
pub const REFERRAL_CODE_MAX_LENGTH: usize = 255;

lazy_static! {
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-z0-9_-]+$").unwrap();
}

/// Validate a public username slug
///
/// Usernames are lowercase letters, digits, hyphens and underscores, 3-30 characters.
pub fn validate_username(username: &str) -> Result<(), String> {
    if !USERNAME_REGEX.is_match(username) {
        return Err(
            "Username can only contain lowercase letters, numbers, hyphens, and underscores"
                .to_string(),
        );
    }

    let len = username.chars().count();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
        return Err(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
        ));
    }

    Ok(())
}

/// Normalize and validate a payment handle.
///
/// Handles are not checked against provider formats. They only need to be
/// non-empty, bounded, and free of whitespace or control characters.
pub fn normalize_handle(handle: &str) -> Result<String, String> {
    let trimmed = handle.trim();
    if trimmed.is_empty() {
        return Err("Handle cannot be empty".to_string());
    }
    if trimmed.chars().count() > HANDLE_MAX_LENGTH {
        return Err(format!(
            "Handle must be at most {} characters",
            HANDLE_MAX_LENGTH
        ));
    }
    if trimmed
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err("Handle cannot contain whitespace".to_string());
    }
    Ok(trimmed.to_string())
}

/// Trim and optionally validate a string field
///
/// # Returns
/// * `None` - If the field is None or empty after trimming
/// * `Some(String)` - The trimmed string if not empty
pub fn trim_optional_field(field: Option<&String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
