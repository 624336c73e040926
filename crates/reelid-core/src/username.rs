use crate::CoreError;

/// Longest username the listing site accepts.
const MAX_USERNAME_LEN: usize = 15;

/// Validates a listing-site username: 1–15 ASCII letters, digits, or `_`.
///
/// Surrounding whitespace is trimmed; the trimmed slice is returned.
///
/// # Errors
///
/// Returns [`CoreError::InvalidUsername`] when the username is empty or
/// contains characters outside the allowed set.
pub fn validate_username(raw: &str) -> Result<&str, CoreError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(CoreError::InvalidUsername(
            "Letterboxd username is required.",
        ));
    }

    let well_formed = username.len() <= MAX_USERNAME_LEN
        && username
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if !well_formed {
        return Err(CoreError::InvalidUsername("Invalid username format."));
    }

    Ok(username)
}
