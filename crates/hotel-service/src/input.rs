//! Normalization of free-text inputs shared by the mutating services.

use hotel_core::error::AppError;
use hotel_core::result::AppResult;

/// Longest accepted notes / special requests.
pub(crate) const MAX_NOTES_LEN: usize = 1000;
/// Longest accepted idempotency key.
pub(crate) const MAX_KEY_LEN: usize = 128;

/// Trim notes; blank notes become `None`.
pub(crate) fn notes(notes: Option<String>) -> AppResult<Option<String>> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTES_LEN {
        return Err(AppError::validation(format!(
            "Notes are limited to {MAX_NOTES_LEN} characters"
        ))
        .with_field("notes"));
    }
    Ok(Some(trimmed.to_string()))
}

/// Validate a caller-supplied retry token. Keys are opaque and compared
/// verbatim, so they are not trimmed.
pub(crate) fn idempotency_key(key: Option<String>) -> AppResult<Option<String>> {
    match key {
        None => Ok(None),
        Some(key) if key.is_empty() || key.len() > MAX_KEY_LEN || key.chars().any(char::is_whitespace) => {
            Err(AppError::validation(format!(
                "Idempotency key must be 1 to {MAX_KEY_LEN} characters without whitespace"
            ))
            .with_field("idempotency_key"))
        }
        Some(key) => Ok(Some(key)),
    }
}
