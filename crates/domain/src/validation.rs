// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::MAX_ARTICLE_ID_LEN;

/// Validates the shape of an article identifier.
///
/// # Arguments
///
/// * `value` - The candidate identifier
///
/// # Returns
///
/// * `Ok(())` if the identifier is well formed
/// * `Err(DomainError::InvalidArticleId)` otherwise
///
/// # Errors
///
/// Returns an error if:
/// - The value is empty
/// - The value is longer than `MAX_ARTICLE_ID_LEN` characters
/// - The value contains anything other than ASCII letters and digits
pub fn validate_article_id(value: &str) -> Result<(), DomainError> {
    let reason: Option<String> = if value.is_empty() {
        Some(String::from("Article id cannot be empty"))
    } else if value.len() > MAX_ARTICLE_ID_LEN {
        Some(format!(
            "Article id must be at most {MAX_ARTICLE_ID_LEN} characters"
        ))
    } else if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(String::from(
            "Article id may only contain ASCII letters and digits",
        ))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DomainError::InvalidArticleId {
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Validates that a user identifier is usable.
///
/// # Errors
///
/// Returns `DomainError::InvalidUserId` if the value is empty or contains
/// control characters.
pub fn validate_user_id(value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::InvalidUserId(String::from(
            "User id cannot be empty",
        )));
    }

    if value.chars().any(char::is_control) {
        return Err(DomainError::InvalidUserId(String::from(
            "User id cannot contain control characters",
        )));
    }

    Ok(())
}
