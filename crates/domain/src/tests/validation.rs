// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, validate_article_id, validate_user_id};

#[test]
fn test_valid_article_id() {
    assert!(validate_article_id("aHR0cHM6Ly9leGFtcGxlLmNvbS9h").is_ok());
}

#[test]
fn test_empty_article_id_rejected() {
    assert!(matches!(
        validate_article_id(""),
        Err(DomainError::InvalidArticleId { .. })
    ));
}

#[test]
fn test_overlong_article_id_rejected() {
    let value: String = "a".repeat(51);
    assert!(matches!(
        validate_article_id(&value),
        Err(DomainError::InvalidArticleId { .. })
    ));
}

#[test]
fn test_article_id_with_symbols_rejected() {
    assert!(matches!(
        validate_article_id("abc=="),
        Err(DomainError::InvalidArticleId { .. })
    ));
}

#[test]
fn test_user_id_with_control_characters_rejected() {
    assert!(matches!(
        validate_user_id("ali\nce"),
        Err(DomainError::InvalidUserId(_))
    ));
}
