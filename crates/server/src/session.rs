// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request-scoped identity.
//!
//! An upstream identity provider authenticates the caller and forwards the
//! user id as `Authorization: Bearer <user-id>`. No header means anonymous.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use newsvote_api::{SessionContext, StaticIdentity};
use newsvote_domain::UserId;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ErrorResponse;

/// Extractor for the caller's session.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     RequestSession(session): RequestSession,
/// ) -> Result<Json<Response>, HttpError> {
///     let user = session.require_user()?;
///     ...
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 400 if the header is present but not a valid
/// `Bearer <user-id>` value. A missing header is not an error.
pub struct RequestSession(pub SessionContext);

impl<S: Send + Sync> FromRequestParts<S> for RequestSession {
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            debug!("No Authorization header; anonymous session");
            return Ok(Self(SessionContext::anonymous()));
        };

        let header: &str = value.to_str().map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;

        let token: &str = header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            SessionError::InvalidAuthorizationHeader
        })?;

        let user: UserId = UserId::new(token).map_err(|e| {
            warn!(error = %e, "Rejected bearer user id");
            SessionError::InvalidUserId(e.to_string())
        })?;

        debug!(user_id = %user, "Session resolved");

        let identity: StaticIdentity = StaticIdentity::new(Some(user));
        Ok(Self(SessionContext::from_provider(&identity)))
    }
}

/// Session extraction errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid Authorization header format. Expected: 'Bearer <user-id>'")]
    InvalidAuthorizationHeader,

    #[error("Invalid bearer user id: {0}")]
    InvalidUserId(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.to_string(),
        });
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
