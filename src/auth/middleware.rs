//! Authentication middleware and extractors

use crate::auth::{TokenService, UserRole};
use crate::error::{Error, Result};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

/// Identity attached to a request once its token has been verified.
///
/// Lives in the request extensions for the duration of that one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "userRole")]
    pub user_role: UserRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }
}

/// Verify the raw `Authorization` header value.
///
/// A missing or empty header fails with [`Error::MissingToken`] before the
/// token service is consulted.
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<Identity> {
    let token = match headers.get(AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| Error::InvalidToken)?,
        None => return Err(Error::MissingToken),
    };
    if token.is_empty() {
        return Err(Error::MissingToken);
    }

    let claims = tokens.verify(token)?;
    Ok(Identity {
        user_id: claims.user_id,
        user_role: claims.user_role,
    })
}

/// Middleware for requiring authentication
pub async fn require_auth(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let identity = authenticate(&tokens, req.headers()).inspect_err(|e| {
        tracing::debug!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
    })?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Middleware for routes restricted to administrators
pub async fn require_admin(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let identity = authenticate(&tokens, req.headers()).inspect_err(|e| {
        tracing::debug!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
    })?;
    if !identity.is_admin() {
        tracing::warn!(
            "User {} denied access to {}",
            identity.user_id,
            req.uri().path()
        );
        return Err(Error::InsufficientRole);
    }
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(Error::MissingToken)
    }
}
