//! Caller identity.
//!
//! Handlers never read a user id directly; they take a [`CurrentUser`], which
//! asks the [`IdentityResolver`] held in [`AppState`]. Real authentication
//! plugs in by swapping the resolver.

use axum::{
    Json,
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use crate::api::ErrorResponse;
use crate::handler::AppState;

pub trait IdentityResolver: Send + Sync {
    /// Returns the id of the user making the request, if any.
    fn resolve(&self, parts: &Parts) -> Option<i64>;
}

/// Every request is made by the same user.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdentity(pub i64);

impl IdentityResolver for FixedIdentity {
    fn resolve(&self, _parts: &Parts) -> Option<i64> {
        Some(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match state.identity.resolve(parts) {
            Some(user_id) => Ok(CurrentUser(user_id)),
            None => {
                tracing::info!(path = %parts.uri.path(), "request without a resolvable caller");
                Err((StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("Unauthorized"))).into_response())
            }
        }
    }
}
