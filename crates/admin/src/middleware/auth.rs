//! Authentication extractors for the admin API.
//!
//! Identity itself lives in an external auth service. The gateway in front
//! of this API verifies the login and forwards two things: the shared
//! bearer token and the acting admin's ID in the `x-admin-user-id` header.
//! The extractor checks both so ledger entries always carry an actor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use atl_urban_farms_core::AdminUserId;

use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Header carrying the acting admin's ID, set by the auth gateway.
pub const ADMIN_USER_HEADER: &str = "x-admin-user-id";

/// Extractor that requires admin authentication.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("acting admin: {}", admin.id)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when admin authentication fails.
pub enum AdminAuthRejection {
    /// Missing or wrong bearer token.
    Unauthorized,
    /// Token accepted but the actor header is missing or malformed.
    MissingActor,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::MissingActor => (
                StatusCode::BAD_REQUEST,
                format!("missing or invalid {ADMIN_USER_HEADER} header"),
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AdminAuthRejection::Unauthorized)?;

        if token != state.config().api_token.expose_secret() {
            return Err(AdminAuthRejection::Unauthorized);
        }

        let admin_user_id = parts
            .headers
            .get(ADMIN_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i32>().ok())
            .ok_or(AdminAuthRejection::MissingActor)?;

        Ok(Self(CurrentAdmin {
            id: AdminUserId::new(admin_user_id),
        }))
    }
}
