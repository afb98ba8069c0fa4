//! Dashboard route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use tracing::instrument;

use crate::{db::GiftCardRepository, error::AppError, middleware::RequireAdminAuth, state::AppState};

/// Dashboard handler: aggregate gift card ledger summary.
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = GiftCardRepository::new(state.pool()).stats().await?;
    Ok(Json(stats))
}
