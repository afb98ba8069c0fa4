//! Gift card route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use atl_urban_farms_core::{Email, GiftCardId, GiftCardStatus};

use crate::{
    db::GiftCardRepository,
    error::AppError,
    middleware::RequireAdminAuth,
    models::{AdjustDirection, AdjustmentInput, GiftCardFilter, IssueGiftCardInput},
    state::AppState,
};

/// Query parameters for the gift card list.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<GiftCardStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for issuing a gift card.
#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub initial_balance: Decimal,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<Email>,
    pub purchaser_email: Option<Email>,
    pub message: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for a manual adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub direction: AdjustDirection,
    pub amount: Decimal,
    pub notes: Option<String>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: GiftCardStatus,
}

/// Gift card list handler.
#[instrument(skip(_admin, state))]
pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = GiftCardFilter {
        status: query.status,
        search: query.search,
        limit: query.limit,
        offset: query.offset,
    };

    let cards = GiftCardRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(cards))
}

/// Gift card issuance handler.
#[instrument(skip(admin, state, request))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<IssueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = IssueGiftCardInput {
        initial_balance: request.initial_balance,
        recipient_name: request.recipient_name,
        recipient_email: request.recipient_email,
        purchaser_email: request.purchaser_email,
        message: request.message,
        expires_at: request.expires_at,
    };

    let issued = GiftCardRepository::new(state.pool())
        .issue(&input, Some(admin.id))
        .await?;

    tracing::info!(
        gift_card_id = %issued.id,
        initial_balance = %input.initial_balance,
        "Gift card issued"
    );

    // Delivery is best-effort: the card exists either way, and the code is
    // returned to the issuing admin below.
    if let (Some(email_service), Some(recipient)) = (state.email(), &input.recipient_email) {
        if let Err(e) = email_service
            .send_gift_card(
                recipient,
                input.recipient_name.as_deref(),
                &issued.code,
                input.initial_balance,
                input.message.as_deref(),
            )
            .await
        {
            tracing::warn!(gift_card_id = %issued.id, error = %e, "Gift card email failed to send");
        }
    }

    Ok((StatusCode::CREATED, Json(issued)))
}

/// Gift card detail handler: the card plus its full transaction history.
#[instrument(skip(_admin, state))]
pub async fn detail(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let detail = GiftCardRepository::new(state.pool())
        .get_with_history(GiftCardId::new(id))
        .await?;
    Ok(Json(detail))
}

/// Manual balance adjustment handler.
#[instrument(skip(admin, state, request))]
pub async fn adjust(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AdjustRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = AdjustmentInput {
        direction: request.direction,
        amount: request.amount,
        notes: request.notes,
    };

    let outcome = GiftCardRepository::new(state.pool())
        .adjust(GiftCardId::new(id), &input, Some(admin.id))
        .await?;

    tracing::info!(
        gift_card_id = id,
        amount = %input.direction.signed(input.amount),
        new_balance = %outcome.new_balance,
        "Gift card adjusted"
    );

    Ok(Json(outcome))
}

/// Status change handler (enable/disable).
#[instrument(skip(_admin, state))]
pub async fn set_status(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<StatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = GiftCardRepository::new(state.pool())
        .set_status(GiftCardId::new(id), request.status)
        .await?;

    tracing::info!(gift_card_id = id, status = %status, "Gift card status changed");

    Ok(Json(serde_json::json!({ "status": status })))
}
