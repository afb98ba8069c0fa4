//! HTTP route handlers for the admin API.

pub mod dashboard;
pub mod gift_cards;
pub mod settings;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the `/api` router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/gift-cards",
            get(gift_cards::list).post(gift_cards::create),
        )
        .route("/gift-cards/{id}", get(gift_cards::detail))
        .route("/gift-cards/{id}/adjust", post(gift_cards::adjust))
        .route("/gift-cards/{id}/status", post(gift_cards::set_status))
        .route("/dashboard", get(dashboard::index))
        .route(
            "/settings/integrations",
            get(settings::show).put(settings::update),
        )
}
