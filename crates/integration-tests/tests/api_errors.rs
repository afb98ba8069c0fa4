//! Integration tests for HTTP error mapping.
//!
//! Clients distinguish validation mistakes (400) from state conflicts (409),
//! so the mapping from ledger errors to status codes is part of the API
//! contract.

use axum::http::StatusCode;
use axum::response::IntoResponse;

use atl_urban_farms_admin::error::AppError;
use atl_urban_farms_admin::models::GiftCardError;
use atl_urban_farms_integration_tests::dollars;

fn status_for(err: GiftCardError) -> StatusCode {
    AppError::from(err).into_response().status()
}

#[test]
fn test_validation_maps_to_bad_request() {
    assert_eq!(
        status_for(GiftCardError::Validation("amount must be positive".into())),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn test_balance_conflicts_map_to_conflict() {
    assert_eq!(
        status_for(GiftCardError::InsufficientBalance {
            current_balance: dollars(3000)
        }),
        StatusCode::CONFLICT
    );
    assert_eq!(status_for(GiftCardError::ZeroBalance), StatusCode::CONFLICT);
}

#[test]
fn test_unknown_card_maps_to_not_found() {
    assert_eq!(status_for(GiftCardError::NotFound), StatusCode::NOT_FOUND);
}

#[test]
fn test_corruption_maps_to_internal_and_hides_detail() {
    let response =
        AppError::from(GiftCardError::DataCorruption("bad status value".into())).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_insufficient_balance_message_names_current_balance() {
    let err = AppError::from(GiftCardError::InsufficientBalance {
        current_balance: dollars(3000),
    });
    assert!(err.to_string().contains("30.00"));
}
