//! Integration tests for ATL Urban Farms.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atl-urban-farms-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `gift_card_ledger` - Ledger arithmetic and lifecycle scenarios
//! - `gift_card_codes` - Code generation and parsing
//! - `api_errors` - HTTP error mapping
//! - `integration_settings` - Settings document round-trips and redaction
//!
//! The suites here exercise the admin crate's pure logic end to end; tests
//! that need a live `PostgreSQL` run against a deployed environment instead.

use rust_decimal::Decimal;

use atl_urban_farms_admin::models::IssueGiftCardInput;

/// Decimal dollars from a cent count.
#[must_use]
pub fn dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// A minimal valid issuance input with the given balance.
#[must_use]
pub fn issue_input(initial_balance: Decimal) -> IssueGiftCardInput {
    IssueGiftCardInput {
        initial_balance,
        recipient_name: None,
        recipient_email: None,
        purchaser_email: None,
        message: None,
        expires_at: None,
    }
}
