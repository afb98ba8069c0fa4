//! Gift card management commands.
//!
//! # Usage
//!
//! ```bash
//! # Issue a $50 card and print its code
//! atl-cli gift-card issue -a 50.00 --recipient-email friend@example.com
//!
//! # Credit a card by $10
//! atl-cli gift-card adjust -i 42 -a 10.00 -n "goodwill credit"
//!
//! # Debit a card by $10
//! atl-cli gift-card adjust -i 42 -a 10.00 --remove
//!
//! # List depleted cards
//! atl-cli gift-card list -s depleted
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin database

use rust_decimal::Decimal;
use thiserror::Error;

use atl_urban_farms_admin::db::{self, GiftCardRepository};
use atl_urban_farms_admin::models::{
    AdjustDirection, AdjustmentInput, GiftCardError, GiftCardFilter, IssueGiftCardInput,
};
use atl_urban_farms_core::{Email, GiftCardStatus};

/// Errors that can occur during gift card commands.
#[derive(Debug, Error)]
pub enum GiftCardCliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Ledger operation failed.
    #[error("{0}")]
    Ledger(#[from] GiftCardError),

    /// Invalid amount argument.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid email argument.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Invalid status argument.
    #[error("Invalid status: {0}. Valid statuses: active, disabled, depleted")]
    InvalidStatus(String),
}

fn parse_amount(s: &str) -> Result<Decimal, GiftCardCliError> {
    s.trim()
        .trim_start_matches('$')
        .parse::<Decimal>()
        .map_err(|_| GiftCardCliError::InvalidAmount(s.to_owned()))
}

/// Issue a new gift card and print its code.
///
/// # Errors
///
/// Returns `GiftCardCliError` if inputs are invalid or the write fails.
pub async fn issue(
    amount: &str,
    recipient_name: Option<&str>,
    recipient_email: Option<&str>,
    message: Option<&str>,
) -> Result<(), GiftCardCliError> {
    let initial_balance = parse_amount(amount)?;
    let recipient_email = recipient_email
        .map(|s| Email::parse(s).map_err(|e| GiftCardCliError::InvalidEmail(e.to_string())))
        .transpose()?;

    let database_url = super::admin_database_url().map_err(GiftCardCliError::MissingEnvVar)?;
    let pool = db::create_pool(&database_url).await?;

    let input = IssueGiftCardInput {
        initial_balance,
        recipient_name: recipient_name.map(str::to_owned),
        recipient_email,
        purchaser_email: None,
        message: message.map(str::to_owned),
        expires_at: None,
    };

    // CLI issuance has no acting admin; created_by stays empty.
    let issued = GiftCardRepository::new(&pool).issue(&input, None).await?;

    tracing::info!("Gift card issued!");
    tracing::info!("  ID:      {}", issued.id);
    tracing::info!("  Code:    {}", issued.code);
    tracing::info!("  Balance: ${initial_balance}");

    Ok(())
}

/// Apply a manual adjustment to a card.
///
/// # Errors
///
/// Returns `GiftCardCliError` if the amount is invalid or the ledger rejects
/// the adjustment.
pub async fn adjust(
    id: i32,
    amount: &str,
    remove: bool,
    notes: Option<&str>,
) -> Result<(), GiftCardCliError> {
    let amount = parse_amount(amount)?;

    let database_url = super::admin_database_url().map_err(GiftCardCliError::MissingEnvVar)?;
    let pool = db::create_pool(&database_url).await?;

    let input = AdjustmentInput {
        direction: if remove {
            AdjustDirection::Remove
        } else {
            AdjustDirection::Add
        },
        amount,
        notes: notes.map(str::to_owned),
    };

    let outcome = GiftCardRepository::new(&pool)
        .adjust(atl_urban_farms_core::GiftCardId::new(id), &input, None)
        .await?;

    tracing::info!(
        "Adjustment applied. New balance: ${}, status: {}",
        outcome.new_balance,
        outcome.status
    );

    Ok(())
}

/// List gift cards, optionally filtered by status.
///
/// # Errors
///
/// Returns `GiftCardCliError` if the status is invalid or the query fails.
pub async fn list(status: Option<&str>) -> Result<(), GiftCardCliError> {
    let status = status
        .map(|s| {
            s.parse::<GiftCardStatus>()
                .map_err(|_| GiftCardCliError::InvalidStatus(s.to_owned()))
        })
        .transpose()?;

    let database_url = super::admin_database_url().map_err(GiftCardCliError::MissingEnvVar)?;
    let pool = db::create_pool(&database_url).await?;

    let filter = GiftCardFilter {
        status,
        ..Default::default()
    };
    let cards = GiftCardRepository::new(&pool).list(&filter).await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{:<6} {:<8} {:>12} {:>12} {:<10} {}",
            "ID", "CODE", "BALANCE", "INITIAL", "STATUS", "RECIPIENT"
        );
        for card in &cards {
            println!(
                "{:<6} ...{:<5} {:>12} {:>12} {:<10} {}",
                card.id,
                card.code.last_four(),
                format!("${}", card.current_balance),
                format!("${}", card.initial_balance),
                card.status.to_string(),
                card.recipient_email
                    .as_ref()
                    .map_or("-", atl_urban_farms_core::Email::as_str),
            );
        }
        println!("{} card(s)", cards.len());
    }

    Ok(())
}
