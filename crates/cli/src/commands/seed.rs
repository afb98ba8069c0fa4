//! Seed the database with demo data.
//!
//! Creates a demo admin, a couple of orders, and a handful of gift cards in
//! various lifecycle states. Intended for local development only; every
//! insert is idempotent or harmless to repeat.

use rust_decimal::Decimal;

use atl_urban_farms_admin::db::{self, AdminUserRepository, GiftCardRepository, RepositoryError};
use atl_urban_farms_admin::models::{GiftCardError, IssueGiftCardInput};
use atl_urban_farms_core::{AdminRole, Email, EmailError, OrderId};

/// Errors that can occur during seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Ledger operation failed.
    #[error("{0}")]
    Ledger(#[from] GiftCardError),

    /// A hardcoded seed email failed to parse.
    #[error("Seed email invalid: {0}")]
    Email(#[from] EmailError),
}

/// Seed demo data into the admin database.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or any write fails.
pub async fn demo_data() -> Result<(), SeedError> {
    let database_url = super::admin_database_url().map_err(SeedError::MissingEnvVar)?;
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Seeding demo data...");

    // Demo admin for actor attribution
    let admins = AdminUserRepository::new(&pool);
    let demo_email = Email::parse("demo@atlurbanfarms.com")?;
    let admin = match admins.get_by_email(&demo_email).await? {
        Some(existing) => existing,
        None => {
            admins
                .create(&demo_email, "Demo Admin", AdminRole::Admin)
                .await?
        }
    };
    tracing::info!("Demo admin: {} (id {})", admin.email, admin.id);

    // Orders referenced by redemptions
    let order_id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO admin.orders (order_number, customer_email, total)
        VALUES ($1, $2, $3)
        ON CONFLICT (order_number) DO UPDATE SET total = EXCLUDED.total
        RETURNING id
        ",
    )
    .bind("AUF-1001")
    .bind("customer@example.com")
    .bind(Decimal::new(2000, 2))
    .fetch_one(&pool)
    .await?;

    let cards = GiftCardRepository::new(&pool);

    // A fresh active card
    let fresh = cards
        .issue(
            &IssueGiftCardInput {
                initial_balance: Decimal::new(5000, 2),
                recipient_name: Some("Maya".to_owned()),
                recipient_email: Some(Email::parse("maya@example.com")?),
                purchaser_email: Some(Email::parse("customer@example.com")?),
                message: Some("Happy planting!".to_owned()),
                expires_at: None,
            },
            Some(admin.id),
        )
        .await?;
    tracing::info!("Issued active card {} ({})", fresh.id, fresh.code);

    // A partially redeemed card
    let partial = cards
        .issue(
            &IssueGiftCardInput {
                initial_balance: Decimal::new(5000, 2),
                recipient_name: None,
                recipient_email: None,
                purchaser_email: Some(Email::parse("customer@example.com")?),
                message: None,
                expires_at: None,
            },
            Some(admin.id),
        )
        .await?;
    cards
        .redeem(
            partial.id,
            Decimal::new(2000, 2),
            OrderId::new(order_id),
            Some(admin.id),
        )
        .await?;
    // A cancelled line item credits part of the redemption back
    cards
        .refund(
            partial.id,
            Decimal::new(500, 2),
            OrderId::new(order_id),
            Some(admin.id),
        )
        .await?;
    tracing::info!(
        "Issued partially redeemed card {} ({}) with an order refund",
        partial.id,
        partial.code
    );

    // A depleted card
    let depleted = cards
        .issue(
            &IssueGiftCardInput {
                initial_balance: Decimal::new(1000, 2),
                recipient_name: None,
                recipient_email: None,
                purchaser_email: None,
                message: None,
                expires_at: None,
            },
            Some(admin.id),
        )
        .await?;
    cards
        .redeem(
            depleted.id,
            Decimal::new(1000, 2),
            OrderId::new(order_id),
            Some(admin.id),
        )
        .await?;
    tracing::info!("Issued depleted card {} ({})", depleted.id, depleted.code);

    tracing::info!("Seeding complete!");
    Ok(())
}
