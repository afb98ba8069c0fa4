//! CLI command implementations.

pub mod admin;
pub mod gift_cards;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Load `ADMIN_DATABASE_URL` (falling back to `DATABASE_URL`) from the
/// environment, reading `.env` first.
pub fn admin_database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "ADMIN_DATABASE_URL not set")
}
