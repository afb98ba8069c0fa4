//! Key/value settings storage.
//!
//! Settings live in `admin.settings` as one JSONB document per key. The
//! typed integration settings document sits under [`INTEGRATIONS_KEY`].

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::IntegrationSettings;

/// Settings key for the integration settings document.
pub const INTEGRATIONS_KEY: &str = "integrations";

/// Get a raw settings value by key.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_setting(
    pool: &PgPool,
    key: &str,
) -> Result<Option<serde_json::Value>, RepositoryError> {
    let value = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT value FROM admin.settings WHERE key = $1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(value)
}

/// Upsert a raw settings value.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the write fails.
pub async fn set_setting(
    pool: &PgPool,
    key: &str,
    value: &serde_json::Value,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO admin.settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the typed integration settings, defaulting when none are stored.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if the stored document doesn't
/// deserialize.
pub async fn load_integration_settings(
    pool: &PgPool,
) -> Result<IntegrationSettings, RepositoryError> {
    match get_setting(pool, INTEGRATIONS_KEY).await? {
        Some(value) => serde_json::from_value(value).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid integration settings: {e}"))
        }),
        None => Ok(IntegrationSettings::default()),
    }
}

/// Persist the typed integration settings.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the write fails.
pub async fn save_integration_settings(
    pool: &PgPool,
    settings: &IntegrationSettings,
) -> Result<(), RepositoryError> {
    let value = serde_json::to_value(settings).map_err(|e| {
        RepositoryError::DataCorruption(format!("integration settings failed to serialize: {e}"))
    })?;
    set_setting(pool, INTEGRATIONS_KEY, &value).await
}
