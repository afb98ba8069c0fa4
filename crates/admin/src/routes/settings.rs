//! Integration settings route handlers.
//!
//! Reads return the settings with secrets redacted. Writes that carry the
//! redaction placeholder in a secret field keep the stored value, so a
//! client can round-trip a read without wiping keys. A placeholder with no
//! stored value behind it is rejected rather than persisted verbatim.

use axum::{Json, extract::State, response::IntoResponse};
use tracing::instrument;

use crate::{
    db::settings::{load_integration_settings, save_integration_settings},
    error::AppError,
    middleware::RequireAdminAuth,
    models::{IntegrationSettings, settings::REDACTED},
    state::AppState,
};

/// Integration settings read handler.
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let settings = load_integration_settings(state.pool()).await?;
    Ok(Json(settings.redacted()))
}

/// Integration settings update handler.
#[instrument(skip(_admin, state, incoming))]
pub async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(mut incoming): Json<IntegrationSettings>,
) -> Result<impl IntoResponse, AppError> {
    let stored = load_integration_settings(state.pool()).await?;
    restore_redacted_secrets(&mut incoming, &stored)?;

    save_integration_settings(state.pool(), &incoming).await?;
    tracing::info!("Integration settings updated");

    Ok(Json(incoming.redacted()))
}

/// Replace any secret field still holding the redaction placeholder with the
/// stored value. A placeholder with no stored counterpart is a client error:
/// persisting the literal placeholder would silently break the integration.
fn restore_redacted_secrets(
    incoming: &mut IntegrationSettings,
    stored: &IntegrationSettings,
) -> Result<(), AppError> {
    if let Some(section) = &mut incoming.stripe {
        let stored = stored.stripe.as_ref();
        restore(
            "stripe secret_key",
            &mut section.secret_key,
            stored.map(|s| s.secret_key.as_str()),
        )?;
        if let Some(webhook_secret) = &mut section.webhook_secret {
            restore(
                "stripe webhook_secret",
                webhook_secret,
                stored.and_then(|s| s.webhook_secret.as_deref()),
            )?;
        }
    }
    if let Some(section) = &mut incoming.shipengine {
        restore(
            "shipengine api_key",
            &mut section.api_key,
            stored.shipengine.as_ref().map(|s| s.api_key.as_str()),
        )?;
    }
    if let Some(section) = &mut incoming.resend {
        restore(
            "resend api_key",
            &mut section.api_key,
            stored.resend.as_ref().map(|s| s.api_key.as_str()),
        )?;
    }
    if let Some(section) = &mut incoming.trellis {
        restore(
            "trellis api_key",
            &mut section.api_key,
            stored.trellis.as_ref().map(|s| s.api_key.as_str()),
        )?;
    }
    if let Some(section) = &mut incoming.gemini {
        restore(
            "gemini api_key",
            &mut section.api_key,
            stored.gemini.as_ref().map(|s| s.api_key.as_str()),
        )?;
    }
    if let Some(section) = &mut incoming.ups {
        restore(
            "ups client_secret",
            &mut section.client_secret,
            stored.ups.as_ref().map(|s| s.client_secret.as_str()),
        )?;
    }
    Ok(())
}

fn restore(field: &str, incoming: &mut String, stored: Option<&str>) -> Result<(), AppError> {
    if incoming == REDACTED {
        let Some(stored) = stored else {
            return Err(AppError::BadRequest(format!(
                "{field} is the redaction placeholder but no stored value exists to restore"
            )));
        };
        stored.clone_into(incoming);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::StripeSettings;

    #[test]
    fn test_redacted_secret_restores_stored_value() {
        let stored = IntegrationSettings {
            stripe: Some(StripeSettings {
                publishable_key: "pk_live_abc".to_owned(),
                secret_key: "sk_live_xyz".to_owned(),
                webhook_secret: Some("whsec_123".to_owned()),
                enabled: true,
            }),
            ..Default::default()
        };

        let mut incoming = stored.clone().redacted();
        restore_redacted_secrets(&mut incoming, &stored).expect("restore");

        let stripe = incoming.stripe.unwrap();
        assert_eq!(stripe.secret_key, "sk_live_xyz");
        assert_eq!(stripe.webhook_secret.as_deref(), Some("whsec_123"));
    }

    #[test]
    fn test_fresh_secret_is_kept() {
        let stored = IntegrationSettings {
            stripe: Some(StripeSettings {
                publishable_key: "pk_live_abc".to_owned(),
                secret_key: "sk_live_old".to_owned(),
                webhook_secret: None,
                enabled: true,
            }),
            ..Default::default()
        };

        let mut incoming = stored.clone();
        if let Some(stripe) = &mut incoming.stripe {
            stripe.secret_key = "sk_live_new".to_owned();
        }
        restore_redacted_secrets(&mut incoming, &stored).expect("restore");

        assert_eq!(incoming.stripe.unwrap().secret_key, "sk_live_new");
    }

    #[test]
    fn test_placeholder_without_stored_section_is_rejected() {
        let stored = IntegrationSettings::default();
        let mut incoming = IntegrationSettings {
            stripe: Some(StripeSettings {
                publishable_key: "pk_live_abc".to_owned(),
                secret_key: REDACTED.to_owned(),
                webhook_secret: None,
                enabled: true,
            }),
            ..Default::default()
        };

        let err = restore_redacted_secrets(&mut incoming, &stored).expect_err("must reject");
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("stripe secret_key"));
    }

    #[test]
    fn test_placeholder_without_stored_field_is_rejected() {
        let stored = IntegrationSettings {
            stripe: Some(StripeSettings {
                publishable_key: "pk_live_abc".to_owned(),
                secret_key: "sk_live_xyz".to_owned(),
                webhook_secret: None,
                enabled: true,
            }),
            ..Default::default()
        };

        let mut incoming = stored.clone();
        if let Some(stripe) = &mut incoming.stripe {
            stripe.webhook_secret = Some(REDACTED.to_owned());
        }

        assert!(restore_redacted_secrets(&mut incoming, &stored).is_err());
    }
}
