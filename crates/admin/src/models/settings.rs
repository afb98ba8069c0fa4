//! Typed integration settings.
//!
//! Each third-party integration gets an explicit struct with named fields
//! rather than a dynamically-keyed map, so a typo in a settings key is a
//! compile error and secrets can be redacted field by field.

use serde::{Deserialize, Serialize};

/// Placeholder shown in place of stored secrets on read.
pub const REDACTED: &str = "[REDACTED]";

/// All third-party integration settings, one optional section per service.
///
/// Stored as a single JSONB document under the `integrations` settings key.
/// A `None` section means the integration has never been configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSettings {
    /// Stripe payments.
    pub stripe: Option<StripeSettings>,
    /// ShipEngine shipping rates and labels.
    pub shipengine: Option<ShipEngineSettings>,
    /// Resend transactional email.
    pub resend: Option<ResendSettings>,
    /// Trellis growing-program sync.
    pub trellis: Option<TrellisSettings>,
    /// Gemini chat assistant.
    pub gemini: Option<GeminiSettings>,
    /// UPS shipping.
    pub ups: Option<UpsSettings>,
}

impl IntegrationSettings {
    /// Copy of these settings with all secret fields replaced by
    /// [`REDACTED`], for returning from read endpoints.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut out = self.clone();
        if let Some(stripe) = &mut out.stripe {
            redact(&mut stripe.secret_key);
            if let Some(webhook_secret) = &mut stripe.webhook_secret {
                redact(webhook_secret);
            }
        }
        if let Some(shipengine) = &mut out.shipengine {
            redact(&mut shipengine.api_key);
        }
        if let Some(resend) = &mut out.resend {
            redact(&mut resend.api_key);
        }
        if let Some(trellis) = &mut out.trellis {
            redact(&mut trellis.api_key);
        }
        if let Some(gemini) = &mut out.gemini {
            redact(&mut gemini.api_key);
        }
        if let Some(ups) = &mut out.ups {
            redact(&mut ups.client_secret);
        }
        out
    }
}

fn redact(secret: &mut String) {
    if !secret.is_empty() {
        REDACTED.clone_into(secret);
    }
}

/// Stripe payment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSettings {
    /// Publishable key (safe for the storefront).
    pub publishable_key: String,
    /// Secret API key.
    pub secret_key: String,
    /// Webhook signing secret.
    pub webhook_secret: Option<String>,
    /// Whether checkout should use Stripe.
    pub enabled: bool,
}

/// ShipEngine shipping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipEngineSettings {
    /// API key.
    pub api_key: String,
    /// Carrier to quote rates from by default.
    pub default_carrier_id: Option<String>,
    /// Warehouse shipments originate from.
    pub warehouse_id: Option<String>,
    /// Whether rate quoting is enabled.
    pub enabled: bool,
}

/// Resend transactional email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendSettings {
    /// API key.
    pub api_key: String,
    /// Sender address for outgoing mail.
    pub from_address: String,
    /// Optional reply-to address.
    pub reply_to: Option<String>,
    /// Whether transactional email is enabled.
    pub enabled: bool,
}

/// Trellis growing-program settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrellisSettings {
    /// API key.
    pub api_key: String,
    /// Merchant identifier.
    pub merchant_id: String,
    /// Whether sync is enabled.
    pub enabled: bool,
}

/// Gemini chat assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    /// API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Whether the assistant is enabled.
    pub enabled: bool,
}

/// UPS shipping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsSettings {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// UPS account number.
    pub account_number: String,
    /// Whether UPS rates are enabled.
    pub enabled: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_unconfigured() {
        let settings = IntegrationSettings::default();
        assert!(settings.stripe.is_none());
        assert!(settings.ups.is_none());
    }

    #[test]
    fn test_missing_sections_deserialize_as_none() {
        // Documents written before a new integration existed must still load.
        let settings: IntegrationSettings =
            serde_json::from_str(r#"{"stripe": null}"#).unwrap();
        assert!(settings.gemini.is_none());
    }

    #[test]
    fn test_redacted_hides_secrets_keeps_public_fields() {
        let settings = IntegrationSettings {
            stripe: Some(StripeSettings {
                publishable_key: "pk_live_abc".to_owned(),
                secret_key: "sk_live_xyz".to_owned(),
                webhook_secret: Some("whsec_123".to_owned()),
                enabled: true,
            }),
            ..Default::default()
        };

        let redacted = settings.redacted();
        let stripe = redacted.stripe.unwrap();
        assert_eq!(stripe.publishable_key, "pk_live_abc");
        assert_eq!(stripe.secret_key, REDACTED);
        assert_eq!(stripe.webhook_secret.as_deref(), Some(REDACTED));
        assert!(stripe.enabled);
    }

    #[test]
    fn test_redacted_leaves_empty_secrets_empty() {
        let settings = IntegrationSettings {
            resend: Some(ResendSettings {
                api_key: String::new(),
                from_address: "hello@atlurbanfarms.com".to_owned(),
                reply_to: None,
                enabled: false,
            }),
            ..Default::default()
        };

        let resend = settings.redacted().resend.unwrap();
        assert!(resend.api_key.is_empty());
    }
}
