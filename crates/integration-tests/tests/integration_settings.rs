//! Integration tests for the integration settings document.

use atl_urban_farms_admin::models::{
    IntegrationSettings, ResendSettings, StripeSettings, settings::REDACTED,
};

fn sample() -> IntegrationSettings {
    IntegrationSettings {
        stripe: Some(StripeSettings {
            publishable_key: "pk_live_abc".to_owned(),
            secret_key: "sk_live_xyz".to_owned(),
            webhook_secret: Some("whsec_123".to_owned()),
            enabled: true,
        }),
        resend: Some(ResendSettings {
            api_key: "re_live_456".to_owned(),
            from_address: "hello@atlurbanfarms.com".to_owned(),
            reply_to: None,
            enabled: true,
        }),
        ..Default::default()
    }
}

/// The stored JSONB document round-trips without loss.
#[test]
fn test_settings_round_trip() {
    let settings = sample();
    let value = serde_json::to_value(&settings).expect("serialize");
    let back: IntegrationSettings = serde_json::from_value(value).expect("deserialize");

    let stripe = back.stripe.expect("stripe section");
    assert_eq!(stripe.secret_key, "sk_live_xyz");
    assert!(back.trellis.is_none());
}

/// Documents stored before an integration existed still deserialize; the new
/// section defaults to unconfigured.
#[test]
fn test_old_documents_gain_new_sections_as_none() {
    let old = serde_json::json!({
        "stripe": {
            "publishable_key": "pk_live_abc",
            "secret_key": "sk_live_xyz",
            "webhook_secret": null,
            "enabled": false
        }
    });

    let settings: IntegrationSettings = serde_json::from_value(old).expect("deserialize");
    assert!(settings.stripe.is_some());
    assert!(settings.ups.is_none());
    assert!(settings.gemini.is_none());
}

/// What read endpoints return never contains a live secret.
#[test]
fn test_redacted_document_has_no_secrets() {
    let redacted = sample().redacted();
    let json = serde_json::to_string(&redacted).expect("serialize");

    assert!(!json.contains("sk_live_xyz"));
    assert!(!json.contains("whsec_123"));
    assert!(!json.contains("re_live_456"));
    assert!(json.contains(REDACTED));
    // Public fields survive
    assert!(json.contains("pk_live_abc"));
    assert!(json.contains("hello@atlurbanfarms.com"));
}
