//! Email service for gift card delivery.
//!
//! Uses SMTP via lettre. Delivery is plain text; the storefront owns all
//! customer-facing HTML.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use atl_urban_farms_core::{Email, GiftCardCode};

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if SMTP connection fails.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a newly issued gift card to its recipient.
    ///
    /// # Errors
    ///
    /// Returns error if the message fails to build or send.
    pub async fn send_gift_card(
        &self,
        to: &Email,
        recipient_name: Option<&str>,
        code: &GiftCardCode,
        balance: Decimal,
        message: Option<&str>,
    ) -> Result<(), EmailError> {
        let body = gift_card_body(recipient_name, code, balance, message);
        self.send_text_email(to.as_str(), "Your ATL Urban Farms Gift Card", &body)
            .await
    }

    /// Send a plain text email.
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn gift_card_body(
    recipient_name: Option<&str>,
    code: &GiftCardCode,
    balance: Decimal,
    message: Option<&str>,
) -> String {
    let greeting = recipient_name.map_or_else(|| "Hello,".to_string(), |name| format!("Hi {name},"));

    let mut body = format!(
        "{greeting}\n\n\
         You've received an ATL Urban Farms gift card worth ${balance}.\n\n\
         Gift card code: {code}\n\n\
         Enter this code at checkout to apply it to your order."
    );

    if let Some(message) = message {
        body.push_str(&format!("\n\nA note from the sender:\n{message}"));
    }

    body.push_str("\n\nHappy growing,\nATL Urban Farms");
    body
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gift_card_body_includes_code_and_balance() {
        let code = GiftCardCode::parse("ABCDEFGHJKMN").unwrap();
        let body = gift_card_body(Some("Maya"), &code, Decimal::new(5000, 2), None);

        assert!(body.starts_with("Hi Maya,"));
        assert!(body.contains("ABCDEFGHJKMN"));
        assert!(body.contains("$50.00"));
    }

    #[test]
    fn test_gift_card_body_without_name_or_message() {
        let code = GiftCardCode::parse("ABCDEFGHJKMN").unwrap();
        let body = gift_card_body(None, &code, Decimal::new(2500, 2), None);

        assert!(body.starts_with("Hello,"));
        assert!(!body.contains("A note from the sender"));
    }

    #[test]
    fn test_gift_card_body_with_message() {
        let code = GiftCardCode::parse("ABCDEFGHJKMN").unwrap();
        let body = gift_card_body(
            Some("Maya"),
            &code,
            Decimal::new(5000, 2),
            Some("Happy birthday!"),
        );

        assert!(body.contains("A note from the sender:\nHappy birthday!"));
    }
}
