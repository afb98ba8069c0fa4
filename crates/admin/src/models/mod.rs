//! Domain models for the back office.

pub mod admin_user;
pub mod gift_card;
pub mod settings;

pub use admin_user::{AdminUser, CurrentAdmin};
pub use gift_card::{
    AdjustDirection, AdjustmentInput, GiftCard, GiftCardError, GiftCardFilter, GiftCardStats,
    GiftCardTransaction, GiftCardWithHistory, IssueGiftCardInput, IssuedGiftCard, LedgerOutcome,
};
pub use settings::{
    GeminiSettings, IntegrationSettings, ResendSettings, ShipEngineSettings, StripeSettings,
    TrellisSettings, UpsSettings,
};
