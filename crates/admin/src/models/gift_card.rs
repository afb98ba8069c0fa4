//! Gift card ledger domain models and balance arithmetic.
//!
//! The pure functions at the bottom of this module are the single place the
//! balance rules are written down in Rust. The repository re-checks them
//! inside the database transaction (under a row lock), and the migration's
//! CHECK constraints back both up.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atl_urban_farms_core::{
    AdminUserId, Email, GiftCardCode, GiftCardId, GiftCardStatus, GiftCardTransactionId, OrderId,
    TransactionKind,
};

/// Largest balance a single gift card may carry, in dollars.
#[must_use]
pub fn max_balance() -> Decimal {
    Decimal::new(1_000_000, 2) // 10,000.00
}

/// Errors produced by the gift card ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum GiftCardError {
    /// Malformed or out-of-range input, detected before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A debit would drive the balance negative. Carries the balance the
    /// caller saw so the amount can be corrected.
    #[error("insufficient balance: current balance is {current_balance}")]
    InsufficientBalance {
        /// The card's balance at the time of the rejected debit.
        current_balance: Decimal,
    },

    /// Attempted to activate a card whose balance is zero.
    #[error("cannot activate a gift card with zero balance")]
    ZeroBalance,

    /// The card does not exist.
    #[error("gift card not found")]
    NotFound,

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The underlying store rejected the operation.
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// A gift card record.
///
/// `current_balance` is derived output: it is mutated only by ledger
/// operations and always equals the latest transaction's `balance_after`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCard {
    /// Unique card ID.
    pub id: GiftCardId,
    /// Human-facing unique code.
    pub code: GiftCardCode,
    /// Balance the card was issued with. Immutable.
    pub initial_balance: Decimal,
    /// Remaining balance. Always within `[0, initial_balance]`.
    pub current_balance: Decimal,
    /// Lifecycle status.
    pub status: GiftCardStatus,
    /// Recipient display name.
    pub recipient_name: Option<String>,
    /// Recipient email, if the card was sent to someone.
    pub recipient_email: Option<Email>,
    /// Email of the purchasing customer.
    pub purchaser_email: Option<Email>,
    /// Personal message included with the card.
    pub message: Option<String>,
    /// Optional expiration timestamp.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin who issued the card, if issued from the back office.
    pub created_by: Option<AdminUserId>,
    /// When the card was issued.
    pub created_at: DateTime<Utc>,
}

/// One append-only ledger entry, with display joins resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCardTransaction {
    /// Unique transaction ID.
    pub id: GiftCardTransactionId,
    /// Card this entry belongs to.
    pub gift_card_id: GiftCardId,
    /// Signed amount: positive for credit, negative for debit.
    pub amount: Decimal,
    /// Balance after this entry was applied. Never negative.
    pub balance_after: Decimal,
    /// What kind of event produced this entry.
    pub kind: TransactionKind,
    /// Free-form notes from the acting admin.
    pub notes: Option<String>,
    /// Referenced order, for redemptions and refunds.
    pub order_id: Option<OrderId>,
    /// Human-facing order number (joined at read time).
    pub order_number: Option<String>,
    /// Acting admin.
    pub created_by: Option<AdminUserId>,
    /// Acting admin's display name (joined at read time).
    pub created_by_name: Option<String>,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

/// A card together with its full transaction history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCardWithHistory {
    /// The card itself.
    pub card: GiftCard,
    /// Ledger entries ordered by `created_at` descending.
    pub transactions: Vec<GiftCardTransaction>,
}

/// Input for issuing a new gift card.
#[derive(Debug, Clone)]
pub struct IssueGiftCardInput {
    /// Balance to load onto the card. Must be positive.
    pub initial_balance: Decimal,
    /// Recipient display name.
    pub recipient_name: Option<String>,
    /// Recipient email for delivery.
    pub recipient_email: Option<Email>,
    /// Purchasing customer's email.
    pub purchaser_email: Option<Email>,
    /// Personal message to include.
    pub message: Option<String>,
    /// Optional expiration timestamp. Must be in the future.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a successful issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedGiftCard {
    /// The new card's ID.
    pub id: GiftCardId,
    /// The new card's code, shown once to the issuing admin.
    pub code: GiftCardCode,
}

/// Direction of a manual adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustDirection {
    /// Credit the card.
    Add,
    /// Debit the card.
    Remove,
}

impl AdjustDirection {
    /// Apply the direction's sign to a positive amount.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Add => amount,
            Self::Remove => -amount,
        }
    }
}

/// Input for a manual adjustment.
#[derive(Debug, Clone)]
pub struct AdjustmentInput {
    /// Credit or debit.
    pub direction: AdjustDirection,
    /// Positive amount to apply.
    pub amount: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Outcome of a balance-changing operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerOutcome {
    /// The card's balance after the operation.
    pub new_balance: Decimal,
    /// The card's status after the operation.
    pub status: GiftCardStatus,
}

/// Filter for listing gift cards.
#[derive(Debug, Clone, Default)]
pub struct GiftCardFilter {
    /// Only cards with this status.
    pub status: Option<GiftCardStatus>,
    /// Free-text search across code, recipient/purchaser email, and
    /// recipient name.
    pub search: Option<String>,
    /// Page size (default 50).
    pub limit: Option<i64>,
    /// Page offset.
    pub offset: Option<i64>,
}

/// Aggregate ledger summary for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCardStats {
    /// Number of active cards.
    pub active_count: i64,
    /// Outstanding balance across active cards.
    pub active_balance: Decimal,
    /// Number of depleted cards.
    pub depleted_count: i64,
    /// Number of disabled cards.
    pub disabled_count: i64,
    /// Sum of all initial balances ever issued.
    pub total_issued: Decimal,
    /// Issued minus outstanding: value already spent.
    pub total_redeemed: Decimal,
}

// =============================================================================
// Balance arithmetic
// =============================================================================

/// Validate a positive money amount (issuance balance, adjustment amount).
///
/// # Errors
///
/// Returns `GiftCardError::Validation` if the amount is not positive, is
/// more precise than cents, or exceeds [`max_balance`].
pub fn validate_amount(amount: Decimal) -> Result<(), GiftCardError> {
    if amount <= Decimal::ZERO {
        return Err(GiftCardError::Validation(
            "amount must be a positive number".to_owned(),
        ));
    }
    if amount.normalize().scale() > 2 {
        return Err(GiftCardError::Validation(
            "amount cannot be more precise than cents".to_owned(),
        ));
    }
    if amount > max_balance() {
        return Err(GiftCardError::Validation(format!(
            "amount exceeds the maximum of {}",
            max_balance()
        )));
    }
    Ok(())
}

/// Validate an issuance request before any write is attempted.
///
/// # Errors
///
/// Returns `GiftCardError::Validation` for a non-positive initial balance or
/// an expiration in the past.
pub fn validate_issue_input(
    input: &IssueGiftCardInput,
    now: DateTime<Utc>,
) -> Result<(), GiftCardError> {
    validate_amount(input.initial_balance)?;
    if let Some(expires_at) = input.expires_at
        && expires_at <= now
    {
        return Err(GiftCardError::Validation(
            "expiration date must be in the future".to_owned(),
        ));
    }
    Ok(())
}

/// Compute the balance after applying a signed delta.
///
/// # Errors
///
/// Returns `InsufficientBalance` if the result would be negative, or
/// `Validation` if a credit would lift the balance above `initial_balance`.
pub fn apply_delta(
    current_balance: Decimal,
    initial_balance: Decimal,
    delta: Decimal,
) -> Result<Decimal, GiftCardError> {
    let next = current_balance + delta;
    if next < Decimal::ZERO {
        return Err(GiftCardError::InsufficientBalance { current_balance });
    }
    if next > initial_balance {
        return Err(GiftCardError::Validation(format!(
            "credit would exceed the card's initial balance of {initial_balance}"
        )));
    }
    Ok(next)
}

/// Status a card should carry after its balance changes.
///
/// Reaching zero marks the card depleted. A credit that lifts a depleted
/// card off zero moves it to `disabled`: an admin must explicitly re-enable
/// it (see DESIGN.md).
#[must_use]
pub fn status_after_balance_change(
    current_status: GiftCardStatus,
    new_balance: Decimal,
) -> GiftCardStatus {
    if new_balance == Decimal::ZERO {
        GiftCardStatus::Depleted
    } else if current_status == GiftCardStatus::Depleted {
        GiftCardStatus::Disabled
    } else {
        current_status
    }
}

/// Check whether an explicit status change is allowed.
///
/// # Errors
///
/// Returns `Validation` if the caller asks for `depleted` (only the ledger
/// sets that), and `ZeroBalance` for any transition off a depleted card or
/// an activation at zero balance.
pub fn validate_status_change(
    current_status: GiftCardStatus,
    desired: GiftCardStatus,
    current_balance: Decimal,
) -> Result<(), GiftCardError> {
    if desired == GiftCardStatus::Depleted {
        return Err(GiftCardError::Validation(
            "depleted status is set by the ledger, not by hand".to_owned(),
        ));
    }
    if current_status == GiftCardStatus::Depleted {
        return Err(GiftCardError::ZeroBalance);
    }
    if desired == GiftCardStatus::Active && current_balance <= Decimal::ZERO {
        return Err(GiftCardError::ZeroBalance);
    }
    Ok(())
}

/// Replay a transaction log from zero and return the resulting balance.
///
/// Used by tests and reconciliation tooling to confirm the stored balance
/// matches the ledger.
pub fn replay_balance<'a, I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = &'a Decimal>,
{
    amounts.into_iter().copied().sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dollars(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_validate_amount_rejects_non_positive() {
        assert!(matches!(
            validate_amount(Decimal::ZERO),
            Err(GiftCardError::Validation(_))
        ));
        assert!(matches!(
            validate_amount(dollars(-100)),
            Err(GiftCardError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_amount_rejects_sub_cent_precision() {
        let third = Decimal::new(33_333, 4); // 3.3333
        assert!(matches!(
            validate_amount(third),
            Err(GiftCardError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_amount_rejects_over_maximum() {
        assert!(validate_amount(max_balance()).is_ok());
        assert!(matches!(
            validate_amount(max_balance() + dollars(1)),
            Err(GiftCardError::Validation(_))
        ));
    }

    #[test]
    fn test_apply_delta_debit_and_credit() {
        // issue 50.00, remove 20.00 -> 30.00
        let balance = apply_delta(dollars(5000), dollars(5000), dollars(-2000)).unwrap();
        assert_eq!(balance, dollars(3000));

        // refund 10.00 back -> 40.00
        let balance = apply_delta(balance, dollars(5000), dollars(1000)).unwrap();
        assert_eq!(balance, dollars(4000));
    }

    #[test]
    fn test_apply_delta_insufficient_balance_reports_current() {
        // remove 30.01 from a 30.00 card
        let err = apply_delta(dollars(3000), dollars(5000), dollars(-3001)).unwrap_err();
        match err {
            GiftCardError::InsufficientBalance { current_balance } => {
                assert_eq!(current_balance, dollars(3000));
            }
            other => panic!("expected InsufficientBalance, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_delta_credit_capped_at_initial_balance() {
        let err = apply_delta(dollars(4500), dollars(5000), dollars(1000)).unwrap_err();
        assert!(matches!(err, GiftCardError::Validation(_)));
    }

    #[test]
    fn test_depletion_transition() {
        // balance 10.00, remove exactly 10.00 -> depleted
        let balance = apply_delta(dollars(1000), dollars(1000), dollars(-1000)).unwrap();
        assert_eq!(balance, Decimal::ZERO);
        assert_eq!(
            status_after_balance_change(GiftCardStatus::Active, balance),
            GiftCardStatus::Depleted
        );

        // one more cent fails and changes nothing
        let err = apply_delta(balance, dollars(1000), dollars(-1)).unwrap_err();
        assert!(matches!(err, GiftCardError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_credit_lifts_depleted_to_disabled_not_active() {
        let balance = apply_delta(Decimal::ZERO, dollars(1000), dollars(500)).unwrap();
        assert_eq!(
            status_after_balance_change(GiftCardStatus::Depleted, balance),
            GiftCardStatus::Disabled
        );
    }

    #[test]
    fn test_reactivation_gate() {
        // depleted card cannot be activated
        assert!(matches!(
            validate_status_change(GiftCardStatus::Depleted, GiftCardStatus::Active, Decimal::ZERO),
            Err(GiftCardError::ZeroBalance)
        ));

        // after a credit moved it to disabled with balance 5.00, activation works
        assert!(
            validate_status_change(GiftCardStatus::Disabled, GiftCardStatus::Active, dollars(500))
                .is_ok()
        );

        // but never at zero balance
        assert!(matches!(
            validate_status_change(GiftCardStatus::Disabled, GiftCardStatus::Active, Decimal::ZERO),
            Err(GiftCardError::ZeroBalance)
        ));
    }

    #[test]
    fn test_depleted_cannot_be_requested_or_left_by_toggle() {
        assert!(matches!(
            validate_status_change(GiftCardStatus::Active, GiftCardStatus::Depleted, dollars(100)),
            Err(GiftCardError::Validation(_))
        ));
        assert!(matches!(
            validate_status_change(
                GiftCardStatus::Depleted,
                GiftCardStatus::Disabled,
                Decimal::ZERO
            ),
            Err(GiftCardError::ZeroBalance)
        ));
    }

    #[test]
    fn test_replay_matches_running_balance() {
        // purchase 50.00, remove 20.00, refund 5.00
        let amounts = [dollars(5000), dollars(-2000), dollars(500)];
        assert_eq!(replay_balance(amounts.iter()), dollars(3500));
    }

    #[test]
    fn test_issue_input_validation() {
        let input = IssueGiftCardInput {
            initial_balance: dollars(5000),
            recipient_name: None,
            recipient_email: None,
            purchaser_email: None,
            message: None,
            expires_at: Some(Utc::now() - chrono::Duration::days(1)),
        };
        assert!(matches!(
            validate_issue_input(&input, Utc::now()),
            Err(GiftCardError::Validation(_))
        ));
    }
}
