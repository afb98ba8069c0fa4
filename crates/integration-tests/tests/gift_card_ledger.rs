//! Integration tests for the gift card ledger rules.
//!
//! These walk multi-step card lifecycles through the same pure functions the
//! repository re-validates under its row lock, so the scenarios here hold
//! for the persisted ledger too.

use rust_decimal::Decimal;

use atl_urban_farms_admin::models::gift_card::{
    GiftCardError, apply_delta, replay_balance, status_after_balance_change, validate_amount,
    validate_issue_input, validate_status_change,
};
use atl_urban_farms_core::GiftCardStatus;
use atl_urban_farms_integration_tests::{dollars, issue_input};

/// A card's running balance, driven like the repository drives the real one.
struct Card {
    initial: Decimal,
    balance: Decimal,
    status: GiftCardStatus,
    ledger: Vec<Decimal>,
}

impl Card {
    fn issue(initial: Decimal) -> Self {
        Self {
            initial,
            balance: initial,
            status: GiftCardStatus::Active,
            ledger: vec![initial],
        }
    }

    fn apply(&mut self, delta: Decimal) -> Result<(), GiftCardError> {
        let next = apply_delta(self.balance, self.initial, delta)?;
        self.status = status_after_balance_change(self.status, next);
        self.balance = next;
        self.ledger.push(delta);
        Ok(())
    }
}

// =============================================================================
// Concrete Scenario
// =============================================================================

/// Issue $50.00, remove $20.00 (balance $30.00), then attempt to remove
/// $30.01: the last step fails, the balance stays $30.00, and the error
/// carries the current balance.
#[test]
fn test_fifty_minus_twenty_then_overdraw() {
    let mut card = Card::issue(dollars(5000));

    card.apply(dollars(-2000)).expect("remove 20.00");
    assert_eq!(card.balance, dollars(3000));
    assert_eq!(card.status, GiftCardStatus::Active);

    let err = card.apply(dollars(-3001)).expect_err("overdraw must fail");
    match err {
        GiftCardError::InsufficientBalance { current_balance } => {
            assert_eq!(current_balance, dollars(3000));
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }

    // Nothing changed
    assert_eq!(card.balance, dollars(3000));
    assert_eq!(card.ledger.len(), 2);
}

// =============================================================================
// Replay Invariant
// =============================================================================

/// Replaying the transaction log from zero reproduces the stored balance
/// after any sequence of successful operations.
#[test]
fn test_replay_reproduces_balance() {
    let mut card = Card::issue(dollars(10_000));

    card.apply(dollars(-2500)).expect("redeem 25.00");
    card.apply(dollars(-4000)).expect("redeem 40.00");
    card.apply(dollars(1500)).expect("refund 15.00");
    card.apply(dollars(-5000)).expect("redeem 50.00");

    assert_eq!(replay_balance(card.ledger.iter()), card.balance);
    assert_eq!(card.balance, Decimal::ZERO);
}

/// Failed operations leave no ledger entry, so replay still matches.
#[test]
fn test_replay_unaffected_by_rejected_operations() {
    let mut card = Card::issue(dollars(5000));

    card.apply(dollars(-5000)).expect("drain the card");
    assert!(card.apply(dollars(-1)).is_err());
    assert!(card.apply(dollars(10_000)).is_err());

    assert_eq!(replay_balance(card.ledger.iter()), card.balance);
}

// =============================================================================
// Depletion and Reactivation
// =============================================================================

/// Reaching exactly zero flips the card to depleted; a card that stops short
/// of zero stays active.
#[test]
fn test_depletion_happens_exactly_at_zero() {
    let mut card = Card::issue(dollars(1000));
    card.apply(dollars(-999)).expect("leave one cent");
    assert_eq!(card.status, GiftCardStatus::Active);

    card.apply(dollars(-1)).expect("spend the last cent");
    assert_eq!(card.status, GiftCardStatus::Depleted);
    assert_eq!(card.balance, Decimal::ZERO);
}

/// The full reactivation path: deplete, refund (card parks at disabled),
/// then explicitly re-enable.
#[test]
fn test_reactivation_requires_credit_then_enable() {
    let mut card = Card::issue(dollars(2000));
    card.apply(dollars(-2000)).expect("deplete");

    // Depleted cards cannot be toggled at all
    assert!(matches!(
        validate_status_change(card.status, GiftCardStatus::Active, card.balance),
        Err(GiftCardError::ZeroBalance)
    ));

    // A refund lifts it off zero into disabled, not straight back to active
    card.apply(dollars(500)).expect("refund 5.00");
    assert_eq!(card.status, GiftCardStatus::Disabled);

    // Now the explicit enable is allowed
    validate_status_change(card.status, GiftCardStatus::Active, card.balance)
        .expect("enable after refund");
}

/// Activation is gated on a positive balance even for plain disabled cards.
#[test]
fn test_activation_gate_on_zero_balance() {
    assert!(matches!(
        validate_status_change(GiftCardStatus::Disabled, GiftCardStatus::Active, Decimal::ZERO),
        Err(GiftCardError::ZeroBalance)
    ));
}

// =============================================================================
// Validation Edges
// =============================================================================

#[test]
fn test_credit_cannot_exceed_initial_balance() {
    let mut card = Card::issue(dollars(5000));
    card.apply(dollars(-1000)).expect("redeem 10.00");

    // Refunding more than was spent is rejected
    assert!(matches!(
        card.apply(dollars(1001)),
        Err(GiftCardError::Validation(_))
    ));

    // Refunding exactly what was spent restores the full balance
    card.apply(dollars(1000)).expect("refund 10.00");
    assert_eq!(card.balance, dollars(5000));
}

#[test]
fn test_amount_validation_rejects_bad_inputs() {
    assert!(validate_amount(dollars(1)).is_ok());
    assert!(validate_amount(Decimal::ZERO).is_err());
    assert!(validate_amount(dollars(-500)).is_err());
    // Sub-cent precision
    assert!(validate_amount(Decimal::new(12_345, 3)).is_err());
}

#[test]
fn test_issue_validation() {
    use chrono::{Duration, Utc};

    let now = Utc::now();

    assert!(validate_issue_input(&issue_input(dollars(5000)), now).is_ok());
    assert!(validate_issue_input(&issue_input(Decimal::ZERO), now).is_err());

    let mut expired = issue_input(dollars(5000));
    expired.expires_at = Some(now - Duration::hours(1));
    assert!(validate_issue_input(&expired, now).is_err());

    let mut future = issue_input(dollars(5000));
    future.expires_at = Some(now + Duration::days(365));
    assert!(validate_issue_input(&future, now).is_ok());
}
