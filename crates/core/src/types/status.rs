//! Status enums for gift cards and admin users.

use serde::{Deserialize, Serialize};

/// Gift card lifecycle status.
///
/// Cards are never deleted; status is the only lifecycle. `Depleted` is set
/// by the ledger itself when a debit drives the balance to zero, and always
/// implies a zero balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.gift_card_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum GiftCardStatus {
    /// Redeemable at checkout.
    Active,
    /// Temporarily blocked by an admin, or waiting for re-enable after a
    /// credit lifted it off zero.
    Disabled,
    /// Balance reached zero. Cannot be toggled back to active until a credit
    /// restores balance.
    Depleted,
}

impl std::fmt::Display for GiftCardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Disabled => write!(f, "disabled"),
            Self::Depleted => write!(f, "depleted"),
        }
    }
}

impl std::str::FromStr for GiftCardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "disabled" => Ok(Self::Disabled),
            "depleted" => Ok(Self::Depleted),
            _ => Err(format!("invalid gift card status: {s}")),
        }
    }
}

/// The kind of a gift card ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(
        type_name = "admin.gift_card_transaction_kind",
        rename_all = "snake_case"
    )
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Initial load when the card is issued.
    Purchase,
    /// Debit applied at checkout against an order.
    Redemption,
    /// Credit returned to the card for a refunded order.
    Refund,
    /// Manual admin credit or debit.
    Adjustment,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Purchase => write!(f, "purchase"),
            Self::Redemption => write!(f, "redemption"),
            Self::Refund => write!(f, "refund"),
            Self::Adjustment => write!(f, "adjustment"),
        }
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access to all admin features including user management.
    SuperAdmin,
    /// Full access to store management features.
    Admin,
    /// Read-only access to store data.
    Viewer,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_from_str_roundtrip() {
        for status in [
            GiftCardStatus::Active,
            GiftCardStatus::Disabled,
            GiftCardStatus::Depleted,
        ] {
            let parsed: GiftCardStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_from_str_rejects_unknown() {
        assert!("expired".parse::<GiftCardStatus>().is_err());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&GiftCardStatus::Depleted).unwrap();
        assert_eq!(json, "\"depleted\"");
    }

    #[test]
    fn test_transaction_kind_serde_snake_case() {
        let json = serde_json::to_string(&TransactionKind::Redemption).unwrap();
        assert_eq!(json, "\"redemption\"");

        let parsed: TransactionKind = serde_json::from_str("\"purchase\"").unwrap();
        assert_eq!(parsed, TransactionKind::Purchase);
    }

    #[test]
    fn test_admin_role_roundtrip() {
        let role: AdminRole = "super_admin".parse().unwrap();
        assert_eq!(role, AdminRole::SuperAdmin);
        assert_eq!(role.to_string(), "super_admin");
    }
}
