//! Admin user domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atl_urban_farms_core::{AdminRole, AdminUserId, Email};

/// An admin user of the back office.
///
/// Identity management itself (login, sessions) lives in an external
/// service; these records exist for actor attribution on ledger entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Login email.
    pub email: Email,
    /// Display name, joined into transaction history.
    pub name: String,
    /// Permission level.
    pub role: AdminRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The admin acting on the current request, resolved by the auth extractor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// The acting admin's ID, recorded as `created_by` on ledger entries.
    pub id: AdminUserId,
}
