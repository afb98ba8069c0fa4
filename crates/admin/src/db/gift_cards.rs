//! Database operations for the gift card ledger.
//!
//! Every balance change happens inside one database transaction that first
//! pins the card row with `SELECT ... FOR UPDATE`, re-validates the change
//! under the lock, then writes the new balance and the ledger entry
//! together. Concurrent operations on the same card serialize on the row
//! lock, so the stale-read/lost-update race of a client-side
//! read-compute-write cycle cannot occur. The migration's CHECK constraints
//! reject any write that would still violate the balance invariants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use atl_urban_farms_core::{
    AdminUserId, Email, GiftCardCode, GiftCardId, GiftCardStatus, GiftCardTransactionId, OrderId,
    TransactionKind,
};

use crate::models::gift_card::{
    AdjustmentInput, GiftCard, GiftCardError, GiftCardFilter, GiftCardStats, GiftCardTransaction,
    GiftCardWithHistory, IssueGiftCardInput, IssuedGiftCard, LedgerOutcome, apply_delta,
    status_after_balance_change, validate_amount, validate_issue_input, validate_status_change,
};

/// How many fresh codes issuance will try before giving up on a string of
/// unique-constraint collisions.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Whether a failed insert hit the unique index on the card code, meaning the
/// generated code already exists and issuance should retry with a fresh one.
fn is_code_collision(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.constraint() == Some("idx_gift_cards_code"))
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for gift card queries.
#[derive(Debug, sqlx::FromRow)]
struct GiftCardRow {
    id: i32,
    code: String,
    initial_balance: Decimal,
    current_balance: Decimal,
    status: String,
    recipient_name: Option<String>,
    recipient_email: Option<String>,
    purchaser_email: Option<String>,
    message: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<GiftCardRow> for GiftCard {
    type Error = GiftCardError;

    fn try_from(row: GiftCardRow) -> Result<Self, Self::Error> {
        let code = GiftCardCode::parse(&row.code).map_err(|e| {
            GiftCardError::DataCorruption(format!("invalid gift card code in database: {e}"))
        })?;
        let status = row.status.parse::<GiftCardStatus>().map_err(|e| {
            GiftCardError::DataCorruption(format!("invalid status in database: {e}"))
        })?;
        let recipient_email = parse_optional_email(row.recipient_email)?;
        let purchaser_email = parse_optional_email(row.purchaser_email)?;

        Ok(Self {
            id: GiftCardId::new(row.id),
            code,
            initial_balance: row.initial_balance,
            current_balance: row.current_balance,
            status,
            recipient_name: row.recipient_name,
            recipient_email,
            purchaser_email,
            message: row.message,
            expires_at: row.expires_at,
            created_by: row.created_by.map(AdminUserId::new),
            created_at: row.created_at,
        })
    }
}

fn parse_optional_email(value: Option<String>) -> Result<Option<Email>, GiftCardError> {
    value
        .map(|s| {
            Email::parse(&s).map_err(|e| {
                GiftCardError::DataCorruption(format!("invalid email in database: {e}"))
            })
        })
        .transpose()
}

/// Internal row type for ledger entries with display joins.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i32,
    gift_card_id: i32,
    amount: Decimal,
    balance_after: Decimal,
    kind: String,
    notes: Option<String>,
    order_id: Option<i32>,
    order_number: Option<String>,
    created_by: Option<i32>,
    created_by_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for GiftCardTransaction {
    type Error = GiftCardError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "purchase" => TransactionKind::Purchase,
            "redemption" => TransactionKind::Redemption,
            "refund" => TransactionKind::Refund,
            "adjustment" => TransactionKind::Adjustment,
            other => {
                return Err(GiftCardError::DataCorruption(format!(
                    "invalid transaction kind in database: {other}"
                )));
            }
        };

        Ok(Self {
            id: GiftCardTransactionId::new(row.id),
            gift_card_id: GiftCardId::new(row.gift_card_id),
            amount: row.amount,
            balance_after: row.balance_after,
            kind,
            notes: row.notes,
            order_id: row.order_id.map(OrderId::new),
            order_number: row.order_number,
            created_by: row.created_by.map(AdminUserId::new),
            created_by_name: row.created_by_name,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for the locked balance read inside a ledger transaction.
#[derive(Debug, sqlx::FromRow)]
struct LockedBalanceRow {
    current_balance: Decimal,
    initial_balance: Decimal,
    status: String,
}

impl LockedBalanceRow {
    fn status(&self) -> Result<GiftCardStatus, GiftCardError> {
        self.status.parse::<GiftCardStatus>().map_err(|e| {
            GiftCardError::DataCorruption(format!("invalid status in database: {e}"))
        })
    }
}

/// Internal row type for the guarded balance update's RETURNING clause.
#[derive(Debug, sqlx::FromRow)]
struct LedgerUpdateRow {
    current_balance: Decimal,
    status: String,
}

/// Internal row type for the stats aggregate.
#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    active_count: i64,
    active_balance: Decimal,
    depleted_count: i64,
    disabled_count: i64,
    total_issued: Decimal,
    total_redeemed: Decimal,
}

const GIFT_CARD_COLUMNS: &str = r"
    id, code, initial_balance, current_balance, status::text AS status,
    recipient_name, recipient_email, purchaser_email, message,
    expires_at, created_by, created_at
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for gift card ledger operations.
pub struct GiftCardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GiftCardRepository<'a> {
    /// Create a new gift card repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Issuance
    // =========================================================================

    /// Issue a new gift card.
    ///
    /// Creates the card and its initial `purchase` ledger entry in one
    /// database transaction. On a code collision (unique index violation)
    /// the whole attempt is retried with a freshly generated code.
    ///
    /// # Errors
    ///
    /// Returns `GiftCardError::Validation` for a non-positive balance or a
    /// past expiration date (nothing is written), or
    /// `GiftCardError::Persistence` if the store rejects the writes.
    pub async fn issue(
        &self,
        input: &IssueGiftCardInput,
        created_by: Option<AdminUserId>,
    ) -> Result<IssuedGiftCard, GiftCardError> {
        validate_issue_input(input, Utc::now())?;

        let mut last_err = None;
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = GiftCardCode::generate(&mut rand::rng());
            let mut tx = self.pool.begin().await?;

            let inserted = sqlx::query_scalar::<_, i32>(
                r"
                INSERT INTO admin.gift_cards (
                    code, initial_balance, current_balance, status,
                    recipient_name, recipient_email, purchaser_email,
                    message, expires_at, created_by
                )
                VALUES ($1, $2, $2, 'active', $3, $4, $5, $6, $7, $8)
                RETURNING id
                ",
            )
            .bind(&code)
            .bind(input.initial_balance)
            .bind(&input.recipient_name)
            .bind(&input.recipient_email)
            .bind(&input.purchaser_email)
            .bind(&input.message)
            .bind(input.expires_at)
            .bind(created_by.map(|id| id.as_i32()))
            .fetch_one(&mut *tx)
            .await;

            let id = match inserted {
                Ok(id) => id,
                Err(e) if is_code_collision(&e) => {
                    tracing::warn!(code = %code, "gift card code collision, regenerating");
                    last_err = Some(e);
                    continue;
                }
                Err(e) => return Err(GiftCardError::Persistence(e)),
            };

            self.insert_transaction(
                &mut tx,
                GiftCardId::new(id),
                input.initial_balance,
                input.initial_balance,
                TransactionKind::Purchase,
                None,
                None,
                created_by,
            )
            .await?;

            tx.commit().await?;

            return Ok(IssuedGiftCard {
                id: GiftCardId::new(id),
                code,
            });
        }

        Err(last_err.map_or(
            GiftCardError::Persistence(sqlx::Error::RowNotFound),
            GiftCardError::Persistence,
        ))
    }

    // =========================================================================
    // Balance mutations
    // =========================================================================

    /// Apply a manual admin adjustment (credit or debit).
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive amount or a credit past the
    /// initial balance, `InsufficientBalance` for an over-debit, `NotFound`
    /// for an unknown card, and `Persistence` for store failures. Failed
    /// operations write nothing.
    pub async fn adjust(
        &self,
        id: GiftCardId,
        input: &AdjustmentInput,
        created_by: Option<AdminUserId>,
    ) -> Result<LedgerOutcome, GiftCardError> {
        validate_amount(input.amount)?;
        self.apply_ledger_entry(
            id,
            input.direction.signed(input.amount),
            TransactionKind::Adjustment,
            input.notes.as_deref(),
            None,
            created_by,
        )
        .await
    }

    /// Debit a card for an order at checkout.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::adjust`].
    pub async fn redeem(
        &self,
        id: GiftCardId,
        amount: Decimal,
        order_id: OrderId,
        created_by: Option<AdminUserId>,
    ) -> Result<LedgerOutcome, GiftCardError> {
        validate_amount(amount)?;
        self.apply_ledger_entry(
            id,
            -amount,
            TransactionKind::Redemption,
            None,
            Some(order_id),
            created_by,
        )
        .await
    }

    /// Credit a card back for a refunded order.
    ///
    /// The refund may not lift the balance above the card's initial balance.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::adjust`].
    pub async fn refund(
        &self,
        id: GiftCardId,
        amount: Decimal,
        order_id: OrderId,
        created_by: Option<AdminUserId>,
    ) -> Result<LedgerOutcome, GiftCardError> {
        validate_amount(amount)?;
        self.apply_ledger_entry(
            id,
            amount,
            TransactionKind::Refund,
            None,
            Some(order_id),
            created_by,
        )
        .await
    }

    /// Apply one signed ledger entry to a card.
    ///
    /// Locks the card row, validates the delta against the balance
    /// invariants under the lock, then writes the updated balance/status and
    /// the ledger entry in the same transaction.
    #[allow(clippy::too_many_arguments)]
    async fn apply_ledger_entry(
        &self,
        id: GiftCardId,
        delta: Decimal,
        kind: TransactionKind,
        notes: Option<&str>,
        order_id: Option<OrderId>,
        created_by: Option<AdminUserId>,
    ) -> Result<LedgerOutcome, GiftCardError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, LockedBalanceRow>(
            r"
            SELECT current_balance, initial_balance, status::text AS status
            FROM admin.gift_cards
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GiftCardError::NotFound)?;

        // Precise rejection under the lock; nothing has been written yet.
        let current_status = row.status()?;
        let expected_balance = apply_delta(row.current_balance, row.initial_balance, delta)?;
        let expected_status = status_after_balance_change(current_status, expected_balance);

        // Guarded write: the balance arithmetic and status transition also
        // live in the UPDATE itself, with RETURNING as the authoritative
        // values for the ledger row.
        let updated = sqlx::query_as::<_, LedgerUpdateRow>(
            r"
            UPDATE admin.gift_cards
            SET current_balance = current_balance + $2,
                status = CASE
                    WHEN current_balance + $2 = 0
                        THEN 'depleted'::admin.gift_card_status
                    WHEN status = 'depleted'
                        THEN 'disabled'::admin.gift_card_status
                    ELSE status
                END
            WHERE id = $1
              AND current_balance + $2 BETWEEN 0 AND initial_balance
            RETURNING current_balance, status::text AS status
            ",
        )
        .bind(id.as_i32())
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            GiftCardError::DataCorruption(
                "balance update guard rejected a delta validated under the row lock".to_owned(),
            )
        })?;

        let new_balance = updated.current_balance;
        let new_status = updated.status.parse::<GiftCardStatus>().map_err(|e| {
            GiftCardError::DataCorruption(format!("invalid status in database: {e}"))
        })?;
        debug_assert_eq!(new_balance, expected_balance);
        debug_assert_eq!(new_status, expected_status);

        self.insert_transaction(
            &mut tx,
            id,
            delta,
            new_balance,
            kind,
            notes,
            order_id,
            created_by,
        )
        .await?;

        tx.commit().await?;

        Ok(LedgerOutcome {
            new_balance,
            status: new_status,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_transaction(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        gift_card_id: GiftCardId,
        amount: Decimal,
        balance_after: Decimal,
        kind: TransactionKind,
        notes: Option<&str>,
        order_id: Option<OrderId>,
        created_by: Option<AdminUserId>,
    ) -> Result<(), GiftCardError> {
        sqlx::query(
            r"
            INSERT INTO admin.gift_card_transactions (
                gift_card_id, amount, balance_after, kind,
                notes, order_id, created_by
            )
            VALUES ($1, $2, $3, $4::admin.gift_card_transaction_kind, $5, $6, $7)
            ",
        )
        .bind(gift_card_id.as_i32())
        .bind(amount)
        .bind(balance_after)
        .bind(kind.to_string())
        .bind(notes)
        .bind(order_id.map(|id| id.as_i32()))
        .bind(created_by.map(|id| id.as_i32()))
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Status toggle
    // =========================================================================

    /// Change a card's status to `active` or `disabled`.
    ///
    /// Records no ledger entry: pure status changes are not balance events.
    ///
    /// # Errors
    ///
    /// Returns `ZeroBalance` for any transition off a depleted card or an
    /// activation at zero balance, `Validation` if `depleted` is requested
    /// directly, and `NotFound` for an unknown card.
    pub async fn set_status(
        &self,
        id: GiftCardId,
        desired: GiftCardStatus,
    ) -> Result<GiftCardStatus, GiftCardError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, LockedBalanceRow>(
            r"
            SELECT current_balance, initial_balance, status::text AS status
            FROM admin.gift_cards
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GiftCardError::NotFound)?;

        validate_status_change(row.status()?, desired, row.current_balance)?;

        sqlx::query(
            r"
            UPDATE admin.gift_cards
            SET status = $2::admin.gift_card_status
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(desired.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(desired)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a gift card by ID.
    ///
    /// # Errors
    ///
    /// Returns `GiftCardError::Persistence` if the query fails.
    pub async fn get(&self, id: GiftCardId) -> Result<Option<GiftCard>, GiftCardError> {
        let row = sqlx::query_as::<_, GiftCardRow>(&format!(
            "SELECT {GIFT_CARD_COLUMNS} FROM admin.gift_cards WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Look a gift card up by its code (redemption at checkout).
    ///
    /// # Errors
    ///
    /// Returns `GiftCardError::Persistence` if the query fails.
    pub async fn find_by_code(
        &self,
        code: &GiftCardCode,
    ) -> Result<Option<GiftCard>, GiftCardError> {
        let row = sqlx::query_as::<_, GiftCardRow>(&format!(
            "SELECT {GIFT_CARD_COLUMNS} FROM admin.gift_cards WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a card with its full transaction history, newest entries first,
    /// joined with referenced order numbers and actor display names.
    ///
    /// # Errors
    ///
    /// Returns `GiftCardError::NotFound` if the card doesn't exist.
    pub async fn get_with_history(
        &self,
        id: GiftCardId,
    ) -> Result<GiftCardWithHistory, GiftCardError> {
        let card = self.get(id).await?.ok_or(GiftCardError::NotFound)?;

        let rows = sqlx::query_as::<_, TransactionRow>(
            r"
            SELECT
                t.id, t.gift_card_id, t.amount, t.balance_after,
                t.kind::text AS kind, t.notes,
                t.order_id, o.order_number,
                t.created_by, u.name AS created_by_name,
                t.created_at
            FROM admin.gift_card_transactions t
            LEFT JOIN admin.orders o ON o.id = t.order_id
            LEFT JOIN admin.admin_users u ON u.id = t.created_by
            WHERE t.gift_card_id = $1
            ORDER BY t.created_at DESC, t.id DESC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let transactions = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GiftCardWithHistory { card, transactions })
    }

    /// List gift cards with filtering and pagination.
    ///
    /// # Errors
    ///
    /// Returns `GiftCardError::Persistence` if the query fails.
    pub async fn list(&self, filter: &GiftCardFilter) -> Result<Vec<GiftCard>, GiftCardError> {
        let limit = filter.limit.unwrap_or(50);
        let offset = filter.offset.unwrap_or(0);

        let rows = sqlx::query_as::<_, GiftCardRow>(&format!(
            r"
            SELECT {GIFT_CARD_COLUMNS}
            FROM admin.gift_cards
            WHERE ($1::text IS NULL OR status = $1::admin.gift_card_status)
              AND ($2::text IS NULL
                   OR code ILIKE '%' || $2 || '%'
                   OR recipient_email ILIKE '%' || $2 || '%'
                   OR purchaser_email ILIKE '%' || $2 || '%'
                   OR recipient_name ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(filter.status.map(|s| s.to_string()))
        .bind(&filter.search)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Aggregate ledger summary across all cards.
    ///
    /// # Errors
    ///
    /// Returns `GiftCardError::Persistence` if the query fails.
    pub async fn stats(&self) -> Result<GiftCardStats, GiftCardError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT
                COUNT(*) FILTER (WHERE status = 'active') AS active_count,
                COALESCE(SUM(current_balance) FILTER (WHERE status = 'active'), 0)
                    AS active_balance,
                COUNT(*) FILTER (WHERE status = 'depleted') AS depleted_count,
                COUNT(*) FILTER (WHERE status = 'disabled') AS disabled_count,
                COALESCE(SUM(initial_balance), 0) AS total_issued,
                COALESCE(SUM(initial_balance) - SUM(current_balance), 0) AS total_redeemed
            FROM admin.gift_cards
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(GiftCardStats {
            active_count: row.active_count,
            active_balance: row.active_balance,
            depleted_count: row.depleted_count,
            disabled_count: row.disabled_count,
            total_issued: row.total_issued,
            total_redeemed: row.total_redeemed,
        })
    }
}
