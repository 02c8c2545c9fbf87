//! SQLite repository adapter.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use orders_types::{
    DomainError, OrderRepository, OrderStatus, PurchaseOrder, RepoError, StatusTransition,
    TokenAmount, TransitionOutcome,
};

use crate::reference::{self, MAX_REFERENCE_ATTEMPTS};
use crate::types::DbOrder;

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // A pooled :memory: database is one database per connection; keep a
        // single connection so every handle sees the same store.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        let ddl = include_str!("../migrations/0001_create_purchase_orders.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl OrderRepository for SqliteRepo {
    async fn create_order(
        &self,
        amount: TokenAmount,
        metadata: Value,
    ) -> Result<PurchaseOrder, RepoError> {
        if amount.is_zero() {
            return Err(RepoError::Domain(DomainError::InvalidAmount(
                "amount must be positive".into(),
            )));
        }

        let metadata_json = metadata.to_string();

        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let order = PurchaseOrder::new(reference::generate(), amount, metadata.clone());

            let result = sqlx::query(
                r#"INSERT INTO purchase_orders
                       (id, merchant_ref, status, amount, metadata, provider_payment_id, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(order.id.to_string())
            .bind(order.merchant_ref.as_str())
            .bind(order.status.as_ref())
            .bind(order.amount.to_string())
            .bind(&metadata_json)
            .bind(&order.provider_payment_id)
            .bind(order.created_at.to_rfc3339())
            .bind(order.updated_at.to_rfc3339())
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => return Ok(order),
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    tracing::debug!(reference = %order.merchant_ref, "merchant reference collision, retrying");
                    continue;
                }
                Err(e) => return Err(RepoError::Database(e.to_string())),
            }
        }

        Err(RepoError::ReferenceExhausted)
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PurchaseOrder>, RepoError> {
        let row: Option<DbOrder> = sqlx::query_as(
            r#"SELECT id, merchant_ref, status, amount, metadata, provider_payment_id, created_at, updated_at
               FROM purchase_orders WHERE merchant_ref = ?"#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbOrder::into_domain).transpose()
    }

    async fn apply_transition(
        &self,
        reference: &str,
        transition: StatusTransition,
    ) -> Result<TransitionOutcome, RepoError> {
        // The conditional UPDATE is the compare-and-swap: only a row whose
        // current status permits the transition is touched, and COALESCE
        // keeps the first provider payment id ever written.
        let target = transition.to();
        let statuses = OrderStatus::ALL;
        let allowed: Vec<&str> = statuses
            .iter()
            .filter(|s| s.can_transition_to(target))
            .map(|s| s.as_ref())
            .collect();
        let placeholders = vec!["?"; allowed.len()].join(", ");
        let sql = format!(
            "UPDATE purchase_orders
             SET status = ?, provider_payment_id = COALESCE(provider_payment_id, ?), updated_at = ?
             WHERE merchant_ref = ? AND status IN ({placeholders})"
        );

        loop {
            let mut query = sqlx::query(&sql)
                .bind(target.as_ref())
                .bind(transition.provider_payment_id())
                .bind(chrono::Utc::now().to_rfc3339())
                .bind(reference);
            for status in &allowed {
                query = query.bind(*status);
            }

            let updated = query
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?
                .rows_affected();

            // Status only moves forward, so the follow-up read classifies a
            // zero-row update without racing the swap above.
            match self.find_by_reference(reference).await? {
                None => return Ok(TransitionOutcome::NotFound),
                Some(order) if updated > 0 => return Ok(TransitionOutcome::Applied(order)),
                Some(order) if !transition.permits(order.status) => {
                    return Ok(TransitionOutcome::Rejected(order));
                }
                // The row appeared (or moved to another payable status)
                // between the swap and the read; the DAG is finite, so
                // retrying terminates.
                Some(_) => continue,
            }
        }
    }
}
