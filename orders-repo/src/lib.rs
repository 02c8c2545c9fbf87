//! # Orders Repository
//!
//! Concrete repository implementations (adapters) for the purchase-order
//! gateway, plus the merchant-reference generator and the webhook signature
//! utilities shared by the other crates.

use async_trait::async_trait;
use serde_json::Value;

use orders_types::{
    OrderRepository, PurchaseOrder, RepoError, StatusTransition, TokenAmount, TransitionOutcome,
};

pub mod memory;
pub mod reference;
pub mod security;

#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
mod types;


/// Unified repository wrapper.
///
/// With the `sqlite` feature the wrapper is backed by [`sqlite::SqliteRepo`];
/// without it, by the in-memory adapter.
pub struct Repo {
    #[cfg(feature = "sqlite")]
    inner: sqlite::SqliteRepo,
    #[cfg(not(feature = "sqlite"))]
    inner: memory::MemoryRepo,
}

/// Build and initialize a repository from a database URL.
///
/// With the `sqlite` feature this connects and runs migrations; without it
/// the URL is ignored and a fresh in-memory store is returned.
///
/// # Examples
///
/// ```ignore
/// let repo = build_repo("sqlite://orders.db?mode=rwc").await?;
/// ```
pub async fn build_repo(database_url: &str) -> anyhow::Result<Repo> {
    Repo::new(database_url).await
}

impl Repo {
    #[cfg(feature = "sqlite")]
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let inner = sqlite::SqliteRepo::new(database_url).await?;
        Ok(Self { inner })
    }

    #[cfg(not(feature = "sqlite"))]
    pub async fn new(_database_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            inner: memory::MemoryRepo::new(),
        })
    }
}

// Re-export individual repos for direct use if needed
pub use memory::MemoryRepo;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepo;

// ─────────────────────────────────────────────────────────────────────────────
// Implement OrderRepository for Repo (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl OrderRepository for Repo {
    async fn create_order(
        &self,
        amount: TokenAmount,
        metadata: Value,
    ) -> Result<PurchaseOrder, RepoError> {
        self.inner.create_order(amount, metadata).await
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PurchaseOrder>, RepoError> {
        self.inner.find_by_reference(reference).await
    }

    async fn apply_transition(
        &self,
        reference: &str,
        transition: StatusTransition,
    ) -> Result<TransitionOutcome, RepoError> {
        self.inner.apply_transition(reference, transition).await
    }
}
