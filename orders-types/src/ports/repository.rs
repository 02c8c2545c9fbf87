//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (SQLite, InMemory) will implement this trait.

use serde_json::Value;

use crate::domain::{PurchaseOrder, StatusTransition, TokenAmount, TransitionOutcome};
use crate::error::RepoError;

/// The keyed order store behind the gateway.
///
/// `apply_transition` is the operation that MUST be concurrency-safe:
/// implementations serialize the read-modify-write per merchant reference,
/// so two concurrent webhook deliveries for the same order cannot both
/// observe a payable status and both apply the `paid` mutation.
#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Persists a new order in the `created` state under a freshly minted
    /// merchant reference.
    ///
    /// Reference collisions are retried with a fresh reference a bounded
    /// number of times; exhaustion surfaces as
    /// [`RepoError::ReferenceExhausted`].
    async fn create_order(
        &self,
        amount: TokenAmount,
        metadata: Value,
    ) -> Result<PurchaseOrder, RepoError>;

    /// Looks an order up by its merchant reference.
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PurchaseOrder>, RepoError>;

    /// Atomically applies `transition` iff the order's current status
    /// permits it, returning the outcome with the resulting (or, on
    /// rejection, current) record.
    async fn apply_transition(
        &self,
        reference: &str,
        transition: StatusTransition,
    ) -> Result<TransitionOutcome, RepoError>;
}
