//! In-memory repository adapter.
//!
//! Backs tests, demos, and feature-less builds. DashMap's sharded locks give
//! the per-reference serialization `apply_transition` requires: `get_mut`
//! holds the shard write lock for the whole read-modify-write.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;

use orders_types::{
    DomainError, OrderRepository, PurchaseOrder, RepoError, StatusTransition, TokenAmount,
    TransitionOutcome,
};

use crate::reference::{self, MAX_REFERENCE_ATTEMPTS};

/// In-memory order store keyed by merchant reference.
#[derive(Default)]
pub struct MemoryRepo {
    orders: DashMap<String, PurchaseOrder>,
}

impl MemoryRepo {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// True if no orders are stored.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Inserts `order` under its reference, enforcing uniqueness.
    fn try_insert(&self, order: PurchaseOrder) -> Result<PurchaseOrder, RepoError> {
        match self.orders.entry(order.merchant_ref.as_str().to_string()) {
            Entry::Occupied(_) => Err(RepoError::DuplicateReference),
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
                Ok(order)
            }
        }
    }
}

#[async_trait]
impl OrderRepository for MemoryRepo {
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

        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let order = PurchaseOrder::new(reference::generate(), amount, metadata.clone());
            match self.try_insert(order) {
                Ok(order) => return Ok(order),
                Err(RepoError::DuplicateReference) => {
                    tracing::debug!("merchant reference collision, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(RepoError::ReferenceExhausted)
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PurchaseOrder>, RepoError> {
        Ok(self.orders.get(reference).map(|entry| entry.value().clone()))
    }

    async fn apply_transition(
        &self,
        reference: &str,
        transition: StatusTransition,
    ) -> Result<TransitionOutcome, RepoError> {
        // get_mut holds the shard write lock across the read-modify-write,
        // serializing concurrent deliveries for the same reference.
        match self.orders.get_mut(reference) {
            None => Ok(TransitionOutcome::NotFound),
            Some(mut entry) => {
                if transition.permits(entry.status) {
                    entry.apply(&transition).map_err(RepoError::Domain)?;
                    Ok(TransitionOutcome::Applied(entry.value().clone()))
                } else {
                    Ok(TransitionOutcome::Rejected(entry.value().clone()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders_types::OrderStatus;
    use std::sync::Arc;

    fn amount(s: &str) -> TokenAmount {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_order() {
        let repo = MemoryRepo::new();

        let order = repo
            .create_order(amount("1.5"), serde_json::json!({"memo": "Premium"}))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.amount, amount("1.5"));
        assert!(order.merchant_ref.as_str().starts_with("PO-"));

        let fetched = repo
            .find_by_reference(order.merchant_ref.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, order.id);
        assert_eq!(fetched.metadata["memo"], "Premium");
    }

    #[tokio::test]
    async fn test_find_unknown_reference() {
        let repo = MemoryRepo::new();
        let found = repo.find_by_reference("PO-AAAAAAAAAA").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let repo = MemoryRepo::new();
        let result = repo.create_order(amount("0"), Value::Null).await;
        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::InvalidAmount(_)))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_reference_rejected() {
        let repo = MemoryRepo::new();
        let order = repo
            .create_order(amount("1.5"), Value::Null)
            .await
            .unwrap();

        let collision = PurchaseOrder::new(order.merchant_ref.clone(), amount("2"), Value::Null);
        let result = repo.try_insert(collision);

        assert!(matches!(result, Err(RepoError::DuplicateReference)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_paid_transition() {
        let repo = MemoryRepo::new();
        let order = repo
            .create_order(amount("1.5"), Value::Null)
            .await
            .unwrap();

        let outcome = repo
            .apply_transition(order.merchant_ref.as_str(), StatusTransition::paid("PAY123"))
            .await
            .unwrap();

        match outcome {
            TransitionOutcome::Applied(updated) => {
                assert_eq!(updated.status, OrderStatus::Paid);
                assert_eq!(updated.provider_payment_id.as_deref(), Some("PAY123"));
            }
            other => panic!("expected Applied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_replay_rejected_without_overwrite() {
        let repo = MemoryRepo::new();
        let order = repo
            .create_order(amount("1.5"), Value::Null)
            .await
            .unwrap();
        let reference = order.merchant_ref.as_str();

        repo.apply_transition(reference, StatusTransition::paid("PAY123"))
            .await
            .unwrap();

        let outcome = repo
            .apply_transition(reference, StatusTransition::paid("PAY999"))
            .await
            .unwrap();

        match outcome {
            TransitionOutcome::Rejected(current) => {
                assert_eq!(current.status, OrderStatus::Paid);
                assert_eq!(current.provider_payment_id.as_deref(), Some("PAY123"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transition_unknown_reference() {
        let repo = MemoryRepo::new();
        let outcome = repo
            .apply_transition("PO-AAAAAAAAAA", StatusTransition::paid("PAY123"))
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::NotFound));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_creates_yield_distinct_references() {
        let repo = Arc::new(MemoryRepo::new());

        let mut handles = Vec::new();
        for _ in 0..50 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create_order(amount("1.5"), Value::Null).await.unwrap()
            }));
        }

        let mut references = std::collections::HashSet::new();
        for handle in handles {
            let order = handle.await.unwrap();
            references.insert(order.merchant_ref.into_string());
        }
        assert_eq!(references.len(), 50);
        assert_eq!(repo.len(), 50);
    }

    #[tokio::test]
    async fn test_concurrent_paid_transitions_apply_once() {
        let repo = Arc::new(MemoryRepo::new());
        let order = repo
            .create_order(amount("1.5"), Value::Null)
            .await
            .unwrap();
        let reference = order.merchant_ref.as_str().to_string();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = repo.clone();
            let reference = reference.clone();
            handles.push(tokio::spawn(async move {
                repo.apply_transition(&reference, StatusTransition::paid("PAY123"))
                    .await
                    .unwrap()
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), TransitionOutcome::Applied(_)) {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);

        let final_state = repo.find_by_reference(&reference).await.unwrap().unwrap();
        assert_eq!(final_state.status, OrderStatus::Paid);
        assert_eq!(final_state.provider_payment_id.as_deref(), Some("PAY123"));
    }
}
