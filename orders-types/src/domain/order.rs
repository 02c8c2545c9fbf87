//! Purchase-order domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::amount::TokenAmount;
use crate::error::DomainError;

/// Unique identifier for a PurchaseOrder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random OrderId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an OrderId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Prefix carried by every merchant reference.
pub const MERCHANT_REF_PREFIX: &str = "PO-";
/// Length of the random suffix after the prefix.
pub const MERCHANT_REF_RANDOM_LEN: usize = 10;

/// Externally-visible reference correlating a provider payment to a locally
/// created order. Format: `PO-` followed by 10 uppercase alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct MerchantRef(String);

impl MerchantRef {
    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the reference, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for MerchantRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MerchantRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MerchantRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = s
            .strip_prefix(MERCHANT_REF_PREFIX)
            .ok_or_else(|| DomainError::InvalidReference(s.to_string()))?;
        let valid = suffix.len() == MERCHANT_REF_RANDOM_LEN
            && suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !valid {
            return Err(DomainError::InvalidReference(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

/// Lifecycle status of a purchase order.
///
/// Transitions form a DAG: `created -> pending_payment -> paid -> settled`,
/// with `cancelled` reachable from any pre-`paid` state. There is no way
/// back: once `paid`, an order never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Created,
    PendingPayment,
    Paid,
    Settled,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Created,
        OrderStatus::PendingPayment,
        OrderStatus::Paid,
        OrderStatus::Settled,
        OrderStatus::Cancelled,
    ];

    /// Forward edges of the status DAG.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Created, PendingPayment)
                | (Created, Paid)
                | (Created, Cancelled)
                | (PendingPayment, Paid)
                | (PendingPayment, Cancelled)
                | (Paid, Settled)
        )
    }

    /// True while a `payment.completed` event may still move the order to `paid`.
    pub fn is_payable(self) -> bool {
        matches!(self, OrderStatus::Created | OrderStatus::PendingPayment)
    }

    /// True once the order has reached `paid` or a later state.
    pub fn is_paid_or_later(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Settled)
    }
}

impl AsRef<str> for OrderStatus {
    fn as_ref(&self) -> &str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Settled => "settled",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(OrderStatus::Created),
            "pending_payment" => Ok(OrderStatus::PendingPayment),
            "paid" => Ok(OrderStatus::Paid),
            "settled" => Ok(OrderStatus::Settled),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::ValidationError(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// A conditional status mutation, applied atomically by the store.
///
/// The transition carries its target status and, for payment transitions,
/// the provider's payment id. Whether an order may take the transition is
/// decided against its *current* status via [`StatusTransition::permits`].
#[derive(Debug, Clone)]
pub struct StatusTransition {
    to: OrderStatus,
    provider_payment_id: Option<String>,
}

impl StatusTransition {
    /// Marks the order paid, recording the provider's payment id.
    pub fn paid(provider_payment_id: impl Into<String>) -> Self {
        Self {
            to: OrderStatus::Paid,
            provider_payment_id: Some(provider_payment_id.into()),
        }
    }

    /// Moves a fresh order into `pending_payment`.
    pub fn pending_payment() -> Self {
        Self {
            to: OrderStatus::PendingPayment,
            provider_payment_id: None,
        }
    }

    /// Cancels a not-yet-paid order.
    pub fn cancelled() -> Self {
        Self {
            to: OrderStatus::Cancelled,
            provider_payment_id: None,
        }
    }

    /// Settles a paid order.
    pub fn settled() -> Self {
        Self {
            to: OrderStatus::Settled,
            provider_payment_id: None,
        }
    }

    /// Target status of this transition.
    pub fn to(&self) -> OrderStatus {
        self.to
    }

    /// Provider payment id to record, if any.
    pub fn provider_payment_id(&self) -> Option<&str> {
        self.provider_payment_id.as_deref()
    }

    /// DAG predicate: may an order currently in `from` take this transition?
    pub fn permits(&self, from: OrderStatus) -> bool {
        from.can_transition_to(self.to)
    }
}

/// Result of a conditional transition attempt.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The predicate held and the mutation was written.
    Applied(PurchaseOrder),
    /// The predicate failed; carries the untouched current record.
    Rejected(PurchaseOrder),
    /// No order with that reference exists.
    NotFound,
}

/// A merchant purchase order denominated in the payment token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrder {
    /// Unique identifier, assigned on creation
    pub id: OrderId,
    /// Globally unique merchant reference (`PO-` + 10 uppercase alphanumerics)
    pub merchant_ref: MerchantRef,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Token amount, fixed 18.8 decimal precision
    #[schema(value_type = String, example = "1.5")]
    pub amount: TokenAmount,
    /// Opaque merchant metadata, immutable after creation
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    /// Provider payment id, set exactly once when the order first becomes paid
    pub provider_payment_id: Option<String>,
    /// When the order was created
    pub created_at: DateTime<Utc>,
    /// When the order was last mutated
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Creates a fresh order in the `created` state.
    pub fn new(merchant_ref: MerchantRef, amount: TokenAmount, metadata: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            merchant_ref,
            status: OrderStatus::default(),
            amount,
            metadata,
            provider_payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs an order from stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: OrderId,
        merchant_ref: MerchantRef,
        status: OrderStatus,
        amount: TokenAmount,
        metadata: serde_json::Value,
        provider_payment_id: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            merchant_ref,
            status,
            amount,
            metadata,
            provider_payment_id,
            created_at,
            updated_at,
        }
    }

    /// Applies a permitted transition in place.
    ///
    /// The provider payment id is written only if not already set.
    pub fn apply(&mut self, transition: &StatusTransition) -> Result<(), DomainError> {
        if !transition.permits(self.status) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: transition.to(),
            });
        }
        self.status = transition.to();
        if self.provider_payment_id.is_none() {
            self.provider_payment_id = transition.provider_payment_id().map(str::to_owned);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order() -> PurchaseOrder {
        PurchaseOrder::new(
            "PO-ABC123XYZ0".parse().unwrap(),
            "1.5".parse().unwrap(),
            serde_json::json!({"memo": "Premium"}),
        )
    }

    #[test]
    fn test_new_order_starts_created() {
        let order = test_order();
        assert_eq!(order.status, OrderStatus::Created);
        assert!(order.provider_payment_id.is_none());
    }

    #[test]
    fn test_status_dag_edges() {
        use OrderStatus::*;
        assert!(Created.can_transition_to(PendingPayment));
        assert!(Created.can_transition_to(Paid));
        assert!(Created.can_transition_to(Cancelled));
        assert!(PendingPayment.can_transition_to(Paid));
        assert!(PendingPayment.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Settled));

        // No regression once paid, and no cancelling a paid order.
        assert!(!Paid.can_transition_to(Created));
        assert!(!Paid.can_transition_to(PendingPayment));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Paid.can_transition_to(Paid));
        assert!(!Settled.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Paid));
    }

    #[test]
    fn test_payable_states() {
        use OrderStatus::*;
        for status in OrderStatus::ALL {
            assert_eq!(
                status.is_payable(),
                status.can_transition_to(Paid),
                "payable mismatch for {status}"
            );
        }
        assert!(Created.is_payable());
        assert!(PendingPayment.is_payable());
        assert!(Paid.is_paid_or_later());
        assert!(Settled.is_paid_or_later());
        assert!(!Cancelled.is_paid_or_later());
    }

    #[test]
    fn test_apply_paid_records_payment_id() {
        let mut order = test_order();
        order.apply(&StatusTransition::paid("PAY123")).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.provider_payment_id.as_deref(), Some("PAY123"));
    }

    #[test]
    fn test_apply_paid_twice_rejected() {
        let mut order = test_order();
        order.apply(&StatusTransition::paid("PAY123")).unwrap();
        let err = order.apply(&StatusTransition::paid("PAY999"));
        assert!(matches!(err, Err(DomainError::InvalidTransition { .. })));
        assert_eq!(order.provider_payment_id.as_deref(), Some("PAY123"));
    }

    #[test]
    fn test_settle_does_not_clobber_payment_id() {
        let mut order = test_order();
        order.apply(&StatusTransition::paid("PAY123")).unwrap();
        order.apply(&StatusTransition::settled()).unwrap();
        assert_eq!(order.status, OrderStatus::Settled);
        assert_eq!(order.provider_payment_id.as_deref(), Some("PAY123"));
    }

    #[test]
    fn test_merchant_ref_parsing() {
        assert!("PO-ABC123XYZ0".parse::<MerchantRef>().is_ok());
        assert!("PO-0123456789".parse::<MerchantRef>().is_ok());

        for bad in ["", "PO-", "PO-abc123xyz0", "PO-ABC123XYZ", "PO-ABC123XYZ01", "XX-ABC123XYZ0", "PO-ABC 23XYZ0"] {
            assert!(bad.parse::<MerchantRef>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_ref().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!(OrderStatus::PendingPayment.to_string(), "pending_payment");
    }
}
