//! Webhook reconciliation state machine.
//!
//! Consumes a verified provider event and applies it to the matching order
//! exactly once, absorbing retries, replays, and out-of-order deliveries.

use orders_types::{AppError, OrderRepository, ProviderEvent, StatusTransition, TransitionOutcome};

/// What a webhook delivery amounted to.
///
/// Every variant is acknowledged to the provider with success; only store
/// failures bubble up as errors (the one class where a provider retry can
/// help).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookDisposition {
    /// The order transitioned to `paid`.
    Applied,
    /// The order was already `paid`; the delivery was a replay.
    Replay,
    /// The order can no longer become `paid` (e.g. cancelled).
    Rejected,
    /// No order with the event's reference exists (yet).
    UnknownReference,
    /// The event type is not one this core handles.
    Ignored,
}

impl WebhookDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookDisposition::Applied => "applied",
            WebhookDisposition::Replay => "replay",
            WebhookDisposition::Rejected => "rejected",
            WebhookDisposition::UnknownReference => "unknown_reference",
            WebhookDisposition::Ignored => "ignored",
        }
    }
}

impl std::fmt::Display for WebhookDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Applies a verified event to the order store.
pub(crate) async fn reconcile<R: OrderRepository>(
    repo: &R,
    event: ProviderEvent,
) -> Result<WebhookDisposition, AppError> {
    let (payment_id, merchant_ref, reported_status) = match event {
        ProviderEvent::PaymentCompleted {
            payment_id,
            merchant_ref,
            status,
        } => (payment_id, merchant_ref, status),
        ProviderEvent::Unrecognized => {
            tracing::info!("Ignoring unrecognized webhook event type");
            return Ok(WebhookDisposition::Ignored);
        }
    };

    tracing::info!(
        reference = %merchant_ref,
        payment_id = %payment_id,
        reported_status = %reported_status,
        "Processing payment.completed webhook"
    );

    let outcome = repo
        .apply_transition(&merchant_ref, StatusTransition::paid(payment_id.clone()))
        .await?;

    match outcome {
        TransitionOutcome::Applied(order) => {
            tracing::info!(reference = %order.merchant_ref, "Order marked paid");
            Ok(WebhookDisposition::Applied)
        }
        TransitionOutcome::Rejected(order) if order.status.is_paid_or_later() => {
            match order.provider_payment_id.as_deref() {
                Some(stored) if stored != payment_id => {
                    tracing::warn!(
                        reference = %order.merchant_ref,
                        stored,
                        incoming = %payment_id,
                        "Replayed webhook carries a different payment id"
                    );
                }
                _ => {
                    tracing::info!(
                        reference = %order.merchant_ref,
                        "Replayed payment.completed webhook, order already paid"
                    );
                }
            }
            Ok(WebhookDisposition::Replay)
        }
        TransitionOutcome::Rejected(order) => {
            // A payment report for an order that left the payable states
            // without being paid; nothing to do but acknowledge.
            tracing::warn!(
                reference = %order.merchant_ref,
                status = %order.status,
                "Payment reported for an order that cannot become paid"
            );
            Ok(WebhookDisposition::Rejected)
        }
        TransitionOutcome::NotFound => {
            tracing::warn!(reference = %merchant_ref, "Webhook references an unknown order");
            Ok(WebhookDisposition::UnknownReference)
        }
    }
}
