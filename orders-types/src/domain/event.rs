//! Inbound provider webhook events.

use serde::Deserialize;

/// A provider callback, parsed into the event shapes this core recognizes.
///
/// The wire form is `{"event": "...", "paymentId": "...", "merchantRef":
/// "...", "status": "..."}`. Anything other than `payment.completed` lands
/// in [`ProviderEvent::Unrecognized`] and is acknowledged without side
/// effects, so new provider event types never turn into retry storms.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event")]
pub enum ProviderEvent {
    /// The provider reports a completed payment for a merchant reference.
    #[serde(rename = "payment.completed", rename_all = "camelCase")]
    PaymentCompleted {
        payment_id: String,
        merchant_ref: String,
        /// Status as reported by the provider; informational only.
        #[serde(default)]
        status: String,
    },
    /// Any event type this core does not handle.
    #[serde(other)]
    Unrecognized,
}
