//! Trait abstraction for the deferred responder
//!
//! Timing policy lives behind this seam, so tests can swap in
//! controllable providers and cancellation can be exercised
//! deterministically.

use crate::state_machine::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the assistant reply to a submitted user message, eventually.
///
/// Implementations are expected to suspend (a delay, a network call)
/// before resolving; the runtime races them against cancellation, so a
/// provider never needs to observe resets itself.
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    async fn respond_to(&self, message: &Message) -> Message;
}

#[async_trait]
impl<T: ResponseProvider + ?Sized> ResponseProvider for Arc<T> {
    async fn respond_to(&self, message: &Message) -> Message {
        (**self).respond_to(message).await
    }
}
