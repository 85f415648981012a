//! Fixed-delay stub responder
//!
//! Stands in for the document-retrieval backend: waits a configurable
//! non-zero delay, then returns a canned reply. Swap in a real client by
//! implementing [`ResponseProvider`] elsewhere.

use crate::runtime::ResponseProvider;
use crate::state_machine::Message;
use async_trait::async_trait;
use std::time::Duration;

/// Reply text returned for every query.
pub const CANNED_REPLY: &str = "Here's a dummy IntelX response for your query.";

/// Default simulated thinking time.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

const MIN_DELAY: Duration = Duration::from_millis(1);

/// Responder that resolves after a fixed delay.
#[derive(Debug, Clone)]
pub struct FixedDelayResponder {
    delay: Duration,
    reply: String,
}

impl FixedDelayResponder {
    /// The delay must be non-zero; zero is clamped up so the engine
    /// always passes through its awaiting state observably.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.max(MIN_DELAY),
            reply: CANNED_REPLY.to_string(),
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelayResponder {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl ResponseProvider for FixedDelayResponder {
    async fn respond_to(&self, message: &Message) -> Message {
        tracing::debug!(
            text = message.text.as_deref().unwrap_or(""),
            attachments = message.attachments.len(),
            "responding to query"
        );
        tokio::time::sleep(self.delay).await;
        Message::assistant(self.reply.clone())
    }
}
