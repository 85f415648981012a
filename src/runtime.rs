//! Async runtime for the conversation engine
//!
//! The engine runs as a spawned task: intents arrive on an mpsc channel,
//! pass through the pure transition function, and every applied change is
//! broadcast as a snapshot. The only suspension point is the deferred
//! assistant response, which is single-shot and cancelable.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::ResponseProvider;

use crate::state_machine::{ConversationSnapshot, Event};
use tokio::sync::{broadcast, mpsc};

/// Events fanned out to renderers and other observers.
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    /// The conversation changed; full snapshot attached.
    Conversation(ConversationSnapshot),
    /// An intent was rejected (busy engine or empty submission). The
    /// console layer treats these as no-ops; library callers may care.
    Rejected { reason: String },
}

/// Handle to a running conversation engine.
#[derive(Clone)]
pub struct EngineHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<ConsoleEvent>,
}

impl EngineHandle {
    /// Subscribe to snapshots and rejections.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Forward an event to the engine, dropping it if the engine is gone.
    pub async fn send(&self, event: Event) {
        if self.event_tx.send(event).await.is_err() {
            tracing::warn!("conversation engine is no longer running");
        }
    }
}

/// Spawn a conversation engine onto the current tokio runtime.
pub fn spawn_engine<P>(provider: P) -> EngineHandle
where
    P: ResponseProvider + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);

    let runtime = ConversationRuntime::new(provider, event_rx, event_tx.clone(), broadcast_tx.clone());
    tokio::spawn(runtime.run());

    EngineHandle {
        event_tx,
        broadcast_tx,
    }
}
