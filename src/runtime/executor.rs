//! Conversation runtime executor

use super::traits::ResponseProvider;
use super::ConsoleEvent;
use crate::state_machine::{transition, ConversationState, Effect, Event, Message, RequestId};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Event loop around the pure transition function.
///
/// Owns the conversation state and the cancellation token for the one
/// in-flight deferred response. All mutation happens here, on one task;
/// a session switch conceptually replaces the whole engine, which a
/// `Reset` event models without respawning.
pub struct ConversationRuntime<P>
where
    P: ResponseProvider + 'static,
{
    state: ConversationState,
    provider: Arc<P>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<ConsoleEvent>,
    /// Token for the currently scheduled deferred response.
    response_cancel: Option<CancellationToken>,
}

impl<P> ConversationRuntime<P>
where
    P: ResponseProvider + 'static,
{
    pub fn new(
        provider: P,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<ConsoleEvent>,
    ) -> Self {
        Self {
            state: ConversationState::default(),
            provider: Arc::new(provider),
            event_rx,
            event_tx,
            broadcast_tx,
            response_cancel: None,
        }
    }

    pub async fn run(mut self) {
        tracing::debug!("conversation engine started");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        // Channel closed: nothing can submit anymore, so silence any
        // still-scheduled reply.
        if let Some(token) = self.response_cancel.take() {
            token.cancel();
        }
        tracing::debug!("conversation engine stopped");
    }

    fn process_event(&mut self, event: Event) {
        match transition(&self.state, event) {
            Ok(result) => {
                self.state = result.new_state;
                for effect in result.effects {
                    self.execute_effect(effect);
                }
                if !self.state.response_pending() {
                    // Arrived or reset; the token (if any) is spent.
                    self.response_cancel = None;
                }
                let _ = self
                    .broadcast_tx
                    .send(ConsoleEvent::Conversation(self.state.snapshot()));
            }
            Err(rejection) => {
                // Forgiving contract: rejected intents change nothing.
                tracing::debug!(%rejection, "intent rejected");
                let _ = self.broadcast_tx.send(ConsoleEvent::Rejected {
                    reason: rejection.to_string(),
                });
            }
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleResponse { request, prompt } => {
                self.schedule_response(request, prompt);
            }
            Effect::CancelPending => {
                if let Some(token) = self.response_cancel.take() {
                    token.cancel();
                }
            }
        }
    }

    /// Spawn the single-shot deferred reply, raced against cancellation.
    /// A cancelled task sends nothing; the request-id check in the
    /// transition function catches the narrower race where the reply was
    /// already queued when the reset landed.
    fn schedule_response(&mut self, request: RequestId, prompt: Message) {
        let token = CancellationToken::new();
        self.response_cancel = Some(token.clone());

        let provider = Arc::clone(&self.provider);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    tracing::debug!(request = request.0, "deferred response cancelled");
                }
                message = provider.respond_to(&prompt) => {
                    if event_tx
                        .send(Event::ResponseArrived { request, message })
                        .await
                        .is_err()
                    {
                        tracing::debug!(request = request.0, "engine gone before response landed");
                    }
                }
            }
        });
    }
}
