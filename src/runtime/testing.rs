//! Controllable providers and a test harness for the engine runtime
//!
//! These enable exercising the timing-sensitive guarantees (single
//! pending response, reset-cancels-pending) without real delays driving
//! the assertions.

use super::traits::ResponseProvider;
use super::{spawn_engine, ConsoleEvent, EngineHandle};
use crate::state_machine::{Attachment, ConversationSnapshot, Event, Message};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Responder
// ============================================================================

/// Responder that replies immediately with queued texts.
pub struct MockResponder {
    replies: Mutex<VecDeque<String>>,
    /// Record of the prompts answered, for assertions.
    pub prompts: Mutex<Vec<Message>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(text.into());
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseProvider for MockResponder {
    async fn respond_to(&self, message: &Message) -> Message {
        self.prompts.lock().unwrap().push(message.clone());
        let text = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "ok".to_string());
        Message::assistant(text)
    }
}

// ============================================================================
// Delayed Responder (for cancellation testing)
// ============================================================================

/// Responder with a configurable delay and a start hook for test
/// synchronization.
pub struct DelayedResponder {
    inner: MockResponder,
    delay: Duration,
    /// Notified when a response starts resolving.
    pub started: Arc<Notify>,
}

impl DelayedResponder {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockResponder::new(),
            delay,
            started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.inner.queue_reply(text);
    }
}

#[async_trait]
impl ResponseProvider for DelayedResponder {
    async fn respond_to(&self, message: &Message) -> Message {
        // notify_one stores a permit, so a waiter that registers after
        // this point still observes the start.
        self.started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.respond_to(message).await
    }
}

// ============================================================================
// Test Console
// ============================================================================

/// Engine handle plus snapshot tracking, with minimal boilerplate.
pub struct TestConsole {
    pub handle: EngineHandle,
    rx: tokio::sync::broadcast::Receiver<ConsoleEvent>,
    last: ConversationSnapshot,
    pub rejections: Vec<String>,
}

impl TestConsole {
    pub fn spawn<P: ResponseProvider + 'static>(provider: P) -> Self {
        let handle = spawn_engine(provider);
        let rx = handle.subscribe();
        Self {
            handle,
            rx,
            last: ConversationSnapshot {
                messages: vec![],
                draft_text: String::new(),
                staged_attachments: vec![],
                response_pending: false,
            },
            rejections: Vec::new(),
        }
    }

    pub async fn send(&self, event: Event) {
        self.handle.send(event).await;
    }

    pub async fn type_and_submit(&self, text: &str) {
        self.send(Event::UpdateDraft { text: text.into() }).await;
        self.send(Event::Submit).await;
    }

    /// Drain broadcast events until `pred` holds for a snapshot, or panic
    /// after `timeout`.
    pub async fn wait_for(
        &mut self,
        timeout: Duration,
        pred: impl Fn(&ConversationSnapshot) -> bool,
    ) -> ConversationSnapshot {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline
                .checked_duration_since(tokio::time::Instant::now())
                .unwrap_or_else(|| panic!("timed out waiting; last snapshot: {:?}", self.last));
            match tokio::time::timeout(remaining, self.rx.recv()).await {
                Ok(Ok(ConsoleEvent::Conversation(snapshot))) => {
                    self.last = snapshot.clone();
                    if pred(&snapshot) {
                        return snapshot;
                    }
                }
                Ok(Ok(ConsoleEvent::Rejected { reason })) => {
                    self.rejections.push(reason);
                }
                Ok(Err(e)) => panic!("broadcast channel closed: {e}"),
                Err(_) => panic!("timed out waiting; last snapshot: {:?}", self.last),
            }
        }
    }

    /// Drain whatever is already queued without waiting.
    pub fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                ConsoleEvent::Conversation(snapshot) => self.last = snapshot,
                ConsoleEvent::Rejected { reason } => self.rejections.push(reason),
            }
        }
    }

    pub fn last_snapshot(&self) -> &ConversationSnapshot {
        &self.last
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::Sender;

    const WAIT: Duration = Duration::from_secs(2);

    fn pdf(name: &str) -> Attachment {
        Attachment::new(name, 2048, "application/pdf")
    }

    /// Submit then reply: the log interleaves user/assistant and the
    /// typing indicator drops once the reply lands.
    #[tokio::test]
    async fn submit_then_reply() {
        let responder = MockResponder::new();
        responder.queue_reply("Here's a dummy IntelX response for your query.");

        let mut console = TestConsole::spawn(responder);
        console.type_and_submit("hello").await;

        let snapshot = console.wait_for(WAIT, |s| s.messages.len() == 2).await;
        assert_eq!(snapshot.messages[0].sender, Sender::User);
        assert_eq!(snapshot.messages[0].text.as_deref(), Some("hello"));
        assert_eq!(snapshot.messages[1].sender, Sender::Assistant);
        assert_eq!(
            snapshot.messages[1].text.as_deref(),
            Some("Here's a dummy IntelX response for your query.")
        );
        assert!(!snapshot.response_pending);
    }

    /// Two rapid submits yield one user message and one reply; the second
    /// submit is rejected.
    #[tokio::test]
    async fn second_submit_is_rejected_while_pending() {
        let responder = DelayedResponder::new(Duration::from_millis(100));
        responder.queue_reply("first");
        responder.queue_reply("second");

        let mut console = TestConsole::spawn(responder);
        console.type_and_submit("one").await;
        console.type_and_submit("two").await;

        // Pending stays true until the single scheduled reply fires.
        let snapshot = console
            .wait_for(WAIT, |s| s.response_pending && s.messages.len() == 1)
            .await;
        assert_eq!(snapshot.messages[0].text.as_deref(), Some("one"));

        let snapshot = console.wait_for(WAIT, |s| !s.response_pending).await;
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].text.as_deref(), Some("first"));
        assert!(console
            .rejections
            .iter()
            .any(|r| r.contains("already pending")));
    }

    /// Reset before the delay elapses: the stale reply must never appear,
    /// even after the delay has long passed.
    #[tokio::test]
    async fn reset_cancels_deferred_reply() {
        let responder = DelayedResponder::new(Duration::from_millis(150));
        responder.queue_reply("should never land");
        let started = responder.started.clone();

        let mut console = TestConsole::spawn(responder);
        console.type_and_submit("hello").await;
        console.wait_for(WAIT, |s| s.response_pending).await;

        tokio::time::timeout(WAIT, started.notified())
            .await
            .expect("deferred response should start");

        console.send(Event::Reset).await;
        let snapshot = console
            .wait_for(WAIT, |s| s.messages.is_empty() && !s.response_pending)
            .await;
        assert!(snapshot.staged_attachments.is_empty());

        // Outlive the delay, then confirm nothing was appended.
        tokio::time::sleep(Duration::from_millis(400)).await;
        console.drain();
        assert!(console.last_snapshot().messages.is_empty());
    }

    /// Staged attachments move into the sent message and the staging
    /// buffer is empty in the very snapshot that carries the message.
    #[tokio::test]
    async fn attachments_move_into_message() {
        let mut console = TestConsole::spawn(MockResponder::new());
        console
            .send(Event::StageAttachments {
                files: vec![pdf("Statement_1.pdf"), pdf("Statement_2.pdf")],
            })
            .await;
        console.send(Event::Submit).await;

        let snapshot = console.wait_for(WAIT, |s| !s.messages.is_empty()).await;
        assert_eq!(
            snapshot.messages[0].attachments,
            vec![pdf("Statement_1.pdf"), pdf("Statement_2.pdf")]
        );
        assert!(snapshot.staged_attachments.is_empty());
        assert_eq!(snapshot.messages[0].text, None);
    }

    /// A fresh submission after a reset gets its own reply; the reply
    /// belonging to the discarded session never shows up.
    #[tokio::test]
    async fn reply_after_reset_belongs_to_new_submission() {
        let responder = DelayedResponder::new(Duration::from_millis(80));
        responder.queue_reply("stale");
        responder.queue_reply("fresh");
        let started = responder.started.clone();

        let mut console = TestConsole::spawn(responder);
        console.type_and_submit("first").await;
        tokio::time::timeout(WAIT, started.notified())
            .await
            .expect("deferred response should start");
        console.send(Event::Reset).await;
        console.type_and_submit("second").await;

        let snapshot = console.wait_for(WAIT, |s| s.messages.len() == 2).await;
        assert_eq!(snapshot.messages[0].text.as_deref(), Some("second"));
        // The first queued reply was consumed by the cancelled request or
        // skipped entirely; what lands is a reply to the new submission.
        assert_eq!(snapshot.messages[1].sender, Sender::Assistant);

        tokio::time::sleep(Duration::from_millis(250)).await;
        console.drain();
        assert_eq!(console.last_snapshot().messages.len(), 2);
    }

    /// Full scenario against the production stub: submit, typing
    /// indicator on, canned reply lands, indicator off.
    #[tokio::test]
    async fn fixed_delay_responder_scenario() {
        use crate::responder::{FixedDelayResponder, CANNED_REPLY};

        let responder = FixedDelayResponder::new(Duration::from_millis(20));
        let mut console = TestConsole::spawn(responder);
        console.type_and_submit("hello").await;

        let snapshot = console.wait_for(WAIT, |s| s.response_pending).await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].text.as_deref(), Some("hello"));

        let snapshot = console.wait_for(WAIT, |s| !s.response_pending).await;
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].text.as_deref(), Some(CANNED_REPLY));
    }

    /// The provider sees the submitted message it is answering.
    #[tokio::test]
    async fn provider_receives_the_prompt() {
        let responder = Arc::new(MockResponder::new());
        let mut console = TestConsole::spawn(Arc::clone(&responder));
        console.type_and_submit("what is in EF03?").await;

        console.wait_for(WAIT, |s| s.messages.len() == 2).await;
        let prompts = responder.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].text.as_deref(), Some("what is in EF03?"));
    }
}
