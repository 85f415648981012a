//! Conversation state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Messages and Attachments
// ============================================================================

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// An opaque file reference attached to the composer or a sent message.
///
/// Byte content is never inspected; only the picker-supplied metadata is
/// carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub byte_size: u64,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, byte_size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            byte_size,
            mime_type: mime_type.into(),
        }
    }

    /// Uppercase mime subtype for display badges ("application/pdf" -> "PDF"),
    /// falling back to "FILE" when the subtype is missing.
    pub fn short_type(&self) -> String {
        self.mime_type
            .split('/')
            .nth(1)
            .filter(|s| !s.is_empty())
            .map_or_else(|| "FILE".to_string(), str::to_uppercase)
    }
}

/// One entry in the message log. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: Option<String>,
    pub attachments: Vec<Attachment>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a user message. Returns `None` when both the text and the
    /// attachment list are empty; such a message is never constructible.
    pub fn user(text: Option<String>, attachments: Vec<Attachment>) -> Option<Self> {
        let text = text.filter(|t| !t.is_empty());
        if text.is_none() && attachments.is_empty() {
            return None;
        }
        Some(Self {
            sender: Sender::User,
            text,
            attachments,
            timestamp: Utc::now(),
        })
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: Some(text.into()),
            attachments: vec![],
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Identifier for one scheduled deferred response.
///
/// Ids are allocated monotonically and never reused, including across
/// resets, so a completion raced past a reset can always be told apart
/// from the currently pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Full state of the active conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Append-only within a session; discarded only by a full reset.
    pub messages: Vec<Message>,
    /// Composer draft, replaced verbatim on every keystroke.
    pub draft_text: String,
    /// Files staged but not yet frozen into a sent message.
    pub staged_attachments: Vec<Attachment>,
    /// The one in-flight deferred response, if any.
    pub pending: Option<RequestId>,
    /// Next request id to allocate. Monotone across resets.
    #[serde(default)]
    pub next_request_id: u64,
}

impl ConversationState {
    /// True between a submitted user message and its assistant reply.
    pub fn response_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Read-only projection consumed by the presentation layer.
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            draft_text: self.draft_text.clone(),
            staged_attachments: self.staged_attachments.clone(),
            response_pending: self.response_pending(),
        }
    }
}

/// What a renderer needs: the log, the composer, and the typing indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub draft_text: String,
    pub staged_attachments: Vec<Attachment>,
    pub response_pending: bool,
}
