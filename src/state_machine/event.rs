//! Events that drive the conversation state machine
//!
//! Everything the presentation layer may ask of the engine, plus the
//! arrival of a deferred response. Both the file-chooser and drag-and-drop
//! entry points funnel into [`Event::StageAttachments`].

use super::state::{Attachment, Message, RequestId};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Replace the composer draft verbatim.
    UpdateDraft { text: String },

    /// Append files to the staging buffer, preserving input order.
    /// Duplicates are allowed; no size or type filtering happens here.
    StageAttachments { files: Vec<Attachment> },

    /// Remove one staged attachment. Out-of-range indices are a no-op.
    UnstageAttachment { index: usize },

    /// Freeze the draft and staged attachments into a user message and
    /// schedule the deferred assistant reply.
    Submit,

    /// A deferred response completed. Only appended if `request` still
    /// matches the pending id; stale arrivals are dropped.
    ResponseArrived { request: RequestId, message: Message },

    /// Full session reset: clear the log and composer and cancel any
    /// in-flight deferred response.
    Reset,
}
