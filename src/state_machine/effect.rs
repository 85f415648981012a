//! Effects produced by state transitions

use super::state::{Message, RequestId};

/// Effects to be executed after a state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Schedule exactly one deferred assistant reply to `prompt`.
    /// Single-shot: the runtime must not schedule a second response for
    /// the same request id.
    ScheduleResponse { request: RequestId, prompt: Message },

    /// Cancel the in-flight deferred response before it fires.
    CancelPending,
}
