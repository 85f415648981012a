//! Pure state transition function

use super::state::{ConversationState, Message, RequestId};
use super::{Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Rejections surfaced at the library boundary.
///
/// The console layer downgrades these to logged no-ops, matching the
/// disabled-submit-button behavior of the UI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a response is already pending")]
    ResponsePending,
    #[error("nothing to submit: empty draft and no staged attachments")]
    EmptySubmission,
}

/// Pure transition function.
///
/// Given the same state and event it always produces the same log and
/// composer contents; the only nondeterminism is the timestamp stamped
/// onto a newly created message.
pub fn transition(
    state: &ConversationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::UpdateDraft { text } => {
            let mut next = state.clone();
            next.draft_text = text;
            Ok(TransitionResult::new(next))
        }

        Event::StageAttachments { files } => {
            let mut next = state.clone();
            next.staged_attachments.extend(files);
            Ok(TransitionResult::new(next))
        }

        Event::UnstageAttachment { index } => {
            let mut next = state.clone();
            if index < next.staged_attachments.len() {
                next.staged_attachments.remove(index);
            }
            Ok(TransitionResult::new(next))
        }

        Event::Submit => {
            if state.response_pending() {
                return Err(TransitionError::ResponsePending);
            }
            let trimmed = state.draft_text.trim();
            if trimmed.is_empty() && state.staged_attachments.is_empty() {
                return Err(TransitionError::EmptySubmission);
            }

            let mut next = state.clone();
            // Ownership of the staged files moves into the message; the
            // staging buffer is cleared atomically with message creation.
            let attachments = std::mem::take(&mut next.staged_attachments);
            let text = (!trimmed.is_empty()).then(|| trimmed.to_string());
            let Some(message) = Message::user(text, attachments) else {
                return Err(TransitionError::EmptySubmission);
            };
            next.draft_text.clear();
            next.messages.push(message.clone());

            let request = RequestId(next.next_request_id);
            next.next_request_id += 1;
            next.pending = Some(request);

            Ok(TransitionResult::new(next).with_effect(Effect::ScheduleResponse {
                request,
                prompt: message,
            }))
        }

        Event::ResponseArrived { request, message } => {
            if state.pending != Some(request) {
                // Stale: a reset or a newer submission superseded it.
                return Ok(TransitionResult::new(state.clone()));
            }
            let mut next = state.clone();
            next.pending = None;
            next.messages.push(message);
            Ok(TransitionResult::new(next))
        }

        Event::Reset => {
            let was_pending = state.response_pending();
            let next = ConversationState {
                // Ids stay monotone across resets so a stale completion
                // can never match a fresh submission.
                next_request_id: state.next_request_id,
                ..ConversationState::default()
            };
            let result = TransitionResult::new(next);
            Ok(if was_pending {
                result.with_effect(Effect::CancelPending)
            } else {
                result
            })
        }
    }
}
