//! Property-based tests for the conversation state machine
//!
//! These verify the ordering and single-pending invariants across
//! arbitrary composer contents and event interleavings.

use super::state::*;
use super::transition::*;
use super::{Effect, Event};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_attachment() -> impl Strategy<Value = Attachment> {
    ("[a-z]{1,12}\\.(pdf|txt|docx)", 0u64..5_000_000, "(application|text)/[a-z]{2,8}")
        .prop_map(|(name, byte_size, mime_type)| Attachment {
            name,
            byte_size,
            mime_type,
        })
}

fn arb_attachments(max: usize) -> impl Strategy<Value = Vec<Attachment>> {
    proptest::collection::vec(arb_attachment(), 0..max)
}

fn arb_draft() -> impl Strategy<Value = String> {
    // Includes whitespace-only drafts so the trim rule gets exercised.
    "[ a-zA-Z0-9?]{0,40}".prop_map(String::from)
}

/// A submittable composer: non-blank draft or at least one attachment.
fn arb_submittable() -> impl Strategy<Value = (String, Vec<Attachment>)> {
    (arb_draft(), arb_attachments(4)).prop_filter(
        "draft blank and nothing staged",
        |(draft, files)| !draft.trim().is_empty() || !files.is_empty(),
    )
}

fn submit_one(state: ConversationState, draft: String, files: Vec<Attachment>) -> ConversationState {
    let state = transition(&state, Event::UpdateDraft { text: draft })
        .unwrap()
        .new_state;
    let state = transition(&state, Event::StageAttachments { files })
        .unwrap()
        .new_state;
    transition(&state, Event::Submit).unwrap().new_state
}

fn deliver_pending(state: ConversationState, reply: &str) -> ConversationState {
    let request = state.pending.expect("a response must be pending");
    transition(
        &state,
        Event::ResponseArrived {
            request,
            message: Message::assistant(reply),
        },
    )
    .unwrap()
    .new_state
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Submissions interleaved with their replies in submission order
    /// produce the strict user/assistant interleave.
    #[test]
    fn fifo_interleave(turns in proptest::collection::vec(arb_submittable(), 1..6)) {
        let mut state = ConversationState::default();
        for (draft, files) in turns.clone() {
            state = submit_one(state, draft, files);
            state = deliver_pending(state, "ack");
        }

        prop_assert_eq!(state.messages.len(), turns.len() * 2);
        for (i, msg) in state.messages.iter().enumerate() {
            let expected = if i % 2 == 0 { Sender::User } else { Sender::Assistant };
            prop_assert_eq!(msg.sender, expected);
        }
        prop_assert!(!state.response_pending());
    }

    /// A second submit while a response is pending is rejected and leaves
    /// the state byte-for-byte unchanged.
    #[test]
    fn single_pending((draft, files) in arb_submittable(), retry_draft in arb_draft()) {
        let state = submit_one(ConversationState::default(), draft, files);
        prop_assert!(state.response_pending());

        let state = transition(&state, Event::UpdateDraft { text: retry_draft })
            .unwrap()
            .new_state;
        let before = state.clone();
        prop_assert_eq!(
            transition(&state, Event::Submit).unwrap_err(),
            TransitionError::ResponsePending
        );
        prop_assert_eq!(before, state);
    }

    /// Reset always yields an empty conversation, requests cancellation of
    /// any pending response, and that response can never land afterwards.
    #[test]
    fn reset_discards_pending((draft, files) in arb_submittable()) {
        let state = submit_one(ConversationState::default(), draft, files);
        let request = state.pending.unwrap();

        let result = transition(&state, Event::Reset).unwrap();
        prop_assert!(result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::CancelPending)));

        let state = result.new_state;
        prop_assert!(state.messages.is_empty());
        prop_assert!(!state.response_pending());

        // A completion that raced past the cancellation is dropped.
        let state = transition(
            &state,
            Event::ResponseArrived {
                request,
                message: Message::assistant("stale"),
            },
        )
        .unwrap()
        .new_state;
        prop_assert!(state.messages.is_empty());
    }

    /// Staged attachments move into the submitted message unchanged, in
    /// order, and the staging buffer empties.
    #[test]
    fn attachments_move_on_submit(files in arb_attachments(5)) {
        prop_assume!(!files.is_empty());
        let state = submit_one(ConversationState::default(), String::new(), files.clone());

        prop_assert_eq!(&state.messages[0].attachments, &files);
        prop_assert!(state.staged_attachments.is_empty());
    }

    /// Unstaging never panics; it removes exactly the indexed entry when in
    /// range and changes nothing otherwise.
    #[test]
    fn unstage_is_total(files in arb_attachments(5), index in 0usize..10) {
        let state = transition(
            &ConversationState::default(),
            Event::StageAttachments { files: files.clone() },
        )
        .unwrap()
        .new_state;

        let next = transition(&state, Event::UnstageAttachment { index })
            .unwrap()
            .new_state;

        if index < files.len() {
            prop_assert_eq!(next.staged_attachments.len(), files.len() - 1);
            let mut expected = files;
            expected.remove(index);
            prop_assert_eq!(next.staged_attachments, expected);
        } else {
            prop_assert_eq!(next.staged_attachments, files);
        }
    }
}
