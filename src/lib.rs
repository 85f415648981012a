//! Interaction core for a case-management assistant console
//!
//! Three independent state machines compose the workspace: the session
//! catalog ([`sessions::SessionStore`]), the active conversation (a pure
//! transition function in [`state_machine`] driven by the async
//! [`runtime`]), and the document tree ([`folder_tree::FolderTree`]).
//! [`console::Console`] wires them together: a created or selected
//! session resets the conversation; nothing else is shared.

pub mod console;
pub mod folder_tree;
pub mod responder;
pub mod runtime;
pub mod sessions;
pub mod state_machine;

pub use console::Console;
pub use folder_tree::{FolderNode, FolderTree, NodeKind, NodeSpec, TreeRow};
pub use responder::FixedDelayResponder;
pub use runtime::{spawn_engine, ConsoleEvent, EngineHandle, ResponseProvider};
pub use sessions::{Session, SessionId, SessionStore, SessionView};
pub use state_machine::{
    transition, Attachment, ConversationSnapshot, ConversationState, Event, Message, Sender,
    TransitionError,
};
