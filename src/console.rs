//! Composition root for the three workspace state machines
//!
//! Owns the session catalog and the folder tree synchronously, and the
//! conversation engine through its channel handle. The engines never
//! read each other's state; the console forwards a single reset to the
//! conversation engine whenever the catalog reports a selection change.

use crate::folder_tree::{FolderTree, TreeRow};
use crate::runtime::{ConsoleEvent, EngineHandle};
use crate::sessions::{SessionId, SessionStore, SessionView};
use crate::state_machine::{Attachment, Event};
use tokio::sync::broadcast;

/// The assistant console: folder pane, session pane, active conversation.
pub struct Console {
    sessions: SessionStore,
    tree: FolderTree,
    engine: EngineHandle,
}

impl Console {
    pub fn new(engine: EngineHandle, sessions: SessionStore, tree: FolderTree) -> Self {
        Self {
            sessions,
            tree,
            engine,
        }
    }

    // ==================== Session intents ====================

    /// Create, select, and enter rename mode in one step. Exactly one
    /// reset reaches the engine.
    pub async fn new_session(&mut self) -> SessionId {
        let id = self.sessions.create();
        self.reset_engine().await;
        id
    }

    /// Returns false for an unknown id. A successful selection always
    /// resets the conversation, including re-selecting the current one.
    pub async fn select_session(&mut self, id: SessionId) -> bool {
        let change = self.sessions.select(id);
        if change.requires_reset() {
            self.reset_engine().await;
        }
        change.requires_reset()
    }

    /// Returns whether the title actually changed. Never resets.
    pub fn rename_session(&mut self, id: SessionId, new_title: &str) -> bool {
        self.sessions.rename(id, new_title) == crate::sessions::SessionChange::Changed
    }

    pub fn cancel_rename(&mut self) {
        self.sessions.cancel_rename();
    }

    /// Returns whether a session was removed. Deleting the selected
    /// session leaves the selection empty and the conversation untouched.
    pub fn delete_session(&mut self, id: SessionId) -> bool {
        self.sessions.delete(id) == crate::sessions::SessionChange::Changed
    }

    // ==================== Conversation intents ====================

    pub async fn update_draft(&self, text: impl Into<String>) {
        self.engine
            .send(Event::UpdateDraft { text: text.into() })
            .await;
    }

    /// Entry point for both the file chooser and drag-and-drop.
    pub async fn stage_attachments(&self, files: Vec<Attachment>) {
        self.engine.send(Event::StageAttachments { files }).await;
    }

    pub async fn unstage_attachment(&self, index: usize) {
        self.engine.send(Event::UnstageAttachment { index }).await;
    }

    /// Fire-and-forget: a rejected submission surfaces as a
    /// [`ConsoleEvent::Rejected`] on the subscription, not an error here.
    pub async fn submit(&self) {
        self.engine.send(Event::Submit).await;
    }

    pub async fn reset_conversation(&self) {
        self.reset_engine().await;
    }

    // ==================== Tree intents ====================

    pub fn toggle(&mut self, path: &[usize]) -> bool {
        self.tree.toggle(path)
    }

    // ==================== Projections ====================

    pub fn session_list(&self) -> Vec<SessionView> {
        self.sessions.snapshot()
    }

    pub fn selected_session(&self) -> Option<SessionId> {
        self.sessions.selected()
    }

    pub fn tree_rows(&self) -> Vec<TreeRow> {
        self.tree.visible_rows()
    }

    /// Conversation snapshots and rejections arrive here.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.engine.subscribe()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    async fn reset_engine(&self) {
        tracing::debug!("resetting conversation engine");
        self.engine.send(Event::Reset).await;
    }
}
