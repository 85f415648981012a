//! Catalog of named conversation threads
//!
//! Owns the session list, the current selection, and the rename-pending
//! marker. Sessions are ordered most-recently-created first. The store
//! never talks to the conversation engine directly; callers observe the
//! returned [`SessionChange`] and forward a reset when selection moved.

use serde::Serialize;
use uuid::Uuid;

/// Title given to a freshly created thread.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Opaque, stable thread identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One named conversation thread.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    /// Monotone creation counter; higher ranks sort first.
    pub created_rank: u64,
}

/// What a catalog operation did, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// The selection moved (or was re-applied); the engine must reset.
    SelectionChanged,
    /// The catalog changed without touching the selection.
    Changed,
    /// Nothing to do (unknown id, empty rename).
    NoOp,
}

impl SessionChange {
    pub fn requires_reset(self) -> bool {
        matches!(self, SessionChange::SelectionChanged)
    }
}

/// In-memory thread catalog.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// Most-recently-created first.
    sessions: Vec<Session>,
    selected: Option<SessionId>,
    /// Session currently in rename-pending mode, if any.
    editing: Option<SessionId>,
    next_rank: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with saved threads, first one selected.
    /// Titles are inserted so that the first title ends up at the head.
    pub fn seeded<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = Self::new();
        let mut titles: Vec<String> = titles.into_iter().map(Into::into).collect();
        titles.reverse();
        for title in titles {
            let rank = store.next_rank;
            store.next_rank += 1;
            store.sessions.insert(
                0,
                Session {
                    id: SessionId::new(),
                    title,
                    created_rank: rank,
                },
            );
        }
        store.selected = store.sessions.first().map(|s| s.id);
        store
    }

    /// Insert a new thread at the head, select it, and enter
    /// rename-pending mode. Always a selection change.
    pub fn create(&mut self) -> SessionId {
        let id = SessionId::new();
        let rank = self.next_rank;
        self.next_rank += 1;
        self.sessions.insert(
            0,
            Session {
                id,
                title: DEFAULT_SESSION_TITLE.to_string(),
                created_rank: rank,
            },
        );
        self.selected = Some(id);
        self.editing = Some(id);
        tracing::debug!(session_id = %id, "session created");
        id
    }

    /// Select a thread. Re-selecting the already selected thread still
    /// counts as a selection change (the conversation resets on every
    /// selection). Unknown ids change nothing.
    pub fn select(&mut self, id: SessionId) -> SessionChange {
        if !self.contains(id) {
            return SessionChange::NoOp;
        }
        self.selected = Some(id);
        tracing::debug!(session_id = %id, "session selected");
        SessionChange::SelectionChanged
    }

    /// Rename a thread. The new title is trimmed; a blank title discards
    /// the rename and leaves the stored title unchanged. Either way the
    /// rename-pending marker for this thread is cleared.
    pub fn rename(&mut self, id: SessionId, new_title: &str) -> SessionChange {
        if self.editing == Some(id) {
            self.editing = None;
        }
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return SessionChange::NoOp;
        };
        let trimmed = new_title.trim();
        if trimmed.is_empty() {
            return SessionChange::NoOp;
        }
        session.title = trimmed.to_string();
        tracing::debug!(session_id = %id, title = %session.title, "session renamed");
        SessionChange::Changed
    }

    /// Leave rename-pending mode without renaming.
    pub fn cancel_rename(&mut self) {
        self.editing = None;
    }

    /// Remove a thread. Deleting the selected thread leaves the selection
    /// empty; no neighbor is auto-selected.
    pub fn delete(&mut self, id: SessionId) -> SessionChange {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return SessionChange::NoOp;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
        tracing::debug!(session_id = %id, "session deleted");
        SessionChange::Changed
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.get(id).is_some()
    }

    pub fn selected(&self) -> Option<SessionId> {
        self.selected
    }

    pub fn editing(&self) -> Option<SessionId> {
        self.editing
    }

    /// Read-only projection for renderers.
    pub fn snapshot(&self) -> Vec<SessionView> {
        self.sessions
            .iter()
            .map(|s| SessionView {
                id: s.id,
                title: s.title.clone(),
                selected: self.selected == Some(s.id),
                renaming: self.editing == Some(s.id),
            })
            .collect()
    }
}

/// One row of the session list as a renderer sees it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub title: String,
    pub selected: bool,
    pub renaming: bool,
}
