//!
//! noteworks store module
//! ----------------------
//! In-process store for user, session, folder and note records. The
//! rest of the codebase treats this as an external collaborator with
//! CRUD-with-filter semantics: every mutation that would otherwise be
//! a read-modify-write is exposed here as a single atomic primitive
//! (upsert-if-absent, filtered update, filtered delete) taken under
//! one write lock.
//!
//! The public API centers around `SharedStore`, a cheap clonable
//! handle (`Arc<RwLock<Collections>>`) constructed once at startup
//! and passed explicitly into every component. Operations return
//! `anyhow::Result` so callers surface store failures uniformly as
//! internal errors; the in-memory realization never fails, but the
//! signatures are the contract.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::model::{Folder, Note, NotePatch, Session, User};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    sessions: Vec<Session>,
    folders: Vec<Folder>,
    notes: Vec<Note>,
}

/// Thread-safe handle over all persisted collections.
#[derive(Clone, Default)]
pub struct SharedStore(Arc<RwLock<Collections>>);

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- users ---

    /// Insert a user unless the email is already taken. Returns the
    /// stored record on insert, `None` on conflict. Email comparison
    /// is case-sensitive, matching stored form.
    pub fn insert_user_if_absent(&self, user: User) -> Result<Option<User>> {
        let mut c = self.0.write();
        if c.users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        c.users.push(user.clone());
        Ok(Some(user))
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let c = self.0.read();
        Ok(c.users.iter().find(|u| u.email == email).cloned())
    }

    // --- sessions ---

    /// Replace any session for the same email with the given record.
    /// Single-session-per-user: a second login evicts the first
    /// device's token.
    pub fn upsert_session(&self, session: Session) -> Result<()> {
        let mut c = self.0.write();
        c.sessions.retain(|s| s.email != session.email);
        c.sessions.push(session);
        Ok(())
    }

    pub fn find_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let c = self.0.read();
        Ok(c.sessions.iter().find(|s| s.token == token).cloned())
    }

    /// Filtered delete of every session for the email. Handles
    /// residual duplicates left by older writes.
    pub fn delete_sessions_by_email(&self, email: &str) -> Result<usize> {
        let mut c = self.0.write();
        let before = c.sessions.len();
        c.sessions.retain(|s| s.email != email);
        Ok(before - c.sessions.len())
    }

    // --- folders ---

    /// Create the folder if no folder of that name exists, setting
    /// `author` only on insert. An existing folder of the same name
    /// is left untouched even when owned by someone else: folder
    /// names act as shared containers while notes stay per-owner.
    pub fn upsert_folder_if_absent(&self, name: &str, author: &str) -> Result<()> {
        let mut c = self.0.write();
        if c.folders.iter().any(|f| f.name == name) {
            return Ok(());
        }
        c.folders.push(Folder {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            author: author.to_string(),
        });
        Ok(())
    }

    pub fn folders_by_author(&self, author: &str) -> Result<Vec<Folder>> {
        let c = self.0.read();
        Ok(c.folders.iter().filter(|f| f.author == author).cloned().collect())
    }

    // --- notes ---

    pub fn insert_note(&self, note: Note) -> Result<()> {
        let mut c = self.0.write();
        c.notes.push(note);
        Ok(())
    }

    pub fn find_note(&self, id: &str) -> Result<Option<Note>> {
        let c = self.0.read();
        Ok(c.notes.iter().find(|n| n.id == id).cloned())
    }

    pub fn notes_by_author_and_folder(&self, author: &str, folder: &str) -> Result<Vec<Note>> {
        let c = self.0.read();
        Ok(c.notes
            .iter()
            .filter(|n| n.author == author && n.folder == folder)
            .cloned()
            .collect())
    }

    /// `$set`-style update filtered by `{id, author}`. Ownership is
    /// enforced by the filter itself, not by a separate read-then-
    /// check. Returns the matched count so callers never mistake a
    /// zero-match for success.
    pub fn update_note(&self, id: &str, author: &str, patch: &NotePatch) -> Result<usize> {
        let mut c = self.0.write();
        let mut matched = 0usize;
        for n in c.notes.iter_mut().filter(|n| n.id == id && n.author == author) {
            if let Some(folder) = &patch.folder {
                n.folder = folder.clone();
            }
            if let Some(title) = &patch.title {
                n.title = title.clone();
            }
            if let Some(content) = &patch.content {
                n.content = content.clone();
            }
            matched += 1;
        }
        Ok(matched)
    }

    pub fn delete_note(&self, id: &str) -> Result<bool> {
        let mut c = self.0.write();
        let before = c.notes.len();
        c.notes.retain(|n| n.id != id);
        Ok(before != c.notes.len())
    }
}
