//! Folder/note repository adapter. Enforces ownership and the
//! implicit-folder-creation invariant on top of the raw store.

use anyhow::anyhow;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::model::{FolderNotes, Note, NoteDraft, User, ROOT_FOLDER};
use crate::store::SharedStore;

#[derive(Clone)]
pub struct NoteRepository {
    store: SharedStore,
}

impl NoteRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All of the identity's folders with their notes, in store
    /// order. A folder with zero notes still appears with an empty
    /// list. Two nested non-transactional reads; no atomicity across
    /// folders.
    pub fn list_by_owner(&self, identity: &User) -> AppResult<Vec<FolderNotes>> {
        let folders = self.store.folders_by_author(&identity.email)?;
        let mut groups = Vec::with_capacity(folders.len());
        for folder in folders {
            let notes = self
                .store
                .notes_by_author_and_folder(&identity.email, &folder.name)?;
            groups.push(FolderNotes { name: folder.name, notes });
        }
        Ok(groups)
    }

    /// Persist a draft note for the identity. The author is always
    /// set server-side; an empty folder falls back to "root". The
    /// folder record is upserted before the note so a note never
    /// references a nonexistent folder.
    pub fn create_note(&self, identity: &User, draft: NoteDraft) -> AppResult<Note> {
        let folder = if draft.folder.is_empty() { ROOT_FOLDER.to_string() } else { draft.folder };
        self.store.upsert_folder_if_absent(&folder, &identity.email)?;

        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            author: identity.email.clone(),
            folder,
            title: draft.title,
            content: draft.content,
        };
        self.store.insert_note(note.clone())?;

        // Re-fetch by id: return what the store actually persisted,
        // not what we sent it.
        match self.store.find_note(&note.id)? {
            Some(stored) => Ok(stored),
            None => {
                error!("inserted note {} not found on re-fetch", note.id);
                Err(AppError::Internal(anyhow!("inserted note missing")))
            }
        }
    }

    /// Delete a note owned by the identity, returning the deleted
    /// id. A missing note and a non-owned note both answer
    /// Unauthorized so status codes never leak existence.
    pub fn delete_note(&self, identity: &User, id: &str) -> AppResult<String> {
        let note = self.store.find_note(id)?;
        match note {
            Some(n) if n.author == identity.email => {
                if self.store.delete_note(&n.id)? {
                    Ok(n.id)
                } else {
                    Err(AppError::NotFound)
                }
            }
            _ => Err(AppError::Unauthorized),
        }
    }
}
