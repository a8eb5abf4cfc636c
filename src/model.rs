//! Core data model: users, sessions, folders, notes, and the wire
//! payloads accepted from clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Folder name a note lands in when the client did not pick one.
pub const ROOT_FOLDER: &str = "root";

/// A registered user. The password hash never leaves the process:
/// it is skipped on every outward serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// A session record binding an opaque token to an email for a bounded
/// window. One active session per email: a second login overwrites
/// the prior token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub author: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub author: String,
    pub folder: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// One folder group in the notes listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNotes {
    pub name: String,
    pub notes: Vec<Note>,
}

/// Client-supplied note fields. `author` is never taken from here;
/// it is forced server-side from the authenticated identity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteDraft {
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// `$set`-style patch applied by the realtime `modify` message.
/// Only present fields are written; the id is the filter key, never
/// a settable field.
#[derive(Debug, Clone, Deserialize)]
pub struct NotePatch {
    pub id: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupPayload {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}
