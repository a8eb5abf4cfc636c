//!
//! Realtime note-sync session
//! --------------------------
//! Per-connection state machine behind `GET /api/notes/socket`. The
//! access gate runs exactly once at upgrade time; from then on the
//! connection is bound to a single authenticated identity which is
//! passed explicitly into every message dispatch. Inbound frames are
//! a closed tagged union (`ping` / `modify` / `create`); malformed or
//! unrecognized frames are answered with an explicit numeric error
//! frame rather than dropped. Close is terminal: reconnecting means a
//! fresh upgrade with fresh authentication.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::model::{NotePatch, User};
use crate::store::SharedStore;

/// Inbound message envelope, dispatched on the `type` tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Keep-alive; no state change.
    Ping,
    /// Apply a `$set` patch to one of the sender's notes. Ownership
    /// is enforced by the store-level `{id, author}` filter, not by a
    /// separate read-then-check.
    Modify { note: NotePatch },
    /// Receipt acknowledgment only. Persistence happens through the
    /// HTTP note-creation path, never through this channel.
    Create,
}

/// Outbound reply for one inbound frame. Failure replies carry the
/// bare numeric status code as text.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Pong,
    Modified,
    Created,
    Error(u16),
}

impl Reply {
    pub fn into_text(self) -> String {
        match self {
            Reply::Pong => r#"{"type": "pong"}"#.to_string(),
            Reply::Modified => "Modified".to_string(),
            Reply::Created => "Created".to_string(),
            Reply::Error(code) => code.to_string(),
        }
    }
}

/// Dispatch one inbound text frame for the session's identity.
/// Every frame gets a reply; rejecting beats silent dropping.
pub fn handle_message(store: &SharedStore, identity: &User, text: &str) -> Reply {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            debug!("rejecting malformed realtime frame: {e}");
            return Reply::Error(400);
        }
    };
    match msg {
        ClientMessage::Ping => Reply::Pong,
        ClientMessage::Modify { note } => {
            match store.update_note(&note.id, &identity.email, &note) {
                // zero rows matched the {id, author} filter: the note
                // is missing or not ours. Never report success here.
                Ok(0) => Reply::Error(404),
                Ok(_) => Reply::Modified,
                Err(e) => {
                    warn!("modify failed for note {}: {e}", note.id);
                    Reply::Error(AppError::Internal(e).http_status().as_u16())
                }
            }
        }
        ClientMessage::Create => Reply::Created,
    }
}

/// Run the open phase of one realtime session until the client
/// disconnects or the idle deadline passes. `idle_timeout` of `None`
/// holds the connection open indefinitely.
pub async fn run_session(
    mut socket: WebSocket,
    identity: User,
    store: SharedStore,
    idle_timeout: Option<Duration>,
) {
    info!("realtime session open for {}", identity.email);
    loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, socket.next()).await {
                Ok(item) => item,
                Err(_) => {
                    info!("realtime session idle timeout for {}", identity.email);
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            None => socket.next().await,
        };
        match next {
            Some(Ok(Message::Text(text))) => {
                let reply = handle_message(&store, &identity, text.as_str());
                if socket.send(Message::Text(reply.into_text().into())).await.is_err() {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => {} // binary/ping/pong frames from the transport layer
            Some(Err(e)) => {
                debug!("realtime session read error for {}: {e}", identity.email);
                break;
            }
        }
    }
    info!("realtime session closed for {}", identity.email);
}
