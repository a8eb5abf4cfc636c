//! Session manager: mints opaque bearer tokens, persists
//! token -> identity bindings with expiry, validates and invalidates
//! them against the shared store.

use anyhow::{anyhow, Result};
use base64::Engine;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::model::{Session, User};
use crate::store::SharedStore;

/// Outcome of resolving a presented token.
#[derive(Debug)]
pub enum Resolution {
    Authenticated(User),
    /// Token was found but past its expiry; the record has been
    /// deleted and the caller should clear its stored credential.
    Expired,
    Anonymous,
}

fn gen_token() -> Result<String> {
    // 256-bit random token, base64url without padding. The token is
    // the sole bearer credential, so an RNG failure must surface
    // instead of minting a predictable value.
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| anyhow!(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

#[derive(Clone)]
pub struct SessionManager {
    store: SharedStore,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: SharedStore, ttl_days: i64) -> Self {
        Self { store, ttl: Duration::days(ttl_days) }
    }

    /// Mint a token for the email and persist the binding, replacing
    /// any prior session for that email (logging in on a second
    /// device invalidates the first device's session). Persist
    /// failures propagate to the caller; no internal retry.
    pub fn create(&self, email: &str) -> Result<String> {
        let token = gen_token()?;
        self.store.upsert_session(Session {
            email: email.to_string(),
            token: token.clone(),
            expires_at: Utc::now() + self.ttl,
        })?;
        info!("session.create email={}", email);
        Ok(token)
    }

    /// Resolve a token to an identity. Fail closed: any store
    /// failure collapses to `Anonymous`.
    pub fn resolve(&self, token: &str) -> Resolution {
        let session = match self.store.find_session_by_token(token) {
            Ok(Some(s)) => s,
            Ok(None) => return Resolution::Anonymous,
            Err(e) => {
                warn!("session lookup failed: {e}");
                return Resolution::Anonymous;
            }
        };
        if session.expires_at <= Utc::now() {
            if let Err(e) = self.store.delete_sessions_by_email(&session.email) {
                warn!("expired session cleanup failed: {e}");
            }
            return Resolution::Expired;
        }
        match self.store.find_user_by_email(&session.email) {
            Ok(Some(user)) => Resolution::Authenticated(user),
            Ok(None) => Resolution::Anonymous,
            Err(e) => {
                warn!("user lookup failed: {e}");
                Resolution::Anonymous
            }
        }
    }

    /// Delete every session for the email. Defensive filtered
    /// delete: removes residual duplicates too.
    pub fn invalidate(&self, email: &str) -> Result<usize> {
        let n = self.store.delete_sessions_by_email(email)?;
        info!("session.invalidate email={} removed={}", email, n);
        Ok(n)
    }
}
