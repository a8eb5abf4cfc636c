//! Access gate: resolves an inbound request's session cookie to an
//! authenticated identity, or rejects it before any other side
//! effect runs.

use axum::http::HeaderMap;

use super::session::{Resolution, SessionManager};
use crate::model::User;

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(User),
    /// `expired` tells the HTTP layer to also clear the stale cookie.
    Denied { expired: bool },
}

#[derive(Clone)]
pub struct AccessGate {
    sessions: SessionManager,
}

impl AccessGate {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> AuthOutcome {
        let Some(token) = parse_cookie(headers, SESSION_COOKIE) else {
            return AuthOutcome::Denied { expired: false };
        };
        match self.sessions.resolve(&token) {
            Resolution::Authenticated(user) => AuthOutcome::Authenticated(user),
            Resolution::Expired => AuthOutcome::Denied { expired: true },
            Resolution::Anonymous => AuthOutcome::Denied { expired: false },
        }
    }
}

pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SharedStore;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn parse_cookie_finds_named_pair() {
        let h = headers_with_cookie("theme=dark; session=tok123; other=1");
        assert_eq!(parse_cookie(&h, SESSION_COOKIE).as_deref(), Some("tok123"));
        assert_eq!(parse_cookie(&h, "missing"), None);
        assert_eq!(parse_cookie(&HeaderMap::new(), SESSION_COOKIE), None);
    }

    #[test]
    fn gate_denies_without_cookie_and_with_bad_token() {
        let store = SharedStore::new();
        let gate = AccessGate::new(SessionManager::new(store, 30));
        assert!(matches!(
            gate.authenticate(&HeaderMap::new()),
            AuthOutcome::Denied { expired: false }
        ));
        let h = headers_with_cookie("session=unknown");
        assert!(matches!(gate.authenticate(&h), AuthOutcome::Denied { expired: false }));
    }

    #[test]
    fn gate_authenticates_valid_token() {
        let store = SharedStore::new();
        store
            .insert_user_if_absent(crate::model::User {
                id: "u1".into(),
                name: "A".into(),
                email: "a@x.com".into(),
                password_hash: "phc".into(),
            })
            .unwrap();
        let sm = SessionManager::new(store, 30);
        let token = sm.create("a@x.com").unwrap();
        let gate = AccessGate::new(sm);
        let h = headers_with_cookie(&format!("session={token}"));
        match gate.authenticate(&h) {
            AuthOutcome::Authenticated(u) => assert_eq!(u.email, "a@x.com"),
            other => panic!("expected authenticated, got {other:?}"),
        }
    }
}
