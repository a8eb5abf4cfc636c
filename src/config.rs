//! Environment-driven runtime configuration.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// Session lifetime; also drives the cookie Max-Age.
    pub session_ttl_days: i64,
    /// Realtime idle deadline in seconds; 0 disables the deadline
    /// and holds connections open indefinitely.
    pub ws_idle_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self { http_port: 7878, session_ttl_days: 30, ws_idle_timeout_secs: 900 }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let d = Config::default();
        Self {
            http_port: env_parse("NOTEWORKS_HTTP_PORT", d.http_port),
            session_ttl_days: env_parse("NOTEWORKS_SESSION_TTL_DAYS", d.session_ttl_days),
            ws_idle_timeout_secs: env_parse("NOTEWORKS_WS_IDLE_TIMEOUT_SECS", d.ws_idle_timeout_secs),
        }
    }

    pub fn ws_idle_timeout(&self) -> Option<Duration> {
        if self.ws_idle_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.ws_idle_timeout_secs))
        }
    }

    pub fn cookie_max_age_secs(&self) -> i64 {
        self.session_ttl_days * 24 * 60 * 60
    }
}
