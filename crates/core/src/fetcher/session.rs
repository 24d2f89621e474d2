//! Cookie session scoped to a single fetch cycle.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;

/// How the session was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// No warm-up or login succeeded; only the API key authenticates.
    Anonymous,
    /// Warm-up request against the bare host succeeded.
    WarmedUp,
    /// Dashboard login with the admin password succeeded.
    Authenticated,
}

/// Opaque session handle.
///
/// Owns the cookie jar that the transport reads and writes. A new session is
/// created for every fetch cycle and dropped with it.
#[derive(Debug, Clone)]
pub struct Session {
    jar: Arc<Jar>,
    kind: SessionKind,
}

impl Session {
    pub fn new() -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            kind: SessionKind::Anonymous,
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub(crate) fn with_kind(mut self, kind: SessionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Whether the jar holds any cookie that would be sent to `url`.
    pub fn has_cookies_for(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|url| self.jar.cookies(&url))
            .is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
