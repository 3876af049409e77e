//! Per-session request serialization.
//!
//! Handlers read the session snapshot, mutate it, and the session layer saves
//! the record after the handler returns. Two overlapping requests carrying
//! the same session cookie would each save their own snapshot and the later
//! save would drop the earlier mutation. This middleware wraps the session
//! layer and holds a lock keyed by the session cookie until the response
//! (and so the save) is complete.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tower_sessions::cookie::Cookie;

use super::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

/// Async locks keyed by session cookie value.
///
/// Entries are created on demand and removed once the last holder or waiter
/// lets go, so the map only holds sessions with requests in flight.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of the session identified by `key`.
    pub async fn acquire(&self, key: String) -> SessionLockGuard<'_> {
        let lock = self
            .locks
            .lock()
            .ok()
            .map(|mut locks| locks.entry(key.clone()).or_default().clone());

        // Built before waiting so a cancelled wait still prunes the entry
        let mut held = SessionLockGuard {
            locks: self,
            key,
            guard: None,
        };
        match lock {
            Some(lock) => held.guard = Some(lock.lock_owned().await),
            None => tracing::warn!("Session lock table poisoned; request runs unserialized"),
        }
        held
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map_or(0, |locks| locks.len())
    }
}

/// Releases the session lock and prunes the entry when dropped.
pub struct SessionLockGuard<'a> {
    locks: &'a SessionLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        if let Ok(mut locks) = self.locks.locks.lock() {
            // Waiters hold a clone of the Arc; keep the entry for them
            if locks
                .get(&self.key)
                .is_some_and(|lock| Arc::strong_count(lock) == 1)
            {
                locks.remove(&self.key);
            }
        }
    }
}

/// Middleware that runs requests for the same session one at a time.
///
/// Requests without a session cookie get a fresh session and are not
/// serialized.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(session_key) = session_cookie(&request) else {
        return next.run(request).await;
    };

    let _guard = state.session_locks().acquire(session_key).await;
    next.run(request).await
}

/// Value of the session cookie, if the request carries one.
fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use tokio::time::timeout;

    use super::*;

    const WAIT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_same_session_waits_for_release() {
        let locks = SessionLocks::new();

        let first = locks.acquire("abc".to_owned()).await;
        assert!(timeout(WAIT, locks.acquire("abc".to_owned())).await.is_err());

        drop(first);
        let second = timeout(WAIT, locks.acquire("abc".to_owned())).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_other_sessions_are_not_blocked() {
        let locks = SessionLocks::new();

        let _first = locks.acquire("abc".to_owned()).await;
        assert!(timeout(WAIT, locks.acquire("xyz".to_owned())).await.is_ok());
    }

    #[tokio::test]
    async fn test_entries_are_pruned() {
        let locks = SessionLocks::new();

        let first = locks.acquire("abc".to_owned()).await;
        let second = locks.acquire("xyz".to_owned()).await;
        assert_eq!(locks.len(), 2);

        drop(first);
        drop(second);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_session_cookie_is_found_among_others() {
        let request = Request::builder()
            .header(header::COOKIE, format!("theme=dark; {SESSION_COOKIE_NAME}=s3ss10n"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_cookie(&request).as_deref(), Some("s3ss10n"));

        let request = Request::builder()
            .header(header::COOKIE, "theme=dark")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_cookie(&request), None);
    }
}
