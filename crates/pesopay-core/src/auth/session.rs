use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::UserProfile;
use crate::store::{SecureStore, StoreResult};

/// Secure-store key holding the serialized session record
const SESSION_KEY: &str = "session";

/// Fixed session lifetime in hours.
/// Every successful authentication stamps expiry this far from issuance;
/// server-provided expiry metadata is ignored and token claims are never
/// parsed.
const SESSION_TTL_HOURS: i64 = 24;

/// The persisted session: bearer token, expiry instant, and the last
/// profile the backend returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: Option<UserProfile>,
}

impl SessionRecord {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

struct SessionInner {
    record: RwLock<Option<SessionRecord>>,
    store: Arc<dyn SecureStore>,
}

impl SessionInner {
    fn read(&self) -> RwLockReadGuard<'_, Option<SessionRecord>> {
        self.record.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SessionRecord>> {
        self.record.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lazy invalidation: the token resolves only while unexpired. An
    /// elapsed record is fully cleared as a side effect of the read; there
    /// is no background sweep.
    fn current_token(&self) -> Option<String> {
        {
            let guard = self.read();
            match guard.as_ref() {
                None => return None,
                Some(record) if !record.is_expired() => {
                    return Some(record.token.clone());
                }
                Some(_) => {}
            }
        }

        debug!("session expired, clearing");
        self.clear();
        None
    }

    fn clear(&self) {
        *self.write() = None;
        if let Err(e) = self.store.delete(SESSION_KEY) {
            warn!(error = %e, "Failed to remove persisted session");
        }
    }
}

/// Owning session handle.
///
/// Only the auth session manager holds one of these; mutation goes through
/// it exclusively. Everything else reads via a [`SessionWatch`].
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                record: RwLock::new(None),
                store,
            }),
        }
    }

    /// Restore a previously persisted session record, if any.
    ///
    /// The record is restored as-is; an elapsed expiry is not swept here,
    /// the first read that observes it clears the session. Returns whether
    /// a record was found.
    pub fn load(&self) -> StoreResult<bool> {
        match self.inner.store.get_json::<SessionRecord>(SESSION_KEY)? {
            Some(record) => {
                debug!(expired = record.is_expired(), "Restored persisted session");
                *self.inner.write() = Some(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Install a freshly issued token, stamping expiry at now + 24h.
    ///
    /// The in-memory record is updated even when persistence fails, so a
    /// flaky keychain degrades to a process-lifetime session.
    pub fn set_session(&self, token: String, user: Option<UserProfile>) -> StoreResult<()> {
        let record = SessionRecord {
            token,
            expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
            user,
        };

        *self.inner.write() = Some(record.clone());
        self.inner.store.set_json(SESSION_KEY, &record)
    }

    /// Replace the cached profile wholesale and re-persist the record.
    /// No-op when logged out.
    pub fn set_user(&self, user: UserProfile) -> StoreResult<()> {
        let updated = {
            let mut guard = self.inner.write();
            match guard.as_mut() {
                Some(record) => {
                    record.user = Some(user);
                    record.clone()
                }
                None => return Ok(()),
            }
        };

        self.inner.store.set_json(SESSION_KEY, &updated)
    }

    /// Drop the session from memory and from the secure store.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Read-side handle for the HTTP client and other consumers.
    pub fn watch(&self) -> SessionWatch {
        SessionWatch {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn current_token(&self) -> Option<String> {
        self.inner.current_token()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_token().is_some()
    }

    /// The cached profile, subject to the same lazy expiry as the token.
    pub fn user_profile(&self) -> Option<UserProfile> {
        self.current_token()?;
        self.inner.read().as_ref().and_then(|r| r.user.clone())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().as_ref().map(|r| r.expires_at)
    }
}

/// Read-only view of the session, plus the conservative invalidation the
/// response interceptor needs. Cannot install a session: the owning
/// [`Session`] handle is the single writer.
#[derive(Clone)]
pub struct SessionWatch {
    inner: Arc<SessionInner>,
}

impl SessionWatch {
    /// The bearer token, only while unexpired. See [`Session`] docs for
    /// the lazy-invalidation side effect.
    pub fn current_token(&self) -> Option<String> {
        self.inner.current_token()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_token().is_some()
    }

    /// Expiry instant of the current record, if any. Reported as-is even
    /// when already elapsed; use [`current_token`](Self::current_token) for
    /// validity.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().as_ref().map(|r| r.expires_at)
    }

    /// Unconditionally drop the session. Used on 401 responses; coarse by
    /// policy - a single unauthorized response invalidates everything.
    pub fn invalidate(&self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_user() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            name: "Maria Santos".to_string(),
            email: "maria@example.com".to_string(),
            role: None,
            created_at: None,
        }
    }

    fn session() -> Session {
        Session::new(Arc::new(MemoryStore::new()))
    }

    fn expire(session: &Session) {
        let mut guard = session.inner.write();
        if let Some(record) = guard.as_mut() {
            record.expires_at = Utc::now() - Duration::milliseconds(1);
        }
    }

    #[test]
    fn set_session_stamps_24h_expiry() {
        let session = session();
        session
            .set_session("tok".to_string(), Some(test_user()))
            .unwrap();

        let expires_at = session.expires_at().unwrap();
        let expected = Utc::now() + Duration::hours(24);
        let delta = (expires_at - expected).num_milliseconds().abs();
        assert!(delta < 1000, "expiry off by {delta}ms");
    }

    #[test]
    fn expired_token_reads_absent_and_clears() {
        let session = session();
        session.set_session("tok".to_string(), None).unwrap();
        expire(&session);

        assert_eq!(session.current_token(), None);
        // The read cleared the whole record, not just the token
        assert!(session.inner.read().is_none());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn expiry_one_ms_in_past_is_absent() {
        let session = session();
        session.set_session("tok".to_string(), None).unwrap();
        expire(&session);

        let watch = session.watch();
        assert_eq!(watch.current_token(), None);
    }

    #[test]
    fn valid_token_resolves_through_watch() {
        let session = session();
        session
            .set_session("tok".to_string(), Some(test_user()))
            .unwrap();

        let watch = session.watch();
        assert_eq!(watch.current_token().as_deref(), Some("tok"));
        assert!(watch.is_logged_in());
    }

    #[test]
    fn invalidate_clears_memory_and_store() {
        let store: Arc<dyn SecureStore> = Arc::new(MemoryStore::new());
        let session = Session::new(Arc::clone(&store));
        session.set_session("tok".to_string(), None).unwrap();

        session.watch().invalidate();

        assert!(!session.is_logged_in());
        let persisted: Option<SessionRecord> = store.get_json(SESSION_KEY).unwrap();
        assert!(persisted.is_none());
    }

    #[test]
    fn load_restores_persisted_record() {
        let store: Arc<dyn SecureStore> = Arc::new(MemoryStore::new());

        let first = Session::new(Arc::clone(&store));
        first
            .set_session("tok".to_string(), Some(test_user()))
            .unwrap();

        let second = Session::new(Arc::clone(&store));
        assert!(second.load().unwrap());
        assert_eq!(second.current_token().as_deref(), Some("tok"));
        assert_eq!(second.user_profile().unwrap().email, "maria@example.com");
    }

    #[test]
    fn load_keeps_expired_record_until_first_read() {
        let store: Arc<dyn SecureStore> = Arc::new(MemoryStore::new());
        let record = SessionRecord {
            token: "stale".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
            user: None,
        };
        store.set_json(SESSION_KEY, &record).unwrap();

        let session = Session::new(Arc::clone(&store));
        assert!(session.load().unwrap());

        // First read observes the elapsed expiry, clears, returns absent
        assert_eq!(session.current_token(), None);
        assert!(store.get_json::<SessionRecord>(SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn set_user_overwrites_profile_wholesale() {
        let session = session();
        session
            .set_session("tok".to_string(), Some(test_user()))
            .unwrap();

        let mut renamed = test_user();
        renamed.name = "Maria S. Cruz".to_string();
        session.set_user(renamed).unwrap();

        assert_eq!(session.user_profile().unwrap().name, "Maria S. Cruz");
    }

    #[test]
    fn set_user_is_noop_when_logged_out() {
        let session = session();
        session.set_user(test_user()).unwrap();
        assert_eq!(session.user_profile(), None);
    }
}
