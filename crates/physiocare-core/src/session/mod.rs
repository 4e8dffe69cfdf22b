//! Durable, observable session store.
//!
//! The session tuple lives in the `preferences` table and is mirrored in a
//! watch channel. Every write lands in one SQLite transaction and is then
//! published as a whole tuple, so observers never see a partial session.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use physiocare_claims::parse_claims;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::db::{Database, DbError};
use crate::models::{Role, SessionData};

pub const TOKEN_KEY: &str = "token";
pub const USERNAME_KEY: &str = "username";
pub const USER_ID_KEY: &str = "user_id";
pub const ROLE_KEY: &str = "role";

const SESSION_KEYS: [&str; 4] = [TOKEN_KEY, USERNAME_KEY, USER_ID_KEY, ROLE_KEY];

/// Deletes every session key and nothing else.
const CLEARED: [(&str, Option<&str>); 4] = [
    (TOKEN_KEY, None),
    (USERNAME_KEY, None),
    (USER_ID_KEY, None),
    (ROLE_KEY, None),
];

/// Session store errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("Session store lock poisoned")]
    Poisoned,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Stream of session snapshots.
pub type SessionStream = BoxStream<'static, SessionData>;

/// Handle over the persisted session.
///
/// Components receive this as `Arc<dyn SessionStore>`; there is no global
/// instance.
pub trait SessionStore: Send + Sync {
    /// Emit the current session, then every subsequent change.
    fn observe_session(&self) -> SessionStream;

    /// Persist all four fields at once.
    fn save_session(
        &self,
        token: &str,
        username: &str,
        user_id: &str,
        role: Option<Role>,
    ) -> SessionResult<()>;

    /// Remove all four fields at once. Other preferences are kept.
    fn clear_session(&self) -> SessionResult<()>;

    /// Latest session snapshot.
    fn current(&self) -> SessionData;

    /// Token projection of [`SessionStore::observe_session`].
    fn current_token(&self) -> BoxStream<'static, Option<String>> {
        self.observe_session().map(|session| session.token).boxed()
    }
}

/// [`SessionStore`] backed by the local preferences table.
pub struct PreferenceSessionStore {
    db: Mutex<Database>,
    sender: watch::Sender<SessionData>,
}

impl PreferenceSessionStore {
    /// Wrap an open database, loading any persisted session.
    ///
    /// A token whose `exp` claim has passed is dropped and the store starts
    /// signed out. Tokens without readable claims are kept as they are.
    pub fn new(mut db: Database) -> Self {
        let initial = load_session(&mut db, Utc::now().timestamp());
        let (sender, _) = watch::channel(initial);
        Self {
            db: Mutex::new(db),
            sender,
        }
    }

    /// Open the store at a database path.
    pub fn open<P: AsRef<Path>>(path: P) -> SessionResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    /// In-memory store (for testing).
    pub fn open_in_memory() -> SessionResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Raw watch receiver, for callers that want `changed()` semantics.
    pub fn subscribe(&self) -> watch::Receiver<SessionData> {
        self.sender.subscribe()
    }
}

impl SessionStore for PreferenceSessionStore {
    fn observe_session(&self) -> SessionStream {
        watch_stream(self.sender.subscribe())
    }

    fn save_session(
        &self,
        token: &str,
        username: &str,
        user_id: &str,
        role: Option<Role>,
    ) -> SessionResult<()> {
        let mut db = self.db.lock().map_err(|_| SessionError::Poisoned)?;
        db.put_preferences(&[
            (TOKEN_KEY, Some(token)),
            (USERNAME_KEY, Some(username)),
            (USER_ID_KEY, Some(user_id)),
            (ROLE_KEY, role.as_ref().map(Role::as_str)),
        ])?;

        // Publish while holding the lock so publish order matches write order.
        self.sender.send_replace(SessionData {
            token: Some(token.to_string()),
            username: Some(username.to_string()),
            user_id: Some(user_id.to_string()),
            role,
        });
        info!(username, role = ?role, "session saved");
        Ok(())
    }

    fn clear_session(&self) -> SessionResult<()> {
        let mut db = self.db.lock().map_err(|_| SessionError::Poisoned)?;
        db.put_preferences(&CLEARED)?;
        self.sender.send_replace(SessionData::default());
        info!("session cleared");
        Ok(())
    }

    fn current(&self) -> SessionData {
        self.sender.borrow().clone()
    }
}

/// Read the persisted tuple, failing closed to an empty session.
fn load_session(db: &mut Database, now: i64) -> SessionData {
    let session = match db.get_preferences(&SESSION_KEYS) {
        Ok(mut values) => SessionData {
            token: values.remove(TOKEN_KEY),
            username: values.remove(USERNAME_KEY),
            user_id: values.remove(USER_ID_KEY),
            role: values.remove(ROLE_KEY).and_then(|r| Role::parse(&r)),
        },
        Err(e) => {
            warn!(error = %e, "could not read persisted session, starting signed out");
            return SessionData::default();
        }
    };

    if session.token.as_deref().is_some_and(|t| token_expired(t, now)) {
        info!(username = ?session.username, "persisted session expired, starting signed out");
        if let Err(e) = db.put_preferences(&CLEARED) {
            warn!(error = %e, "could not remove expired session");
        }
        return SessionData::default();
    }
    session
}

fn token_expired(token: &str, now: i64) -> bool {
    parse_claims(token)
        .map(|claims| claims.is_expired_at(now))
        .unwrap_or(false)
}

/// Turn a watch receiver into a stream that yields the current value first.
///
/// The stream ends once the sender is dropped.
pub(crate) fn watch_stream<T>(receiver: watch::Receiver<T>) -> BoxStream<'static, T>
where
    T: Clone + Send + Sync + 'static,
{
    stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first {
            receiver.changed().await.ok()?;
        }
        let value = receiver.borrow_and_update().clone();
        Some((value, (receiver, false)))
    })
    .boxed()
}
