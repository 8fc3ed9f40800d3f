//! The persisted "current user".
//!
//! One value, written wholesale. Observers (the router, screens) subscribe to a
//! watch channel instead of reading ambient global state.

use std::path::Path;
use std::sync::{Arc, Mutex};

use regatta_common::{User, UserId};
use sled::{Batch, Db, Tree};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Error, Result};

const USER_KEY: &str = "user";
const EMAIL_KEY: &str = "userEmail";

/// Where the session lives between runs.
pub trait SessionBackend: Send + Sync {
    fn load(&self) -> Result<Option<User>>;
    fn save(&self, user: &User) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

/// Session persisted in a sled tree: the JSON user under `user` and a plain
/// copy of the email under `userEmail`.
#[derive(Clone)]
pub struct SledBackend {
    tree: Tree,
}

impl SledBackend {
    /// Every write is flushed explicitly, so no background flusher is started.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::Config::new().path(path.as_ref()).flush_every_ms(None).open()?;
        Self::new(&db)
    }

    pub fn new(db: &Db) -> Result<Self> {
        Ok(Self {
            tree: db.open_tree("session")?,
        })
    }

    /// The plain email copy, kept for consumers that only need the address.
    pub fn stored_email(&self) -> Result<Option<String>> {
        Ok(self.tree.get(EMAIL_KEY)?.map(|v| String::from_utf8_lossy(&v).into_owned()))
    }
}

impl SessionBackend for SledBackend {
    fn load(&self) -> Result<Option<User>> {
        match self.tree.get(USER_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(Error::SessionEncoding)?)),
            None => Ok(None),
        }
    }

    fn save(&self, user: &User) -> Result<()> {
        let mut batch = Batch::default();
        batch.insert(USER_KEY, serde_json::to_vec(user).map_err(Error::SessionEncoding)?);
        batch.insert(EMAIL_KEY, user.email.as_bytes());
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let mut batch = Batch::default();
        batch.remove(USER_KEY);
        batch.remove(EMAIL_KEY);
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        Ok(())
    }
}

/// Keeps the session for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryBackend {
    user: Mutex<Option<User>>,
}

impl SessionBackend for MemoryBackend {
    fn load(&self) -> Result<Option<User>> {
        Ok(self.user.lock().map(|user| (*user).clone()).unwrap_or_default())
    }

    fn save(&self, user: &User) -> Result<()> {
        if let Ok(mut slot) = self.user.lock() {
            *slot = Some(user.clone());
        }
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        if let Ok(mut slot) = self.user.lock() {
            *slot = None;
        }
        Ok(())
    }
}

struct Inner {
    backend: Box<dyn SessionBackend>,
    current: watch::Sender<Option<User>>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Loads whatever session the backend already holds.
    pub fn open(backend: impl SessionBackend + 'static) -> Result<Self> {
        let initial = backend.load()?;
        debug!(authenticated = initial.is_some(), "session loaded");
        let (current, _) = watch::channel(initial);
        Ok(Self {
            inner: Arc::new(Inner {
                backend: Box::new(backend),
                current,
            }),
        })
    }

    pub fn in_memory() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                backend: Box::new(MemoryBackend::default()),
                current,
            }),
        }
    }

    pub fn get(&self) -> Option<User> {
        self.inner.current.borrow().clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.inner.current.borrow().as_ref().map(|u| u.id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.current.borrow().is_some()
    }

    /// Replaces the session. Observers are only notified once the backend
    /// accepted the write.
    pub fn set(&self, user: User) -> Result<()> {
        let mut outcome = Ok(());
        let user_id = user.id.clone();
        self.inner.current.send_if_modified(|current| match self.inner.backend.save(&user) {
            Ok(()) => {
                *current = Some(user);
                true
            }
            Err(err) => {
                outcome = Err(err);
                false
            }
        });
        if outcome.is_ok() {
            info!(user_id = %user_id, "session stored");
        }
        outcome
    }

    pub fn clear(&self) -> Result<()> {
        let mut outcome = Ok(());
        self.inner.current.send_if_modified(|current| match self.inner.backend.remove() {
            Ok(()) => current.take().is_some(),
            Err(err) => {
                outcome = Err(err);
                false
            }
        });
        if outcome.is_ok() {
            info!("session cleared");
        }
        outcome
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.inner.current.subscribe()
    }
}
