//! Headless screen controllers.
//!
//! Each controller owns the state one screen renders, calls into
//! [`crate::client`], and reports failures through [`Alerts`]. On failure the
//! state it already holds is left alone. Nothing here outlives the screen:
//! every mount fetches from scratch.

mod auth;
mod chat;
mod events;
mod friends;
mod groups;
mod profile;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use regatta_common::{User, UserId};
use tokio::sync::watch;

use crate::alerts::Alerts;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::poll::{PollScope, PollState};
use crate::session::{SessionStore, SledBackend};
use crate::Api;

pub use auth::{LoginScreen, SignupScreen};
pub use chat::{ChatListScreen, ChatScreen, GroupChatScreen};
pub use events::{CreateEventScreen, EventDetailsScreen, EventsScreen, UserSelectionScreen};
pub use friends::{FriendRequestsScreen, FriendshipState, UserDetailScreen};
pub use groups::{AddUsersScreen, CreateGroupScreen};
pub use profile::{HomeScreen, MyProfileScreen, ProfileScreen};

/// What every screen needs: the API, the session and somewhere to put alerts.
#[derive(Clone)]
pub struct AppContext {
    pub api: Api,
    pub session: SessionStore,
    pub alerts: Alerts,
    pub poll_interval: Duration,
}

impl AppContext {
    pub fn new(api: Api, session: SessionStore, alerts: Alerts, poll_interval: Duration) -> Self {
        Self { api, session, alerts, poll_interval }
    }

    /// Opens the persisted session under `config.session_dir`.
    pub fn from_config(config: &Config, alerts: Alerts) -> Result<Self> {
        let session = SessionStore::open(SledBackend::open(&config.session_dir)?)?;
        Ok(Self::new(Api::new(config.api_base.clone()), session, alerts, config.poll_interval))
    }

    pub fn current_user(&self) -> Result<User> {
        self.session.get().ok_or(Error::NotLoggedIn)
    }

    pub fn current_user_id(&self) -> Result<UserId> {
        self.session.user_id().ok_or(Error::NotLoggedIn)
    }

    /// Absolute address of an image path returned by the API.
    pub fn image_url(&self, path: &str) -> String {
        self.api.base().asset(path)
    }

    pub fn logout(&self) -> Result<()> {
        self.alerts.surface(self.session.clear())
    }
}

/// A list kept fresh by a polling loop. Every successful fetch replaces the
/// whole list; identical refetches do not notify observers.
pub struct LiveList<T> {
    items: Arc<watch::Sender<Vec<T>>>,
    poll: watch::Receiver<PollState>,
}

impl<T> LiveList<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) fn mount<F, Fut>(scope: &mut PollScope, label: &'static str, interval: Duration, fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
    {
        let (items, _) = watch::channel(Vec::new());
        let items = Arc::new(items);
        let sink = items.clone();
        let poll = scope.spawn(label, interval, fetch, move |fresh| {
            replace(&sink, fresh);
        });
        Self { items, poll }
    }

    /// Applies an out-of-band fetch, unless the screen is already gone.
    pub(crate) fn apply(&self, fresh: Vec<T>) -> bool {
        if self.is_mounted() {
            replace(&self.items, fresh)
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.items.subscribe()
    }

    pub fn poll_state(&self) -> PollState {
        *self.poll.borrow()
    }

    pub fn is_mounted(&self) -> bool {
        self.poll_state() != PollState::Stopped
    }
}

fn replace<T: PartialEq>(items: &watch::Sender<Vec<T>>, fresh: Vec<T>) -> bool {
    items.send_if_modified(|current| {
        if *current == fresh {
            false
        } else {
            *current = fresh;
            true
        }
    })
}

/// Ids picked from a list, in the order they were picked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<UserId>,
}

impl Selection {
    pub fn toggle(&mut self, id: &UserId) {
        if let Some(pos) = self.ids.iter().position(|picked| picked == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.clone());
        }
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &[UserId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
