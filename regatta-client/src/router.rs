//! Session-gated navigation.
//!
//! Which routes exist is a pure function of whether a session is present. The
//! router follows the [`SessionStore`] through its watch channel; when the route
//! set flips (login, logout) the whole stack is torn down, which drops every
//! mounted screen's [`PollScope`] and so stops its loops.

use regatta_common::User;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

use crate::poll::PollScope;
use crate::session::SessionStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Home,
    Tabs,
    MyProfile,
    Profile,
    FriendRequests,
    UserDetail,
    CreateEvent,
    ChatsList,
    Chat,
    CreateGroup,
    GroupChat,
    EventDetails,
    UserSelection,
    AddUsers,
}

const UNAUTHENTICATED: &[Route] = &[Route::Login, Route::Signup];

const AUTHENTICATED: &[Route] = &[
    Route::Home,
    Route::Tabs,
    Route::MyProfile,
    Route::Profile,
    Route::FriendRequests,
    Route::UserDetail,
    Route::CreateEvent,
    Route::ChatsList,
    Route::Chat,
    Route::CreateGroup,
    Route::GroupChat,
    Route::EventDetails,
    Route::UserSelection,
    Route::AddUsers,
];

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Signup => "Signup",
            Route::Home => "Home",
            Route::Tabs => "TabsNavigator",
            Route::MyProfile => "MyProfileScreen",
            Route::Profile => "ProfileScreen",
            Route::FriendRequests => "FriendRequestsScreen",
            Route::UserDetail => "UserDetail",
            Route::CreateEvent => "CreateEventScreen",
            Route::ChatsList => "ChatsListScreen",
            Route::Chat => "ChatScreen",
            Route::CreateGroup => "CreateGroupScreen",
            Route::GroupChat => "GroupChatScreen",
            Route::EventDetails => "EventDetailsScreen",
            Route::UserSelection => "UserSelectionScreen",
            Route::AddUsers => "AddUsersScreen",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteSet {
    Unauthenticated,
    Authenticated,
}

impl RouteSet {
    pub fn for_session(user: Option<&User>) -> Self {
        match user {
            Some(_) => RouteSet::Authenticated,
            None => RouteSet::Unauthenticated,
        }
    }

    pub fn routes(&self) -> &'static [Route] {
        match self {
            RouteSet::Unauthenticated => UNAUTHENTICATED,
            RouteSet::Authenticated => AUTHENTICATED,
        }
    }

    pub fn contains(&self, route: Route) -> bool {
        self.routes().contains(&route)
    }

    pub fn initial(&self) -> Route {
        self.routes()[0]
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{} is not reachable while {:?}", .route.name(), .set)]
pub struct Unreachable {
    pub route: Route,
    pub set: RouteSet,
}

struct Mounted {
    route: Route,
    scope: PollScope,
}

impl Mounted {
    fn new(route: Route) -> Self {
        Self { route, scope: PollScope::new() }
    }
}

pub struct Router {
    session: watch::Receiver<Option<User>>,
    set: RouteSet,
    stack: Vec<Mounted>,
}

impl Router {
    pub fn new(session: &SessionStore) -> Self {
        let mut session = session.subscribe();
        let set = RouteSet::for_session(session.borrow_and_update().as_ref());
        Self {
            session,
            set,
            stack: vec![Mounted::new(set.initial())],
        }
    }

    pub fn route_set(&mut self) -> RouteSet {
        self.sync();
        self.set
    }

    pub fn current(&mut self) -> Route {
        self.sync();
        self.top().route
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Mounts `route` on top of the stack and hands back its poll scope.
    pub fn navigate(&mut self, route: Route) -> Result<&mut PollScope, Unreachable> {
        self.sync();
        if !self.set.contains(route) {
            return Err(Unreachable { route, set: self.set });
        }
        self.stack.push(Mounted::new(route));
        Ok(&mut self.top_mut().scope)
    }

    /// The scope of the screen currently on top.
    pub fn scope(&mut self) -> &mut PollScope {
        self.sync();
        &mut self.top_mut().scope
    }

    /// Unmounts the top screen. The root of the set stays mounted.
    pub fn back(&mut self) -> Option<Route> {
        self.sync();
        if self.stack.len() <= 1 {
            return None;
        }
        self.stack.pop().map(|mounted| mounted.route)
    }

    /// Applies a pending session change. Returns whether the route set flipped.
    pub fn sync(&mut self) -> bool {
        if !self.session.has_changed().unwrap_or(false) {
            return false;
        }
        let next = RouteSet::for_session(self.session.borrow_and_update().as_ref());
        if next == self.set {
            return false;
        }
        info!(from = ?self.set, to = ?next, unmounted = self.stack.len(), "route set changed");
        self.set = next;
        self.stack.clear();
        self.stack.push(Mounted::new(next.initial()));
        true
    }

    /// Waits until the session flips the route set. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<RouteSet> {
        loop {
            if self.sync() {
                return Some(self.set);
            }
            self.session.changed().await.ok()?;
        }
    }

    fn top(&self) -> &Mounted {
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Mounted {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::{PollState, DEFAULT_INTERVAL};
    use regatta_common::UserId;

    fn sailor() -> User {
        User { id: UserId::from(1), username: String::from("malek"), ..Default::default() }
    }

    #[test]
    fn unauthenticated_set_is_login_and_signup() {
        let store = SessionStore::in_memory();
        let mut router = Router::new(&store);
        assert_eq!(router.route_set(), RouteSet::Unauthenticated);
        assert_eq!(router.current(), Route::Login);
        assert!(router.navigate(Route::Signup).is_ok());
        assert_eq!(
            router.navigate(Route::Chat).unwrap_err(),
            Unreachable { route: Route::Chat, set: RouteSet::Unauthenticated }
        );
    }

    #[test]
    fn login_flips_to_authenticated_set() {
        let store = SessionStore::in_memory();
        let mut router = Router::new(&store);
        router.navigate(Route::Signup).unwrap();
        store.set(sailor()).unwrap();
        assert_eq!(router.route_set(), RouteSet::Authenticated);
        assert_eq!(router.current(), Route::Home);
        assert_eq!(router.depth(), 1);
        assert!(router.navigate(Route::ChatsList).is_ok());
        assert!(router.navigate(Route::Login).is_err());
    }

    #[test]
    fn back_keeps_the_root() {
        let store = SessionStore::in_memory();
        store.set(sailor()).unwrap();
        let mut router = Router::new(&store);
        router.navigate(Route::ChatsList).unwrap();
        router.navigate(Route::Chat).unwrap();
        assert_eq!(router.back(), Some(Route::Chat));
        assert_eq!(router.back(), Some(Route::ChatsList));
        assert_eq!(router.back(), None);
        assert_eq!(router.current(), Route::Home);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_stops_loops_of_mounted_screens() {
        let store = SessionStore::in_memory();
        store.set(sailor()).unwrap();
        let mut router = Router::new(&store);
        let mut state = router
            .navigate(Route::Chat)
            .unwrap()
            .spawn("chat", DEFAULT_INTERVAL, || async { Ok(()) }, |_| {});

        store.clear().unwrap();
        assert_eq!(router.changed().await, Some(RouteSet::Unauthenticated));
        assert_eq!(router.current(), Route::Login);
        state.wait_for(|s| *s == PollState::Stopped).await.unwrap();
    }

    #[test]
    fn rewriting_the_same_session_keeps_the_stack() {
        let store = SessionStore::in_memory();
        store.set(sailor()).unwrap();
        let mut router = Router::new(&store);
        router.navigate(Route::Profile).unwrap();
        store.set(User { username: String::from("renamed"), ..sailor() }).unwrap();
        assert!(!router.sync());
        assert_eq!(router.current(), Route::Profile);
    }
}
