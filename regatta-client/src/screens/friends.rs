use regatta_common::{FriendAction, FriendRequest, FriendRequestId, User, UserId};
use tracing::info;

use super::AppContext;
use crate::client;
use crate::error::Result;

/// Requests received by the signed-in user.
#[derive(Clone, Debug, Default)]
pub struct FriendRequestsScreen {
    pub requests: Vec<FriendRequest>,
}

impl FriendRequestsScreen {
    pub async fn load(&mut self, ctx: &AppContext) -> Result<()> {
        let user_id = ctx.alerts.surface(ctx.current_user_id())?;
        self.requests = ctx.alerts.surface(client::get_friend_requests(&ctx.api, &user_id).await)?;
        Ok(())
    }

    /// Accepts or rejects a request. It leaves the local list only once the
    /// server has taken it.
    pub async fn respond(&mut self, ctx: &AppContext, request_id: &FriendRequestId, action: FriendAction) -> Result<()> {
        let message = ctx.alerts.surface(client::respond_friend_request(&ctx.api, request_id, action).await)?;
        self.requests.retain(|request| &request.id != request_id);
        info!(request_id = %request_id, action = action.as_str(), "friend request answered");
        ctx.alerts.success("Success", message);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FriendshipState {
    #[default]
    None,
    Pending,
    Friends,
}

/// Another user's profile.
#[derive(Clone, Debug, Default)]
pub struct UserDetailScreen {
    pub user_id: UserId,
    pub detail: Option<User>,
    pub recommended: Vec<User>,
    pub friendship: FriendshipState,
}

impl UserDetailScreen {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id, ..Default::default() }
    }

    /// Fetches the profile, its suggestions and the friendship status
    /// together. Every part that fails leaves its previous value.
    pub async fn load(&mut self, ctx: &AppContext) -> Result<()> {
        let me = ctx.alerts.surface(ctx.current_user_id())?;
        let (detail, recommended, friendship) = futures::join!(
            client::get_user_detail(&ctx.api, &self.user_id),
            client::get_recommended_users(&ctx.api, &self.user_id),
            friendship(ctx, &me, &self.user_id),
        );
        if let Ok(detail) = ctx.alerts.surface(detail) {
            self.detail = Some(detail);
        }
        if let Ok(recommended) = ctx.alerts.surface(recommended) {
            self.recommended = recommended;
        }
        if let Ok(friendship) = ctx.alerts.surface(friendship) {
            self.friendship = friendship;
        }
        Ok(())
    }

    pub async fn send_request(&mut self, ctx: &AppContext) -> Result<String> {
        let me = ctx.alerts.surface(ctx.current_user_id())?;
        let message = ctx.alerts.surface(client::send_friend_request(&ctx.api, &me, &self.user_id).await)?;
        if self.friendship == FriendshipState::None {
            self.friendship = FriendshipState::Pending;
        }
        ctx.alerts.success("Success", message.clone());
        Ok(message)
    }
}

async fn friendship(ctx: &AppContext, me: &UserId, them: &UserId) -> Result<FriendshipState> {
    if client::friend_request_accepted(&ctx.api, me, them).await? {
        return Ok(FriendshipState::Friends);
    }
    if client::has_outgoing_request(&ctx.api, me, them).await? {
        return Ok(FriendshipState::Pending);
    }
    Ok(FriendshipState::None)
}
