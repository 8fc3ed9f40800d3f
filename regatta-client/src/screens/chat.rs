use regatta_common::forms::{NewGroupMessage, NewMessage};
use regatta_common::{ChatSummary, GroupId, Message, UserId};
use tokio::sync::watch;
use tracing::warn;

use super::{AppContext, LiveList};
use crate::client;
use crate::error::{Error, Result};
use crate::poll::{PollScope, PollState};

/// Conversations of the signed-in user, fetched once per mount.
#[derive(Clone, Debug, Default)]
pub struct ChatListScreen {
    pub chats: Vec<ChatSummary>,
    pub query: String,
}

impl ChatListScreen {
    pub async fn load(&mut self, ctx: &AppContext) -> Result<()> {
        let user_id = ctx.alerts.surface(ctx.current_user_id())?;
        self.chats = ctx.alerts.surface(client::get_chat_list(&ctx.api, &user_id).await)?;
        Ok(())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Chats whose peer name contains the query, ignoring case.
    pub fn visible(&self) -> Vec<&ChatSummary> {
        let needle = self.query.trim().to_lowercase();
        self.chats
            .iter()
            .filter(|chat| needle.is_empty() || chat.display_name().to_lowercase().contains(&needle))
            .collect()
    }
}

/// One-to-one conversation, re-fetched every poll interval while mounted.
pub struct ChatScreen {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    messages: LiveList<Message>,
}

impl ChatScreen {
    pub fn mount(ctx: &AppContext, scope: &mut PollScope, receiver_id: UserId) -> Result<Self> {
        let sender_id = ctx.alerts.surface(ctx.current_user_id())?;
        let api = ctx.api.clone();
        let (me, peer) = (sender_id.clone(), receiver_id.clone());
        let messages = LiveList::mount(scope, "chat", ctx.poll_interval, move || {
            let (api, me, peer) = (api.clone(), me.clone(), peer.clone());
            async move { client::get_messages(&api, &me, &peer).await }
        });
        Ok(Self { sender_id, receiver_id, messages })
    }

    /// Sends `text` and refreshes the conversation once. Blank text is
    /// refused without a request.
    pub async fn send(&self, ctx: &AppContext, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::MissingParameter("message"));
        }
        let message = NewMessage {
            sender_id: self.sender_id.clone(),
            receiver_id: self.receiver_id.clone(),
            message: text.to_string(),
        };
        ctx.alerts.surface(client::send_message(&ctx.api, &message).await)?;
        match client::get_messages(&ctx.api, &self.sender_id, &self.receiver_id).await {
            Ok(fresh) => {
                self.messages.apply(fresh);
            }
            Err(err) => warn!(error = %err, "refresh after send failed"),
        }
        Ok(())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.messages.subscribe()
    }

    pub fn poll_state(&self) -> PollState {
        self.messages.poll_state()
    }
}

/// Group conversation. Same polling as [`ChatScreen`].
pub struct GroupChatScreen {
    pub group_id: GroupId,
    pub sender_id: UserId,
    messages: LiveList<Message>,
}

impl GroupChatScreen {
    pub fn mount(ctx: &AppContext, scope: &mut PollScope, group_id: GroupId) -> Result<Self> {
        let sender_id = ctx.alerts.surface(ctx.current_user_id())?;
        let api = ctx.api.clone();
        let group = group_id.clone();
        let messages = LiveList::mount(scope, "group-chat", ctx.poll_interval, move || {
            let (api, group) = (api.clone(), group.clone());
            async move { client::get_group_messages(&api, &group).await }
        });
        Ok(Self { group_id, sender_id, messages })
    }

    pub async fn send(&self, ctx: &AppContext, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::MissingParameter("message"));
        }
        let message = NewGroupMessage {
            group_id: self.group_id.clone(),
            sender_id: self.sender_id.clone(),
            message: text.to_string(),
        };
        ctx.alerts.surface(client::send_group_message(&ctx.api, &message).await)?;
        match client::get_group_messages(&ctx.api, &self.group_id).await {
            Ok(fresh) => {
                self.messages.apply(fresh);
            }
            Err(err) => warn!(error = %err, "refresh after send failed"),
        }
        Ok(())
    }

    pub async fn add_member(&self, ctx: &AppContext, user_id: &UserId) -> Result<String> {
        let message = ctx.alerts.surface(client::add_member_to_group(&ctx.api, &self.group_id, user_id).await)?;
        ctx.alerts.success("Member added", message.clone());
        Ok(message)
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.messages.subscribe()
    }

    pub fn poll_state(&self) -> PollState {
        self.messages.poll_state()
    }
}
