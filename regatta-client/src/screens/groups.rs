use regatta_common::forms::{ImageUpload, MemberList, NewGroup};
use regatta_common::{Group, GroupId, User, UserId};
use tracing::info;

use super::{AppContext, Selection};
use crate::client;
use crate::error::{Error, Result};

/// The user's groups plus the form for a new one.
#[derive(Clone, Debug, Default)]
pub struct CreateGroupScreen {
    pub groups: Vec<Group>,
    pub name: String,
    pub description: String,
    pub image: Option<ImageUpload>,
}

impl CreateGroupScreen {
    pub async fn load(&mut self, ctx: &AppContext) -> Result<()> {
        let user_id = ctx.alerts.surface(ctx.current_user_id())?;
        self.groups = ctx.alerts.surface(client::get_user_groups(&ctx.api, &user_id).await)?;
        Ok(())
    }

    /// Creates the group with the signed-in user as admin. The caller goes on
    /// to [`AddUsersScreen`] with the returned id.
    pub async fn create(&mut self, ctx: &AppContext) -> Result<GroupId> {
        let admin_id = ctx.alerts.surface(ctx.current_user_id())?;
        if self.name.trim().is_empty() || self.description.trim().is_empty() {
            ctx.alerts.rejected("Error", "Please provide all required details.");
            let missing = if self.name.trim().is_empty() { "group_name" } else { "group_description" };
            return Err(Error::MissingParameter(missing));
        }
        let group = NewGroup {
            group_name: self.name.trim().to_string(),
            group_description: self.description.trim().to_string(),
            admin_id,
            image: self.image.clone(),
        };
        let group_id = ctx.alerts.surface(client::create_group(&ctx.api, &group).await)?;
        info!(group_id = %group_id, "group created");
        ctx.alerts.success("Success", "Group created successfully!");
        Ok(group_id)
    }
}

/// Picks users to add to a freshly created group.
#[derive(Clone, Debug, Default)]
pub struct AddUsersScreen {
    pub group_id: GroupId,
    pub users: Vec<User>,
    pub selection: Selection,
}

impl AddUsersScreen {
    pub fn new(group_id: GroupId) -> Self {
        Self { group_id, ..Default::default() }
    }

    pub async fn load(&mut self, ctx: &AppContext) -> Result<()> {
        self.users = ctx.alerts.surface(client::get_users(&ctx.api).await)?;
        Ok(())
    }

    pub fn toggle(&mut self, user_id: &UserId) {
        self.selection.toggle(user_id);
    }

    pub async fn submit(&mut self, ctx: &AppContext) -> Result<String> {
        if self.selection.is_empty() {
            ctx.alerts.warning("Warning", "No users selected");
            return Err(Error::MissingParameter("user_ids"));
        }
        let members = MemberList {
            group_id: self.group_id.clone(),
            user_ids: self.selection.ids().to_vec(),
        };
        let message = ctx.alerts.surface(client::add_users_to_group(&ctx.api, &members).await)?;
        self.selection.clear();
        ctx.alerts.success("Success", message.clone());
        Ok(message)
    }
}
