use regatta_common::forms::{AdditionalInvitations, InvitationUpdate, NewEvent};
use regatta_common::{EventId, GroupId, Invitation, InvitationStatus, InviteId, User, UserId};
use tracing::info;

use super::{AppContext, Selection};
use crate::client;
use crate::error::{Error, Result};

/// The events tab: every invitation of the signed-in user.
#[derive(Clone, Debug, Default)]
pub struct EventsScreen {
    pub invitations: Vec<Invitation>,
}

impl EventsScreen {
    pub async fn load(&mut self, ctx: &AppContext) -> Result<()> {
        let user_id = ctx.alerts.surface(ctx.current_user_id())?;
        self.invitations = ctx.alerts.surface(client::get_invitations(&ctx.api, &user_id).await)?;
        Ok(())
    }

    /// Events the user has committed to.
    pub fn upcoming(&self) -> impl Iterator<Item = &Invitation> {
        self.invitations.iter().filter(|i| i.status == InvitationStatus::Accepted)
    }

    /// Invitations still waiting for an answer.
    pub fn invites(&self) -> impl Iterator<Item = &Invitation> {
        self.invitations.iter().filter(|i| i.status == InvitationStatus::Pending)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CreateEventScreen {
    pub draft: NewEvent,
}

impl CreateEventScreen {
    /// Starts a draft for `group_id` administered by the signed-in user.
    /// `members` are the group's members; the admin is filtered out on submit.
    pub fn open(ctx: &AppContext, group_id: GroupId, members: Vec<User>) -> Result<Self> {
        let admin_id = ctx.alerts.surface(ctx.current_user_id())?;
        Ok(Self {
            draft: NewEvent { group_id, admin_id, members, ..Default::default() },
        })
    }

    pub async fn submit(&self, ctx: &AppContext) -> Result<()> {
        if let Some((field, label)) = self.first_missing() {
            ctx.alerts.rejected("Error", format!("{label} is required"));
            return Err(Error::MissingParameter(field));
        }
        ctx.alerts.surface(client::create_event(&ctx.api, &self.draft).await)?;
        info!(event = %self.draft.event_name, group_id = %self.draft.group_id, "event created");
        ctx.alerts.success("Success", "Event created successfully!");
        Ok(())
    }

    fn first_missing(&self) -> Option<(&'static str, &'static str)> {
        let draft = &self.draft;
        [
            ("event_name", "Event Name", &draft.event_name),
            ("event_type", "Event Type", &draft.event_type),
            ("boat_call_location", "Boat Call Location", &draft.boat_call_location),
            ("crew_members_seeking", "Crew Members Seeking", &draft.crew_members_seeking),
            ("event_date", "Event Date", &draft.event_date),
            ("event_time", "Event Time", &draft.event_time),
        ]
        .into_iter()
        .find(|(_, _, value)| value.trim().is_empty())
        .map(|(field, label, _)| (field, label))
    }
}

/// One invitation opened from the events tab.
#[derive(Clone, Debug)]
pub struct EventDetailsScreen {
    pub invitation: Invitation,
}

impl EventDetailsScreen {
    pub fn new(invitation: Invitation) -> Self {
        Self { invitation }
    }

    fn invite_id(&self) -> Result<InviteId> {
        self.invitation.invite_id.clone().ok_or(Error::MissingParameter("invite_id"))
    }

    /// Accepts or declines. The local status follows only on success.
    pub async fn respond(&mut self, ctx: &AppContext, status: InvitationStatus) -> Result<()> {
        let invite_id = ctx.alerts.surface(self.invite_id())?;
        let update = InvitationUpdate { invite_id, status: status.clone() };
        ctx.alerts.surface(client::update_invitation_status(&ctx.api, &update).await)?;
        self.invitation.status = status;
        ctx.alerts.success("Success", "Your request has been updated.");
        Ok(())
    }

    pub async fn leave(&mut self, ctx: &AppContext) -> Result<()> {
        let invite_id = ctx.alerts.surface(self.invite_id())?;
        ctx.alerts.surface(client::leave_event(&ctx.api, &invite_id).await)?;
        self.invitation.status = InvitationStatus::Declined;
        ctx.alerts.success("Success", "You have left the event.");
        Ok(())
    }

    /// The screen for inviting more people to this event.
    pub fn invite_more(&self) -> UserSelectionScreen {
        UserSelectionScreen::new(self.invitation.event_id.clone())
    }
}

/// Users who can still be invited to an event.
#[derive(Clone, Debug, Default)]
pub struct UserSelectionScreen {
    pub event_id: EventId,
    pub users: Vec<User>,
    pub selection: Selection,
}

impl UserSelectionScreen {
    pub fn new(event_id: EventId) -> Self {
        Self { event_id, ..Default::default() }
    }

    pub async fn load(&mut self, ctx: &AppContext) -> Result<()> {
        self.users = ctx.alerts.surface(client::get_users_selection(&ctx.api, &self.event_id).await)?;
        Ok(())
    }

    pub fn toggle(&mut self, user_id: &UserId) {
        self.selection.toggle(user_id);
    }

    pub async fn submit(&mut self, ctx: &AppContext) -> Result<()> {
        if self.selection.is_empty() {
            ctx.alerts.rejected("Error", "Please select at least one user.");
            return Err(Error::MissingParameter("user_ids"));
        }
        let invitations = AdditionalInvitations {
            event_id: self.event_id.clone(),
            user_ids: self.selection.ids().to_vec(),
        };
        ctx.alerts.surface(client::send_additional_invitations(&ctx.api, &invitations).await)?;
        let invited = self.selection.ids().to_vec();
        self.users.retain(|user| !invited.contains(&user.id));
        self.selection.clear();
        ctx.alerts.success("Success", "Invitations have been sent.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(id: u64, status: InvitationStatus) -> Invitation {
        Invitation {
            event_id: EventId::from(id),
            event_name: format!("Race {id}"),
            status,
            ..Default::default()
        }
    }

    #[test]
    fn tabs_split_by_status() {
        let screen = EventsScreen {
            invitations: vec![
                invitation(1, InvitationStatus::Accepted),
                invitation(2, InvitationStatus::Pending),
                invitation(3, InvitationStatus::Declined),
                invitation(4, InvitationStatus::Pending),
            ],
        };
        let upcoming: Vec<_> = screen.upcoming().map(|i| i.event_id.to_string()).collect();
        let invites: Vec<_> = screen.invites().map(|i| i.event_id.to_string()).collect();
        assert_eq!(upcoming, vec!["1"]);
        assert_eq!(invites, vec!["2", "4"]);
    }

    #[test]
    fn draft_reports_first_blank_field() {
        let mut screen = CreateEventScreen::default();
        assert_eq!(screen.first_missing(), Some(("event_name", "Event Name")));
        screen.draft.event_name = String::from("Harbour Cup");
        screen.draft.event_type = String::from("Regatta");
        screen.draft.boat_call_location = String::from("Dock B");
        assert_eq!(screen.first_missing(), Some(("crew_members_seeking", "Crew Members Seeking")));
        screen.draft.crew_members_seeking = String::from("4");
        screen.draft.event_date = String::from("2024-07-01");
        screen.draft.event_time = String::from("09:00");
        assert_eq!(screen.first_missing(), None);
    }
}
