//! Request bodies sent to the API.

use serde::{Deserialize, Serialize};

use crate::{EventId, GroupId, InviteId, InvitationStatus, User, UserId};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// An image attached to a multipart form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), mime: String::from("image/jpeg"), bytes }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub cnic: String,
    pub address: String,
    pub phone_no: String,
    pub usertitle: String,
    pub user_image: Option<ImageUpload>,
    pub cover_image: Option<ImageUpload>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileForm {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password: String,
    pub cnic: String,
    pub address: String,
    pub phone_no: String,
    pub usertitle: String,
    pub user_image: Option<ImageUpload>,
    pub cover_image: Option<ImageUpload>,
}

impl ProfileForm {
    /// Prefills the editable fields from the stored session.
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            password: String::new(),
            cnic: user.cnic.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
            phone_no: user.phone_no.clone().unwrap_or_default(),
            usertitle: user.usertitle.clone().unwrap_or_default(),
            user_image: None,
            cover_image: None,
        }
    }

    /// The session value after a successful save when the server does not echo
    /// the user back. The whole value is replaced, starting from `previous`.
    pub fn apply_to(&self, previous: &User) -> User {
        let non_empty = |s: &String| (!s.is_empty()).then(|| s.clone());
        User {
            id: self.user_id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            cnic: non_empty(&self.cnic),
            address: non_empty(&self.address),
            phone_no: non_empty(&self.phone_no),
            usertitle: non_empty(&self.usertitle),
            ..previous.clone()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct NewGroupMessage {
    pub group_id: GroupId,
    pub sender_id: UserId,
    pub message: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NewGroup {
    pub group_name: String,
    pub group_description: String,
    pub admin_id: UserId,
    pub image: Option<ImageUpload>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct NewEvent {
    pub group_id: GroupId,
    pub admin_id: UserId,
    pub event_name: String,
    pub event_type: String,
    pub boat_call_location: String,
    pub crew_members_seeking: String,
    pub meal_provided: String,
    pub attire_requirements: String,
    pub event_date: String,
    pub event_time: String,
    pub additional_details: String,
    pub regatta_public: Visibility,
    /// Group members, sent as whole member objects.
    pub members: Vec<User>,
}

impl NewEvent {
    /// The admin is implicitly part of the event and is never invited.
    pub fn invitees(&self) -> Vec<User> {
        self.members.iter().filter(|m| m.id != self.admin_id).cloned().collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct MemberList {
    pub group_id: GroupId,
    pub user_ids: Vec<UserId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct InvitationUpdate {
    pub invite_id: InviteId,
    pub status: InvitationStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct AdditionalInvitations {
    pub event_id: EventId,
    pub user_ids: Vec<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64, username: &str) -> User {
        User { id: UserId::from(id), username: username.to_string(), ..Default::default() }
    }

    #[test]
    fn invitees_exclude_admin() {
        let event = NewEvent {
            admin_id: UserId::from(1),
            members: vec![member(1, "malek"), member(2, "amanda"), member(3, "bob")],
            ..Default::default()
        };
        let ids: Vec<_> = event.invitees().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![UserId::from(2), UserId::from(3)]);
    }

    #[test]
    fn event_members_serialize_as_objects() {
        let event = NewEvent {
            admin_id: UserId::from(1),
            members: vec![member(2, "amanda")],
            ..Default::default()
        };
        let body = serde_json::to_value(&event).unwrap();
        assert!(body["members"][0].is_object(), "got {}", body["members"]);
        assert_eq!(body["members"][0]["id"], serde_json::to_value(UserId::from(2)).unwrap());
        assert_eq!(body["members"][0]["username"], "amanda");
    }

    #[test]
    fn profile_save_replaces_whole_session() {
        let previous = User {
            id: UserId::from(5),
            username: String::from("old"),
            email: String::from("old@example.com"),
            address: Some(String::from("Pier 4")),
            user_image: Some(String::from("uploads/old.jpg")),
            ..Default::default()
        };
        let mut form = ProfileForm::from_user(&previous);
        form.username = String::from("new");
        form.address = String::new();
        let next = form.apply_to(&previous);
        assert_eq!(next.username, "new");
        assert_eq!(next.address, None);
        assert_eq!(next.user_image.as_deref(), Some("uploads/old.jpg"));
    }
}
