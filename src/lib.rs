pub mod de;
pub mod forms;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Base address of the remote API, e.g. `https://amanda.capraworks.com/api/`.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Deserialize, Default)]
pub struct Url(pub String);

impl Url {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self(base)
    }
    /// Full address of a `*.php` endpoint.
    pub fn endpoint(&self, name: &str) -> String {
        self.join(name)
    }
    /// Images are stored as paths relative to the API root.
    pub fn asset(&self, path: &str) -> String {
        self.join(path)
    }
    fn join(&self, path: &str) -> String {
        let base = self.0.trim_end_matches('/');
        String::from(base) + "/" + path.trim_start_matches('/')
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// The API hands ids back as JSON strings or numbers depending on the endpoint.
macro_rules! id_type {
    ($name:ident) => {
        #[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Default)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                de::string_or_number(deserializer).map(Self)
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_type!(UserId);
id_type!(MessageId);
id_type!(GroupId);
id_type!(EventId);
id_type!(InviteId);
id_type!(FriendRequestId);

/// The authenticated user as returned by `login.php`. This is also the value
/// persisted as the session, so fields the client does not know about are kept
/// in `extra` and written back verbatim.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string_or_number")]
    pub cnic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string_or_number")]
    pub phone_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usertitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    pub fn is_from(&self, user: &UserId) -> bool {
        &self.sender_id == user
    }
}

/// One row of `chatlist.php`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatSummary {
    pub chat_start: UserId,
    pub chat_end: UserId,
    #[serde(default)]
    pub user1_name: Option<String>,
}

impl ChatSummary {
    pub fn display_name(&self) -> &str {
        self.user1_name.as_deref().unwrap_or("Unknown User")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    #[serde(default)]
    pub sender_id: UserId,
    #[serde(default)]
    pub receiver_id: UserId,
    #[serde(default)]
    pub status: FriendRequestStatus,
    #[serde(default)]
    pub sender_name: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FriendAction {
    Accept,
    Reject,
}

impl FriendAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendAction::Accept => "accept",
            FriendAction::Reject => "reject",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    #[serde(other)]
    Unknown,
}

/// An event as seen through the invitation of one member.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Invitation {
    pub event_id: EventId,
    #[serde(default)]
    pub invite_id: Option<InviteId>,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub event_time: Option<String>,
    #[serde(default)]
    pub boat_call_location: Option<String>,
    #[serde(default, deserialize_with = "de::opt_count")]
    pub crew_members_seeking: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    pub accepted_members: Option<u32>,
    #[serde(default)]
    pub status: InvitationStatus,
    #[serde(default)]
    pub meal_provided: Option<String>,
    #[serde(default)]
    pub attire_requirements: Option<String>,
    #[serde(default)]
    pub additional_details: Option<String>,
    #[serde(default)]
    pub regatta_public: Option<String>,
}

impl Invitation {
    pub fn remaining_crew(&self) -> Option<u32> {
        Some(self.crew_members_seeking?.saturating_sub(self.accepted_members.unwrap_or(0)))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub members: Vec<User>,
}
