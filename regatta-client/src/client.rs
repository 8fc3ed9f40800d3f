//! One function per remote operation. Each performs exactly one request.

use reqwest::multipart::{Form, Part};
use serde_json::json;

use regatta_common::forms::{
    AdditionalInvitations, Credentials, ImageUpload, InvitationUpdate, MemberList, NewEvent, NewGroup,
    NewGroupMessage, NewMessage, ProfileForm, SignupForm,
};
use regatta_common::{
    ChatSummary, EventId, FriendAction, FriendRequest, FriendRequestId, Group, GroupId, Invitation, InviteId,
    Message, User, UserId,
};

use crate::error::{require, Error, Result};
use crate::reply::send;
use crate::Api;

pub async fn login(api: &Api, credentials: &Credentials) -> Result<User> {
    require("email", &credentials.email)?;
    require("password", &credentials.password)?;
    send(api.http.get(api.url("login.php"))
        .query(&[("login", "1"), ("email", credentials.email.as_str()), ("password", credentials.password.as_str())]))
        .await?
        .expect_message("Login successful", "Login failed. Invalid email or password.")?
        .field("user")
}

pub async fn signup(api: &Api, form: &SignupForm) -> Result<String> {
    require("username", &form.username)?;
    require("password", &form.password)?;
    require("email", &form.email)?;
    let mut multipart = Form::new()
        .text("username", form.username.clone())
        .text("password", form.password.clone())
        .text("email", form.email.clone())
        .text("cnic", form.cnic.clone())
        .text("address", form.address.clone())
        .text("phone_no", form.phone_no.clone())
        .text("usertitle", form.usertitle.clone());
    if let Some(image) = &form.user_image {
        multipart = multipart.part("userImage", image_part(image)?);
    }
    if let Some(image) = &form.cover_image {
        multipart = multipart.part("coverImage", image_part(image)?);
    }
    send(api.http.post(api.url("signup.php")).multipart(multipart))
        .await?
        .expect_message("User registered successfully", "Signup failed")?
        .into_message("Signup failed")
}

/// Saves the profile. Returns the user echoed by the server, if any, and the
/// server's message.
pub async fn update_profile(api: &Api, form: &ProfileForm) -> Result<(Option<User>, String)> {
    require("user_id", &form.user_id.0)?;
    let mut multipart = Form::new()
        .text("user_id", form.user_id.0.clone())
        .text("username", form.username.clone())
        .text("email", form.email.clone())
        .text("password", form.password.clone())
        .text("cnic", form.cnic.clone())
        .text("address", form.address.clone())
        .text("phone_no", form.phone_no.clone())
        .text("usertitle", form.usertitle.clone());
    if let Some(image) = &form.user_image {
        multipart = multipart.part("userImage", image_part(image)?);
    }
    if let Some(image) = &form.cover_image {
        multipart = multipart.part("coverImage", image_part(image)?);
    }
    let reply = send(api.http.post(api.url("user.php")).multipart(multipart)).await?;
    let user = reply.optional_field("user")?;
    Ok((user, reply.message().unwrap_or("Profile updated").to_string()))
}

pub async fn get_messages(api: &Api, sender_id: &UserId, receiver_id: &UserId) -> Result<Vec<Message>> {
    require("sender_id", &sender_id.0)?;
    require("receiver_id", &receiver_id.0)?;
    send(api.http.get(api.url("get_messages.php"))
        .query(&[("sender_id", sender_id), ("receiver_id", receiver_id)]))
        .await?
        .array()
}

pub async fn send_message(api: &Api, message: &NewMessage) -> Result<()> {
    require("sender_id", &message.sender_id.0)?;
    require("receiver_id", &message.receiver_id.0)?;
    require("message", &message.message)?;
    send(api.http.post(api.url("send_message.php")).json(message))
        .await?
        .expect_status_success()?;
    Ok(())
}

pub async fn get_group_messages(api: &Api, group_id: &GroupId) -> Result<Vec<Message>> {
    require("group_id", &group_id.0)?;
    send(api.http.get(api.url("get_group_messages.php")).query(&[("group_id", group_id)]))
        .await?
        .array()
}

pub async fn send_group_message(api: &Api, message: &NewGroupMessage) -> Result<()> {
    require("group_id", &message.group_id.0)?;
    require("sender_id", &message.sender_id.0)?;
    require("message", &message.message)?;
    send(api.http.post(api.url("send_group_message.php")).json(message))
        .await?
        .expect_status_success()?;
    Ok(())
}

pub async fn get_chat_list(api: &Api, user_id: &UserId) -> Result<Vec<ChatSummary>> {
    require("user_id", &user_id.0)?;
    send(api.http.get(api.url("chatlist.php")).query(&[("user_id", user_id)]))
        .await?
        .expect_status_success()?
        .field("chats")
}

pub async fn get_friend_requests(api: &Api, receiver_id: &UserId) -> Result<Vec<FriendRequest>> {
    require("receiver_id", &receiver_id.0)?;
    send(api.http.get(api.url("accept_friend_request.php")).query(&[("receiver_id", receiver_id)]))
        .await?
        .array()
}

/// Accepts or rejects a received request. Returns the server's message.
pub async fn respond_friend_request(api: &Api, request_id: &FriendRequestId, action: FriendAction) -> Result<String> {
    require("request_id", &request_id.0)?;
    let params = [("request_id", request_id.0.as_str()), ("action", action.as_str())];
    send(api.http.post(api.url("accept_friend_request.php")).form(&params))
        .await?
        .into_message("Failed to update request")
}

pub async fn send_friend_request(api: &Api, sender_id: &UserId, receiver_id: &UserId) -> Result<String> {
    require("sender_id", &sender_id.0)?;
    require("receiver_id", &receiver_id.0)?;
    send(api.http.get(api.url("send_friend_request.php"))
        .query(&[("sender_id", sender_id), ("receiver_id", receiver_id)]))
        .await?
        .into_message("Failed to send request")
}

pub async fn friend_request_accepted(api: &Api, sender_id: &UserId, receiver_id: &UserId) -> Result<bool> {
    require("sender_id", &sender_id.0)?;
    require("receiver_id", &receiver_id.0)?;
    Ok(send(api.http.get(api.url("check_friend_request_status.php"))
        .query(&[("sender_id", sender_id), ("receiver_id", receiver_id)]))
        .await?
        .flag("accepted"))
}

/// Whether `sender_id` already has a pending request out to `receiver_id`.
pub async fn has_outgoing_request(api: &Api, sender_id: &UserId, receiver_id: &UserId) -> Result<bool> {
    require("sender_id", &sender_id.0)?;
    require("receiver_id", &receiver_id.0)?;
    let pending: Vec<serde_json::Value> = send(api.http.get(api.url("get_outgoing_requests.php"))
        .query(&[("sender_id", sender_id), ("receiver_id", receiver_id)]))
        .await?
        .array()?;
    Ok(!pending.is_empty())
}

pub async fn get_user_detail(api: &Api, user_id: &UserId) -> Result<User> {
    require("user_id", &user_id.0)?;
    send(api.http.get(api.url("userDetail.php")).query(&[("user_id", user_id)]))
        .await?
        .field("user")
}

pub async fn get_recommended_users(api: &Api, user_id: &UserId) -> Result<Vec<User>> {
    require("user_id", &user_id.0)?;
    send(api.http.get(api.url("recomendedUsers.php")).query(&[("user_id", user_id)]))
        .await?
        .field("users")
}

pub async fn get_friends(api: &Api, user_id: &UserId) -> Result<Vec<User>> {
    require("user_id", &user_id.0)?;
    send(api.http.get(api.url("get_friends.php")).query(&[("user_id", user_id)]))
        .await?
        .array()
}

pub async fn get_users(api: &Api) -> Result<Vec<User>> {
    send(api.http.get(api.url("get_users.php"))).await?.array()
}

/// Creates a group and returns its id.
pub async fn create_group(api: &Api, group: &NewGroup) -> Result<GroupId> {
    require("group_name", &group.group_name)?;
    require("admin_id", &group.admin_id.0)?;
    let mut multipart = Form::new()
        .text("group_name", group.group_name.clone())
        .text("group_description", group.group_description.clone())
        .text("admin_id", group.admin_id.0.clone());
    if let Some(image) = &group.image {
        multipart = multipart.part("image", image_part(image)?);
    }
    send(api.http.post(api.url("create_group.php")).multipart(multipart))
        .await?
        .expect_success_flag()?
        .field("group_id")
}

pub async fn get_user_groups(api: &Api, user_id: &UserId) -> Result<Vec<Group>> {
    require("user_id", &user_id.0)?;
    send(api.http.get(api.url("get_user_groups.php")).query(&[("user_id", user_id)]))
        .await?
        .expect_success_flag()?
        .field("groups")
}

pub async fn add_member_to_group(api: &Api, group_id: &GroupId, user_id: &UserId) -> Result<String> {
    require("group_id", &group_id.0)?;
    require("user_id", &user_id.0)?;
    let params = [("group_id", group_id.0.as_str()), ("user_id", user_id.0.as_str())];
    let reply = send(api.http.post(api.url("add_member_to_group.php")).form(&params))
        .await?
        .expect_success_flag()?;
    Ok(reply.message().unwrap_or("Member added").to_string())
}

pub async fn add_users_to_group(api: &Api, members: &MemberList) -> Result<String> {
    require("group_id", &members.group_id.0)?;
    if members.user_ids.is_empty() {
        return Err(Error::MissingParameter("user_ids"));
    }
    let reply = send(api.http.post(api.url("add_users_to_group.php")).json(members))
        .await?
        .expect_success_flag()?;
    Ok(reply.message().unwrap_or("Users added").to_string())
}

pub async fn create_event(api: &Api, event: &NewEvent) -> Result<()> {
    require("group_id", &event.group_id.0)?;
    require("admin_id", &event.admin_id.0)?;
    require("event_name", &event.event_name)?;
    let body = NewEvent { members: event.invitees(), ..event.clone() };
    send(api.http.post(api.url("create_event.php")).json(&body))
        .await?
        .expect_status_success()?;
    Ok(())
}

/// Upcoming events the user is invited to, with the invitation state of each.
pub async fn get_invitations(api: &Api, user_id: &UserId) -> Result<Vec<Invitation>> {
    require("user_id", &user_id.0)?;
    send(api.http.post(api.url("get_invitations.php")).json(&json!({ "user_id": user_id })))
        .await?
        .field("invitations")
}

pub async fn update_invitation_status(api: &Api, update: &InvitationUpdate) -> Result<()> {
    require("invite_id", &update.invite_id.0)?;
    send(api.http.post(api.url("update_invitation_status.php")).json(update))
        .await?
        .expect_status_success()?;
    Ok(())
}

pub async fn leave_event(api: &Api, invite_id: &InviteId) -> Result<()> {
    require("invite_id", &invite_id.0)?;
    send(api.http.post(api.url("leave_event.php")).json(&json!({ "invite_id": invite_id })))
        .await?
        .expect_status_success()?;
    Ok(())
}

/// Users that can still be invited to `event_id`.
pub async fn get_users_selection(api: &Api, event_id: &EventId) -> Result<Vec<User>> {
    require("event_id", &event_id.0)?;
    send(api.http.post(api.url("get_users_selection.php")).json(&json!({ "event_id": event_id })))
        .await?
        .expect_status_success()?
        .field("users")
}

pub async fn send_additional_invitations(api: &Api, invitations: &AdditionalInvitations) -> Result<()> {
    require("event_id", &invitations.event_id.0)?;
    if invitations.user_ids.is_empty() {
        return Err(Error::MissingParameter("user_ids"));
    }
    send(api.http.post(api.url("send_additional_invitations.php")).json(invitations))
        .await?
        .expect_status_success()?;
    Ok(())
}

fn image_part(image: &ImageUpload) -> Result<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.mime)
        .map_err(|_| Error::api(format!("unsupported image type `{}`", image.mime)))
}
