use std::io::{self, Write};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use regatta_client::alerts::{Alert, AlertKind, Alerts};
use regatta_client::config::Config;
use regatta_client::router::{Route, RouteSet, Router};
use regatta_client::screens::{
    AddUsersScreen, AppContext, ChatListScreen, ChatScreen, CreateEventScreen, CreateGroupScreen,
    EventDetailsScreen, EventsScreen, FriendRequestsScreen, FriendshipState, GroupChatScreen, HomeScreen,
    LoginScreen, MyProfileScreen, ProfileScreen, SignupScreen, UserDetailScreen, UserSelectionScreen,
};
use regatta_client::logging;
use regatta_common::{FriendAction, GroupId, InvitationStatus, Message, User, UserId};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log_filter)?;

    let (alerts, mut alert_rx) = Alerts::channel();
    tokio::spawn(async move {
        while let Some(alert) = alert_rx.recv().await {
            print_alert(&alert);
        }
    });

    let ctx = AppContext::from_config(&config, alerts)?;
    println!("🌐 API: {}", config.api_base);
    let router = Router::new(&ctx.session);
    let mut cli = Cli {
        ctx,
        router,
        input: BufReader::new(tokio::io::stdin()).lines(),
        closed: false,
    };

    loop {
        let keep_going = match cli.router.route_set() {
            RouteSet::Unauthenticated => cli.signed_out_menu().await,
            RouteSet::Authenticated => cli.signed_in_menu().await,
        };
        match keep_going {
            Ok(true) => {}
            Ok(false) => break,
            // Screens already raised an alert for their own failures.
            Err(err) => debug!(error = %err, "action failed"),
        }
        if cli.closed {
            break;
        }
    }
    println!("👋 Bye");
    Ok(())
}

struct Cli {
    ctx: AppContext,
    router: Router,
    input: Lines<BufReader<Stdin>>,
    closed: bool,
}

impl Cli {
    async fn signed_out_menu(&mut self) -> Result<bool> {
        println!();
        println!("╔════════════════════════════════════╗");
        println!("║          REGATTA - Welcome         ║");
        println!("╠════════════════════════════════════╣");
        println!("║  1. Login                          ║");
        println!("║  2. Sign up                        ║");
        println!("║  0. Exit                           ║");
        println!("╚════════════════════════════════════╝");
        match self.prompt("Choice: ").await?.as_str() {
            "1" => self.login().await?,
            "2" => self.signup().await?,
            "0" => return Ok(false),
            _ => println!("❌ Invalid choice"),
        }
        Ok(true)
    }

    async fn signed_in_menu(&mut self) -> Result<bool> {
        println!();
        println!("╔════════════════════════════════════╗");
        println!("║          REGATTA - Home            ║");
        println!("╠════════════════════════════════════╣");
        println!("║  1. My profile                     ║");
        println!("║  2. Edit profile                   ║");
        println!("║  3. Chats                          ║");
        println!("║  4. Friend requests                ║");
        println!("║  5. Find a sailor                  ║");
        println!("║  6. Events                         ║");
        println!("║  7. Groups                         ║");
        println!("║  8. Logout                         ║");
        println!("║  0. Exit                           ║");
        println!("╚════════════════════════════════════╝");
        match self.prompt("Choice: ").await?.as_str() {
            "1" => self.my_profile().await?,
            "2" => self.edit_profile().await?,
            "3" => self.chats().await?,
            "4" => self.friend_requests().await?,
            "5" => self.user_detail().await?,
            "6" => self.events().await?,
            "7" => self.groups().await?,
            "8" => self.ctx.logout()?,
            "0" => return Ok(false),
            _ => println!("❌ Invalid choice"),
        }
        Ok(true)
    }

    async fn login(&mut self) -> Result<()> {
        let screen = LoginScreen {
            email: self.prompt("Email: ").await?,
            password: self.prompt("Password: ").await?,
        };
        let user = screen.submit(&self.ctx).await?;
        println!("✅ Welcome back, {}", user.username);
        Ok(())
    }

    async fn signup(&mut self) -> Result<()> {
        self.router.navigate(Route::Signup)?;
        let mut screen = SignupScreen::default();
        screen.form.username = self.prompt("Username: ").await?;
        screen.form.email = self.prompt("Email: ").await?;
        screen.form.password = self.prompt("Password: ").await?;
        screen.form.cnic = self.prompt("CNIC: ").await?;
        screen.form.address = self.prompt("Address: ").await?;
        screen.form.phone_no = self.prompt("Phone: ").await?;
        screen.form.usertitle = self.prompt("Title: ").await?;
        let result = screen.submit(&self.ctx).await;
        self.router.back();
        result?;
        Ok(())
    }

    async fn my_profile(&mut self) -> Result<()> {
        let mut home = HomeScreen::default();
        print_user(home.load(&self.ctx)?);
        self.router.navigate(Route::MyProfile)?;
        let mut screen = MyProfileScreen::default();
        let result = screen.load(&self.ctx).await;
        println!("Friends:");
        for friend in &screen.friends {
            println!("  [{}] {}", friend.id, friend.username);
        }
        println!("Suggested:");
        for user in &screen.recommended {
            println!("  [{}] {}", user.id, user.username);
        }
        self.router.back();
        result?;
        Ok(())
    }

    async fn edit_profile(&mut self) -> Result<()> {
        self.router.navigate(Route::Profile)?;
        let result = self.edit_profile_fields().await;
        self.router.back();
        result
    }

    async fn edit_profile_fields(&mut self) -> Result<()> {
        let mut screen = ProfileScreen::open(&self.ctx)?;
        println!("Leave a field blank to keep it.");
        let username = self.prompt(&format!("Username [{}]: ", screen.form.username)).await?;
        if !username.is_empty() {
            screen.form.username = username;
        }
        let title = self.prompt(&format!("Title [{}]: ", screen.form.usertitle)).await?;
        if !title.is_empty() {
            screen.form.usertitle = title;
        }
        let address = self.prompt(&format!("Address [{}]: ", screen.form.address)).await?;
        if !address.is_empty() {
            screen.form.address = address;
        }
        let user = screen.submit(&self.ctx).await?;
        print_user(&user);
        Ok(())
    }

    async fn chats(&mut self) -> Result<()> {
        self.router.navigate(Route::ChatsList)?;
        let result = self.pick_chat().await;
        self.router.back();
        result
    }

    async fn pick_chat(&mut self) -> Result<()> {
        let me = self.ctx.current_user_id()?;
        let mut screen = ChatListScreen::default();
        screen.load(&self.ctx).await?;
        screen.set_query(self.prompt("Filter (blank for all): ").await?);
        let visible: Vec<_> = screen.visible().into_iter().cloned().collect();
        if visible.is_empty() {
            println!("📭 No chats");
            return Ok(());
        }
        for (n, chat) in visible.iter().enumerate() {
            println!("  {}. {}", n + 1, chat.display_name());
        }
        let Some(chat) = pick(&visible, &self.prompt("Open chat #: ").await?) else {
            return Ok(());
        };
        let peer = if chat.chat_start == me { chat.chat_end.clone() } else { chat.chat_start.clone() };
        self.open_chat(peer).await
    }

    async fn open_chat(&mut self, peer: UserId) -> Result<()> {
        let scope = self.router.navigate(Route::Chat)?;
        let screen = ChatScreen::mount(&self.ctx, scope, peer)?;
        println!("💬 Chat open. Type to send, /q to leave.");
        let mut messages = screen.subscribe();
        let mut shown = 0;
        loop {
            tokio::select! {
                changed = messages.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    shown = print_messages(&messages.borrow_and_update(), &screen.sender_id, shown);
                }
                line = self.input.next_line() => {
                    let Some(line) = line? else {
                        self.closed = true;
                        break;
                    };
                    if line.trim() == "/q" {
                        break;
                    }
                    if let Err(err) = screen.send(&self.ctx, &line).await {
                        debug!(error = %err, "message not sent");
                    }
                }
            }
        }
        self.router.back();
        Ok(())
    }

    async fn open_group_chat(&mut self, group_id: GroupId) -> Result<()> {
        let scope = self.router.navigate(Route::GroupChat)?;
        let screen = GroupChatScreen::mount(&self.ctx, scope, group_id)?;
        println!("💬 Group chat open. Type to send, /add <user id> to add a member, /q to leave.");
        let mut messages = screen.subscribe();
        let mut shown = 0;
        loop {
            tokio::select! {
                changed = messages.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    shown = print_messages(&messages.borrow_and_update(), &screen.sender_id, shown);
                }
                line = self.input.next_line() => {
                    let Some(line) = line? else {
                        self.closed = true;
                        break;
                    };
                    let line = line.trim();
                    if line == "/q" {
                        break;
                    }
                    let outcome = match line.strip_prefix("/add ") {
                        Some(user_id) => screen.add_member(&self.ctx, &UserId::from(user_id.trim())).await.map(|_| ()),
                        None => screen.send(&self.ctx, line).await,
                    };
                    if let Err(err) = outcome {
                        debug!(error = %err, "group chat action failed");
                    }
                }
            }
        }
        self.router.back();
        Ok(())
    }

    async fn friend_requests(&mut self) -> Result<()> {
        self.router.navigate(Route::FriendRequests)?;
        let result = self.answer_requests().await;
        self.router.back();
        result
    }

    async fn answer_requests(&mut self) -> Result<()> {
        let mut screen = FriendRequestsScreen::default();
        screen.load(&self.ctx).await?;
        loop {
            if screen.requests.is_empty() {
                println!("📭 No pending requests");
                return Ok(());
            }
            for (n, request) in screen.requests.iter().enumerate() {
                let name = request.sender_name.as_deref().unwrap_or("Unknown User");
                println!("  {}. {} [{}]", n + 1, name, request.sender_id);
            }
            let answer = self.prompt("a <#> to accept, r <#> to reject, blank to go back: ").await?;
            let (action, index) = match answer.split_once(' ') {
                Some(("a", n)) => (FriendAction::Accept, n),
                Some(("r", n)) => (FriendAction::Reject, n),
                _ => return Ok(()),
            };
            let Some(request) = pick(&screen.requests, index) else {
                println!("❌ Invalid choice");
                continue;
            };
            let id = request.id.clone();
            if let Err(err) = screen.respond(&self.ctx, &id, action).await {
                debug!(error = %err, "friend request not answered");
            }
        }
    }

    async fn user_detail(&mut self) -> Result<()> {
        let user_id = self.prompt("User id: ").await?;
        if user_id.is_empty() {
            return Ok(());
        }
        self.router.navigate(Route::UserDetail)?;
        let mut screen = UserDetailScreen::new(UserId::from(user_id.as_str()));
        let result = self.befriend(&mut screen).await;
        self.router.back();
        result
    }

    async fn befriend(&mut self, screen: &mut UserDetailScreen) -> Result<()> {
        screen.load(&self.ctx).await?;
        if let Some(user) = &screen.detail {
            print_user(user);
        }
        println!("Also sailing with them:");
        for user in &screen.recommended {
            println!("  [{}] {}", user.id, user.username);
        }
        match screen.friendship {
            FriendshipState::Friends => println!("🤝 You are friends"),
            FriendshipState::Pending => println!("⏳ Request sent"),
            FriendshipState::None => {
                if self.prompt("Send friend request? [y/N]: ").await?.eq_ignore_ascii_case("y") {
                    screen.send_request(&self.ctx).await?;
                }
            }
        }
        Ok(())
    }

    async fn events(&mut self) -> Result<()> {
        let mut screen = EventsScreen::default();
        screen.load(&self.ctx).await?;
        let upcoming: Vec<_> = screen.upcoming().cloned().collect();
        let invites: Vec<_> = screen.invites().cloned().collect();
        let all: Vec<_> = upcoming.iter().chain(invites.iter()).cloned().collect();
        println!("Upcoming:");
        for (n, event) in upcoming.iter().enumerate() {
            println!("  {}. {} {}", n + 1, event.event_name, event.event_date.as_deref().unwrap_or(""));
        }
        println!("Invites:");
        for (n, event) in invites.iter().enumerate() {
            println!("  {}. {} {}", upcoming.len() + n + 1, event.event_name, event.event_date.as_deref().unwrap_or(""));
        }
        let Some(invitation) = pick(&all, &self.prompt("Open event #: ").await?) else {
            return Ok(());
        };
        self.router.navigate(Route::EventDetails)?;
        let mut details = EventDetailsScreen::new(invitation.clone());
        let result = self.event_details(&mut details).await;
        self.router.back();
        result
    }

    async fn event_details(&mut self, details: &mut EventDetailsScreen) -> Result<()> {
        let event = &details.invitation;
        println!("⛵ {} ({})", event.event_name, event.event_type.as_deref().unwrap_or("event"));
        println!("   {} {}", event.event_date.as_deref().unwrap_or(""), event.event_time.as_deref().unwrap_or(""));
        println!("   Boat call: {}", event.boat_call_location.as_deref().unwrap_or("-"));
        if let Some(remaining) = event.remaining_crew() {
            println!("   Crew still needed: {remaining}");
        }
        println!("   Status: {:?}", event.status);
        match self.prompt("a accept, d decline, l leave, i invite more, blank to go back: ").await?.as_str() {
            "a" => details.respond(&self.ctx, InvitationStatus::Accepted).await?,
            "d" => details.respond(&self.ctx, InvitationStatus::Declined).await?,
            "l" => details.leave(&self.ctx).await?,
            "i" => {
                self.router.navigate(Route::UserSelection)?;
                let mut selection = details.invite_more();
                let result = self.invite_users(&mut selection).await;
                self.router.back();
                result?;
            }
            _ => {}
        }
        Ok(())
    }

    async fn invite_users(&mut self, selection: &mut UserSelectionScreen) -> Result<()> {
        selection.load(&self.ctx).await?;
        for id in self.pick_users(&selection.users).await? {
            selection.toggle(&id);
        }
        selection.submit(&self.ctx).await?;
        Ok(())
    }

    async fn groups(&mut self) -> Result<()> {
        self.router.navigate(Route::CreateGroup)?;
        let result = self.manage_groups().await;
        self.router.back();
        result
    }

    async fn manage_groups(&mut self) -> Result<()> {
        let mut screen = CreateGroupScreen::default();
        screen.load(&self.ctx).await?;
        for (n, group) in screen.groups.iter().enumerate() {
            println!("  {}. {} ({} members)", n + 1, group.name, group.members.len());
        }
        let choice = self.prompt("Group # to chat, e <#> to plan an event, n for a new group: ").await?;
        if choice == "n" {
            screen.name = self.prompt("Group name: ").await?;
            screen.description = self.prompt("Description: ").await?;
            let group_id = screen.create(&self.ctx).await?;
            return self.add_users(group_id).await;
        }
        if let Some(index) = choice.strip_prefix("e ") {
            let Some(group) = pick(&screen.groups, index) else {
                return Ok(());
            };
            return self.create_event(group.id.clone(), group.members.clone()).await;
        }
        let Some(group) = pick(&screen.groups, &choice) else {
            return Ok(());
        };
        self.open_group_chat(group.id.clone()).await
    }

    async fn add_users(&mut self, group_id: GroupId) -> Result<()> {
        self.router.navigate(Route::AddUsers)?;
        let mut screen = AddUsersScreen::new(group_id);
        let result = self.add_members(&mut screen).await;
        self.router.back();
        result
    }

    async fn add_members(&mut self, screen: &mut AddUsersScreen) -> Result<()> {
        screen.load(&self.ctx).await?;
        for id in self.pick_users(&screen.users).await? {
            screen.toggle(&id);
        }
        screen.submit(&self.ctx).await?;
        Ok(())
    }

    async fn create_event(&mut self, group_id: GroupId, members: Vec<User>) -> Result<()> {
        self.router.navigate(Route::CreateEvent)?;
        let result = self.create_event_fields(group_id, members).await;
        self.router.back();
        result
    }

    async fn create_event_fields(&mut self, group_id: GroupId, members: Vec<User>) -> Result<()> {
        let mut screen = CreateEventScreen::open(&self.ctx, group_id, members)?;
        screen.draft.event_name = self.prompt("Name of event: ").await?;
        screen.draft.event_type = self.prompt("Type: ").await?;
        screen.draft.boat_call_location = self.prompt("Boat call location: ").await?;
        screen.draft.crew_members_seeking = self.prompt("Crew members seeking: ").await?;
        screen.draft.event_date = self.prompt("Date (YYYY-MM-DD): ").await?;
        screen.draft.event_time = self.prompt("Time (HH:MM): ").await?;
        screen.draft.meal_provided = self.prompt("Meal provided: ").await?;
        screen.draft.attire_requirements = self.prompt("Attire: ").await?;
        screen.draft.additional_details = self.prompt("Details: ").await?;
        screen.submit(&self.ctx).await?;
        Ok(())
    }

    /// Lists `users` and reads a comma separated list of row numbers.
    async fn pick_users(&mut self, users: &[User]) -> Result<Vec<UserId>> {
        for (n, user) in users.iter().enumerate() {
            println!("  {}. {}", n + 1, user.username);
        }
        let answer = self.prompt("Select #s (comma separated): ").await?;
        Ok(answer
            .split(',')
            .filter_map(|n| pick(users, n))
            .map(|user| user.id.clone())
            .collect())
    }

    async fn prompt(&mut self, label: &str) -> Result<String> {
        print!("{label}");
        io::stdout().flush()?;
        match self.input.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => {
                self.closed = true;
                Ok(String::new())
            }
        }
    }
}

/// 1-based row lookup.
fn pick<'a, T>(items: &'a [T], choice: &str) -> Option<&'a T> {
    let n: usize = choice.trim().parse().ok()?;
    items.get(n.checked_sub(1)?)
}

fn print_user(user: &User) {
    println!("👤 {} <{}>", user.username, user.email);
    if let Some(title) = &user.usertitle {
        println!("   {title}");
    }
    if let Some(address) = &user.address {
        println!("   📍 {address}");
    }
}

/// Prints what is new since `shown` and returns the new count. A list that
/// shrank is printed again from the top.
fn print_messages(messages: &[Message], me: &UserId, shown: usize) -> usize {
    let start = if messages.len() < shown { 0 } else { shown };
    for message in &messages[start..] {
        let who = if message.is_from(me) { "me" } else { "them" };
        println!("  [{who}] {}", message.message);
    }
    messages.len()
}

fn print_alert(alert: &Alert) {
    let icon = match alert.kind {
        AlertKind::Success => "✅",
        AlertKind::Warning => "⚠️",
        AlertKind::Error => "❌",
    };
    println!("\n{icon} {}: {}", alert.title, alert.text);
}
