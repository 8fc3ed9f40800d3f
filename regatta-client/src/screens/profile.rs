use regatta_common::forms::ProfileForm;
use regatta_common::User;

use super::AppContext;
use crate::client;
use crate::error::Result;

/// Landing screen: shows the stored profile.
#[derive(Clone, Debug, Default)]
pub struct HomeScreen {
    pub user: Option<User>,
}

impl HomeScreen {
    pub fn load(&mut self, ctx: &AppContext) -> Result<&User> {
        let user = ctx.alerts.surface(ctx.current_user())?;
        Ok(self.user.insert(user))
    }
}

/// The signed-in user's own profile with friends and suggestions.
#[derive(Clone, Debug, Default)]
pub struct MyProfileScreen {
    pub user: Option<User>,
    pub friends: Vec<User>,
    pub recommended: Vec<User>,
}

impl MyProfileScreen {
    /// Both lists load independently; one failing keeps the other.
    pub async fn load(&mut self, ctx: &AppContext) -> Result<()> {
        let user = ctx.alerts.surface(ctx.current_user())?;
        let (friends, recommended) = futures::join!(
            client::get_friends(&ctx.api, &user.id),
            client::get_recommended_users(&ctx.api, &user.id),
        );
        self.user = Some(user);
        if let Ok(friends) = ctx.alerts.surface(friends) {
            self.friends = friends;
        }
        if let Ok(recommended) = ctx.alerts.surface(recommended) {
            self.recommended = recommended;
        }
        Ok(())
    }
}

/// Profile editor.
#[derive(Clone, Debug, Default)]
pub struct ProfileScreen {
    pub form: ProfileForm,
}

impl ProfileScreen {
    pub fn open(ctx: &AppContext) -> Result<Self> {
        let user = ctx.alerts.surface(ctx.current_user())?;
        Ok(Self { form: ProfileForm::from_user(&user) })
    }

    /// Saves the profile and replaces the stored session with the result.
    pub async fn submit(&self, ctx: &AppContext) -> Result<User> {
        let (user, message) = ctx.alerts.surface(self.save(ctx).await)?;
        ctx.alerts.success("Profile Update", message);
        Ok(user)
    }

    async fn save(&self, ctx: &AppContext) -> Result<(User, String)> {
        let previous = ctx.current_user()?;
        let (saved, message) = client::update_profile(&ctx.api, &self.form).await?;
        let next = saved.unwrap_or_else(|| self.form.apply_to(&previous));
        ctx.session.set(next.clone())?;
        Ok((next, message))
    }
}
