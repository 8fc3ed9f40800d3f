use regatta_common::forms::{Credentials, SignupForm};
use regatta_common::User;
use tracing::info;

use super::AppContext;
use crate::client;
use crate::error::{Error, Result};

#[derive(Clone, Debug, Default)]
pub struct LoginScreen {
    pub email: String,
    pub password: String,
}

impl LoginScreen {
    /// Logs in and stores the returned user as the session. The router
    /// notices the new session on its own.
    pub async fn submit(&self, ctx: &AppContext) -> Result<User> {
        let credentials = Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        let user = ctx.alerts.surface(login_and_store(ctx, &credentials).await)?;
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }
}

async fn login_and_store(ctx: &AppContext, credentials: &Credentials) -> Result<User> {
    let user = client::login(&ctx.api, credentials).await?;
    ctx.session.set(user.clone())?;
    Ok(user)
}

#[derive(Clone, Debug, Default)]
pub struct SignupScreen {
    pub form: SignupForm,
}

impl SignupScreen {
    /// Registers the account. The user still has to log in afterwards.
    pub async fn submit(&self, ctx: &AppContext) -> Result<String> {
        if let Some(field) = self.first_missing() {
            ctx.alerts.rejected("Required Fields", "Please fill in all required fields.");
            return Err(Error::MissingParameter(field));
        }
        let message = ctx.alerts.surface(client::signup(&ctx.api, &self.form).await)?;
        ctx.alerts.success("Signup Successful", message.clone());
        Ok(message)
    }

    fn first_missing(&self) -> Option<&'static str> {
        let form = &self.form;
        [
            ("username", &form.username),
            ("password", &form.password),
            ("email", &form.email),
            ("cnic", &form.cnic),
            ("address", &form.address),
            ("phone_no", &form.phone_no),
            ("usertitle", &form.usertitle),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}
