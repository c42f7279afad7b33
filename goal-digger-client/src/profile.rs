//! Account profile: read the signed-in user's details and edit display name or password.

use crate::auth::AuthProvider;
use crate::events::{ErrorScope, EventDispatcher};
use goal_digger_core::validation::ProfileForm;
use goal_digger_core::{Profile, SyncError, SyncResult, UserAttributes};
use std::sync::Arc;

pub struct ProfileController<A> {
    auth: Arc<A>,
    events: Arc<EventDispatcher>,
}

impl<A: AuthProvider> ProfileController<A> {
    pub fn new(auth: Arc<A>, events: Arc<EventDispatcher>) -> Self {
        Self { auth, events }
    }

    pub async fn load(&self) -> SyncResult<Profile> {
        let user = self.auth.current_user().await;
        let user = self.report(user)?;
        let user = self.report(user.ok_or(SyncError::UserNotLoaded))?;
        Ok(Profile::from(&user))
    }

    /// Apply the non-blank fields of `form`.
    ///
    /// The display name is only sent when it differs from the stored one. Remote
    /// failures of the two updates are collected and reported together.
    pub async fn update(&self, form: &ProfileForm) -> SyncResult<Profile> {
        self.report(form.validate())?;
        let mut profile = self.load().await?;
        let mut failures = Vec::new();

        if !form.display_name.is_empty() && form.display_name != profile.display_name {
            match self
                .auth
                .update_user(&UserAttributes::display_name(&form.display_name))
                .await
            {
                Ok(user) => profile = Profile::from(&user),
                Err(e) => failures.push(e.to_string()),
            }
        }

        if !form.password.is_empty() {
            match self
                .auth
                .update_user(&UserAttributes::password(&form.password))
                .await
            {
                Ok(user) => profile = Profile::from(&user),
                Err(e) => failures.push(e.to_string()),
            }
        }

        if !failures.is_empty() {
            tracing::warn!("PROFILE: update failed: {}", failures.join(" "));
            return self.report(Err(SyncError::Remote(failures.join(" "))));
        }

        tracing::info!("PROFILE: updated");
        Ok(profile)
    }

    fn report<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        if let Err(e) = &result {
            self.events.emit_error(ErrorScope::Profile, &e.to_string());
        }
        result
    }
}
