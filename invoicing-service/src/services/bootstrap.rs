//! Start-up provisioning of the first dashboard user.

use crate::config::BootstrapUserSettings;
use crate::models::NewUser;
use crate::services::credentials::UserDirectory;
use crate::services::password::hash_password;
use secrecy::ExposeSecret;
use service_core::error::AppError;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyPresent,
}

#[derive(Validate)]
struct BootstrapUser {
    #[validate(length(min = 1))]
    name: String,
    #[validate(email)]
    email: String,
    // Same floor the credentials provider enforces at sign-in.
    #[validate(length(min = 6))]
    password: String,
}

/// Create the configured user unless one with that email exists.
///
/// Existing users are left untouched, so rotating the configured password
/// does not overwrite a password changed since.
#[instrument(skip_all, fields(email = %settings.email))]
pub async fn ensure_bootstrap_user(
    users: &dyn UserDirectory,
    settings: &BootstrapUserSettings,
) -> Result<BootstrapOutcome, AppError> {
    BootstrapUser {
        name: settings.name.clone(),
        email: settings.email.clone(),
        password: settings.password.expose_secret().clone(),
    }
    .validate()?;

    if users.find_user_by_email(&settings.email).await?.is_some() {
        info!("Bootstrap user already present");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let password = settings.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

    let created = users
        .insert_user(&NewUser {
            name: settings.name.clone(),
            email: settings.email.clone(),
            password_hash,
        })
        .await?;

    if created {
        info!("Bootstrap user created");
        Ok(BootstrapOutcome::Created)
    } else {
        info!("Bootstrap user created concurrently");
        Ok(BootstrapOutcome::AlreadyPresent)
    }
}
