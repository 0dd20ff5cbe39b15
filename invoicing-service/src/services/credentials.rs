//! Credential verification for the dashboard login.
//!
//! A verifier reports one of three things: the user signed in, sign-in
//! failed for a known reason (`AuthErrorKind`), or something unexpected
//! broke (`Err`). Callers map the known reasons to messages and let the
//! unexpected ones propagate.

use crate::models::{FormData, NewUser, User};
use crate::services::password::password_matches;
use async_trait::async_trait;
use secrecy::Secret;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Strategy name for email + password sign-in.
pub const CREDENTIALS_STRATEGY: &str = "credentials";

/// Classified sign-in failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthErrorKind {
    /// Unknown user, wrong password or malformed credentials.
    #[error("CredentialsSignin")]
    CredentialsSignin,
    /// The provider failed while looking the user up.
    #[error("CallbackRouteError")]
    CallbackRouteError,
    /// No provider is registered under the requested strategy.
    #[error("InvalidProvider")]
    InvalidProvider,
}

/// Identity established by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn(AuthenticatedUser),
    Failed(AuthErrorKind),
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn sign_in(&self, strategy: &str, form: &FormData)
        -> Result<SignInOutcome, anyhow::Error>;
}

/// Lookup of sign-in identities.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Returns false when a user with the same email already exists.
    async fn insert_user(&self, user: &NewUser) -> Result<bool, AppError>;
}

#[derive(Validate)]
struct Credentials {
    #[validate(email)]
    email: String,
    #[validate(length(min = 6))]
    password: String,
}

impl Credentials {
    fn from_form(form: &FormData) -> Self {
        Self {
            email: form.get("email").unwrap_or_default().to_string(),
            password: form.get("password").unwrap_or_default().to_string(),
        }
    }
}

/// Email + password verifier backed by a `UserDirectory`.
#[derive(Clone)]
pub struct CredentialsProvider {
    users: Arc<dyn UserDirectory>,
}

impl CredentialsProvider {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl CredentialVerifier for CredentialsProvider {
    async fn sign_in(
        &self,
        strategy: &str,
        form: &FormData,
    ) -> Result<SignInOutcome, anyhow::Error> {
        if strategy != CREDENTIALS_STRATEGY {
            tracing::warn!(strategy = %strategy, "Sign-in requested for unknown strategy");
            return Ok(SignInOutcome::Failed(AuthErrorKind::InvalidProvider));
        }

        let credentials = Credentials::from_form(form);
        if credentials.validate().is_err() {
            return Ok(SignInOutcome::Failed(AuthErrorKind::CredentialsSignin));
        }

        let user = match self.users.find_user_by_email(&credentials.email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::info!("Sign-in attempted for unknown email");
                return Ok(SignInOutcome::Failed(AuthErrorKind::CredentialsSignin));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch user");
                return Ok(SignInOutcome::Failed(AuthErrorKind::CallbackRouteError));
            }
        };

        // Hash verification runs on the blocking pool.
        let password = Secret::new(credentials.password);
        let stored_hash = user.password.clone();
        let matches =
            tokio::task::spawn_blocking(move || password_matches(&password, &stored_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))?;

        if !matches {
            tracing::info!(user_id = %user.id, "Sign-in rejected: password mismatch");
            return Ok(SignInOutcome::Failed(AuthErrorKind::CredentialsSignin));
        }

        Ok(SignInOutcome::SignedIn(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
        }))
    }
}
