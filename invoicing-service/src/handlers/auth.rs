use crate::actions::LoginOutcome;
use crate::middleware::{LOGIN_PATH, SESSION_EMAIL_KEY, SESSION_USER_ID_KEY};
use crate::models::FormData;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use service_core::error::AppError;
use tower_sessions::Session;

pub const DASHBOARD_PATH: &str = "/dashboard";

/// Body returned to the login form after a rejected attempt.
#[derive(Debug, Serialize)]
pub struct LoginState {
    pub message: &'static str,
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::SessionError(e.to_string())
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<FormData>,
) -> Result<Response, AppError> {
    match state.actions.authenticate(None, &form).await? {
        LoginOutcome::SignedIn(user) => {
            // New id on privilege change.
            session.cycle_id().await.map_err(session_error)?;
            session
                .insert(SESSION_USER_ID_KEY, user.user_id.to_string())
                .await
                .map_err(session_error)?;
            session
                .insert(SESSION_EMAIL_KEY, &user.email)
                .await
                .map_err(session_error)?;

            Ok(Redirect::to(DASHBOARD_PATH).into_response())
        }
        LoginOutcome::Rejected(message) => {
            Ok((StatusCode::UNAUTHORIZED, Json(LoginState { message })).into_response())
        }
    }
}

pub async fn logout_handler(session: Session) -> Result<Response, AppError> {
    session.flush().await.map_err(session_error)?;
    tracing::info!("User signed out");
    Ok(Redirect::to(LOGIN_PATH).into_response())
}
