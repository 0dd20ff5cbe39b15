use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

pub const SESSION_USER_ID_KEY: &str = "user_id";
pub const SESSION_EMAIL_KEY: &str = "email";

pub const LOGIN_PATH: &str = "/login";

/// Gate for `/dashboard`: requests without a signed-in session go to the login page.
pub async fn require_session(session: Session, request: Request<Body>, next: Next) -> Response {
    let user_id = match session.get::<String>(SESSION_USER_ID_KEY).await {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session");
            None
        }
    };

    if user_id.is_none() {
        return Redirect::to(LOGIN_PATH).into_response();
    }

    next.run(request).await
}
