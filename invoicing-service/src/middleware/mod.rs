pub mod auth;

pub use auth::{require_session, LOGIN_PATH, SESSION_EMAIL_KEY, SESSION_USER_ID_KEY};
