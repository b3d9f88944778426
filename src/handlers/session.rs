use tower_sessions::Session;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::services::JsonStore;

/// Session key holding the logged-in username.
pub const USER_SESSION_KEY: &str = "user_session";

pub async fn session_username(session: &Session) -> AppResult<Option<String>> {
    session
        .get::<String>(USER_SESSION_KEY)
        .await
        .map_err(|e| AppError::Auth(format!("Session error: {}", e)))
}

/// The logged-in user. Fails with an auth error when the session is empty
/// or names a user that no longer exists.
pub async fn current_user(store: &JsonStore, session: &Session) -> AppResult<User> {
    let username = session_username(session)
        .await?
        .ok_or_else(|| AppError::Auth("Not authenticated".into()))?;

    store
        .get_user(&username)
        .await?
        .ok_or_else(|| AppError::Auth("User not found".into()))
}
