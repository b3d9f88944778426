use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;
use crate::config::Config;
use crate::errors::{AppError, AppResult, StoreError};
use crate::models::{LoginForm, PasswordForm, RegisterForm};
use crate::services::JsonStore;
use super::session::{current_user, USER_SESSION_KEY};

pub async fn serve_login_page() -> AppResult<Response> {
    let login_html = tokio::fs::read_to_string("templates/login.html")
        .await
        .map_err(|e| {
            tracing::error!("Failed to read login template: {}", e);
            AppError::File(e)
        })?;
    Ok(Html(login_html).into_response())
}

fn login_error(message: &str) -> Response {
    Redirect::to(&format!("/?error={}", urlencoding::encode(message))).into_response()
}

fn register_error(message: &str) -> Response {
    Redirect::to(&format!("/?error={}&form=register", urlencoding::encode(message))).into_response()
}

#[axum::debug_handler]
pub async fn handle_login(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> AppResult<Response> {
    let username = login_form.username.trim();
    tracing::info!("Login attempt for user: {}", username);

    match store.verify_password(username, login_form.password.trim()).await? {
        Some(user) => {
            session
                .insert(USER_SESSION_KEY, user.username.clone())
                .await
                .map_err(|e| AppError::Auth(format!("Session error: {}", e)))?;
            tracing::info!("User {} logged in", user.username);
            Ok(Redirect::to("/api/overview").into_response())
        }
        None => {
            tracing::warn!("Invalid credentials for user: {}", username);
            Ok(login_error("Invalid credentials."))
        }
    }
}

/// First failing registration rule, if any. Uniqueness is checked by the store.
fn registration_problem(username: &str, password: &str, confirm: &str) -> Option<&'static str> {
    if username.is_empty() {
        Some("Username is required.")
    } else if password.is_empty() || confirm.is_empty() {
        Some("Password fields cannot be empty.")
    } else if password != confirm {
        Some("Passwords do not match.")
    } else if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some("Username can only contain letters, numbers, and underscores.")
    } else {
        None
    }
}

pub async fn handle_register(
    State((store, _config)): State<(JsonStore, Config)>,
    Form(register_form): Form<RegisterForm>,
) -> AppResult<Response> {
    let username = register_form.username.trim();
    let password = register_form.password.trim();

    if let Some(problem) = registration_problem(username, password, register_form.confirm_password.trim()) {
        tracing::debug!("Rejected registration for '{}': {}", username, problem);
        return Ok(register_error(problem));
    }

    match store.register_user(username, password).await {
        Ok(_) => Ok(Redirect::to("/?error=Registration%20successful!%20Please%20login").into_response()),
        Err(StoreError::UserExists(_)) => {
            Ok(register_error("Username already taken. Please choose another."))
        }
        Err(e) => {
            tracing::error!("Failed to register {}: {}", username, e);
            Err(e.into())
        }
    }
}

pub async fn handle_logout(session: Session) -> Response {
    if let Err(e) = session.remove::<String>(USER_SESSION_KEY).await {
        tracing::warn!("Session removal error: {}", e);
    }
    Redirect::to("/").into_response()
}

pub async fn change_password(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Form(form): Form<PasswordForm>,
) -> AppResult<Response> {
    let user = current_user(&store, &session).await?;
    let password = form.password.trim();
    if password.is_empty() {
        return Err(AppError::Validation("Password cannot be empty.".into()));
    }

    store.set_password(&user.username, password).await?;
    tracing::info!("Password changed for {}", user.username);
    Ok(Json(json!({ "ok": true })).into_response())
}
