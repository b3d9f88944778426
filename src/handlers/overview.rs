use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{CredentialsQuery, User};
use crate::progress::notifications::{daily_notifications, requirement_rows};
use crate::progress::shared::{peer_index, shared_grade_datasets, shared_progress_datasets};
use crate::progress::sorting::flatten_requirements;
use crate::progress::stats::{overview, own_grade_progression, term_statistics, TermView};
use crate::services::JsonStore;
use super::session::{current_user, session_username};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    #[serde(default)]
    pub view: TermView,
}

pub async fn show_overview(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Query(query): Query<OverviewQuery>,
) -> AppResult<Response> {
    let user = current_user(&store, &session).await?;
    let progress = store.load_progress(&user.userid).await?;
    let peers = store.load_shared_peers(&user.username).await?;
    tracing::debug!("{} has {} sharing peers", user.username, peers.len());

    let index = peer_index(&progress, &peers);
    Ok(Json(overview(&progress, query.view, &index)).into_response())
}

/// Every requirement across all modules with its distance from today and
/// from the row before it.
pub async fn list_requirements(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
) -> AppResult<Response> {
    let user = current_user(&store, &session).await?;
    let progress = store.load_progress(&user.userid).await?;
    let rows = requirement_rows(flatten_requirements(&progress.modules), today());
    Ok(Json(rows).into_response())
}

pub async fn show_statistics(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
) -> AppResult<Response> {
    let user = current_user(&store, &session).await?;
    let progress = store.load_progress(&user.userid).await?;
    Ok(Json(term_statistics(&progress)).into_response())
}

pub async fn shared_progress(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
) -> AppResult<Response> {
    let user = current_user(&store, &session).await?;
    let progress = store.load_progress(&user.userid).await?;
    let peers = store.load_shared_peers(&user.username).await?;

    let min_terms = progress.modules.iter().map(|m| m.term).max().unwrap_or(1);
    Ok(Json(shared_progress_datasets(&peers, min_terms)).into_response())
}

pub async fn shared_grades(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
) -> AppResult<Response> {
    let user = current_user(&store, &session).await?;
    let progress = store.load_progress(&user.userid).await?;
    let peers = store.load_shared_peers(&user.username).await?;

    let own = own_grade_progression(&progress.modules);
    let others = shared_grade_datasets(&peers, own.len());
    Ok(Json(json!({ "own": own, "peers": others })).into_response())
}

/// Session user, or the user named by query credentials for clients
/// without a session.
async fn notification_user(store: &JsonStore, session: &Session, query: &CredentialsQuery) -> AppResult<User> {
    if session_username(session).await?.is_some() {
        return current_user(store, session).await;
    }

    let username = query.username.as_deref().map(str::trim).unwrap_or_default();
    let password = query.password.as_deref().map(str::trim).unwrap_or_default();
    store
        .verify_password(username, password)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Rejected notification request for '{}'", username);
            AppError::Forbidden
        })
}

pub async fn notifications(
    State((store, config)): State<(JsonStore, Config)>,
    session: Session,
    Query(query): Query<CredentialsQuery>,
) -> AppResult<Response> {
    let user = notification_user(&store, &session, &query).await?;
    let progress = store.load_progress(&user.userid).await?;
    let due = daily_notifications(&progress, today(), config.user.notification_window_days);
    tracing::debug!("{} notifications for {}", due.len(), user.username);
    Ok(Json(due).into_response())
}
