use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Json, Response},
};
use chrono::Local;
use serde_json::json;
use tower_sessions::Session;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{NotesForm, RequirementMainForm, SubRequirementForm};
use crate::progress::edit;
use crate::progress::notifications::time_until;
use crate::services::JsonStore;
use super::modules::mutate;
use super::session::current_user;

/// A single requirement looked up by uuid, with its module and deadline.
pub async fn show_requirement(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(uuid): Path<String>,
) -> AppResult<Response> {
    let user = current_user(&store, &session).await?;
    let progress = store.load_progress(&user.userid).await?;

    let (mi, ri) = progress
        .find_requirement(&uuid)
        .ok_or_else(|| AppError::NotFound(format!("Requirement {} not found", uuid)))?;
    let module = &progress.modules[mi];
    let requirement = &module.requirements[ri];
    let deadline = requirement
        .parsed_date()
        .map(|date| time_until(date, Local::now().date_naive()));

    Ok(Json(json!({
        "module": module.name,
        "term": module.term,
        "requirement": requirement,
        "time_until": deadline,
    }))
    .into_response())
}

pub async fn update_requirement_main(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(uuid): Path<String>,
    Form(form): Form<RequirementMainForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| {
        edit::update_requirement_main(p, &uuid, &form.description, &form.date, &form.credits)
    })
    .await
}

pub async fn update_requirement_notes(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(uuid): Path<String>,
    Form(form): Form<NotesForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::set_requirement_notes(p, &uuid, &form.notes)).await
}

pub async fn create_sub_requirement(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(uuid): Path<String>,
    Form(form): Form<SubRequirementForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::add_sub_requirement(p, &uuid, &form.desc)).await
}

pub async fn toggle_sub_requirement(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path((uuid, index)): Path<(String, usize)>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::toggle_sub_requirement(p, &uuid, index)).await
}

pub async fn remove_sub_requirement(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path((uuid, index)): Path<(String, usize)>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::delete_sub_requirement(p, &uuid, index)).await
}
