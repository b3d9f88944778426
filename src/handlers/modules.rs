use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use tower_sessions::Session;
use crate::config::Config;
use crate::errors::{AppError, AppResult, EditResult};
use crate::models::{
    CreditsForm, ListForm, ModuleIdForm, NewModuleForm, NewRequirementForm, NotesForm, PlanForm,
    RenameForm, RequirementForm, StartingTermForm, TermForm, ToggleForm, UserProgress,
};
use crate::progress::edit::{self, RequirementUpdate};
use crate::services::JsonStore;
use super::session::current_user;

/// Applies `change` to the session user's progress and saves it.
pub(crate) async fn mutate<T, F>(store: &JsonStore, session: &Session, change: F) -> AppResult<Response>
where
    T: Serialize,
    F: FnOnce(&mut UserProgress) -> EditResult<T>,
{
    let user = current_user(store, session).await?;
    let result = store
        .update_progress(&user.userid, |progress| change(progress).map_err(AppError::from))
        .await?;
    Ok(Json(json!({ "ok": true, "result": result })).into_response())
}

// ---- settings ----

pub async fn update_credits(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Form(form): Form<CreditsForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| {
        edit::set_total_needed_credits(p, form.total_needed_credits);
        Ok(p.total_needed_credits)
    })
    .await
}

pub async fn update_targets(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Form(form): Form<ListForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| {
        edit::set_semester_targets(p, &form.values);
        Ok(p.semester_targets.clone())
    })
    .await
}

pub async fn update_starting_term(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Form(form): Form<StartingTermForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::set_starting_term(p, form.starting_term)).await
}

/// Replaces the list of users allowed to see the session user's progress.
pub async fn update_sharing(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Form(form): Form<ListForm>,
) -> AppResult<Response> {
    let user = current_user(&store, &session).await?;
    let share_usernames = edit::parse_list(&form.values);
    store.set_share_usernames(&user.username, share_usernames.clone()).await?;
    tracing::info!("{} now shares with {:?}", user.username, share_usernames);
    Ok(Json(json!({ "ok": true, "result": share_usernames })).into_response())
}

pub async fn save_plan(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Json(plan): Json<PlanForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| Ok(edit::apply_plan(p, &plan.changes))).await
}

// ---- modules ----

pub async fn create_module(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Form(form): Form<NewModuleForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::add_module(p, &form.name, form.ideal_term, form.term)).await
}

pub async fn rename_module(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(index): Path<usize>,
    Form(form): Form<RenameForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::rename_module(p, index, &form.name)).await
}

pub async fn move_module(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(index): Path<usize>,
    Form(form): Form<TermForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::reassign_term(p, index, form.term)).await
}

pub async fn update_ideal_term(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(index): Path<usize>,
    Form(form): Form<TermForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::set_ideal_term(p, index, form.term)).await
}

pub async fn remove_module(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(index): Path<usize>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::delete_module(p, index)).await
}

pub async fn update_module_notes(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(index): Path<usize>,
    Form(form): Form<NotesForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::set_module_notes(p, index, &form.notes)).await
}

pub async fn highlight_module(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(index): Path<usize>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::toggle_highlight(p, index)).await
}

/// Sets the shared module id and records it in the global registry.
pub async fn assign_module_id(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(index): Path<usize>,
    Form(form): Form<ModuleIdForm>,
) -> AppResult<Response> {
    let id = form.id.trim().to_string();
    let user = current_user(&store, &session).await?;
    store
        .update_progress(&user.userid, |p| edit::set_module_id(p, index, &id).map_err(AppError::from))
        .await?;

    let registered = !id.is_empty() && store.register_module_id(&id).await?;
    if registered {
        tracing::info!("Registered new module id {}", id);
    }
    Ok(Json(json!({ "ok": true, "result": { "id": id, "registered": registered } })).into_response())
}

pub async fn list_module_ids(
    State((store, _config)): State<(JsonStore, Config)>,
) -> AppResult<Response> {
    Ok(Json(store.load_module_ids().await?).into_response())
}

// ---- requirements by position ----

pub async fn create_requirement(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path(index): Path<usize>,
    Form(form): Form<NewRequirementForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| {
        edit::add_requirement(p, index, &form.description, form.credits, form.date.as_deref())
    })
    .await
}

pub async fn edit_requirement(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path((index, req_index)): Path<(usize, usize)>,
    Form(form): Form<RequirementForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| {
        let update = RequirementUpdate {
            done: form.done,
            description: &form.description,
            credits: form.credits,
            grade: form.grade,
            date: form.date.as_deref(),
        };
        edit::update_requirement(p, index, req_index, update)
    })
    .await
}

pub async fn mark_requirement(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path((index, req_index)): Path<(usize, usize)>,
    Form(form): Form<ToggleForm>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::set_requirement_done(p, index, req_index, form.done)).await
}

pub async fn remove_requirement(
    State((store, _config)): State<(JsonStore, Config)>,
    session: Session,
    Path((index, req_index)): Path<(usize, usize)>,
) -> AppResult<Response> {
    mutate(&store, &session, move |p| edit::delete_requirement(p, index, req_index)).await
}
