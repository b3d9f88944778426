mod models;
mod handlers;
mod services;
mod middleware;
mod progress;
mod config;
mod errors;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
};
use tower_http::{
    services::ServeDir,
    limit::RequestBodyLimitLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tower_sessions::cookie::SameSite;
use tracing_subscriber::EnvFilter;
use crate::{
    services::JsonStore,
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().context("Failed to load configuration")?;

    let store = JsonStore::from_config(&config);
    store
        .init()
        .await
        .with_context(|| format!("Failed to prepare data directory {}", config.storage.data_dir))?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(store, config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server stopped unexpectedly")?;
    Ok(())
}

fn build_router(store: JsonStore, config: Config) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.session.secure)
        .with_same_site(SameSite::Lax)
        .with_name("session");
    let body_limit = config.server.max_body_size;

    Router::new()
        // Auth routes
        .route("/", get(handlers::serve_login_page))
        .route("/login", post(handlers::handle_login))
        .route("/register", post(handlers::handle_register))
        .route("/logout", get(handlers::handle_logout))
        .route("/account/password", post(handlers::change_password))

        // Read-only views
        .route("/api/overview", get(handlers::show_overview))
        .route("/api/requirements", get(handlers::list_requirements))
        .route("/api/stats", get(handlers::show_statistics))
        .route("/api/shared/progress", get(handlers::shared_progress))
        .route("/api/shared/grades", get(handlers::shared_grades))
        .route("/api/notifications", get(handlers::notifications))
        .route("/api/module-ids", get(handlers::list_module_ids))

        // Settings
        .route("/api/settings/credits", post(handlers::update_credits))
        .route("/api/settings/targets", post(handlers::update_targets))
        .route("/api/settings/starting-term", post(handlers::update_starting_term))
        .route("/api/settings/share", post(handlers::update_sharing))
        .route("/api/plan", post(handlers::save_plan))

        // Modules
        .route("/api/modules", post(handlers::create_module))
        .route("/api/modules/:index/rename", post(handlers::rename_module))
        .route("/api/modules/:index/term", post(handlers::move_module))
        .route("/api/modules/:index/ideal-term", post(handlers::update_ideal_term))
        .route("/api/modules/:index/delete", post(handlers::remove_module))
        .route("/api/modules/:index/notes", post(handlers::update_module_notes))
        .route("/api/modules/:index/highlight", post(handlers::highlight_module))
        .route("/api/modules/:index/id", post(handlers::assign_module_id))
        .route("/api/modules/:index/requirements", post(handlers::create_requirement))
        .route("/api/modules/:index/requirements/:req", post(handlers::edit_requirement))
        .route("/api/modules/:index/requirements/:req/done", post(handlers::mark_requirement))
        .route("/api/modules/:index/requirements/:req/delete", post(handlers::remove_requirement))

        // Requirement detail
        .route("/api/requirement/:uuid", get(handlers::show_requirement))
        .route("/api/requirement/:uuid/main", post(handlers::update_requirement_main))
        .route("/api/requirement/:uuid/notes", post(handlers::update_requirement_notes))
        .route("/api/requirement/:uuid/subs", post(handlers::create_sub_requirement))
        .route("/api/requirement/:uuid/subs/:index/toggle", post(handlers::toggle_sub_requirement))
        .route("/api/requirement/:uuid/subs/:index/delete", post(handlers::remove_sub_requirement))

        // Static files
        .nest_service("/static", ServeDir::new("static"))

        .layer(from_fn(middleware::require_auth))
        .layer(session_layer)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state((store, config))
}
