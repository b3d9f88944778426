use axum::{
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    extract::Request,
    body::Body,
};
use tower_sessions::Session;
use crate::handlers::USER_SESSION_KEY;

// The notification endpoint authenticates itself from query credentials.
const PUBLIC_PATHS: &[&str] = &["/", "/login", "/register", "/api/notifications"];

pub async fn require_auth(
    session: Session,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if PUBLIC_PATHS.contains(&path) || path.starts_with("/static/") {
        return next.run(req).await;
    }

    match session.get::<String>(USER_SESSION_KEY).await {
        Ok(Some(_)) => next.run(req).await,
        Ok(None) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::warn!("Session lookup failed on {}: {}", path, e);
            Redirect::to("/").into_response()
        }
    }
}
