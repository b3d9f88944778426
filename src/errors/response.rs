use axum::{
    response::{IntoResponse, Response, Redirect, Json},
    http::StatusCode,
};
use serde_json::json;
use crate::errors::{AppError, EditError, StoreError};

// Converts AppError into an HTTP response: auth failures go back to the
// login page, everything else becomes a JSON error body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Auth(msg) => {
                Redirect::to(&format!("/?error={}", urlencoding::encode(&msg)))
                    .into_response()
            }

            AppError::Forbidden => error_body(StatusCode::FORBIDDEN, "Access denied.".into()),

            AppError::Store(err) => convert_store_error(err),

            AppError::File(e) => error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("File error: {}", e),
            ),

            AppError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg),

            AppError::Validation(msg) => error_body(StatusCode::BAD_REQUEST, msg),

            AppError::Edit(err) => convert_edit_error(err),
        }
    }
}

fn convert_store_error(err: StoreError) -> Response {
    match err {
        StoreError::UserExists(username) => error_body(
            StatusCode::CONFLICT,
            format!("Username {} already taken", username),
        ),

        StoreError::UnknownUser(_) => error_body(StatusCode::NOT_FOUND, err.to_string()),

        _ => error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Storage error: {}", err),
        ),
    }
}

fn convert_edit_error(err: EditError) -> Response {
    match err {
        // Field validation reports every problem at once
        EditError::Invalid(errors) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Please fix the following", "errors": errors })),
        ).into_response(),

        err if err.is_not_found() => error_body(StatusCode::NOT_FOUND, err.to_string()),

        err => error_body(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
