// Application-wide error type and result alias built on thiserror.
use thiserror::Error;

pub mod edit;
pub mod response;
pub mod store;

pub use edit::{EditError, EditResult};
pub use store::{StoreError, StoreResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    // Credential failures on API routes, answered with 403 instead of a redirect
    #[error("Access denied")]
    Forbidden,

    // #[from] lets `?` lift a StoreError straight out of the JsonStore.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("{0}")]
    Edit(#[from] EditError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

pub type AppResult<T> = Result<T, AppError>;
