use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("User {0} already exists")]
    UserExists(String),

    #[error("User {0} not found")]
    UnknownUser(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
