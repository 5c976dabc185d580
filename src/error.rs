//! Typed errors for the record store, the access gate and launch checks.

use thiserror::Error;

/// Result alias for record store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Another record already holds this `(part_number, model_name)` pair.
    #[error("duplicate ECU: part number '{part_number}' with model '{model_name}' already exists")]
    Duplicate {
        part_number: String,
        model_name: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

#[derive(Error, Debug)]
pub enum GateError {
    #[error("{0}")]
    Validation(String),

    #[error("login or email already registered")]
    DuplicateAccount,

    #[error("invalid login or password")]
    InvalidCredentials,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("failed to launch catalog: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Refusal reasons for the catalog's launch arguments.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("access denied: launch through ecu-gate (expected <username> <token>)")]
    MissingArguments,

    #[error("invalid token: expected {expected} characters, got {len}")]
    InvalidToken { len: usize, expected: usize },
}
