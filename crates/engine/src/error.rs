//! The module contains the errors the engine can throw.
//!
//! Every operation rejects invalid input before mutating anything, so a
//! returned error means the request left no trace. The exception are the
//! rescaling cascades, which run inside one database transaction and roll
//! back as a whole.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        // Constraint violations during commit are surfaced as Conflict so the
        // server can report them as a caller error instead of a 500.
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message))
            | Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                EngineError::Conflict(message)
            }
            _ => EngineError::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::BadRequest(a), Self::BadRequest(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
