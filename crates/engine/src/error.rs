//! The module contains the errors the engine can return.
//!
//! - [`NotFound`] for references to missing groups, users or expenses.
//! - [`InvalidInput`] for rejected amounts, empty member sets and the like.
//! - [`Database`] wraps any storage failure.
//!
//! [`NotFound`]: EngineError::NotFound
//! [`InvalidInput`]: EngineError::InvalidInput
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
