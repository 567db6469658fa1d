//! Error types for dayplan.

use thiserror::Error;

use crate::date_key::DateKey;
use crate::record::TIMETABLE_SLOTS;

/// Errors raised while signing in or out through an identity provider.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Sign-in rejected: {0}")]
    Rejected(String),

    #[error("Auth provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Auth provider error: {0}")]
    Provider(String),

    #[error("Auth provider timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by a document store read or write.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid document path segment '{0}'")]
    InvalidPath(String),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors that can occur in planner operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Timetable slot {0} out of range (expected 0..{max})", max = TIMETABLE_SLOTS)]
    SlotOutOfRange(usize),

    #[error("Timetable must have exactly {max} slots, got {0}", max = TIMETABLE_SLOTS)]
    InvalidTimetable(usize),

    #[error("No active session, sign in first")]
    NoSession,

    #[error("The record for {0} has not been loaded for the signed-in user; reload before saving")]
    NotLoaded(DateKey),
}

pub type AuthResult<T> = Result<T, AuthError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type PlannerResult<T> = Result<T, PlannerError>;
