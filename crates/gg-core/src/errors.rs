//! Cross-cutting error types for GearGuard.
//!
//! Storage and service-level errors live in `gg-db`; this type covers what
//! the core can decide on its own, which is field-level input validation.
//! Illegal transitions have their own type, [`crate::transition::TransitionRejected`].

use thiserror::Error;

/// Errors the core raises before anything touches storage.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation (missing fields, formats, business rules).
    #[error("Validation error: {0}")]
    Validation(String),
}
