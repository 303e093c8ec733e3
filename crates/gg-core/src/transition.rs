//! Status transition validator.
//!
//! Pure and total: every `(current, requested)` pair yields a definite
//! accept or reject. Identity and policy checks belong to the caller.

use thiserror::Error;

use crate::enums::RequestStatus;

/// A rejected status change, carrying the states that would have been legal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status transition: {from} → {to}. Allowed transitions: {from} → {}", describe_allowed(.allowed))]
pub struct TransitionRejected {
    pub from: RequestStatus,
    pub to: RequestStatus,
    /// Legal next states from `from`. Empty when `from` is terminal.
    pub allowed: Vec<RequestStatus>,
}

fn describe_allowed(allowed: &[RequestStatus]) -> String {
    if allowed.is_empty() {
        return "none (terminal state)".to_string();
    }
    allowed
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate moving a request from `current` to `requested`.
///
/// Re-submitting the current status is accepted as a no-op.
///
/// # Errors
///
/// Returns [`TransitionRejected`] for any pair that is not an edge of the
/// status graph, naming the allowed next states.
pub fn validate_transition(
    current: RequestStatus,
    requested: RequestStatus,
) -> Result<(), TransitionRejected> {
    if current == requested || current.can_transition_to(requested) {
        return Ok(());
    }
    Err(TransitionRejected {
        from: current,
        to: requested,
        allowed: current.allowed_next_states().to_vec(),
    })
}
