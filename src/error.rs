use crate::session::SessionStatus;

/// Errors surfaced by the breathing engine and its configuration boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BreathError {
    /// A configuration change was attempted while a session is in progress
    #[error("cannot {operation} while the session is {status}")]
    InvalidState {
        operation: &'static str,
        status: SessionStatus,
    },

    /// A duration, theme or music value outside the supported set
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
