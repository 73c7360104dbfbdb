use thiserror::Error;

/// Engine-level failures. Availability beats strictness here: callers are
/// expected to recover from every variant except a cancelled seed request.
#[derive(Error, Debug)]
pub enum WheelError {
    /// A network seed source failed or timed out. Callers fall back to the
    /// local generator instead of blocking the spin.
    #[error("random seed source unavailable: {0}")]
    RandomnessUnavailable(String),
    /// A spin was requested with no spinnable items left.
    #[error("no active items to spin")]
    EmptyItemSet,
    /// The user aborted an external seed request; never auto-retried.
    #[error("seed request cancelled")]
    Cancelled,
}
