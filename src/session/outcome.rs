//! Classification result of one submitted line.

/// What `SessionController::submit` decided to do with a line.
///
/// Output and completion for `Delegated` commands arrive asynchronously as
/// session events; this value only tells the frontend how the line was
/// classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Handled by the session itself; no child process was spawned.
    Builtin,
    /// Forwarded to a child shell; the session is busy until it finishes.
    Delegated,
    /// Rejected with an inline error message (bad cd target, spawn failure).
    Error,
}
