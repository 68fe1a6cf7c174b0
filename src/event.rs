//! Event reporting between the session core and the frontend.
//!
//! The session core never talks to widgets directly. Everything a frontend
//! needs to render (output chunks, scrollback clearing, the working-directory
//! label, inline messages, command completion) arrives as a [`SessionEvent`]
//! on the channel created by [`init_session_events`].
//!
//! Output chunks are delivered in arrival order per stream; the relative
//! interleaving of stdout and stderr is not guaranteed.

use std::path::PathBuf;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Events emitted by a session toward its frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Newly decoded stdout text from the active delegated command.
    Stdout { chunk: String },

    /// Newly decoded stderr text from the active delegated command.
    Stderr { chunk: String },

    /// The `clear` builtin ran; the frontend should discard its scrollback.
    ClearScrollback,

    /// The working directory changed (cd builtin) or was re-announced after
    /// a delegated command finished.
    WorkingDirChanged { path: PathBuf },

    /// Informational message, e.g. a cancelled sudo prompt.
    Info { message: String },

    /// Recoverable error surfaced inline: unknown cd target, spawn failure.
    CommandError { message: String },

    /// A delegated command terminated. `pid` identifies which one, so a
    /// completion queued behind newer events cannot be mistaken for the
    /// currently active command's. `exit_code` is `None` when the child was
    /// killed by a signal. The frontend should call
    /// `SessionController::finish_command` with the pid in response.
    CommandFinished {
        pid: Option<u32>,
        exit_code: Option<i32>,
    },
}

/// Creates the session event channel.
///
/// Unbounded is appropriate here: chunks are produced at pipe-read pace by a
/// single active command, and the event types are lightweight. The sender is
/// cloned into the reader tasks; the receiver belongs to the frontend loop.
pub fn init_session_events() -> (UnboundedSender<SessionEvent>, UnboundedReceiver<SessionEvent>) {
    mpsc::unbounded_channel()
}
